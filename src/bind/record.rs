//! Record-level operations on zone files
//!
//! Adds and removes individual resource records by direct line edits on the
//! zone file a domain resolves to, and lists records through the zone
//! parser. Every mutation ends with a daemon reload.

use std::fs;
use std::io::Write;
use std::path::PathBuf;

use regex::Regex;
use serde::Serialize;

use crate::bind::config_parser::ConfigError;
use crate::bind::context::BindContext;
use crate::bind::domains::load_domains;
use crate::bind::service::{ServiceError, ServiceManager};
use crate::bind::validate::{validate_domain, validate_ip, validate_subdomain, ValidationError};
use crate::bind::zone_parser::{RecordData, RecordType, ZoneError, ZoneParser};

/// Record types that may be added or deleted through `RecordManager`.
/// SOA and SRV records are parser-only: the SOA belongs to the zone
/// lifecycle and SRV rdata does not fit the single-value add form.
const WRITABLE_TYPES: &[RecordType] = &[
    RecordType::A,
    RecordType::Aaaa,
    RecordType::Cname,
    RecordType::Txt,
    RecordType::Mx,
    RecordType::Ns,
    RecordType::Ptr,
];

#[derive(Debug)]
pub enum RecordError {
    Io(std::io::Error),
    Config(ConfigError),
    Zone(ZoneError),
    Validation(ValidationError),
    Service(ServiceError),
    Pattern(regex::Error),
    NoSuchDomain(String),
    InvalidTtl(u32),
    UnsupportedType(RecordType),
}

impl std::fmt::Display for RecordError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RecordError::Io(e) => write!(f, "IO error: {}", e),
            RecordError::Config(e) => write!(f, "{}", e),
            RecordError::Zone(e) => write!(f, "{}", e),
            RecordError::Validation(e) => write!(f, "{}", e),
            RecordError::Service(e) => write!(f, "{}", e),
            RecordError::Pattern(e) => write!(f, "bad deletion pattern: {}", e),
            RecordError::NoSuchDomain(domain) => write!(f, "domain does not exist: {}", domain),
            RecordError::InvalidTtl(ttl) => {
                write!(f, "invalid TTL {}: TTL must be greater than 0", ttl)
            }
            RecordError::UnsupportedType(rtype) => {
                write!(f, "record type {} cannot be managed here", rtype)
            }
        }
    }
}

impl std::error::Error for RecordError {}

impl From<std::io::Error> for RecordError {
    fn from(err: std::io::Error) -> Self {
        RecordError::Io(err)
    }
}

impl From<ConfigError> for RecordError {
    fn from(err: ConfigError) -> Self {
        RecordError::Config(err)
    }
}

impl From<ZoneError> for RecordError {
    fn from(err: ZoneError) -> Self {
        RecordError::Zone(err)
    }
}

impl From<ValidationError> for RecordError {
    fn from(err: ValidationError) -> Self {
        RecordError::Validation(err)
    }
}

impl From<ServiceError> for RecordError {
    fn from(err: ServiceError) -> Self {
        RecordError::Service(err)
    }
}

impl From<regex::Error> for RecordError {
    fn from(err: regex::Error) -> Self {
        RecordError::Pattern(err)
    }
}

type Result<T> = std::result::Result<T, RecordError>;

/// One record row for display: structured rdata is rendered to JSON so
/// every row carries a single value string.
#[derive(Clone, Debug, Serialize)]
pub struct RecordEntry {
    pub name: String,
    pub ttl: u32,
    pub rtype: RecordType,
    pub value: String,
}

/// Record CRUD over the zone files of one BIND installation.
pub struct RecordManager {
    ctx: BindContext,
    service: ServiceManager,
}

impl RecordManager {
    pub fn new(ctx: BindContext) -> RecordManager {
        let service = ServiceManager::new(ctx.service.clone());
        RecordManager { ctx, service }
    }

    fn zone_file(&self, domain: &str) -> Result<PathBuf> {
        load_domains(&self.ctx)?
            .remove(domain)
            .ok_or_else(|| RecordError::NoSuchDomain(domain.to_string()))
    }

    /// Append one record line and reload. `name` is a bare subdomain label
    /// or `@` for the zone apex.
    pub fn add(
        &self,
        domain: &str,
        rtype: RecordType,
        name: &str,
        value: &str,
        ttl: u32,
    ) -> Result<()> {
        validate_domain(domain)?;
        validate_subdomain(name)?;
        if ttl == 0 {
            return Err(RecordError::InvalidTtl(ttl));
        }
        if !WRITABLE_TYPES.contains(&rtype) {
            return Err(RecordError::UnsupportedType(rtype));
        }
        if rtype == RecordType::A || rtype == RecordType::Aaaa {
            validate_ip(value)?;
        }

        let zone_file = self.zone_file(domain)?;
        let line = record_line(domain, rtype, name, value, ttl);

        let mut file = fs::OpenOptions::new().append(true).open(&zone_file)?;
        file.write_all(line.as_bytes())?;
        log::info!("appended {} record for {} to {}", rtype, domain, zone_file.display());

        self.service.reload()?;
        Ok(())
    }

    /// Remove every line matching the (name, type, value) triple, then
    /// reload.
    pub fn delete(&self, domain: &str, name: &str, rtype: RecordType, value: &str) -> Result<()> {
        validate_domain(domain)?;
        validate_subdomain(name)?;

        let zone_file = self.zone_file(domain)?;
        let content = fs::read_to_string(&zone_file)?;
        let pattern = Regex::new(&deletion_pattern(domain, rtype, name, value))?;
        let remaining = pattern.replace_all(&content, "");
        fs::write(&zone_file, remaining.as_bytes())?;
        log::info!("deleted {} record for {} from {}", rtype, domain, zone_file.display());

        self.service.reload()?;
        Ok(())
    }

    /// All records of a domain, parsed from its zone file.
    pub fn records(&self, domain: &str) -> Result<Vec<RecordEntry>> {
        let zone_file = self.zone_file(domain)?;
        let zone = ZoneParser::new().parse_file(&zone_file)?;

        let mut entries = Vec::with_capacity(zone.records.len());
        for record in zone.records {
            let value = match &record.data {
                RecordData::Plain(value) => value.clone(),
                data => serde_json::to_string(data)
                    .unwrap_or_else(|_| format!("{:?}", data)),
            };
            entries.push(RecordEntry {
                name: record.name,
                ttl: record.ttl,
                rtype: record.rtype,
                value,
            });
        }
        Ok(entries)
    }
}

/// The owner name written into the zone file: `@` stays the apex
/// sentinel, anything else becomes fully qualified.
fn owner_name(domain: &str, name: &str) -> String {
    if name == "@" {
        name.to_string()
    } else {
        format!("{}.{}.", name, domain)
    }
}

fn record_line(domain: &str, rtype: RecordType, name: &str, value: &str, ttl: u32) -> String {
    format!("{} {} IN {} {}\n", owner_name(domain, name), ttl, rtype, value)
}

/// Multi-line pattern matching a whole record line by owner, type and
/// value, with optional TTL and class fields in between.
fn deletion_pattern(domain: &str, rtype: RecordType, name: &str, value: &str) -> String {
    format!(
        r"(?m)^\s*{}\s+(?:\d+\s+)?(?:\S+\s+)?{}\s+{}\s*$",
        regex::escape(&owner_name(domain, name)),
        regex::escape(rtype.as_str()),
        regex::escape(value)
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_record_line_for_subdomain() {
        let line = record_line("a.com", RecordType::A, "www", "1.2.3.4", 300);
        assert_eq!(line, "www.a.com. 300 IN A 1.2.3.4\n");
    }

    #[test]
    fn test_record_line_for_apex() {
        let line = record_line("a.com", RecordType::Txt, "@", "v=spf1 -all", 600);
        assert_eq!(line, "@ 600 IN TXT v=spf1 -all\n");
    }

    #[test]
    fn test_deletion_pattern_matches_added_line() {
        let line = record_line("a.com", RecordType::A, "www", "1.2.3.4", 300);
        let pattern = Regex::new(&deletion_pattern("a.com", RecordType::A, "www", "1.2.3.4")).unwrap();
        assert!(pattern.is_match(&line));
    }

    #[test]
    fn test_deletion_pattern_ignores_other_records() {
        let pattern = Regex::new(&deletion_pattern("a.com", RecordType::A, "www", "1.2.3.4")).unwrap();
        assert!(!pattern.is_match("mail.a.com. 300 IN A 1.2.3.4\n"));
        assert!(!pattern.is_match("www.a.com. 300 IN A 5.6.7.8\n"));
        assert!(!pattern.is_match("www.a.com. 300 IN AAAA 1.2.3.4\n"));
    }

    #[test]
    fn test_deletion_pattern_matches_without_ttl_or_class() {
        let pattern = Regex::new(&deletion_pattern("a.com", RecordType::Ns, "www", "ns1.b.net.")).unwrap();
        assert!(pattern.is_match("www.a.com. NS ns1.b.net.\n"));
        assert!(pattern.is_match("www.a.com. 600 IN NS ns1.b.net.\n"));
    }

    #[test]
    fn test_escaped_value_cannot_widen_the_pattern() {
        let pattern = Regex::new(&deletion_pattern("a.com", RecordType::Txt, "www", "a.b")).unwrap();
        assert!(!pattern.is_match("www.a.com. 300 IN TXT axb\n"));
    }
}
