//! Zone lifecycle management against the BIND configuration
//!
//! `Authority` owns whole-domain operations: creating a zone file plus its
//! `zone` declaration, removing both again, and listing what the live
//! configuration currently declares. The parsed domain map is recomputed
//! from disk on every call; the config file is the single source of truth.

use std::fs;
use std::io::Write;
use std::path::PathBuf;

use chrono::{Datelike, Local};
use serde::Serialize;

use crate::bind::config_parser::ConfigError;
use crate::bind::context::BindContext;
use crate::bind::domains::{load_domains, DomainMap};
use crate::bind::service::{ServiceError, ServiceManager};
use crate::bind::validate::{ensure_resolvable, validate_domain, ValidationError};

#[derive(Debug)]
pub enum AuthorityError {
    Io(std::io::Error),
    Config(ConfigError),
    Validation(ValidationError),
    Service(ServiceError),
    NoSuchDomain(String),
    DomainExists(String),
}

impl std::fmt::Display for AuthorityError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AuthorityError::Io(e) => write!(f, "IO error: {}", e),
            AuthorityError::Config(e) => write!(f, "{}", e),
            AuthorityError::Validation(e) => write!(f, "{}", e),
            AuthorityError::Service(e) => write!(f, "{}", e),
            AuthorityError::NoSuchDomain(domain) => write!(f, "domain does not exist: {}", domain),
            AuthorityError::DomainExists(domain) => write!(f, "domain already exists: {}", domain),
        }
    }
}

impl std::error::Error for AuthorityError {}

impl From<std::io::Error> for AuthorityError {
    fn from(err: std::io::Error) -> Self {
        AuthorityError::Io(err)
    }
}

impl From<ConfigError> for AuthorityError {
    fn from(err: ConfigError) -> Self {
        AuthorityError::Config(err)
    }
}

impl From<ValidationError> for AuthorityError {
    fn from(err: ValidationError) -> Self {
        AuthorityError::Validation(err)
    }
}

impl From<ServiceError> for AuthorityError {
    fn from(err: ServiceError) -> Self {
        AuthorityError::Service(err)
    }
}

type Result<T> = std::result::Result<T, AuthorityError>;

/// Zone directory and configuration summary.
#[derive(Clone, Copy, Debug, Serialize)]
pub struct Stats {
    pub zone_files: usize,
    pub declared_zones: usize,
}

/// Manages zone declarations and their master files.
pub struct Authority {
    ctx: BindContext,
    service: ServiceManager,
}

impl Authority {
    pub fn new(ctx: BindContext) -> Authority {
        let service = ServiceManager::new(ctx.service.clone());
        Authority { ctx, service }
    }

    /// The current domain → zone-file map, freshly parsed from disk.
    pub fn domains(&self) -> Result<DomainMap> {
        Ok(load_domains(&self.ctx)?)
    }

    pub fn domain_exists(&self, domain: &str) -> Result<bool> {
        Ok(self.domains()?.contains_key(domain))
    }

    /// Create a new master zone: writes the zone file with an SOA and two
    /// NS records, appends the `zone` declaration, and reloads the daemon.
    /// Both nameservers must already resolve.
    pub fn add_domain(&self, domain: &str, ns1: &str, ns2: &str) -> Result<PathBuf> {
        validate_domain(domain)?;
        validate_domain(ns1)?;
        validate_domain(ns2)?;
        if self.domain_exists(domain)? {
            return Err(AuthorityError::DomainExists(domain.to_string()));
        }
        ensure_resolvable(ns1)?;
        ensure_resolvable(ns2)?;

        let zone_file = self.ctx.zone_dir.join(format!("db.{}", domain));
        fs::write(&zone_file, initial_zone(domain, ns1, ns2, serial_today()))?;
        log::info!("created zone file {}", zone_file.display());

        let declaration = zone_declaration(domain, &zone_file);
        let mut config = fs::OpenOptions::new()
            .append(true)
            .open(&self.ctx.config_file)?;
        config.write_all(declaration.as_bytes())?;

        self.service.reload()?;
        Ok(zone_file)
    }

    /// Remove a domain's zone file and its `zone` declaration, then reload.
    pub fn delete_domain(&self, domain: &str) -> Result<()> {
        validate_domain(domain)?;
        let zone_file = self
            .domains()?
            .remove(domain)
            .ok_or_else(|| AuthorityError::NoSuchDomain(domain.to_string()))?;

        fs::remove_file(&zone_file)?;
        log::info!("removed zone file {}", zone_file.display());

        let content = fs::read_to_string(&self.ctx.config_file)?;
        fs::write(&self.ctx.config_file, strip_zone_block(&content, domain))?;

        self.service.reload()?;
        Ok(())
    }

    pub fn stats(&self) -> Result<Stats> {
        let zone_files = fs::read_dir(&self.ctx.zone_dir)?.filter_map(|e| e.ok()).count();
        let config = fs::read_to_string(&self.ctx.config_file)?;
        let declared_zones = config.matches("zone ").count();
        Ok(Stats {
            zone_files,
            declared_zones,
        })
    }
}

/// YYYYMMDD01, the conventional date-derived serial for a fresh zone.
fn serial_today() -> u32 {
    let today = Local::now().date_naive();
    today.year() as u32 * 1_000_000 + today.month() * 10_000 + today.day() * 100 + 1
}

fn initial_zone(domain: &str, ns1: &str, ns2: &str, serial: u32) -> String {
    format!(
        "$TTL 86400\n\
         @ IN SOA {ns1}. admin.{domain}. ( {serial} 86400 3600 604800 86400 )\n\
         @ IN NS {ns1}.\n\
         @ IN NS {ns2}.\n",
        ns1 = ns1,
        domain = domain,
        serial = serial
    )
}

fn zone_declaration(domain: &str, zone_file: &std::path::Path) -> String {
    format!(
        "zone \"{}\" {{\n\ttype master;\n\tfile \"{}\";\n}};\n",
        domain,
        zone_file.display()
    )
}

/// Drop the `zone "<domain>" {` ... `};` window from configuration text,
/// leaving every other line untouched.
fn strip_zone_block(content: &str, domain: &str) -> String {
    let opener = format!("zone \"{}\" {{", domain);
    let mut kept: Vec<&str> = Vec::new();
    let mut skipping = false;

    for line in content.lines() {
        if skipping {
            if line.trim() == "};" {
                skipping = false;
            }
            continue;
        }
        if line.trim_start().starts_with(&opener) {
            skipping = true;
            continue;
        }
        kept.push(line);
    }

    let mut out = kept.join("\n");
    if content.ends_with('\n') && !out.is_empty() {
        out.push('\n');
    }
    out
}
