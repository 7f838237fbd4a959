//! RFC 1035 flavored zone file parser
//!
//! This module parses BIND master files into an ordered list of typed
//! resource records plus the zone-wide `$ORIGIN`/`$TTL` state. Supported:
//!
//! - `$ORIGIN` and `$TTL` directives (with S/M/H/D/W time units)
//! - Multi-line parenthesized records (SOA split across physical lines)
//! - `;` comments
//! - Relative owner names, qualified against the active origin
//! - A, AAAA, CNAME, MX, NS, PTR, SOA, SRV and TXT records
//!
//! The parser is best-effort: one malformed record is logged and dropped
//! without aborting the rest of the file. Comment stripping is naive and
//! does not understand `;` inside quoted TXT strings.
//!
//! The TTL field of a record line is only recognized when the token is all
//! digits; any other token shifts into the class/type positions. This
//! heuristic is kept for compatibility with existing tooling and is not
//! authoritative against the full RFC 1035 grammar.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use lazy_static::lazy_static;
use regex::Regex;
use serde::Serialize;

lazy_static! {
    static ref RECORD_RE: Regex =
        Regex::new(r"^(\S+)\s+(\d+)?\s*(IN)?\s*(A|AAAA|CNAME|MX|NS|SOA|TXT|PTR|SRV)\s+(.+)$")
            .expect("Failed to compile record regex");
    static ref SOA_RE: Regex =
        Regex::new(r"^(\S+)\s+(\S+)\s+(\d+)\s+(\d+[SMHDW]?)\s+(\d+[SMHDW]?)\s+(\d+[SMHDW]?)\s+(\d+[SMHDW]?)$")
            .expect("Failed to compile SOA regex");
    static ref MX_RE: Regex = Regex::new(r"^(\d+)\s+(\S+)$").expect("Failed to compile MX regex");
    static ref SRV_RE: Regex =
        Regex::new(r"^(\d+)\s+(\d+)\s+(\d+)\s+(\S+)$").expect("Failed to compile SRV regex");
    static ref ORIGIN_RE: Regex =
        Regex::new(r"^\$ORIGIN\s+(\S+)$").expect("Failed to compile origin regex");
    static ref TTL_DIRECTIVE_RE: Regex =
        Regex::new(r"^\$TTL\s+(\S+)$").expect("Failed to compile TTL directive regex");
}

/// Parser errors with line number information
#[derive(Debug)]
pub enum ZoneError {
    Read { path: PathBuf, source: io::Error },
    InvalidTtl { value: String },
    InvalidRecord { line: usize, message: String },
}

impl std::fmt::Display for ZoneError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ZoneError::Read { path, source } => {
                write!(f, "cannot read zone file {}: {}", path.display(), source)
            }
            ZoneError::InvalidTtl { value } => write!(f, "invalid TTL value: {}", value),
            ZoneError::InvalidRecord { line, message } => {
                write!(f, "line {}: invalid record: {}", line, message)
            }
        }
    }
}

impl std::error::Error for ZoneError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ZoneError::Read { source, .. } => Some(source),
            _ => None,
        }
    }
}

type Result<T> = std::result::Result<T, ZoneError>;

/// The nine record types the zone parser understands.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Serialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum RecordType {
    A,
    Aaaa,
    Cname,
    Mx,
    Ns,
    Ptr,
    Soa,
    Srv,
    Txt,
}

impl RecordType {
    pub fn as_str(&self) -> &'static str {
        match self {
            RecordType::A => "A",
            RecordType::Aaaa => "AAAA",
            RecordType::Cname => "CNAME",
            RecordType::Mx => "MX",
            RecordType::Ns => "NS",
            RecordType::Ptr => "PTR",
            RecordType::Soa => "SOA",
            RecordType::Srv => "SRV",
            RecordType::Txt => "TXT",
        }
    }
}

impl std::fmt::Display for RecordType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for RecordType {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_uppercase().as_str() {
            "A" => Ok(RecordType::A),
            "AAAA" => Ok(RecordType::Aaaa),
            "CNAME" => Ok(RecordType::Cname),
            "MX" => Ok(RecordType::Mx),
            "NS" => Ok(RecordType::Ns),
            "PTR" => Ok(RecordType::Ptr),
            "SOA" => Ok(RecordType::Soa),
            "SRV" => Ok(RecordType::Srv),
            "TXT" => Ok(RecordType::Txt),
            other => Err(format!("unknown record type: {}", other)),
        }
    }
}

/// Start of authority parameters carried by a SOA record.
#[derive(Clone, Debug, Eq, PartialEq, Serialize)]
pub struct SoaData {
    pub mname: String,
    pub rname: String,
    pub serial: u32,
    pub refresh: u32,
    pub retry: u32,
    pub expire: u32,
    pub minimum: u32,
}

/// Typed rdata; the shape depends on the record type.
#[derive(Clone, Debug, Eq, PartialEq, Serialize)]
#[serde(untagged)]
pub enum RecordData {
    /// A, AAAA, CNAME, NS, PTR and TXT rdata
    Plain(String),
    Mx { preference: u16, exchange: String },
    Srv { priority: u16, weight: u16, port: u16, target: String },
    Soa(SoaData),
}

/// One resource record. `ttl` is always resolved to seconds.
#[derive(Clone, Debug, Eq, PartialEq, Serialize)]
pub struct ZoneRecord {
    pub name: String,
    pub ttl: u32,
    pub class: String,
    pub rtype: RecordType,
    pub data: RecordData,
}

/// A parsed zone file: records in first-occurrence order plus the
/// zone-wide origin and default TTL.
#[derive(Clone, Debug, Default, Serialize)]
pub struct ZoneFile {
    pub origin: String,
    pub ttl: u32,
    pub records: Vec<ZoneRecord>,
}

/// Resolve a TTL token to seconds: either a bare integer or an integer
/// with an S/M/H/D/W unit suffix.
pub fn parse_ttl(value: &str) -> Result<u32> {
    let upper = value.to_uppercase();
    if let Ok(seconds) = upper.parse::<u32>() {
        return Ok(seconds);
    }
    if upper.len() < 2 {
        return Err(ZoneError::InvalidTtl {
            value: value.to_string(),
        });
    }
    let (number, unit) = upper.split_at(upper.len() - 1);
    let amount = number.parse::<u32>().map_err(|_| ZoneError::InvalidTtl {
        value: value.to_string(),
    })?;
    let multiplier = match unit {
        "S" => 1,
        "M" => 60,
        "H" => 3600,
        "D" => 86400,
        "W" => 604800,
        _ => {
            return Err(ZoneError::InvalidTtl {
                value: value.to_string(),
            })
        }
    };
    amount.checked_mul(multiplier).ok_or(ZoneError::InvalidTtl {
        value: value.to_string(),
    })
}

/// Zone file parser state
pub struct ZoneParser {
    origin: String,
    default_ttl: u32,
    line_number: usize,
}

impl ZoneParser {
    pub fn new() -> ZoneParser {
        ZoneParser {
            origin: String::new(),
            default_ttl: 0,
            line_number: 0,
        }
    }

    /// Parse a zone file from a file path.
    pub fn parse_file(&mut self, path: &Path) -> Result<ZoneFile> {
        let content = fs::read_to_string(path).map_err(|source| ZoneError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Ok(self.parse_string(&content))
    }

    /// Parse zone file text. Content-level anomalies are logged and
    /// skipped, so this cannot fail.
    pub fn parse_string(&mut self, content: &str) -> ZoneFile {
        let lines: Vec<&str> = content.lines().collect();
        let mut records = Vec::new();
        let mut idx = 0;

        while idx < lines.len() {
            self.line_number = idx + 1;
            let mut line = strip_comment(lines[idx]).trim().to_string();
            idx += 1;
            if line.is_empty() {
                continue;
            }

            // Reassemble records parenthesized across physical lines.
            if line.contains('(') && !line.contains(')') {
                while idx < lines.len() {
                    let next = strip_comment(lines[idx]).trim().to_string();
                    idx += 1;
                    if next.is_empty() {
                        continue;
                    }
                    line.push(' ');
                    line.push_str(&next);
                    if next.contains(')') {
                        break;
                    }
                }
            }
            if line.contains('(') || line.contains(')') {
                line = line.replace('(', " ").replace(')', " ");
                line = line.trim().to_string();
            }

            if let Some(caps) = ORIGIN_RE.captures(&line) {
                let mut origin = caps[1].to_string();
                if !origin.ends_with('.') {
                    origin.push('.');
                }
                self.origin = origin;
                continue;
            }
            if let Some(caps) = TTL_DIRECTIVE_RE.captures(&line) {
                match parse_ttl(&caps[1]) {
                    Ok(ttl) => self.default_ttl = ttl,
                    Err(err) => {
                        log::warn!("line {}: bad $TTL directive: {}", self.line_number, err)
                    }
                }
                continue;
            }

            match self.parse_record(&line) {
                Ok(Some(record)) => records.push(record),
                Ok(None) => {}
                Err(err) => log::warn!("skipping record: {}", err),
            }
        }

        ZoneFile {
            origin: self.origin.clone(),
            ttl: self.default_ttl,
            records,
        }
    }

    /// Parse one logical record line. Lines that do not look like records
    /// at all yield `Ok(None)`; lines that match the record shape but fail
    /// their type grammar yield an error.
    fn parse_record(&self, line: &str) -> Result<Option<ZoneRecord>> {
        let caps = match RECORD_RE.captures(line) {
            Some(caps) => caps,
            None => return Ok(None),
        };

        let mut name = caps[1].to_string();
        let ttl = match caps.get(2) {
            Some(token) => parse_ttl(token.as_str())?,
            None => self.default_ttl,
        };
        let class = caps
            .get(3)
            .map(|m| m.as_str().to_string())
            .unwrap_or_else(|| "IN".to_string());
        let rtype: RecordType = caps[4]
            .parse()
            .map_err(|message| ZoneError::InvalidRecord {
                line: self.line_number,
                message,
            })?;
        let rdata = caps[5].trim();

        if !name.ends_with('.')
            && name != "@"
            && !self.origin.is_empty()
            && name != self.origin.trim_end_matches('.')
        {
            name = format!("{}.{}", name, self.origin);
        }

        let data = self.parse_rdata(rtype, rdata)?;

        Ok(Some(ZoneRecord {
            name,
            ttl,
            class,
            rtype,
            data,
        }))
    }

    fn parse_rdata(&self, rtype: RecordType, rdata: &str) -> Result<RecordData> {
        match rtype {
            RecordType::Soa => {
                let caps = SOA_RE.captures(rdata).ok_or_else(|| ZoneError::InvalidRecord {
                    line: self.line_number,
                    message: format!("invalid SOA rdata: {}", rdata),
                })?;
                let serial = caps[3].parse::<u32>().map_err(|_| ZoneError::InvalidRecord {
                    line: self.line_number,
                    message: format!("invalid SOA serial: {}", &caps[3]),
                })?;
                Ok(RecordData::Soa(SoaData {
                    mname: caps[1].to_string(),
                    rname: caps[2].to_string(),
                    serial,
                    refresh: parse_ttl(&caps[4])?,
                    retry: parse_ttl(&caps[5])?,
                    expire: parse_ttl(&caps[6])?,
                    minimum: parse_ttl(&caps[7])?,
                }))
            }
            RecordType::Mx => {
                let caps = MX_RE.captures(rdata).ok_or_else(|| ZoneError::InvalidRecord {
                    line: self.line_number,
                    message: format!("invalid MX rdata: {}", rdata),
                })?;
                let preference = caps[1].parse::<u16>().map_err(|_| ZoneError::InvalidRecord {
                    line: self.line_number,
                    message: format!("invalid MX preference: {}", &caps[1]),
                })?;
                Ok(RecordData::Mx {
                    preference,
                    exchange: caps[2].to_string(),
                })
            }
            RecordType::Srv => {
                let caps = SRV_RE.captures(rdata).ok_or_else(|| ZoneError::InvalidRecord {
                    line: self.line_number,
                    message: format!("invalid SRV rdata: {}", rdata),
                })?;
                let field = |i: usize| -> Result<u16> {
                    caps[i].parse::<u16>().map_err(|_| ZoneError::InvalidRecord {
                        line: self.line_number,
                        message: format!("invalid SRV field: {}", &caps[i]),
                    })
                };
                Ok(RecordData::Srv {
                    priority: field(1)?,
                    weight: field(2)?,
                    port: field(3)?,
                    target: caps[4].to_string(),
                })
            }
            RecordType::Txt => Ok(RecordData::Plain(rdata.trim_matches('"').to_string())),
            _ => Ok(RecordData::Plain(rdata.to_string())),
        }
    }
}

impl Default for ZoneParser {
    fn default() -> Self {
        ZoneParser::new()
    }
}

/// Strip everything from the first `;` onward.
fn strip_comment(line: &str) -> &str {
    match line.find(';') {
        Some(pos) => &line[..pos],
        None => line,
    }
}
