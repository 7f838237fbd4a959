//! Input validation for domains, subdomains and addresses
//!
//! Syntax checks are regex-based and intentionally narrow: they accept what
//! the zone tooling in this crate writes, not the full hostname grammar.
//! Nameserver checks go out to a public resolver, since a delegation to a
//! nameserver without an A record is dead on arrival.

use std::net::IpAddr;
use std::time::Duration;

use hickory_resolver::config::{ResolverConfig, ResolverOpts};
use hickory_resolver::Resolver;
use lazy_static::lazy_static;
use regex::Regex;

lazy_static! {
    static ref DOMAIN_REGEX: Regex =
        Regex::new(r"^([a-zA-Z0-9-]+\.)+[a-zA-Z]{2,}$").expect("Failed to compile domain regex");
    static ref SUBDOMAIN_REGEX: Regex =
        Regex::new(r"^[a-zA-Z0-9-]{1,63}$").expect("Failed to compile subdomain regex");
}

#[derive(Debug)]
pub enum ValidationError {
    InvalidDomain(String),
    InvalidSubdomain(String),
    InvalidIp(String),
    UnresolvedNameserver { name: String, reason: String },
}

impl std::fmt::Display for ValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ValidationError::InvalidDomain(domain) => {
                write!(f, "invalid domain format: {}", domain)
            }
            ValidationError::InvalidSubdomain(sub) => {
                write!(f, "invalid subdomain format: {}", sub)
            }
            ValidationError::InvalidIp(ip) => write!(f, "invalid IP address format: {}", ip),
            ValidationError::UnresolvedNameserver { name, reason } => {
                write!(f, "failed to resolve A record for {}: {}", name, reason)
            }
        }
    }
}

impl std::error::Error for ValidationError {}

type Result<T> = std::result::Result<T, ValidationError>;

pub fn validate_domain(domain: &str) -> Result<()> {
    if DOMAIN_REGEX.is_match(domain) {
        Ok(())
    } else {
        Err(ValidationError::InvalidDomain(domain.to_string()))
    }
}

/// `@` is the zone apex and always valid.
pub fn validate_subdomain(sub: &str) -> Result<()> {
    if sub == "@" || SUBDOMAIN_REGEX.is_match(sub) {
        Ok(())
    } else {
        Err(ValidationError::InvalidSubdomain(sub.to_string()))
    }
}

pub fn validate_ip(value: &str) -> Result<()> {
    value
        .parse::<IpAddr>()
        .map(|_| ())
        .map_err(|_| ValidationError::InvalidIp(value.to_string()))
}

/// Check that `name` has a resolvable A record before delegating to it.
pub fn ensure_resolvable(name: &str) -> Result<()> {
    let unresolved = |reason: String| ValidationError::UnresolvedNameserver {
        name: name.to_string(),
        reason,
    };

    let mut opts = ResolverOpts::default();
    opts.timeout = Duration::from_secs(2);
    let resolver = Resolver::new(ResolverConfig::google(), opts)
        .map_err(|err| unresolved(err.to_string()))?;

    let fqdn = if name.ends_with('.') {
        name.to_string()
    } else {
        format!("{}.", name)
    };
    resolver
        .ipv4_lookup(fqdn.as_str())
        .map(|_| ())
        .map_err(|err| unresolved(err.to_string()))
}
