//! BIND9 Management
//!
//! This module contains everything needed to inspect and mutate a BIND9
//! installation:
//!
//! * `config_parser` - named.conf-style nested configuration parser
//! * `zone_parser` - RFC 1035 flavored zone (master) file parser
//! * `domains` - projection of the config tree into a domain → zone-file map
//! * `context` - runtime paths and service name, detected once at startup
//! * `authority` - zone lifecycle (create and remove whole domains)
//! * `record` - record-level CRUD against a domain's zone file
//! * `service` - BIND daemon control via `rndc` and `systemctl`
//! * `validate` - input validation for domains, subdomains and addresses
//! * `backup` - mirror the configuration and master zones into a directory

/// Zone lifecycle management against the BIND configuration
pub mod authority;

/// Mirror of the live configuration and master zone files
pub mod backup;

/// BIND-style nested configuration file parser
pub mod config_parser;

/// Runtime paths and service name
pub mod context;

/// Domain to zone-file resolution
pub mod domains;

/// Record-level operations on zone files
pub mod record;

/// BIND daemon control via rndc and systemctl
pub mod service;

/// Input validation for domains, subdomains and addresses
pub mod validate;

/// RFC 1035 flavored zone file parser
pub mod zone_parser;
