//! bindctl
//!
//! A management toolkit for BIND9 name servers. bindctl reads the live
//! `named.conf` (including its `include` graph) and the master zone files it
//! references, and layers zone/record CRUD and service control on top of the
//! parsed view.
//!
//! # Features
//!
//! * Best-effort parser for BIND-style nested configuration files
//! * RFC 1035 flavored zone (master) file parser with typed rdata
//! * Domain to zone-file resolution across the whole configuration
//! * Zone and record management by direct file edits plus `rndc reload`
//! * Service control through `systemctl`
//!
//! # Architecture
//!
//! Everything lives in the `bind` module; the `bindctl` binary is a thin
//! clap front end over it.

/// BIND configuration parsing and management
pub mod bind;
