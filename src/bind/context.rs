//! The `BindContext` holds the paths and service name shared by every
//! manager in this crate. It is constructed once at startup, either from
//! explicit paths or by probing the well-known BIND install locations, and
//! threaded through constructors; there is no hidden global state.

use std::path::{Path, PathBuf};

use derive_more::{Display, Error};

/// Candidate locations for the main configuration file, in probe order.
pub const CONFIG_FILE_PATHS: &[&str] = &[
    "/etc/named.conf",
    "/etc/bind/named.conf",
    "/usr/local/etc/named.conf",
];

/// Candidate zone directories, in probe order.
pub const ZONE_DIR_PATHS: &[&str] = &[
    "/var/named",
    "/var/lib/bind",
    "/etc/bind",
    "/usr/local/etc/namedb",
];

#[derive(Debug, Display, Error)]
pub enum ContextError {
    #[display(fmt = "no BIND configuration file found in any well-known location")]
    ConfigFileNotFound,
    #[display(fmt = "no BIND zone directory found in any well-known location")]
    ZoneDirNotFound,
}

type Result<T> = std::result::Result<T, ContextError>;

/// Runtime context for one BIND installation.
#[derive(Clone, Debug)]
pub struct BindContext {
    pub config_file: PathBuf,
    pub zone_dir: PathBuf,
    pub service: String,
}

impl BindContext {
    /// Build a context from explicit paths. Never touches the filesystem;
    /// the service name defaults to `named` until overridden.
    pub fn new(config_file: impl Into<PathBuf>, zone_dir: impl Into<PathBuf>) -> BindContext {
        BindContext {
            config_file: config_file.into(),
            zone_dir: zone_dir.into(),
            service: "named".to_string(),
        }
    }

    pub fn with_service(mut self, service: impl Into<String>) -> BindContext {
        self.service = service.into();
        self
    }

    /// Probe the well-known install locations and detect the service unit.
    pub fn detect() -> Result<BindContext> {
        let config_file = CONFIG_FILE_PATHS
            .iter()
            .map(Path::new)
            .find(|path| path.is_file())
            .ok_or(ContextError::ConfigFileNotFound)?;
        let zone_dir = ZONE_DIR_PATHS
            .iter()
            .map(Path::new)
            .find(|path| path.is_dir())
            .ok_or(ContextError::ZoneDirNotFound)?;

        let ctx = BindContext::new(config_file, zone_dir)
            .with_service(crate::bind::service::detect_service_name());
        log::info!(
            "using config {} and zone directory {} (service {})",
            ctx.config_file.display(),
            ctx.zone_dir.display(),
            ctx.service
        );
        Ok(ctx)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_uses_given_paths() {
        let ctx = BindContext::new("/tmp/named.conf", "/tmp/zones");
        assert_eq!(ctx.config_file, PathBuf::from("/tmp/named.conf"));
        assert_eq!(ctx.zone_dir, PathBuf::from("/tmp/zones"));
        assert_eq!(ctx.service, "named");
    }

    #[test]
    fn test_with_service_overrides_default() {
        let ctx = BindContext::new("/tmp/named.conf", "/tmp/zones").with_service("bind9");
        assert_eq!(ctx.service, "bind9");
    }
}
