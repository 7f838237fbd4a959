//! Mirror of the live configuration and master zone files
//!
//! Copies the main configuration file and every `type master` zone file it
//! references into a backup directory, preserving the absolute source paths
//! as a relative tree underneath it. Unreadable zone files are skipped so a
//! single broken zone never sinks the whole backup.

use std::fs;
use std::path::{Component, Path, PathBuf};

use crate::bind::config_parser::{ConfigError, ConfigParser, ConfigValue};
use crate::bind::context::BindContext;

#[derive(Debug)]
pub enum BackupError {
    Io(std::io::Error),
    Config(ConfigError),
}

impl std::fmt::Display for BackupError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            BackupError::Io(e) => write!(f, "IO error: {}", e),
            BackupError::Config(e) => write!(f, "{}", e),
        }
    }
}

impl std::error::Error for BackupError {}

impl From<std::io::Error> for BackupError {
    fn from(err: std::io::Error) -> Self {
        BackupError::Io(err)
    }
}

impl From<ConfigError> for BackupError {
    fn from(err: ConfigError) -> Self {
        BackupError::Config(err)
    }
}

type Result<T> = std::result::Result<T, BackupError>;

/// Copy the configuration and all master zone files under `backup_dir`.
pub fn backup(ctx: &BindContext, backup_dir: &Path) -> Result<()> {
    copy_into(backup_dir, &ctx.config_file)?;

    let config = ConfigParser::new().parse_file(&ctx.config_file)?;
    for value in config.values() {
        let zone = match value.as_block() {
            Some(zone) => zone,
            None => continue,
        };
        if zone.get("type").and_then(ConfigValue::as_scalar) != Some("master") {
            continue;
        }
        let file = match zone.get("file").and_then(ConfigValue::as_scalar) {
            Some(file) => file,
            None => continue,
        };
        let source = if Path::new(file).is_absolute() {
            PathBuf::from(file)
        } else {
            ctx.zone_dir.join(file)
        };
        if let Err(err) = copy_into(backup_dir, &source) {
            log::warn!("skipping zone file {} during backup: {}", source.display(), err);
        }
    }

    Ok(())
}

fn copy_into(backup_dir: &Path, source: &Path) -> Result<()> {
    let target = backup_dir.join(relative_tail(source));
    if let Some(parent) = target.parent() {
        fs::create_dir_all(parent)?;
    }
    fs::copy(source, &target)?;
    log::info!("backed up {} to {}", source.display(), target.display());
    Ok(())
}

/// A path with its root stripped, suitable for joining under another
/// directory (`/etc/named.conf` → `etc/named.conf`).
fn relative_tail(path: &Path) -> PathBuf {
    path.components()
        .filter(|component| matches!(component, Component::Normal(_)))
        .collect()
}
