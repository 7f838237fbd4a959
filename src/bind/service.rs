//! BIND daemon control via `rndc` and `systemctl`
//!
//! Configuration changes only take effect once the daemon reloads, so every
//! mutation in this crate ends with a `reload()`. Command output is captured
//! and folded into the error message on failure.

use std::process::Command;

#[derive(Debug)]
pub enum ServiceError {
    Spawn { command: String, source: std::io::Error },
    CommandFailed { command: String, output: String },
}

impl std::fmt::Display for ServiceError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ServiceError::Spawn { command, source } => {
                write!(f, "failed to spawn {}: {}", command, source)
            }
            ServiceError::CommandFailed { command, output } => {
                write!(f, "{} failed | output: {}", command, output.trim())
            }
        }
    }
}

impl std::error::Error for ServiceError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ServiceError::Spawn { source, .. } => Some(source),
            _ => None,
        }
    }
}

type Result<T> = std::result::Result<T, ServiceError>;

/// Controls one systemd-managed BIND service.
#[derive(Clone, Debug)]
pub struct ServiceManager {
    service: String,
}

impl ServiceManager {
    pub fn new(service: impl Into<String>) -> ServiceManager {
        ServiceManager {
            service: service.into(),
        }
    }

    /// Ask the running daemon to reload its configuration and zones.
    pub fn reload(&self) -> Result<()> {
        run("rndc", &["reload"]).map(|_| ())
    }

    pub fn start(&self) -> Result<()> {
        run("systemctl", &["start", self.service.as_str()]).map(|_| ())
    }

    pub fn stop(&self) -> Result<()> {
        run("systemctl", &["stop", self.service.as_str()]).map(|_| ())
    }

    pub fn restart(&self) -> Result<()> {
        run("systemctl", &["restart", self.service.as_str()]).map(|_| ())
    }

    /// The unit state as reported by `systemctl is-active`. A stopped
    /// service makes `is-active` exit non-zero while still printing the
    /// state, so any non-empty output is returned as-is.
    pub fn status(&self) -> Result<String> {
        match run("systemctl", &["is-active", self.service.as_str()]) {
            Ok(output) => Ok(output.trim().to_string()),
            Err(ServiceError::CommandFailed { output, .. }) if !output.trim().is_empty() => {
                Ok(output.trim().to_string())
            }
            Err(err) => Err(err),
        }
    }
}

/// Pick the installed service unit: `bind9` on Debian-style systems,
/// `named` everywhere else.
pub fn detect_service_name() -> String {
    for service in &["bind9", "named"] {
        if let Ok(output) = run("systemctl", &["list-units", "--type=service", "--all"]) {
            if output.contains(&format!("{}.service", service)) {
                return service.to_string();
            }
        }
    }
    "named".to_string()
}

fn run(program: &str, args: &[&str]) -> Result<String> {
    let command = format!("{} {}", program, args.join(" "));
    let output = Command::new(program)
        .args(args)
        .output()
        .map_err(|source| ServiceError::Spawn {
            command: command.clone(),
            source,
        })?;

    let mut combined = String::from_utf8_lossy(&output.stdout).into_owned();
    combined.push_str(&String::from_utf8_lossy(&output.stderr));

    if output.status.success() {
        Ok(combined)
    } else {
        Err(ServiceError::CommandFailed {
            command,
            output: combined,
        })
    }
}
