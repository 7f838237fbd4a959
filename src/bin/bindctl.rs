//! bindctl command line interface
//!
//! Thin front end over the `bind` module: zone and record management,
//! service control, configuration inspection and backups.

use std::path::PathBuf;
use std::process;

use clap::{Parser, Subcommand};
use colored::*;
use comfy_table::Table;

use bindctl::bind::authority::Authority;
use bindctl::bind::backup;
use bindctl::bind::config_parser::ConfigParser;
use bindctl::bind::context::BindContext;
use bindctl::bind::record::RecordManager;
use bindctl::bind::service::ServiceManager;
use bindctl::bind::zone_parser::RecordType;

/// Manage BIND9 zones, records and service state
#[derive(Parser)]
#[command(name = "bindctl")]
#[command(version)]
#[command(about = "BIND9 management from the command line", long_about = None)]
#[command(propagate_version = true)]
struct Cli {
    /// Path to the main BIND configuration file (auto-detected when omitted)
    #[arg(short = 'c', long, env = "BINDCTL_CONFIG")]
    config: Option<PathBuf>,

    /// Directory holding zone files (auto-detected when omitted)
    #[arg(short = 'z', long, env = "BINDCTL_ZONE_DIR")]
    zone_dir: Option<PathBuf>,

    /// systemd unit controlling the BIND daemon (auto-detected when omitted)
    #[arg(short = 's', long, env = "BINDCTL_SERVICE")]
    service: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Manage zones
    Zone {
        #[command(subcommand)]
        action: ZoneCommands,
    },

    /// Manage DNS records
    Record {
        #[command(subcommand)]
        action: RecordCommands,
    },

    /// Control the BIND daemon
    Service {
        #[command(subcommand)]
        action: ServiceCommands,
    },

    /// Dump the parsed configuration as JSON
    Config,

    /// Zone directory and configuration summary
    Stats,

    /// Copy the configuration and all master zone files into a directory
    Backup {
        /// Target directory for the backup tree
        directory: PathBuf,
    },
}

#[derive(Subcommand)]
enum ZoneCommands {
    /// List all domains and their zone files
    List,

    /// Create a domain with two delegated nameservers
    Add {
        domain: String,
        ns1: String,
        ns2: String,
    },

    /// Delete a domain and its zone file
    Delete { domain: String },
}

#[derive(Subcommand)]
enum RecordCommands {
    /// List all records of a domain
    List { domain: String },

    /// Add a record to a domain
    Add {
        domain: String,
        /// Subdomain label, or @ for the zone apex
        name: String,
        /// Record type (A, AAAA, CNAME, TXT, MX, NS, PTR)
        rtype: String,
        value: String,
        /// TTL in seconds
        #[arg(default_value_t = 3600)]
        ttl: u32,
    },

    /// Delete a record from a domain
    Delete {
        domain: String,
        name: String,
        rtype: String,
        value: String,
    },
}

#[derive(Subcommand)]
enum ServiceCommands {
    /// Reload configuration and zones via rndc
    Reload,
    /// Start the daemon
    Start,
    /// Stop the daemon
    Stop,
    /// Restart the daemon
    Restart,
    /// Show the systemd unit state
    Status,
}

fn main() {
    simple_logger::init().expect("Failed to initialize logger");

    let cli = Cli::parse();
    if let Err(err) = run(cli) {
        eprintln!("{} {}", "error:".red().bold(), err);
        process::exit(1);
    }
}

fn run(cli: Cli) -> Result<(), Box<dyn std::error::Error>> {
    let ctx = build_context(&cli)?;

    match cli.command {
        Commands::Zone { action } => zone_command(ctx, action),
        Commands::Record { action } => record_command(ctx, action),
        Commands::Service { action } => service_command(ctx, action),
        Commands::Config => {
            let config = ConfigParser::new().parse_file(&ctx.config_file)?;
            println!("{}", serde_json::to_string_pretty(&config)?);
            Ok(())
        }
        Commands::Stats => {
            let stats = Authority::new(ctx).stats()?;
            println!("{}", serde_json::to_string_pretty(&stats)?);
            Ok(())
        }
        Commands::Backup { directory } => {
            backup::backup(&ctx, &directory)?;
            println!("backup written to {}", directory.display().to_string().green());
            Ok(())
        }
    }
}

fn build_context(cli: &Cli) -> Result<BindContext, Box<dyn std::error::Error>> {
    let mut ctx = match (&cli.config, &cli.zone_dir) {
        (Some(config), Some(zone_dir)) => BindContext::new(config.clone(), zone_dir.clone()),
        _ => {
            let mut detected = BindContext::detect()?;
            if let Some(config) = &cli.config {
                detected.config_file = config.clone();
            }
            if let Some(zone_dir) = &cli.zone_dir {
                detected.zone_dir = zone_dir.clone();
            }
            detected
        }
    };
    if let Some(service) = &cli.service {
        ctx.service = service.clone();
    }
    Ok(ctx)
}

fn zone_command(ctx: BindContext, action: ZoneCommands) -> Result<(), Box<dyn std::error::Error>> {
    let authority = Authority::new(ctx);
    match action {
        ZoneCommands::List => {
            let domains = authority.domains()?;
            let mut table = Table::new();
            table.set_header(vec!["Domain", "Zone file"]);
            for (domain, file) in &domains {
                table.add_row(vec![domain.clone(), file.display().to_string()]);
            }
            println!("{}", table);
        }
        ZoneCommands::Add { domain, ns1, ns2 } => {
            let zone_file = authority.add_domain(&domain, &ns1, &ns2)?;
            println!(
                "domain {} added with nameservers {} and {} ({})",
                domain.green(),
                ns1,
                ns2,
                zone_file.display()
            );
        }
        ZoneCommands::Delete { domain } => {
            authority.delete_domain(&domain)?;
            println!("domain {} deleted", domain.green());
        }
    }
    Ok(())
}

fn record_command(ctx: BindContext, action: RecordCommands) -> Result<(), Box<dyn std::error::Error>> {
    let manager = RecordManager::new(ctx);
    match action {
        RecordCommands::List { domain } => {
            let records = manager.records(&domain)?;
            let mut table = Table::new();
            table.set_header(vec!["Name", "TTL", "Type", "Value"]);
            for record in &records {
                table.add_row(vec![
                    record.name.clone(),
                    record.ttl.to_string(),
                    record.rtype.to_string(),
                    record.value.clone(),
                ]);
            }
            println!("{}", table);
        }
        RecordCommands::Add {
            domain,
            name,
            rtype,
            value,
            ttl,
        } => {
            let rtype: RecordType = rtype.parse()?;
            manager.add(&domain, rtype, &name, &value, ttl)?;
            println!("record added to {}", domain.green());
        }
        RecordCommands::Delete {
            domain,
            name,
            rtype,
            value,
        } => {
            let rtype: RecordType = rtype.parse()?;
            manager.delete(&domain, &name, rtype, &value)?;
            println!("record deleted from {}", domain.green());
        }
    }
    Ok(())
}

fn service_command(ctx: BindContext, action: ServiceCommands) -> Result<(), Box<dyn std::error::Error>> {
    let service = ServiceManager::new(ctx.service);
    match action {
        ServiceCommands::Reload => {
            service.reload()?;
            println!("configuration reloaded via {}", "rndc reload".green());
        }
        ServiceCommands::Start => {
            service.start()?;
            println!("service {}", "started".green());
        }
        ServiceCommands::Stop => {
            service.stop()?;
            println!("service {}", "stopped".yellow());
        }
        ServiceCommands::Restart => {
            service.restart()?;
            println!("service {}", "restarted".green());
        }
        ServiceCommands::Status => {
            let state = service.status()?;
            let colored_state = if state == "active" {
                state.green()
            } else {
                state.red()
            };
            println!("{}", colored_state);
        }
    }
    Ok(())
}
