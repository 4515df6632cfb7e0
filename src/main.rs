//! sanwatch command line interface.

use std::path::PathBuf;
use std::process::ExitCode;
use std::time::Duration;

use clap::{Parser, Subcommand};
use log::debug;

use sanwatch::config::FleetConfig;
use sanwatch::device::DeviceKind;
use sanwatch::expected::ExpectedState;
use sanwatch::reconcile::read_id_file;
use sanwatch::record::AliasMap;
use sanwatch::report::print_reports;
use sanwatch::run::{RunOptions, check_fleet};
use sanwatch::vendors::{cisco, clariion, svc, symmetrix};
use sanwatch::{Error, Result};

#[derive(Parser)]
#[command(name = "sanwatch", version, about = "SAN fleet health checks and inventory")]
struct Cli {
    /// Fleet configuration file
    #[arg(long, default_value = "fleet.toml")]
    config: PathBuf,

    /// Restrict the run to one named device
    #[arg(long)]
    device: Option<String>,

    /// Check this many devices concurrently
    #[arg(long)]
    parallel: Option<usize>,

    /// Hard per-device deadline in seconds
    #[arg(long)]
    deadline: Option<u64>,

    #[command(subcommand)]
    command: Option<Action>,
}

#[derive(Subcommand)]
enum Action {
    /// Run the health checks (the default)
    Check,
    /// Save switch running-configs to dated files
    Backup,
    /// Archive switch licenses to bootflash and a local dated file
    LicenseBackup,
    /// Print uptime, zoning, and LUN inventory listings
    Inventory,
    /// Print symmask rename commands for unnamed WWNs
    WwnNames,
    /// Print the active zones a host is a member of
    HostZoning {
        /// Host name to look for in zone memberships
        host: String,
    },
    /// Fetch performance archives missing from the archive directory
    CollectNars,
    /// Start the next stopped metro-mirror consistency group
    SyncNext,
}

#[tokio::main]
async fn main() -> ExitCode {
    env_logger::init();
    let cli = Cli::parse();
    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("sanwatch: {e}");
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: Cli) -> Result<()> {
    let fleet = FleetConfig::load(&cli.config)?;
    let devices = fleet.select(cli.device.as_deref())?;
    let expected = ExpectedState::default();

    match cli.command.unwrap_or(Action::Check) {
        Action::Check => {
            let options = RunOptions {
                parallel: cli.parallel,
                deadline: cli.deadline.map(Duration::from_secs),
            };
            let reports = check_fleet(&devices, &expected, &options).await;
            print_reports(&reports);
        }

        Action::Backup => {
            let dir = fleet.backup_dir.clone().unwrap_or_else(|| PathBuf::from("."));
            for device in kind(&devices, DeviceKind::CiscoSwitch) {
                let path = cisco::backup(device, &dir).await?;
                println!("{}: saved {}", device.name, path.display());
            }
        }

        Action::LicenseBackup => {
            let dir = fleet.backup_dir.clone().unwrap_or_else(|| PathBuf::from("."));
            for device in kind(&devices, DeviceKind::CiscoSwitch) {
                let path = cisco::license_backup(device, &dir).await?;
                println!("{}: saved {}", device.name, path.display());
            }
        }

        Action::Inventory => {
            let remediated = remediated_hosts(&fleet)?;
            for device in &devices {
                println!("=== {} ===", device.name.to_uppercase());
                match device.kind {
                    DeviceKind::CiscoSwitch => {
                        println!("{}", cisco::inventory(device).await?);
                    }
                    DeviceKind::SvcCluster => {
                        println!("{}", svc::inventory(device, &expected, &remediated).await?);
                    }
                    DeviceKind::Symmetrix => {
                        println!("{}", symmetrix::inventory(device).await?);
                    }
                    _ => println!("no inventory listing for {}", device.kind),
                }
            }
        }

        Action::WwnNames => {
            let mut aliases = AliasMap::new();
            for device in kind(&devices, DeviceKind::CiscoSwitch) {
                aliases.extend(cisco::host_aliases(device).await?);
            }
            debug!("{} host aliases collected", aliases.len());
            for device in kind(&devices, DeviceKind::Symmetrix) {
                for command in symmetrix::rename_plan(device, &aliases).await? {
                    println!("{command}");
                }
            }
        }

        Action::HostZoning { host } => {
            for device in kind(&devices, DeviceKind::CiscoSwitch) {
                for zone in cisco::host_zoning(device, &host).await? {
                    println!(
                        "{}: {} (vsan {}, zoneset {})",
                        device.name, zone.zone, zone.vsan, zone.zoneset
                    );
                }
            }
        }

        Action::CollectNars => {
            let dir = fleet.archive_dir.clone().unwrap_or_else(|| PathBuf::from("."));
            for device in kind(&devices, DeviceKind::Clariion) {
                let fetched = clariion::collect_nars(device, &dir).await?;
                println!("{}: fetched {} archives", device.name, fetched.len());
            }
        }

        Action::SyncNext => {
            for device in kind(&devices, DeviceKind::SvcCluster) {
                let action = svc::sync_next(device).await?;
                println!("{}: {action}", device.name);
            }
        }
    }

    Ok(())
}

fn kind<'a>(
    devices: &'a [&'a sanwatch::DeviceConfig],
    kind: DeviceKind,
) -> impl Iterator<Item = &'a sanwatch::DeviceConfig> {
    devices.iter().copied().filter(move |d| d.kind == kind)
}

fn remediated_hosts(fleet: &FleetConfig) -> Result<Vec<String>> {
    match &fleet.remediated_hosts {
        None => Ok(Vec::new()),
        Some(path) => read_id_file(path).map_err(|source| {
            Error::Config(sanwatch::error::ConfigError::Read {
                path: path.clone(),
                source,
            })
        }),
    }
}
