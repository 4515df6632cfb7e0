//! Cisco MDS switch checks and inventory.
//!
//! A switch is interrogated over SSH with a fixed sequence of show
//! commands. The first command doubles as the reachability test: if
//! it degrades to a soft failure the switch is reported unreachable
//! and no further commands are issued.

pub mod checks;
pub mod parser;

use std::fmt;
use std::path::{Path, PathBuf};

use log::{debug, info};
use time::OffsetDateTime;
use time::macros::format_description;

use crate::config::DeviceConfig;
use crate::error::{ReportError, Result};
use crate::expected::ExpectedState;
use crate::reconcile::set_difference;
use crate::record::{AliasMap, ZoneMembership};
use crate::report::CheckStatus;
use crate::transport::{Command, CommandRunner, RetryRunner, SshRunner};

/// Run the health checks for one switch.
pub async fn check(config: &DeviceConfig, expected: &ExpectedState) -> Result<CheckStatus> {
    let runner = SshRunner::new(config.ssh_config()?);
    let mut session = RetryRunner::new(&config.name, runner);
    run_checks(&mut session, &config.name, expected).await
}

pub(crate) async fn run_checks<R: CommandRunner>(
    session: &mut RetryRunner<R>,
    device: &str,
    expected: &ExpectedState,
) -> Result<CheckStatus> {
    let power = session.run(&Command::show("show environment power")).await?;
    if !power.is_complete() {
        return Ok(CheckStatus::Unreachable(power.failure_reason().into()));
    }

    let mut faults = Vec::new();
    faults.extend(checks::power_supply_faults(
        device,
        &parser::power_supplies(power.text()),
        expected,
    ));
    faults.extend(checks::chassis_module_faults(
        device,
        &parser::chassis_modules(power.text()),
        expected,
    ));

    let modules = session.run(&Command::show("show module")).await?;
    faults.extend(checks::fc_module_faults(
        device,
        &parser::fc_modules(modules.text()),
        expected,
    ));
    faults.extend(checks::supervisor_faults(
        device,
        &parser::supervisors(modules.text()),
        expected,
    ));

    let health = session
        .run(&Command::show("show system health statistics"))
        .await?;
    faults.extend(checks::bootflash_faults(
        device,
        &parser::bootflash(health.text()),
        expected,
    ));

    let brief = session.run(&Command::show("show interface brief")).await?;
    let described = session
        .run(&Command::show("show interface description"))
        .await?;
    let ports = parser::ports(brief.text());
    faults.extend(checks::port_faults(
        device,
        &ports,
        &parser::port_descriptions(described.text()),
        expected,
    ));
    faults.extend(checks::isl_faults(device, &ports, expected));

    debug!("{device}: {} faults", faults.len());
    Ok(CheckStatus::from_faults(faults))
}

/// Write the switch running-config to a dated file under `dir`.
pub async fn backup(config: &DeviceConfig, dir: &Path) -> Result<PathBuf> {
    let runner = SshRunner::new(config.ssh_config()?);
    let mut session = RetryRunner::new(&config.name, runner);
    let output = session.run(&Command::show("show running-config")).await?;

    let path = dir.join(format!("{}-{}.cfg", config.name, day_stamp(dir)?));
    std::fs::write(&path, output.text()).map_err(|source| ReportError::Write {
        path: path.clone(),
        source,
    })?;
    info!("{}: running-config saved to {}", config.name, path.display());
    Ok(path)
}

/// Archive the switch licenses: a tar kept on the switch bootflash,
/// plus the installed license text saved to a dated file under `dir`.
pub async fn license_backup(config: &DeviceConfig, dir: &Path) -> Result<PathBuf> {
    let runner = SshRunner::new(config.ssh_config()?);
    let mut session = RetryRunner::new(&config.name, runner);
    run_license_backup(&mut session, &config.name, dir).await
}

pub(crate) async fn run_license_backup<R: CommandRunner>(
    session: &mut RetryRunner<R>,
    name: &str,
    dir: &Path,
) -> Result<PathBuf> {
    // The tar create mutates bootflash and runs at most once.
    session
        .run(&Command::mutating(format!(
            "copy licenses bootflash:license_{name}.tar"
        )))
        .await?;
    let listing = session.run(&Command::show("show license")).await?;

    let path = dir.join(format!("{name}-licenses-{}.txt", day_stamp(dir)?));
    std::fs::write(&path, listing.text()).map_err(|source| ReportError::Write {
        path: path.clone(),
        source,
    })?;
    info!("{name}: licenses saved to {}", path.display());
    Ok(path)
}

/// Today's date as a compact file-name stamp.
fn day_stamp(dir: &Path) -> Result<String> {
    OffsetDateTime::now_utc()
        .format(format_description!("[year][month][day]"))
        .map_err(|e| {
            ReportError::Write {
                path: dir.to_path_buf(),
                source: std::io::Error::other(e),
            }
            .into()
        })
}

/// Point-in-time listing of a switch beyond pass/fail health.
#[derive(Debug, Clone, Default)]
pub struct SwitchInventory {
    pub version: Option<String>,
    pub uptime: Option<String>,
    pub clock: Option<String>,
    pub snmp_hosts: Vec<String>,
    /// Zones defined but absent from the active zoneset.
    pub inactive_zones: Vec<String>,
    /// Device aliases with no matching fabric login.
    pub stale_aliases: Vec<String>,
}

impl fmt::Display for SwitchInventory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "version: {}", self.version.as_deref().unwrap_or("unknown"))?;
        writeln!(f, "uptime: {}", self.uptime.as_deref().unwrap_or("unknown"))?;
        writeln!(f, "clock: {}", self.clock.as_deref().unwrap_or("unknown"))?;
        writeln!(f, "snmp hosts: {}", self.snmp_hosts.join(", "))?;
        writeln!(f, "inactive zones: {}", self.inactive_zones.join(", "))?;
        write!(f, "stale aliases: {}", self.stale_aliases.join(", "))
    }
}

/// Collect the switch inventory listing.
pub async fn inventory(config: &DeviceConfig) -> Result<SwitchInventory> {
    let runner = SshRunner::new(config.ssh_config()?);
    let mut session = RetryRunner::new(&config.name, runner);
    collect_inventory(&mut session).await
}

pub(crate) async fn collect_inventory<R: CommandRunner>(
    session: &mut RetryRunner<R>,
) -> Result<SwitchInventory> {
    let version = session.run(&Command::show("show version")).await?;
    let uptime = session.run(&Command::show("show system uptime")).await?;
    let clock = session.run(&Command::show("show clock")).await?;
    let snmp = session.run(&Command::show("show snmp host")).await?;
    let active = session.run(&Command::show("show zoneset active")).await?;
    let all = session.run(&Command::show("show zone")).await?;
    let flogi = session.run(&Command::show("show flogi database")).await?;
    let aliases = session
        .run(&Command::show("show device-alias database"))
        .await?;

    let all_zones = parser::zone_names(all.text());
    let active_zones = parser::zone_names(active.text());
    let defined: Vec<String> = parser::device_aliases(aliases.text())
        .into_keys()
        .collect();
    let logged_in: Vec<String> = parser::flogi_aliases(flogi.text()).into_keys().collect();

    Ok(SwitchInventory {
        version: parser::system_version(version.text()),
        uptime: parser::uptime(uptime.text()),
        clock: parser::clock(clock.text()),
        snmp_hosts: parser::snmp_hosts(snmp.text()),
        inactive_zones: set_difference(&all_zones, &active_zones),
        stale_aliases: set_difference(&defined, &logged_in),
    })
}

/// Active zones whose membership names the given host.
pub async fn host_zoning(config: &DeviceConfig, host: &str) -> Result<Vec<ZoneMembership>> {
    let runner = SshRunner::new(config.ssh_config()?);
    let mut session = RetryRunner::new(&config.name, runner);
    let active = session.run(&Command::show("show zoneset active")).await?;
    Ok(zones_for_host(active.text(), host))
}

pub(crate) fn zones_for_host(zoneset_output: &str, host: &str) -> Vec<ZoneMembership> {
    let needle = host.to_ascii_lowercase();
    parser::zoneset(zoneset_output)
        .into_iter()
        .filter(|zone| {
            zone.members
                .iter()
                .any(|m| m.member.to_ascii_lowercase().contains(&needle))
        })
        .collect()
}

/// Host fcalias names mapped to their bare (colon-free) WWNs, for
/// cross-referencing against Symmetrix login records.
pub async fn host_aliases(config: &DeviceConfig) -> Result<AliasMap> {
    let runner = SshRunner::new(config.ssh_config()?);
    let mut session = RetryRunner::new(&config.name, runner);
    let running = session.run(&Command::show("show running-config")).await?;
    Ok(parser::fcaliases(running.text()))
}
