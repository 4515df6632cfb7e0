//! Symmetrix/VMAX array checks and inventory.
//!
//! Arrays are interrogated through the locally installed symcli
//! tools; each command string names its own program (`symcfg`,
//! `symmask`, `symdisk`, `symmaskdb`, `symaccess`) with the SID
//! spliced in.

pub mod checks;
pub mod parser;

use std::fmt;

use indexmap::IndexMap;

use crate::config::DeviceConfig;
use crate::error::Result;
use crate::record::{AliasMap, FailedDisk, InitiatorFlags};
use crate::report::CheckStatus;
use crate::transport::{CliRunner, Command, CommandRunner, RetryRunner};

fn symcli_session(config: &DeviceConfig) -> RetryRunner<CliRunner> {
    RetryRunner::new(&config.name, CliRunner::bare())
}

/// Run the health checks for one array. The FA pair table from the
/// device entry is this vendor's expected state.
pub async fn check(config: &DeviceConfig) -> Result<CheckStatus> {
    let mut session = symcli_session(config);
    let pairs = config.fa_pairs.clone().unwrap_or_default();
    run_checks(&mut session, &config.name, &pairs).await
}

pub(crate) async fn run_checks<R: CommandRunner>(
    session: &mut RetryRunner<R>,
    sid: &str,
    pairs: &IndexMap<String, String>,
) -> Result<CheckStatus> {
    let fa_listing = session
        .run(&Command::show(format!("symcfg -sid {sid} list -FA ALL -v")))
        .await?;
    if !fa_listing.is_complete() {
        return Ok(CheckStatus::Unreachable(fa_listing.failure_reason().into()));
    }

    let mut faults = Vec::new();
    faults.extend(checks::director_faults(
        sid,
        &parser::directors(fa_listing.text()),
    ));

    let addr = session
        .run(&Command::show(format!("symcfg -sid {sid} -dir all list -addr")))
        .await?;
    let logins = session
        .run(&Command::show(format!(
            "symmask -sid {sid} -dir all -p all list logins"
        )))
        .await?;
    faults.extend(checks::fa_pair_faults(
        sid,
        pairs,
        &parser::mapped_counts(addr.text()),
        &parser::login_counts(logins.text()),
    ));

    let failed = session
        .run(&Command::show(format!("symdisk -sid {sid} list -fail")))
        .await?;
    let disks = failed_disks(session, sid, &parser::failed_disk_ids(failed.text())).await?;
    faults.extend(checks::failed_disk_faults(sid, &disks));

    let masking = session
        .run(&Command::show(format!(
            "symmaskdb -sid {sid} list database -dir all"
        )))
        .await?;
    faults.extend(checks::masking_faults(
        sid,
        &parser::masking_entries(masking.text()),
    ));

    Ok(CheckStatus::from_faults(faults))
}

/// Fetch vendor/product/serial details for each failed spindle.
async fn failed_disks<R: CommandRunner>(
    session: &mut RetryRunner<R>,
    sid: &str,
    ids: &[String],
) -> Result<Vec<FailedDisk>> {
    let mut disks = Vec::with_capacity(ids.len());
    for id in ids {
        let detail = session
            .run(&Command::show(format!("symdisk -sid {sid} show {id}")))
            .await?;
        let (vendor, product, serial) = parser::disk_details(detail.text());
        disks.push(FailedDisk {
            id: id.clone(),
            vendor,
            product,
            serial,
        });
    }
    Ok(disks)
}

/// Inventory listing for one array: initiator flag overrides.
#[derive(Debug, Clone, Default)]
pub struct SymInventory {
    pub flag_overrides: Vec<InitiatorFlags>,
}

impl fmt::Display for SymInventory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "initiator flag overrides:")?;
        for group in &self.flag_overrides {
            let flags = if group.flags.is_empty() {
                "none".to_string()
            } else {
                group.flags.join(" ")
            };
            write!(f, "\n    {:<15} - {flags}", group.group.to_uppercase())?;
        }
        Ok(())
    }
}

/// Collect the initiator-group flag overrides for one array.
pub async fn inventory(config: &DeviceConfig) -> Result<SymInventory> {
    let mut session = symcli_session(config);
    collect_inventory(&mut session, &config.name).await
}

pub(crate) async fn collect_inventory<R: CommandRunner>(
    session: &mut RetryRunner<R>,
    sid: &str,
) -> Result<SymInventory> {
    let listing = session
        .run(&Command::show(format!(
            "symaccess -sid {sid} list -type initiator -output xml"
        )))
        .await?;
    let mut flag_overrides = Vec::new();
    for group in parser::initiator_groups(listing.text())? {
        let detail = session
            .run(&Command::show(format!(
                "symaccess -sid {sid} -type initiator -detail show {group} -output xml"
            )))
            .await?;
        flag_overrides.push(parser::flag_overrides(detail.text(), &group)?);
    }
    Ok(SymInventory { flag_overrides })
}

/// Build the friendly-name rename commands for logged-in HBAs whose
/// node name is still the bare WWN. `aliases` maps switch fcalias
/// names to colon-free WWNs; the alias's fabric suffix separator
/// becomes the name/HBA separator symcli expects.
pub async fn rename_plan(config: &DeviceConfig, aliases: &AliasMap) -> Result<Vec<String>> {
    let mut session = symcli_session(config);
    let sid = config.name.clone();
    let listing = session
        .run(&Command::show(format!("symaccess -sid {sid} list logins")))
        .await?;
    Ok(rename_commands(&sid, listing.text(), aliases))
}

pub(crate) fn rename_commands(sid: &str, logins_output: &str, aliases: &AliasMap) -> Vec<String> {
    parser::logins(logins_output)
        .iter()
        .filter(|login| login.logged_in && login.wwn == login.node_name)
        .filter_map(|login| {
            let (name, _) = aliases.iter().find(|(_, wwn)| **wwn == login.wwn)?;
            Some(format!(
                "symmask -sid {sid} -wwn {} rename {}",
                login.wwn,
                name.replace('_', "/")
            ))
        })
        .collect()
}
