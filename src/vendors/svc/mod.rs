//! IBM SVC cluster checks and inventory.
//!
//! Clusters are reached through the local `svc` wrapper CLI; every
//! command runs as `svc <cluster> i <subcommand>`. Health is the per
//! host path state; the inventory side reconciles vdisk mappings and
//! flags LUN consolidation candidates.

pub mod checks;
pub mod parser;

use std::fmt;

use log::info;

use crate::config::DeviceConfig;
use crate::error::Result;
use crate::expected::ExpectedState;
use crate::reconcile::{set_difference, set_difference_ci};
use crate::record::{RemoteCopyGroup, VdiskInfo};
use crate::report::CheckStatus;
use crate::transport::{CliRunner, Command, CommandRunner, RetryRunner};

fn cluster_session(config: &DeviceConfig) -> RetryRunner<CliRunner> {
    let runner = CliRunner::with_prefix("svc", [config.address().to_string(), "i".to_string()]);
    RetryRunner::new(&config.name, runner)
}

/// Session for task subcommands (`svc <cluster> t <subcommand>`).
fn task_session(config: &DeviceConfig) -> RetryRunner<CliRunner> {
    let runner = CliRunner::with_prefix("svc", [config.address().to_string(), "t".to_string()]);
    RetryRunner::new(&config.name, runner)
}

/// Run the health checks for one cluster.
pub async fn check(config: &DeviceConfig) -> Result<CheckStatus> {
    let mut session = cluster_session(config);
    run_checks(&mut session, &config.name).await
}

pub(crate) async fn run_checks<R: CommandRunner>(
    session: &mut RetryRunner<R>,
    device: &str,
) -> Result<CheckStatus> {
    let listing = session.run(&Command::show("lshost -nohdr -delim :")).await?;
    if !listing.is_complete() {
        return Ok(CheckStatus::Unreachable(listing.failure_reason().into()));
    }

    let mut faults = Vec::new();
    for host in parser::host_names(listing.text()) {
        let detail = session.run(&Command::show(format!("lshost {host}"))).await?;
        let ports = parser::host_ports(detail.text());
        faults.extend(checks::host_faults(device, &host, &ports));
    }
    Ok(CheckStatus::from_faults(faults))
}

/// What a sync kick decided to do with the metro-mirror groups.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SyncAction {
    /// This group is still copying; nothing started.
    Copying(String),
    /// Every metro-mirror group is synchronized; nothing left to do.
    Synchronized,
    /// Start this group, with `-force` when it was idling.
    Start { group: String, force: bool },
}

impl fmt::Display for SyncAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SyncAction::Copying(group) => write!(f, "{group} is still copying"),
            SyncAction::Synchronized => write!(f, "all groups synchronized"),
            SyncAction::Start { group, .. } => write!(f, "started {group}"),
        }
    }
}

/// Pick the next metro-mirror group to start. Nothing starts while a
/// group is copying; a stopped group starts plainly, an idling one
/// needs `-force`.
pub fn next_sync_action(groups: &[RemoteCopyGroup]) -> SyncAction {
    if let Some(group) = groups.iter().find(|g| g.state.contains("copying")) {
        return SyncAction::Copying(group.name.clone());
    }
    for group in groups {
        if group.state.contains("synchronized") {
            continue;
        }
        if group.state.contains("inconsistent_stopped") {
            return SyncAction::Start {
                group: group.name.clone(),
                force: false,
            };
        }
        if group.state.contains("idling") {
            return SyncAction::Start {
                group: group.name.clone(),
                force: true,
            };
        }
    }
    SyncAction::Synchronized
}

/// Kick the next metro-mirror consistency group on one cluster. The
/// start command is mutating and runs at most once.
pub async fn sync_next(config: &DeviceConfig) -> Result<SyncAction> {
    let mut info = cluster_session(config);
    let mut task = task_session(config);
    run_sync_next(&mut info, &mut task, &config.name).await
}

pub(crate) async fn run_sync_next<R: CommandRunner>(
    info: &mut RetryRunner<R>,
    task: &mut RetryRunner<R>,
    device: &str,
) -> Result<SyncAction> {
    let listing = info
        .run(&Command::show("lsrcconsistgrp -nohdr -delim :"))
        .await?;
    let action = next_sync_action(&parser::metro_mirror_groups(listing.text()));
    if let SyncAction::Start { group, force } = &action {
        let flags = if *force { "-force " } else { "" };
        task.run(&Command::mutating(format!(
            "startrcconsistgrp {flags}-primary master {group}"
        )))
        .await?;
        info!("{device}: started remote copy group {group}");
    }
    Ok(action)
}

/// A host holding enough small LUNs to be worth consolidating.
#[derive(Debug, Clone, PartialEq)]
pub struct ConsolidationCandidate {
    pub host: String,
    /// The host's vdisks at or under the size threshold.
    pub vdisks: Vec<VdiskInfo>,
}

impl fmt::Display for ConsolidationCandidate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} has {} small LUNs", self.host, self.vdisks.len())
    }
}

/// Inventory listing for one cluster.
#[derive(Debug, Clone, Default)]
pub struct SvcInventory {
    /// Vdisks mapped to no host.
    pub unmapped_vdisks: Vec<String>,
    pub consolidation: Vec<ConsolidationCandidate>,
}

impl fmt::Display for SvcInventory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "unmapped vdisks: {}", self.unmapped_vdisks.join(", "))?;
        write!(f, "consolidation candidates:")?;
        for candidate in &self.consolidation {
            write!(f, "\n    {candidate}")?;
        }
        Ok(())
    }
}

/// Collect the cluster inventory. `remediated` names hosts already
/// consolidated; they are excluded from candidate selection.
pub async fn inventory(
    config: &DeviceConfig,
    expected: &ExpectedState,
    remediated: &[String],
) -> Result<SvcInventory> {
    let mut session = cluster_session(config);
    collect_inventory(&mut session, expected, remediated).await
}

pub(crate) async fn collect_inventory<R: CommandRunner>(
    session: &mut RetryRunner<R>,
    expected: &ExpectedState,
    remediated: &[String],
) -> Result<SvcInventory> {
    let hosts = session.run(&Command::show("lshost -nohdr -delim :")).await?;
    let disks = session.run(&Command::show("lsvdisk -nohdr -delim :")).await?;
    let maps = session
        .run(&Command::show("lshostvdiskmap -nohdr -delim :"))
        .await?;

    let vdisks = parser::vdisks(disks.text());
    let all_names: Vec<String> = vdisks.iter().map(|v| v.name.clone()).collect();
    let mapped = parser::mapped_vdisk_names(maps.text());

    Ok(SvcInventory {
        unmapped_vdisks: set_difference(&all_names, &mapped),
        consolidation: consolidation_candidates(
            &parser::host_names(hosts.text()),
            &vdisks,
            remediated,
            expected,
        ),
    })
}

/// Hosts, excluding the remediated set, whose name appears in more
/// than the threshold count of vdisks at or under the size limit.
pub fn consolidation_candidates(
    hosts: &[String],
    vdisks: &[VdiskInfo],
    remediated: &[String],
    expected: &ExpectedState,
) -> Vec<ConsolidationCandidate> {
    let mut hosts = set_difference_ci(hosts, remediated);
    hosts.sort();
    hosts
        .into_iter()
        .filter_map(|host| {
            let small: Vec<VdiskInfo> = vdisks
                .iter()
                .filter(|v| v.capacity_gb <= expected.consolidation_max_gb)
                .filter(|v| v.name.contains(&host))
                .cloned()
                .collect();
            if small.len() > expected.consolidation_min_luns {
                Some(ConsolidationCandidate { host, vdisks: small })
            } else {
                None
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::vendors::testing::{MockRunner, fast_policy};

    #[tokio::test]
    async fn test_healthy_cluster_is_clean() {
        let runner = MockRunner::new()
            .reply("lshost -nohdr -delim :", "0:host01:2:4:online\n")
            .reply("lshost host01", "WWPN 2100001B329C1234\nstate active\n");
        let mut session = RetryRunner::new("is3501", runner);
        let status = run_checks(&mut session, "is3501").await.unwrap();
        assert_eq!(status, CheckStatus::Clean);
    }

    #[tokio::test]
    async fn test_offline_host_faults() {
        let runner = MockRunner::new()
            .reply("lshost -nohdr -delim :", "0:host01:2:4:offline\n")
            .reply("lshost host01", "WWPN 2100001B329C1234\nstate offline\n");
        let mut session = RetryRunner::new("is3501", runner);
        match run_checks(&mut session, "is3501").await.unwrap() {
            CheckStatus::Faulted(faults) => {
                assert_eq!(faults.len(), 1);
                assert_eq!(faults[0].subject, "host01");
            }
            other => panic!("expected faults, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_unreachable_cluster() {
        let mut session =
            RetryRunner::new("is3501", MockRunner::new()).with_policy(fast_policy());
        let status = run_checks(&mut session, "is3501").await.unwrap();
        assert!(matches!(status, CheckStatus::Unreachable(_)));
    }

    fn group(name: &str, state: &str) -> RemoteCopyGroup {
        RemoteCopyGroup {
            name: name.into(),
            state: state.into(),
        }
    }

    #[test]
    fn test_nothing_starts_while_a_group_is_copying() {
        let groups = vec![
            group("mmgrp01", "inconsistent_copying"),
            group("mmgrp02", "inconsistent_stopped"),
        ];
        assert_eq!(
            next_sync_action(&groups),
            SyncAction::Copying("mmgrp01".into())
        );
    }

    #[test]
    fn test_stopped_group_starts_and_idling_needs_force() {
        let groups = vec![
            group("mmgrp01", "consistent_synchronized"),
            group("mmgrp02", "inconsistent_stopped"),
        ];
        assert_eq!(
            next_sync_action(&groups),
            SyncAction::Start { group: "mmgrp02".into(), force: false }
        );

        let groups = vec![group("mmgrp03", "idling")];
        assert_eq!(
            next_sync_action(&groups),
            SyncAction::Start { group: "mmgrp03".into(), force: true }
        );

        let groups = vec![group("mmgrp01", "consistent_synchronized")];
        assert_eq!(next_sync_action(&groups), SyncAction::Synchronized);
    }

    #[tokio::test]
    async fn test_sync_next_issues_one_start_command() {
        let mut info = RetryRunner::new(
            "is3501",
            MockRunner::new().reply(
                "lsrcconsistgrp -nohdr -delim :",
                "0:mmgrp01:0:clusA:1:clusB:master:inconsistent_stopped:4:metro\n",
            ),
        );
        let mut task = RetryRunner::new(
            "is3501",
            MockRunner::new().reply("startrcconsistgrp -primary master mmgrp01", ""),
        );
        let action = run_sync_next(&mut info, &mut task, "is3501").await.unwrap();
        assert_eq!(
            action,
            SyncAction::Start { group: "mmgrp01".into(), force: false }
        );
        assert_eq!(
            task.inner().calls,
            vec!["startrcconsistgrp -primary master mmgrp01"]
        );
    }

    #[tokio::test]
    async fn test_sync_next_leaves_copying_groups_alone() {
        let mut info = RetryRunner::new(
            "is3501",
            MockRunner::new().reply(
                "lsrcconsistgrp -nohdr -delim :",
                "0:mmgrp01:0:clusA:1:clusB:master:inconsistent_copying:4:metro\n",
            ),
        );
        let mut task = RetryRunner::new("is3501", MockRunner::new());
        let action = run_sync_next(&mut info, &mut task, "is3501").await.unwrap();
        assert_eq!(action, SyncAction::Copying("mmgrp01".into()));
        assert!(task.inner().calls.is_empty());
    }

    fn vdisk(name: &str, capacity_gb: f64) -> VdiskInfo {
        VdiskInfo {
            name: name.into(),
            capacity_gb,
            uid: None,
        }
    }

    #[test]
    fn test_consolidation_thresholds() {
        let expected = ExpectedState::default();
        let hosts = vec!["host01".to_string(), "host02".to_string()];
        let mut vdisks: Vec<VdiskInfo> =
            (0..11).map(|i| vdisk(&format!("host01_d{i:02}"), 20.0)).collect();
        vdisks.push(vdisk("host02_d01", 20.0));
        vdisks.push(vdisk("host02_big", 500.0));

        let candidates = consolidation_candidates(&hosts, &vdisks, &[], &expected);
        assert_eq!(candidates.len(), 1);
        assert_eq!(candidates[0].host, "host01");
        assert_eq!(candidates[0].vdisks.len(), 11);
    }

    #[test]
    fn test_remediated_hosts_are_excluded() {
        let expected = ExpectedState::default();
        let hosts = vec!["host01".to_string()];
        let vdisks: Vec<VdiskInfo> =
            (0..11).map(|i| vdisk(&format!("host01_d{i:02}"), 20.0)).collect();
        let remediated = vec!["HOST01".to_string()];
        assert!(consolidation_candidates(&hosts, &vdisks, &remediated, &expected).is_empty());
    }

    #[tokio::test]
    async fn test_inventory_reconciles_unmapped_vdisks() {
        let runner = MockRunner::new()
            .reply("lshost -nohdr -delim :", "0:host01:2:4:online\n")
            .reply(
                "lsvdisk -nohdr -delim :",
                "0:host01_d01:0:io_grp0:online:1:pool1:25.0GB\n1:orphan_d01:0:io_grp0:online:1:pool1:25.0GB\n",
            )
            .reply(
                "lshostvdiskmap -nohdr -delim :",
                "0:host01:0:12:host01_d01:600507:0\n",
            );
        let mut session = RetryRunner::new("is3501", runner);
        let inventory = collect_inventory(&mut session, &ExpectedState::default(), &[])
            .await
            .unwrap();
        assert_eq!(inventory.unmapped_vdisks, vec!["orphan_d01"]);
    }
}
