//! Clariion/VNX block array checks via naviseccli.
//!
//! The array is reached through either storage processor. Commands go
//! to SPA first; once SPA stops answering the session fails over to
//! SPB for the rest of the run.

pub mod checks;
pub mod parser;

use std::path::{Path, PathBuf};

use log::{info, warn};
use time::{OffsetDateTime, PrimitiveDateTime};

use crate::config::DeviceConfig;
use crate::error::Result;
use crate::expected::ExpectedState;
use crate::reconcile::set_difference_ci;
use crate::report::CheckStatus;
use crate::transport::{CliRunner, Command, CommandOutcome, CommandRunner, RetryRunner};

/// Runs each command against SPA, falling over to SPB when SPA
/// degrades to a soft failure. The failover is sticky for the rest of
/// the session.
pub(crate) struct SpSession<R> {
    primary: RetryRunner<R>,
    secondary: RetryRunner<R>,
    device: String,
    failed_over: bool,
}

impl<R: CommandRunner> SpSession<R> {
    pub(crate) fn new(device: impl Into<String>, primary: RetryRunner<R>, secondary: RetryRunner<R>) -> Self {
        Self {
            primary,
            secondary,
            device: device.into(),
            failed_over: false,
        }
    }

    pub(crate) async fn run(&mut self, command: &Command) -> Result<CommandOutcome> {
        if !self.failed_over {
            let outcome = self.primary.run(command).await?;
            if outcome.is_complete() {
                return Ok(outcome);
            }
            warn!("{}: no response from SPA, failing over to SPB", self.device);
            self.failed_over = true;
        }
        self.secondary.run(command).await
    }
}

fn sp_session(config: &DeviceConfig) -> SpSession<CliRunner> {
    let runner = |sp: &str| {
        CliRunner::with_prefix("naviseccli", ["-h".to_string(), format!("{}_{sp}", config.address())])
    };
    SpSession::new(
        &config.name,
        RetryRunner::new(format!("{}_spa", config.name), runner("spa")),
        RetryRunner::new(format!("{}_spb", config.name), runner("spb")),
    )
}

/// Run the health checks for one array.
pub async fn check(config: &DeviceConfig, expected: &ExpectedState) -> Result<CheckStatus> {
    let mut session = sp_session(config);
    let now = OffsetDateTime::now_utc();
    run_checks(&mut session, &config.name, expected, PrimitiveDateTime::new(now.date(), now.time())).await
}

pub(crate) async fn run_checks<R: CommandRunner>(
    session: &mut SpSession<R>,
    device: &str,
    expected: &ExpectedState,
    now: PrimitiveDateTime,
) -> Result<CheckStatus> {
    let cache = session
        .run(&Command::show("getcache -state -rsta -rstb -wst"))
        .await?;
    if !cache.is_complete() {
        return Ok(CheckStatus::Unreachable(cache.failure_reason().into()));
    }

    let mut faults = Vec::new();
    faults.extend(checks::cache_faults(
        device,
        &parser::cache(cache.text()),
        expected,
    ));

    let crus = session.run(&Command::show("getcrus")).await?;
    faults.extend(checks::cru_faults(
        device,
        &parser::crus(crus.text()),
        expected,
    ));

    let disks = session.run(&Command::show("getdisk -state")).await?;
    faults.extend(checks::disk_faults(
        device,
        &parser::disks(disks.text()),
        expected,
    ));

    let luns = session
        .run(&Command::show("getlun -state -type -default -owner"))
        .await?;
    let lun_records = parser::luns(luns.text());
    faults.extend(checks::lun_faults(device, &lun_records, expected));
    faults.extend(checks::trespass_faults(device, &lun_records));

    let groups = session.run(&Command::show("getrg -state")).await?;
    faults.extend(checks::raid_group_faults(
        device,
        &parser::raid_groups(groups.text()),
        expected,
    ));

    let times = session.run(&Command::show("getsptime")).await?;
    faults.extend(checks::skew_faults(
        device,
        &parser::sp_times(times.text()),
        now,
        expected,
    ));

    Ok(CheckStatus::from_faults(faults))
}

/// Fetch performance archives the array holds that the local archive
/// directory does not. Returns the names fetched. The copy command
/// mutates remote bookkeeping and is issued at most once.
pub async fn collect_nars(config: &DeviceConfig, archive_dir: &Path) -> Result<Vec<String>> {
    let mut session = sp_session(config);
    let listing = session.run(&Command::show("analyzer -archive -list")).await?;
    let available = parser::nar_archives(listing.text());
    let stored = stored_archives(archive_dir);
    let wanted = set_difference_ci(&available, &stored);
    if wanted.is_empty() {
        return Ok(wanted);
    }

    info!("{}: fetching {} archives", config.name, wanted.len());
    let fetch = format!(
        "analyzer -archive -path {} -file {} -o",
        archive_dir.display(),
        wanted.join(" ")
    );
    session.run(&Command::mutating(fetch)).await?;
    Ok(wanted)
}

/// Archive file names already on disk. A missing directory reads as
/// nothing stored.
fn stored_archives(dir: &Path) -> Vec<String> {
    let Ok(entries) = std::fs::read_dir(dir) else {
        return Vec::new();
    };
    entries
        .filter_map(|entry| entry.ok())
        .map(|entry| PathBuf::from(entry.file_name()))
        .filter(|path| path.extension().is_some_and(|ext| ext == "nar"))
        .filter_map(|path| path.file_name().map(|name| name.to_string_lossy().into_owned()))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::vendors::testing::{MockRunner, fast_policy};
    use time::macros::datetime;

    const CACHE_OK: &str = "SP Read Cache State:  Enabled\nSP Write Cache State:  Enabled\n";

    fn mock_session(primary: MockRunner, secondary: MockRunner) -> SpSession<MockRunner> {
        SpSession::new(
            "array01",
            RetryRunner::new("array01_spa", primary).with_policy(fast_policy()),
            RetryRunner::new("array01_spb", secondary).with_policy(fast_policy()),
        )
    }

    fn healthy_replies(runner: MockRunner) -> MockRunner {
        runner
            .reply("getcache -state -rsta -rstb -wst", CACHE_OK)
            .reply("getcrus", "SP A State:  Present\n")
            .reply("getdisk -state", "Bus 0 Enclosure 0  Disk 0\nState:  Enabled\n")
            .reply(
                "getlun -state -type -default -owner",
                "LOGICAL UNIT NUMBER 1\nState: Bound\nDefault Owner: SP A\nCurrent owner: SP A\nRAID Type: RAID5\n",
            )
            .reply("getrg -state", "RaidGroup ID:  0\nRaidGroup State:  Valid_luns\n")
            .reply("getsptime", "Time on SP A: 05/12/15 10:30:00\n")
    }

    #[tokio::test]
    async fn test_healthy_array_is_clean() {
        let mut session = mock_session(healthy_replies(MockRunner::new()), MockRunner::new());
        let status = run_checks(
            &mut session,
            "array01",
            &ExpectedState::default(),
            datetime!(2015-05-12 10:30:00),
        )
        .await
        .unwrap();
        assert_eq!(status, CheckStatus::Clean);
    }

    #[tokio::test]
    async fn test_spa_failure_fails_over_to_spb() {
        // SPA answers nothing; every command must land on SPB.
        let mut session = mock_session(MockRunner::new(), healthy_replies(MockRunner::new()));
        let status = run_checks(
            &mut session,
            "array01",
            &ExpectedState::default(),
            datetime!(2015-05-12 10:30:00),
        )
        .await
        .unwrap();
        assert_eq!(status, CheckStatus::Clean);
        assert!(session.failed_over);
        assert!(!session.secondary.inner().calls.is_empty());
    }

    #[tokio::test]
    async fn test_both_sps_silent_is_unreachable() {
        let mut session = mock_session(MockRunner::new(), MockRunner::new());
        let status = run_checks(
            &mut session,
            "array01",
            &ExpectedState::default(),
            datetime!(2015-05-12 10:30:00),
        )
        .await
        .unwrap();
        assert!(matches!(status, CheckStatus::Unreachable(_)));
    }

    #[tokio::test]
    async fn test_trespass_and_lun_faults_share_one_query() {
        let runner = healthy_replies(MockRunner::new()).reply(
            "getlun -state -type -default -owner",
            "LOGICAL UNIT NUMBER 7\nState: Faulted\nDefault Owner: SP A\nCurrent owner: SP B\nRAID Type: RAID5\n",
        );
        let mut session = mock_session(runner, MockRunner::new());
        let status = run_checks(
            &mut session,
            "array01",
            &ExpectedState::default(),
            datetime!(2015-05-12 10:30:00),
        )
        .await
        .unwrap();
        match status {
            CheckStatus::Faulted(faults) => {
                assert_eq!(faults.len(), 2);
                assert!(faults[0].description.contains("ALU 7 is Faulted"));
                assert!(faults[1].description.contains("should be on SP A"));
            }
            other => panic!("expected faults, got {other:?}"),
        }
    }
}
