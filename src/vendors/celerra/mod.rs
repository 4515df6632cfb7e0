//! Celerra/VNX filer checks.
//!
//! The control station runs nas_checkup daily and leaves the report
//! under the script user's home; the check fetches that log over SSH
//! and flags the degraded component lines.

pub mod checks;
pub mod parser;

use crate::config::DeviceConfig;
use crate::error::Result;
use crate::report::CheckStatus;
use crate::transport::{Command, CommandRunner, RetryRunner, SshRunner};

const DAILY_LOG: &str = "cat log/daily.log";

/// Run the health check for one filer.
pub async fn check(config: &DeviceConfig) -> Result<CheckStatus> {
    let runner = SshRunner::new(config.ssh_config()?);
    let mut session = RetryRunner::new(&config.name, runner);
    run_checks(&mut session, &config.name).await
}

pub(crate) async fn run_checks<R: CommandRunner>(
    session: &mut RetryRunner<R>,
    device: &str,
) -> Result<CheckStatus> {
    let log = session.run(&Command::show(DAILY_LOG)).await?;
    if !log.is_complete() {
        return Ok(CheckStatus::Unreachable(log.failure_reason().into()));
    }
    let records = parser::components(log.text());
    Ok(CheckStatus::from_faults(checks::health_faults(device, &records)))
}
