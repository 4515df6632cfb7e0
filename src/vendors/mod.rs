//! Per-vendor parsers and checks.
//!
//! Each vendor module follows the same split: `parser` converts raw
//! command output into typed records with no I/O, `checks` applies
//! the expected-state rules to those records, and the module root
//! drives the device's command sequence.

pub mod celerra;
pub mod cisco;
pub mod clariion;
pub mod scan;
pub mod svc;
pub mod symmetrix;

#[cfg(test)]
pub(crate) mod testing;

use crate::config::DeviceConfig;
use crate::device::DeviceKind;
use crate::expected::ExpectedState;
use crate::report::{CheckStatus, DeviceReport};

/// Run the health checks for one device and fold the outcome into a
/// report. Transport failures become an `Unreachable` status; they
/// never abort the fleet run.
pub async fn check_device(config: &DeviceConfig, expected: &ExpectedState) -> DeviceReport {
    let result = match config.kind {
        DeviceKind::CiscoSwitch => cisco::check(config, expected).await,
        DeviceKind::Clariion => clariion::check(config, expected).await,
        DeviceKind::Celerra => celerra::check(config).await,
        DeviceKind::SvcCluster => svc::check(config).await,
        DeviceKind::Symmetrix => symmetrix::check(config).await,
    };

    let status = match result {
        Ok(status) => status,
        Err(e) => CheckStatus::Unreachable(e.to_string()),
    };

    DeviceReport {
        device: config.name.clone(),
        status,
    }
}
