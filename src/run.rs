//! Fleet runner.
//!
//! Devices are checked sequentially by default, or concurrently under
//! a bounded permit count. Either way the reports come back in input
//! order, and a hung or dead device only ever costs its own report.

use std::sync::Arc;
use std::time::Duration;

use log::info;
use tokio::sync::Semaphore;
use tokio::time::timeout;

use crate::config::DeviceConfig;
use crate::expected::ExpectedState;
use crate::report::{CheckStatus, DeviceReport};
use crate::vendors::check_device;

/// How the fleet loop runs.
#[derive(Debug, Clone, Default)]
pub struct RunOptions {
    /// Concurrent device checks; `None` or `Some(1)` is sequential.
    pub parallel: Option<usize>,

    /// Hard per-device deadline on top of the command retry budgets.
    /// `None` waits the retries out.
    pub deadline: Option<Duration>,
}

/// Check every device and return the reports in input order.
pub async fn check_fleet(
    devices: &[&DeviceConfig],
    expected: &ExpectedState,
    options: &RunOptions,
) -> Vec<DeviceReport> {
    info!("checking {} devices", devices.len());
    match options.parallel {
        Some(limit) if limit > 1 => parallel(devices, expected, options.deadline, limit).await,
        _ => {
            let mut reports = Vec::with_capacity(devices.len());
            for device in devices {
                reports.push(check_one(device, expected, options.deadline).await);
            }
            reports
        }
    }
}

async fn parallel(
    devices: &[&DeviceConfig],
    expected: &ExpectedState,
    deadline: Option<Duration>,
    limit: usize,
) -> Vec<DeviceReport> {
    let permits = Arc::new(Semaphore::new(limit));
    let handles: Vec<_> = devices
        .iter()
        .map(|device| {
            let device = (*device).clone();
            let expected = expected.clone();
            let permits = Arc::clone(&permits);
            tokio::spawn(async move {
                let _permit = permits.acquire_owned().await;
                check_one(&device, &expected, deadline).await
            })
        })
        .collect();

    let mut reports = Vec::with_capacity(handles.len());
    for (handle, device) in handles.into_iter().zip(devices) {
        reports.push(handle.await.unwrap_or_else(|e| DeviceReport {
            device: device.name.clone(),
            status: CheckStatus::Unreachable(format!("check task failed: {e}")),
        }));
    }
    reports
}

async fn check_one(
    device: &DeviceConfig,
    expected: &ExpectedState,
    deadline: Option<Duration>,
) -> DeviceReport {
    match deadline {
        None => check_device(device, expected).await,
        Some(limit) => match timeout(limit, check_device(device, expected)).await {
            Ok(report) => report,
            Err(_) => DeviceReport {
                device: device.name.clone(),
                status: CheckStatus::Unreachable(format!("deadline of {limit:?} exceeded")),
            },
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::device::DeviceKind;

    // Clariion checks spawn the naviseccli binary, which is absent in
    // the test environment, so every device comes back unreachable
    // immediately. That is enough to exercise ordering and the
    // one-bad-device isolation.
    fn device(name: &str) -> DeviceConfig {
        DeviceConfig {
            name: name.to_string(),
            kind: DeviceKind::Clariion,
            address: None,
            username: None,
            password_env: None,
            fa_pairs: None,
        }
    }

    #[tokio::test]
    async fn test_sequential_reports_in_input_order() {
        let devices = [device("array02"), device("array01"), device("array03")];
        let refs: Vec<&DeviceConfig> = devices.iter().collect();
        let reports = check_fleet(&refs, &ExpectedState::default(), &RunOptions::default()).await;
        let names: Vec<&str> = reports.iter().map(|r| r.device.as_str()).collect();
        assert_eq!(names, vec!["array02", "array01", "array03"]);
        assert!(reports
            .iter()
            .all(|r| matches!(r.status, CheckStatus::Unreachable(_))));
    }

    #[tokio::test]
    async fn test_parallel_reports_in_input_order() {
        let devices = [device("array02"), device("array01"), device("array03")];
        let refs: Vec<&DeviceConfig> = devices.iter().collect();
        let options = RunOptions {
            parallel: Some(2),
            deadline: None,
        };
        let reports = check_fleet(&refs, &ExpectedState::default(), &options).await;
        let names: Vec<&str> = reports.iter().map(|r| r.device.as_str()).collect();
        assert_eq!(names, vec!["array02", "array01", "array03"]);
    }

    #[tokio::test]
    async fn test_deadline_caps_a_device() {
        let devices = [device("array01")];
        let refs: Vec<&DeviceConfig> = devices.iter().collect();
        let options = RunOptions {
            parallel: None,
            deadline: Some(Duration::from_secs(30)),
        };
        let reports = check_fleet(&refs, &ExpectedState::default(), &options).await;
        assert_eq!(reports.len(), 1);
        assert!(matches!(reports[0].status, CheckStatus::Unreachable(_)));
    }
}
