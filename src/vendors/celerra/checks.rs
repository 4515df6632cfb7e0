//! Fault evaluation for Celerra nas_checkup records.

use crate::fault::{Fault, FaultCategory};
use crate::record::ComponentHealth;

/// Every degraded component line is a fault, reported with the
/// squeezed log text.
pub fn health_faults(device: &str, records: &[ComponentHealth]) -> Vec<Fault> {
    records
        .iter()
        .filter(|r| r.degraded)
        .map(|r| Fault {
            category: FaultCategory::HealthLog,
            device: device.to_string(),
            subject: r.component.clone(),
            description: r.detail.clone(),
        })
        .collect()
}
