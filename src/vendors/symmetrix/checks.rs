//! Fault evaluation for Symmetrix/VMAX records.

use indexmap::IndexMap;

use crate::fault::{Fault, FaultCategory, pair_asymmetry, state_matches};
use crate::record::{DirectorStatus, FailedDisk, MaskingEntry};

/// One director yields up to three faults: offline status, ports
/// down, and connections down.
pub fn director_faults(device: &str, records: &[DirectorStatus]) -> Vec<Fault> {
    let mut faults = Vec::new();
    for dir in records {
        if !state_matches(&dir.status, "Online") {
            faults.push(Fault {
                category: FaultCategory::Director,
                device: device.to_string(),
                subject: dir.id.clone(),
                description: format!("{} is {}", dir.id, dir.status),
            });
        }
        if dir.ports_online < dir.ports_total {
            faults.push(Fault {
                category: FaultCategory::Director,
                device: device.to_string(),
                subject: dir.id.clone(),
                description: format!(
                    "{} has {} out of {} ports active",
                    dir.id, dir.ports_online, dir.ports_total
                ),
            });
        }
        if dir.connections_active < dir.ports_total {
            faults.push(Fault {
                category: FaultCategory::Director,
                device: device.to_string(),
                subject: dir.id.clone(),
                description: format!(
                    "{} has {} out of {} connections active",
                    dir.id, dir.connections_active, dir.ports_total
                ),
            });
        }
    }
    faults
}

/// Paired-FA login symmetry. A pair whose first member has at most
/// one mapped device carries only the VCMDB and is not in service, so
/// it is skipped outright.
pub fn fa_pair_faults(
    device: &str,
    pairs: &IndexMap<String, String>,
    mapped: &IndexMap<String, u32>,
    logins: &IndexMap<String, u32>,
) -> Vec<Fault> {
    pairs
        .iter()
        .filter(|(a, _)| mapped.get(*a).copied().unwrap_or(0) > 1)
        .filter_map(|(a, b)| {
            let count_a = logins.get(a).copied().unwrap_or(0);
            let count_b = logins.get(b).copied().unwrap_or(0);
            pair_asymmetry(a, count_a, b, count_b).map(|description| Fault {
                category: FaultCategory::FaPair,
                device: device.to_string(),
                subject: a.clone(),
                description,
            })
        })
        .collect()
}

pub fn failed_disk_faults(device: &str, disks: &[FailedDisk]) -> Vec<Fault> {
    disks
        .iter()
        .map(|disk| Fault {
            category: FaultCategory::Disk,
            device: device.to_string(),
            subject: disk.id.clone(),
            description: format!(
                "{} ({} {}; Serial ID = {}) has failed",
                disk.id, disk.vendor, disk.product, disk.serial
            ),
        })
        .collect()
}

/// Masking database entries with no devices behind them.
pub fn masking_faults(device: &str, entries: &[MaskingEntry]) -> Vec<Fault> {
    entries
        .iter()
        .filter(|entry| !entry.has_devices)
        .map(|entry| Fault {
            category: FaultCategory::Masking,
            device: device.to_string(),
            subject: entry.wwn.clone(),
            description: format!(
                "{} is in the {} masking database but has no LUNs",
                entry.wwn, entry.fa
            ),
        })
        .collect()
}
