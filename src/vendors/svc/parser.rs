//! Parsers for SVC CLI output.
//!
//! Listing commands run with `-nohdr -delim :`, so a record is one
//! colon-delimited line. The per-host detail view is key/value lines.

use super::super::scan;
use crate::record::{HostPortStatus, RemoteCopyGroup, VdiskInfo};

fn field(line: &str, n: usize) -> Option<&str> {
    line.split(':').nth(n).map(str::trim)
}

/// Host names from `lshost -nohdr -delim :` (field 1).
pub fn host_names(raw: &str) -> Vec<String> {
    raw.lines()
        .filter_map(|line| field(line, 1))
        .filter(|name| !name.is_empty())
        .map(str::to_string)
        .collect()
}

/// WWPN/state pairs from a `lshost <name>` detail listing. The state
/// line following a WWPN line belongs to that port.
pub fn host_ports(raw: &str) -> Vec<HostPortStatus> {
    let mut ports = Vec::new();
    let mut wwpn: Option<String> = None;
    for line in raw.lines() {
        if line.starts_with("WWPN") {
            wwpn = scan::last(line).map(str::to_string);
        } else if line.starts_with("state") {
            if let (Some(wwpn), Some(state)) = (wwpn.take(), scan::last(line)) {
                ports.push(HostPortStatus {
                    wwpn,
                    state: state.to_string(),
                });
            }
        }
    }
    ports
}

/// Vdisks from `lsvdisk -nohdr -delim :`: name (field 1), capacity
/// (field 7, "50.0GB"), uid (field 13). Unparsable capacities coerce
/// to zero.
pub fn vdisks(raw: &str) -> Vec<VdiskInfo> {
    raw.lines()
        .filter_map(|line| {
            let name = field(line, 1)?;
            if name.is_empty() {
                return None;
            }
            Some(VdiskInfo {
                name: name.to_string(),
                capacity_gb: field(line, 7)
                    .map(|c| c.trim_end_matches("GB").parse().unwrap_or(0.0))
                    .unwrap_or(0.0),
                uid: field(line, 13).filter(|uid| !uid.is_empty()).map(str::to_string),
            })
        })
        .collect()
}

/// Metro-mirror consistency groups from `lsrcconsistgrp -nohdr
/// -delim :`: name (field 1), state (field 7). Global-mirror groups
/// (copy type, field 9) are dropped.
pub fn metro_mirror_groups(raw: &str) -> Vec<RemoteCopyGroup> {
    raw.lines()
        .filter(|line| field(line, 9).is_some_and(|kind| kind.contains("metro")))
        .filter_map(|line| {
            Some(RemoteCopyGroup {
                name: field(line, 1)?.to_string(),
                state: field(line, 7)?.to_string(),
            })
        })
        .collect()
}

/// Mapped vdisk names from `lshostvdiskmap -nohdr -delim :` (field 4).
pub fn mapped_vdisk_names(raw: &str) -> Vec<String> {
    raw.lines()
        .filter_map(|line| field(line, 4))
        .filter(|name| !name.is_empty())
        .map(str::to_string)
        .collect()
}
