//! Fault evaluation for SVC host path records.

use crate::fault::{Fault, FaultCategory, state_matches};
use crate::record::HostPortStatus;

/// A host with at least one port logged in.
pub fn is_active(ports: &[HostPortStatus]) -> bool {
    ports.iter().any(|p| state_matches(&p.state, "active"))
}

/// A host that is logged in yet carries a degraded or offline port.
pub fn has_dead_path(ports: &[HostPortStatus]) -> bool {
    is_active(ports)
        && ports
            .iter()
            .any(|p| state_matches(&p.state, "degraded") || state_matches(&p.state, "offline"))
}

/// Path faults for one host: inactive hosts and live hosts with dead
/// paths, each reported with the per-port states.
pub fn host_faults(device: &str, host: &str, ports: &[HostPortStatus]) -> Vec<Fault> {
    let summary = || {
        ports
            .iter()
            .map(|p| format!("{} {}", p.wwpn, p.state))
            .collect::<Vec<_>>()
            .join(", ")
    };

    if !is_active(ports) {
        vec![Fault {
            category: FaultCategory::HostPath,
            device: device.to_string(),
            subject: host.to_string(),
            description: format!("host {host} is inactive ({})", summary()),
        }]
    } else if has_dead_path(ports) {
        vec![Fault {
            category: FaultCategory::HostPath,
            device: device.to_string(),
            subject: host.to_string(),
            description: format!("host {host} has dead paths ({})", summary()),
        }]
    } else {
        Vec::new()
    }
}
