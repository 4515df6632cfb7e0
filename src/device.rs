//! Device identity for a check run.

use std::fmt;

use serde::Deserialize;

/// Vendor kind of a managed device. Selects the transport and the
/// parser/check set used against it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum DeviceKind {
    /// EMC Celerra/VNX filer control station (SSH).
    Celerra,
    /// Cisco MDS fabric switch (SSH).
    CiscoSwitch,
    /// EMC Clariion/VNX block array (naviseccli).
    Clariion,
    /// IBM SVC cluster (svc CLI wrapper).
    SvcCluster,
    /// EMC Symmetrix/VMAX array (symcli).
    Symmetrix,
}

impl fmt::Display for DeviceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            DeviceKind::Celerra => "celerra",
            DeviceKind::CiscoSwitch => "cisco-switch",
            DeviceKind::Clariion => "clariion",
            DeviceKind::SvcCluster => "svc-cluster",
            DeviceKind::Symmetrix => "symmetrix",
        };
        write!(f, "{name}")
    }
}

