//! Typed records extracted from raw command output.
//!
//! Each record is an immutable snapshot of one parsed line (or one XML
//! element group). Parsers return records in source-text order; the
//! evaluators in `vendors::*::checks` turn them into faults.

use indexmap::IndexMap;

/// One power supply line from `show environment power`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PowerSupplyStatus {
    /// Slot number (first column).
    pub slot: String,
    /// Supply identifier, e.g. "PS-A".
    pub id: String,
    /// Model string containing "DS-CAC".
    pub model: String,
    /// Reported state, e.g. "ok" / "faulted".
    pub state: String,
}

/// One chassis module power line from `show environment power`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModuleStatus {
    pub slot: String,
    pub model: String,
    /// Expected "powered-up".
    pub state: String,
}

/// One FC module line from `show module`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FcModuleStatus {
    pub slot: String,
    pub state: String,
}

/// One supervisor line from `show module`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SupervisorStatus {
    /// Ordinal of the supervisor within the output (1-based).
    pub index: u32,
    pub state: String,
}

/// Bootflash test counters for one module from
/// `show system health statistics`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BootflashHealth {
    pub module: String,
    /// Error count; non-numeric or missing fields coerce to 0.
    pub errors: u32,
}

/// One interface line from `show interface brief`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PortStatus {
    /// Port id, e.g. "fc1/13".
    pub id: String,
    pub vsan: u32,
    /// Admin port mode column ("E", "F", "auto", ...).
    pub admin_mode: String,
    /// Admin trunk mode column ("on", "off", "auto").
    pub trunk_mode: String,
    /// Operational status column.
    pub state: String,
    /// Operational speed when present.
    pub speed: Option<String>,
}

/// One fabric login from `show flogi database` (alias continuation
/// lines folded into their parent).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HbaLogin {
    pub port: String,
    pub vsan: u32,
    pub pwwn: String,
    /// Device alias, when the entry carries one.
    pub alias: Option<String>,
}

/// One member of a zone; both member-line layouts (with or without an
/// embedded fcid) decode to this shape.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ZoneMember {
    /// Alias name when present, otherwise the pwwn.
    pub member: String,
    pub wwn: String,
}

/// One zone with its members, attributed to the enclosing zoneset.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ZoneMembership {
    pub zoneset: String,
    pub vsan: String,
    pub zone: String,
    pub members: Vec<ZoneMember>,
}

/// One LUN from `getlun -state -type -default -owner`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LunStatus {
    pub id: String,
    pub state: Option<String>,
    pub raid_type: String,
    pub default_owner: String,
    pub current_owner: String,
}

/// One disk from `getdisk -state`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DiskStatus {
    pub bus: String,
    pub enclosure: String,
    pub slot: String,
    pub state: String,
}

/// One cache state line from `getcache`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CacheStatus {
    /// Which cache ("SP Read Cache State", ...).
    pub subject: String,
    pub state: String,
}

/// One customer-replaceable-unit state from `getcrus`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CruStatus {
    /// Squeezed source line identifying the unit.
    pub subject: String,
    pub state: String,
}

/// One RAID group from `getrg -state`. A group may report several
/// concurrent states.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RaidGroupStatus {
    pub id: String,
    pub states: Vec<String>,
}

/// One storage processor clock reading from `getsptime`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SpTime {
    /// "SPA" or "SPB".
    pub sp: String,
    pub time: time::PrimitiveDateTime,
}

/// One component line from the Celerra nas_checkup daily log.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ComponentHealth {
    /// "Control Station", "Data Movers", or "Storage System".
    pub component: String,
    /// Squeezed source line.
    pub detail: String,
    /// True when the line carries a Fail or Warn marker.
    pub degraded: bool,
}

/// One host port state pair from an SVC `lshost <name>` listing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HostPortStatus {
    pub wwpn: String,
    pub state: String,
}

/// One metro-mirror consistency group from
/// `lsrcconsistgrp -nohdr -delim :`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RemoteCopyGroup {
    pub name: String,
    /// Remote copy state, e.g. "consistent_synchronized",
    /// "inconsistent_stopped", "idling".
    pub state: String,
}

/// One vdisk from `lsvdisk -nohdr -delim :`.
#[derive(Debug, Clone, PartialEq)]
pub struct VdiskInfo {
    pub name: String,
    pub capacity_gb: f64,
    pub uid: Option<String>,
}

/// One front-end director from `symcfg list -FA ALL -v`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DirectorStatus {
    /// Director id, e.g. "7F".
    pub id: String,
    pub status: String,
    pub ports_total: u32,
    pub ports_online: u32,
    pub connections_active: u32,
}

/// One failed disk from `symdisk list -fail` + `symdisk show`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FailedDisk {
    pub id: String,
    pub vendor: String,
    pub product: String,
    pub serial: String,
}

/// One masking database entry from `symmaskdb list database`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MaskingEntry {
    pub wwn: String,
    /// FA director/port, e.g. "7FA".
    pub fa: String,
    /// False when the entry has no devices behind it.
    pub has_devices: bool,
}

/// One HBA login entry from `symaccess list logins`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SymLogin {
    pub wwn: String,
    /// Node/friendly name column; equals the wwn when no friendly
    /// name has been assigned.
    pub node_name: String,
    pub logged_in: bool,
}

/// Port flag overrides for one initiator group, from the
/// `symaccess ... -output xml` detail view.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InitiatorFlags {
    pub group: String,
    /// Short flag names ("sc3", "spc2", "os2007"); empty when no
    /// overrides are set.
    pub flags: Vec<String>,
}

/// Alias name to WWN map in insertion order.
pub type AliasMap = IndexMap<String, String>;
