//! The expected-state table: the known-good reference values every
//! fault rule compares against.
//!
//! Built once at startup, read-only thereafter. Safe to share across
//! concurrent device checks without synchronization.

use std::time::Duration;

/// Per-category reference values. `Default` carries the fleet-standard
/// values; construct-and-override for exotic sites.
#[derive(Debug, Clone)]
pub struct ExpectedState {
    /// Power supply state on MDS switches.
    pub power_supply_ok: &'static str,
    /// Chassis module power state on MDS switches.
    pub chassis_module_ok: &'static str,
    /// FC module state in `show module`.
    pub fc_module_ok: &'static str,
    /// Acceptable supervisor states.
    pub supervisor_ok: &'static [&'static str],
    /// Bootflash test error count above which a module is flagged.
    pub bootflash_error_max: u32,
    /// The isolated/default VSAN; ports in it are never fault candidates.
    pub isolated_vsan: u32,
    /// Port states that are not fault candidates.
    pub steady_port_states: &'static [&'static str],
    /// Admin trunk mode an ISL must be in.
    pub isl_admin_mode: &'static str,
    /// Clariion disk states that are healthy.
    pub disk_ok_states: &'static [&'static str],
    /// Clariion replaceable-unit states that are healthy.
    pub cru_ok_states: &'static [&'static str],
    /// Clariion LUN state that marks a fault.
    pub lun_fault_state: &'static str,
    /// Clariion RAID group states that mark a fault.
    pub raid_group_fault_states: &'static [&'static str],
    /// Clariion cache state required on every cache line.
    pub cache_ok_state: &'static str,
    /// Maximum tolerated storage-processor clock skew.
    pub sp_skew_max: Duration,
    /// SVC consolidation: LUNs at or under this size count as small.
    pub consolidation_max_gb: f64,
    /// SVC consolidation: hosts with more small LUNs than this are
    /// candidates.
    pub consolidation_min_luns: usize,
}

impl Default for ExpectedState {
    fn default() -> Self {
        Self {
            power_supply_ok: "ok",
            chassis_module_ok: "powered-up",
            fc_module_ok: "ok",
            supervisor_ok: &["active", "ha-standby"],
            bootflash_error_max: 10,
            isolated_vsan: 4094,
            steady_port_states: &["up", "down", "trunking"],
            isl_admin_mode: "on",
            disk_ok_states: &["Enabled", "Hot Spare Ready", "Unbound", "Empty"],
            cru_ok_states: &["Present", "Valid"],
            lun_fault_state: "Faulted",
            raid_group_fault_states: &["Invalid", "Halted", "Busy"],
            cache_ok_state: "Enabled",
            sp_skew_max: Duration::from_secs(600),
            consolidation_max_gb: 50.0,
            consolidation_min_luns: 10,
        }
    }
}
