//! Fault evaluation for Clariion/VNX records.

use time::PrimitiveDateTime;

use crate::expected::ExpectedState;
use crate::fault::{Fault, FaultCategory, state_in, state_matches};
use crate::record::{CacheStatus, CruStatus, DiskStatus, LunStatus, RaidGroupStatus, SpTime};

pub fn cache_faults(device: &str, records: &[CacheStatus], expected: &ExpectedState) -> Vec<Fault> {
    records
        .iter()
        .filter(|c| !state_matches(&c.state, expected.cache_ok_state))
        .map(|c| Fault {
            category: FaultCategory::Cache,
            device: device.to_string(),
            subject: c.subject.clone(),
            description: format!("{} is {}", c.subject, c.state),
        })
        .collect()
}

pub fn cru_faults(device: &str, records: &[CruStatus], expected: &ExpectedState) -> Vec<Fault> {
    records
        .iter()
        .filter(|c| !state_in(&c.state, expected.cru_ok_states))
        .map(|c| Fault {
            category: FaultCategory::Cru,
            device: device.to_string(),
            subject: c.subject.clone(),
            description: format!("{} is {}", c.subject, c.state),
        })
        .collect()
}

pub fn disk_faults(device: &str, records: &[DiskStatus], expected: &ExpectedState) -> Vec<Fault> {
    records
        .iter()
        .filter(|d| !state_in(&d.state, expected.disk_ok_states))
        .map(|d| Fault {
            category: FaultCategory::Disk,
            device: device.to_string(),
            subject: format!("{}_{}_{}", d.bus, d.enclosure, d.slot),
            description: format!(
                "Bus {} Enclosure {} Disk {} is {}",
                d.bus, d.enclosure, d.slot, d.state
            ),
        })
        .collect()
}

/// A LUN is faulted only when it reports the literal fault state.
pub fn lun_faults(device: &str, records: &[LunStatus], expected: &ExpectedState) -> Vec<Fault> {
    records
        .iter()
        .filter(|lun| {
            lun.state
                .as_deref()
                .is_some_and(|state| state_matches(state, expected.lun_fault_state))
        })
        .map(|lun| Fault {
            category: FaultCategory::Lun,
            device: device.to_string(),
            subject: lun.id.clone(),
            description: format!("ALU {} is {}", lun.id, expected.lun_fault_state),
        })
        .collect()
}

/// A LUN is trespassed when it sits on the wrong storage processor.
/// Hot spares float between SPs and are never trespass candidates.
pub fn trespass_faults(device: &str, records: &[LunStatus]) -> Vec<Fault> {
    records
        .iter()
        .filter(|lun| !state_matches(&lun.raid_type, "Hot Spare"))
        .filter(|lun| !state_matches(&lun.default_owner, &lun.current_owner))
        .map(|lun| Fault {
            category: FaultCategory::Trespass,
            device: device.to_string(),
            subject: lun.id.clone(),
            description: format!(
                "ALU {} should be on {} now on {}",
                lun.id, lun.default_owner, lun.current_owner
            ),
        })
        .collect()
}

pub fn raid_group_faults(
    device: &str,
    records: &[RaidGroupStatus],
    expected: &ExpectedState,
) -> Vec<Fault> {
    records
        .iter()
        .filter(|group| {
            group
                .states
                .iter()
                .any(|state| state_in(state, expected.raid_group_fault_states))
        })
        .map(|group| Fault {
            category: FaultCategory::RaidGroup,
            device: device.to_string(),
            subject: group.id.clone(),
            description: format!("RAID group {} is {}", group.id, group.states.join("/")),
        })
        .collect()
}

/// Storage processor clocks drifting beyond the tolerated skew from
/// the reference time.
pub fn skew_faults(
    device: &str,
    records: &[SpTime],
    now: PrimitiveDateTime,
    expected: &ExpectedState,
) -> Vec<Fault> {
    records
        .iter()
        .filter_map(|sp| {
            let skew = (now - sp.time).unsigned_abs();
            if skew <= expected.sp_skew_max {
                return None;
            }
            Some(Fault {
                category: FaultCategory::ClockSkew,
                device: device.to_string(),
                subject: sp.sp.clone(),
                description: format!("{} is {} minutes out", sp.sp, skew.as_secs() / 60),
            })
        })
        .collect()
}
