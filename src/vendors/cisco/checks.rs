//! Fault evaluation for Cisco MDS records. All functions here are
//! pure: records and expected state in, faults out.

use indexmap::IndexMap;

use crate::expected::ExpectedState;
use crate::fault::{Fault, FaultCategory, state_in, state_matches};
use crate::record::{
    BootflashHealth, FcModuleStatus, ModuleStatus, PortStatus, PowerSupplyStatus, SupervisorStatus,
};

pub fn power_supply_faults(
    device: &str,
    supplies: &[PowerSupplyStatus],
    expected: &ExpectedState,
) -> Vec<Fault> {
    supplies
        .iter()
        .filter(|ps| !state_matches(&ps.state, expected.power_supply_ok))
        .map(|ps| Fault {
            category: FaultCategory::PowerSupply,
            device: device.to_string(),
            subject: ps.id.clone(),
            description: format!("power supply {} ({}) is {}", ps.id, ps.model, ps.state),
        })
        .collect()
}

pub fn chassis_module_faults(
    device: &str,
    modules: &[ModuleStatus],
    expected: &ExpectedState,
) -> Vec<Fault> {
    modules
        .iter()
        .filter(|m| !state_matches(&m.state, expected.chassis_module_ok))
        .map(|m| Fault {
            category: FaultCategory::ChassisModule,
            device: device.to_string(),
            subject: m.slot.clone(),
            description: format!("module {} ({}) is {}", m.slot, m.model, m.state),
        })
        .collect()
}

pub fn fc_module_faults(
    device: &str,
    modules: &[FcModuleStatus],
    expected: &ExpectedState,
) -> Vec<Fault> {
    modules
        .iter()
        .filter(|m| !state_matches(&m.state, expected.fc_module_ok))
        .map(|m| Fault {
            category: FaultCategory::FcModule,
            device: device.to_string(),
            subject: m.slot.clone(),
            description: format!("FC module {} is {}", m.slot, m.state),
        })
        .collect()
}

/// A supervisor is faulted when its state is neither active nor
/// ha-standby.
pub fn supervisor_faults(
    device: &str,
    supervisors: &[SupervisorStatus],
    expected: &ExpectedState,
) -> Vec<Fault> {
    supervisors
        .iter()
        .filter(|s| !state_in(&s.state, expected.supervisor_ok))
        .map(|s| Fault {
            category: FaultCategory::Supervisor,
            device: device.to_string(),
            subject: s.index.to_string(),
            description: format!("supervisor {} is {}", s.index, s.state),
        })
        .collect()
}

pub fn bootflash_faults(
    device: &str,
    records: &[BootflashHealth],
    expected: &ExpectedState,
) -> Vec<Fault> {
    records
        .iter()
        .filter(|r| r.errors > expected.bootflash_error_max)
        .map(|r| Fault {
            category: FaultCategory::Bootflash,
            device: device.to_string(),
            subject: r.module.clone(),
            description: format!("module {} bootflash has {} errors", r.module, r.errors),
        })
        .collect()
}

/// A port is faulted when it carries a production VSAN and sits in a
/// state that is neither up, down, nor trunking. Ports parked in the
/// isolated VSAN are exempt. The configured interface description, when
/// present, is folded into the fault text to name the attached host.
pub fn port_faults(
    device: &str,
    ports: &[PortStatus],
    descriptions: &IndexMap<String, String>,
    expected: &ExpectedState,
) -> Vec<Fault> {
    ports
        .iter()
        .filter(|p| p.vsan != expected.isolated_vsan && !state_in(&p.state, expected.steady_port_states))
        .map(|p| {
            let label = match descriptions.get(&p.id).filter(|d| !d.is_empty()) {
                Some(description) => format!(" ({description})"),
                None => String::new(),
            };
            Fault {
                category: FaultCategory::Port,
                device: device.to_string(),
                subject: p.id.clone(),
                description: format!("port {}{label} (vsan {}) is {}", p.id, p.vsan, p.state),
            }
        })
        .collect()
}

/// An inter-switch link is faulted when an E port has trunk mode off
/// and is not trunking; either condition alone is healthy. Ports
/// parked in the isolated VSAN are exempt.
pub fn isl_faults(device: &str, ports: &[PortStatus], expected: &ExpectedState) -> Vec<Fault> {
    ports
        .iter()
        .filter(|p| p.admin_mode == "E" || p.admin_mode == "TE")
        .filter(|p| {
            p.vsan != expected.isolated_vsan
                && !state_matches(&p.trunk_mode, expected.isl_admin_mode)
                && !state_matches(&p.state, "trunking")
        })
        .map(|p| Fault {
            category: FaultCategory::Isl,
            device: device.to_string(),
            subject: p.id.clone(),
            description: format!(
                "ISL {} is {} with trunk mode {}",
                p.id, p.state, p.trunk_mode
            ),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn supply(id: &str, state: &str) -> PowerSupplyStatus {
        PowerSupplyStatus {
            slot: "0".into(),
            id: id.into(),
            model: "DS-CAC1".into(),
            state: state.into(),
        }
    }

    fn port(id: &str, vsan: u32, admin: &str, trunk: &str, state: &str) -> PortStatus {
        PortStatus {
            id: id.into(),
            vsan,
            admin_mode: admin.into(),
            trunk_mode: trunk.into(),
            state: state.into(),
            speed: None,
        }
    }

    #[test]
    fn test_power_supply_state_comparison_ignores_case() {
        let expected = ExpectedState::default();
        let supplies = vec![supply("PS-A", "OK"), supply("PS-B", " ok "), supply("PS-C", "shut")];
        let faults = power_supply_faults("sw1", &supplies, &expected);
        assert_eq!(faults.len(), 1);
        assert_eq!(faults[0].subject, "PS-C");
    }

    #[test]
    fn test_supervisor_active_and_standby_are_healthy() {
        let expected = ExpectedState::default();
        let sups = vec![
            SupervisorStatus { index: 1, state: "active".into() },
            SupervisorStatus { index: 2, state: "ha-standby".into() },
        ];
        assert!(supervisor_faults("sw1", &sups, &expected).is_empty());

        let sups = vec![SupervisorStatus { index: 2, state: "powered-dn".into() }];
        let faults = supervisor_faults("sw1", &sups, &expected);
        assert_eq!(faults.len(), 1);
        assert!(faults[0].description.contains("powered-dn"));
    }

    #[test]
    fn test_bootflash_threshold_is_exclusive() {
        let expected = ExpectedState::default();
        let records = vec![
            BootflashHealth { module: "1".into(), errors: 10 },
            BootflashHealth { module: "2".into(), errors: 11 },
        ];
        let faults = bootflash_faults("sw1", &records, &expected);
        assert_eq!(faults.len(), 1);
        assert_eq!(faults[0].subject, "2");
    }

    #[test]
    fn test_isolated_vsan_port_never_faults() {
        let expected = ExpectedState::default();
        let ports = vec![
            port("fc1/1", 4094, "FX", "--", "init"),
            port("fc1/2", 10, "FX", "--", "init"),
            port("fc1/3", 10, "FX", "--", "up"),
            port("fc1/4", 10, "FX", "--", "down"),
        ];
        let faults = port_faults("sw1", &ports, &IndexMap::new(), &expected);
        assert_eq!(faults.len(), 1);
        assert_eq!(faults[0].subject, "fc1/2");
    }

    #[test]
    fn test_port_fault_names_the_described_host() {
        let expected = ExpectedState::default();
        let ports = vec![port("fc1/2", 10, "FX", "--", "errDisabled")];
        let mut descriptions = IndexMap::new();
        descriptions.insert("fc1/2".to_string(), "host02_hba0".to_string());
        let faults = port_faults("sw1", &ports, &descriptions, &expected);
        assert_eq!(faults.len(), 1);
        assert!(faults[0].description.contains("host02_hba0"));
    }

    #[test]
    fn test_isl_faults_only_with_trunk_mode_off_and_not_trunking() {
        let expected = ExpectedState::default();
        let ports = vec![
            port("fc1/1", 10, "E", "on", "trunking"),
            port("fc1/2", 10, "E", "on", "down"),
            port("fc1/3", 10, "E", "off", "trunking"),
            port("fc1/4", 10, "TE", "off", "down"),
            port("fc1/5", 10, "FX", "--", "up"),
        ];
        let faults = isl_faults("sw1", &ports, &expected);
        assert_eq!(faults.len(), 1);
        assert_eq!(faults[0].subject, "fc1/4");
    }

    #[test]
    fn test_isolated_vsan_isl_never_faults() {
        let expected = ExpectedState::default();
        let ports = vec![port("fc2/1", 4094, "E", "off", "down")];
        assert!(isl_faults("sw1", &ports, &expected).is_empty());
    }

    #[test]
    fn test_module_faults() {
        let expected = ExpectedState::default();
        let modules = vec![
            ModuleStatus { slot: "1".into(), model: "DS-X9248".into(), state: "powered-up".into() },
            ModuleStatus { slot: "2".into(), model: "DS-X9248".into(), state: "powered-dn".into() },
        ];
        let faults = chassis_module_faults("sw1", &modules, &expected);
        assert_eq!(faults.len(), 1);
        assert_eq!(faults[0].subject, "2");

        let fc = vec![FcModuleStatus { slot: "3".into(), state: "failure".into() }];
        assert_eq!(fc_module_faults("sw1", &fc, &expected).len(), 1);
    }
}
