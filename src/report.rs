//! Per-device report emission.
//!
//! A device comes out of a run in one of three states: clean
//! ("ok."), faulted with an itemized list, or unreachable. The
//! unreachable state is reported distinctly so a dead device is
//! never mistaken for a healthy one.

use std::fmt;

use crate::fault::Fault;

const INDENT: &str = "....";

/// Outcome of checking one device.
#[derive(Debug, Clone, PartialEq)]
pub enum CheckStatus {
    /// No record violated its expected-state rule.
    Clean,
    /// One or more deviations, in detection order.
    Faulted(Vec<Fault>),
    /// The device could not be interrogated (soft transport failure
    /// or fatal error); the reason is carried verbatim.
    Unreachable(String),
}

impl CheckStatus {
    pub fn from_faults(faults: Vec<Fault>) -> Self {
        if faults.is_empty() {
            CheckStatus::Clean
        } else {
            CheckStatus::Faulted(faults)
        }
    }
}

/// Report for one device in a fleet run.
#[derive(Debug, Clone, PartialEq)]
pub struct DeviceReport {
    pub device: String,
    pub status: CheckStatus,
}

impl fmt::Display for DeviceReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Checking {}...", self.device.to_uppercase())?;
        match &self.status {
            CheckStatus::Clean => write!(f, "ok."),
            CheckStatus::Faulted(faults) => {
                writeln!(f, "Following issues found:")?;
                for (i, fault) in faults.iter().enumerate() {
                    if i > 0 {
                        writeln!(f)?;
                    }
                    write!(f, "{INDENT}{fault}")?;
                }
                Ok(())
            }
            CheckStatus::Unreachable(reason) => write!(f, "unreachable: {reason}"),
        }
    }
}

/// Print reports in input order to stdout.
pub fn print_reports(reports: &[DeviceReport]) {
    for report in reports {
        println!("{report}");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fault::FaultCategory;

    #[test]
    fn test_clean_report() {
        let report = DeviceReport {
            device: "switch01".into(),
            status: CheckStatus::Clean,
        };
        assert_eq!(report.to_string(), "Checking SWITCH01...ok.");
    }

    #[test]
    fn test_faulted_report_lists_each_fault() {
        let report = DeviceReport {
            device: "switch01".into(),
            status: CheckStatus::Faulted(vec![
                Fault::new(FaultCategory::Port, "switch01", "fc1/4", "Port fc1/4 is errDisabled"),
                Fault::new(FaultCategory::Isl, "switch01", "fc1/9", "ISL fc1/9 is down"),
            ]),
        };
        let text = report.to_string();
        assert!(text.contains("Following issues found:"));
        assert!(text.contains("....Port Fault => Port fc1/4 is errDisabled"));
        assert!(text.contains("....ISL Fault => ISL fc1/9 is down"));
    }

    #[test]
    fn test_unreachable_is_distinct() {
        let report = DeviceReport {
            device: "nas02".into(),
            status: CheckStatus::Unreachable("no response".into()),
        };
        assert!(report.to_string().contains("unreachable: no response"));
    }

    #[test]
    fn test_empty_fault_list_is_clean() {
        assert_eq!(CheckStatus::from_faults(vec![]), CheckStatus::Clean);
    }
}
