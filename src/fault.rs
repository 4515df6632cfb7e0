//! Fault records and the generic evaluation helpers shared by the
//! per-vendor checks.
//!
//! A fault is only emitted when an observed state provably violates
//! its category's expected-state rule. Lines the parsers could not
//! classify never reach an evaluator, so they can never be flagged.

use std::fmt;

/// What kind of deviation a fault describes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FaultCategory {
    PowerSupply,
    ChassisModule,
    FcModule,
    Supervisor,
    Bootflash,
    Port,
    Isl,
    Cache,
    Cru,
    Disk,
    Lun,
    Trespass,
    RaidGroup,
    ClockSkew,
    HealthLog,
    HostPath,
    Director,
    FaPair,
    Masking,
}

impl fmt::Display for FaultCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            FaultCategory::PowerSupply => "Power Supply",
            FaultCategory::ChassisModule => "Module",
            FaultCategory::FcModule => "FC Module",
            FaultCategory::Supervisor => "Supervisor",
            FaultCategory::Bootflash => "Bootflash",
            FaultCategory::Port => "Port",
            FaultCategory::Isl => "ISL",
            FaultCategory::Cache => "Cache",
            FaultCategory::Cru => "CRU",
            FaultCategory::Disk => "Disk",
            FaultCategory::Lun => "LUN",
            FaultCategory::Trespass => "Trespass",
            FaultCategory::RaidGroup => "RAID Group",
            FaultCategory::ClockSkew => "Clock Skew",
            FaultCategory::HealthLog => "Health Log",
            FaultCategory::HostPath => "Host Path",
            FaultCategory::Director => "Director",
            FaultCategory::FaPair => "FA Pair",
            FaultCategory::Masking => "Masking",
        };
        write!(f, "{name}")
    }
}

/// One detected deviation from the expected state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Fault {
    pub category: FaultCategory,
    /// Device the fault was observed on.
    pub device: String,
    /// The component the fault is about (supply id, port id, LUN id...).
    pub subject: String,
    /// Human-readable description.
    pub description: String,
}

impl Fault {
    pub fn new(
        category: FaultCategory,
        device: impl Into<String>,
        subject: impl Into<String>,
        description: impl Into<String>,
    ) -> Self {
        Self {
            category,
            device: device.into(),
            subject: subject.into(),
            description: description.into(),
        }
    }
}

impl fmt::Display for Fault {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} Fault => {}", self.category, self.description)
    }
}

/// Case- and whitespace-normalized state equality. Vendor output pads
/// state columns inconsistently.
pub fn state_matches(observed: &str, expected: &str) -> bool {
    observed.trim().eq_ignore_ascii_case(expected.trim())
}

/// Whether the observed state matches any entry in the set, normalized
/// the same way as [`state_matches`].
pub fn state_in(observed: &str, set: &[&str]) -> bool {
    set.iter().any(|expected| state_matches(observed, expected))
}

/// Paired-adapter symmetry rule. Returns a description only when the
/// counts differ and exactly one side is zero; two idle adapters are
/// an unused pair, not a fault.
pub fn pair_asymmetry(a_name: &str, a: u32, b_name: &str, b: u32) -> Option<String> {
    if a != b && (a == 0 || b == 0) {
        Some(format!("{a_name} has {a} logins whilst {b_name} has {b}"))
    } else {
        None
    }
}
