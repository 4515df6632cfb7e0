//! Parser for the Celerra nas_checkup daily log.
//!
//! The control station runs nas_checkup from cron and leaves the
//! report in `log/daily.log` under the script user's home. Component
//! summary lines carry a Pass/Warn/Fail verdict padded out with dot
//! runs.

use super::super::scan;
use crate::record::ComponentHealth;

const COMPONENTS: [&str; 3] = ["Control Station", "Data Movers", "Storage System"];

/// Component verdict lines from the daily log. Lines naming no known
/// component are skipped.
pub fn components(raw: &str) -> Vec<ComponentHealth> {
    raw.lines()
        .filter_map(|line| {
            let component = COMPONENTS.iter().find(|c| line.contains(*c))?;
            Some(ComponentHealth {
                component: component.to_string(),
                detail: scan::squeeze(line.trim_end(), &[' ', '.']),
                degraded: line.contains("Fail") || line.contains("Warn"),
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    const LOG: &str = "\
Check Version:  7.1.47.5\n\
Control Station: Checking statistics groups database........... Pass\n\
Control Station: Checking if NAS Storage API is installed...... Fail\n\
Data Movers: Checking boot configuration....................... Pass\n\
Data Movers: Checking server_log error messages................ Warn\n\
Storage System: Checking disk emulation type................... Pass\n";

    #[test]
    fn test_components_classified_and_squeezed() {
        let records = components(LOG);
        assert_eq!(records.len(), 5);
        assert_eq!(records[0].component, "Control Station");
        assert!(!records[0].degraded);
        assert!(records[1].degraded);
        assert_eq!(
            records[1].detail,
            "Control Station: Checking if NAS Storage API is installed. Fail"
        );
        assert!(records[3].degraded);
        assert_eq!(records[3].component, "Data Movers");
    }

    #[test]
    fn test_unrelated_lines_skipped() {
        let records = components(LOG);
        assert!(records.iter().all(|r| r.detail.contains("Checking")));
    }
}
