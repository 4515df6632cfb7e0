//! Parsers for naviseccli output.
//!
//! naviseccli spreads one logical record over several lines; each
//! parser carries the current record in a context slot and emits it
//! when the closing field arrives. Unknown lines are skipped.

use time::{Date, Month, PrimitiveDateTime, Time};

use super::super::scan;
use crate::record::{CacheStatus, CruStatus, DiskStatus, LunStatus, RaidGroupStatus, SpTime};

/// Cache state lines from `getcache -state -rsta -rstb -wst`.
pub fn cache(raw: &str) -> Vec<CacheStatus> {
    raw.lines()
        .filter(|line| line.contains("Cache State"))
        .filter_map(|line| {
            let (subject, state) = line.split_once(':')?;
            Some(CacheStatus {
                subject: scan::squeeze(subject.trim(), &[' ']),
                state: state.trim().to_string(),
            })
        })
        .collect()
}

/// Replaceable-unit states from `getcrus`. Two line shapes matter:
/// per-unit "State:" lines, and DAE summary lines carrying an
/// explicit FAULT marker.
pub fn crus(raw: &str) -> Vec<CruStatus> {
    let mut records = Vec::new();
    for line in raw.lines() {
        if line.contains("DAE") && line.contains("FAULT") {
            records.push(CruStatus {
                subject: scan::squeeze(line.trim(), &[' ']),
                state: "FAULT".to_string(),
            });
        } else if line.contains("State") {
            if let Some((subject, state)) = line.split_once(':') {
                records.push(CruStatus {
                    subject: scan::squeeze(subject.trim(), &[' ']),
                    state: state.trim().to_string(),
                });
            }
        }
    }
    records
}

/// Disk states from `getdisk -state`. A "Bus B Enclosure E Disk D"
/// header opens the record; the following "State:" line closes it.
pub fn disks(raw: &str) -> Vec<DiskStatus> {
    let mut records = Vec::new();
    let mut location: Option<(String, String, String)> = None;
    for line in raw.lines() {
        if line.starts_with("Bus") {
            location = match (scan::token(line, 1), scan::token(line, 3), scan::token(line, 5)) {
                (Some(bus), Some(enclosure), Some(slot)) => {
                    Some((bus.to_string(), enclosure.to_string(), slot.to_string()))
                }
                _ => None,
            };
        } else if line.starts_with("State") {
            if let (Some((bus, enclosure, slot)), Some(state)) =
                (location.take(), scan::after_colon(line))
            {
                records.push(DiskStatus {
                    bus,
                    enclosure,
                    slot,
                    state: state.to_string(),
                });
            }
        }
    }
    records
}

/// LUN records from `getlun -state -type -default -owner`. The
/// "LOGICAL UNIT NUMBER" header opens a record; each detail line
/// fills one field.
pub fn luns(raw: &str) -> Vec<LunStatus> {
    let mut records = Vec::new();
    let mut current: Option<LunStatus> = None;
    for line in raw.lines() {
        if line.starts_with("LOGICAL UNIT NUMBER") {
            if let Some(lun) = current.take() {
                records.push(lun);
            }
            if let Some(id) = scan::last(line) {
                current = Some(LunStatus {
                    id: id.to_string(),
                    state: None,
                    raid_type: String::new(),
                    default_owner: String::new(),
                    current_owner: String::new(),
                });
            }
        } else if let Some(lun) = current.as_mut() {
            if let Some(value) = scan::after_colon(line) {
                if line.starts_with("State") {
                    lun.state = Some(value.to_string());
                } else if line.starts_with("RAID Type") {
                    lun.raid_type = value.to_string();
                } else if line.starts_with("Default Owner") {
                    lun.default_owner = value.to_string();
                } else if line.starts_with("Current owner") {
                    lun.current_owner = value.to_string();
                }
            }
        }
    }
    if let Some(lun) = current.take() {
        records.push(lun);
    }
    records
}

/// RAID groups from `getrg -state`. A group may report several
/// concurrent states on indented continuation lines.
pub fn raid_groups(raw: &str) -> Vec<RaidGroupStatus> {
    let mut records = Vec::new();
    let mut current: Option<RaidGroupStatus> = None;
    for line in raw.lines() {
        if line.starts_with("RaidGroup ID") {
            if let Some(group) = current.take() {
                records.push(group);
            }
            if let Some(id) = scan::after_colon(line) {
                current = Some(RaidGroupStatus {
                    id: id.to_string(),
                    states: Vec::new(),
                });
            }
        } else if line.starts_with("RaidGroup State") {
            if let (Some(group), Some(state)) = (current.as_mut(), scan::after_colon(line)) {
                group.states.push(state.to_string());
            }
        } else if line.starts_with(' ') && !line.trim().is_empty() {
            if let Some(group) = current.as_mut() {
                if !group.states.is_empty() {
                    group.states.push(line.trim().to_string());
                }
            }
        }
    }
    if let Some(group) = current.take() {
        records.push(group);
    }
    records
}

/// Storage processor clocks from `getsptime`. Lines read
/// `Time on SP A: 05/12/15 10:30:00`; unparsable times are skipped.
pub fn sp_times(raw: &str) -> Vec<SpTime> {
    raw.lines()
        .filter_map(|line| {
            let sp = if line.contains("SP A:") {
                "SPA"
            } else if line.contains("SP B:") {
                "SPB"
            } else {
                return None;
            };
            let timestamp = line.split_once(&format!("{}:", &sp[2..3]))?.1.trim();
            Some(SpTime {
                sp: sp.to_string(),
                time: parse_sp_timestamp(timestamp)?,
            })
        })
        .collect()
}

/// `%m/%d/%y %H:%M:%S` with a two-digit year in the 2000s.
fn parse_sp_timestamp(text: &str) -> Option<PrimitiveDateTime> {
    let (date, clock) = text.split_once(' ')?;
    let mut date_fields = date.split('/');
    let month: u8 = date_fields.next()?.parse().ok()?;
    let day: u8 = date_fields.next()?.parse().ok()?;
    let year: i32 = date_fields.next()?.parse().ok()?;
    let mut clock_fields = clock.split(':');
    let hour: u8 = clock_fields.next()?.parse().ok()?;
    let minute: u8 = clock_fields.next()?.parse().ok()?;
    let second: u8 = clock_fields.next()?.parse().ok()?;

    let date = Date::from_calendar_date(2000 + year, Month::try_from(month).ok()?, day).ok()?;
    let time = Time::from_hms(hour, minute, second).ok()?;
    Some(PrimitiveDateTime::new(date, time))
}

/// NAR archive names from `analyzer -archive -list`: the data lines
/// start with an index digit and end with the file name.
pub fn nar_archives(raw: &str) -> Vec<String> {
    raw.lines()
        .filter(|line| line.chars().next().is_some_and(|c| c.is_ascii_digit()))
        .filter_map(scan::last)
        .map(str::to_string)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cache() {
        let raw = "\
SP Read Cache State:            Enabled\n\
SPA Read Cache State:           Enabled\n\
SP Write Cache State:           Disabled\n";
        let records = cache(raw);
        assert_eq!(records.len(), 3);
        assert_eq!(records[0].subject, "SP Read Cache State");
        assert_eq!(records[2].state, "Disabled");
    }

    #[test]
    fn test_crus_state_and_dae_lines() {
        let raw = "\
DPE7 Bus 0 Enclosure 0\n\
SP A State:                 Present\n\
Enclosure 0 Power A State:  Removed\n\
DAE3P Bus 0 Enclosure 1 FAULT\n";
        let records = crus(raw);
        assert_eq!(records.len(), 3);
        assert_eq!(records[0].subject, "SP A State");
        assert_eq!(records[0].state, "Present");
        assert_eq!(records[1].state, "Removed");
        assert_eq!(records[2].state, "FAULT");
    }

    #[test]
    fn test_disks_pair_header_with_state() {
        let raw = "\
Bus 0 Enclosure 0  Disk 0\n\
State:                   Enabled\n\
\n\
Bus 1 Enclosure 2  Disk 14\n\
State:                   Removed\n";
        let records = disks(raw);
        assert_eq!(records.len(), 2);
        assert_eq!(records[1].bus, "1");
        assert_eq!(records[1].enclosure, "2");
        assert_eq!(records[1].slot, "14");
        assert_eq!(records[1].state, "Removed");
    }

    #[test]
    fn test_luns_fill_fields_per_header() {
        let raw = "\
LOGICAL UNIT NUMBER 12\n\
State:                   Bound\n\
Default Owner:           SP A\n\
Current owner:           SP B\n\
RAID Type:               RAID5\n\
\n\
LOGICAL UNIT NUMBER 40\n\
State:                   Faulted\n\
Default Owner:           SP B\n\
Current owner:           SP B\n\
RAID Type:               Hot Spare\n";
        let records = luns(raw);
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].id, "12");
        assert_eq!(records[0].default_owner, "SP A");
        assert_eq!(records[0].current_owner, "SP B");
        assert_eq!(records[0].raid_type, "RAID5");
        assert_eq!(records[1].state.as_deref(), Some("Faulted"));
    }

    #[test]
    fn test_raid_groups_gather_continuation_states() {
        // Continuation lines keep their indentation; a backslash
        // continuation in the literal would strip it.
        let raw = concat!(
            "RaidGroup ID:                              0\n",
            "RaidGroup State:                           Valid_luns\n",
            "                                           Busy\n",
            "RaidGroup ID:                              1\n",
            "RaidGroup State:                           Invalid\n",
        );
        let records = raid_groups(raw);
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].id, "0");
        assert_eq!(records[0].states, vec!["Valid_luns", "Busy"]);
        assert_eq!(records[1].states, vec!["Invalid"]);
    }

    #[test]
    fn test_sp_times() {
        let raw = "\
Time on SP A: 05/12/15 10:30:00\n\
Time on SP B: 05/12/15 10:31:30\n";
        let times = sp_times(raw);
        assert_eq!(times.len(), 2);
        assert_eq!(times[0].sp, "SPA");
        assert_eq!(times[0].time.hour(), 10);
        assert_eq!(times[1].time.second(), 30);
        assert_eq!(times[0].time.year(), 2015);
    }

    #[test]
    fn test_unparsable_sp_time_is_skipped() {
        assert!(sp_times("Time on SP A: pending\n").is_empty());
    }

    #[test]
    fn test_nar_archives() {
        let raw = "\
Index Size     Encrypted  Archive Name\n\
1     1024     No         array01_SPA_2015-05-11.nar\n\
2     2048     No         array01_SPA_2015-05-12.nar\n";
        assert_eq!(
            nar_archives(raw),
            vec!["array01_SPA_2015-05-11.nar", "array01_SPA_2015-05-12.nar"]
        );
    }
}
