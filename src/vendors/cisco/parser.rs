//! Parsers for Cisco MDS "show" command output.
//!
//! All parsers are a single forward pass over lines. Lines that match
//! no known pattern are skipped; a line only produces a record when
//! every field it needs is present.

use indexmap::IndexMap;
use once_cell::sync::Lazy;
use regex::Regex;

use super::super::scan;
use crate::record::{
    AliasMap, BootflashHealth, FcModuleStatus, HbaLogin, ModuleStatus, PortStatus,
    PowerSupplyStatus, SupervisorStatus, ZoneMember, ZoneMembership,
};

/// Power supply lines from `show environment power`: leading digit,
/// a DS-CAC power supply model, state in the last column.
pub fn power_supplies(raw: &str) -> Vec<PowerSupplyStatus> {
    raw.lines()
        .filter(|line| starts_with_digit(line) && line.contains("DS-CAC"))
        .filter_map(|line| {
            Some(PowerSupplyStatus {
                slot: scan::token(line, 0)?.to_string(),
                id: scan::token(line, 1)?.to_string(),
                model: scan::token(line, 2)?.to_string(),
                state: scan::last(line)?.to_string(),
            })
        })
        .collect()
}

/// Chassis module power lines from `show environment power`: slot may
/// be a number, an "Xbar" slot, or a fan id; the model is a DS-X or
/// DS-1 part.
pub fn chassis_modules(raw: &str) -> Vec<ModuleStatus> {
    raw.lines()
        .filter(|line| {
            matches!(line.chars().next(), Some(c) if c.is_ascii_digit() || c == 'X' || c == 'f')
                && (line.contains("DS-X") || line.contains("DS-1"))
        })
        .filter_map(|line| {
            Some(ModuleStatus {
                slot: scan::token(line, 0)?.to_string(),
                model: scan::token(line, 1)?.to_string(),
                state: scan::last(line)?.to_string(),
            })
        })
        .collect()
}

/// FC switching module lines from `show module`.
pub fn fc_modules(raw: &str) -> Vec<FcModuleStatus> {
    raw.lines()
        .filter(|line| line.contains("FC Module"))
        .filter_map(|line| {
            Some(FcModuleStatus {
                slot: scan::token(line, 0)?.to_string(),
                state: scan::last(line)?.to_string(),
            })
        })
        .collect()
}

/// Supervisor lines from `show module`, numbered in appearance order.
pub fn supervisors(raw: &str) -> Vec<SupervisorStatus> {
    raw.lines()
        .filter(|line| line.contains("Supervisor"))
        .enumerate()
        .filter_map(|(i, line)| {
            Some(SupervisorStatus {
                index: i as u32 + 1,
                state: scan::token(line, 4)?.to_string(),
            })
        })
        .collect()
}

/// Bootflash counters from `show system health statistics`. The
/// current module number is carried forward from the preceding
/// "module" header line; the error count coerces to zero.
pub fn bootflash(raw: &str) -> Vec<BootflashHealth> {
    let mut records = Vec::new();
    let mut module = String::new();
    for line in raw.lines() {
        if line.to_ascii_lowercase().contains("module") {
            if let Some(id) = scan::last(line) {
                module = id.to_string();
            }
        } else if line.contains("Bootflash") {
            records.push(BootflashHealth {
                module: module.clone(),
                errors: scan::to_u32(scan::token(line, 7)),
            });
        }
    }
    records
}

static DESCRIPTION_GAP: Lazy<Regex> = Lazy::new(|| Regex::new(" {12,14}").unwrap());

/// Port id to description map from `show interface description`.
/// The description column starts after a wide fixed-width gap.
pub fn port_descriptions(raw: &str) -> IndexMap<String, String> {
    let mut descriptions = IndexMap::new();
    for line in raw.lines().filter(|line| line.starts_with("fc")) {
        let Some(id) = scan::token(line, 0) else {
            continue;
        };
        if let Some(description) = DESCRIPTION_GAP.split(line).last() {
            descriptions.insert(id.to_string(), description.trim().to_string());
        }
    }
    descriptions
}

/// Interface lines from `show interface brief`.
pub fn ports(raw: &str) -> Vec<PortStatus> {
    raw.lines()
        .filter(|line| line.starts_with("fc"))
        .filter_map(|line| {
            Some(PortStatus {
                id: scan::token(line, 0)?.to_string(),
                vsan: scan::to_u32(scan::token(line, 1)),
                admin_mode: scan::token(line, 2)?.to_string(),
                trunk_mode: scan::token(line, 3)?.to_string(),
                state: scan::token(line, 4)?.to_string(),
                speed: scan::token(line, 7).map(str::to_string),
            })
        })
        .collect()
}

/// Fabric logins from `show flogi database`. Device-alias
/// continuation lines are folded onto their parent entry first.
pub fn flogi_entries(raw: &str) -> Vec<HbaLogin> {
    let folded = scan::fold_bracket_continuations(raw);
    folded
        .lines()
        .filter(|line| line.starts_with("fc"))
        .filter_map(|line| {
            Some(HbaLogin {
                port: scan::token(line, 0)?.to_string(),
                vsan: scan::to_u32(scan::token(line, 1)),
                pwwn: scan::token(line, 3)?.to_string(),
                alias: scan::bracketed(line).first().map(|s| s.trim().to_string()),
            })
        })
        .collect()
}

/// Alias-to-WWN map of the flogi database: only entries that carry a
/// device alias.
pub fn flogi_aliases(raw: &str) -> AliasMap {
    flogi_entries(raw)
        .into_iter()
        .filter_map(|login| Some((login.alias?, login.pwwn)))
        .collect()
}

/// Alias-to-WWN map from `show device-alias database`.
pub fn device_aliases(raw: &str) -> AliasMap {
    raw.lines()
        .filter(|line| line.starts_with("device"))
        .filter_map(|line| {
            Some((
                scan::token(line, 2)?.to_string(),
                scan::last(line)?.to_string(),
            ))
        })
        .collect()
}

/// Zones with members from `show zoneset active`. Context headers
/// ("zoneset name", "zone name") set the attribution for following
/// member lines.
pub fn zoneset(raw: &str) -> Vec<ZoneMembership> {
    let mut zones = Vec::new();
    let mut zoneset_name = String::new();
    let mut vsan = String::new();
    let mut current: Option<ZoneMembership> = None;

    for line in raw.lines() {
        if line.contains("zoneset name") {
            zoneset_name = scan::token(line, 2).unwrap_or_default().to_string();
            vsan = scan::token(line, 4).unwrap_or_default().to_string();
        } else if line.contains("zone name") {
            if let Some(zone) = current.take() {
                zones.push(zone);
            }
            let Some(name) = scan::token(line, 2) else {
                continue;
            };
            current = Some(ZoneMembership {
                zoneset: zoneset_name.clone(),
                vsan: vsan.clone(),
                zone: name.to_string(),
                members: Vec::new(),
            });
        } else if line.contains("pwwn") {
            if let (Some(zone), Some(member)) = (current.as_mut(), zone_member(line)) {
                zone.members.push(member);
            }
        }
    }
    if let Some(zone) = current.take() {
        zones.push(zone);
    }
    zones
}

/// Decode one zone member line. Two layouts occur:
///
/// ```text
///   pwwn 21:00:00:e0:8b:00:00:01 [host01_hba0]
/// * fcid 0x6a0012 [pwwn 21:00:00:e0:8b:00:00:01] [host01_hba0]
/// ```
///
/// Both decode to the same member/wwn pair; the member is the alias
/// when one is present, otherwise the pwwn itself.
fn zone_member(line: &str) -> Option<ZoneMember> {
    let tokens: Vec<&str> = line.split_whitespace().collect();
    let wwn = tokens
        .iter()
        .position(|t| t.trim_start_matches('[') == "pwwn")
        .and_then(|i| tokens.get(i + 1))?
        .trim_matches(['[', ']'])
        .to_string();

    let member = scan::bracketed(line)
        .into_iter()
        .filter(|group| !group.contains("pwwn"))
        .next_back()
        .map(|alias| alias.trim().to_string())
        .unwrap_or_else(|| wwn.clone());

    Some(ZoneMember { member, wwn })
}

/// Zone names from a `show zoneset active` or `show zone` listing.
pub fn zone_names(raw: &str) -> Vec<String> {
    raw.lines()
        .filter(|line| line.contains("zone name"))
        .filter_map(|line| scan::token(line, 2))
        .map(str::to_string)
        .collect()
}

/// SNMP notification targets from `show snmp host`, sorted and
/// de-duplicated.
pub fn snmp_hosts(raw: &str) -> Vec<String> {
    let mut hosts: Vec<String> = raw
        .lines()
        .filter(|line| line.contains('.'))
        .filter_map(|line| scan::token(line, 0))
        .map(str::to_string)
        .collect();
    hosts.sort();
    hosts.dedup();
    hosts
}

/// System software version from `show version`.
pub fn system_version(raw: &str) -> Option<String> {
    raw.lines()
        .find(|line| line.contains("system:") && line.contains("version"))
        .and_then(scan::last)
        .map(str::to_string)
}

/// Uptime line from `show system uptime`.
pub fn uptime(raw: &str) -> Option<String> {
    raw.lines()
        .find(|line| line.to_ascii_lowercase().contains("uptime"))
        .and_then(scan::after_colon)
        .map(str::to_string)
}

/// The switch clock from `show clock`, a single timestamp line.
pub fn clock(raw: &str) -> Option<String> {
    raw.lines()
        .map(str::trim)
        .find(|line| !line.is_empty())
        .map(str::to_string)
}

/// fcalias blocks scanned out of a running-config: alias name to its
/// member pwwn (colons stripped for comparison against symcli login
/// identifiers). Only host aliases, recognized by an `_A`/`_B` fabric
/// suffix, are kept.
pub fn fcaliases(running_config: &str) -> AliasMap {
    let mut aliases = AliasMap::new();
    let mut current: Option<String> = None;
    for line in running_config.lines() {
        let trimmed = line.trim_start();
        if trimmed.starts_with("fcalias name") {
            current = scan::token(trimmed, 2).map(str::to_string);
        } else if trimmed.contains("pwwn") {
            if let (Some(name), Some(wwn)) = (current.take(), scan::last(trimmed)) {
                let suffix = name.to_ascii_uppercase();
                if suffix.ends_with("_A") || suffix.ends_with("_B") {
                    aliases.insert(name, wwn.replace(':', ""));
                }
            }
        } else {
            current = None;
        }
    }
    aliases
}

fn starts_with_digit(line: &str) -> bool {
    line.chars().next().is_some_and(|c| c.is_ascii_digit())
}
