//! Parsers for symcli output.
//!
//! The line-oriented commands share a convention: a header line names
//! a director, detail lines below it belong to that director until
//! the next header. The `-addr` listing nests, so its context is a
//! stack rather than a slot. `symaccess` XML output goes through
//! roxmltree instead.

use indexmap::IndexMap;

use super::super::scan;
use crate::error::Result;
use crate::record::{DirectorStatus, InitiatorFlags, MaskingEntry, SymLogin};

/// Front-end directors from `symcfg list -FA ALL -v`.
///
/// `Identification` opens a director; the ports-status and
/// connection-status lines carry bracketed per-port markers whose
/// occurrence counts are the online/active totals. The connection
/// line closes the record. The ports/connection variants must be
/// matched before the bare `Director Status` line.
pub fn directors(raw: &str) -> Vec<DirectorStatus> {
    let mut records = Vec::new();
    let mut id = String::new();
    let mut ports_total = 0u32;
    let mut status = String::new();
    let mut ports_online = 0u32;

    for line in raw.lines() {
        if line.contains("Identification") {
            if let Some(name) = scan::last(line).and_then(|t| t.split('-').next_back()) {
                id = name.to_string();
            }
        } else if line.contains("Number of Director Ports") {
            ports_total = scan::to_u32(scan::after_colon(line));
        } else if line.contains("Director Ports Status") {
            ports_online = line.matches("ON").count() as u32;
        } else if line.contains("Director Connection Status") {
            records.push(DirectorStatus {
                id: id.clone(),
                status: status.clone(),
                ports_total,
                ports_online,
                connections_active: line.matches("Yes").count() as u32,
            });
        } else if line.contains("Director Status") {
            if let Some(value) = scan::after_colon(line) {
                status = value.to_string();
            }
        }
    }
    records
}

/// Mapped-device counts per FA port from `symcfg -dir all list -addr`.
///
/// The listing nests: an indented `FA` header pushes a director/port
/// onto the stack, `Available Addresses` pops it, and `Mapped
/// Devices` counts against whatever is on top. Port digits 0/1 read
/// as ports A/B.
pub fn mapped_counts(raw: &str) -> IndexMap<String, u32> {
    let mut stack: Vec<String> = Vec::new();
    let mut counts = IndexMap::new();
    for line in raw.lines() {
        if line.starts_with("    FA") {
            if let (Some(dir), Some(port)) = (scan::token(line, 1), scan::token(line, 2)) {
                stack.push(format!(
                    "{}{}",
                    dir.trim_start_matches('0'),
                    digit_to_port(port)
                ));
            }
        } else if line.contains("Available Addresses") {
            stack.pop();
        } else if line.contains("Mapped Devices") {
            if let Some(fa) = stack.last() {
                counts.insert(fa.clone(), scan::to_u32(scan::last(line)));
            }
        }
    }
    counts
}

/// Login counts per FA port from `symmask -dir all -p all list logins`.
///
/// `Director Id` replaces the context, `Director Port` completes the
/// key and zero-initializes its count, and each fabric+session
/// `Yes    Yes` row increments it.
pub fn login_counts(raw: &str) -> IndexMap<String, u32> {
    let mut director = String::new();
    let mut current: Option<String> = None;
    let mut counts = IndexMap::new();
    for line in raw.lines() {
        if line.contains("Director Id") {
            director = scan::last(line)
                .and_then(|t| t.split('-').next_back())
                .unwrap_or_default()
                .to_string();
            current = None;
        } else if line.contains("Director Port") {
            if let Some(port) = scan::last(line) {
                let fa = format!("{director}{}", digit_to_port(port));
                counts.insert(fa.clone(), 0);
                current = Some(fa);
            }
        } else if line.contains("Yes    Yes") {
            if let Some(fa) = current.as_ref() {
                if let Some(count) = counts.get_mut(fa) {
                    *count += 1;
                }
            }
        }
    }
    counts
}

fn digit_to_port(digit: &str) -> &str {
    match digit {
        "0" => "A",
        "1" => "B",
        other => other,
    }
}

/// Identifiers of failed spindles from `symdisk list -fail`. Each DF
/// data row names the director, interface, and target the show
/// command wants back.
pub fn failed_disk_ids(raw: &str) -> Vec<String> {
    raw.lines()
        .filter(|line| line.starts_with("DF"))
        .filter_map(|line| {
            let interface = scan::token(line, 1)?;
            let target = scan::token(line, 2)?;
            let lun = scan::token(line, 3)?;
            Some(format!("{interface}:{target}{lun}"))
        })
        .collect()
}

/// Vendor, product, and serial fields from `symdisk show`.
pub fn disk_details(raw: &str) -> (String, String, String) {
    let mut vendor = String::new();
    let mut product = String::new();
    let mut serial = String::new();
    for line in raw.lines() {
        if line.contains("Vendor ID") {
            vendor = scan::last(line).unwrap_or_default().to_string();
        } else if line.contains("Product ID") {
            product = scan::after_colon(line).unwrap_or_default().to_string();
        } else if line.contains("Serial ID") {
            serial = scan::last(line).unwrap_or_default().to_string();
        }
    }
    (vendor, product, serial)
}

/// Masking records from `symmaskdb list database -dir all`. The
/// director identification and port lines set the FA context for the
/// Fibre entries below them; an entry whose device list reads `None`
/// is recorded as having no devices.
pub fn masking_entries(raw: &str) -> Vec<MaskingEntry> {
    let mut entries = Vec::new();
    let mut director = String::new();
    let mut fa = String::new();
    for line in raw.lines() {
        if line.contains("Identification") {
            if let Some(name) = scan::last(line).and_then(|t| t.split('-').next_back()) {
                director = name.to_string();
            }
        } else if line.contains("Director Port") {
            if let Some(port) = scan::last(line) {
                fa = format!("{director}{}", digit_to_port(port));
            }
        } else if line.contains("Fibre") {
            if let Some(wwn) = scan::token(line, 0) {
                entries.push(MaskingEntry {
                    wwn: wwn.to_string(),
                    fa: fa.clone(),
                    has_devices: !line.contains("None"),
                });
            }
        }
    }
    entries
}

/// HBA logins from `symaccess list logins`. A login whose node name
/// repeats the WWN has no friendly name assigned.
pub fn logins(raw: &str) -> Vec<SymLogin> {
    raw.lines()
        .filter(|line| line.contains("Fibre"))
        .filter_map(|line| {
            Some(SymLogin {
                wwn: scan::token(line, 0)?.to_string(),
                node_name: scan::token(line, 2)?.to_string(),
                logged_in: scan::token(line, 5) == Some("Yes"),
            })
        })
        .collect()
}

/// Initiator group names from `symaccess list -type initiator -output xml`.
pub fn initiator_groups(xml: &str) -> Result<Vec<String>> {
    let document = roxmltree::Document::parse(xml)?;
    Ok(document
        .descendants()
        .filter(|node| node.has_tag_name("group_name"))
        .filter_map(|node| node.text())
        .map(|text| text.trim().to_string())
        .collect())
}

/// Port flag overrides for one initiator group from the
/// `-detail show … -output xml` view. Override element names map to
/// their short forms; a group without overrides reports an empty set.
pub fn flag_overrides(xml: &str, group: &str) -> Result<InitiatorFlags> {
    let document = roxmltree::Document::parse(xml)?;
    let overridden = document
        .descendants()
        .find(|node| node.has_tag_name("port_flag_overrides"))
        .and_then(|node| node.text())
        .is_some_and(|text| text.trim() == "Yes");

    let flags = if overridden {
        document
            .descendants()
            .find(|node| node.has_tag_name("Override_Flags"))
            .map(|node| {
                node.descendants()
                    .filter(|child| child.is_element() && !child.has_tag_name("Override_Flags"))
                    .map(|child| short_flag(child.tag_name().name()).to_string())
                    .collect()
            })
            .unwrap_or_default()
    } else {
        Vec::new()
    };

    Ok(InitiatorFlags {
        group: group.to_string(),
        flags,
    })
}

fn short_flag(name: &str) -> &str {
    match name {
        "scsi_3" => "sc3",
        "spc2_protocol_version" => "spc2",
        "scsi_support1" => "os2007",
        other => other,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_directors() {
        let raw = "\
    Director Identification : FA-7F\n\
    Director Type           : FibreChannel\n\
    Director Status         : Online\n\
    Number of Director Ports: 2\n\
    Director Ports Status   : [ON, ON]\n\
    Director Connection Status: [Yes, No]\n\
    Director Identification : FA-8F\n\
    Director Status         : Offline\n\
    Number of Director Ports: 2\n\
    Director Ports Status   : [OFF, OFF]\n\
    Director Connection Status: [No, No]\n";
        let records = directors(raw);
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].id, "7F");
        assert_eq!(records[0].status, "Online");
        assert_eq!(records[0].ports_total, 2);
        assert_eq!(records[0].ports_online, 2);
        assert_eq!(records[0].connections_active, 1);
        assert_eq!(records[1].status, "Offline");
        assert_eq!(records[1].ports_online, 0);
    }

    #[test]
    fn test_mapped_counts_stack() {
        // The FA headers are recognized by their indentation; a
        // backslash continuation in the literal would strip it.
        let raw = concat!(
            "    FA 07F 0 \n",
            "      Available Addresses  : 4096\n",
            "    FA 07F 1 \n",
            "      Mapped Devices       : 120\n",
            "      Available Addresses  : 3976\n",
            "    FA 10F 0 \n",
            "      Mapped Devices       : 1\n",
            "      Available Addresses  : 4095\n",
        );
        let counts = mapped_counts(raw);
        assert_eq!(counts.get("7FB"), Some(&120));
        assert_eq!(counts.get("10FA"), Some(&1));
        assert_eq!(counts.get("7FA"), None);
    }

    #[test]
    fn test_login_counts() {
        let raw = "\
Director Id           : FA-7F\n\
Director Port         : 0\n\
  21000024ff234501  node1  Yes    Yes\n\
  21000024ff234502  node2  Yes    Yes\n\
Director Port         : 1\n\
  21000024ff234503  node3  No     Yes\n\
Director Id           : FA-8F\n\
Director Port         : 0\n";
        let counts = login_counts(raw);
        assert_eq!(counts.get("7FA"), Some(&2));
        assert_eq!(counts.get("7FB"), Some(&0));
        assert_eq!(counts.get("8FA"), Some(&0));
    }

    #[test]
    fn test_failed_disk_ids_and_details() {
        let raw = "\
Symmetrix ID: 000190101234\n\
DF-16C  C  1  5  Failed\n";
        assert_eq!(failed_disk_ids(raw), vec!["C:15"]);

        let detail = "\
    Vendor ID        : SEAGATE\n\
    Product ID       : ST3300 CLAR300\n\
    Serial ID        : 3SJ0ABCD\n";
        let (vendor, product, serial) = disk_details(detail);
        assert_eq!(vendor, "SEAGATE");
        assert_eq!(product, "ST3300 CLAR300");
        assert_eq!(serial, "3SJ0ABCD");
    }

    #[test]
    fn test_masking_entries() {
        let raw = "\
Director Identification : FA-7F\n\
Director Port           : 0\n\
  210000e08b123456  Fibre  host01/hba0  0123\n\
  210000e08b654321  Fibre  None\n";
        let entries = masking_entries(raw);
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0].fa, "7FA");
        assert!(entries[0].has_devices);
        assert!(!entries[1].has_devices);
    }

    #[test]
    fn test_logins_detect_unnamed_wwns() {
        let raw = "\
210000e08b123456  Fibre  210000e08b123456  null  null  Yes  Yes\n\
210000e08b654321  Fibre  host02/hba0       null  null  Yes  Yes\n\
210000e08b777777  Fibre  210000e08b777777  null  null  No   No\n";
        let records = logins(raw);
        assert_eq!(records.len(), 3);
        assert_eq!(records[0].wwn, records[0].node_name);
        assert!(records[0].logged_in);
        assert_ne!(records[1].wwn, records[1].node_name);
        assert!(!records[2].logged_in);
    }

    #[test]
    fn test_initiator_groups_from_xml() {
        let xml = "\
<SymCLI_ML><Symmetrix><Initiator_Group>\
<group_name>host01_ig</group_name>\
</Initiator_Group><Initiator_Group>\
<group_name>host02_ig</group_name>\
</Initiator_Group></Symmetrix></SymCLI_ML>";
        assert_eq!(
            initiator_groups(xml).unwrap(),
            vec!["host01_ig", "host02_ig"]
        );
    }

    #[test]
    fn test_flag_overrides_mapped_to_short_names() {
        let xml = "\
<SymCLI_ML><Initiator_Group>\
<port_flag_overrides>Yes</port_flag_overrides>\
<Override_Flags><scsi_3/><spc2_protocol_version/><scsi_support1/></Override_Flags>\
</Initiator_Group></SymCLI_ML>";
        let flags = flag_overrides(xml, "host01_ig").unwrap();
        assert_eq!(flags.group, "host01_ig");
        assert_eq!(flags.flags, vec!["sc3", "spc2", "os2007"]);
    }

    #[test]
    fn test_no_overrides_is_empty() {
        let xml = "\
<SymCLI_ML><Initiator_Group>\
<port_flag_overrides>No</port_flag_overrides>\
</Initiator_Group></SymCLI_ML>";
        assert!(flag_overrides(xml, "host01_ig").unwrap().flags.is_empty());
    }
}
