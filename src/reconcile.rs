//! Set-difference reconciliation helpers.
//!
//! Several checks reduce to "everything known minus everything in
//! active use": stale device aliases, inactive zones, NAR files not
//! yet fetched, unmapped vdisks, already-remediated hosts.

use std::collections::HashSet;
use std::hash::Hash;
use std::io;
use std::path::Path;

/// Elements of `all` that do not appear in `referenced`.
///
/// Order-preserving over `all`; duplicates in `all` are reported once.
/// Empty when `referenced` is a superset of `all`.
pub fn set_difference<T>(all: &[T], referenced: &[T]) -> Vec<T>
where
    T: Eq + Hash + Clone,
{
    let referenced: HashSet<&T> = referenced.iter().collect();
    let mut seen = HashSet::new();
    all.iter()
        .filter(|item| !referenced.contains(item) && seen.insert(*item))
        .cloned()
        .collect()
}

/// Case-insensitive [`set_difference`] for identifier strings. Vendor
/// listings and hand-maintained files disagree on case.
pub fn set_difference_ci(all: &[String], referenced: &[String]) -> Vec<String> {
    let referenced: HashSet<String> = referenced.iter().map(|s| s.to_ascii_uppercase()).collect();
    let mut seen = HashSet::new();
    all.iter()
        .filter(|item| {
            let key = item.to_ascii_uppercase();
            !referenced.contains(&key) && seen.insert(key)
        })
        .cloned()
        .collect()
}

/// Read an identifier-per-line file (no header), e.g. the
/// consolidated-hosts list. A missing file is an empty set, not an
/// error.
pub fn read_id_file(path: &Path) -> io::Result<Vec<String>> {
    let text = match std::fs::read_to_string(path) {
        Ok(text) => text,
        Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(Vec::new()),
        Err(e) => return Err(e),
    };
    Ok(text
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(str::to_string)
        .collect())
}
