//! Small line-scanning helpers shared by the vendor parsers.
//!
//! Vendor CLI output pads columns with uneven whitespace and folds
//! logical records across physical lines; these helpers keep the
//! per-command parsers down to the interesting part.

/// Whitespace-delimited token `n` of a line.
pub fn token(line: &str, n: usize) -> Option<&str> {
    line.split_whitespace().nth(n)
}

/// Last whitespace-delimited token of a line.
pub fn last(line: &str) -> Option<&str> {
    line.split_whitespace().next_back()
}

/// Value part of a "Key: Value" line.
pub fn after_colon(line: &str) -> Option<&str> {
    line.split_once(':').map(|(_, value)| value.trim())
}

/// Leading-digits integer coercion: `"12"` is 12, `"12d"` is 12,
/// `"none"` and a missing field are 0. Counters in vendor output are
/// sometimes replaced by placeholder text.
pub fn to_u32(field: Option<&str>) -> u32 {
    let field = match field {
        Some(field) => field.trim(),
        None => return 0,
    };
    let digits: String = field.chars().take_while(|c| c.is_ascii_digit()).collect();
    digits.parse().unwrap_or(0)
}

/// Collapse runs of any of the given characters into one occurrence,
/// for log lines padded out with dots and spaces.
pub fn squeeze(line: &str, chars: &[char]) -> String {
    let mut out = String::with_capacity(line.len());
    let mut prev: Option<char> = None;
    for c in line.chars() {
        if Some(c) == prev && chars.contains(&c) {
            continue;
        }
        out.push(c);
        prev = Some(c);
    }
    out
}

/// Fold indented `[...]` continuation lines back onto their parent
/// line, the way the flogi database wraps device aliases.
pub fn fold_bracket_continuations(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    for line in raw.lines() {
        let trimmed = line.trim_start();
        if trimmed.starts_with('[') && !out.is_empty() {
            out.push(' ');
            out.push_str(trimmed);
        } else {
            if !out.is_empty() {
                out.push('\n');
            }
            out.push_str(line);
        }
    }
    out
}

/// All `[...]` bracketed substrings of a line, without the brackets.
pub fn bracketed(line: &str) -> Vec<&str> {
    let mut groups = Vec::new();
    let mut rest = line;
    while let Some(start) = rest.find('[') {
        let Some(len) = rest[start + 1..].find(']') else {
            break;
        };
        groups.push(&rest[start + 1..start + 1 + len]);
        rest = &rest[start + 1 + len..];
    }
    groups
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_to_u32_coercion() {
        assert_eq!(to_u32(Some("42")), 42);
        assert_eq!(to_u32(Some("42d")), 42);
        assert_eq!(to_u32(Some("none")), 0);
        assert_eq!(to_u32(None), 0);
    }

    #[test]
    fn test_squeeze() {
        assert_eq!(
            squeeze("Control Station.... Pass", &[' ', '.']),
            "Control Station. Pass"
        );
    }

    #[test]
    fn test_fold_bracket_continuations() {
        let raw = "fc1/1  10  0x123456  21:00:00:e0:8b:00:00:01\n          [host01_hba0]\nfc1/2  10  0x123457  21:00:00:e0:8b:00:00:02";
        let folded = fold_bracket_continuations(raw);
        assert_eq!(folded.lines().count(), 2);
        assert!(folded.lines().next().unwrap().ends_with("[host01_hba0]"));
    }

    #[test]
    fn test_bracketed() {
        assert_eq!(
            bracketed("* fcid 0x1234 [pwwn 21:00:00:e0:8b:00:00:01] [host01_hba0]"),
            vec!["pwwn 21:00:00:e0:8b:00:00:01", "host01_hba0"]
        );
        assert!(bracketed("pwwn 21:00:00:e0:8b:00:00:01").is_empty());
    }
}
