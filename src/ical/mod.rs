//! This module handles conversion between iCal files and internal representations
//!
//! It is a wrapper around different Rust third-party libraries, since I haven't find any complete library that is able to parse _and_ generate iCal files

mod parser;
pub use parser::{parse_calendar, parse_incidence};
mod builder;
pub use builder::{build_calendar, build_incidences};
mod vcal;
pub use vcal::build_vcalendar;

/// Undo the RFC5545 `TEXT` escaping (`\n`, `\,`, `\;`, `\\`)
pub fn unescape_text(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    let mut chars = value.chars();
    while let Some(c) = chars.next() {
        if c != '\\' {
            out.push(c);
            continue;
        }
        match chars.next() {
            Some('n') | Some('N') => out.push('\n'),
            Some(other) => out.push(other),
            None => out.push('\\'),
        }
    }
    out
}

/// Split a multi-valued `TEXT` property on the commas that are not escaped, and unescape every item
pub fn split_text_list(value: &str) -> Vec<String> {
    let mut items = Vec::new();
    let mut current = String::new();
    let mut escaped = false;
    for c in value.chars() {
        if escaped {
            current.push('\\');
            current.push(c);
            escaped = false;
        } else if c == '\\' {
            escaped = true;
        } else if c == ',' {
            items.push(unescape_text(current.trim()));
            current.clear();
        } else {
            current.push(c);
        }
    }
    if escaped {
        current.push('\\');
    }
    items.push(unescape_text(current.trim()));
    items.into_iter().filter(|s| s.is_empty() == false).collect()
}


#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unescape() {
        assert_eq!(unescape_text(r"Line 1\nLine 2\, with comma\; and \\ backslash"), "Line 1\nLine 2, with comma; and \\ backslash");
        assert_eq!(unescape_text("trailing\\"), "trailing\\");
    }

    #[test]
    fn test_split_list() {
        assert_eq!(split_text_list(r"Work,Meeting\, important, Travel"), vec!["Work", "Meeting, important", "Travel"]);
        assert!(split_text_list("").is_empty());
    }
}
