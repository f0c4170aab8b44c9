//! Common utilities for document generation.
//!
//! Shared helpers for template lookup, date formatting and filenames.

use chrono::{Datelike, NaiveDate};
use std::path::PathBuf;

/// Format a date the way the letters print it (e.g., "18 October 2026").
pub fn format_letter_date(date: NaiveDate) -> String {
    const MONTHS: [&str; 12] = [
        "January",
        "February",
        "March",
        "April",
        "May",
        "June",
        "July",
        "August",
        "September",
        "October",
        "November",
        "December",
    ];

    let month = MONTHS[(date.month0() as usize).min(MONTHS.len() - 1)];
    format!("{} {} {}", date.day(), month, date.year())
}

/// Lowercase ASCII slug of `name` for download filenames: words split on
/// whitespace, `-` or `_` are joined by single dashes and other characters
/// are dropped. Returns `fallback` when nothing usable is left.
pub fn sanitize_filename(name: &str, fallback: &str) -> String {
    let slug = name
        .split(|c: char| c.is_whitespace() || c == '-' || c == '_')
        .map(|word| {
            word.chars()
                .filter(char::is_ascii_alphanumeric)
                .map(|c| c.to_ascii_lowercase())
                .collect::<String>()
        })
        .filter(|word| !word.is_empty())
        .collect::<Vec<_>>()
        .join("-");

    if slug.is_empty() {
        fallback.to_string()
    } else {
        slug
    }
}

/// Template directory shipped with the crate.
pub fn default_template_dir() -> PathBuf {
    PathBuf::from(concat!(env!("CARGO_MANIFEST_DIR"), "/static/templates"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_letter_date() {
        let date = NaiveDate::from_ymd_opt(2026, 10, 18).unwrap();
        assert_eq!(format_letter_date(date), "18 October 2026");
    }

    #[test]
    fn test_sanitize_filename() {
        assert_eq!(sanitize_filename("  Al-imam  Hossain ", "doc"), "al-imam-hossain");
        assert_eq!(sanitize_filename("D2786G#4", "doc"), "d2786g4");
        assert_eq!(sanitize_filename("###", "doc"), "doc");
        assert_eq!(sanitize_filename("Nirob_", "doc"), "nirob");
        assert_eq!(sanitize_filename("Nirob - _ Imam", "doc"), "nirob-imam");
        assert_eq!(sanitize_filename("Jos\u{e9} M\u{fc}ller", "doc"), "jos-mller");
    }
}
