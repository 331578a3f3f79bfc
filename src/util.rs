// Utility helpers for parsing and text layout.
//
// This module centralizes the "dirty" CSV/number handling so the rest of
// the code can assume clean, typed values.
use num_format::{Locale, ToFormattedString};

/// Parse a string field into a non-negative count while being forgiving
/// about formatting issues that are common in CSV exports.
///
/// - Trims whitespace.
/// - Rejects values that contain alphabetic characters.
/// - Strips thousands separators like `","` before parsing.
/// - Returns `None` for anything that cannot be safely parsed
///   (including negative values, since counts cannot go below zero).
pub fn parse_count(s: &str) -> Option<u64> {
    let s = s.trim();
    if s.is_empty() {
        return None;
    }
    if s.chars().any(|c| c.is_ascii_alphabetic()) {
        return None;
    }
    let s = s.replace(',', "");
    s.parse::<u64>().ok()
}

/// Greedy word wrap to a maximum number of characters per line.
///
/// Used for narrative blocks in the report; the PDF renderer converts its
/// content width into a character budget for the builtin faces. Always
/// returns at least one (possibly empty) line so callers can emit a blank
/// paragraph without special-casing.
pub fn wrap_text(text: &str, max_chars: usize) -> Vec<String> {
    let mut lines = Vec::new();
    let mut current = String::new();

    for word in text.split_whitespace() {
        if current.is_empty() {
            current = word.to_string();
        } else if current.len() + 1 + word.len() <= max_chars {
            current.push(' ');
            current.push_str(word);
        } else {
            lines.push(current);
            current = word.to_string();
        }
    }
    if !current.is_empty() {
        lines.push(current);
    }
    if lines.is_empty() {
        lines.push(String::new());
    }
    lines
}

pub fn format_int<T>(n: T) -> String
where
    T: ToFormattedString,
{
    // Thin wrapper around `num-format` for integer-like values. This is
    // used for counts in console messages (e.g., `9,855 rows loaded`).
    n.to_formatted_string(&Locale::en)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_count_accepts_plain_and_separated_numbers() {
        assert_eq!(parse_count("42"), Some(42));
        assert_eq!(parse_count(" 3,000 "), Some(3000));
        assert_eq!(parse_count("0"), Some(0));
    }

    #[test]
    fn parse_count_rejects_garbage() {
        assert_eq!(parse_count(""), None);
        assert_eq!(parse_count("  "), None);
        assert_eq!(parse_count("abc"), None);
        assert_eq!(parse_count("12 incidents"), None);
        assert_eq!(parse_count("-5"), None);
        assert_eq!(parse_count("3.5"), None);
    }

    #[test]
    fn wrap_text_respects_budget_and_word_boundaries() {
        let lines = wrap_text("one two three four five", 9);
        assert_eq!(lines, vec!["one two", "three", "four five"]);
        for line in &lines {
            assert!(line.len() <= 9);
        }
    }

    #[test]
    fn wrap_text_empty_input_yields_one_empty_line() {
        assert_eq!(wrap_text("", 20), vec![String::new()]);
    }

    #[test]
    fn wrap_text_overlong_word_gets_its_own_line() {
        let lines = wrap_text("tiny incomprehensibilities tiny", 10);
        assert_eq!(lines, vec!["tiny", "incomprehensibilities", "tiny"]);
    }

    #[test]
    fn format_int_groups_thousands() {
        assert_eq!(format_int(1234567u64), "1,234,567");
    }
}
