//! Common utilities and helper functions
//!
//! This module provides shared utilities used across the application.

use regex::Regex;
use std::sync::OnceLock;

/// Normalize whitespace in text
pub fn normalize_whitespace(text: &str) -> String {
    static WHITESPACE_RE: OnceLock<Regex> = OnceLock::new();

    let re = WHITESPACE_RE.get_or_init(|| Regex::new(r"\s+").expect("Invalid regex pattern"));

    re.replace_all(text.trim(), " ").to_string()
}

/// Sanitize filename by removing invalid characters
pub fn sanitize_filename(filename: &str) -> String {
    static INVALID_CHARS: OnceLock<Regex> = OnceLock::new();

    let re =
        INVALID_CHARS.get_or_init(|| Regex::new(r#"[<>:"/\\|?*]"#).expect("Invalid regex pattern"));

    re.replace_all(filename, "_").to_string()
}

/// Terminal column width of text, counting East Asian wide characters as two
pub fn display_width(text: &str) -> usize {
    text.chars().map(|c| if is_wide(c) { 2 } else { 1 }).sum()
}

fn is_wide(c: char) -> bool {
    matches!(
        u32::from(c),
        0x1100..=0x115F
            | 0x2E80..=0x303E
            | 0x3041..=0x33FF
            | 0x3400..=0x4DBF
            | 0x4E00..=0x9FFF
            | 0xA000..=0xA4CF
            | 0xAC00..=0xD7A3
            | 0xF900..=0xFAFF
            | 0xFE30..=0xFE4F
            | 0xFF00..=0xFF60
            | 0xFFE0..=0xFFE6
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_whitespace() {
        assert_eq!(normalize_whitespace("  hello   world  "), "hello world");
        assert_eq!(normalize_whitespace("美容\n\n液"), "美容 液");
    }

    #[test]
    fn test_sanitize_filename() {
        assert_eq!(
            sanitize_filename("beauty_trends_2026-10-17 06:00.json"),
            "beauty_trends_2026-10-17 06_00.json"
        );
        assert_eq!(sanitize_filename("valid_filename.json"), "valid_filename.json");
    }

    #[test]
    fn test_display_width() {
        assert_eq!(display_width("serum"), 5);
        assert_eq!(display_width("化粧水"), 6);
        assert_eq!(display_width("ｺｽﾒ"), 3);
        assert_eq!(display_width("スキンケア"), 10);
    }
}
