//! Unicode-aware width helpers.

use unicode_width::{UnicodeWidthChar, UnicodeWidthStr};

/// Get the visual width of a string in terminal cells.
///
/// Accounts for wide characters (CJK, emoji) that take 2 cells.
pub fn visual_width(s: &str) -> usize {
    UnicodeWidthStr::width(s)
}

/// Truncate a string to fit within a maximum visual width, appending "..."
/// when anything was cut.
pub fn truncate_to_width(s: &str, max_width: usize) -> String {
    if visual_width(s) <= max_width {
        return s.to_string();
    }

    let target_width = max_width.saturating_sub(3);
    let mut result = String::new();
    let mut width = 0;

    for ch in s.chars() {
        let ch_width = UnicodeWidthChar::width(ch).unwrap_or(0);
        if width + ch_width > target_width {
            break;
        }
        result.push(ch);
        width += ch_width;
    }

    result.push_str("...");
    result
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_visual_width() {
        assert_eq!(visual_width("hello"), 5);
        assert_eq!(visual_width(""), 0);
        assert_eq!(visual_width("你好"), 4);
    }

    #[test]
    fn test_truncate() {
        assert_eq!(truncate_to_width("hello", 5), "hello");
        assert_eq!(truncate_to_width("hello world", 8), "hello...");
        assert_eq!(truncate_to_width("hello", 2), "...");
    }

    #[test]
    fn test_truncate_wide_chars() {
        let result = truncate_to_width("你好世界", 7);
        assert_eq!(result, "你好...");
    }
}
