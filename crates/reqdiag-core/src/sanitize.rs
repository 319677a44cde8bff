use once_cell::sync::Lazy;
use regex::Regex;
use std::borrow::Cow;

static ANSI_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\x1b\[[0-9;]*[A-Za-z]").unwrap());

/// Remove terminal color/control sequences so marker matching sees plain text.
pub fn strip_ansi(line: &str) -> Cow<'_, str> {
    ANSI_RE.replace_all(line, "")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_plain_text_is_borrowed() {
        let line = "2025-01-01 INFO nothing to see";
        assert!(matches!(strip_ansi(line), Cow::Borrowed(_)));
    }

    #[test]
    fn test_color_codes_removed() {
        let line = "\x1b[2m2025-01-01T00:00:00Z\x1b[0m \x1b[34mDEBUG\x1b[0m Kiro request body: {}";
        assert_eq!(
            strip_ansi(line),
            "2025-01-01T00:00:00Z DEBUG Kiro request body: {}"
        );
    }

    #[test]
    fn test_multi_parameter_sequences() {
        assert_eq!(strip_ansi("\x1b[1;38;5;196mred\x1b[K"), "red");
    }

    #[test]
    fn test_lone_escape_passes_through() {
        assert_eq!(strip_ansi("a\x1b b"), "a\x1b b");
    }
}
