//! Bounded-resource string sanitization for log lines and bar text.
//!
//! Control characters would corrupt the cursor-addressed bar rows, so they
//! are replaced with a visible placeholder before anything reaches a sink.
//! Over-length input is clamped to an exact character budget ending in a
//! truncation marker. Both passes are idempotent: clean, in-bounds input
//! comes back unchanged.

/// Placeholder glyph substituted for disallowed control characters.
pub const REPLACEMENT: char = '\u{FFFD}';

/// Marker appended when a string is clamped to its maximum length.
pub const TRUNCATION_MARKER: &str = "...";

fn replace_controls(input: &str, allow_newline: bool) -> String {
    let mut output = String::with_capacity(input.len());
    for c in input.chars() {
        let allowed = c == '\t' || (allow_newline && c == '\n');
        if allowed || !(c.is_control() || c == '\u{7f}') {
            output.push(c);
        } else {
            output.push(REPLACEMENT);
        }
    }
    output
}

fn clamp(mut text: String, max_len: usize) -> String {
    if text.chars().count() <= max_len {
        return text;
    }
    // A budget smaller than the marker gets a plain cut, never a marker
    // that would itself exceed the budget.
    if max_len < TRUNCATION_MARKER.len() {
        return text.chars().take(max_len).collect();
    }
    let keep = max_len - TRUNCATION_MARKER.len();
    text = text.chars().take(keep).collect();
    text.push_str(TRUNCATION_MARKER);
    text
}

/// Sanitize single-line text (bar prefixes/postfixes, source tags).
///
/// Tab passes through; every other control character, including newline,
/// becomes [`REPLACEMENT`]. The result never exceeds `max_len` characters.
pub fn sanitize(input: &str, max_len: usize) -> String {
    clamp(replace_controls(input, false), max_len)
}

/// Sanitize log-message text, additionally letting newlines through.
pub fn sanitize_multiline(input: &str, max_len: usize) -> String {
    clamp(replace_controls(input, true), max_len)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clean_input_unchanged() {
        assert_eq!(sanitize("plain text\twith tab", 64), "plain text\twith tab");
        assert_eq!(sanitize_multiline("two\nlines", 64), "two\nlines");
    }

    #[test]
    fn test_control_chars_replaced() {
        assert_eq!(sanitize("a\x07b", 64), "a\u{FFFD}b");
        assert_eq!(sanitize("a\x7fb", 64), "a\u{FFFD}b");
        // Newline is a control character for the single-line variant.
        assert_eq!(sanitize("a\nb", 64), "a\u{FFFD}b");
        assert_eq!(sanitize_multiline("a\nb", 64), "a\nb");
    }

    #[test]
    fn test_truncation_exact_length() {
        let input = "x".repeat(40);
        let output = sanitize(&input, 16);
        assert_eq!(output.chars().count(), 16);
        assert!(output.ends_with(TRUNCATION_MARKER));
        assert_eq!(output, format!("{}...", "x".repeat(13)));
    }

    #[test]
    fn test_idempotent() {
        let once = sanitize(&"y\x01".repeat(30), 20);
        let twice = sanitize(&once, 20);
        assert_eq!(once, twice);
    }

    #[test]
    fn test_tiny_limit_never_exceeded() {
        // Budgets below the marker length still hold exactly.
        assert_eq!(sanitize("abcdef", 2), "ab");
        assert_eq!(sanitize("abcdef", 1), "a");
        assert_eq!(sanitize("abcdef", 0), "");
        assert_eq!(sanitize("abcdef", 3), "...");
    }

    #[test]
    fn test_at_limit_not_truncated() {
        let input = "z".repeat(16);
        assert_eq!(sanitize(&input, 16), input);
    }
}
