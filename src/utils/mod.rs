//! Small text helpers for log lines and outbound replies.

use std::borrow::Cow;

/// First `max_chars` characters of `s`, with an ellipsis when cut.
///
/// Counts chars rather than bytes so transcripts in Cyrillic never get sliced
/// mid-codepoint.
pub fn preview(s: &str, max_chars: usize) -> String {
    match s.char_indices().nth(max_chars) {
        Some((cut, _)) => format!("{}…", &s[..cut]),
        None => s.to_string(),
    }
}

/// `s` cut to at most `max_chars` characters, the last one an ellipsis when cut.
pub fn fit_chars(s: &str, max_chars: usize) -> Cow<'_, str> {
    if max_chars == 0 {
        return Cow::Borrowed("");
    }
    match s.char_indices().nth(max_chars) {
        None => Cow::Borrowed(s),
        Some(_) => {
            let cut = s
                .char_indices()
                .nth(max_chars - 1)
                .map(|(i, _)| i)
                .unwrap_or(s.len());
            Cow::Owned(format!("{}…", &s[..cut]))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_preview_short_text_unchanged() {
        assert_eq!(preview("hello", 10), "hello");
        assert_eq!(preview("hello", 5), "hello");
        assert_eq!(preview("", 3), "");
    }

    #[test]
    fn test_preview_cuts_on_char_boundary() {
        assert_eq!(preview("привет мир", 6), "привет…");
        assert_eq!(preview("hi🦀bye", 3), "hi🦀…");
    }

    #[test]
    fn test_preview_zero() {
        assert_eq!(preview("abc", 0), "…");
    }

    #[test]
    fn test_fit_chars_keeps_short_text() {
        assert!(matches!(fit_chars("hello", 5), Cow::Borrowed("hello")));
        assert_eq!(fit_chars("", 4), "");
    }

    #[test]
    fn test_fit_chars_never_exceeds_limit() {
        let long = "слово ".repeat(1000);
        let fitted = fit_chars(&long, 4096);
        assert_eq!(fitted.chars().count(), 4096);
        assert!(fitted.ends_with('…'));
        assert_eq!(fit_chars("abcdef", 3), "ab…");
        assert_eq!(fit_chars("abc", 0), "");
    }
}
