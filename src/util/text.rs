//! Char-indexed string helpers
//!
//! All offsets in the composer are counted in `char`s, which is also how the
//! editable surface reports its caret. These helpers keep the byte/char
//! conversions in one place.

/// Number of chars in `s`
pub fn char_len(s: &str) -> usize {
    s.chars().count()
}

/// Convert a char offset to a byte offset (clamped to the end of the string)
pub fn byte_offset(s: &str, char_offset: usize) -> usize {
    s.char_indices()
        .nth(char_offset)
        .map(|(i, _)| i)
        .unwrap_or(s.len())
}

/// Slice `s` by char indices, clamping both ends
pub fn char_slice(s: &str, start: usize, end: usize) -> &str {
    let start_byte = byte_offset(s, start);
    let end_byte = byte_offset(s, end.max(start));
    &s[start_byte..end_byte]
}

/// Everything from char offset `start` to the end
pub fn char_tail(s: &str, start: usize) -> &str {
    &s[byte_offset(s, start)..]
}

/// Everything before char offset `end`
pub fn char_head(s: &str, end: usize) -> &str {
    &s[..byte_offset(s, end)]
}

/// The char at a char offset
pub fn char_at(s: &str, offset: usize) -> Option<char> {
    s.chars().nth(offset)
}

/// `\w` as slash commands understand it
pub fn is_word_char(ch: char) -> bool {
    ch.is_alphanumeric() || ch == '_'
}

/// Whether the whole string is a single word boundary (space, tab or newline)
pub fn is_word_boundary(s: &str) -> bool {
    matches!(s, " " | "\t" | "\n")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_char_slice_multibyte() {
        let s = "héllo 🙂 there";
        assert_eq!(char_len(s), 13);
        assert_eq!(char_slice(s, 1, 5), "éllo");
        assert_eq!(char_slice(s, 6, 7), "🙂");
        assert_eq!(char_tail(s, 8), "there");
        assert_eq!(char_head(s, 2), "hé");
    }

    #[test]
    fn test_char_slice_clamps() {
        assert_eq!(char_slice("abc", 2, 10), "c");
        assert_eq!(char_slice("abc", 5, 10), "");
        assert_eq!(char_slice("abc", 2, 1), "");
    }

    #[test]
    fn test_word_boundary() {
        assert!(is_word_boundary(" "));
        assert!(is_word_boundary("\n"));
        assert!(!is_word_boundary("a"));
        assert!(!is_word_boundary("  "));
    }
}
