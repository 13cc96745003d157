//! Localized text diffs between the model text and the surface text
//!
//! The surface reports only its new full text and caret. Since an edit always
//! happens just before the caret, comparing the text before the caret is
//! enough to find the changed span without reparsing the whole document.

use crate::util::{char_head, char_len, char_tail};

/// A single contiguous edit at char offset `at`
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Diff {
    pub at: usize,
    pub added: String,
    pub removed: String,
}

impl Diff {
    pub fn is_empty(&self) -> bool {
        self.added.is_empty() && self.removed.is_empty()
    }

    pub fn added_len(&self) -> usize {
        char_len(&self.added)
    }

    pub fn removed_len(&self) -> usize {
        char_len(&self.removed)
    }
}

/// Char index of the first difference between `a` and `b`
fn first_diff(a: &str, b: &str) -> usize {
    a.chars()
        .zip(b.chars())
        .position(|(x, y)| x != y)
        .unwrap_or_else(|| char_len(a).min(char_len(b)))
}

/// Diff two strings that end at the same (caret) position
pub fn diff_strings_at_end(old: &str, new: &str) -> Diff {
    let old_len = char_len(old);
    let new_len = char_len(new);
    let len = old_len.min(new_len);
    if old_len > new_len && char_head(old, len) == char_head(new, len) {
        return Diff {
            at: len,
            added: String::new(),
            removed: char_tail(old, len).to_string(),
        };
    }
    let at = first_diff(old, new);
    Diff {
        at,
        added: char_tail(new, at).to_string(),
        removed: char_tail(old, at).to_string(),
    }
}

/// Diff for a pure deletion anywhere in the text (drag-and-drop moves)
pub fn diff_deletion(old: &str, new: &str) -> Diff {
    if old == new {
        return Diff::default();
    }
    let at = first_diff(old, new);
    let amount = char_len(old).saturating_sub(char_len(new));
    Diff {
        at,
        added: String::new(),
        removed: crate::util::char_slice(old, at, at + amount).to_string(),
    }
}

/// Diff the text before the caret. `caret` is the caret offset in `new`.
pub fn diff_at_caret(old: &str, new: &str, caret: usize) -> Diff {
    let diff_len = char_len(new) as isize - char_len(old) as isize;
    let caret_before_input = (caret as isize - diff_len).max(0) as usize;
    diff_strings_at_end(char_head(old, caret_before_input), char_head(new, caret))
}
