//! Snapshot-based undo/redo for the composer
//!
//! Every committed model update is offered to [`HistoryManager::try_push`].
//! Single-char typing and deletion accumulate in an open step until the step
//! closes; everything else is pushed as its own entry. Whether an edit may
//! join the open step is decided by [`should_merge`].

use super::diff::Diff;
use super::parts::Part;
use super::position::DocumentPosition;
use crate::messages::InputType;
use crate::util::is_word_boundary;

/// Default number of typed chars after which an open step is pushed
pub const DEFAULT_STEP_LENGTH: usize = 10;

/// Default cap on stored snapshots
pub const DEFAULT_MAX_ENTRIES: usize = 1000;

/// A restorable document state
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HistoryEntry {
    pub parts: Vec<Part>,
    pub caret: Option<DocumentPosition>,
    pub input_type: Option<InputType>,
}

/// The edit being offered to the history
#[derive(Debug, Clone, Copy)]
pub struct EditSummary<'a> {
    pub input_type: Option<&'a InputType>,
    pub diff: Option<&'a Diff>,
}

impl EditSummary<'_> {
    fn is_non_bulk(&self) -> bool {
        self.input_type.is_some_and(InputType::is_non_bulk) && self.diff.is_some()
    }

    fn adds(&self) -> bool {
        self.diff.is_some_and(|d| !d.added.is_empty())
    }

    fn removes(&self) -> bool {
        self.diff.is_some_and(|d| !d.removed.is_empty())
    }

    /// Offset where the next adjacent edit would happen
    fn edit_point(&self) -> Option<usize> {
        self.diff.map(|d| d.at + d.added_len())
    }
}

/// Coalescing state of the step that has not been pushed yet
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OpenStep {
    pub input_type: Option<InputType>,
    pub added: bool,
    pub removed: bool,
    /// Chars typed or deleted in this step
    pub char_count: usize,
    /// Whether a non-boundary char was typed in this step
    pub has_word_chars: bool,
    pub edit_point: Option<usize>,
}

impl OpenStep {
    pub fn is_open(&self) -> bool {
        self.added || self.removed
    }

    fn absorb(&mut self, edit: &EditSummary<'_>) {
        let Some(diff) = edit.diff else {
            return;
        };
        self.input_type = edit.input_type.cloned();
        self.added |= !diff.added.is_empty();
        self.removed |= !diff.removed.is_empty();
        let changed = if diff.added.is_empty() {
            &diff.removed
        } else {
            &diff.added
        };
        if !is_word_boundary(changed) {
            self.has_word_chars = true;
        }
        self.char_count += crate::util::char_len(changed);
        self.edit_point = edit.edit_point();
    }
}

/// Whether `edit` can join `step` without closing it first.
///
/// Only single-char typing and deletion coalesce, and only while they keep
/// the same input type, continue at the previous edit point and stay in one
/// direction (adding or removing).
pub fn should_merge(step: &OpenStep, edit: &EditSummary<'_>) -> bool {
    if !edit.is_non_bulk() || edit.adds() == edit.removes() {
        return false;
    }
    if !step.is_open() {
        return true;
    }
    let Some(diff) = edit.diff else {
        return false;
    };
    let same_type = step.input_type.as_ref() == edit.input_type;
    let same_direction = step.added == edit.adds() && step.removed == edit.removes();
    let adjacent = step
        .edit_point
        .is_some_and(|point| diff.at == point || diff.at + diff.removed_len() == point);
    same_type && same_direction && adjacent
}

/// Whether an open step should be pushed after absorbing `edit`
fn closes_step(step: &OpenStep, edit: &EditSummary<'_>, step_length: usize) -> bool {
    let boundary = edit.diff.is_some_and(|d| {
        let changed = if d.added.is_empty() { &d.removed } else { &d.added };
        is_word_boundary(changed)
    });
    (boundary && step.has_word_chars) || step.char_count > step_length
}

#[derive(Debug, Clone)]
pub struct HistoryManager {
    stack: Vec<HistoryEntry>,
    current_index: Option<usize>,
    step: OpenStep,
    /// Latest state not yet pushed
    pending: Option<HistoryEntry>,
    step_length: usize,
    max_entries: usize,
}

impl Default for HistoryManager {
    fn default() -> Self {
        Self::new()
    }
}

impl HistoryManager {
    pub fn new() -> Self {
        Self::with_limits(DEFAULT_STEP_LENGTH, DEFAULT_MAX_ENTRIES)
    }

    pub fn with_limits(step_length: usize, max_entries: usize) -> Self {
        Self {
            stack: Vec::new(),
            current_index: None,
            step: OpenStep::default(),
            pending: None,
            step_length,
            max_entries: max_entries.max(1),
        }
    }

    /// Stored snapshots (pending changes excluded)
    pub fn len(&self) -> usize {
        self.stack.len()
    }

    pub fn is_empty(&self) -> bool {
        self.stack.is_empty()
    }

    pub fn has_pending_changes(&self) -> bool {
        self.pending.is_some()
    }

    /// Drop all history and record `parts` as the only entry
    pub fn clear(&mut self, parts: &[Part], caret: Option<DocumentPosition>) {
        self.stack.clear();
        self.current_index = None;
        self.step = OpenStep::default();
        self.pending = None;
        self.push_entry(HistoryEntry {
            parts: parts.to_vec(),
            caret,
            input_type: None,
        });
    }

    fn latest(&self) -> Option<&HistoryEntry> {
        self.pending
            .as_ref()
            .or_else(|| self.current_index.and_then(|i| self.stack.get(i)))
    }

    /// Offer a committed update. Returns whether a snapshot was pushed.
    pub fn try_push(
        &mut self,
        parts: &[Part],
        caret: Option<DocumentPosition>,
        input_type: Option<&InputType>,
        diff: Option<&Diff>,
    ) -> bool {
        // replays of our own snapshots
        if input_type.is_some_and(InputType::is_history_replay) {
            return false;
        }
        if diff.is_some_and(Diff::is_empty) {
            return false;
        }
        if self.latest().is_some_and(|e| e.parts == parts && e.caret == caret) {
            return false;
        }

        let edit = EditSummary { input_type, diff };
        let entry = HistoryEntry {
            parts: parts.to_vec(),
            caret,
            input_type: input_type.cloned(),
        };

        if !should_merge(&self.step, &edit) {
            self.ensure_last_changes_pushed();
            if !edit.is_non_bulk() {
                self.push_entry(entry);
                return true;
            }
        }

        self.step.absorb(&edit);
        if closes_step(&self.step, &edit, self.step_length) {
            self.push_entry(entry);
            true
        } else {
            tracing::trace!(chars = self.step.char_count, "coalescing edit");
            self.pending = Some(entry);
            false
        }
    }

    /// Push the open step, if any
    pub fn ensure_last_changes_pushed(&mut self) {
        if let Some(entry) = self.pending.take() {
            self.push_entry(entry);
        }
    }

    fn push_entry(&mut self, entry: HistoryEntry) {
        // drop the redo branch
        let keep = self.current_index.map_or(0, |i| i + 1);
        self.stack.truncate(keep);
        self.stack.push(entry);
        if self.stack.len() > self.max_entries {
            let excess = self.stack.len() - self.max_entries;
            self.stack.drain(..excess);
        }
        self.current_index = Some(self.stack.len() - 1);
        self.step = OpenStep::default();
        self.pending = None;
        tracing::debug!(entries = self.stack.len(), "history push");
    }

    pub fn can_undo(&self) -> bool {
        self.current_index.is_some_and(|i| i >= 1) || self.pending.is_some()
    }

    pub fn can_redo(&self) -> bool {
        self.current_index
            .is_some_and(|i| i + 1 < self.stack.len())
    }

    /// Step back; returns the snapshot to restore
    pub fn undo(&mut self) -> Option<HistoryEntry> {
        if !self.can_undo() {
            return None;
        }
        self.ensure_last_changes_pushed();
        let index = self.current_index?.checked_sub(1)?;
        self.current_index = Some(index);
        self.stack.get(index).cloned()
    }

    /// Step forward; returns the snapshot to restore
    pub fn redo(&mut self) -> Option<HistoryEntry> {
        if !self.can_redo() {
            return None;
        }
        self.pending = None;
        self.step = OpenStep::default();
        let index = self.current_index? + 1;
        self.current_index = Some(index);
        self.stack.get(index).cloned()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::editor::PartCreator;

    fn diff(at: usize, added: &str, removed: &str) -> Diff {
        Diff {
            at,
            added: added.to_string(),
            removed: removed.to_string(),
        }
    }

    fn text(s: &str) -> Vec<Part> {
        vec![PartCreator::new().plain(s)]
    }

    fn caret(offset: usize) -> Option<DocumentPosition> {
        Some(DocumentPosition::new(0, offset))
    }

    /// Type `s` one char at a time after `prefix`
    fn type_chars(history: &mut HistoryManager, prefix: &str, s: &str) -> String {
        let mut current = prefix.to_string();
        for ch in s.chars() {
            let at = current.chars().count();
            current.push(ch);
            history.try_push(
                &text(&current),
                caret(at + 1),
                Some(&InputType::InsertText),
                Some(&diff(at, &ch.to_string(), "")),
            );
        }
        current
    }

    #[test]
    fn test_should_merge_requires_non_bulk() {
        let step = OpenStep::default();
        let d = diff(0, "hello", "");
        let paste = EditSummary {
            input_type: Some(&InputType::InsertFromPaste),
            diff: Some(&d),
        };
        assert!(!should_merge(&step, &paste));
        let typed = EditSummary {
            input_type: Some(&InputType::InsertText),
            diff: Some(&d),
        };
        assert!(should_merge(&step, &typed));
    }

    #[test]
    fn test_should_merge_requires_adjacency_and_direction() {
        let mut step = OpenStep::default();
        let first = diff(3, "a", "");
        step.absorb(&EditSummary {
            input_type: Some(&InputType::InsertText),
            diff: Some(&first),
        });
        let next = diff(4, "b", "");
        let typed = EditSummary {
            input_type: Some(&InputType::InsertText),
            diff: Some(&next),
        };
        assert!(should_merge(&step, &typed));

        let elsewhere = diff(0, "b", "");
        assert!(!should_merge(
            &step,
            &EditSummary {
                input_type: Some(&InputType::InsertText),
                diff: Some(&elsewhere),
            }
        ));

        let backspace = diff(3, "", "a");
        assert!(!should_merge(
            &step,
            &EditSummary {
                input_type: Some(&InputType::DeleteContentBackward),
                diff: Some(&backspace),
            }
        ));
    }

    #[test]
    fn test_word_boundary_closes_step() {
        let mut history = HistoryManager::new();
        history.clear(&[], None);
        type_chars(&mut history, "", "hi");
        assert_eq!(history.len(), 1);
        assert!(history.has_pending_changes());
        type_chars(&mut history, "hi", " ");
        assert_eq!(history.len(), 2);
        assert!(!history.has_pending_changes());
    }

    #[test]
    fn test_step_length_closes_step() {
        let mut history = HistoryManager::with_limits(3, 100);
        history.clear(&[], None);
        type_chars(&mut history, "", "abcd");
        assert_eq!(history.len(), 2);
    }

    #[test]
    fn test_direction_change_pushes_previous_state() {
        let mut history = HistoryManager::new();
        history.clear(&[], None);
        type_chars(&mut history, "", "abc");
        history.try_push(
            &text("ab"),
            caret(2),
            Some(&InputType::DeleteContentBackward),
            Some(&diff(2, "", "c")),
        );
        // "abc" was pushed, the deletion is pending
        assert_eq!(history.len(), 2);
        let undone = history.undo().unwrap();
        assert_eq!(undone.parts, text("abc"));
    }

    #[test]
    fn test_replays_and_noops_are_not_recorded() {
        let mut history = HistoryManager::new();
        history.clear(&text("a"), caret(1));
        assert!(!history.try_push(&text("b"), caret(1), Some(&InputType::HistoryUndo), None));
        assert!(!history.try_push(
            &text("a"),
            caret(1),
            Some(&InputType::InsertText),
            Some(&Diff::default())
        ));
        assert!(!history.try_push(&text("a"), caret(1), None, None));
        assert_eq!(history.len(), 1);
        assert!(!history.can_undo());
    }

    #[test]
    fn test_undo_redo_inverse() {
        let mut history = HistoryManager::new();
        history.clear(&[], None);
        let after = type_chars(&mut history, "", "abc");
        assert!(history.can_undo());
        let undone = history.undo().unwrap();
        assert!(undone.parts.is_empty());
        assert!(history.can_redo());
        let redone = history.redo().unwrap();
        assert_eq!(redone.parts, text(&after));
        assert_eq!(redone.caret, caret(3));
        assert!(!history.can_redo());
    }

    #[test]
    fn test_boundaries_are_noops() {
        let mut history = HistoryManager::new();
        assert!(history.undo().is_none());
        assert!(history.redo().is_none());
        history.clear(&[], None);
        assert!(history.undo().is_none());
    }

    #[test]
    fn test_new_edit_drops_redo_branch() {
        let mut history = HistoryManager::new();
        history.clear(&[], None);
        history.try_push(&text("pasted"), caret(6), Some(&InputType::InsertFromPaste), None);
        history.undo();
        history.try_push(&text("other"), caret(5), Some(&InputType::InsertFromPaste), None);
        assert!(!history.can_redo());
        assert_eq!(history.len(), 2);
    }

    #[test]
    fn test_max_entries_drops_oldest() {
        let mut history = HistoryManager::with_limits(10, 3);
        history.clear(&[], None);
        for s in ["a", "ab", "abc", "abcd"] {
            history.try_push(&text(s), None, Some(&InputType::InsertFromPaste), None);
        }
        assert_eq!(history.len(), 3);
        assert_eq!(history.undo().unwrap().parts, text("abc"));
    }
}
