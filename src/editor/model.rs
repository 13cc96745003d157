//! The composer document model
//!
//! [`EditorModel`] owns the parts of one message. Every mutating operation
//! normalizes the parts (empty parts dropped, adjacent plain parts merged),
//! bumps the model generation and returns a [`ModelUpdate`] describing what
//! the host should render and record in its history.

use super::autocomplete::{AutoComplete, AutoCompleteAction};
use super::diff::{diff_at_caret, diff_deletion, Diff};
use super::parts::{Part, PartCreator, SerializedPart};
use super::position::{DocumentOffset, DocumentPosition, Selection};
use super::range::Range;
use super::EditorError;
use crate::messages::InputType;
use crate::util::char_len;

/// Hook run after every `update`, before the caret is resolved. Returns the
/// number of chars it added (negative when it removed some).
pub type TransformHook =
    fn(&mut EditorModel, DocumentPosition, &InputType, &Diff) -> Result<isize, EditorError>;

/// Result of a model mutation, handed to the host for rendering and history
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ModelUpdate {
    /// Where the surface caret or selection should go, if anywhere
    pub selection: Option<Selection>,
    pub input_type: Option<InputType>,
    pub diff: Option<Diff>,
}

#[derive(Clone)]
pub struct EditorModel {
    parts: Vec<Part>,
    part_creator: PartCreator,
    generation: u64,
    active_part: Option<usize>,
    auto_complete: Option<AutoComplete>,
    transform_hook: Option<TransformHook>,
}

impl std::fmt::Debug for EditorModel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EditorModel")
            .field("parts", &self.parts)
            .field("generation", &self.generation)
            .field("active_part", &self.active_part)
            .field("auto_complete", &self.auto_complete)
            .field("transform_hook", &self.transform_hook.is_some())
            .finish()
    }
}

impl EditorModel {
    pub fn new(parts: Vec<Part>, part_creator: PartCreator) -> Self {
        let mut model = Self {
            parts,
            part_creator,
            generation: 0,
            active_part: None,
            auto_complete: None,
            transform_hook: None,
        };
        model.merge_adjacent_parts();
        model
    }

    pub fn parts(&self) -> &[Part] {
        &self.parts
    }

    pub fn part_creator(&self) -> &PartCreator {
        &self.part_creator
    }

    pub fn part_creator_mut(&mut self) -> &mut PartCreator {
        &mut self.part_creator
    }

    /// Bumped by every mutation; ranges from an older generation are stale
    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn is_empty(&self) -> bool {
        self.parts.iter().all(Part::is_empty)
    }

    /// The flat document text
    pub fn text(&self) -> String {
        self.parts.iter().map(|p| p.text.as_str()).collect()
    }

    pub fn len(&self) -> usize {
        self.parts.iter().map(Part::len).sum()
    }

    pub fn serialize_parts(&self) -> Vec<SerializedPart> {
        self.parts.iter().map(Part::serialize).collect()
    }

    pub fn set_transform_hook(&mut self, hook: Option<TransformHook>) {
        self.transform_hook = hook;
    }

    /// The open autocomplete session, if the caret is in a candidate part
    pub fn auto_complete(&self) -> Option<&AutoComplete> {
        self.auto_complete.as_ref()
    }

    pub fn position_at_end(&self) -> DocumentPosition {
        match self.parts.last() {
            Some(last) => DocumentPosition::new(self.parts.len() - 1, last.len()),
            None => DocumentPosition::default(),
        }
    }

    /// Resolve a flat offset. Offsets past the end clamp to the end; on a
    /// part boundary `at_part_end` picks the end of the preceding part.
    pub fn position_for_offset(&self, total_offset: usize, at_part_end: bool) -> DocumentPosition {
        let mut current = 0;
        for (index, part) in self.parts.iter().enumerate() {
            let end = current + part.len();
            if (at_part_end && end >= total_offset) || (!at_part_end && end > total_offset) {
                return DocumentPosition::new(index, total_offset - current);
            }
            current = end;
        }
        self.position_at_end()
    }

    /// A range between two positions (collapsed when `b` is `None`)
    pub fn start_range(&self, a: DocumentPosition, b: Option<DocumentPosition>) -> Range {
        Range::new(a, b.unwrap_or(a), self.generation)
    }

    fn check_position(&self, pos: DocumentPosition) -> Result<(), EditorError> {
        if pos.is_valid(&self.parts) {
            Ok(())
        } else {
            Err(EditorError::InvalidPosition {
                index: pos.index,
                offset: pos.offset,
            })
        }
    }

    pub(super) fn check_generation(&self, generation: u64) -> Result<(), EditorError> {
        if generation == self.generation {
            Ok(())
        } else {
            Err(EditorError::StaleRange {
                range: generation,
                model: self.generation,
            })
        }
    }

    /// Reconcile the surface text after an edit.
    ///
    /// `caret` is the caret in `new_text`. Only the span changed before the
    /// caret is diffed and applied, so parts the edit did not touch survive.
    pub fn update(
        &mut self,
        new_text: &str,
        input_type: InputType,
        caret: DocumentOffset,
    ) -> Result<ModelUpdate, EditorError> {
        let diff = self.diff(new_text, &input_type, caret.offset);
        let mut position = self.position_for_offset(diff.at, caret.at_node_end);
        let mut removed_offset_decrease = 0;
        if !diff.removed.is_empty() {
            removed_offset_decrease = self.remove_text(position, diff.removed_len())?;
            position = self.position_for_offset(
                diff.at - removed_offset_decrease,
                caret.at_node_end,
            );
        }
        let mut added_len = 0;
        if !diff.added.is_empty() {
            added_len = self.add_text(position, &diff.added, &input_type);
        }
        self.merge_adjacent_parts();
        if !diff.is_empty() {
            self.generation += 1;
        }

        let caret_offset = diff.at - removed_offset_decrease + added_len;
        let mut new_position = self.position_for_offset(caret_offset, true);
        if let Some(hook) = self.transform_hook {
            let transform_added = hook(self, new_position, &input_type, &diff)?;
            if transform_added != 0 {
                new_position = self
                    .position_for_offset(caret_offset.saturating_add_signed(transform_added), true);
            }
        }
        self.set_active_part(new_position, !input_type.is_paste_or_drop());

        tracing::debug!(
            input_type = %input_type,
            at = diff.at,
            added = diff.added_len(),
            removed = diff.removed_len(),
            parts = self.parts.len(),
            "model update"
        );

        Ok(ModelUpdate {
            selection: Some(Selection::Collapsed(new_position)),
            input_type: Some(input_type),
            diff: Some(diff),
        })
    }

    fn diff(&self, new_text: &str, input_type: &InputType, caret: usize) -> Diff {
        let previous = self.text();
        if *input_type == InputType::DeleteByDrag {
            diff_deletion(&previous, new_text)
        } else {
            diff_at_caret(&previous, new_text, caret.min(char_len(new_text)))
        }
    }

    /// Run a batch of mutations as one update. `f` returns where the caret
    /// (or selection) should end up.
    pub fn transform<F>(&mut self, f: F) -> Result<ModelUpdate, EditorError>
    where
        F: FnOnce(&mut EditorModel) -> Result<Selection, EditorError>,
    {
        let selection = f(self)?;
        self.check_position(selection.start())?;
        self.check_position(selection.end())?;
        if let Selection::Collapsed(pos) = selection {
            self.set_active_part(pos, true);
        }
        Ok(ModelUpdate {
            selection: Some(selection),
            input_type: None,
            diff: None,
        })
    }

    /// Replace the whole document. The caret defaults to the end.
    pub fn reset(
        &mut self,
        parts: Vec<Part>,
        caret: Option<DocumentPosition>,
        input_type: Option<InputType>,
    ) -> Result<ModelUpdate, EditorError> {
        if let Some(caret) = caret {
            if !caret.is_valid(&parts) {
                return Err(EditorError::InvalidPosition {
                    index: caret.index,
                    offset: caret.offset,
                });
            }
        }
        self.parts = parts;
        self.generation += 1;
        self.active_part = None;
        self.close_auto_complete();
        let caret = caret.unwrap_or_else(|| self.position_at_end());
        Ok(ModelUpdate {
            selection: Some(Selection::Collapsed(caret)),
            input_type,
            diff: None,
        })
    }

    /// Splice `parts` in at `position`; returns the inserted length in chars
    pub fn insert(&mut self, parts: Vec<Part>, position: DocumentPosition) -> Result<usize, EditorError> {
        self.check_position(position)?;
        let insert_index = self.split_at(position);
        let inserted: usize = parts.iter().map(Part::len).sum();
        self.parts.splice(insert_index..insert_index, parts);
        self.merge_adjacent_parts();
        self.generation += 1;
        Ok(inserted)
    }

    /// Remove `len` chars starting at `pos`. Non-editable parts are removed
    /// whole; the returned value is how far the caret moves back because of
    /// that.
    pub fn remove_text(&mut self, pos: DocumentPosition, len: usize) -> Result<usize, EditorError> {
        self.check_position(pos)?;
        let DocumentPosition { mut index, mut offset } = pos;
        let mut remaining = len;
        let mut removed_offset_decrease = 0;
        while remaining > 0 && index < self.parts.len() {
            let part_len = self.parts[index].len();
            let amount = remaining.min(part_len - offset.min(part_len));
            if amount > 0 {
                if self.parts[index].can_edit() {
                    if let Some(replacement) = self.parts[index].remove(offset, amount) {
                        self.parts[index] = self.part_creator.plain(replacement);
                    }
                    if self.parts[index].is_empty() {
                        self.parts.remove(index);
                    } else {
                        index += 1;
                    }
                } else {
                    removed_offset_decrease += offset;
                    self.parts.remove(index);
                }
            } else {
                index += 1;
            }
            remaining -= amount;
            offset = 0;
        }
        self.generation += 1;
        Ok(removed_offset_decrease)
    }

    /// Insert typed text; returns how far the caret advances
    fn add_text(&mut self, pos: DocumentPosition, text: &str, input_type: &InputType) -> usize {
        let mut index = pos.index;
        let mut add_len = char_len(text);
        let mut rest = Some(text);
        if let Some(part) = self.parts.get_mut(index) {
            if part.can_edit() {
                if part.validate_and_insert(pos.offset, text, input_type) {
                    rest = None;
                } else {
                    let tail = part.split(pos.offset);
                    index += 1;
                    self.parts.insert(index, tail);
                }
            } else if pos.offset != 0 {
                // caret after a pill: the text goes after it
                add_len += part.len() - pos.offset;
                index += 1;
            }
        }
        while let Some(s) = rest {
            let mut part = self.part_creator.create_part_for_input(s, index, input_type);
            rest = part.append_until_rejected(s, input_type);
            if part.is_empty() {
                let mut chars = s.chars();
                part = self.part_creator.plain(chars.next().map(String::from).unwrap_or_default());
                rest = Some(chars.as_str()).filter(|r| !r.is_empty());
            }
            self.parts.insert(index, part);
            index += 1;
        }
        add_len
    }

    /// Split the part at `pos`; returns the index of the part after the split
    fn split_at(&mut self, pos: DocumentPosition) -> usize {
        if pos.offset == 0 {
            return pos.index.min(self.parts.len());
        }
        let Some(part) = self.parts.get_mut(pos.index) else {
            return self.parts.len();
        };
        if pos.offset >= part.len() {
            return pos.index + 1;
        }
        let tail = part.split(pos.offset);
        self.parts.insert(pos.index + 1, tail);
        pos.index + 1
    }

    /// Substitute the parts between two positions
    pub(super) fn replace_range(
        &mut self,
        start: DocumentPosition,
        end: DocumentPosition,
        parts: Vec<Part>,
    ) {
        // the end offset does not depend on how the start split reshapes parts
        let end_offset = end.as_offset(&self.parts);
        let start_index = self.split_at(start);
        let end = self.position_for_offset(end_offset.offset, end_offset.at_node_end);
        let end_index = self.split_at(end).max(start_index);
        self.parts.splice(start_index..end_index, parts);
        self.merge_adjacent_parts();
        self.generation += 1;
    }

    fn merge_adjacent_parts(&mut self) {
        let mut i = 0;
        while i < self.parts.len() {
            if self.parts[i].is_empty() {
                self.parts.remove(i);
                continue;
            }
            if i > 0 {
                let (head, tail) = self.parts.split_at_mut(i);
                if head[i - 1].merge(&tail[0]) {
                    self.parts.remove(i);
                    continue;
                }
            }
            i += 1;
        }
    }

    /// Track the part holding the caret, opening or refreshing the
    /// autocomplete session for candidate parts.
    fn set_active_part(&mut self, pos: DocumentPosition, can_open_auto_complete: bool) {
        let Some(part) = self.parts.get(pos.index).cloned() else {
            self.active_part = None;
            self.close_auto_complete();
            return;
        };
        if self.active_part != Some(pos.index) {
            self.active_part = Some(pos.index);
            self.close_auto_complete();
        }
        if !part.kind.opens_auto_complete() {
            self.close_auto_complete();
            return;
        }
        let start = DocumentPosition::new(pos.index, 0).as_offset(&self.parts).offset;
        if self.auto_complete.is_none() && can_open_auto_complete {
            if let Some(provider) = self.part_creator.auto_complete_provider() {
                tracing::debug!(index = pos.index, "opening autocomplete session");
                self.auto_complete = Some(AutoComplete::new(provider.clone()));
            }
        }
        if let Some(ac) = self.auto_complete.as_mut() {
            ac.on_part_update(&part, pos.index, start);
        }
    }

    /// Close the autocomplete session; closing twice is a no-op
    pub fn close_auto_complete(&mut self) {
        if self.auto_complete.take().is_some() {
            tracing::debug!("autocomplete session closed");
        }
    }

    fn with_auto_complete<F>(&mut self, f: F) -> Option<ModelUpdate>
    where
        F: FnOnce(&mut AutoComplete, &PartCreator) -> Option<AutoCompleteAction>,
    {
        let ac = self.auto_complete.as_mut()?;
        let action = f(ac, &self.part_creator)?;
        Some(self.apply_auto_complete(action))
    }

    fn apply_auto_complete(&mut self, action: AutoCompleteAction) -> ModelUpdate {
        let mut selection = None;
        let session = self.auto_complete.as_ref().map(|ac| (ac.start(), ac.len()));
        if let (Some(parts), Some((start, len))) = (action.replace_parts, session) {
            let new_len: usize = parts.iter().map(Part::len).sum();
            let start_pos = self.position_for_offset(start, false);
            let end_pos = self.position_for_offset(start + len, true);
            self.replace_range(start_pos, end_pos, parts);
            if let Some(ac) = self.auto_complete.as_mut() {
                ac.set_len(new_len);
            }
            selection = Some(Selection::Collapsed(
                self.position_for_offset(start + new_len, true),
            ));
        }
        if action.close {
            self.close_auto_complete();
        }
        ModelUpdate {
            selection,
            input_type: None,
            diff: None,
        }
    }

    pub fn auto_complete_up(&mut self) -> Option<ModelUpdate> {
        self.with_auto_complete(|ac, pc| ac.on_up_arrow(pc))
    }

    pub fn auto_complete_down(&mut self) -> Option<ModelUpdate> {
        self.with_auto_complete(|ac, pc| ac.on_down_arrow(pc))
    }

    pub fn auto_complete_tab(&mut self, reverse: bool) -> Option<ModelUpdate> {
        self.with_auto_complete(|ac, pc| ac.on_tab(reverse, pc))
    }

    pub fn auto_complete_escape(&mut self) -> Option<ModelUpdate> {
        self.with_auto_complete(|ac, pc| Some(ac.on_escape(pc)))
    }

    pub fn auto_complete_enter(&mut self) -> Option<ModelUpdate> {
        self.with_auto_complete(|ac, _| Some(ac.on_enter()))
    }

    pub fn auto_complete_confirm(&mut self, completion: &super::Completion) -> Option<ModelUpdate> {
        self.with_auto_complete(|ac, pc| Some(ac.on_component_confirm(completion, pc)))
    }

    pub fn auto_complete_selection_change(
        &mut self,
        completion: Option<&super::Completion>,
    ) -> Option<ModelUpdate> {
        self.with_auto_complete(|ac, pc| Some(ac.on_component_selection_change(completion, pc)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::editor::PartKind;

    fn model(parts: Vec<Part>) -> EditorModel {
        EditorModel::new(parts, PartCreator::new())
    }

    fn typed(model: &mut EditorModel, text: &str, caret: usize) -> ModelUpdate {
        model
            .update(text, InputType::InsertText, DocumentOffset::new(caret, true))
            .unwrap()
    }

    fn kinds(model: &EditorModel) -> Vec<PartKind> {
        model.parts().iter().map(|p| p.kind).collect()
    }

    #[test]
    fn test_typing_into_empty_document() {
        let mut m = model(vec![]);
        let update = typed(&mut m, "h", 1);
        assert_eq!(m.text(), "h");
        assert_eq!(
            update.selection,
            Some(Selection::Collapsed(DocumentPosition::new(0, 1)))
        );
    }

    #[test]
    fn test_typing_sigil_starts_candidate() {
        let mut m = model(vec![]);
        typed(&mut m, "hi @", 4);
        assert_eq!(kinds(&m), vec![PartKind::Plain, PartKind::PillCandidate]);
        typed(&mut m, "hi @bo", 6);
        assert_eq!(m.parts()[1].text, "@bo");
    }

    #[test]
    fn test_newline_splits_plain() {
        let mut m = model(vec![]);
        typed(&mut m, "ab", 2);
        typed(&mut m, "a\nb", 2);
        assert_eq!(kinds(&m), vec![PartKind::Plain, PartKind::Newline, PartKind::Plain]);
        assert_eq!(m.text(), "a\nb");
    }

    #[test]
    fn test_edit_next_to_pill_keeps_pill() {
        let pc = PartCreator::new();
        let mut m = model(vec![
            pc.plain("hi "),
            pc.user_pill("Bob", "@bob:example.org"),
            pc.plain(" yo"),
        ]);
        typed(&mut m, "hi Bob yo!", 10);
        assert_eq!(m.parts()[1].kind, PartKind::UserPill);
        assert_eq!(m.parts()[2].text, " yo!");
        let update = m
            .update("i Bob yo!", InputType::DeleteContentBackward, DocumentOffset::new(0, false))
            .unwrap();
        assert_eq!(m.parts()[1].resource_id.as_deref(), Some("@bob:example.org"));
        assert_eq!(update.selection.map(|s| s.end()), Some(DocumentPosition::new(0, 0)));
    }

    #[test]
    fn test_backspace_into_pill_removes_it() {
        let pc = PartCreator::new();
        let mut m = model(vec![pc.plain("hi "), pc.user_pill("Bob", "@bob:example.org")]);
        let update = m
            .update("hi Bo", InputType::DeleteContentBackward, DocumentOffset::new(5, true))
            .unwrap();
        assert_eq!(m.text(), "hi ");
        assert_eq!(m.parts().len(), 1);
        assert_eq!(update.selection.map(|s| s.end()), Some(DocumentPosition::new(0, 3)));
    }

    #[test]
    fn test_typing_after_pill_inserts_new_part() {
        let pc = PartCreator::new();
        let mut m = model(vec![pc.user_pill("Bob", "@bob:example.org")]);
        typed(&mut m, "Bob!", 4);
        assert_eq!(kinds(&m), vec![PartKind::UserPill, PartKind::Plain]);
        assert_eq!(m.parts()[1].text, "!");
    }

    #[test]
    fn test_update_is_idempotent() {
        let mut m = model(vec![]);
        typed(&mut m, "hello", 5);
        let parts = m.parts().to_vec();
        let generation = m.generation();
        let update = typed(&mut m, "hello", 5);
        assert!(update.diff.unwrap().is_empty());
        assert_eq!(m.parts(), parts.as_slice());
        assert_eq!(m.generation(), generation);
    }

    #[test]
    fn test_position_for_offset_boundaries() {
        let pc = PartCreator::new();
        let m = model(vec![pc.plain("ab"), pc.newline(), pc.plain("cd")]);
        assert_eq!(m.position_for_offset(2, true), DocumentPosition::new(0, 2));
        assert_eq!(m.position_for_offset(2, false), DocumentPosition::new(1, 0));
        assert_eq!(m.position_for_offset(99, false), DocumentPosition::new(2, 2));
        assert_eq!(model(vec![]).position_for_offset(3, true), DocumentPosition::default());
    }

    #[test]
    fn test_insert_merges_plain_neighbours() {
        let pc = PartCreator::new();
        let mut m = model(vec![pc.plain("hello world")]);
        let added = m.insert(vec![pc.plain("big ")], DocumentPosition::new(0, 6)).unwrap();
        assert_eq!(added, 4);
        assert_eq!(m.parts().len(), 1);
        assert_eq!(m.text(), "hello big world");
    }

    #[test]
    fn test_invalid_position_is_rejected_without_mutation() {
        let pc = PartCreator::new();
        let mut m = model(vec![pc.plain("abc")]);
        let generation = m.generation();
        let err = m.insert(vec![pc.plain("x")], DocumentPosition::new(3, 0)).unwrap_err();
        assert_eq!(err, EditorError::InvalidPosition { index: 3, offset: 0 });
        assert_eq!(m.text(), "abc");
        assert_eq!(m.generation(), generation);
    }

    #[test]
    fn test_reset_defaults_caret_to_end() {
        let pc = PartCreator::new();
        let mut m = model(vec![]);
        let update = m
            .reset(vec![pc.plain("a"), pc.newline()], None, Some(InputType::HistoryUndo))
            .unwrap();
        assert_eq!(update.selection, Some(Selection::Collapsed(DocumentPosition::new(1, 1))));
        assert_eq!(update.input_type, Some(InputType::HistoryUndo));
        assert!(m.reset(vec![], Some(DocumentPosition::new(2, 0)), None).is_err());
        assert_eq!(m.text(), "a\n");
    }

    #[test]
    fn test_delete_by_drag_uses_deletion_diff() {
        let pc = PartCreator::new();
        let mut m = model(vec![pc.plain("drag me here")]);
        m.update("drag here", InputType::DeleteByDrag, DocumentOffset::new(9, true))
            .unwrap();
        assert_eq!(m.text(), "drag here");
    }

    #[test]
    fn test_transform_hook_adjusts_caret() {
        fn shout(
            model: &mut EditorModel,
            pos: DocumentPosition,
            _: &InputType,
            diff: &Diff,
        ) -> Result<isize, EditorError> {
            if diff.added != "!" {
                return Ok(0);
            }
            let added = model.insert(vec![model.part_creator().plain("!!")], pos)?;
            Ok(added as isize)
        }
        let mut m = model(vec![]);
        m.set_transform_hook(Some(shout));
        let update = typed(&mut m, "!", 1);
        assert_eq!(m.text(), "!!!");
        assert_eq!(update.selection.map(|s| s.end()), Some(DocumentPosition::new(0, 3)));
    }
}
