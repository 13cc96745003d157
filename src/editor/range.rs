//! Spans of the document between two positions
//!
//! A [`Range`] is bound to the model generation it was created at. Every
//! operation checks that generation first and fails with
//! [`EditorError::StaleRange`] instead of touching the wrong parts.

use super::model::EditorModel;
use super::parts::Part;
use super::position::DocumentPosition;
use super::EditorError;
use crate::util::char_slice;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Range {
    start: DocumentPosition,
    end: DocumentPosition,
    generation: u64,
}

impl Range {
    pub(super) fn new(a: DocumentPosition, b: DocumentPosition, generation: u64) -> Self {
        let (start, end) = if a <= b { (a, b) } else { (b, a) };
        Self {
            start,
            end,
            generation,
        }
    }

    pub fn start(&self) -> DocumentPosition {
        self.start
    }

    pub fn end(&self) -> DocumentPosition {
        self.end
    }

    pub fn is_collapsed(&self) -> bool {
        self.start == self.end
    }

    /// Widen the start backwards one char at a time while
    /// `predicate(index, offset, part)` holds for the char before it.
    pub fn expand_backwards_while<F>(&mut self, model: &EditorModel, predicate: F) -> Result<(), EditorError>
    where
        F: FnMut(usize, usize, &Part) -> bool,
    {
        model.check_generation(self.generation)?;
        self.start = self.start.backwards_while(model.parts(), predicate);
        Ok(())
    }

    /// Widen the end forwards while `predicate` holds for the char after it
    pub fn expand_forwards_while<F>(&mut self, model: &EditorModel, predicate: F) -> Result<(), EditorError>
    where
        F: FnMut(usize, usize, &Part) -> bool,
    {
        model.check_generation(self.generation)?;
        self.end = self.end.forwards_while(model.parts(), predicate);
        Ok(())
    }

    /// Move the start forwards by `delta` chars
    pub fn move_start(&mut self, model: &EditorModel, delta: usize) -> Result<(), EditorError> {
        model.check_generation(self.generation)?;
        let mut remaining = delta;
        self.start = self.start.forwards_while(model.parts(), |_, _, _| {
            if remaining == 0 {
                return false;
            }
            remaining -= 1;
            true
        });
        if self.start > self.end {
            self.end = self.start;
        }
        Ok(())
    }

    pub fn text(&self, model: &EditorModel) -> Result<String, EditorError> {
        model.check_generation(self.generation)?;
        let mut text = String::new();
        self.start
            .iterate_parts_between(&self.end, model.parts(), |part, start, end| {
                text.push_str(char_slice(&part.text, start, end));
            });
        Ok(text)
    }

    /// Length in chars
    pub fn length(&self, model: &EditorModel) -> Result<usize, EditorError> {
        model.check_generation(self.generation)?;
        let mut len = 0;
        self.start
            .iterate_parts_between(&self.end, model.parts(), |_, start, end| {
                len += end - start;
            });
        Ok(len)
    }

    /// Copies of the (possibly partial) parts covered by the range
    pub fn parts(&self, model: &EditorModel) -> Result<Vec<Part>, EditorError> {
        model.check_generation(self.generation)?;
        let creator = model.part_creator();
        let mut parts = Vec::new();
        self.start
            .iterate_parts_between(&self.end, model.parts(), |part, start, end| {
                if start == end {
                    return;
                }
                let mut serialized = part.serialize();
                serialized.text = char_slice(&part.text, start, end).to_string();
                parts.push(creator.deserialize_part(&serialized));
            });
        Ok(parts)
    }

    /// Replace the covered parts with `parts`; returns the signed change in
    /// length. The range is consumed since the model has changed.
    pub fn replace(self, model: &mut EditorModel, parts: Vec<Part>) -> Result<isize, EditorError> {
        let old_len = self.length(model)? as isize;
        let new_len: usize = parts.iter().map(Part::len).sum();
        model.replace_range(self.start, self.end, parts);
        Ok(new_len as isize - old_len)
    }
}
