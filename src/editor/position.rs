//! Document coordinates
//!
//! A [`DocumentPosition`] addresses a char inside one part; a
//! [`DocumentOffset`] is the flat char offset the editable surface uses.
//! Positions are only meaningful against the parts they were computed from
//! and must be recomputed after every mutation.

use std::cmp::Ordering;

use super::parts::Part;

/// `(part index, char offset within the part)`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct DocumentPosition {
    pub index: usize,
    pub offset: usize,
}

impl DocumentPosition {
    pub fn new(index: usize, offset: usize) -> Self {
        Self { index, offset }
    }

    pub fn is_at_start(&self) -> bool {
        self.index == 0 && self.offset == 0
    }

    /// Whether this is the last position in `parts`
    pub fn is_at_end(&self, parts: &[Part]) -> bool {
        match parts.last() {
            None => true,
            Some(last) => self.index == parts.len() - 1 && self.offset == last.len(),
        }
    }

    /// Whether the position resolves against `parts`
    pub fn is_valid(&self, parts: &[Part]) -> bool {
        match parts.get(self.index) {
            Some(part) => self.offset <= part.len(),
            None => parts.is_empty() && self.index == 0 && self.offset == 0,
        }
    }

    /// Flat offset of this position
    pub fn as_offset(&self, parts: &[Part]) -> DocumentOffset {
        let before: usize = parts.iter().take(self.index).map(Part::len).sum();
        let at_node_end = parts
            .get(self.index)
            .map_or(true, |part| self.offset == part.len());
        DocumentOffset::new(before + self.offset, at_node_end)
    }

    /// Walk forwards while `predicate(index, offset, part)` holds for the
    /// char after the current position. Stops at the document end.
    pub fn forwards_while<F>(&self, parts: &[Part], mut predicate: F) -> DocumentPosition
    where
        F: FnMut(usize, usize, &Part) -> bool,
    {
        if parts.is_empty() {
            return *self;
        }
        let mut index = self.index.min(parts.len() - 1);
        let mut offset = self.offset;
        loop {
            let part = &parts[index];
            while offset < part.len() {
                if !predicate(index, offset, part) {
                    return DocumentPosition::new(index, offset);
                }
                offset += 1;
            }
            if index == parts.len() - 1 {
                return DocumentPosition::new(index, offset);
            }
            index += 1;
            offset = 0;
        }
    }

    /// Walk backwards while `predicate(index, offset, part)` holds for the
    /// char before the current position. Stops at the document start.
    pub fn backwards_while<F>(&self, parts: &[Part], mut predicate: F) -> DocumentPosition
    where
        F: FnMut(usize, usize, &Part) -> bool,
    {
        if parts.is_empty() {
            return *self;
        }
        let mut index = self.index.min(parts.len() - 1);
        let mut offset = self.offset;
        loop {
            let part = &parts[index];
            while offset > 0 {
                if !predicate(index, offset - 1, part) {
                    return DocumentPosition::new(index, offset);
                }
                offset -= 1;
            }
            if index == 0 {
                return DocumentPosition::new(index, offset);
            }
            index -= 1;
            offset = parts[index].len();
        }
    }

    /// Call `callback(part, start, end)` for every part slice between the
    /// two positions, in document order.
    pub fn iterate_parts_between<F>(&self, other: &DocumentPosition, parts: &[Part], mut callback: F)
    where
        F: FnMut(&Part, usize, usize),
    {
        let (start, end) = if self <= other {
            (self, other)
        } else {
            (other, self)
        };
        let (Some(first), Some(last)) = (parts.get(start.index), parts.get(end.index)) else {
            return;
        };
        if start.index == end.index {
            callback(first, start.offset, end.offset);
            return;
        }
        callback(first, start.offset, first.len());
        for part in &parts[start.index + 1..end.index] {
            callback(part, 0, part.len());
        }
        callback(last, 0, end.offset);
    }
}

impl PartialOrd for DocumentPosition {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for DocumentPosition {
    fn cmp(&self, other: &Self) -> Ordering {
        self.index
            .cmp(&other.index)
            .then(self.offset.cmp(&other.offset))
    }
}

/// A flat char offset plus a tie-break for part boundaries: when
/// `at_node_end` is set, an offset on a boundary resolves to the end of the
/// preceding part rather than the start of the next.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct DocumentOffset {
    pub offset: usize,
    pub at_node_end: bool,
}

impl DocumentOffset {
    pub fn new(offset: usize, at_node_end: bool) -> Self {
        Self {
            offset,
            at_node_end,
        }
    }

    /// Shift by a signed delta, clamping at zero
    pub fn add(&self, delta: isize, at_node_end: bool) -> Self {
        Self::new(self.offset.saturating_add_signed(delta), at_node_end)
    }
}

/// What the surface should select after a model update
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Selection {
    Collapsed(DocumentPosition),
    Span {
        start: DocumentPosition,
        end: DocumentPosition,
    },
}

impl Selection {
    /// The caret end of the selection
    pub fn end(&self) -> DocumentPosition {
        match self {
            Selection::Collapsed(pos) => *pos,
            Selection::Span { end, .. } => *end,
        }
    }

    pub fn start(&self) -> DocumentPosition {
        match self {
            Selection::Collapsed(pos) => *pos,
            Selection::Span { start, .. } => *start,
        }
    }

    pub fn is_collapsed(&self) -> bool {
        self.start() == self.end()
    }
}

impl From<DocumentPosition> for Selection {
    fn from(pos: DocumentPosition) -> Self {
        Selection::Collapsed(pos)
    }
}
