//! The editable surface the composer projects its model onto
//!
//! A surface shows the rendered lines and owns the live selection. The
//! composer re-renders it after every model update and samples its text and
//! caret after every input event.

pub mod caret;
pub mod memory;
pub mod render;

use crate::editor::Part;

pub use caret::{caret_offset_and_text, range_for_selection, set_selection};
pub use memory::MemorySurface;
pub use render::{render_lines, render_model, RenderedLine};

/// Selection on the surface in flat char offsets. `anchor` is where the
/// selection started and `focus` is where the caret is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct SurfaceSelection {
    pub anchor: usize,
    pub focus: usize,
}

impl SurfaceSelection {
    pub fn caret(offset: usize) -> Self {
        Self {
            anchor: offset,
            focus: offset,
        }
    }

    pub fn new(anchor: usize, focus: usize) -> Self {
        Self { anchor, focus }
    }

    pub fn start(&self) -> usize {
        self.anchor.min(self.focus)
    }

    pub fn end(&self) -> usize {
        self.anchor.max(self.focus)
    }

    pub fn is_collapsed(&self) -> bool {
        self.anchor == self.focus
    }
}

pub trait EditableSurface {
    /// Replace the surface content with the rendered lines
    fn render(&mut self, lines: &[RenderedLine]);

    /// Current text, lines joined with `\n`
    fn text(&self) -> String;

    /// `None` when the surface has no focus or selection
    fn selection(&self) -> Option<SurfaceSelection>;

    fn set_selection(&mut self, selection: SurfaceSelection);

    /// Show `Some(text)` as placeholder, or hide it
    fn set_placeholder(&mut self, placeholder: Option<&str>);

    fn focus(&mut self) {}
}

/// The parts of one rendered line
pub(crate) fn line_text(parts: &[Part]) -> String {
    parts.iter().map(|p| p.text.as_str()).collect()
}
