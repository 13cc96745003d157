//! Headless editable surface
//!
//! Behaves like a browser contenteditable as far as the composer can tell:
//! user edits change the text and move the caret without telling anyone,
//! and the host reads the result back after each input event.

use ropey::Rope;

use super::render::RenderedLine;
use super::{EditableSurface, SurfaceSelection};

#[derive(Debug, Clone, Default)]
pub struct MemorySurface {
    text: Rope,
    selection: Option<SurfaceSelection>,
    lines: Vec<RenderedLine>,
    placeholder: Option<String>,
    focused: bool,
    renders: usize,
}

impl MemorySurface {
    pub fn new() -> Self {
        Self::default()
    }

    /// The lines from the last render
    pub fn lines(&self) -> &[RenderedLine] {
        &self.lines
    }

    pub fn placeholder(&self) -> Option<&str> {
        self.placeholder.as_deref()
    }

    pub fn is_focused(&self) -> bool {
        self.focused
    }

    /// How many times the host re-rendered the surface
    pub fn render_count(&self) -> usize {
        self.renders
    }

    pub fn len_chars(&self) -> usize {
        self.text.len_chars()
    }

    /// Caret offset, or the end of the text without a selection
    pub fn caret(&self) -> usize {
        self.selection.map_or(self.len_chars(), |s| s.focus)
    }

    pub fn set_caret(&mut self, offset: usize) {
        self.selection = Some(SurfaceSelection::caret(offset.min(self.len_chars())));
    }

    pub fn select(&mut self, anchor: usize, focus: usize) {
        let len = self.len_chars();
        self.selection = Some(SurfaceSelection::new(anchor.min(len), focus.min(len)));
    }

    pub fn select_all(&mut self) {
        self.select(0, self.len_chars());
    }

    /// Remove the selected text; returns whether anything was selected
    pub fn delete_selection(&mut self) -> bool {
        let Some(selection) = self.selection.filter(|s| !s.is_collapsed()) else {
            return false;
        };
        self.text.remove(selection.start()..selection.end());
        self.selection = Some(SurfaceSelection::caret(selection.start()));
        true
    }

    /// Type `text` over the selection, leaving the caret after it
    pub fn type_text(&mut self, text: &str) {
        self.delete_selection();
        let caret = self.caret();
        self.text.insert(caret, text);
        self.set_caret(caret + text.chars().count());
    }

    /// Backspace: the selection, or the char before the caret
    pub fn delete_backward(&mut self) {
        if self.delete_selection() {
            return;
        }
        let caret = self.caret();
        if caret > 0 {
            self.text.remove(caret - 1..caret);
            self.set_caret(caret - 1);
        }
    }

    /// Delete: the selection, or the char after the caret
    pub fn delete_forward(&mut self) {
        if self.delete_selection() {
            return;
        }
        let caret = self.caret();
        if caret < self.len_chars() {
            self.text.remove(caret..caret + 1);
        }
    }

    /// Drop the focus and selection, as clicking elsewhere would
    pub fn blur(&mut self) {
        self.focused = false;
        self.selection = None;
    }
}

impl EditableSurface for MemorySurface {
    fn render(&mut self, lines: &[RenderedLine]) {
        let text = lines
            .iter()
            .map(RenderedLine::text)
            .collect::<Vec<_>>()
            .join("\n");
        self.text = Rope::from_str(&text);
        self.lines = lines.to_vec();
        self.renders += 1;
        if let Some(selection) = self.selection {
            self.select(selection.anchor, selection.focus);
        }
    }

    fn text(&self) -> String {
        self.text.to_string()
    }

    fn selection(&self) -> Option<SurfaceSelection> {
        self.selection
    }

    fn set_selection(&mut self, selection: SurfaceSelection) {
        self.select(selection.anchor, selection.focus);
    }

    fn set_placeholder(&mut self, placeholder: Option<&str>) {
        self.placeholder = placeholder.map(str::to_string);
    }

    fn focus(&mut self) {
        self.focused = true;
        if self.selection.is_none() {
            self.set_caret(self.len_chars());
        }
    }
}
