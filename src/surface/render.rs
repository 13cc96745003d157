//! Model to surface projection

use super::{line_text, EditableSurface};
use crate::editor::{EditorModel, Part, PartKind};

/// One line of the surface: the parts between two newlines
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct RenderedLine {
    pub parts: Vec<Part>,
}

impl RenderedLine {
    pub fn text(&self) -> String {
        line_text(&self.parts)
    }

    /// Whether any part of the line is a pill
    pub fn has_pills(&self) -> bool {
        self.parts.iter().any(|p| p.kind.is_pill())
    }
}

/// Split parts into lines at newline parts. There is always at least one
/// line, and a trailing newline opens an empty last line.
pub fn render_lines(parts: &[Part]) -> Vec<RenderedLine> {
    let mut lines = vec![RenderedLine::default()];
    for part in parts {
        if part.kind == PartKind::Newline {
            lines.push(RenderedLine::default());
        } else if let Some(line) = lines.last_mut() {
            line.parts.push(part.clone());
        }
    }
    lines
}

/// Re-render the whole model onto the surface
pub fn render_model<S: EditableSurface + ?Sized>(surface: &mut S, model: &EditorModel) {
    let lines = render_lines(model.parts());
    tracing::trace!(lines = lines.len(), parts = model.parts().len(), "render");
    surface.render(&lines);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::editor::PartCreator;

    #[test]
    fn test_lines_split_on_newlines() {
        let pc = PartCreator::new();
        let parts = vec![
            pc.plain("hi "),
            pc.user_pill("Alice", "@alice:example.org"),
            pc.newline(),
            pc.newline(),
        ];
        let lines = render_lines(&parts);
        assert_eq!(lines.len(), 3);
        assert_eq!(lines[0].text(), "hi Alice");
        assert!(lines[0].has_pills());
        assert!(lines[1].parts.is_empty());
        assert!(lines[2].parts.is_empty());
    }

    #[test]
    fn test_empty_model_has_one_line() {
        assert_eq!(render_lines(&[]), vec![RenderedLine::default()]);
    }
}
