//! Caret and selection mapping between the surface and the model

use super::{EditableSurface, SurfaceSelection};
use crate::editor::{DocumentOffset, EditorModel, Range, Selection};
use crate::util::char_len;

/// Sample the surface after an input event: the caret as a flat offset and
/// the full text. Without a selection the caret is taken to be at the end.
///
/// A caret after at least one char belongs to the part before it, so typing
/// at a part boundary extends the preceding part.
pub fn caret_offset_and_text<S: EditableSurface + ?Sized>(surface: &S) -> (DocumentOffset, String) {
    let text = surface.text();
    let len = char_len(&text);
    let offset = surface.selection().map_or(len, |s| s.focus.min(len));
    (DocumentOffset::new(offset, offset > 0), text)
}

/// Move the surface selection to a model selection
pub fn set_selection<S: EditableSurface + ?Sized>(
    surface: &mut S,
    model: &EditorModel,
    selection: &Selection,
) {
    let parts = model.parts();
    let surface_selection = match selection {
        Selection::Collapsed(pos) => SurfaceSelection::caret(pos.as_offset(parts).offset),
        Selection::Span { start, end } => {
            SurfaceSelection::new(start.as_offset(parts).offset, end.as_offset(parts).offset)
        }
    };
    surface.set_selection(surface_selection);
}

/// The model range under the surface selection. The start resolves to the
/// beginning of the following part and the end to the end of the preceding
/// one, so a selection never picks up an empty slice of a neighbour.
pub fn range_for_selection<S: EditableSurface + ?Sized>(surface: &S, model: &EditorModel) -> Option<Range> {
    let selection = surface.selection()?;
    let start = model.position_for_offset(selection.start(), false);
    let end = model.position_for_offset(selection.end(), true);
    Some(model.start_range(start, Some(end)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::editor::{DocumentPosition, PartCreator};
    use crate::surface::{render_model, MemorySurface};

    fn model() -> EditorModel {
        let pc = PartCreator::new();
        EditorModel::new(
            vec![pc.plain("hi "), pc.user_pill("Bob", "@bob:example.org"), pc.plain(" x")],
            pc,
        )
    }

    #[test]
    fn test_caret_sampling() {
        let m = model();
        let mut surface = MemorySurface::new();
        render_model(&mut surface, &m);
        surface.set_caret(3);
        let (caret, text) = caret_offset_and_text(&surface);
        assert_eq!(text, "hi Bob x");
        assert_eq!(caret, DocumentOffset::new(3, true));

        surface.set_caret(0);
        assert_eq!(caret_offset_and_text(&surface).0, DocumentOffset::new(0, false));
    }

    #[test]
    fn test_set_selection_round_trips() {
        let m = model();
        let mut surface = MemorySurface::new();
        render_model(&mut surface, &m);
        let selection = Selection::Span {
            start: DocumentPosition::new(0, 1),
            end: DocumentPosition::new(2, 1),
        };
        set_selection(&mut surface, &m, &selection);
        assert_eq!(surface.selection(), Some(SurfaceSelection::new(1, 7)));

        let range = range_for_selection(&surface, &m).unwrap();
        assert_eq!(range.text(&m).unwrap(), "i Bob ");
    }

    #[test]
    fn test_range_at_part_boundaries() {
        let m = model();
        let mut surface = MemorySurface::new();
        render_model(&mut surface, &m);
        surface.select(3, 6);
        let range = range_for_selection(&surface, &m).unwrap();
        assert_eq!(range.start(), DocumentPosition::new(1, 0));
        assert_eq!(range.end(), DocumentPosition::new(1, 3));
    }
}
