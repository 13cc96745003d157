//! Range-level editing operations used by the composer
//!
//! Each operation runs inside [`EditorModel::transform`] so the host sees a
//! single update with the final caret or selection.

use super::model::{EditorModel, ModelUpdate};
use super::parts::{Part, PartKind};
use super::position::Selection;
use super::range::Range;
use super::EditorError;

/// Prefix inserted before each quoted line
pub const QUOTE_LINE_PREFIX: &str = "> ";

const CODE_FENCE: &str = "```";

/// Replace `range` with `parts`, leaving the caret after the new content
pub fn replace_range_and_move_caret(
    model: &mut EditorModel,
    range: Range,
    parts: Vec<Part>,
) -> Result<ModelUpdate, EditorError> {
    model.transform(|model| {
        let old_len = range.length(model)?;
        let first = range.start().as_offset(model.parts());
        let added = range.replace(model, parts)?;
        let last = first.add(old_len as isize + added, false);
        Ok(Selection::Collapsed(
            model.position_for_offset(last.offset, last.at_node_end),
        ))
    })
}

/// Replace `range` with `parts`, selecting the new content
pub fn replace_range_and_expand_selection(
    model: &mut EditorModel,
    range: Range,
    parts: Vec<Part>,
) -> Result<ModelUpdate, EditorError> {
    model.transform(|model| {
        let old_len = range.length(model)?;
        let first = range.start().as_offset(model.parts());
        let added = range.replace(model, parts)?;
        let last = first.add(old_len as isize + added, false);
        Ok(Selection::Span {
            start: model.position_for_offset(first.offset, first.at_node_end),
            end: model.position_for_offset(last.offset, last.at_node_end),
        })
    })
}

fn starts_at_beginning_of_line(model: &EditorModel, range: &Range) -> bool {
    let start = range.start();
    let previous_is_newline = start.index > 0
        && model
            .parts()
            .get(start.index - 1)
            .is_some_and(|p| p.kind == PartKind::Newline);
    start.offset == 0 && (start.index == 0 || previous_is_newline)
}

fn ends_at_end_of_line(model: &EditorModel, range: &Range) -> bool {
    let end = range.end();
    let parts = model.parts();
    let Some(last) = parts.get(end.index) else {
        return true;
    };
    let is_last_part = end.index + 1 == parts.len();
    let next_is_newline = parts
        .get(end.index + 1)
        .is_some_and(|p| p.kind == PartKind::Newline);
    end.offset == last.len() && (is_last_part || next_is_newline)
}

/// Wrap the range in `prefix`/`suffix`, or unwrap it when it already is
pub fn toggle_inline_format(
    model: &mut EditorModel,
    range: Range,
    prefix: &str,
    suffix: &str,
) -> Result<ModelUpdate, EditorError> {
    let mut parts = range.parts(model)?;
    let pc = model.part_creator().clone();
    let is_formatted = match (parts.first(), parts.last()) {
        (Some(first), Some(last)) => {
            first.text.starts_with(prefix)
                && last.text.ends_with(suffix)
                && (parts.len() > 1 || first.text.len() >= prefix.len() + suffix.len())
        }
        _ => false,
    };
    if is_formatted {
        let mut head = parts[0].serialize();
        head.text = head.text[prefix.len()..].to_string();
        parts[0] = pc.deserialize_part(&head);
        let last_index = parts.len() - 1;
        let mut tail = parts[last_index].serialize();
        tail.text.truncate(tail.text.len() - suffix.len());
        parts[last_index] = pc.deserialize_part(&tail);
    } else {
        parts.insert(0, pc.plain(prefix));
        parts.push(pc.plain(suffix));
    }
    replace_range_and_expand_selection(model, range, parts)
}

/// Turn the range into a quote: `> ` before every line, on its own lines
pub fn format_range_as_quote(model: &mut EditorModel, range: Range) -> Result<ModelUpdate, EditorError> {
    let pc = model.part_creator().clone();
    let mut quoted = Vec::new();
    if !starts_at_beginning_of_line(model, &range) {
        quoted.push(pc.newline());
    }
    quoted.push(pc.plain(QUOTE_LINE_PREFIX));
    for part in range.parts(model)? {
        let is_newline = part.kind == PartKind::Newline;
        quoted.push(part);
        if is_newline {
            quoted.push(pc.plain(QUOTE_LINE_PREFIX));
        }
    }
    if !ends_at_end_of_line(model, &range) {
        quoted.push(pc.newline());
    }
    quoted.push(pc.newline());
    replace_range_and_expand_selection(model, range, quoted)
}

/// Code-format the range: a fenced block when it spans lines, backticks
/// otherwise
pub fn format_range_as_code(model: &mut EditorModel, range: Range) -> Result<ModelUpdate, EditorError> {
    let mut parts = range.parts(model)?;
    let is_block = parts.len() > 1
        && parts.first().is_some_and(|p| p.text == CODE_FENCE)
        && parts.last().is_some_and(|p| p.text == CODE_FENCE);
    if is_block {
        parts.remove(0);
        parts.pop();
        let wrapped_in_newlines = parts.len() > 1
            && parts.first().is_some_and(|p| p.kind == PartKind::Newline)
            && parts.last().is_some_and(|p| p.kind == PartKind::Newline);
        if wrapped_in_newlines {
            parts.remove(0);
            parts.pop();
        }
        return replace_range_and_expand_selection(model, range, parts);
    }
    if !parts.iter().any(|p| p.kind == PartKind::Newline) {
        return toggle_inline_format(model, range, "`", "`");
    }
    let pc = model.part_creator().clone();
    let mut block = Vec::with_capacity(parts.len() + 6);
    if !starts_at_beginning_of_line(model, &range) {
        block.push(pc.newline());
    }
    block.push(pc.plain(CODE_FENCE));
    block.push(pc.newline());
    block.extend(parts);
    block.push(pc.newline());
    block.push(pc.plain(CODE_FENCE));
    if !ends_at_end_of_line(model, &range) {
        block.push(pc.newline());
    }
    replace_range_and_expand_selection(model, range, block)
}
