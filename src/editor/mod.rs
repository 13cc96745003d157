//! Part-based document model for the message composer
//!
//! A message is a list of typed [`Part`]s owned by an [`EditorModel`].
//! Positions address a part and a char offset inside it; [`Range`]s span two
//! positions and are invalidated by any later mutation. Undo history, the
//! autocomplete session and the range operations used by the composer all
//! live here, free of any surface or host concerns.

pub mod autocomplete;
pub mod deserialize;
pub mod diff;
pub mod emoticon;
pub mod history;
pub mod model;
pub mod operations;
pub mod parts;
pub mod position;
pub mod range;
pub mod serialize;

use std::fmt;

pub use autocomplete::{
    AutoComplete, AutoCompleteAction, AutoCompleteProvider, Completion, CompletionKind,
    ProviderError,
};
pub use deserialize::{parse_plain_text_message, parse_serialized_parts};
pub use diff::Diff;
pub use emoticon::{emoji_for_emoticon, replace_emoticon};
pub use history::{should_merge, EditSummary, HistoryEntry, HistoryManager, OpenStep};
pub use model::{EditorModel, ModelUpdate, TransformHook};
pub use operations::{
    format_range_as_code, format_range_as_quote, replace_range_and_expand_selection,
    replace_range_and_move_caret, toggle_inline_format,
};
pub use parts::{Part, PartCreator, PartKind, SerializedPart, AT_ROOM_TEXT};
pub use position::{DocumentOffset, DocumentPosition, Selection};
pub use range::Range;
pub use serialize::{
    command_text, contains_emote, html_serialize_if_needed, md_serialize, strip_emote_command,
    text_serialize, unescape_message,
};

/// Misuse of the model API. These indicate a caller bug (a stale range or
/// a position computed against another document) and never leave the model
/// half-mutated.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EditorError {
    /// The range was created before the model's latest mutation
    StaleRange { range: u64, model: u64 },
    /// The position does not address a char boundary of any part
    InvalidPosition { index: usize, offset: usize },
}

impl fmt::Display for EditorError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EditorError::StaleRange { range, model } => write!(
                f,
                "Range from generation {} used on model at generation {}",
                range, model
            ),
            EditorError::InvalidPosition { index, offset } => {
                write!(f, "Invalid document position ({}, {})", index, offset)
            }
        }
    }
}

impl std::error::Error for EditorError {}
