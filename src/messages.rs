//! Message types for the Elm-style composer architecture
//!
//! Everything the host view observes (input, composition, keys, paste,
//! selection changes, autocomplete component callbacks) flows into the
//! composer as a [`ComposerMsg`].

use serde::{Deserialize, Serialize};

use crate::client::RoomEvent;
use crate::editor::Completion;

/// The kind of input that produced a surface edit.
///
/// Mirrors the `inputType` values an editable surface reports, plus the two
/// replay markers used when history restores a snapshot.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum InputType {
    InsertText,
    InsertCompositionText,
    InsertFromPaste,
    InsertFromDrop,
    InsertLineBreak,
    DeleteContentBackward,
    DeleteContentForward,
    DeleteWordBackward,
    DeleteWordForward,
    DeleteByCut,
    DeleteByDrag,
    HistoryUndo,
    HistoryRedo,
    /// Any other input type reported by the surface
    Other(String),
}

impl InputType {
    pub fn as_str(&self) -> &str {
        match self {
            InputType::InsertText => "insertText",
            InputType::InsertCompositionText => "insertCompositionText",
            InputType::InsertFromPaste => "insertFromPaste",
            InputType::InsertFromDrop => "insertFromDrop",
            InputType::InsertLineBreak => "insertLineBreak",
            InputType::DeleteContentBackward => "deleteContentBackward",
            InputType::DeleteContentForward => "deleteContentForward",
            InputType::DeleteWordBackward => "deleteWordBackward",
            InputType::DeleteWordForward => "deleteWordForward",
            InputType::DeleteByCut => "deleteByCut",
            InputType::DeleteByDrag => "deleteByDrag",
            InputType::HistoryUndo => "historyUndo",
            InputType::HistoryRedo => "historyRedo",
            InputType::Other(s) => s,
        }
    }

    /// Pasted or dropped text: pill-start characters are accepted into plain
    /// parts and no autocomplete session is opened.
    pub fn is_paste_or_drop(&self) -> bool {
        matches!(self, InputType::InsertFromPaste | InputType::InsertFromDrop)
    }

    /// Replays from the undo history; these are never recorded again
    pub fn is_history_replay(&self) -> bool {
        matches!(self, InputType::HistoryUndo | InputType::HistoryRedo)
    }

    /// Single-character typing or deletion, eligible for undo coalescing
    pub fn is_non_bulk(&self) -> bool {
        matches!(
            self,
            InputType::InsertText
                | InputType::DeleteContentForward
                | InputType::DeleteContentBackward
        )
    }
}

impl From<&str> for InputType {
    fn from(s: &str) -> Self {
        match s {
            "insertText" => InputType::InsertText,
            "insertCompositionText" => InputType::InsertCompositionText,
            "insertFromPaste" => InputType::InsertFromPaste,
            "insertFromDrop" => InputType::InsertFromDrop,
            "insertLineBreak" => InputType::InsertLineBreak,
            "deleteContentBackward" => InputType::DeleteContentBackward,
            "deleteContentForward" => InputType::DeleteContentForward,
            "deleteWordBackward" => InputType::DeleteWordBackward,
            "deleteWordForward" => InputType::DeleteWordForward,
            "deleteByCut" => InputType::DeleteByCut,
            "deleteByDrag" => InputType::DeleteByDrag,
            "historyUndo" => InputType::HistoryUndo,
            "historyRedo" => InputType::HistoryRedo,
            other => InputType::Other(other.to_string()),
        }
    }
}

impl std::fmt::Display for InputType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Logical key of a key-down event
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Key {
    Char(char),
    Enter,
    Tab,
    Escape,
    Backspace,
    Delete,
    ArrowUp,
    ArrowDown,
    ArrowLeft,
    ArrowRight,
}

/// Modifier key state
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Modifiers {
    pub ctrl: bool,
    pub meta: bool,
    pub alt: bool,
    pub shift: bool,
}

impl Modifiers {
    pub const NONE: Modifiers = Modifiers {
        ctrl: false,
        meta: false,
        alt: false,
        shift: false,
    };

    pub fn any(&self) -> bool {
        self.ctrl || self.meta || self.alt || self.shift
    }

    pub fn meta_or_alt(&self) -> bool {
        self.meta || self.alt
    }
}

/// A key-down event as delivered by the host
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct KeyEvent {
    pub key: Key,
    #[serde(default)]
    pub modifiers: Modifiers,
    /// The platform's own "composing" flag on the event, if it reports one
    #[serde(default)]
    pub is_composing: bool,
}

impl KeyEvent {
    pub fn new(key: Key, modifiers: Modifiers) -> Self {
        Self {
            key,
            modifiers,
            is_composing: false,
        }
    }

    pub fn plain(key: Key) -> Self {
        Self::new(key, Modifiers::NONE)
    }
}

/// Formatting actions offered by the format bar and shortcuts
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FormatAction {
    Bold,
    Italics,
    Strikethrough,
    Code,
    Quote,
}

/// Messages delivered to a composer
#[derive(Debug, Clone)]
pub enum ComposerMsg {
    /// The surface content changed
    Input(InputType),
    /// An input method started composing
    CompositionStart,
    /// An input method finished composing
    CompositionEnd,
    /// Deferred work scheduled by `Cmd::ScheduleTick`
    Tick,
    KeyDown(KeyEvent),
    /// Plain-text clipboard contents were pasted
    Paste(String),
    SelectionChange,
    Focus,
    Blur,
    Format(FormatAction),
    /// The autocomplete component confirmed a completion
    AutoCompleteConfirm(Completion),
    /// The autocomplete component moved its selection (`None` = typed text)
    AutoCompleteSelectionChange(Option<Completion>),
    /// Insert a mention pill for a user id
    InsertMention(String),
    /// Insert a quote of another message body
    InsertQuote(String),
    /// Start (or with `None` cancel) replying to an event
    ReplyTo(Option<RoomEvent>),
}
