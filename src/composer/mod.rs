//! Composers binding the editor model to a surface
//!
//! [`BasicComposer`] handles input, composition, keys, paste, formatting
//! and undo for any message editor. [`SendComposer`] adds what belongs to a
//! room: sending, commands, send history and drafts.

pub mod basic;
pub mod content;
pub mod drafts;
pub mod send;
pub mod send_history;

pub use basic::{BasicComposer, ChangeListener};
pub use content::{create_message_content, is_slash_command, HTML_FORMAT};
pub use drafts::{DraftStore, DRAFT_KEY_PREFIX};
pub use send::SendComposer;
pub use send_history::{SendHistory, SEND_HISTORY_PREFIX};
