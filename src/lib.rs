//! cider - rich-text message composer core
//!
//! This crate provides the part-based document model, caret mapping, undo
//! history and composers of a chat message editor, driven Elm-style: hosts
//! feed [`ComposerMsg`]s in and execute the [`Cmd`]s that come back.

pub mod cli;
pub mod client;
pub mod commands;
pub mod completer;
pub mod composer;
pub mod config;
pub mod editor;
pub mod messages;
pub mod paths;
pub mod script;
pub mod slash_commands;
pub mod storage;
pub mod surface;
pub mod tracing;
pub mod util;

// Re-export commonly used types
pub use commands::Cmd;
pub use composer::{BasicComposer, SendComposer};
pub use config::ComposerConfig;
pub use editor::{EditorModel, Part, PartCreator};
pub use messages::ComposerMsg;
