//! Shared test helpers for integration tests
//!
//! Note: Functions may appear unused because each test file compiles separately.

#![allow(dead_code)]

use std::rc::Rc;

use cider::client::LocalRoom;
use cider::completer::RoomCompleter;
use cider::composer::{BasicComposer, SendComposer};
use cider::config::{ComposerConfig, PrimaryModifier};
use cider::editor::{EditorModel, Part, PartCreator, PartKind};
use cider::messages::{ComposerMsg, InputType, Key, KeyEvent, Modifiers};
use cider::storage::Storage;
use cider::surface::MemorySurface;

pub const ROOM_ID: &str = "!room:example.org";
pub const OWN_USER_ID: &str = "@me:example.org";

/// A room with two members and one alias
pub fn test_room() -> Rc<LocalRoom> {
    Rc::new(
        LocalRoom::new(ROOM_ID, OWN_USER_ID)
            .with_member("@alice:example.org", "Alice")
            .with_member("@bob:example.org", "Bob")
            .with_alias("#rust:example.org"),
    )
}

/// Part creator bound to `room`, with completions from its members
pub fn part_creator(room: &Rc<LocalRoom>) -> PartCreator {
    PartCreator::new()
        .with_client(room.clone())
        .with_auto_complete(Rc::new(RoomCompleter::new(room.clone())))
}

/// Default config with Ctrl as the shortcut modifier on every platform
pub fn test_config() -> ComposerConfig {
    ComposerConfig {
        primary_modifier: PrimaryModifier::Ctrl,
        ..ComposerConfig::default()
    }
}

pub fn model_with(parts: Vec<Part>) -> EditorModel {
    EditorModel::new(parts, PartCreator::new())
}

pub fn kinds(model: &EditorModel) -> Vec<PartKind> {
    model.parts().iter().map(|p| p.kind).collect()
}

pub fn basic_composer(room: &Rc<LocalRoom>, config: ComposerConfig) -> BasicComposer<MemorySurface> {
    let model = EditorModel::new(Vec::new(), part_creator(room));
    BasicComposer::new(model, MemorySurface::new(), config)
}

pub fn send_composer(room: &Rc<LocalRoom>, storage: Rc<dyn Storage>) -> SendComposer<MemorySurface> {
    SendComposer::new(room.clone(), storage, MemorySurface::new(), test_config())
}

/// Type `text` at the surface caret and report the input
pub fn type_basic(composer: &mut BasicComposer<MemorySurface>, text: &str) {
    composer.surface_mut().type_text(text);
    composer.update(ComposerMsg::Input(InputType::InsertText));
}

pub fn type_send(composer: &mut SendComposer<MemorySurface>, text: &str) {
    composer.surface_mut().type_text(text);
    composer.update(ComposerMsg::Input(InputType::InsertText));
}

pub fn backspace_basic(composer: &mut BasicComposer<MemorySurface>) {
    composer.surface_mut().delete_backward();
    composer.update(ComposerMsg::Input(InputType::DeleteContentBackward));
}

pub fn key(key: Key) -> ComposerMsg {
    ComposerMsg::KeyDown(KeyEvent::plain(key))
}

pub fn ctrl(ch: char) -> ComposerMsg {
    ComposerMsg::KeyDown(KeyEvent::new(
        Key::Char(ch),
        Modifiers {
            ctrl: true,
            ..Modifiers::default()
        },
    ))
}

pub fn alt(key: Key) -> ComposerMsg {
    ComposerMsg::KeyDown(KeyEvent::new(
        key,
        Modifiers {
            alt: true,
            ..Modifiers::default()
        },
    ))
}
