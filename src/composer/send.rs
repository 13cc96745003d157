//! The composer that sends messages into a room
//!
//! Wraps a [`BasicComposer`] with everything tied to a room: Enter sends,
//! slash commands run through the client, Alt+Up/Down browse the send
//! history, Up on an empty caret edits the last message, and the draft is
//! persisted after every change.

use std::rc::Rc;

use super::basic::BasicComposer;
use super::content::{create_message_content, is_slash_command};
use super::drafts::DraftStore;
use super::send_history::SendHistory;
use crate::client::{RoomClient, RoomEvent};
use crate::commands::Cmd;
use crate::completer::RoomCompleter;
use crate::config::ComposerConfig;
use crate::editor::{command_text, contains_emote, EditorModel, PartCreator, SerializedPart};
use crate::messages::{ComposerMsg, Key, KeyEvent, Modifiers};
use crate::slash_commands::parse_command;
use crate::storage::Storage;
use crate::surface::EditableSurface;

const SERVER_ERROR_FALLBACK: &str =
    "Server unavailable, overloaded, or something else went wrong.";

pub struct SendComposer<S> {
    basic: BasicComposer<S>,
    client: Rc<dyn RoomClient>,
    send_history: SendHistory,
    drafts: DraftStore,
    reply_to: Option<RoomEvent>,
    /// The message being composed while browsing the send history
    currently_composed: Option<Vec<SerializedPart>>,
}

impl<S: EditableSurface> SendComposer<S> {
    /// Compose into the room behind `client`, restoring its draft from
    /// `storage` if there is one
    pub fn new(
        client: Rc<dyn RoomClient>,
        storage: Rc<dyn Storage>,
        surface: S,
        config: ComposerConfig,
    ) -> Self {
        let room_id = client.room_id().to_string();
        let pc = PartCreator::new()
            .with_client(client.clone())
            .with_auto_complete(Rc::new(RoomCompleter::new(client.clone())))
            .with_commands(true);
        let drafts = DraftStore::new(storage.clone(), &room_id);
        let parts = drafts.restore(&pc).unwrap_or_default();
        let model = EditorModel::new(parts, pc);
        tracing::debug!(room_id = %room_id, "send composer created");
        Self {
            basic: BasicComposer::new(model, surface, config),
            client,
            send_history: SendHistory::load(storage, &room_id),
            drafts,
            reply_to: None,
            currently_composed: None,
        }
    }

    pub fn basic(&self) -> &BasicComposer<S> {
        &self.basic
    }

    pub fn basic_mut(&mut self) -> &mut BasicComposer<S> {
        &mut self.basic
    }

    pub fn model(&self) -> &EditorModel {
        self.basic.model()
    }

    pub fn surface(&self) -> &S {
        self.basic.surface()
    }

    pub fn surface_mut(&mut self) -> &mut S {
        self.basic.surface_mut()
    }

    pub fn reply_to(&self) -> Option<&RoomEvent> {
        self.reply_to.as_ref()
    }

    pub fn send_history(&self) -> &SendHistory {
        &self.send_history
    }

    pub fn update(&mut self, msg: ComposerMsg) -> Option<Cmd> {
        let changes = self.basic.change_count();
        let cmd = match msg {
            ComposerMsg::KeyDown(event) => self.on_key_down(&event),
            ComposerMsg::ReplyTo(event) => {
                self.reply_to = event;
                self.basic.focus();
                None
            }
            other => self.basic.update(other),
        };
        if self.basic.change_count() != changes {
            self.drafts.save(self.basic.model());
        }
        cmd
    }

    fn on_key_down(&mut self, event: &KeyEvent) -> Option<Cmd> {
        if self.basic.is_composing(event) {
            return None;
        }
        if let Some(cmd) = self.basic.handle_key_down(event) {
            return Some(cmd);
        }
        let modifiers = event.modifiers;
        match event.key {
            Key::Enter if !modifiers.any() => {
                let cmd = self.send_message();
                Some(Cmd::batch(vec![cmd, Cmd::PreventDefault]))
            }
            Key::ArrowUp => self.on_vertical_arrow(modifiers, true),
            Key::ArrowDown => self.on_vertical_arrow(modifiers, false),
            _ => None,
        }
    }

    fn on_vertical_arrow(&mut self, modifiers: Modifiers, up: bool) -> Option<Cmd> {
        if modifiers.ctrl || modifiers.shift || modifiers.meta {
            return None;
        }
        if modifiers.alt {
            return self.select_send_history(up).then_some(Cmd::PreventDefault);
        }
        let should_edit_last_message = up && self.reply_to.is_none();
        if should_edit_last_message
            && self.basic.is_selection_collapsed()
            && self.basic.is_caret_at_start()
        {
            let event = self.client.last_editable_event()?;
            tracing::debug!(event_id = %event.event_id, "editing last message");
            return Some(Cmd::batch(vec![
                Cmd::PreventDefault,
                Cmd::EditLastMessage(event),
            ]));
        }
        None
    }

    /// Step through sent messages. Returns whether the composer content
    /// was replaced.
    pub fn select_send_history(&mut self, up: bool) -> bool {
        let delta: isize = if up { -1 } else { 1 };
        let len = self.send_history.len();
        let current = self.send_history.current_index();
        if current == len {
            // nothing newer than the message being composed
            if !up {
                return false;
            }
            self.currently_composed = Some(self.basic.model().serialize_parts());
        } else if current.checked_add_signed(delta) == Some(len) {
            let parts = self.currently_composed.take().unwrap_or_default();
            self.reset_serialized(&parts);
            self.send_history.reset_index();
            return true;
        }
        let Some(parts) = self.send_history.get_item(delta).map(<[_]>::to_vec) else {
            return false;
        };
        self.reset_serialized(&parts);
        self.basic.focus();
        true
    }

    fn reset_serialized(&mut self, parts: &[SerializedPart]) {
        let pc = self.basic.model().part_creator();
        let parts = parts.iter().map(|p| pc.deserialize_part(p)).collect();
        self.basic.reset(parts);
    }

    /// Send the message (or run the command) and clear the composer
    pub fn send_message(&mut self) -> Cmd {
        if self.basic.model().is_empty() {
            return Cmd::None;
        }
        let parts = self.basic.model().parts().to_vec();
        let mut cmds = Vec::new();
        if !contains_emote(&parts) && is_slash_command(&parts) {
            cmds.push(self.run_slash_command(&command_text(&parts)));
        } else {
            let content =
                create_message_content(&parts, self.reply_to.as_ref(), self.client.room_id());
            match self.client.send_message(&content) {
                Ok(()) => tracing::debug!(body_len = content.body.len(), "message sent"),
                Err(e) => tracing::error!(error = %e, "failed to send message"),
            }
            if self.reply_to.take().is_some() {
                cmds.push(Cmd::ClearReply);
            }
        }

        if let Err(e) = self.send_history.save(self.basic.model().serialize_parts()) {
            tracing::warn!(error = %e, "failed to store send history");
        }
        self.currently_composed = None;
        self.basic.reset(Vec::new());
        self.basic.clear_undo_history();
        self.basic.focus();
        self.drafts.clear();
        Cmd::batch(cmds)
    }

    fn run_slash_command(&self, text: &str) -> Cmd {
        let command = match parse_command(text) {
            Ok(command) => command,
            Err(e) => {
                tracing::error!("Command failure: {}", e);
                return Cmd::ShowError {
                    title: "Command error".to_string(),
                    description: e.to_string(),
                };
            }
        };
        match self.client.run_command(&command) {
            Ok(()) => {
                tracing::info!(command = command.name, "command success");
                Cmd::None
            }
            Err(e) => {
                tracing::error!("Command failure: {}", e);
                Cmd::ShowError {
                    title: "Server error".to_string(),
                    description: e.message().unwrap_or(SERVER_ERROR_FALLBACK).to_string(),
                }
            }
        }
    }
}
