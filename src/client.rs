//! Room and client capability consumed by the composer
//!
//! The composer never talks to a homeserver itself. Everything it needs from
//! the outside (member lookup, sending, running commands, typing
//! notifications) goes through [`RoomClient`], injected at construction.

use std::cell::RefCell;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::slash_commands::SlashCommand;

/// A room member as the composer sees it
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Member {
    pub user_id: String,
    pub display_name: String,
}

impl Member {
    pub fn new(user_id: impl Into<String>, display_name: impl Into<String>) -> Self {
        Self {
            user_id: user_id.into(),
            display_name: display_name.into(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum MessageType {
    #[serde(rename = "m.text")]
    Text,
    #[serde(rename = "m.emote")]
    Emote,
}

/// `m.relates_to` of a reply
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RelatesTo {
    #[serde(rename = "m.in_reply_to")]
    pub in_reply_to: InReplyTo,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InReplyTo {
    pub event_id: String,
}

/// Content of an outgoing room message
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MessageContent {
    pub msgtype: MessageType,
    pub body: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub format: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub formatted_body: Option<String>,
    #[serde(rename = "m.relates_to", default, skip_serializing_if = "Option::is_none")]
    pub relates_to: Option<RelatesTo>,
}

/// An event being replied to or quoted
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoomEvent {
    pub event_id: String,
    pub sender: String,
    pub body: String,
}

/// Failure reported by the client when sending or running a command
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ClientError {
    /// The server rejected or failed the request; `None` when it gave no reason
    Server(Option<String>),
    /// The command was understood but cannot run in this room
    Command(String),
}

impl ClientError {
    /// Human readable reason, if the failure carried one
    pub fn message(&self) -> Option<&str> {
        match self {
            ClientError::Server(msg) => msg.as_deref(),
            ClientError::Command(msg) => Some(msg),
        }
    }
}

impl fmt::Display for ClientError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ClientError::Server(Some(msg)) => write!(f, "Server error: {}", msg),
            ClientError::Server(None) => write!(f, "Server error"),
            ClientError::Command(msg) => write!(f, "Command failed: {}", msg),
        }
    }
}

impl std::error::Error for ClientError {}

pub trait RoomClient {
    fn room_id(&self) -> &str;

    fn get_member(&self, user_id: &str) -> Option<Member>;

    /// All joined members, used for mention completion
    fn members(&self) -> Vec<Member>;

    /// Aliases of rooms the user can mention
    fn room_aliases(&self) -> Vec<String>;

    fn send_message(&self, content: &MessageContent) -> Result<(), ClientError>;

    fn run_command(&self, command: &SlashCommand) -> Result<(), ClientError>;

    fn set_typing(&self, typing: bool);

    /// The user's most recent message that can still be edited
    fn last_editable_event(&self) -> Option<RoomEvent>;
}

/// An in-process room that records everything sent through it.
///
/// Used by the script harness and tests.
#[derive(Debug, Default)]
pub struct LocalRoom {
    room_id: String,
    user_id: String,
    members: Vec<Member>,
    aliases: Vec<String>,
    sent: RefCell<Vec<MessageContent>>,
    commands: RefCell<Vec<SlashCommand>>,
    typing: RefCell<Vec<bool>>,
    fail_sends: RefCell<Option<ClientError>>,
}

impl LocalRoom {
    pub fn new(room_id: impl Into<String>, user_id: impl Into<String>) -> Self {
        Self {
            room_id: room_id.into(),
            user_id: user_id.into(),
            ..Self::default()
        }
    }

    pub fn with_member(mut self, user_id: impl Into<String>, display_name: impl Into<String>) -> Self {
        self.members.push(Member::new(user_id, display_name));
        self
    }

    pub fn with_alias(mut self, alias: impl Into<String>) -> Self {
        self.aliases.push(alias.into());
        self
    }

    /// Make the next sends and commands fail with `error`
    pub fn fail_with(&self, error: Option<ClientError>) {
        *self.fail_sends.borrow_mut() = error;
    }

    pub fn sent(&self) -> Vec<MessageContent> {
        self.sent.borrow().clone()
    }

    pub fn commands(&self) -> Vec<SlashCommand> {
        self.commands.borrow().clone()
    }

    /// Every typing notification, in order
    pub fn typing_notifications(&self) -> Vec<bool> {
        self.typing.borrow().clone()
    }

    fn check_failure(&self) -> Result<(), ClientError> {
        match self.fail_sends.borrow().as_ref() {
            Some(err) => Err(err.clone()),
            None => Ok(()),
        }
    }
}

impl RoomClient for LocalRoom {
    fn room_id(&self) -> &str {
        &self.room_id
    }

    fn get_member(&self, user_id: &str) -> Option<Member> {
        self.members.iter().find(|m| m.user_id == user_id).cloned()
    }

    fn members(&self) -> Vec<Member> {
        self.members.clone()
    }

    fn room_aliases(&self) -> Vec<String> {
        self.aliases.clone()
    }

    fn send_message(&self, content: &MessageContent) -> Result<(), ClientError> {
        self.check_failure()?;
        tracing::debug!(room = %self.room_id, body = %content.body, "message sent");
        self.sent.borrow_mut().push(content.clone());
        Ok(())
    }

    fn run_command(&self, command: &SlashCommand) -> Result<(), ClientError> {
        self.check_failure()?;
        tracing::debug!(room = %self.room_id, command = command.name, "command run");
        self.commands.borrow_mut().push(command.clone());
        Ok(())
    }

    fn set_typing(&self, typing: bool) {
        let mut notifications = self.typing.borrow_mut();
        if notifications.last() != Some(&typing) {
            notifications.push(typing);
        }
    }

    fn last_editable_event(&self) -> Option<RoomEvent> {
        self.sent.borrow().iter().enumerate().rev().find_map(|(i, content)| {
            (content.msgtype == MessageType::Text).then(|| RoomEvent {
                event_id: format!("$local{}", i),
                sender: self.user_id.clone(),
                body: content.body.clone(),
            })
        })
    }
}
