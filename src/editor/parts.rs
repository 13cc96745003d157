//! Typed document parts and the factory that builds them
//!
//! A message is an ordered list of [`Part`]s. Each kind decides which
//! characters it accepts on insertion and removal; text the current part
//! rejects spills over into a new part built by [`PartCreator`].

use std::fmt;
use std::rc::Rc;

use serde::{Deserialize, Serialize};

use super::autocomplete::AutoCompleteProvider;
use crate::client::RoomClient;
use crate::messages::InputType;
use crate::util::{char_head, char_len, char_tail, is_word_char};

/// Text of the `@room` mention pill
pub const AT_ROOM_TEXT: &str = "@room";

/// Kind of a document part
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum PartKind {
    Plain,
    Newline,
    PillCandidate,
    UserPill,
    RoomPill,
    AtRoomPill,
    Command,
}

impl PartKind {
    pub fn as_str(self) -> &'static str {
        match self {
            PartKind::Plain => "plain",
            PartKind::Newline => "newline",
            PartKind::PillCandidate => "pill-candidate",
            PartKind::UserPill => "user-pill",
            PartKind::RoomPill => "room-pill",
            PartKind::AtRoomPill => "at-room-pill",
            PartKind::Command => "command",
        }
    }

    pub fn is_pill(self) -> bool {
        matches!(
            self,
            PartKind::UserPill | PartKind::RoomPill | PartKind::AtRoomPill
        )
    }

    /// Kinds whose text the caret can move into and edit in place
    pub fn can_edit(self) -> bool {
        !self.is_pill() && self != PartKind::Newline
    }

    /// Kinds that open an autocomplete session when they become active
    pub fn opens_auto_complete(self) -> bool {
        matches!(self, PartKind::PillCandidate | PartKind::Command)
    }
}

impl fmt::Display for PartKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A typed run of document text
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Part {
    pub kind: PartKind,
    pub text: String,
    /// User id or room alias for pills
    pub resource_id: Option<String>,
}

impl Part {
    fn new(kind: PartKind, text: impl Into<String>) -> Self {
        Self {
            kind,
            text: text.into(),
            resource_id: None,
        }
    }

    fn pill(kind: PartKind, text: impl Into<String>, resource_id: impl Into<String>) -> Self {
        Self {
            kind,
            text: text.into(),
            resource_id: Some(resource_id.into()),
        }
    }

    /// Length in chars, the unit of all offset arithmetic
    pub fn len(&self) -> usize {
        char_len(&self.text)
    }

    pub fn is_empty(&self) -> bool {
        self.text.is_empty()
    }

    pub fn can_edit(&self) -> bool {
        self.kind.can_edit()
    }

    /// Whether `ch` may be inserted at char `offset` of this part
    pub fn accepts_insertion(&self, ch: char, offset: usize, input_type: &InputType) -> bool {
        match self.kind {
            PartKind::Plain => plain_accepts(ch, input_type),
            PartKind::Newline => offset == 0 && ch == '\n',
            PartKind::PillCandidate => offset == 0 || plain_accepts(ch, input_type),
            PartKind::Command => {
                if offset == 0 {
                    ch == '/'
                } else {
                    is_word_char(ch)
                }
            }
            PartKind::UserPill | PartKind::RoomPill | PartKind::AtRoomPill => ch != ' ',
        }
    }

    /// Whether the char at `offset` may be removed. Removing the leading
    /// sigil of a pill turns it back into plain text.
    pub fn accepts_removal(&self, offset: usize) -> bool {
        !(self.kind.is_pill() && offset == 0)
    }

    /// Insert `text` at `offset` if every char is accepted; returns whether
    /// the insertion happened.
    pub fn validate_and_insert(&mut self, offset: usize, text: &str, input_type: &InputType) -> bool {
        let accepted = text
            .chars()
            .enumerate()
            .all(|(i, ch)| self.accepts_insertion(ch, offset + i, input_type));
        if !accepted {
            return false;
        }
        let mut new_text = String::with_capacity(self.text.len() + text.len());
        new_text.push_str(char_head(&self.text, offset));
        new_text.push_str(text);
        new_text.push_str(char_tail(&self.text, offset));
        self.text = new_text;
        true
    }

    /// Append the longest accepted prefix of `text`; returns the rejected rest.
    pub fn append_until_rejected<'a>(&mut self, text: &'a str, input_type: &InputType) -> Option<&'a str> {
        let offset = self.len();
        for (i, (byte_idx, ch)) in text.char_indices().enumerate() {
            if !self.accepts_insertion(ch, offset + i, input_type) {
                self.text.push_str(&text[..byte_idx]);
                return Some(&text[byte_idx..]);
            }
        }
        self.text.push_str(text);
        None
    }

    /// Remove `len` chars at `offset`. When a char is refused the part is
    /// left untouched and the text it should be replaced with is returned.
    pub fn remove(&mut self, offset: usize, len: usize) -> Option<String> {
        let mut with_removal = String::from(char_head(&self.text, offset));
        with_removal.push_str(char_tail(&self.text, offset + len));
        if (offset..offset + len).any(|i| !self.accepts_removal(i)) {
            return Some(with_removal);
        }
        self.text = with_removal;
        None
    }

    /// Truncate this part at `offset`, returning the tail as a plain part
    pub fn split(&mut self, offset: usize) -> Part {
        let tail = char_tail(&self.text, offset).to_string();
        self.text = char_head(&self.text, offset).to_string();
        Part::new(PartKind::Plain, tail)
    }

    /// Absorb `other` into this part if the kinds allow it
    pub fn merge(&mut self, other: &Part) -> bool {
        if self.kind == PartKind::Plain && other.kind == PartKind::Plain {
            self.text.push_str(&other.text);
            true
        } else {
            false
        }
    }

    pub fn serialize(&self) -> SerializedPart {
        SerializedPart {
            kind: self.kind,
            text: self.text.clone(),
            resource_id: self.resource_id.clone(),
        }
    }
}

fn plain_accepts(ch: char, input_type: &InputType) -> bool {
    if ch == '\n' {
        return false;
    }
    // pill-start characters open a candidate unless they are pasted
    input_type.is_paste_or_drop() || !matches!(ch, '@' | '#' | ':')
}

/// Persisted form of a part: `{"type", "text", "resourceId"?}`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SerializedPart {
    #[serde(rename = "type", alias = "kind")]
    pub kind: PartKind,
    pub text: String,
    #[serde(
        rename = "resourceId",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub resource_id: Option<String>,
}

/// Builds parts for a composer bound to a room.
///
/// The room client resolves mentions and the autocomplete provider backs
/// sessions opened on candidate parts. Command parts are only created when
/// `commands` is enabled (the send composer does this).
#[derive(Clone, Default)]
pub struct PartCreator {
    client: Option<Rc<dyn RoomClient>>,
    auto_complete: Option<Rc<dyn AutoCompleteProvider>>,
    commands: bool,
}

impl fmt::Debug for PartCreator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PartCreator")
            .field("room", &self.client.as_ref().map(|c| c.room_id().to_string()))
            .field("auto_complete", &self.auto_complete.is_some())
            .field("commands", &self.commands)
            .finish()
    }
}

impl PartCreator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_client(mut self, client: Rc<dyn RoomClient>) -> Self {
        self.client = Some(client);
        self
    }

    pub fn with_auto_complete(mut self, provider: Rc<dyn AutoCompleteProvider>) -> Self {
        self.auto_complete = Some(provider);
        self
    }

    pub fn with_commands(mut self, enabled: bool) -> Self {
        self.commands = enabled;
        self
    }

    pub fn set_auto_complete(&mut self, provider: Option<Rc<dyn AutoCompleteProvider>>) {
        self.auto_complete = provider;
    }

    pub fn auto_complete_provider(&self) -> Option<&Rc<dyn AutoCompleteProvider>> {
        self.auto_complete.as_ref()
    }

    pub fn client(&self) -> Option<&Rc<dyn RoomClient>> {
        self.client.as_ref()
    }

    pub fn commands_enabled(&self) -> bool {
        self.commands
    }

    pub fn plain(&self, text: impl Into<String>) -> Part {
        Part::new(PartKind::Plain, text)
    }

    pub fn newline(&self) -> Part {
        Part::new(PartKind::Newline, "\n")
    }

    pub fn pill_candidate(&self, text: impl Into<String>) -> Part {
        Part::new(PartKind::PillCandidate, text)
    }

    pub fn command(&self, text: impl Into<String>) -> Part {
        Part::new(PartKind::Command, text)
    }

    pub fn user_pill(&self, display_name: impl Into<String>, user_id: impl Into<String>) -> Part {
        Part::pill(PartKind::UserPill, display_name, user_id)
    }

    pub fn room_pill(&self, alias: impl Into<String>) -> Part {
        let alias = alias.into();
        Part::pill(PartKind::RoomPill, alias.clone(), alias)
    }

    pub fn at_room_pill(&self) -> Part {
        Part::pill(PartKind::AtRoomPill, AT_ROOM_TEXT, AT_ROOM_TEXT)
    }

    /// Display name for a user id, falling back to the id itself
    pub fn display_name_for(&self, user_id: &str) -> String {
        self.client
            .as_ref()
            .and_then(|client| client.get_member(user_id))
            .map(|member| member.display_name)
            .unwrap_or_else(|| user_id.to_string())
    }

    /// A mention pill plus its separator. Mentions at the start of the
    /// message address the user (`"Alice: "`), elsewhere they are inline.
    pub fn create_mention_parts(
        &self,
        part_index: usize,
        display_name: impl Into<String>,
        user_id: impl Into<String>,
    ) -> Vec<Part> {
        let pill = self.user_pill(display_name, user_id);
        let postfix = self.plain(if part_index == 0 { ": " } else { " " });
        vec![pill, postfix]
    }

    /// The part that should receive freshly typed `text` at `part_index`
    pub fn create_part_for_input(&self, text: &str, part_index: usize, input_type: &InputType) -> Part {
        if self.commands && part_index == 0 && text.starts_with('/') {
            return self.command("");
        }
        match text.chars().next() {
            Some('#' | '@' | ':') if !input_type.is_paste_or_drop() => self.pill_candidate(""),
            Some('\n') => Part::new(PartKind::Newline, ""),
            _ => self.plain(""),
        }
    }

    pub fn deserialize_part(&self, part: &SerializedPart) -> Part {
        match part.kind {
            PartKind::Plain => self.plain(part.text.as_str()),
            PartKind::Newline => self.newline(),
            PartKind::PillCandidate => self.pill_candidate(part.text.as_str()),
            PartKind::Command => self.command(part.text.as_str()),
            PartKind::AtRoomPill => self.at_room_pill(),
            PartKind::RoomPill => Part::pill(
                PartKind::RoomPill,
                part.text.as_str(),
                part.resource_id.as_deref().unwrap_or(&part.text),
            ),
            PartKind::UserPill => self.user_pill(
                part.text.as_str(),
                part.resource_id.as_deref().unwrap_or(&part.text),
            ),
        }
    }
}
