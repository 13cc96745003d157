//! Slash commands typed into the composer
//!
//! A message whose first part is a command (or plain text starting with `/`)
//! is parsed here instead of being sent. The table doubles as the source of
//! command completions.

use std::fmt;

use serde::Serialize;

use crate::util::{fuzzy_match_score, is_word_char, rank_by};

// ============================================================================
// Command Registry
// ============================================================================

/// A command the composer understands
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandDef {
    /// Name without the leading slash
    pub name: &'static str,
    /// Argument synopsis shown in usage errors and completions
    pub args: &'static str,
    pub description: &'static str,
    pub requires_args: bool,
    /// Whether running the command posts a message into the room
    pub sends_message: bool,
}

impl CommandDef {
    pub fn usage(&self) -> String {
        if self.args.is_empty() {
            format!("/{}", self.name)
        } else {
            format!("/{} {}", self.name, self.args)
        }
    }
}

/// Static registry of all available commands
pub static COMMANDS: &[CommandDef] = &[
    CommandDef {
        name: "me",
        args: "<message>",
        description: "Displays action",
        requires_args: true,
        sends_message: true,
    },
    CommandDef {
        name: "shrug",
        args: "<message>",
        description: "Prepends ¯\\_(ツ)_/¯ to a plain-text message",
        requires_args: false,
        sends_message: true,
    },
    CommandDef {
        name: "nick",
        args: "<display_name>",
        description: "Changes your display nickname",
        requires_args: true,
        sends_message: false,
    },
    CommandDef {
        name: "topic",
        args: "<topic>",
        description: "Sets the room topic",
        requires_args: true,
        sends_message: false,
    },
    CommandDef {
        name: "invite",
        args: "<user-id>",
        description: "Invites user with given id to current room",
        requires_args: true,
        sends_message: false,
    },
    CommandDef {
        name: "join",
        args: "<room-alias>",
        description: "Joins room with given alias",
        requires_args: true,
        sends_message: false,
    },
    CommandDef {
        name: "part",
        args: "[<room-alias>]",
        description: "Leave room",
        requires_args: false,
        sends_message: false,
    },
    CommandDef {
        name: "kick",
        args: "<user-id> [reason]",
        description: "Kicks user with given id",
        requires_args: true,
        sends_message: false,
    },
    CommandDef {
        name: "ban",
        args: "<user-id> [reason]",
        description: "Bans user with given id",
        requires_args: true,
        sends_message: false,
    },
    CommandDef {
        name: "unban",
        args: "<user-id>",
        description: "Unbans user with given id",
        requires_args: true,
        sends_message: false,
    },
    CommandDef {
        name: "op",
        args: "<user-id> [<power-level>]",
        description: "Define the power level of a user",
        requires_args: true,
        sends_message: false,
    },
    CommandDef {
        name: "deop",
        args: "<user-id>",
        description: "Deops user with given id",
        requires_args: true,
        sends_message: false,
    },
    CommandDef {
        name: "devtools",
        args: "",
        description: "Opens the Developer Tools dialog",
        requires_args: false,
        sends_message: false,
    },
];

pub fn find_command(name: &str) -> Option<&'static CommandDef> {
    COMMANDS.iter().find(|cmd| cmd.name == name)
}

/// Filter commands by a search query (fuzzy match on the name)
pub fn filter_commands(query: &str) -> Vec<&'static CommandDef> {
    let query = query.strip_prefix('/').unwrap_or(query);
    if query.is_empty() {
        return COMMANDS.iter().collect();
    }
    rank_by(COMMANDS.iter(), |cmd| fuzzy_match_score(query, cmd.name))
}

/// Whether `input` starts with a known command that posts into the room
pub fn sends_message(input: &str) -> bool {
    let Some(rest) = input.strip_prefix('/') else {
        return false;
    };
    let name: String = rest.chars().take_while(|ch| is_word_char(*ch)).collect();
    find_command(&name.to_lowercase()).is_some_and(|def| def.sends_message)
}

// ============================================================================
// Parsing
// ============================================================================

/// A parsed command ready to be run by the client
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SlashCommand {
    pub name: &'static str,
    pub args: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CommandError {
    /// The input does not start with `/`
    NotACommand,
    Unrecognised(String),
    /// Arguments are required but none were given
    MissingArgs(&'static CommandDef),
}

impl fmt::Display for CommandError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CommandError::NotACommand => write!(f, "Not a command"),
            CommandError::Unrecognised(name) => write!(f, "Unrecognised command: /{}", name),
            CommandError::MissingArgs(def) => write!(f, "Usage: {}", def.usage()),
        }
    }
}

impl std::error::Error for CommandError {}

/// Parse `/name args...`. Arguments are trimmed; the name ends at the first
/// char that is not a word char.
pub fn parse_command(input: &str) -> Result<SlashCommand, CommandError> {
    let rest = input.strip_prefix('/').ok_or(CommandError::NotACommand)?;
    let name_end = rest
        .char_indices()
        .find(|(_, ch)| !is_word_char(*ch))
        .map_or(rest.len(), |(i, _)| i);
    let (name, args) = rest.split_at(name_end);
    let name = name.to_lowercase();
    let def = find_command(&name).ok_or(CommandError::Unrecognised(name))?;
    let args = args.trim();
    if def.requires_args && args.is_empty() {
        return Err(CommandError::MissingArgs(def));
    }
    Ok(SlashCommand {
        name: def.name,
        args: args.to_string(),
    })
}
