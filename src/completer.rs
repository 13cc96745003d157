//! Completions for the parts of a room's composer
//!
//! Dispatches on the query's first char: `@` members (and `@room`), `#` room
//! aliases, `:` emoji shortcodes and `/` slash commands. A forced query
//! without a sigil completes member names.

use std::rc::Rc;

use crate::client::RoomClient;
use crate::editor::{AutoCompleteProvider, Completion, CompletionKind, ProviderError, AT_ROOM_TEXT};
use crate::slash_commands::filter_commands;
use crate::util::{fuzzy_match_score, rank_by};

/// Default cap on completions offered per query
pub const DEFAULT_LIMIT: usize = 20;

/// Emoji shortcodes offered for `:` queries
static EMOJI_SHORTCODES: &[(&str, &str)] = &[
    ("smile", "😄"),
    ("slightly_smiling_face", "🙂"),
    ("grin", "😁"),
    ("joy", "😂"),
    ("wink", "😉"),
    ("heart", "❤️"),
    ("broken_heart", "💔"),
    ("thumbsup", "👍"),
    ("thumbsdown", "👎"),
    ("tada", "🎉"),
    ("thinking", "🤔"),
    ("cry", "😢"),
    ("rage", "😠"),
    ("sunglasses", "😎"),
    ("wave", "👋"),
    ("eyes", "👀"),
    ("fire", "🔥"),
    ("rocket", "🚀"),
];

pub struct RoomCompleter {
    client: Rc<dyn RoomClient>,
    limit: usize,
}

impl RoomCompleter {
    pub fn new(client: Rc<dyn RoomClient>) -> Self {
        Self {
            client,
            limit: DEFAULT_LIMIT,
        }
    }

    pub fn with_limit(mut self, limit: usize) -> Self {
        self.limit = limit;
        self
    }

    fn users(&self, term: &str) -> Vec<Completion> {
        let members = rank_by(self.client.members(), |member| {
            let by_name = fuzzy_match_score(term, &member.display_name);
            let localpart = member.user_id.trim_start_matches('@');
            let localpart = localpart.split(':').next().unwrap_or(localpart);
            let by_id = fuzzy_match_score(term, localpart);
            by_name.max(by_id)
        });
        let mut completions: Vec<Completion> = members
            .into_iter()
            .map(|m| Completion::new(CompletionKind::User, m.display_name).with_id(m.user_id))
            .collect();
        if !term.is_empty() && fuzzy_match_score(term, "room").is_some() {
            completions.push(
                Completion::new(CompletionKind::AtRoom, AT_ROOM_TEXT)
                    .with_id(AT_ROOM_TEXT)
                    .with_suffix(" "),
            );
        }
        completions
    }

    fn rooms(&self, term: &str) -> Vec<Completion> {
        rank_by(self.client.room_aliases(), |alias| fuzzy_match_score(term, alias))
            .into_iter()
            .map(|alias| {
                Completion::new(CompletionKind::Room, alias.clone())
                    .with_id(alias)
                    .with_suffix(" ")
            })
            .collect()
    }

    fn emoji(&self, term: &str) -> Vec<Completion> {
        rank_by(EMOJI_SHORTCODES.iter(), |(code, _)| fuzzy_match_score(term, code))
            .into_iter()
            .map(|(_, emoji)| Completion::new(CompletionKind::Emoji, *emoji))
            .collect()
    }

    fn commands(&self, query: &str) -> Vec<Completion> {
        filter_commands(query)
            .into_iter()
            .map(|cmd| Completion::new(CompletionKind::Command, format!("/{}", cmd.name)))
            .collect()
    }
}

impl AutoCompleteProvider for RoomCompleter {
    fn completions(&self, query: &str, force: bool) -> Result<Vec<Completion>, ProviderError> {
        let mut chars = query.chars();
        let Some(sigil) = chars.next() else {
            return Ok(Vec::new());
        };
        let term = chars.as_str();
        // whitespace ends a candidate; nothing left to complete
        if term.contains(char::is_whitespace) {
            return Ok(Vec::new());
        }
        if term.is_empty() && !force && sigil != '/' {
            return Ok(Vec::new());
        }
        let mut completions = match sigil {
            '@' => self.users(term),
            '#' => self.rooms(term),
            ':' if term.chars().count() >= 2 || force => self.emoji(term),
            '/' => self.commands(query),
            // bare words only complete names when asked for (Tab)
            _ if force => self.users(query),
            _ => Vec::new(),
        };
        completions.truncate(self.limit);
        tracing::trace!(query, count = completions.len(), "completions");
        Ok(completions)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::client::LocalRoom;

    fn completer() -> RoomCompleter {
        let room = LocalRoom::new("!r:example.org", "@me:example.org")
            .with_member("@alice:example.org", "Alice")
            .with_member("@bob:example.org", "Bob")
            .with_member("@alan:example.org", "Alan Turing")
            .with_alias("#rust:example.org")
            .with_alias("#random:example.org");
        RoomCompleter::new(Rc::new(room))
    }

    fn texts(completions: &[Completion]) -> Vec<&str> {
        completions.iter().map(|c| c.completion.as_str()).collect()
    }

    #[test]
    fn test_members_ranked() {
        let c = completer().completions("@al", false).unwrap();
        assert_eq!(texts(&c), vec!["Alice", "Alan Turing"]);
        assert_eq!(c[0].completion_id.as_deref(), Some("@alice:example.org"));
    }

    #[test]
    fn test_bare_sigil_needs_force() {
        assert!(completer().completions("@", false).unwrap().is_empty());
        assert_eq!(completer().completions("@", true).unwrap().len(), 3);
    }

    #[test]
    fn test_bare_word_completes_names_when_forced() {
        assert!(completer().completions("bo", false).unwrap().is_empty());
        let c = completer().completions("bo", true).unwrap();
        assert_eq!(texts(&c), vec!["Bob"]);
    }

    #[test]
    fn test_at_room() {
        let c = completer().completions("@ro", false).unwrap();
        assert_eq!(c.last().map(|c| c.kind), Some(CompletionKind::AtRoom));
    }

    #[test]
    fn test_rooms_and_emoji_and_commands() {
        let rooms = completer().completions("#ru", false).unwrap();
        assert_eq!(texts(&rooms), vec!["#rust:example.org"]);

        assert!(completer().completions(":f", false).unwrap().is_empty());
        let emoji = completer().completions(":tada", false).unwrap();
        assert_eq!(texts(&emoji), vec!["🎉"]);

        let cmds = completer().completions("/ni", false).unwrap();
        assert_eq!(cmds[0].completion, "/nick");
    }

    #[test]
    fn test_limit_and_whitespace() {
        let c = completer().with_limit(1).completions("@a", false).unwrap();
        assert_eq!(c.len(), 1);
        assert!(completer().completions("@al ", false).unwrap().is_empty());
    }
}
