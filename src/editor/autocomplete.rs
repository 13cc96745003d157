//! Autocomplete sessions over candidate parts
//!
//! A session is opened by the model when the caret enters a pill candidate
//! or command part. It queries the provider with the part text, tracks which
//! completion is selected and turns key presses and component callbacks into
//! [`AutoCompleteAction`]s that the model applies.

use std::fmt;
use std::rc::Rc;

use serde::{Deserialize, Serialize};

use super::parts::{Part, PartCreator};

/// What a completion inserts
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum CompletionKind {
    User,
    Room,
    AtRoom,
    Command,
    Emoji,
    Plain,
}

/// One entry offered by a provider
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Completion {
    pub kind: CompletionKind,
    /// Text to insert (display name, alias, command, emoji)
    pub completion: String,
    /// User id or room alias backing a pill
    #[serde(default)]
    pub completion_id: Option<String>,
    /// Text inserted after room and `@room` pills
    #[serde(default)]
    pub suffix: String,
}

impl Completion {
    pub fn new(kind: CompletionKind, completion: impl Into<String>) -> Self {
        Self {
            kind,
            completion: completion.into(),
            completion_id: None,
            suffix: String::new(),
        }
    }

    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.completion_id = Some(id.into());
        self
    }

    pub fn with_suffix(mut self, suffix: impl Into<String>) -> Self {
        self.suffix = suffix.into();
        self
    }
}

/// Error reported by an autocomplete provider
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProviderError {
    /// The backing data (member list, emoji index) could not be read
    Unavailable(String),
    /// The provider refused the query
    Rejected(String),
}

impl fmt::Display for ProviderError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ProviderError::Unavailable(msg) => write!(f, "Completion source unavailable: {}", msg),
            ProviderError::Rejected(msg) => write!(f, "Completion query rejected: {}", msg),
        }
    }
}

impl std::error::Error for ProviderError {}

/// Source of completions for a query such as `@al`, `#ru` or `/me`.
///
/// `force` is set when the user explicitly asked for completions (Tab) and
/// the provider should answer even for queries it would normally ignore.
pub trait AutoCompleteProvider {
    fn completions(&self, query: &str, force: bool) -> Result<Vec<Completion>, ProviderError>;
}

/// Replacement and/or close request produced by a session
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct AutoCompleteAction {
    pub replace_parts: Option<Vec<Part>>,
    pub close: bool,
}

impl AutoCompleteAction {
    fn replace(parts: Vec<Part>) -> Self {
        Self {
            replace_parts: Some(parts),
            close: false,
        }
    }

    fn replace_and_close(parts: Vec<Part>) -> Self {
        Self {
            replace_parts: Some(parts),
            close: true,
        }
    }

    fn close() -> Self {
        Self {
            replace_parts: None,
            close: true,
        }
    }
}

#[derive(Clone)]
pub struct AutoComplete {
    provider: Rc<dyn AutoCompleteProvider>,
    query_part: Option<Part>,
    part_index: usize,
    /// Flat offset where the session's parts start
    start: usize,
    /// Chars currently occupied by the session's parts
    len: usize,
    completions: Vec<Completion>,
    /// 0 is the typed text, `n` is `completions[n - 1]`
    selection: usize,
}

impl fmt::Debug for AutoComplete {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AutoComplete")
            .field("query", &self.query())
            .field("start", &self.start)
            .field("len", &self.len)
            .field("completions", &self.completions.len())
            .field("selection", &self.selection)
            .finish()
    }
}

impl AutoComplete {
    pub fn new(provider: Rc<dyn AutoCompleteProvider>) -> Self {
        Self {
            provider,
            query_part: None,
            part_index: 0,
            start: 0,
            len: 0,
            completions: Vec::new(),
            selection: 0,
        }
    }

    pub fn query(&self) -> &str {
        self.query_part.as_ref().map_or("", |p| p.text.as_str())
    }

    pub fn completions(&self) -> &[Completion] {
        &self.completions
    }

    pub fn has_completions(&self) -> bool {
        !self.completions.is_empty()
    }

    /// Whether a completion (rather than the typed text) is selected
    pub fn has_selection(&self) -> bool {
        self.selection > 0
    }

    pub fn selected(&self) -> Option<&Completion> {
        self.selection
            .checked_sub(1)
            .and_then(|i| self.completions.get(i))
    }

    pub(super) fn start(&self) -> usize {
        self.start
    }

    pub(super) fn len(&self) -> usize {
        self.len
    }

    pub(super) fn set_len(&mut self, len: usize) {
        self.len = len;
    }

    /// The candidate part was edited: remember it as the typed text and
    /// query the provider again.
    pub fn on_part_update(&mut self, part: &Part, part_index: usize, start: usize) {
        self.query_part = Some(part.clone());
        self.part_index = part_index;
        self.start = start;
        self.len = part.len();
        self.selection = 0;
        self.completions = self.fetch(false);
    }

    fn fetch(&self, force: bool) -> Vec<Completion> {
        let query = self.query();
        match self.provider.completions(query, force) {
            Ok(completions) => completions,
            Err(err) => {
                tracing::warn!(query, error = %err, "autocomplete provider failed");
                Vec::new()
            }
        }
    }

    pub fn on_up_arrow(&mut self, pc: &PartCreator) -> Option<AutoCompleteAction> {
        self.move_selection(-1, pc)
    }

    pub fn on_down_arrow(&mut self, pc: &PartCreator) -> Option<AutoCompleteAction> {
        self.move_selection(1, pc)
    }

    /// Tab cycles through completions, forcing a query first when nothing
    /// is listed yet.
    pub fn on_tab(&mut self, reverse: bool, pc: &PartCreator) -> Option<AutoCompleteAction> {
        if self.completions.is_empty() {
            self.completions = self.fetch(true);
            self.move_selection(1, pc)
        } else {
            self.move_selection(if reverse { -1 } else { 1 }, pc)
        }
    }

    /// Escape restores the typed text as plain text and closes the session
    pub fn on_escape(&self, pc: &PartCreator) -> AutoCompleteAction {
        AutoCompleteAction::replace_and_close(vec![pc.plain(self.query())])
    }

    pub fn on_enter(&self) -> AutoCompleteAction {
        AutoCompleteAction::close()
    }

    fn move_selection(&mut self, delta: isize, pc: &PartCreator) -> Option<AutoCompleteAction> {
        if self.completions.is_empty() {
            return None;
        }
        let slots = self.completions.len() as isize + 1;
        self.selection = (self.selection as isize + delta).rem_euclid(slots) as usize;
        let selected = self.selected().cloned();
        Some(self.on_component_selection_change(selected.as_ref(), pc))
    }

    /// Preview a completion in the document, or the typed text for `None`
    pub fn on_component_selection_change(
        &self,
        completion: Option<&Completion>,
        pc: &PartCreator,
    ) -> AutoCompleteAction {
        match (completion, &self.query_part) {
            (Some(completion), _) => AutoCompleteAction::replace(self.part_for_completion(completion, pc)),
            (None, Some(query)) => AutoCompleteAction::replace(vec![query.clone()]),
            (None, None) => AutoCompleteAction::default(),
        }
    }

    pub fn on_component_confirm(&self, completion: &Completion, pc: &PartCreator) -> AutoCompleteAction {
        AutoCompleteAction::replace_and_close(self.part_for_completion(completion, pc))
    }

    fn part_for_completion(&self, completion: &Completion, pc: &PartCreator) -> Vec<Part> {
        let text = completion.completion.as_str();
        let id = completion.completion_id.as_deref().unwrap_or(text);
        match completion.kind {
            CompletionKind::Room => vec![pc.room_pill(id), pc.plain(completion.suffix.as_str())],
            CompletionKind::AtRoom => vec![pc.at_room_pill(), pc.plain(completion.suffix.as_str())],
            // the separator depends on where the mention lands
            CompletionKind::User => pc.create_mention_parts(self.part_index, text, id),
            CompletionKind::Command => vec![pc.command(text)],
            CompletionKind::Emoji | CompletionKind::Plain => vec![pc.plain(text)],
        }
    }
}
