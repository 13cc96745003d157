//! Scripted composer sessions
//!
//! A script lists a room's members and aliases and a sequence of steps, each
//! a surface edit or a host event. Running it drives a [`SendComposer`] over
//! a [`MemorySurface`] and a [`LocalRoom`], executing the returned commands
//! the way a host view would, and records what came out.

use std::collections::VecDeque;
use std::rc::Rc;

use serde::{Deserialize, Serialize};

use crate::client::{LocalRoom, Member, MessageContent, RoomEvent};
use crate::commands::Cmd;
use crate::composer::SendComposer;
use crate::config::ComposerConfig;
use crate::editor::SerializedPart;
use crate::messages::{ComposerMsg, FormatAction, InputType, Key, KeyEvent};
use crate::slash_commands::SlashCommand;
use crate::storage::Storage;
use crate::surface::MemorySurface;
use crate::tracing::ModelSnapshot;

/// User id the local room sends as
pub const LOCAL_USER_ID: &str = "@me:localhost";

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Script {
    pub members: Vec<Member>,
    pub aliases: Vec<String>,
    /// Each step is a one-key map (`- type: "hi"`) or a bare name (`- backspace`)
    #[serde(with = "serde_yaml::with::singleton_map_recursive")]
    pub steps: Vec<Step>,
}

impl Script {
    pub fn from_yaml(yaml: &str) -> Result<Self, serde_yaml::Error> {
        serde_yaml::from_str(yaml)
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Step {
    /// Type text over the selection
    Type(String),
    Backspace,
    Delete,
    Caret(usize),
    Select { anchor: usize, focus: usize },
    /// Enter text through an input method
    Compose(String),
    Key(KeyEvent),
    Paste(String),
    Format(FormatAction),
    Mention(String),
    Quote(String),
    Reply(Option<RoomEvent>),
    Focus,
    Blur,
}

/// What a script run produced
#[derive(Debug, Clone, Serialize)]
pub struct Transcript {
    /// Composer content at the end of the run
    pub parts: Vec<SerializedPart>,
    pub text: String,
    pub sent: Vec<MessageContent>,
    pub commands: Vec<SlashCommand>,
    /// Host effects requested along the way, in order
    pub effects: Vec<String>,
}

pub struct ScriptRunner {
    room: Rc<LocalRoom>,
    composer: SendComposer<MemorySurface>,
    effects: Vec<String>,
}

impl ScriptRunner {
    pub fn new(
        script: &Script,
        room_id: &str,
        storage: Rc<dyn Storage>,
        config: ComposerConfig,
    ) -> Self {
        let room = script
            .members
            .iter()
            .fold(LocalRoom::new(room_id, LOCAL_USER_ID), |room, m| {
                room.with_member(m.user_id.as_str(), m.display_name.as_str())
            });
        let room = Rc::new(
            script
                .aliases
                .iter()
                .fold(room, |room, alias| room.with_alias(alias.as_str())),
        );
        let mut composer = SendComposer::new(room.clone(), storage, MemorySurface::new(), config);
        composer.update(ComposerMsg::Focus);
        Self {
            room,
            composer,
            effects: Vec::new(),
        }
    }

    pub fn composer(&self) -> &SendComposer<MemorySurface> {
        &self.composer
    }

    pub fn run_step(&mut self, step: &Step) {
        let before = ModelSnapshot::from_model(self.composer.model());
        self.apply_step(step);
        let after = ModelSnapshot::from_model(self.composer.model());
        match before.diff(&after) {
            Some(changes) => tracing::debug!(?step, %changes, "script step"),
            None => tracing::debug!(?step, "script step (model unchanged)"),
        }
    }

    fn apply_step(&mut self, step: &Step) {
        match step {
            Step::Type(text) => {
                self.composer.surface_mut().type_text(text);
                self.dispatch(ComposerMsg::Input(InputType::InsertText));
            }
            Step::Backspace => {
                if !self.dispatch(ComposerMsg::KeyDown(KeyEvent::plain(Key::Backspace))) {
                    self.composer.surface_mut().delete_backward();
                    self.dispatch(ComposerMsg::Input(InputType::DeleteContentBackward));
                }
            }
            Step::Delete => {
                if !self.dispatch(ComposerMsg::KeyDown(KeyEvent::plain(Key::Delete))) {
                    self.composer.surface_mut().delete_forward();
                    self.dispatch(ComposerMsg::Input(InputType::DeleteContentForward));
                }
            }
            Step::Caret(offset) => {
                self.composer.surface_mut().set_caret(*offset);
                self.dispatch(ComposerMsg::SelectionChange);
            }
            Step::Select { anchor, focus } => {
                self.composer.surface_mut().select(*anchor, *focus);
                self.dispatch(ComposerMsg::SelectionChange);
            }
            Step::Compose(text) => {
                self.dispatch(ComposerMsg::CompositionStart);
                self.composer.surface_mut().type_text(text);
                self.dispatch(ComposerMsg::Input(InputType::InsertCompositionText));
                self.dispatch(ComposerMsg::CompositionEnd);
            }
            Step::Key(event) => {
                self.dispatch(ComposerMsg::KeyDown(event.clone()));
            }
            Step::Paste(text) => {
                self.dispatch(ComposerMsg::Paste(text.clone()));
            }
            Step::Format(action) => {
                self.dispatch(ComposerMsg::Format(*action));
            }
            Step::Mention(user_id) => {
                self.dispatch(ComposerMsg::InsertMention(user_id.clone()));
            }
            Step::Quote(body) => {
                self.dispatch(ComposerMsg::InsertQuote(body.clone()));
            }
            Step::Reply(event) => {
                self.dispatch(ComposerMsg::ReplyTo(event.clone()));
            }
            Step::Focus => {
                self.dispatch(ComposerMsg::Focus);
            }
            Step::Blur => {
                self.composer.surface_mut().blur();
                self.dispatch(ComposerMsg::Blur);
            }
        }
    }

    /// Deliver `msg` and run the commands it produces, including any ticks
    /// they schedule. Returns whether the default action was prevented.
    pub fn dispatch(&mut self, msg: ComposerMsg) -> bool {
        let mut prevented = false;
        let mut queue = VecDeque::from([msg]);
        while let Some(msg) = queue.pop_front() {
            let cmd = Cmd::from(self.composer.update(msg));
            prevented |= cmd.prevents_default();
            for cmd in cmd.flatten() {
                match cmd {
                    Cmd::ScheduleTick => queue.push_back(ComposerMsg::Tick),
                    Cmd::EditLastMessage(event) => {
                        self.effects.push(format!("edit {}", event.event_id))
                    }
                    Cmd::ShowError { title, description } => {
                        self.effects.push(format!("{}: {}", title, description))
                    }
                    Cmd::VisualBell => self.effects.push("bell".to_string()),
                    Cmd::ClearReply => self.effects.push("reply cleared".to_string()),
                    Cmd::None | Cmd::PreventDefault | Cmd::Batch(_) => {}
                }
            }
        }
        prevented
    }

    pub fn transcript(&self) -> Transcript {
        let model = self.composer.model();
        Transcript {
            parts: model.serialize_parts(),
            text: model.text(),
            sent: self.room.sent(),
            commands: self.room.commands(),
            effects: self.effects.clone(),
        }
    }
}

/// Run every step of `script` and return the transcript
pub fn run_script(
    script: &Script,
    room_id: &str,
    storage: Rc<dyn Storage>,
    config: ComposerConfig,
) -> Transcript {
    let mut runner = ScriptRunner::new(script, room_id, storage, config);
    for step in &script.steps {
        runner.run_step(step);
    }
    runner.transcript()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::MemoryStorage;

    fn run(yaml: &str) -> Transcript {
        let script = Script::from_yaml(yaml).unwrap();
        run_script(
            &script,
            "!test:localhost",
            Rc::new(MemoryStorage::new()),
            ComposerConfig::default(),
        )
    }

    #[test]
    fn test_parse_steps() {
        let script = Script::from_yaml(
            r#"
members:
  - user_id: "@bob:localhost"
    display_name: Bob
steps:
  - type: "hi "
  - mention: "@bob:localhost"
  - select: { anchor: 0, focus: 2 }
  - format: bold
  - key: { key: enter }
  - backspace
"#,
        )
        .unwrap();
        assert_eq!(script.members.len(), 1);
        assert_eq!(script.steps.len(), 6);
        assert!(matches!(script.steps[4], Step::Key(KeyEvent { key: Key::Enter, .. })));
    }

    #[test]
    fn test_parse_nested_and_bare_steps() {
        let script = Script::from_yaml(
            r#"
steps:
  - delete
  - caret: 3
  - compose: "か"
  - key: { key: { char: b }, modifiers: { ctrl: true } }
  - reply: { event_id: "$e", sender: "@bob:localhost", body: "hey" }
  - reply: null
  - paste: "a\nb"
  - quote: "q"
  - focus
  - blur
"#,
        )
        .unwrap();
        assert!(script.members.is_empty());
        assert_eq!(script.steps.len(), 10);
        assert!(matches!(script.steps[0], Step::Delete));
        assert!(matches!(script.steps[1], Step::Caret(3)));
        match &script.steps[3] {
            Step::Key(event) => {
                assert_eq!(event.key, Key::Char('b'));
                assert!(event.modifiers.ctrl);
                assert!(!event.is_composing);
            }
            other => panic!("expected a key step, got {:?}", other),
        }
        assert!(matches!(&script.steps[4], Step::Reply(Some(e)) if e.event_id == "$e"));
        assert!(matches!(script.steps[5], Step::Reply(None)));
        assert!(matches!(&script.steps[6], Step::Paste(text) if text == "a\nb"));
    }

    #[test]
    fn test_unknown_step_is_rejected() {
        assert!(Script::from_yaml("steps:\n  - shout: \"hi\"\n").is_err());
    }

    #[test]
    fn test_run_sends_message() {
        let transcript = run(r#"
steps:
  - type: "hello"
  - backspace
  - key: { key: enter }
"#);
        assert_eq!(transcript.sent.len(), 1);
        assert_eq!(transcript.sent[0].body, "hell");
        assert!(transcript.parts.is_empty());
    }

    #[test]
    fn test_composition_is_reconciled_once() {
        let transcript = run(r#"
steps:
  - compose: "にほん"
"#);
        assert_eq!(transcript.text, "にほん");
    }

    #[test]
    fn test_effects_are_recorded() {
        let transcript = run(r#"
steps:
  - type: "/nick"
  - key: { key: enter }
"#);
        assert_eq!(transcript.effects, vec!["Command error: Usage: /nick <display_name>"]);
    }
}
