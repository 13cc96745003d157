//! Command types for the Elm-style architecture
//!
//! Commands represent side effects the host must perform after a composer
//! update. Effects on the room itself (sending, typing notifications) go
//! through the injected client; these are the ones only the host view can
//! carry out.

use crate::client::RoomEvent;

/// Commands returned by composer update functions
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum Cmd {
    /// No command - do nothing
    #[default]
    None,
    /// The key event was handled; suppress the surface's default action
    PreventDefault,
    /// Deliver `ComposerMsg::Tick` on the next turn of the event loop
    ScheduleTick,
    /// Open the message editor on the user's last message
    EditLastMessage(RoomEvent),
    /// Show an error dialog
    ShowError { title: String, description: String },
    /// Flash the composer: nothing to complete
    VisualBell,
    /// The reply being composed was sent; hide the reply preview
    ClearReply,
    /// Execute multiple commands
    Batch(Vec<Cmd>),
}

impl Cmd {
    /// Create a batch of commands, dropping `Cmd::None` and unwrapping
    /// single-command batches
    pub fn batch(cmds: Vec<Cmd>) -> Self {
        let mut cmds: Vec<Cmd> = cmds.into_iter().filter(|c| !c.is_none()).collect();
        match cmds.len() {
            0 => Cmd::None,
            1 => cmds.remove(0),
            _ => Cmd::Batch(cmds),
        }
    }

    pub fn is_none(&self) -> bool {
        matches!(self, Cmd::None)
    }

    /// Whether the host must suppress the default action of the event
    pub fn prevents_default(&self) -> bool {
        match self {
            Cmd::PreventDefault => true,
            Cmd::Batch(cmds) => cmds.iter().any(Cmd::prevents_default),
            _ => false,
        }
    }

    /// Commands in execution order, with batches flattened
    pub fn flatten(self) -> Vec<Cmd> {
        match self {
            Cmd::None => Vec::new(),
            Cmd::Batch(cmds) => cmds.into_iter().flat_map(Cmd::flatten).collect(),
            other => vec![other],
        }
    }

    /// Convert Option<Cmd> with None to Cmd::None
    pub fn from_option(opt: Option<Cmd>) -> Self {
        opt.unwrap_or(Cmd::None)
    }
}

// Allow converting Option<Cmd> to Cmd
impl From<Option<Cmd>> for Cmd {
    fn from(opt: Option<Cmd>) -> Self {
        opt.unwrap_or(Cmd::None)
    }
}
