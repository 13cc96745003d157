//! Composer configuration persistence
//!
//! Stores user preferences in the config file [`Paths`] resolves

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::editor::history::{DEFAULT_MAX_ENTRIES, DEFAULT_STEP_LENGTH};
use crate::messages::Modifiers;
use crate::paths::Paths;

/// When the model catches up with an input method's composed text
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CompositionEndPolicy {
    /// Reconcile on the next tick, after the surface has settled
    #[default]
    Deferred,
    /// Reconcile as soon as composition ends
    Immediate,
}

/// Modifier used for formatting, undo and redo shortcuts
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PrimaryModifier {
    Ctrl,
    Meta,
}

impl Default for PrimaryModifier {
    fn default() -> Self {
        if cfg!(target_os = "macos") {
            PrimaryModifier::Meta
        } else {
            PrimaryModifier::Ctrl
        }
    }
}

impl PrimaryModifier {
    pub fn is_pressed(self, modifiers: &Modifiers) -> bool {
        match self {
            PrimaryModifier::Ctrl => modifiers.ctrl,
            PrimaryModifier::Meta => modifiers.meta,
        }
    }

    /// On Meta platforms Alt+Enter also inserts a newline
    pub fn alt_enter_inserts_newline(self) -> bool {
        self == PrimaryModifier::Meta
    }
}

/// Undo history tuning
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct HistoryConfig {
    /// Max chars coalesced into one undo step
    #[serde(default = "default_step_length")]
    pub step_length: usize,
    /// Oldest steps are dropped beyond this
    #[serde(default = "default_max_entries")]
    pub max_entries: usize,
}

fn default_step_length() -> usize {
    DEFAULT_STEP_LENGTH
}

fn default_max_entries() -> usize {
    DEFAULT_MAX_ENTRIES
}

impl Default for HistoryConfig {
    fn default() -> Self {
        Self {
            step_length: DEFAULT_STEP_LENGTH,
            max_entries: DEFAULT_MAX_ENTRIES,
        }
    }
}

/// Composer configuration that persists across sessions
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ComposerConfig {
    /// Replace emoticons like `:)` with emoji as they are typed
    pub auto_replace_emoji: bool,
    pub composition_end: CompositionEndPolicy,
    pub primary_modifier: PrimaryModifier,
    pub history: HistoryConfig,
    /// Shown while the composer is empty
    pub placeholder: Option<String>,
}

impl ComposerConfig {
    /// Load config from the resolved config file, or return defaults
    pub fn load(paths: &Paths) -> Self {
        let Some(path) = paths.config_file.as_deref() else {
            tracing::debug!("No config directory available, using defaults");
            return Self::default();
        };
        Self::load_from(path)
    }

    /// Load config from `path`; missing or invalid files give the defaults
    pub fn load_from(path: &Path) -> Self {
        if !path.exists() {
            tracing::debug!(
                "Config file not found at {}, using defaults",
                path.display()
            );
            return Self::default();
        }

        match std::fs::read_to_string(path) {
            Ok(content) => match serde_yaml::from_str(&content) {
                Ok(config) => {
                    tracing::info!("Loaded config from {}", path.display());
                    config
                }
                Err(e) => {
                    tracing::warn!("Failed to parse config at {}: {}", path.display(), e);
                    Self::default()
                }
            },
            Err(e) => {
                tracing::warn!("Failed to read config at {}: {}", path.display(), e);
                Self::default()
            }
        }
    }

    /// Save config to `path`, creating its directory if needed
    pub fn save_to(&self, path: &Path) -> Result<(), String> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)
                .map_err(|e| format!("Failed to create config directory: {}", e))?;
        }

        let content = serde_yaml::to_string(self)
            .map_err(|e| format!("Failed to serialize config: {}", e))?;

        std::fs::write(path, content)
            .map_err(|e| format!("Failed to write config to {}: {}", path.display(), e))?;

        tracing::info!("Saved config to {}", path.display());
        Ok(())
    }
}
