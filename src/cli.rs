//! Command-line argument parsing for the composer harness
//!
//! Supports:
//! - Replaying a YAML script of composer events against a local room
//! - Choosing the room, the config file and where drafts and send history
//!   are stored
//! - Overriding config options for a single run

use clap::Parser;
use std::path::PathBuf;

use crate::config::{CompositionEndPolicy, ComposerConfig};
use crate::paths::Paths;

/// Drive a message composer from a script of surface events
#[derive(Parser, Debug)]
#[command(
    name = "cider",
    version,
    about = "Drive a message composer from a script of surface events"
)]
pub struct CliArgs {
    /// YAML script of composer steps
    #[arg(long, value_name = "FILE")]
    pub script: PathBuf,

    /// Room id the composer sends into
    #[arg(long, default_value = "!local:localhost")]
    pub room: String,

    /// Config file (defaults to $CIDER_CONFIG, then the config dir)
    #[arg(long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Data directory for drafts, send history and logs
    #[arg(long, value_name = "DIR")]
    pub data_dir: Option<PathBuf>,

    /// Keep drafts and send history in the data directory between runs
    #[arg(long)]
    pub persist: bool,

    /// Replace emoticons with emoji while typing
    #[arg(long)]
    pub emoji: bool,

    /// Reconcile composed text as soon as composition ends
    #[arg(long)]
    pub immediate_composition: bool,
}

impl CliArgs {
    /// Apply the per-run overrides to a loaded config
    pub fn apply_to(&self, mut config: ComposerConfig) -> ComposerConfig {
        if self.emoji {
            config.auto_replace_emoji = true;
        }
        if self.immediate_composition {
            config.composition_end = CompositionEndPolicy::Immediate;
        }
        config
    }

    pub fn paths(&self) -> Paths {
        Paths::resolve(self.config.as_deref(), self.data_dir.as_deref())
    }

    /// Storage file to persist into; `None` keeps storage in memory.
    /// An explicit `--data-dir` implies `--persist`.
    pub fn storage_path(&self, paths: &Paths) -> Option<PathBuf> {
        if self.persist || self.data_dir.is_some() {
            paths.storage_file()
        } else {
            None
        }
    }
}
