//! cider - drive a message composer from a script
//!
//! Reads a YAML script of surface edits and host events, replays it against
//! a local room and prints the resulting transcript as JSON on stdout.

use std::rc::Rc;

use anyhow::{Context, Result};
use clap::Parser;

use cider::cli::CliArgs;
use cider::config::ComposerConfig;
use cider::script::{run_script, Script};
use cider::storage::{FileStorage, MemoryStorage, Storage};

fn main() -> Result<()> {
    let args = CliArgs::parse();
    let paths = args.paths();
    cider::tracing::init(&paths);

    let config = args.apply_to(ComposerConfig::load(&paths));

    let source = std::fs::read_to_string(&args.script)
        .with_context(|| format!("Failed to read script {}", args.script.display()))?;
    let script = Script::from_yaml(&source)
        .with_context(|| format!("Failed to parse script {}", args.script.display()))?;

    let storage: Rc<dyn Storage> = match args.storage_path(&paths) {
        Some(path) => {
            let storage = FileStorage::open(&path)
                .with_context(|| format!("Failed to open storage {}", path.display()))?;
            Rc::new(storage)
        }
        None => Rc::new(MemoryStorage::new()),
    };

    tracing::info!(
        room = %args.room,
        steps = script.steps.len(),
        "running script"
    );
    let transcript = run_script(&script, &args.room, storage, config);

    println!("{}", serde_json::to_string_pretty(&transcript)?);
    Ok(())
}
