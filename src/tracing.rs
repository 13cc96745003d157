//! Debug tracing infrastructure for development diagnostics
//!
//! Provides structured logging with scoped filtering for debugging model
//! reconciliation, autocomplete sessions and undo history.
//!
//! # Usage
//!
//! Configure via RUST_LOG environment variable:
//! - `RUST_LOG=debug` - all debug logs
//! - `RUST_LOG=cider::editor=trace` - module-level filtering
//! - `RUST_LOG=cider::editor::history=debug,cider::composer=trace`
//!
//! # Log Files
//!
//! Logs are written to `logs/cider.log` under the data dir with daily rotation.
//! File logging uses debug level by default for more verbose troubleshooting.

use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Layer};

use crate::editor::{EditorModel, PartKind};
use crate::paths::{Paths, LOG_FILE_PREFIX};

/// Initialize tracing subscriber with console and file logging
///
/// Console output respects RUST_LOG (default `warn`) and goes to stderr, so
/// harness output on stdout stays machine readable.
///
/// File logging writes to `logs/cider.log` under the data dir with daily rotation.
pub fn init(paths: &Paths) {
    let console_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));

    let console_layer = fmt::layer()
        .with_writer(std::io::stderr)
        .with_target(true)
        .with_line_number(true)
        .with_filter(console_filter);

    // File layer - always debug level for troubleshooting
    let file_layer = match paths.ensure_logs_dir() {
        Ok(logs_dir) => {
            let file_appender =
                tracing_appender::rolling::daily(logs_dir, LOG_FILE_PREFIX);
            Some(
                fmt::layer()
                    .with_writer(file_appender)
                    .with_ansi(false)
                    .with_target(true)
                    .with_line_number(true)
                    .with_filter(EnvFilter::new("debug")),
            )
        }
        Err(e) => {
            eprintln!("Warning: Could not initialize file logging: {:#}", e);
            None
        }
    };

    tracing_subscriber::registry()
        .with(console_layer)
        .with(file_layer)
        .init();
}

/// Lightweight snapshot of the model for diffing
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModelSnapshot {
    pub generation: u64,
    pub parts: Vec<(PartKind, usize)>,
    pub len: usize,
    pub auto_complete: Option<String>,
}

impl ModelSnapshot {
    pub fn from_model(model: &EditorModel) -> Self {
        Self {
            generation: model.generation(),
            parts: model.parts().iter().map(|p| (p.kind, p.len())).collect(),
            len: model.len(),
            auto_complete: model.auto_complete().map(|ac| ac.query().to_string()),
        }
    }

    /// Generate a diff description between two snapshots
    pub fn diff(&self, other: &ModelSnapshot) -> Option<String> {
        let mut changes = Vec::new();
        if self.parts.len() != other.parts.len() {
            changes.push(format!(
                "part count: {} → {}",
                self.parts.len(),
                other.parts.len()
            ));
        } else {
            for (i, (before, after)) in self.parts.iter().zip(&other.parts).enumerate() {
                if before != after {
                    changes.push(format!(
                        "#{}: {}({}) → {}({})",
                        i,
                        before.0.as_str(),
                        before.1,
                        after.0.as_str(),
                        after.1
                    ));
                }
            }
        }
        if self.len != other.len {
            changes.push(format!("len: {} → {}", self.len, other.len));
        }
        match (&self.auto_complete, &other.auto_complete) {
            (None, Some(query)) => changes.push(format!("autocomplete opened ({:?})", query)),
            (Some(_), None) => changes.push("autocomplete closed".to_string()),
            (Some(a), Some(b)) if a != b => {
                changes.push(format!("autocomplete query: {:?} → {:?}", a, b))
            }
            _ => {}
        }

        if changes.is_empty() {
            None
        } else {
            Some(changes.join("; "))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::editor::{DocumentOffset, PartCreator};
    use crate::messages::InputType;

    #[test]
    fn test_snapshot_diff() {
        let pc = PartCreator::new();
        let mut model = EditorModel::new(vec![pc.plain("hi")], pc);
        let before = ModelSnapshot::from_model(&model);
        assert_eq!(before.diff(&before), None);

        model
            .update("hi\nyo", InputType::InsertText, DocumentOffset::new(5, true))
            .unwrap();
        let after = ModelSnapshot::from_model(&model);
        let diff = before.diff(&after).unwrap();
        assert!(diff.contains("part count: 1 → 3"));
        assert!(diff.contains("len: 2 → 5"));
    }
}
