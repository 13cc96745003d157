//! Messages sent from a room's composer, browsed with Alt+Up/Down
//!
//! Kept apart from the undo history. Each entry is stored under
//! `<prefix><room id>[<n>]` as a JSON array of serialized parts.

use std::rc::Rc;

use crate::editor::SerializedPart;
use crate::storage::{Storage, StorageError};

pub const SEND_HISTORY_PREFIX: &str = "mx_cider_composer_history_";

pub struct SendHistory {
    storage: Rc<dyn Storage>,
    prefix: String,
    history: Vec<Vec<SerializedPart>>,
    /// `history.len()` while composing a new message
    current_index: usize,
}

impl SendHistory {
    /// Load the stored history for `room_id`. Loading stops at the first
    /// missing or unreadable entry; the next save overwrites it.
    pub fn load(storage: Rc<dyn Storage>, room_id: &str) -> Self {
        let prefix = format!("{}{}", SEND_HISTORY_PREFIX, room_id);
        let mut history = Vec::new();
        loop {
            let key = Self::key(&prefix, history.len());
            let json = match storage.get(&key) {
                Ok(Some(json)) => json,
                Ok(None) => break,
                Err(e) => {
                    tracing::warn!(key = %key, error = %e, "failed to read send history");
                    break;
                }
            };
            match serde_json::from_str::<Vec<SerializedPart>>(&json) {
                Ok(parts) => history.push(parts),
                Err(e) => {
                    tracing::warn!(key = %key, error = %e, "throwing away unserialisable history");
                    break;
                }
            }
        }
        tracing::debug!(room_id, entries = history.len(), "loaded send history");
        let current_index = history.len();
        Self {
            storage,
            prefix,
            history,
            current_index,
        }
    }

    fn key(prefix: &str, index: usize) -> String {
        format!("{}[{}]", prefix, index)
    }

    pub fn len(&self) -> usize {
        self.history.len()
    }

    pub fn is_empty(&self) -> bool {
        self.history.is_empty()
    }

    pub fn current_index(&self) -> usize {
        self.current_index
    }

    /// Whether an entry (rather than the message being composed) is shown
    pub fn is_browsing(&self) -> bool {
        self.current_index < self.history.len()
    }

    /// Back to composing a new message
    pub fn reset_index(&mut self) {
        self.current_index = self.history.len();
    }

    /// Record a sent message. The entry is kept in memory even when
    /// persisting it fails.
    pub fn save(&mut self, parts: Vec<SerializedPart>) -> Result<(), StorageError> {
        let json = serde_json::to_string(&parts)?;
        let key = Self::key(&self.prefix, self.history.len());
        self.history.push(parts);
        self.current_index = self.history.len();
        self.storage.set(&key, &json)
    }

    /// Move `delta` entries (negative is older) and return the entry there.
    /// The index is clamped to the stored entries.
    pub fn get_item(&mut self, delta: isize) -> Option<&[SerializedPart]> {
        let last = self.history.len().checked_sub(1)?;
        let index = self.current_index.saturating_add_signed(delta).min(last);
        self.current_index = index;
        self.history.get(index).map(Vec::as_slice)
    }
}
