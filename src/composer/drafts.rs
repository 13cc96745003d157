//! Unsent message drafts, one per room

use std::rc::Rc;

use crate::editor::{parse_serialized_parts, EditorModel, Part, PartCreator};
use crate::storage::{Storage, StorageError};

pub const DRAFT_KEY_PREFIX: &str = "cider_editor_state_";

pub struct DraftStore {
    storage: Rc<dyn Storage>,
    key: String,
}

impl DraftStore {
    pub fn new(storage: Rc<dyn Storage>, room_id: &str) -> Self {
        Self {
            storage,
            key: format!("{}{}", DRAFT_KEY_PREFIX, room_id),
        }
    }

    pub fn key(&self) -> &str {
        &self.key
    }

    /// The stored draft, or `None` when there is none or it cannot be read
    pub fn restore(&self, pc: &PartCreator) -> Option<Vec<Part>> {
        let json = match self.storage.get(&self.key) {
            Ok(json) => json?,
            Err(e) => {
                tracing::warn!(key = %self.key, error = %e, "failed to read draft");
                return None;
            }
        };
        match parse_serialized_parts(&json, pc) {
            Ok(parts) => {
                tracing::debug!(key = %self.key, parts = parts.len(), "restored draft");
                Some(parts)
            }
            Err(e) => {
                tracing::warn!(key = %self.key, error = %e, "ignoring unreadable draft");
                None
            }
        }
    }

    /// Store the model's content; an empty model removes the draft
    pub fn save(&self, model: &EditorModel) {
        if model.is_empty() {
            self.clear();
            return;
        }
        let result = serde_json::to_string(&model.serialize_parts())
            .map_err(StorageError::from)
            .and_then(|json| self.storage.set(&self.key, &json));
        if let Err(e) = result {
            tracing::warn!(key = %self.key, error = %e, "failed to save draft");
        }
    }

    pub fn clear(&self) {
        if let Err(e) = self.storage.remove(&self.key) {
            tracing::warn!(key = %self.key, error = %e, "failed to remove draft");
        }
    }
}
