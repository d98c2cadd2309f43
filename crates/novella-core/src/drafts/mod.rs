//! Session-scoped drafts of in-progress edits.
//!
//! # Design
//! - One draft per parent id, stored under `draft:{parent_id}`; writes overwrite.
//! - Storage failures degrade to "drafts don't persist"; no call here fails the caller.
//! - Unreadable records are treated as absent and removed.
//! - Last writer wins; concurrent tabs on the same key are not coordinated.

pub mod editor;
#[cfg(target_arch = "wasm32")]
pub mod session_storage;
pub mod storage;

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use novella_api_models::EntityId;
use serde::{Deserialize, Serialize};

use crate::error::StorageError;
use crate::notice::Notice;

pub use editor::EditorSession;
pub use storage::{DirectoryDraftStorage, MemoryDraftStorage};

const DRAFT_KEY_PREFIX: &str = "draft:";
const NOT_PERSISTED_MESSAGE: &str = "Your draft could not be saved on this device.";

/// Key-value backend holding serialized drafts.
pub trait DraftStorage {
    /// Read the raw value stored under `key`.
    ///
    /// # Errors
    /// Returns an error when the store cannot be read.
    fn get(&self, key: &str) -> Result<Option<String>, StorageError>;

    /// Store `value` under `key`, replacing any previous value.
    ///
    /// # Errors
    /// Returns an error when the store rejects the write.
    fn set(&self, key: &str, value: &str) -> Result<(), StorageError>;

    /// Remove `key`; removing a missing key succeeds.
    ///
    /// # Errors
    /// Returns an error when the store cannot be modified.
    fn remove(&self, key: &str) -> Result<(), StorageError>;
}

/// Editable fields captured by a draft.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DraftContent {
    /// Title field.
    pub title: String,
    /// Body text.
    pub body: String,
    /// Auxiliary toggles (visibility, comments enabled, ...).
    #[serde(default)]
    pub aux_flags: BTreeMap<String, bool>,
}

/// Persisted draft with its owner and timestamp.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DraftRecord {
    /// Entity the draft belongs to.
    pub parent_id: EntityId,
    /// Draft fields.
    #[serde(flatten)]
    pub content: DraftContent,
    /// When the draft was written.
    pub saved_at: DateTime<Utc>,
}

/// Storage key for a parent's draft.
#[must_use]
pub fn draft_key(parent_id: EntityId) -> String {
    format!("{DRAFT_KEY_PREFIX}{parent_id}")
}

/// Draft store over a session-scoped key-value backend.
pub struct DraftStore<S> {
    storage: S,
}

impl<S: DraftStorage> DraftStore<S> {
    /// Wrap a storage backend.
    #[must_use]
    pub const fn new(storage: S) -> Self {
        Self { storage }
    }

    /// Underlying storage backend.
    #[must_use]
    pub const fn storage(&self) -> &S {
        &self.storage
    }

    /// Save `content` as the draft for `parent_id`.
    ///
    /// Returns a non-blocking notice when the draft could not be persisted.
    pub fn save(&self, parent_id: EntityId, content: &DraftContent) -> Option<Notice> {
        let record = DraftRecord {
            parent_id,
            content: content.clone(),
            saved_at: Utc::now(),
        };
        let key = draft_key(parent_id);
        let result = serde_json::to_string(&record)
            .map_err(|source| StorageError::Serialize { source })
            .and_then(|value| self.storage.set(&key, &value));
        match result {
            Ok(()) => None,
            Err(err) => {
                tracing::warn!(key = %key, error = %err, "draft not persisted");
                Some(Notice::warning(NOT_PERSISTED_MESSAGE))
            }
        }
    }

    /// Last saved draft for `parent_id`, if any.
    #[must_use]
    pub fn load(&self, parent_id: EntityId) -> Option<DraftRecord> {
        let key = draft_key(parent_id);
        let raw = match self.storage.get(&key) {
            Ok(raw) => raw?,
            Err(err) => {
                tracing::debug!(key = %key, error = %err, "draft storage unreadable");
                return None;
            }
        };
        match serde_json::from_str::<DraftRecord>(&raw) {
            Ok(record) if record.parent_id == parent_id => Some(record),
            Ok(record) => {
                tracing::warn!(key = %key, stored_parent = record.parent_id, "draft owner mismatch; clearing");
                self.clear(parent_id);
                None
            }
            Err(err) => {
                tracing::warn!(key = %key, error = %err, "corrupt draft; clearing");
                self.clear(parent_id);
                None
            }
        }
    }

    /// Remove the draft for `parent_id`.
    pub fn clear(&self, parent_id: EntityId) {
        let key = draft_key(parent_id);
        if let Err(err) = self.storage.remove(&key) {
            tracing::debug!(key = %key, error = %err, "draft removal failed");
        }
    }
}
