//! Browser `sessionStorage` backend.
//!
//! A missing window or a disabled store (privacy mode) reports `Unavailable` instead of panicking.

use web_sys::Storage;

use super::DraftStorage;
use crate::error::StorageError;

/// Drafts kept in the tab's `sessionStorage`.
#[derive(Debug, Default, Clone, Copy)]
pub struct SessionDraftStorage;

impl SessionDraftStorage {
    fn storage() -> Result<Storage, StorageError> {
        let window = web_sys::window().ok_or_else(|| StorageError::Unavailable {
            detail: "no window".to_string(),
        })?;
        window
            .session_storage()
            .map_err(|err| StorageError::Unavailable {
                detail: format!("{err:?}"),
            })?
            .ok_or_else(|| StorageError::Unavailable {
                detail: "sessionStorage disabled".to_string(),
            })
    }
}

impl DraftStorage for SessionDraftStorage {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        Self::storage()?
            .get_item(key)
            .map_err(|err| StorageError::Unavailable {
                detail: format!("{err:?}"),
            })
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StorageError> {
        Self::storage()?
            .set_item(key, value)
            .map_err(|err| StorageError::WriteRejected {
                key: key.to_string(),
                detail: format!("{err:?}"),
            })
    }

    fn remove(&self, key: &str) -> Result<(), StorageError> {
        Self::storage()?
            .remove_item(key)
            .map_err(|err| StorageError::Unavailable {
                detail: format!("{err:?}"),
            })
    }
}
