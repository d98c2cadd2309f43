//! Edit surface state backed by the draft store.
//!
//! # Design
//! - Opening prefers the stored draft over the server copy so unsaved work survives navigation.
//! - Every edit writes through to the draft store.
//! - The draft is cleared only after a successful publish or an explicit discard.

use std::future::Future;

use novella_api_models::EntityId;

use super::{DraftContent, DraftStorage, DraftStore};
use crate::notice::Notice;

/// Editor for a single parent entity (episode or novel).
pub struct EditorSession<'a, S> {
    store: &'a DraftStore<S>,
    parent_id: EntityId,
    baseline: DraftContent,
    content: DraftContent,
    recovered: bool,
}

impl<'a, S: DraftStorage> EditorSession<'a, S> {
    /// Open the editor, restoring a stored draft when one exists.
    #[must_use]
    pub fn open(
        store: &'a DraftStore<S>,
        parent_id: EntityId,
        server_copy: Option<DraftContent>,
    ) -> Self {
        let baseline = server_copy.unwrap_or_default();
        let (content, recovered) = store.load(parent_id).map_or_else(
            || (baseline.clone(), false),
            |record| (record.content, true),
        );
        if recovered {
            tracing::debug!(parent_id, "editor restored from draft");
        }
        Self {
            store,
            parent_id,
            baseline,
            content,
            recovered,
        }
    }

    /// Entity being edited.
    #[must_use]
    pub const fn parent_id(&self) -> EntityId {
        self.parent_id
    }

    /// Current field values.
    #[must_use]
    pub const fn content(&self) -> &DraftContent {
        &self.content
    }

    /// Whether the fields were populated from a stored draft.
    #[must_use]
    pub const fn recovered(&self) -> bool {
        self.recovered
    }

    /// Apply an edit and persist it as the draft.
    pub fn edit(&mut self, apply: impl FnOnce(&mut DraftContent)) -> Option<Notice> {
        apply(&mut self.content);
        self.store.save(self.parent_id, &self.content)
    }

    /// Run `publish` with the current content; the draft is cleared only on success.
    ///
    /// # Errors
    /// Returns whatever error `publish` produced; the draft stays in place for recovery.
    pub async fn publish<T, E, F, Fut>(&mut self, publish: F) -> Result<T, E>
    where
        F: FnOnce(DraftContent) -> Fut,
        Fut: Future<Output = Result<T, E>>,
    {
        let result = publish(self.content.clone()).await;
        if result.is_ok() {
            self.store.clear(self.parent_id);
            self.baseline = self.content.clone();
            self.recovered = false;
        } else {
            tracing::debug!(parent_id = self.parent_id, "publish failed; draft kept");
        }
        result
    }

    /// Drop the draft and return to the server copy.
    pub fn discard(&mut self) {
        self.store.clear(self.parent_id);
        self.content = self.baseline.clone();
        self.recovered = false;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::drafts::MemoryDraftStorage;

    fn server_copy() -> DraftContent {
        DraftContent {
            title: "Published title".to_string(),
            body: "Published body".to_string(),
            ..DraftContent::default()
        }
    }

    #[test]
    fn open_without_draft_uses_server_copy() {
        let store = DraftStore::new(MemoryDraftStorage::default());
        let editor = EditorSession::open(&store, 1, Some(server_copy()));
        assert!(!editor.recovered());
        assert_eq!(editor.content(), &server_copy());
    }

    #[test]
    fn discard_clears_draft_and_restores_baseline() {
        let store = DraftStore::new(MemoryDraftStorage::default());
        let mut editor = EditorSession::open(&store, 1, Some(server_copy()));
        editor.edit(|content| content.body.push_str(" and more"));
        assert!(store.load(1).is_some());
        editor.discard();
        assert!(store.load(1).is_none());
        assert_eq!(editor.content(), &server_copy());
    }
}
