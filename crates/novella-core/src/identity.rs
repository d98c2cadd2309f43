//! Identity context for the current viewer.
//!
//! # Design
//! - Fetch the viewer lazily, at most once per page lifecycle; concurrent first callers share one request.
//! - Any failure to fetch resolves to `Anonymous`.
//! - Role checks here are a UX gate only; a 401/403 from the backend always wins.

use std::cell::RefCell;
use std::rc::Rc;

use novella_api_models::{EntityId, IdentityProfile, Role};
use tokio::sync::OnceCell;

use crate::backend::Backend;
use crate::error::BackendError;

/// Snapshot of an authenticated viewer.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Identity {
    /// Stable user id.
    pub id: EntityId,
    /// Display name, for rendering only.
    pub display_name: String,
    /// Granted role.
    pub role: Role,
}

impl From<IdentityProfile> for Identity {
    fn from(profile: IdentityProfile) -> Self {
        Self {
            id: profile.id,
            display_name: profile.display_name,
            role: profile.role,
        }
    }
}

/// Current viewer: authenticated or anonymous.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Viewer {
    /// Signed-in viewer.
    Known(Identity),
    /// No session, or the session could not be confirmed.
    Anonymous,
}

impl Viewer {
    /// Identity snapshot, when signed in.
    #[must_use]
    pub const fn identity(&self) -> Option<&Identity> {
        match self {
            Self::Known(identity) => Some(identity),
            Self::Anonymous => None,
        }
    }

    /// Stable id of the viewer, when signed in.
    #[must_use]
    pub const fn id(&self) -> Option<EntityId> {
        match self {
            Self::Known(identity) => Some(identity.id),
            Self::Anonymous => None,
        }
    }

    /// Whether the viewer is signed in.
    #[must_use]
    pub const fn is_authenticated(&self) -> bool {
        matches!(self, Self::Known(_))
    }

    /// Whether the viewer holds the admin role.
    #[must_use]
    pub const fn is_admin(&self) -> bool {
        match self {
            Self::Known(identity) => identity.role.is_admin(),
            Self::Anonymous => false,
        }
    }

    /// Whether the viewer authored the entity owned by `author_id`.
    ///
    /// Compares stable ids; display names are mutable and not unique.
    #[must_use]
    pub fn is_author_of(&self, author_id: EntityId) -> bool {
        self.id() == Some(author_id)
    }
}

/// Memoized viewer lookup shared by the engagement and moderation layers.
pub struct IdentityContext<B> {
    backend: Rc<B>,
    cell: RefCell<Rc<OnceCell<Viewer>>>,
}

impl<B: Backend> IdentityContext<B> {
    /// Create an empty context; nothing is fetched until first use.
    #[must_use]
    pub fn new(backend: Rc<B>) -> Self {
        Self {
            backend,
            cell: RefCell::new(Rc::new(OnceCell::new())),
        }
    }

    /// Current viewer, fetching it on first use.
    pub async fn current(&self) -> Viewer {
        let cell = Rc::clone(&self.cell.borrow());
        cell.get_or_init(|| fetch_viewer(self.backend.as_ref()))
            .await
            .clone()
    }

    /// Drop the memo and fetch the viewer again (after login or logout).
    pub async fn refresh(&self) -> Viewer {
        self.cell.replace(Rc::new(OnceCell::new()));
        self.current().await
    }

    /// Pin the viewer to anonymous without a network call.
    pub fn logout(&self) {
        self.cell
            .replace(Rc::new(OnceCell::new_with(Some(Viewer::Anonymous))));
    }

    /// Viewer already resolved in this lifecycle, if any.
    #[must_use]
    pub fn cached(&self) -> Option<Viewer> {
        self.cell.borrow().get().cloned()
    }

    /// Treat a 401 from any downstream call as the end of the session.
    ///
    /// Returns `true` when the viewer was demoted.
    pub fn demote_on(&self, error: &BackendError) -> bool {
        if error.is_unauthorized() {
            tracing::debug!("backend rejected session; viewer demoted to anonymous");
            self.logout();
            return true;
        }
        false
    }
}

async fn fetch_viewer<B: Backend + ?Sized>(backend: &B) -> Viewer {
    match backend.current_identity().await {
        Ok(profile) => {
            tracing::debug!(viewer_id = profile.id, role = %profile.role, "viewer resolved");
            Viewer::Known(profile.into())
        }
        Err(err) => {
            tracing::debug!(error = %err, status = ?err.status_code(), "identity lookup failed; treating viewer as anonymous");
            Viewer::Anonymous
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{Identity, Viewer};
    use novella_api_models::Role;

    fn viewer(id: i64, role: Role) -> Viewer {
        Viewer::Known(Identity {
            id,
            display_name: "shared-name".to_string(),
            role,
        })
    }

    #[test]
    fn anonymous_has_no_authority() {
        assert!(!Viewer::Anonymous.is_authenticated());
        assert!(!Viewer::Anonymous.is_admin());
        assert!(!Viewer::Anonymous.is_author_of(1));
        assert_eq!(Viewer::Anonymous.id(), None);
    }

    #[test]
    fn authorship_compares_ids_not_names() {
        let first = viewer(1, Role::Reader);
        assert!(first.is_author_of(1));
        assert!(!first.is_author_of(2));
    }

    #[test]
    fn only_admin_role_is_admin() {
        assert!(viewer(1, Role::Admin).is_admin());
        assert!(!viewer(1, Role::AuthorSupport).is_admin());
        assert!(!viewer(1, Role::Reader).is_admin());
    }
}
