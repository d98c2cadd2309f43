//! Page-level context bundling the shared backend and controllers.
//!
//! # Design
//! - Create exactly one context per page lifecycle.
//! - Controllers share one identity context so a demotion is seen everywhere.

use std::rc::Rc;

use crate::backend::Backend;
use crate::engagement::EngagementController;
use crate::identity::IdentityContext;
use crate::moderation::ModerationDesk;

/// Shared controllers for one page lifecycle.
pub struct CoreContext<B> {
    /// Memoized viewer.
    pub identity: Rc<IdentityContext<B>>,
    /// Bookmark and like toggles.
    pub engagement: EngagementController<B>,
    /// Report review and bans.
    pub moderation: ModerationDesk<B>,
}

impl<B: Backend> CoreContext<B> {
    /// Wire the controllers over a single backend.
    #[must_use]
    pub fn new(backend: Rc<B>) -> Self {
        let identity = Rc::new(IdentityContext::new(Rc::clone(&backend)));
        Self {
            engagement: EngagementController::new(Rc::clone(&backend), Rc::clone(&identity)),
            moderation: ModerationDesk::new(backend, Rc::clone(&identity)),
            identity,
        }
    }
}
