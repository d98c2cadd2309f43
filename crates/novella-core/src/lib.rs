#![forbid(unsafe_code)]
#![deny(
    warnings,
    dead_code,
    unused,
    unused_imports,
    unused_must_use,
    unreachable_pub,
    clippy::all,
    clippy::pedantic,
    clippy::nursery,
    rustdoc::broken_intra_doc_links,
    rustdoc::bare_urls,
    missing_docs
)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::future_not_send)]
//! Client-side consistency layer for the Novella reader and admin console.
//!
//! Layout:
//! - `identity.rs`: memoized viewer snapshot used for self-action and admin gating
//! - `engagement.rs`: optimistic bookmark/like toggles with per-target serialization
//! - `moderation.rs`: report review queue and ban toggles
//! - `drafts/`: session-scoped draft store and the editor session built on it
//! - `backend.rs`: the HTTP backend seam; `context.rs` wires one page's controllers
//!
//! Everything here is DOM-free and transport-free; the `novella-client` crate provides the
//! HTTP backend.

pub mod backend;
pub mod context;
pub mod drafts;
pub mod engagement;
pub mod error;
pub mod identity;
pub mod moderation;
pub mod notice;

pub use backend::Backend;
pub use context::CoreContext;
pub use drafts::{DraftContent, DraftRecord, DraftStorage, DraftStore, EditorSession};
pub use engagement::{
    EngagementController, EngagementState, EngagementTarget, Presence, Refusal, ToggleOutcome,
};
pub use error::{BackendError, BackendResult, StorageError};
pub use identity::{Identity, IdentityContext, Viewer};
pub use moderation::{BanOutcome, ModerationDesk, ReportListOutcome, ReviewOutcome};
pub use notice::{Navigation, Notice, NoticeLevel};
