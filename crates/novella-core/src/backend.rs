//! Backend collaborator seam.
//!
//! # Design
//! - One method per backend route the consistency layer consumes.
//! - Futures are not `Send`: the layer runs on a single-threaded event loop.
//! - Implementations report raw failures; policy (revert, redirect, demote) lives in the core.

use async_trait::async_trait;
use novella_api_models::{
    BanToggleResponse, EngagementKind, EngagementStatus, EntityId, IdentityProfile,
    ModerationTarget, Report, ReportKind, ReportViewed,
};

use crate::error::BackendResult;

/// HTTP backend as seen by the consistency layer.
#[async_trait(?Send)]
pub trait Backend {
    /// `GET /engagements/{kind}/{targetId}/status`
    async fn engagement_status(
        &self,
        kind: EngagementKind,
        target_id: EntityId,
    ) -> BackendResult<EngagementStatus>;

    /// `POST /engagements/{kind}/{targetId}`
    async fn create_engagement(&self, kind: EngagementKind, target_id: EntityId)
    -> BackendResult<()>;

    /// `DELETE /engagements/{kind}/{targetId}`
    async fn remove_engagement(&self, kind: EngagementKind, target_id: EntityId)
    -> BackendResult<()>;

    /// `GET /reports/unviewed?kind={kind}`
    async fn unviewed_reports(&self, kind: ReportKind) -> BackendResult<Vec<Report>>;

    /// `PATCH /reports/{id}/view`
    async fn mark_report_viewed(&self, report_id: EntityId) -> BackendResult<ReportViewed>;

    /// `PATCH /targets/{id}/ban?kind={kind}`
    async fn toggle_ban(&self, target: ModerationTarget) -> BackendResult<BanToggleResponse>;

    /// `GET /identity/profile`
    async fn current_identity(&self) -> BackendResult<IdentityProfile>;
}
