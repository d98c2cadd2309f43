//! Scripted in-memory backend.
//!
//! Behaves like a healthy server by default (engagements, reports, and ban flags are kept in
//! memory) and lets tests inject failures or hold individual requests open.

use std::cell::RefCell;
use std::collections::{HashMap, HashSet, VecDeque};
use std::rc::Rc;

use async_trait::async_trait;
use novella_api_models::{
    BanToggleResponse, EngagementKind, EngagementStatus, EntityId, IdentityProfile,
    ModerationTarget, Report, ReportKind, ReportViewed,
};
use novella_core::{Backend, BackendError, BackendResult};
use tokio::sync::Notify;

/// Backend operation, used to script failures and holds.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Op {
    /// Engagement status check.
    EngagementStatus,
    /// Engagement creation.
    CreateEngagement,
    /// Engagement removal.
    RemoveEngagement,
    /// Unviewed report listing.
    UnviewedReports,
    /// Report review.
    MarkReportViewed,
    /// Ban toggle.
    ToggleBan,
    /// Identity lookup.
    CurrentIdentity,
}

/// Recorded backend call.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Call {
    /// `GET /engagements/{kind}/{id}/status`
    EngagementStatus(EngagementKind, EntityId),
    /// `POST /engagements/{kind}/{id}`
    CreateEngagement(EngagementKind, EntityId),
    /// `DELETE /engagements/{kind}/{id}`
    RemoveEngagement(EngagementKind, EntityId),
    /// `GET /reports/unviewed`
    UnviewedReports(ReportKind),
    /// `PATCH /reports/{id}/view`
    MarkReportViewed(EntityId),
    /// `PATCH /targets/{id}/ban`
    ToggleBan(ModerationTarget),
    /// `GET /identity/profile`
    CurrentIdentity,
}

impl Call {
    /// Operation the call belongs to.
    #[must_use]
    pub const fn op(&self) -> Op {
        match self {
            Self::EngagementStatus(..) => Op::EngagementStatus,
            Self::CreateEngagement(..) => Op::CreateEngagement,
            Self::RemoveEngagement(..) => Op::RemoveEngagement,
            Self::UnviewedReports(_) => Op::UnviewedReports,
            Self::MarkReportViewed(_) => Op::MarkReportViewed,
            Self::ToggleBan(_) => Op::ToggleBan,
            Self::CurrentIdentity => Op::CurrentIdentity,
        }
    }

    /// Whether the call mutates server state.
    #[must_use]
    pub const fn is_mutation(&self) -> bool {
        matches!(
            self,
            Self::CreateEngagement(..)
                | Self::RemoveEngagement(..)
                | Self::MarkReportViewed(_)
                | Self::ToggleBan(_)
        )
    }
}

/// Handle releasing a held request.
#[derive(Clone, Debug)]
pub struct Gate(Rc<Notify>);

impl Gate {
    /// Let the held request proceed.
    pub fn release(&self) {
        self.0.notify_one();
    }
}

/// In-memory backend with scripted failures.
#[derive(Debug, Default)]
pub struct ScriptedBackend {
    viewer: RefCell<Option<IdentityProfile>>,
    engagements: RefCell<HashSet<(EngagementKind, EntityId)>>,
    reports: RefCell<Vec<Report>>,
    bans: RefCell<HashMap<ModerationTarget, bool>>,
    failures: RefCell<HashMap<Op, VecDeque<BackendError>>>,
    holds: RefCell<HashMap<Op, VecDeque<Rc<Notify>>>>,
    calls: RefCell<Vec<Call>>,
}

impl ScriptedBackend {
    /// Backend whose identity endpoint answers 401.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Backend with a signed-in viewer.
    #[must_use]
    pub fn with_viewer(profile: IdentityProfile) -> Self {
        let backend = Self::default();
        backend.set_viewer(Some(profile));
        backend
    }

    /// Replace the session (`None` signs out).
    pub fn set_viewer(&self, profile: Option<IdentityProfile>) {
        self.viewer.replace(profile);
    }

    /// Seed a server-side engagement relation.
    pub fn seed_engagement(&self, kind: EngagementKind, target_id: EntityId, present: bool) {
        let mut engagements = self.engagements.borrow_mut();
        if present {
            engagements.insert((kind, target_id));
        } else {
            engagements.remove(&(kind, target_id));
        }
    }

    /// Server-side engagement relation.
    #[must_use]
    pub fn has_engagement(&self, kind: EngagementKind, target_id: EntityId) -> bool {
        self.engagements.borrow().contains(&(kind, target_id))
    }

    /// Seed the report table.
    pub fn seed_reports(&self, reports: Vec<Report>) {
        self.reports.replace(reports);
    }

    /// Server-side view flag of a report.
    #[must_use]
    pub fn report_viewed(&self, report_id: EntityId) -> Option<bool> {
        self.reports
            .borrow()
            .iter()
            .find(|report| report.report_id == report_id)
            .map(|report| report.viewed)
    }

    /// Seed a server-side ban flag.
    pub fn seed_ban(&self, target: ModerationTarget, banned: bool) {
        self.bans.borrow_mut().insert(target, banned);
    }

    /// Server-side ban flag.
    #[must_use]
    pub fn banned(&self, target: ModerationTarget) -> bool {
        self.bans.borrow().get(&target).copied().unwrap_or(false)
    }

    /// Fail the next call of `op` with `error`.
    pub fn fail_next(&self, op: Op, error: BackendError) {
        self.failures
            .borrow_mut()
            .entry(op)
            .or_default()
            .push_back(error);
    }

    /// Hold the next call of `op` until the returned gate is released.
    #[must_use]
    pub fn hold(&self, op: Op) -> Gate {
        let notify = Rc::new(Notify::new());
        self.holds
            .borrow_mut()
            .entry(op)
            .or_default()
            .push_back(Rc::clone(&notify));
        Gate(notify)
    }

    /// Every call received so far.
    #[must_use]
    pub fn calls(&self) -> Vec<Call> {
        self.calls.borrow().clone()
    }

    /// Number of calls received for `op`.
    #[must_use]
    pub fn count(&self, op: Op) -> usize {
        self.calls
            .borrow()
            .iter()
            .filter(|call| call.op() == op)
            .count()
    }

    async fn enter(&self, call: Call) -> BackendResult<()> {
        let op = call.op();
        self.calls.borrow_mut().push(call);
        let hold = self
            .holds
            .borrow_mut()
            .get_mut(&op)
            .and_then(VecDeque::pop_front);
        if let Some(notify) = hold {
            notify.notified().await;
        }
        let failure = self
            .failures
            .borrow_mut()
            .get_mut(&op)
            .and_then(VecDeque::pop_front);
        failure.map_or(Ok(()), Err)
    }

    fn require_viewer(&self) -> BackendResult<IdentityProfile> {
        self.viewer
            .borrow()
            .clone()
            .ok_or_else(|| BackendError::status(401))
    }

    fn require_admin(&self) -> BackendResult<()> {
        if self.require_viewer()?.role.is_admin() {
            Ok(())
        } else {
            Err(BackendError::status_with(403, "admin role required"))
        }
    }
}

#[async_trait(?Send)]
impl Backend for ScriptedBackend {
    async fn engagement_status(
        &self,
        kind: EngagementKind,
        target_id: EntityId,
    ) -> BackendResult<EngagementStatus> {
        self.enter(Call::EngagementStatus(kind, target_id)).await?;
        self.require_viewer()?;
        Ok(EngagementStatus {
            present: self.has_engagement(kind, target_id),
        })
    }

    async fn create_engagement(
        &self,
        kind: EngagementKind,
        target_id: EntityId,
    ) -> BackendResult<()> {
        self.enter(Call::CreateEngagement(kind, target_id)).await?;
        self.require_viewer()?;
        self.seed_engagement(kind, target_id, true);
        Ok(())
    }

    async fn remove_engagement(
        &self,
        kind: EngagementKind,
        target_id: EntityId,
    ) -> BackendResult<()> {
        self.enter(Call::RemoveEngagement(kind, target_id)).await?;
        self.require_viewer()?;
        self.seed_engagement(kind, target_id, false);
        Ok(())
    }

    async fn unviewed_reports(&self, kind: ReportKind) -> BackendResult<Vec<Report>> {
        self.enter(Call::UnviewedReports(kind)).await?;
        self.require_admin()?;
        Ok(self
            .reports
            .borrow()
            .iter()
            .filter(|report| report.target_kind == kind && !report.viewed)
            .cloned()
            .collect())
    }

    async fn mark_report_viewed(&self, report_id: EntityId) -> BackendResult<ReportViewed> {
        self.enter(Call::MarkReportViewed(report_id)).await?;
        self.require_admin()?;
        let mut reports = self.reports.borrow_mut();
        let report = reports
            .iter_mut()
            .find(|report| report.report_id == report_id)
            .ok_or_else(|| BackendError::status_with(404, "report not found"))?;
        report.viewed = true;
        Ok(ReportViewed { viewed: true })
    }

    async fn toggle_ban(&self, target: ModerationTarget) -> BackendResult<BanToggleResponse> {
        self.enter(Call::ToggleBan(target)).await?;
        self.require_admin()?;
        let banned = !self.banned(target);
        self.seed_ban(target, banned);
        let message = if banned {
            format!("{} {} has been banned.", target.kind, target.id)
        } else {
            format!("{} {} has been unbanned.", target.kind, target.id)
        };
        Ok(BanToggleResponse { banned, message })
    }

    async fn current_identity(&self) -> BackendResult<IdentityProfile> {
        self.enter(Call::CurrentIdentity).await?;
        self.require_viewer()
    }
}
