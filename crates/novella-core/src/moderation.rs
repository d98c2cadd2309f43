//! Report review and ban workflow for the admin console.
//!
//! # Design
//! - Reports move one way: unviewed to viewed. Marking removes the report optimistically
//!   and restores it at its original position if the server does not confirm.
//! - Ban state is whatever the server last returned; the client never negates its own guess.
//! - Authorization failures abort the operation and are never retried.

use std::cell::{Cell, RefCell};
use std::collections::HashMap;
use std::rc::Rc;

use novella_api_models::{EntityId, ModerationTarget, Report, ReportKind};

use crate::backend::Backend;
use crate::error::BackendError;
use crate::identity::{IdentityContext, Viewer};
use crate::notice::{Navigation, Notice};

const ADMIN_ONLY_MESSAGE: &str = "Only administrators can moderate content.";
const UNCONFIRMED_REVIEW_MESSAGE: &str = "The report could not be marked as reviewed.";

/// Result of loading the unviewed report queue.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ReportListOutcome {
    /// Reports awaiting review, in server order.
    Loaded(Vec<Report>),
    /// The page must navigate away without rendering report data.
    Redirect(Navigation),
    /// The request failed; the previous queue is left as it was.
    Failed(Notice),
}

/// Result of marking a report as viewed.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ReviewOutcome {
    /// The server confirmed the review; the report left the queue.
    Confirmed,
    /// The server did not confirm; the report is back in the queue.
    Restored(Notice),
    /// Rejected before any network call.
    Refused(Notice),
}

/// Result of a ban toggle.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum BanOutcome {
    /// The server applied the toggle.
    Applied {
        /// Ban flag returned by the server.
        banned: bool,
        /// Server status text, shown verbatim.
        message: String,
    },
    /// The request failed; the recorded ban state is unchanged.
    Failed(Notice),
    /// Rejected before any network call.
    Refused(Notice),
}

#[derive(Clone, Debug)]
struct QueuedReport {
    ordinal: u64,
    report: Report,
}

/// Admin-side moderation state: unviewed queues per report kind plus known ban flags.
pub struct ModerationDesk<B> {
    backend: Rc<B>,
    identity: Rc<IdentityContext<B>>,
    queues: RefCell<HashMap<ReportKind, Vec<QueuedReport>>>,
    bans: RefCell<HashMap<ModerationTarget, bool>>,
    ordinal: Cell<u64>,
}

impl<B: Backend> ModerationDesk<B> {
    /// Build a desk over the shared backend and identity context.
    #[must_use]
    pub fn new(backend: Rc<B>, identity: Rc<IdentityContext<B>>) -> Self {
        Self {
            backend,
            identity,
            queues: RefCell::new(HashMap::new()),
            bans: RefCell::new(HashMap::new()),
            ordinal: Cell::new(0),
        }
    }

    /// Reports of `kind` currently awaiting review.
    #[must_use]
    pub fn unviewed(&self, kind: ReportKind) -> Vec<Report> {
        self.queues
            .borrow()
            .get(&kind)
            .map(|queue| queue.iter().map(|entry| entry.report.clone()).collect())
            .unwrap_or_default()
    }

    /// Last ban flag the server reported for `target`.
    #[must_use]
    pub fn ban_state(&self, target: ModerationTarget) -> Option<bool> {
        self.bans.borrow().get(&target).copied()
    }

    /// Record a ban flag read from server data (for example, a profile page).
    pub fn record_ban_state(&self, target: ModerationTarget, banned: bool) {
        self.bans.borrow_mut().insert(target, banned);
    }

    /// Load the review queue for `kind`.
    ///
    /// 401 navigates to the login page and 403 to the non-admin landing page; in both cases
    /// the queue is cleared so no report data is rendered.
    pub async fn list_unviewed_reports(&self, kind: ReportKind) -> ReportListOutcome {
        let viewer = self.identity.current().await;
        if let Some(navigation) = gate_navigation(&viewer) {
            self.queues.borrow_mut().remove(&kind);
            return ReportListOutcome::Redirect(navigation);
        }

        match self.backend.unviewed_reports(kind).await {
            Ok(reports) => {
                let queue: Vec<QueuedReport> = reports
                    .into_iter()
                    .filter(|report| !report.viewed)
                    .map(|report| QueuedReport {
                        ordinal: self.next_ordinal(),
                        report,
                    })
                    .collect();
                let loaded = queue.iter().map(|entry| entry.report.clone()).collect();
                tracing::debug!(kind = %kind, count = queue.len(), "unviewed reports loaded");
                self.queues.borrow_mut().insert(kind, queue);
                ReportListOutcome::Loaded(loaded)
            }
            Err(err) => {
                if let Some(navigation) = auth_navigation(&err) {
                    tracing::warn!(kind = %kind, status = ?err.status_code(), "report queue access denied");
                    self.identity.demote_on(&err);
                    self.queues.borrow_mut().remove(&kind);
                    return ReportListOutcome::Redirect(navigation);
                }
                tracing::warn!(kind = %kind, error = %err, "report queue load failed");
                ReportListOutcome::Failed(Notice::error(err.user_message()))
            }
        }
    }

    /// Mark a report as reviewed.
    pub async fn mark_viewed(&self, report_id: EntityId) -> ReviewOutcome {
        if !self.identity.current().await.is_admin() {
            return ReviewOutcome::Refused(Notice::warning(ADMIN_ONLY_MESSAGE));
        }

        let removed = self.take_report(report_id);
        let failure = match self.backend.mark_report_viewed(report_id).await {
            Ok(ack) if ack.viewed => {
                tracing::debug!(report_id, "report marked viewed");
                self.drop_report(report_id);
                return ReviewOutcome::Confirmed;
            }
            Ok(_) => Notice::error(UNCONFIRMED_REVIEW_MESSAGE),
            Err(err) => {
                self.identity.demote_on(&err);
                Notice::error(err.user_message())
            }
        };

        tracing::warn!(report_id, message = %failure.message, "report review not confirmed; restoring");
        if let Some((kind, entry)) = removed {
            self.restore_report(kind, entry);
        }
        ReviewOutcome::Restored(failure)
    }

    /// Toggle the ban flag of a novel or user.
    ///
    /// The resulting state is read from the server response only.
    pub async fn toggle_ban(&self, target: ModerationTarget) -> BanOutcome {
        if !self.identity.current().await.is_admin() {
            return BanOutcome::Refused(Notice::warning(ADMIN_ONLY_MESSAGE));
        }

        match self.backend.toggle_ban(target).await {
            Ok(response) => {
                tracing::debug!(kind = %target.kind, id = target.id, banned = response.banned, "ban toggled");
                self.bans.borrow_mut().insert(target, response.banned);
                BanOutcome::Applied {
                    banned: response.banned,
                    message: response.message,
                }
            }
            Err(err) => {
                tracing::warn!(kind = %target.kind, id = target.id, error = %err, status = ?err.status_code(), "ban toggle failed");
                self.identity.demote_on(&err);
                BanOutcome::Failed(Notice::error(err.user_message()))
            }
        }
    }

    fn next_ordinal(&self) -> u64 {
        let next = self.ordinal.get() + 1;
        self.ordinal.set(next);
        next
    }

    fn take_report(&self, report_id: EntityId) -> Option<(ReportKind, QueuedReport)> {
        let mut queues = self.queues.borrow_mut();
        queues.iter_mut().find_map(|(kind, queue)| {
            let index = queue
                .iter()
                .position(|entry| entry.report.report_id == report_id)?;
            Some((*kind, queue.remove(index)))
        })
    }

    /// Remove a reviewed report again in case a reload brought it back mid-flight.
    fn drop_report(&self, report_id: EntityId) {
        for queue in self.queues.borrow_mut().values_mut() {
            queue.retain(|entry| entry.report.report_id != report_id);
        }
    }

    fn restore_report(&self, kind: ReportKind, entry: QueuedReport) {
        let mut queues = self.queues.borrow_mut();
        let queue = queues.entry(kind).or_default();
        if queue
            .iter()
            .any(|queued| queued.report.report_id == entry.report.report_id)
        {
            return;
        }
        let index = queue.partition_point(|queued| queued.ordinal < entry.ordinal);
        queue.insert(index, entry);
    }
}

const fn gate_navigation(viewer: &Viewer) -> Option<Navigation> {
    if !viewer.is_authenticated() {
        Some(Navigation::Login)
    } else if !viewer.is_admin() {
        Some(Navigation::Home)
    } else {
        None
    }
}

const fn auth_navigation(err: &BackendError) -> Option<Navigation> {
    if err.is_unauthorized() {
        Some(Navigation::Login)
    } else if err.is_forbidden() {
        Some(Navigation::Home)
    } else {
        None
    }
}
