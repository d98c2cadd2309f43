//! Optimistic bookmark/like toggles.
//!
//! # Design
//! - One slot per `(target, kind)`; a slot holds at most one in-flight toggle.
//! - Toggles flip the visible state before the request and revert it on failure.
//! - Every request carries a sequence number; responses older than the last applied one are dropped.
//! - Detaching a slot discards whatever is still in flight for it, but the key stays locked
//!   until that request settles.
//! - An unknown state is read from the server before toggling; if that read fails nothing is sent.

use std::cell::{Cell, RefCell};
use std::collections::HashMap;
use std::rc::Rc;

use novella_api_models::{EngagementKind, EntityId};

use crate::backend::Backend;
use crate::error::BackendError;
use crate::identity::IdentityContext;
use crate::notice::Notice;

/// Settled presence of an engagement relation.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Presence {
    /// No relation.
    Absent,
    /// Relation exists.
    Present,
}

impl Presence {
    /// Presence from a boolean flag.
    #[must_use]
    pub const fn from_flag(present: bool) -> Self {
        if present { Self::Present } else { Self::Absent }
    }

    /// The opposite presence.
    #[must_use]
    pub const fn flipped(self) -> Self {
        match self {
            Self::Absent => Self::Present,
            Self::Present => Self::Absent,
        }
    }

    /// Whether the relation exists.
    #[must_use]
    pub const fn is_present(self) -> bool {
        matches!(self, Self::Present)
    }
}

/// Observable state of a toggle control.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum EngagementState {
    /// Not fetched yet.
    Unknown,
    /// Known (or optimistically assumed) presence.
    Known(Presence),
}

impl EngagementState {
    /// Presence for rendering; unknown renders as absent.
    #[must_use]
    pub const fn presence(self) -> Presence {
        match self {
            Self::Unknown => Presence::Absent,
            Self::Known(presence) => presence,
        }
    }
}

/// Entity a viewer can bookmark or like.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct EngagementTarget {
    /// Target entity id (novel for bookmarks, episode for likes).
    pub id: EntityId,
    /// Stable id of the entity's author.
    pub author_id: EntityId,
}

/// Why a toggle was refused before reaching the network.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Refusal {
    /// Viewer is not signed in.
    Unauthenticated,
    /// Viewer authored the target.
    SelfAction,
    /// A toggle for the same target and kind is still pending.
    InFlight,
}

impl Refusal {
    /// User-facing message for the refusal.
    #[must_use]
    pub fn notice(self, kind: EngagementKind) -> Notice {
        match self {
            Self::Unauthenticated => Notice::warning(format!("Sign in to {} this.", verb(kind))),
            Self::SelfAction => Notice::warning(format!("You cannot {} your own work.", verb(kind))),
            Self::InFlight => Notice::info("Still saving your previous change."),
        }
    }
}

const fn verb(kind: EngagementKind) -> &'static str {
    match kind {
        EngagementKind::Bookmark => "bookmark",
        EngagementKind::Like => "like",
    }
}

/// Result of a toggle request.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ToggleOutcome {
    /// The server accepted the change; the optimistic state is authoritative.
    Confirmed(Presence),
    /// The request failed and the state was restored.
    Reverted {
        /// Presence after the revert (the pre-toggle state).
        state: Presence,
        /// Failure to surface.
        notice: Notice,
    },
    /// Rejected before any network call.
    Refused {
        /// Reason for the refusal.
        reason: Refusal,
        /// Message to surface.
        notice: Notice,
    },
    /// The pre-toggle state could not be read, so no change was sent.
    Unresolved(Notice),
    /// The slot was detached while the request was in flight.
    Discarded,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
struct SlotKey {
    kind: EngagementKind,
    target_id: EntityId,
}

#[derive(Clone, Copy, Debug)]
struct Slot {
    epoch: u64,
    state: EngagementState,
    pending: Option<u64>,
    applied_seq: u64,
}

/// Engagement controller shared by every toggle control on a page.
pub struct EngagementController<B> {
    backend: Rc<B>,
    identity: Rc<IdentityContext<B>>,
    slots: RefCell<HashMap<SlotKey, Slot>>,
    seq: Cell<u64>,
}

impl<B: Backend> EngagementController<B> {
    /// Build a controller over the shared backend and identity context.
    #[must_use]
    pub fn new(backend: Rc<B>, identity: Rc<IdentityContext<B>>) -> Self {
        Self {
            backend,
            identity,
            slots: RefCell::new(HashMap::new()),
            seq: Cell::new(0),
        }
    }

    /// Current observable state for a target.
    #[must_use]
    pub fn state(&self, target_id: EntityId, kind: EngagementKind) -> EngagementState {
        self.slots
            .borrow()
            .get(&SlotKey { kind, target_id })
            .map_or(EngagementState::Unknown, |slot| slot.state)
    }

    /// Whether a toggle is in flight for a target.
    #[must_use]
    pub fn is_pending(&self, target_id: EntityId, kind: EngagementKind) -> bool {
        self.slots
            .borrow()
            .get(&SlotKey { kind, target_id })
            .is_some_and(|slot| slot.pending.is_some())
    }

    /// Whether the control should be offered at all for this target.
    pub async fn offers_control(&self, target: EngagementTarget) -> bool {
        !self.identity.current().await.is_author_of(target.author_id)
    }

    /// Forget a target; responses still in flight for it are discarded.
    ///
    /// A pending toggle keeps the key locked until it settles, so a remounted control cannot
    /// issue a second mutation for the same pair.
    pub fn detach(&self, target_id: EntityId, kind: EngagementKind) {
        let key = SlotKey { kind, target_id };
        let epoch = self.next_seq();
        let mut slots = self.slots.borrow_mut();
        let Some(pending) = slots.get(&key).map(|slot| slot.pending) else {
            return;
        };
        if pending.is_some() {
            slots.insert(
                key,
                Slot {
                    epoch,
                    state: EngagementState::Unknown,
                    pending,
                    applied_seq: 0,
                },
            );
            tracing::debug!(target_id, kind = %kind, "engagement slot detached; toggle still in flight");
        } else {
            slots.remove(&key);
            tracing::debug!(target_id, kind = %kind, "engagement slot detached");
        }
    }

    /// Check the relation against the server.
    ///
    /// Failures (including auth failures) resolve to [`Presence::Absent`]. The returned value
    /// is the observable state after settling, which stays optimistic while a toggle is pending.
    pub async fn query_status(&self, target_id: EntityId, kind: EngagementKind) -> Presence {
        let key = SlotKey { kind, target_id };
        if !self.identity.current().await.is_authenticated() {
            self.apply_unless_pending(key, Presence::Absent);
            return Presence::Absent;
        }

        let seq = self.next_seq();
        let epoch = self.ensure_slot(key);
        let presence = match self.backend.engagement_status(kind, target_id).await {
            Ok(status) => Presence::from_flag(status.present),
            Err(err) => {
                self.note_status_failure(key, &err);
                Presence::Absent
            }
        };

        let mut slots = self.slots.borrow_mut();
        let Some(slot) = slots.get_mut(&key).filter(|slot| slot.epoch == epoch) else {
            tracing::debug!(target_id, kind = %kind, "status response for detached slot discarded");
            return presence;
        };
        if slot.pending.is_some() {
            tracing::debug!(target_id, kind = %kind, "status response ignored while toggle pending");
        } else if seq > slot.applied_seq {
            slot.state = EngagementState::Known(presence);
            slot.applied_seq = seq;
        } else {
            tracing::debug!(target_id, kind = %kind, seq, applied = slot.applied_seq, "stale status response discarded");
        }
        slot.state.presence()
    }

    /// Flip the relation optimistically and persist it.
    pub async fn toggle(&self, target: EngagementTarget, kind: EngagementKind) -> ToggleOutcome {
        let key = SlotKey {
            kind,
            target_id: target.id,
        };
        let viewer = self.identity.current().await;
        if !viewer.is_authenticated() {
            return refused(Refusal::Unauthenticated, kind);
        }
        if viewer.is_author_of(target.author_id) {
            tracing::debug!(target_id = target.id, kind = %kind, "self-action toggle refused");
            return refused(Refusal::SelfAction, kind);
        }

        let seq = self.next_seq();
        let Some(epoch) = self.claim(key, seq) else {
            return refused(Refusal::InFlight, kind);
        };

        let prior = match self.state(target.id, kind) {
            EngagementState::Known(presence) => presence,
            EngagementState::Unknown => {
                match self.backend.engagement_status(kind, target.id).await {
                    Ok(status) => Presence::from_flag(status.present),
                    Err(err) => {
                        self.release(key, seq);
                        tracing::warn!(target_id = target.id, kind = %kind, error = %err, "pre-toggle status check failed; nothing sent");
                        if self.identity.demote_on(&err) {
                            return refused(Refusal::Unauthenticated, kind);
                        }
                        return ToggleOutcome::Unresolved(Notice::error(err.user_message()));
                    }
                }
            }
        };
        let desired = prior.flipped();
        if !self.update_slot(key, epoch, |slot| {
            slot.state = EngagementState::Known(desired);
        }) {
            self.release(key, seq);
            tracing::debug!(target_id = target.id, kind = %kind, "slot detached before toggle was sent");
            return ToggleOutcome::Discarded;
        }

        tracing::debug!(target_id = target.id, kind = %kind, seq, desired = ?desired, "engagement toggle issued");
        let result = match desired {
            Presence::Present => self.backend.create_engagement(kind, target.id).await,
            Presence::Absent => self.backend.remove_engagement(kind, target.id).await,
        };

        let outcome = match result {
            Ok(()) => ToggleOutcome::Confirmed(desired),
            Err(err) => {
                tracing::warn!(target_id = target.id, kind = %kind, error = %err, status = ?err.status_code(), "engagement toggle failed; reverting");
                self.identity.demote_on(&err);
                ToggleOutcome::Reverted {
                    state: prior,
                    notice: Notice::error(err.user_message()),
                }
            }
        };
        let settled = match &outcome {
            ToggleOutcome::Reverted { state, .. } => *state,
            _ => desired,
        };
        self.release(key, seq);
        let applied = self.update_slot(key, epoch, |slot| {
            slot.state = EngagementState::Known(settled);
            slot.applied_seq = slot.applied_seq.max(seq);
        });
        if applied {
            outcome
        } else {
            tracing::debug!(target_id = target.id, kind = %kind, "toggle response for detached slot discarded");
            ToggleOutcome::Discarded
        }
    }

    fn note_status_failure(&self, key: SlotKey, err: &BackendError) {
        tracing::debug!(target_id = key.target_id, kind = %key.kind, error = %err, "status check failed; treating as absent");
        self.identity.demote_on(err);
    }

    fn next_seq(&self) -> u64 {
        let next = self.seq.get() + 1;
        self.seq.set(next);
        next
    }

    fn ensure_slot(&self, key: SlotKey) -> u64 {
        let epoch = self.next_seq();
        self.slots
            .borrow_mut()
            .entry(key)
            .or_insert(Slot {
                epoch,
                state: EngagementState::Unknown,
                pending: None,
                applied_seq: 0,
            })
            .epoch
    }

    fn claim(&self, key: SlotKey, seq: u64) -> Option<u64> {
        let epoch = self.ensure_slot(key);
        let mut slots = self.slots.borrow_mut();
        let slot = slots.get_mut(&key)?;
        if slot.pending.is_some() {
            return None;
        }
        slot.pending = Some(seq);
        Some(epoch)
    }

    /// Unlock the key if `seq` still holds it, whatever epoch the slot is in now.
    fn release(&self, key: SlotKey, seq: u64) {
        let mut slots = self.slots.borrow_mut();
        if let Some(slot) = slots
            .get_mut(&key)
            .filter(|slot| slot.pending == Some(seq))
        {
            slot.pending = None;
        }
    }

    fn update_slot(&self, key: SlotKey, epoch: u64, apply: impl FnOnce(&mut Slot)) -> bool {
        let mut slots = self.slots.borrow_mut();
        match slots.get_mut(&key) {
            Some(slot) if slot.epoch == epoch => {
                apply(slot);
                true
            }
            _ => false,
        }
    }

    fn apply_unless_pending(&self, key: SlotKey, presence: Presence) {
        let epoch = self.ensure_slot(key);
        let seq = self.next_seq();
        self.update_slot(key, epoch, |slot| {
            if slot.pending.is_none() {
                slot.state = EngagementState::Known(presence);
                slot.applied_seq = seq;
            }
        });
    }
}

fn refused(reason: Refusal, kind: EngagementKind) -> ToggleOutcome {
    ToggleOutcome::Refused {
        reason,
        notice: reason.notice(kind),
    }
}
