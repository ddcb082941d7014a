//! Scroll state machine - the single source of truth for automation state.
//!
//! The machine validates and serializes transitions. It never runs side
//! effects itself: an applied transition only schedules an
//! [`TimerKind::EnterEffects`] follow-up task, which the owning session
//! handles after control returns to the event loop. That keeps every
//! transition synchronous and makes re-entrant callbacks into the machine
//! impossible from inside a transition.
//!
//! ## Transition lock
//!
//! Every applied transition holds a lock for [`TRANSITION_LOCK_MS`]. While it
//! is held, legal requests are parked in a single pending slot (latest wins)
//! and re-validated against the then-current state when the lock expires.

mod history;
mod state;

pub use history::TransitionHistory;
pub use state::{ScrollState, Transition, TransitionReason, TransitionRequest};

use crate::constants::TRANSITION_LOCK_MS;
use crate::error::{ScrollError, ScrollResult};
use crate::signal::Direction;
use crate::timers::{Millis, TimerId, TimerKind, TimerQueue};
use tracing::{debug, info, trace, warn};

/// What happened to a transition request
#[derive(Debug, Clone, PartialEq)]
pub enum TransitionOutcome {
    /// State changed; effects are scheduled
    Applied(Transition),
    /// Lock held; request parked in the pending slot
    Queued,
    /// Edge not in the matrix; nothing changed
    Rejected,
    /// Request was a deliberate no-op for the current state
    Ignored,
}

impl TransitionOutcome {
    pub fn is_applied(&self) -> bool {
        matches!(self, Self::Applied(_))
    }

    pub fn applied(&self) -> Option<&Transition> {
        match self {
            Self::Applied(transition) => Some(transition),
            _ => None,
        }
    }
}

/// Check that `from -> to` is an edge of the transition matrix.
pub fn check_edge(from: ScrollState, to: ScrollState) -> ScrollResult<()> {
    if from.can_transition_to(to) {
        Ok(())
    } else {
        Err(ScrollError::RejectedTransition { from, to })
    }
}

/// Owner of the canonical [`ScrollState`]
#[derive(Debug)]
pub struct ScrollStateMachine {
    state: ScrollState,
    history: TransitionHistory,
    /// Expiry timer of the transition lock; `Some` while the lock is held
    lock_release: Option<TimerId>,
    pending: Option<TransitionRequest>,
    last_transition_at: Millis,
}

impl ScrollStateMachine {
    /// Create a machine in `Stopped` with an initialization record.
    pub fn new(now: Millis) -> Self {
        let mut machine = Self {
            state: ScrollState::Stopped,
            history: TransitionHistory::new(),
            lock_release: None,
            pending: None,
            last_transition_at: now,
        };
        machine.record_synthetic(TransitionReason::Initialization, now);
        machine
    }

    #[inline]
    pub fn state(&self) -> ScrollState {
        self.state
    }

    pub fn is_paused(&self) -> bool {
        self.state.is_paused()
    }

    pub fn is_active(&self) -> bool {
        self.state.is_active()
    }

    pub fn is_engaged(&self) -> bool {
        self.state.is_engaged()
    }

    pub fn history(&self) -> &TransitionHistory {
        &self.history
    }

    pub fn pending(&self) -> Option<&TransitionRequest> {
        self.pending.as_ref()
    }

    pub fn is_locked(&self) -> bool {
        self.lock_release.is_some()
    }

    pub fn last_transition_at(&self) -> Millis {
        self.last_transition_at
    }

    /// Request `Scrolling`. No-op with a warning if already scrolling.
    pub fn start(&mut self, reason: TransitionReason, timers: &mut TimerQueue) -> TransitionOutcome {
        if self.state == ScrollState::Scrolling {
            warn!(%reason, "auto-scroll already running");
            return TransitionOutcome::Ignored;
        }
        self.request(TransitionRequest::new(ScrollState::Scrolling, reason), timers)
    }

    /// Request `Stopped`. No-op with a warning if already stopped.
    pub fn stop(&mut self, reason: TransitionReason, timers: &mut TimerQueue) -> TransitionOutcome {
        if self.state == ScrollState::Stopped {
            warn!(%reason, "auto-scroll not running");
            return TransitionOutcome::Ignored;
        }
        self.request(TransitionRequest::new(ScrollState::Stopped, reason), timers)
    }

    /// Apply the user-signal rules. Unmatched combinations are ignored.
    pub fn handle_user_signal(
        &mut self,
        direction: Direction,
        timers: &mut TimerQueue,
    ) -> TransitionOutcome {
        use Direction::{Down, Up};

        let request = match (self.state, direction) {
            (ScrollState::Scrolling, Up) => {
                TransitionRequest::new(ScrollState::Paused, TransitionReason::UserScrollUp)
            }
            (ScrollState::Paused, Down) => {
                TransitionRequest::new(ScrollState::Scrolling, TransitionReason::UserScrollDown)
            }
            (ScrollState::Error, _) => {
                debug!("user signal while in error, attempting recovery");
                TransitionRequest::new(ScrollState::Stopped, TransitionReason::ErrorRecovery)
            }
            (ScrollState::Scrolling, Down) | (ScrollState::Paused, Up) | (ScrollState::Stopped, _) => {
                trace!(state = %self.state, %direction, "user signal ignored");
                return TransitionOutcome::Ignored;
            }
        };
        self.request(request.with_direction(direction), timers)
    }

    /// Validate a request and apply it, queue it behind the lock, or reject it.
    pub fn request(&mut self, request: TransitionRequest, timers: &mut TimerQueue) -> TransitionOutcome {
        if let Err(err) = check_edge(self.state, request.to) {
            warn!(error = %err, reason = %request.reason, "transition rejected");
            return TransitionOutcome::Rejected;
        }

        if self.is_locked() {
            if let Some(superseded) = self.pending.replace(request) {
                debug!(
                    superseded = %superseded.to,
                    reason = %superseded.reason,
                    "pending transition superseded"
                );
            }
            debug!(error = %ScrollError::LockedDeferral { to: request.to }, "transition queued");
            return TransitionOutcome::Queued;
        }

        TransitionOutcome::Applied(self.apply(request, timers))
    }

    fn apply(&mut self, request: TransitionRequest, timers: &mut TimerQueue) -> Transition {
        let now = timers.now();
        let transition = Transition {
            from: Some(self.state),
            to: request.to,
            reason: request.reason,
            direction: request.direction,
            at: now,
        };

        info!(
            from = %self.state,
            to = %request.to,
            reason = %request.reason,
            "scroll state transition"
        );

        self.history.push(transition.clone());
        self.state = request.to;
        self.last_transition_at = now;
        self.acquire_lock(timers);
        timers.schedule(0, TimerKind::EnterEffects(transition.clone()));
        transition
    }

    fn acquire_lock(&mut self, timers: &mut TimerQueue) {
        if let Some(previous) = self.lock_release.take() {
            timers.cancel(previous);
        }
        self.lock_release = Some(timers.schedule(TRANSITION_LOCK_MS, TimerKind::LockRelease));
    }

    /// Handle the lock expiry timer: release the lock and apply the pending
    /// request, re-validated against the current state.
    pub fn on_lock_expired(&mut self, id: TimerId, timers: &mut TimerQueue) -> TransitionOutcome {
        if self.lock_release != Some(id) {
            trace!("stale lock release timer");
            return TransitionOutcome::Ignored;
        }
        self.lock_release = None;

        match self.pending.take() {
            Some(request) => {
                debug!(to = %request.to, reason = %request.reason, "processing pending transition");
                self.request(request, timers)
            }
            None => TransitionOutcome::Ignored,
        }
    }

    /// Release the lock immediately and discard the pending request.
    pub fn force_release(&mut self, timers: &mut TimerQueue) -> Option<TransitionRequest> {
        if let Some(id) = self.lock_release.take() {
            timers.cancel(id);
        }
        self.pending.take()
    }

    /// Restore the state a failed transition left, if the machine still sits
    /// in that transition's target. Returns whether anything changed.
    pub fn rollback(&mut self, failed: &Transition, now: Millis) -> bool {
        let Some(previous) = failed.from else {
            return false;
        };
        if self.state != failed.to {
            debug!(state = %self.state, target = %failed.to, "state moved on, nothing to roll back");
            return false;
        }

        warn!(from = %self.state, to = %previous, "rolling back transition");
        self.history.push(Transition {
            from: Some(self.state),
            to: previous,
            reason: TransitionReason::Rollback,
            direction: None,
            at: now,
        });
        self.state = previous;
        self.last_transition_at = now;
        true
    }

    /// Force `Stopped` outside the matrix. Returns the recorded transition,
    /// or `None` if the machine was already stopped.
    ///
    /// The caller owns timer cleanup: the lock handle is forgotten here, not
    /// cancelled.
    pub fn force_stop(&mut self, reason: TransitionReason, now: Millis) -> Option<Transition> {
        self.lock_release = None;
        self.pending = None;
        if self.state == ScrollState::Stopped {
            return None;
        }

        let transition = Transition {
            from: Some(self.state),
            to: ScrollState::Stopped,
            reason,
            direction: None,
            at: now,
        };
        self.history.push(transition.clone());
        self.state = ScrollState::Stopped;
        self.last_transition_at = now;
        Some(transition)
    }

    /// Terminal safety net: force `Stopped` and record `UNKNOWN -> Stopped`.
    ///
    /// Infallible. The caller owns timer cleanup.
    pub fn hard_reset(&mut self, now: Millis) {
        self.lock_release = None;
        self.pending = None;
        self.state = ScrollState::Stopped;
        self.last_transition_at = now;
        self.record_synthetic(TransitionReason::ForceReset, now);
    }

    /// Re-initialize: `Stopped`, empty history plus an initialization record.
    /// The caller owns timer cleanup.
    pub fn reset(&mut self, now: Millis) {
        self.history.clear();
        self.lock_release = None;
        self.pending = None;
        self.state = ScrollState::Stopped;
        self.last_transition_at = now;
        self.record_synthetic(TransitionReason::Initialization, now);
    }

    fn record_synthetic(&mut self, reason: TransitionReason, now: Millis) {
        self.history.push(Transition {
            from: None,
            to: ScrollState::Stopped,
            reason,
            direction: None,
            at: now,
        });
    }
}
