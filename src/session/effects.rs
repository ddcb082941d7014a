//! State-entry effects and failure recovery.
//!
//! Two kinds of follow-up run after a transition is applied:
//!
//! - **Synchronous resync** (`settle`): scheduler, listeners and mirror are
//!   brought in line with the new state before the caller gets control back.
//!   None of it can fail.
//! - **Deferred entry effects**: notifications and the status refresh run
//!   from the `EnterEffects` timer, after the transition returned. A failure
//!   there rolls the transition back; a failure during rollback hard-resets
//!   the whole controller.

use super::AutoScrollSession;
use crate::constants::RESUME_SETTLE_MS;
use crate::error::{ScrollError, ScrollResult};
use crate::machine::{ScrollState, Transition, TransitionOutcome, TransitionReason};
use crate::notifications::{NoticeKind, Notifier, StatusPanel};
use crate::profile_scope;
use crate::proximity::ViewportMetrics;
use crate::signal::Direction;
use tracing::{debug, error, warn};

/// Notification shown when a state is entered
fn entry_notice(transition: &Transition) -> (&'static str, NoticeKind) {
    use ScrollState::{Error, Paused, Scrolling, Stopped};
    use TransitionReason as R;

    match (transition.to, transition.reason, transition.direction) {
        (Scrolling, R::ShortcutResume, _) => ("Auto-scroll resumed", NoticeKind::Resume),
        (Scrolling, _, Some(Direction::Down)) if transition.from == Some(Paused) => {
            ("Scrolled down, auto-scroll resumed", NoticeKind::Resume)
        }
        (Scrolling, R::AutoStart, _) => ("Auto-scroll started on page entry", NoticeKind::Info),
        (Scrolling, R::RestartFromTop, _) => ("Restarted auto-scroll from the top", NoticeKind::Info),
        (Scrolling, ..) => ("Auto-scroll started", NoticeKind::Info),
        (Paused, R::ShortcutPause, _) => ("Auto-scroll paused", NoticeKind::Pause),
        (Paused, ..) => ("Scrolled up, auto-scroll paused", NoticeKind::Pause),
        (Stopped, R::ReachedBottom, _) => ("Reached the bottom, auto-scroll stopped", NoticeKind::Info),
        (Stopped, R::IterationLimit | R::TickFailed, _) => {
            ("Auto-scroll stopped after a scheduling fault", NoticeKind::Error)
        }
        (Stopped, R::ErrorRecovery, _) => ("Recovered, auto-scroll stopped", NoticeKind::Info),
        (Stopped, ..) => ("Auto-scroll stopped", NoticeKind::Info),
        (Error, ..) => ("Auto-scroll hit an error", NoticeKind::Error),
    }
}

impl<V, N, P> AutoScrollSession<V, N, P>
where
    V: ViewportMetrics,
    N: Notifier,
    P: StatusPanel,
{
    /// Resync after a machine call, if it changed state.
    pub(super) fn settle(&mut self, outcome: &TransitionOutcome) {
        if self.machine.pending().is_none() {
            self.stop_deferred = false;
        }
        if let TransitionOutcome::Applied(transition) = outcome {
            self.sync_with_state(Some(transition));
        }
    }

    /// Bring scheduler, listeners and mirror in line with the machine.
    fn sync_with_state(&mut self, cause: Option<&Transition>) {
        let state = self.machine.state();
        self.mirror.set(state.is_active());

        match state {
            ScrollState::Scrolling => {
                self.attach_listeners();
                let resumed_by_user = cause.is_some_and(|t| {
                    t.from == Some(ScrollState::Paused) && t.direction == Some(Direction::Down)
                });
                if resumed_by_user || !self.scheduler.has_outstanding(&self.timers) {
                    let first_delay = resumed_by_user.then_some(RESUME_SETTLE_MS);
                    self.scheduler.arm(&mut self.timers, first_delay);
                }
            }
            ScrollState::Paused | ScrollState::Error => {
                self.scheduler.cancel(&mut self.timers);
                self.attach_listeners();
            }
            ScrollState::Stopped => {
                self.scheduler.cancel(&mut self.timers);
                self.detach_listeners();
            }
        }
    }

    fn attach_listeners(&mut self) {
        if !self.debouncer.is_bound() {
            self.debouncer.bind(self.page.current_offset());
            debug!("scroll listeners attached");
        }
    }

    pub(super) fn detach_listeners(&mut self) {
        if let Some(id) = self.debounce_timer.take() {
            self.timers.cancel(id);
        }
        if self.debouncer.unbind() {
            debug!("scroll listeners detached");
        }
    }

    pub(super) fn run_entry_effects(&mut self, transition: Transition) {
        profile_scope!("entry_effects");
        if let Err(source) = self.enter_state(&transition) {
            let err = ScrollError::SideEffect {
                state: transition.to,
                source,
            };
            error!(error = %err, "state entry failed");
            if let Err(rollback_err) = self.roll_back(&transition) {
                error!(error = %rollback_err, "recovery failed, forcing reset");
                self.hard_reset();
            }
        }
    }

    fn enter_state(&mut self, transition: &Transition) -> anyhow::Result<()> {
        let (message, kind) = entry_notice(transition);
        self.emit(message, kind)?;
        self.request_status_refresh();
        Ok(())
    }

    fn roll_back(&mut self, failed: &Transition) -> ScrollResult<()> {
        let now = self.timers.now();
        if self.machine.rollback(failed, now) {
            self.sync_with_state(None);
        }
        if let Some(discarded) = self.machine.force_release(&mut self.timers) {
            debug!(to = %discarded.to, reason = %discarded.reason, "pending transition discarded");
        }
        self.emit("Auto-scroll failed and was rolled back", NoticeKind::Error)
            .map_err(ScrollError::Notify)
    }

    /// Terminal safety net: drop every timer and listener and force `Stopped`.
    pub(super) fn hard_reset(&mut self) {
        let cancelled = self.cancel_all_timers();
        self.debouncer.unbind();
        self.restart_offer = false;
        self.stop_deferred = false;
        self.machine.hard_reset(self.timers.now());
        self.mirror.set(false);
        error!(cancelled, "controller force reset to stopped");
    }

    /// Send a notification unless notifications are disabled.
    fn emit(&mut self, message: &str, kind: NoticeKind) -> anyhow::Result<()> {
        if !self.settings.enable_notifications {
            return Ok(());
        }
        self.notifier.notify(message, kind)
    }

    /// Notification outside any transition; failures are only logged.
    pub(super) fn notify_best_effort(&mut self, message: &str, kind: NoticeKind) {
        if let Err(source) = self.emit(message, kind) {
            warn!(error = %ScrollError::Notify(source), "notification dropped");
        }
    }
}
