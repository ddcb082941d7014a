//! Pumping the timer queue.
//!
//! Every fired timer is interpreted against *current* state. Handles that were
//! superseded (stale ticks, old flush timers, a lock timer from before a
//! forced release) are dropped on the floor.

use super::AutoScrollSession;
use crate::constants::STATUS_REFRESH_THROTTLE_MS;
use crate::error::ScrollError;
use crate::machine::{ScrollState, TransitionOutcome, TransitionReason};
use crate::notifications::{Notifier, StatusPanel};
use crate::perf::{measure, ScopedTimer};
use crate::proximity::ViewportMetrics;
use crate::scheduler::TickOutcome;
use crate::timers::{Millis, TimerId, TimerKind};
use tracing::{debug, error, info, trace, warn};

impl<V, N, P> AutoScrollSession<V, N, P>
where
    V: ViewportMetrics,
    N: Notifier,
    P: StatusPanel,
{
    /// Run every timer due at or before `now`, then move the clock to `now`.
    /// Returns the number of timers fired.
    pub fn advance_to(&mut self, now: Millis) -> usize {
        let _span = self.span.clone().entered();
        let mut fired = 0;
        while let Some((id, kind)) = self.timers.pop_due(now) {
            fired += 1;
            self.dispatch(id, kind);
        }
        self.timers.set_now(now);
        fired
    }

    pub fn advance_by(&mut self, delta: Millis) -> usize {
        self.advance_to(self.timers.now().saturating_add(delta))
    }

    /// Run timers that are already due without moving the clock.
    pub fn run_pending(&mut self) -> usize {
        self.advance_to(self.timers.now())
    }

    /// Deadline of the next pending timer, for hosts that sleep between pumps
    pub fn next_deadline(&self) -> Option<Millis> {
        self.timers.next_deadline()
    }

    fn dispatch(&mut self, id: TimerId, kind: TimerKind) {
        match kind {
            TimerKind::Tick => self.on_tick(id),
            TimerKind::LockRelease => {
                let outcome = self.machine.on_lock_expired(id, &mut self.timers);
                self.settle(&outcome);
            }
            TimerKind::EnterEffects(transition) => self.run_entry_effects(transition),
            TimerKind::DebounceFlush => self.on_debounce_flush(id),
            TimerKind::StatusRefresh => self.on_status_refresh(id),
            TimerKind::RestartFromTop => self.on_restart_due(id),
            TimerKind::AutoStart => self.on_auto_start_due(id),
        }
    }

    fn on_tick(&mut self, id: TimerId) {
        if !self.scheduler.claim(id) {
            trace!("stale tick ignored");
            return;
        }
        if self.machine.state() != ScrollState::Scrolling {
            debug!(state = %self.machine.state(), "tick fired outside scrolling, skipped");
            return;
        }

        let _slow = ScopedTimer::callback("scroll_tick");
        let (result, elapsed_ms) = measure(|| self.scheduler.run_tick(&mut self.page));
        self.tick_timing.record(elapsed_ms);

        match result {
            Ok(TickOutcome::Scrolled { offset, moved }) => {
                trace!(offset, moved, "tick scrolled");
                self.debouncer.shift(moved);
                self.request_status_refresh();
                if self.scheduler.schedule_next(&mut self.timers).is_none() {
                    warn!(
                        ticks = self.scheduler.ticks_this_run(),
                        "tick ceiling reached, stopping"
                    );
                    self.stop_with(TransitionReason::IterationLimit);
                }
            }
            Ok(TickOutcome::ReachedBottom) => {
                info!(total_ticks = self.scheduler.total_ticks(), "reached bottom of page");
                let outcome = self.stop_with(TransitionReason::ReachedBottom);
                let stopping = matches!(outcome, TransitionOutcome::Applied(_) | TransitionOutcome::Queued);
                if stopping && self.settings.offer_restart_from_top {
                    self.restart_offer = true;
                }
            }
            Err(source) => {
                let err = ScrollError::Scheduler(source);
                error!(error = %err, "tick failed, stopping");
                self.stop_with(TransitionReason::TickFailed);
            }
        }
    }

    fn on_debounce_flush(&mut self, id: TimerId) {
        if self.debounce_timer != Some(id) {
            return;
        }
        self.debounce_timer = None;
        if let Some(direction) = self.debouncer.poll(self.timers.now()) {
            debug!(%direction, "user scroll classified");
            self.handle_user_signal(direction);
        }
    }

    pub(super) fn request_status_refresh(&mut self) {
        if self.status_timer.is_some() {
            return;
        }
        self.status_timer = Some(
            self.timers
                .schedule(STATUS_REFRESH_THROTTLE_MS, TimerKind::StatusRefresh),
        );
    }

    fn on_status_refresh(&mut self, id: TimerId) {
        if self.status_timer != Some(id) {
            return;
        }
        self.status_timer = None;
        let status = self.status();
        self.panel.refresh(&status);
    }

    fn on_restart_due(&mut self, id: TimerId) {
        if self.restart_timer != Some(id) {
            return;
        }
        self.restart_timer = None;
        self.start_with(TransitionReason::RestartFromTop);
    }

    fn on_auto_start_due(&mut self, id: TimerId) {
        if self.auto_start_timer != Some(id) {
            return;
        }
        self.auto_start_timer = None;
        if self.machine.state() == ScrollState::Stopped {
            self.start_with(TransitionReason::AutoStart);
        } else {
            debug!(state = %self.machine.state(), "auto start skipped");
        }
    }
}
