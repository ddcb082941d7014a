//! Host-facing operations: start/stop, toggles, user input, faults.

use super::AutoScrollSession;
use crate::constants::RESTART_FROM_TOP_DELAY_MS;
use crate::machine::{ScrollState, TransitionOutcome, TransitionReason, TransitionRequest};
use crate::notifications::{NoticeKind, Notifier, StatusPanel};
use crate::proximity::ViewportMetrics;
use crate::signal::{Direction, UserScrollSample};
use crate::timers::TimerKind;
use tracing::{debug, info, warn};

impl<V, N, P> AutoScrollSession<V, N, P>
where
    V: ViewportMetrics,
    N: Notifier,
    P: StatusPanel,
{
    /// Start auto-scrolling. No-op with a warning if already scrolling.
    pub fn start(&mut self) -> TransitionOutcome {
        let _span = self.span.clone().entered();
        self.start_with(TransitionReason::UserStart)
    }

    /// Stop auto-scrolling. No-op with a warning if already stopped.
    ///
    /// The tick and the user listeners are gone when this returns, even if
    /// the transition itself waits for the lock.
    pub fn stop(&mut self) -> TransitionOutcome {
        let _span = self.span.clone().entered();
        self.cancel_restart();
        self.stop_with(TransitionReason::UserStop)
    }

    /// Start when idle, stop when running or paused.
    pub fn toggle(&mut self) -> TransitionOutcome {
        if self.machine.is_engaged() {
            self.stop()
        } else {
            self.start()
        }
    }

    /// Keyboard-style pause/resume: starts when stopped, pauses when
    /// scrolling, resumes when paused, recovers when in error.
    pub fn toggle_pause(&mut self) -> TransitionOutcome {
        let _span = self.span.clone().entered();
        let request = match self.machine.state() {
            ScrollState::Stopped => return self.start_with(TransitionReason::UserStart),
            ScrollState::Scrolling => {
                TransitionRequest::new(ScrollState::Paused, TransitionReason::ShortcutPause)
                    .with_direction(Direction::Up)
            }
            ScrollState::Paused => {
                TransitionRequest::new(ScrollState::Scrolling, TransitionReason::ShortcutResume)
                    .with_direction(Direction::Down)
            }
            ScrollState::Error => {
                TransitionRequest::new(ScrollState::Stopped, TransitionReason::ErrorRecovery)
            }
        };
        let outcome = self.machine.request(request, &mut self.timers);
        self.settle(&outcome);
        outcome
    }

    /// Feed a classified (post-debounce) user direction.
    pub fn handle_user_signal(&mut self, direction: Direction) -> TransitionOutcome {
        let outcome = self.machine.handle_user_signal(direction, &mut self.timers);
        self.settle(&outcome);
        outcome
    }

    /// Feed a raw scroll offset observed by the host at the current clock
    /// time. Call `advance_to` first so the sample carries the right time.
    pub fn on_raw_scroll(&mut self, position: f64) {
        let _span = self.span.clone().entered();
        let sample = UserScrollSample::new(position, self.timers.now());
        let overdue = self.debouncer.on_raw_event(sample);
        self.rearm_debounce();
        if let Some(direction) = overdue {
            self.handle_user_signal(direction);
        }
    }

    /// Feed a raw wheel delta (positive is down).
    pub fn on_wheel(&mut self, delta: f64) {
        let _span = self.span.clone().entered();
        let overdue = self.debouncer.on_wheel(delta, self.timers.now());
        self.rearm_debounce();
        if let Some(direction) = overdue {
            self.handle_user_signal(direction);
        }
    }

    /// A host-detected fault: move to `Error` and wait for recovery.
    pub fn report_fault(&mut self, detail: &str) -> TransitionOutcome {
        let _span = self.span.clone().entered();
        warn!(detail, "fault reported by host");
        let request = TransitionRequest::new(ScrollState::Error, TransitionReason::FaultReported);
        let outcome = self.machine.request(request, &mut self.timers);
        self.settle(&outcome);
        outcome
    }

    /// Jump to the top of the page. State is unaffected.
    pub fn scroll_to_top(&mut self) -> bool {
        match self.page.scroll_to(0.0) {
            Ok(()) => {
                self.debouncer.rebase(self.page.current_offset());
                self.notify_best_effort("Jumped to top", NoticeKind::Info);
                true
            }
            Err(err) => {
                warn!(error = %err, "jump to top failed");
                false
            }
        }
    }

    /// Jump to the bottom of the page. State is unaffected.
    pub fn scroll_to_bottom(&mut self) -> bool {
        let target = (self.page.scrollable_height() - self.page.viewport_height()).max(0.0);
        match self.page.scroll_to(target) {
            Ok(()) => {
                self.debouncer.rebase(self.page.current_offset());
                self.notify_best_effort("Jumped to bottom", NoticeKind::Info);
                true
            }
            Err(err) => {
                warn!(error = %err, "jump to bottom failed");
                false
            }
        }
    }

    /// Accept the offer raised when the bottom was reached: return to the
    /// top and restart after a short delay.
    pub fn accept_restart_offer(&mut self) -> bool {
        if !self.restart_offer {
            return false;
        }
        self.restart_offer = false;

        if let Err(err) = self.page.scroll_to(0.0) {
            warn!(error = %err, "could not return to top, restart abandoned");
            return false;
        }
        self.cancel_restart();
        self.restart_timer = Some(
            self.timers
                .schedule(RESTART_FROM_TOP_DELAY_MS, TimerKind::RestartFromTop),
        );
        info!("restart from top scheduled");
        true
    }

    pub fn decline_restart_offer(&mut self) {
        self.restart_offer = false;
    }

    pub(super) fn start_with(&mut self, reason: TransitionReason) -> TransitionOutcome {
        self.restart_offer = false;
        let outcome = self.machine.start(reason, &mut self.timers);
        self.settle(&outcome);
        outcome
    }

    pub(super) fn stop_with(&mut self, reason: TransitionReason) -> TransitionOutcome {
        let outcome = self.machine.stop(reason, &mut self.timers);
        match &outcome {
            TransitionOutcome::Applied(_) => self.settle(&outcome),
            TransitionOutcome::Queued => {
                self.stop_deferred = true;
                self.scheduler.cancel(&mut self.timers);
                self.detach_listeners();
                debug!(%reason, "stop deferred by lock, tick and listeners dropped now");
            }
            TransitionOutcome::Rejected | TransitionOutcome::Ignored => {}
        }
        outcome
    }

    fn cancel_restart(&mut self) {
        if let Some(id) = self.restart_timer.take() {
            self.timers.cancel(id);
        }
    }

    fn rearm_debounce(&mut self) {
        if let Some(id) = self.debounce_timer.take() {
            self.timers.cancel(id);
        }
        if let Some(deadline) = self.debouncer.deadline() {
            let delay = deadline.saturating_sub(self.timers.now());
            self.debounce_timer = Some(self.timers.schedule(delay, TimerKind::DebounceFlush));
        }
    }
}
