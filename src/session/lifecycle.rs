//! Page lifecycle: entry, teardown, re-initialization.

use super::AutoScrollSession;
use crate::constants::AUTO_START_DELAY_MS;
use crate::machine::TransitionReason;
use crate::notifications::{Notifier, StatusPanel};
use crate::proximity::ViewportMetrics;
use crate::timers::TimerKind;
use tracing::{debug, info};

impl<V, N, P> AutoScrollSession<V, N, P>
where
    V: ViewportMetrics,
    N: Notifier,
    P: StatusPanel,
{
    /// The page finished loading. Schedules an automatic start when
    /// `auto_start_on_entry` is set; returns whether one was scheduled.
    pub fn enter_page(&mut self) -> bool {
        if !self.settings.auto_start_on_entry {
            return false;
        }
        if let Some(id) = self.auto_start_timer.take() {
            self.timers.cancel(id);
        }
        self.auto_start_timer = Some(self.timers.schedule(AUTO_START_DELAY_MS, TimerKind::AutoStart));
        debug!(delay = AUTO_START_DELAY_MS, "auto start scheduled");
        true
    }

    /// The page is going away: cancel everything, detach listeners and end
    /// in `Stopped`.
    pub fn teardown(&mut self) {
        let _span = self.span.clone().entered();
        let cancelled = self.cancel_all_timers();
        self.debouncer.unbind();
        self.restart_offer = false;
        let stopped = self
            .machine
            .force_stop(TransitionReason::PageUnload, self.timers.now());
        self.mirror.set(false);
        info!(cancelled, was_running = stopped.is_some(), "session torn down");
    }

    /// Re-initialize in place: `Stopped`, fresh history, nothing scheduled.
    pub fn reset(&mut self) {
        let _span = self.span.clone().entered();
        let cancelled = self.cancel_all_timers();
        self.debouncer.unbind();
        self.restart_offer = false;
        self.stop_deferred = false;
        self.machine.reset(self.timers.now());
        self.mirror.set(false);
        info!(cancelled, "session reset");
    }

    /// Drop every pending timer and forget all handles into the queue.
    pub(super) fn cancel_all_timers(&mut self) -> usize {
        self.scheduler.forget();
        self.debounce_timer = None;
        self.status_timer = None;
        self.restart_timer = None;
        self.auto_start_timer = None;
        self.timers.clear()
    }
}
