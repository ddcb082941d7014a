//! Scroll tick scheduler.
//!
//! A self-terminating chain of one-shot timers rather than a fixed-period
//! interval: tick N+1 is only scheduled once tick N's synchronous work is
//! done, and every fired timer is checked against the single handle the
//! scheduler currently owns. A pause or stop that lands mid-wait cancels the
//! handle, so no stray scroll happens after the user took over.
//!
//! The scheduler never reads or writes machine state. Its owner checks
//! `state == Scrolling` before calling [`ScrollScheduler::run_tick`].

use crate::constants::{MAX_TICK_DELAY_MS, MAX_TICKS_PER_RUN, MIN_TICK_DELAY_MS};
use crate::proximity::{PageProximitySensor, ViewportMetrics};
use crate::timers::{Millis, TimerId, TimerKind, TimerQueue};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use tracing::trace;

/// Result of one tick
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum TickOutcome {
    /// Page scrolled; `moved` is the actual distance after clamping
    Scrolled { offset: f64, moved: f64 },
    /// Bottom detected; nothing scrolled
    ReachedBottom,
}

/// Owner of the single outstanding tick handle
#[derive(Debug)]
pub struct ScrollScheduler {
    handle: Option<TimerId>,
    ticks_this_run: u32,
    total_ticks: u64,
    step_px: f64,
    sensor: PageProximitySensor,
    rng: StdRng,
}

impl ScrollScheduler {
    /// Create a scheduler. A seed makes the jitter sequence reproducible.
    pub fn new(step_px: f64, seed: Option<u64>) -> Self {
        let rng = match seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        Self {
            handle: None,
            ticks_this_run: 0,
            total_ticks: 0,
            step_px,
            sensor: PageProximitySensor::new(),
            rng,
        }
    }

    pub fn step_px(&self) -> f64 {
        self.step_px
    }

    /// Current handle, if one was issued and not yet claimed or cancelled
    pub fn handle(&self) -> Option<TimerId> {
        self.handle
    }

    /// True if the handle is still waiting in the queue
    pub fn has_outstanding(&self, timers: &TimerQueue) -> bool {
        self.handle.is_some_and(|id| timers.is_pending(id))
    }

    pub fn ticks_this_run(&self) -> u32 {
        self.ticks_this_run
    }

    pub fn total_ticks(&self) -> u64 {
        self.total_ticks
    }

    /// Uniform delay in `[MIN_TICK_DELAY_MS, MAX_TICK_DELAY_MS]`
    pub fn jitter_delay(&mut self) -> Millis {
        self.rng.gen_range(MIN_TICK_DELAY_MS..=MAX_TICK_DELAY_MS)
    }

    /// Start a fresh run. `first_delay` overrides the jitter for the first
    /// tick only (used for the settle delay after a resume).
    pub fn arm(&mut self, timers: &mut TimerQueue, first_delay: Option<Millis>) -> TimerId {
        self.cancel(timers);
        self.ticks_this_run = 0;
        let delay = first_delay.unwrap_or_else(|| self.jitter_delay());
        let id = timers.schedule(delay, TimerKind::Tick);
        trace!(delay, "scheduler armed");
        self.handle = Some(id);
        id
    }

    /// Schedule the successor of a completed tick.
    ///
    /// Returns `None` once the run hit the iteration ceiling.
    pub fn schedule_next(&mut self, timers: &mut TimerQueue) -> Option<TimerId> {
        if self.is_exhausted() {
            return None;
        }
        let delay = self.jitter_delay();
        let id = timers.schedule(delay, TimerKind::Tick);
        self.handle = Some(id);
        Some(id)
    }

    /// Cancel the outstanding tick. Returns true if one was pending.
    pub fn cancel(&mut self, timers: &mut TimerQueue) -> bool {
        match self.handle.take() {
            Some(id) => timers.cancel(id),
            None => false,
        }
    }

    /// Drop the handle without touching the queue (the queue was cleared).
    pub fn forget(&mut self) {
        self.handle = None;
    }

    /// Accept a fired tick timer if it is the current handle.
    pub fn claim(&mut self, id: TimerId) -> bool {
        if self.handle == Some(id) {
            self.handle = None;
            true
        } else {
            false
        }
    }

    pub fn is_exhausted(&self) -> bool {
        self.ticks_this_run >= MAX_TICKS_PER_RUN
    }

    /// Perform one tick: stop at the bottom, otherwise scroll one step.
    pub fn run_tick(&mut self, page: &mut dyn ViewportMetrics) -> anyhow::Result<TickOutcome> {
        self.ticks_this_run += 1;
        self.total_ticks += 1;

        if self.sensor.is_at_bottom(page) {
            return Ok(TickOutcome::ReachedBottom);
        }
        let before = page.current_offset();
        page.scroll_by(self.step_px)?;
        let offset = page.current_offset();
        Ok(TickOutcome::Scrolled {
            offset,
            moved: offset - before,
        })
    }
}
