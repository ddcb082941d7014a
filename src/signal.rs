//! User scroll signal pipeline.
//!
//! Raw scroll events arrive at native frequency (often hundreds per second).
//! Classifying each one would flap the state machine, so events go through
//! three filters before a direction is emitted:
//!
//! ```text
//! raw event -> throttle (50ms since last emission) -> debounce (30ms quiet)
//!           -> threshold (> 20px from last known offset) -> Up | Down
//! ```
//!
//! The debouncer keeps no timer itself. The owner arms a flush timer at
//! [`ScrollSignalDebouncer::deadline`] and calls [`ScrollSignalDebouncer::poll`]
//! when it fires.

use crate::constants::{SIGNAL_DEBOUNCE_MS, SIGNAL_THRESHOLD_PX, SIGNAL_THROTTLE_MS};
use crate::timers::Millis;
use serde::{Deserialize, Serialize};
use std::fmt;
use tracing::trace;

/// Classified direction of a user scroll gesture
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Direction {
    Up,
    Down,
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Up => f.write_str("up"),
            Self::Down => f.write_str("down"),
        }
    }
}

/// One observed scroll offset
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct UserScrollSample {
    pub position: f64,
    pub at: Millis,
}

impl UserScrollSample {
    pub fn new(position: f64, at: Millis) -> Self {
        Self { position, at }
    }
}

/// Throttle + debounce + threshold filter for raw scroll samples
#[derive(Debug, Clone, Default)]
pub struct ScrollSignalDebouncer {
    bound: bool,
    last_offset: f64,
    last_processed: Option<Millis>,
    pending: Option<UserScrollSample>,
}

impl ScrollSignalDebouncer {
    /// Create an unbound debouncer. Unbound debouncers ignore every event.
    pub fn new() -> Self {
        Self::default()
    }

    /// Start listening, taking `offset` as the last known position.
    pub fn bind(&mut self, offset: f64) {
        self.bound = true;
        self.last_offset = offset;
        self.pending = None;
    }

    /// Stop listening and drop any buffered sample. Returns whether it was bound.
    pub fn unbind(&mut self) -> bool {
        let was_bound = self.bound;
        self.bound = false;
        self.pending = None;
        was_bound
    }

    pub fn is_bound(&self) -> bool {
        self.bound
    }

    /// Offset of the last classified sample (or the bind offset)
    pub fn last_offset(&self) -> f64 {
        self.last_offset
    }

    /// Reset the baseline after a jump. A sample buffered before the jump is
    /// dropped.
    pub fn rebase(&mut self, offset: f64) {
        if self.bound {
            self.last_offset = offset;
            self.pending = None;
        }
    }

    /// Account for a programmatic scroll of `by` pixels. The baseline and any
    /// buffered sample move together, so only the user's own movement is
    /// left to classify.
    pub fn shift(&mut self, by: f64) {
        if !self.bound {
            return;
        }
        self.last_offset += by;
        if let Some(pending) = self.pending.as_mut() {
            pending.position += by;
        }
    }

    /// When the buffered sample becomes due, if any
    pub fn deadline(&self) -> Option<Millis> {
        self.pending.map(|p| p.at.saturating_add(SIGNAL_DEBOUNCE_MS))
    }

    /// Feed one raw sample.
    ///
    /// Returns a direction only when this arrival finds an older buffered
    /// sample whose quiet window already elapsed; the new sample itself is
    /// buffered until [`Self::poll`] or the next arrival.
    pub fn on_raw_event(&mut self, sample: UserScrollSample) -> Option<Direction> {
        if !self.bound {
            return None;
        }
        if self.is_throttled(sample.at) {
            trace!(at = sample.at, "scroll sample throttled");
            return None;
        }

        let overdue = match self.pending {
            Some(buffered) if sample.at >= buffered.at.saturating_add(SIGNAL_DEBOUNCE_MS) => {
                self.process(buffered, buffered.at.saturating_add(SIGNAL_DEBOUNCE_MS))
            }
            _ => None,
        };

        // An emission just now may throttle this very sample.
        if overdue.is_some() && self.is_throttled(sample.at) {
            return overdue;
        }

        self.pending = Some(sample);
        overdue
    }

    /// Feed a wheel delta as a sample relative to the newest known position.
    pub fn on_wheel(&mut self, delta: f64, at: Millis) -> Option<Direction> {
        let base = self.pending.map(|p| p.position).unwrap_or(self.last_offset);
        self.on_raw_event(UserScrollSample::new(base + delta, at))
    }

    /// Process the buffered sample if its quiet window has elapsed.
    pub fn poll(&mut self, now: Millis) -> Option<Direction> {
        match self.pending {
            Some(buffered) if now >= buffered.at.saturating_add(SIGNAL_DEBOUNCE_MS) => {
                self.process(buffered, now)
            }
            _ => None,
        }
    }

    fn is_throttled(&self, at: Millis) -> bool {
        self.last_processed
            .is_some_and(|last| at < last.saturating_add(SIGNAL_THROTTLE_MS))
    }

    fn process(&mut self, sample: UserScrollSample, at: Millis) -> Option<Direction> {
        self.pending = None;
        let delta = sample.position - self.last_offset;
        if delta.abs() <= SIGNAL_THRESHOLD_PX {
            trace!(delta, "scroll delta below threshold");
            return None;
        }

        let direction = if delta > 0.0 { Direction::Down } else { Direction::Up };
        self.last_offset = sample.position;
        self.last_processed = Some(at);
        Some(direction)
    }
}
