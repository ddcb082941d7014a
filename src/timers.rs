//! Cooperative timer queue - the session's event loop.
//!
//! The host owns real time; the queue owns a virtual clock that only moves
//! when the host pumps it. Timers are tagged with a [`TimerKind`] instead of
//! carrying closures, so a fired timer can never capture stale state: the
//! session decides what to do with it by looking at *current* state.
//!
//! Timers fire in deadline order; timers sharing a deadline fire in the order
//! they were scheduled.

use crate::machine::Transition;
use std::collections::{BTreeMap, HashMap};

/// Milliseconds on the session clock
pub type Millis = u64;

/// Handle to a scheduled timer. Handles are never reused.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TimerId(u64);

/// What a timer means when it fires
#[derive(Debug, Clone, PartialEq)]
pub enum TimerKind {
    /// Next scroll tick (owned by the scheduler)
    Tick,
    /// Transition lock cooldown expired
    LockRelease,
    /// Deferred state-entry side effects of an applied transition
    EnterEffects(Transition),
    /// Debounce quiet window of the user signal pipeline elapsed
    DebounceFlush,
    /// Throttled status panel refresh
    StatusRefresh,
    /// Accepted restart-from-top offer is due
    RestartFromTop,
    /// Auto-start on page entry is due
    AutoStart,
}

/// Single-threaded timer queue with a virtual clock
#[derive(Debug, Default)]
pub struct TimerQueue {
    now: Millis,
    next_id: u64,
    queue: BTreeMap<(Millis, TimerId), TimerKind>,
    deadlines: HashMap<TimerId, Millis>,
}

impl TimerQueue {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a queue whose clock starts at `now`.
    pub fn starting_at(now: Millis) -> Self {
        Self {
            now,
            ..Self::default()
        }
    }

    /// Current time on the session clock
    #[inline]
    pub fn now(&self) -> Millis {
        self.now
    }

    /// Schedule `kind` to fire `delay` ms from now.
    pub fn schedule(&mut self, delay: Millis, kind: TimerKind) -> TimerId {
        let id = TimerId(self.next_id);
        self.next_id += 1;
        let deadline = self.now.saturating_add(delay);
        self.queue.insert((deadline, id), kind);
        self.deadlines.insert(id, deadline);
        id
    }

    /// Cancel a timer. Returns false if it already fired or was cancelled.
    pub fn cancel(&mut self, id: TimerId) -> bool {
        match self.deadlines.remove(&id) {
            Some(deadline) => self.queue.remove(&(deadline, id)).is_some(),
            None => false,
        }
    }

    pub fn is_pending(&self, id: TimerId) -> bool {
        self.deadlines.contains_key(&id)
    }

    /// Deadline of a pending timer
    pub fn deadline(&self, id: TimerId) -> Option<Millis> {
        self.deadlines.get(&id).copied()
    }

    pub fn len(&self) -> usize {
        self.queue.len()
    }

    pub fn is_empty(&self) -> bool {
        self.queue.is_empty()
    }

    /// Count pending timers matching a predicate.
    pub fn count_where(&self, pred: impl Fn(&TimerKind) -> bool) -> usize {
        self.queue.values().filter(|kind| pred(kind)).count()
    }

    /// Earliest pending deadline
    pub fn next_deadline(&self) -> Option<Millis> {
        self.queue.keys().next().map(|(deadline, _)| *deadline)
    }

    /// Pop the earliest timer due at or before `limit`, moving the clock to
    /// its deadline.
    pub fn pop_due(&mut self, limit: Millis) -> Option<(TimerId, TimerKind)> {
        let (&(deadline, id), _) = self.queue.iter().next()?;
        if deadline > limit {
            return None;
        }
        let kind = self.queue.remove(&(deadline, id))?;
        self.deadlines.remove(&id);
        self.now = self.now.max(deadline);
        Some((id, kind))
    }

    /// Move the clock forward. The clock never runs backwards.
    pub fn set_now(&mut self, now: Millis) {
        self.now = self.now.max(now);
    }

    /// Drop every pending timer. Returns how many were cancelled.
    pub fn clear(&mut self) -> usize {
        let cancelled = self.queue.len();
        self.queue.clear();
        self.deadlines.clear();
        cancelled
    }
}
