//! Controller-wide constants.
//!
//! Centralizes the timing windows and geometry tolerances so the state
//! machine, scheduler and signal pipeline agree on the same numbers.
//! All durations are milliseconds on the session clock.

use crate::timers::Millis;

// ============================================================================
// Transition Lock & History
// ============================================================================

/// Cooldown after an applied transition during which requests are deferred
pub const TRANSITION_LOCK_MS: Millis = 150;

/// Maximum transition records kept for diagnostics
pub const MAX_HISTORY_STATES: usize = 50;

// ============================================================================
// Scheduler
// ============================================================================

/// Lower bound of the jittered delay between ticks
pub const MIN_TICK_DELAY_MS: Millis = 100;

/// Upper bound (inclusive) of the jittered delay between ticks
pub const MAX_TICK_DELAY_MS: Millis = 1000;

/// Settling delay before the first tick after resuming from a pause
pub const RESUME_SETTLE_MS: Millis = 150;

/// Hard ceiling on ticks per armed run
pub const MAX_TICKS_PER_RUN: u32 = 10_000;

/// Delay between accepting the restart offer and restarting from the top
pub const RESTART_FROM_TOP_DELAY_MS: Millis = 1000;

/// Delay before auto-starting on page entry
pub const AUTO_START_DELAY_MS: Millis = 1000;

// ============================================================================
// User Signal Pipeline
// ============================================================================

/// Raw events closer than this to the last processed event are dropped
pub const SIGNAL_THROTTLE_MS: Millis = 50;

/// Quiet window a buffered raw event must survive before it is processed
pub const SIGNAL_DEBOUNCE_MS: Millis = 30;

/// Minimum offset change (exclusive) for a processed event to count
pub const SIGNAL_THRESHOLD_PX: f64 = 20.0;

// ============================================================================
// Bottom Detection
// ============================================================================

/// Distance from the end of content that still counts as "at the bottom"
pub const NEAR_BOTTOM_TOLERANCE_PX: f64 = 150.0;

/// The view must have scrolled past this offset before bottom is reported
pub const MIN_SCROLLED_PX: f64 = 300.0;

/// Content must be this many viewports tall before bottom is reported
pub const MIN_PAGE_LENGTH_RATIO: f64 = 1.5;

// ============================================================================
// UI
// ============================================================================

/// Status panel refreshes are coalesced into one per window
pub const STATUS_REFRESH_THROTTLE_MS: Millis = 50;

/// Default pixel distance of one tick
pub const DEFAULT_SCROLL_STEP_PX: f64 = 300.0;
