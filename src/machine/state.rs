//! Scroll states, transition reasons and the transition matrix.
//!
//! ## State Transitions
//!
//! ```text
//! Stopped   -> Scrolling, Error
//! Scrolling -> Paused, Stopped, Error
//! Paused    -> Scrolling, Stopped, Error
//! Error     -> Stopped, Scrolling
//! ```
//!
//! Anything not listed is rejected. Rollback and hard reset bypass the
//! matrix; they are recorded with their own reasons.

use crate::signal::Direction;
use crate::timers::Millis;
use serde::{Deserialize, Serialize};
use std::fmt;

/// The canonical automation state. Exactly one is active at any instant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScrollState {
    /// Not scrolling, no listeners bound
    #[default]
    Stopped,
    /// Ticks are being scheduled
    Scrolling,
    /// Interrupted by an upward user gesture; waiting for a downward one
    Paused,
    /// A fault was reported; waiting for recovery
    Error,
}

impl ScrollState {
    pub const ALL: [ScrollState; 4] = [Self::Stopped, Self::Scrolling, Self::Paused, Self::Error];

    /// States reachable from `self` through a regular transition
    pub fn allowed_targets(self) -> &'static [ScrollState] {
        match self {
            Self::Stopped => &[Self::Scrolling, Self::Error],
            Self::Scrolling => &[Self::Paused, Self::Stopped, Self::Error],
            Self::Paused => &[Self::Scrolling, Self::Stopped, Self::Error],
            Self::Error => &[Self::Stopped, Self::Scrolling],
        }
    }

    pub fn can_transition_to(self, to: ScrollState) -> bool {
        self.allowed_targets().contains(&to)
    }

    /// Human-readable label for status displays
    pub fn description(self) -> &'static str {
        match self {
            Self::Stopped => "Stopped",
            Self::Scrolling => "Scrolling",
            Self::Paused => "Paused",
            Self::Error => "Error",
        }
    }

    /// Returns true only while ticks should run
    pub fn is_active(self) -> bool {
        matches!(self, Self::Scrolling)
    }

    pub fn is_paused(self) -> bool {
        matches!(self, Self::Paused)
    }

    /// Returns true while automation is engaged, running or paused
    pub fn is_engaged(self) -> bool {
        matches!(self, Self::Scrolling | Self::Paused)
    }
}

impl fmt::Display for ScrollState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Stopped => "stopped",
            Self::Scrolling => "scrolling",
            Self::Paused => "paused",
            Self::Error => "error",
        };
        f.write_str(name)
    }
}

/// Why a transition was requested
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TransitionReason {
    Initialization,
    UserStart,
    UserStop,
    UserScrollUp,
    UserScrollDown,
    ShortcutPause,
    ShortcutResume,
    AutoStart,
    RestartFromTop,
    ReachedBottom,
    IterationLimit,
    TickFailed,
    ErrorRecovery,
    FaultReported,
    Rollback,
    ForceReset,
    PageUnload,
}

impl TransitionReason {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Initialization => "initialization",
            Self::UserStart => "user_start",
            Self::UserStop => "user_stop",
            Self::UserScrollUp => "user_scroll_up",
            Self::UserScrollDown => "user_scroll_down",
            Self::ShortcutPause => "shortcut_pause",
            Self::ShortcutResume => "shortcut_resume",
            Self::AutoStart => "auto_start",
            Self::RestartFromTop => "restart_from_top",
            Self::ReachedBottom => "reached_bottom",
            Self::IterationLimit => "iteration_limit",
            Self::TickFailed => "tick_failed",
            Self::ErrorRecovery => "error_recovery",
            Self::FaultReported => "fault_reported",
            Self::Rollback => "rollback",
            Self::ForceReset => "force_reset",
            Self::PageUnload => "page_unload",
        }
    }
}

impl fmt::Display for TransitionReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A request to move the machine to `to`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TransitionRequest {
    pub to: ScrollState,
    pub reason: TransitionReason,
    pub direction: Option<Direction>,
}

impl TransitionRequest {
    pub fn new(to: ScrollState, reason: TransitionReason) -> Self {
        Self {
            to,
            reason,
            direction: None,
        }
    }

    pub fn with_direction(mut self, direction: Direction) -> Self {
        self.direction = Some(direction);
        self
    }
}

/// A recorded state change.
///
/// `from` is `None` for synthetic records (initialization and hard reset)
/// where the previous state is not meaningful.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Transition {
    pub from: Option<ScrollState>,
    pub to: ScrollState,
    pub reason: TransitionReason,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub direction: Option<Direction>,
    pub at: Millis,
}

impl fmt::Display for Transition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match (self.from, self.reason) {
            (Some(from), _) => write!(f, "{from}")?,
            (None, TransitionReason::Initialization) => f.write_str("INIT")?,
            (None, _) => f.write_str("UNKNOWN")?,
        }
        write!(f, " -> {} ({}", self.to, self.reason)?;
        if let Some(direction) = self.direction {
            write!(f, ", {direction}")?;
        }
        f.write_str(")")
    }
}
