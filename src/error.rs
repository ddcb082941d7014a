//! Error types for the auto-scroll controller.
//!
//! None of these cross the host boundary as failures: the session logs them
//! and settles the machine into a safe state. They exist so internal code can
//! use `?` and so log lines carry a uniform shape.

use crate::machine::ScrollState;
use thiserror::Error;

/// Errors raised inside the controller
#[derive(Error, Debug)]
pub enum ScrollError {
    /// Requested edge is not in the transition matrix
    #[error("transition {from} -> {to} is not allowed")]
    RejectedTransition { from: ScrollState, to: ScrollState },

    /// Requested edge is valid but the transition lock deferred it
    #[error("transition to {to} deferred by transition lock")]
    LockedDeferral { to: ScrollState },

    /// A state-entry side effect failed
    #[error("side effect on entering {state} failed: {source}")]
    SideEffect {
        state: ScrollState,
        #[source]
        source: anyhow::Error,
    },

    /// A scheduled tick failed
    #[error("scroll tick failed: {0}")]
    Scheduler(#[source] anyhow::Error),

    /// `validate()` found the controller in an inconsistent shape
    #[error("invariant violated: {0}")]
    InvariantViolation(String),

    /// Delivering a notification failed
    #[error("notification failed: {0}")]
    Notify(#[source] anyhow::Error),

    /// Generic error message
    #[error("{0}")]
    Other(String),
}

/// Result type alias for controller operations
pub type ScrollResult<T> = Result<T, ScrollError>;

impl From<String> for ScrollError {
    fn from(s: String) -> Self {
        ScrollError::Other(s)
    }
}

impl From<&str> for ScrollError {
    fn from(s: &str) -> Self {
        ScrollError::Other(s.to_string())
    }
}

/// Errors from loading or saving settings
#[derive(Error, Debug)]
pub enum SettingsError {
    /// IO error from std::io
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON error from serde_json
    #[error("JSON parse error: {0}")]
    Json(#[from] serde_json::Error),

    /// Persisting the temp file failed
    #[error("could not persist settings: {0}")]
    Persist(#[from] tempfile::PersistError),

    /// A field holds a value the controller cannot use
    #[error("invalid setting `{field}`: {reason}")]
    Invalid { field: &'static str, reason: String },
}
