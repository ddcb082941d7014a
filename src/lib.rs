//! Auto-scroll controller for long, lazily loaded pages.
//!
//! Scrolls a page in jittered steps until the bottom is reached, pauses when
//! the user scrolls up, resumes when they scroll down again, and keeps one
//! state machine as the only authority on what is happening.
//!
//! ## Layout
//!
//! - [`machine`] - States, the transition matrix, lock and history
//! - [`scheduler`] - The single outstanding scroll tick and its jitter
//! - [`signal`] - Throttle/debounce/threshold filter for user scrolling
//! - [`proximity`] - Bottom-of-page detection over [`ViewportMetrics`]
//! - [`session`] - Wires the above to a page, a notifier and a status panel
//! - [`timers`] - Virtual-clock timer queue the session runs on
//!
//! Everything is single-threaded. The host drives time with
//! [`AutoScrollSession::advance_to`] and feeds raw scroll offsets with
//! [`AutoScrollSession::on_raw_scroll`].

pub mod constants;
pub mod error;
pub mod machine;
pub mod notifications;
pub mod perf;
pub mod proximity;
pub mod scheduler;
pub mod session;
pub mod settings;
pub mod signal;
pub mod timers;

pub use error::{ScrollError, ScrollResult, SettingsError};
pub use machine::{ScrollState, Transition, TransitionOutcome, TransitionReason};
pub use notifications::{NoticeKind, Notifier, StatusPanel, StatusSnapshot, ToastManager};
pub use proximity::ViewportMetrics;
pub use session::{ActiveFlag, AutoScrollSession, Diagnostics, ValidationReport};
pub use settings::Settings;
pub use signal::Direction;
