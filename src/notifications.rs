//! User-visible feedback: notifications and the status panel.
//!
//! The controller only ever calls out through [`Notifier`] and
//! [`StatusPanel`]; it never depends on how they render. [`ToastManager`] is
//! an in-memory notifier for hosts without a UI of their own (and for tests).

use crate::machine::ScrollState;
use serde::Serialize;
use std::collections::VecDeque;
use std::time::{Duration, Instant};

/// Maximum toasts kept by [`ToastManager`]
const MAX_TOASTS: usize = 20;

/// Category of a notification
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum NoticeKind {
    Info,
    Pause,
    Resume,
    Error,
}

impl NoticeKind {
    /// How long a toast of this kind stays visible
    pub fn default_duration(self) -> Duration {
        match self {
            Self::Info | Self::Resume => Duration::from_secs(3),
            Self::Pause => Duration::from_secs(4),
            Self::Error => Duration::from_secs(5),
        }
    }

    pub fn icon(self) -> &'static str {
        match self {
            Self::Info => "ℹ",
            Self::Pause => "⏸",
            Self::Resume => "▶",
            Self::Error => "✗",
        }
    }
}

/// Fire-and-forget user notification sink.
///
/// The controller ignores failures except while running state-entry
/// effects, where a failed notification counts as a failed side effect.
pub trait Notifier {
    fn notify(&mut self, message: &str, kind: NoticeKind) -> anyhow::Result<()>;
}

/// Point-in-time view of the controller for a status display
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StatusSnapshot {
    pub state: ScrollState,
    pub description: &'static str,
    pub engaged: bool,
    pub total_ticks: u64,
    pub offset: f64,
}

/// Something that mirrors controller status in a UI. Refreshes are throttled
/// by the session.
pub trait StatusPanel {
    fn refresh(&mut self, status: &StatusSnapshot);
}

/// A panel that shows nothing
impl StatusPanel for () {
    fn refresh(&mut self, _status: &StatusSnapshot) {}
}

/// A single notification
#[derive(Debug, Clone)]
pub struct Toast {
    pub id: u64,
    pub message: String,
    pub kind: NoticeKind,
    pub created: Instant,
    pub duration: Duration,
}

impl Toast {
    pub fn new(message: impl Into<String>, kind: NoticeKind) -> Self {
        Self {
            id: 0,
            message: message.into(),
            kind,
            created: Instant::now(),
            duration: kind.default_duration(),
        }
    }

    pub fn info(message: impl Into<String>) -> Self {
        Self::new(message, NoticeKind::Info)
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self::new(message, NoticeKind::Error)
    }

    pub fn with_duration(mut self, duration: Duration) -> Self {
        self.duration = duration;
        self
    }

    pub fn is_expired(&self) -> bool {
        self.created.elapsed() >= self.duration
    }

    /// Fraction of the display time still left, from 1.0 down to 0.0
    pub fn remaining_percent(&self) -> f32 {
        if self.duration.is_zero() {
            return 0.0;
        }
        let elapsed = self.created.elapsed().as_secs_f32();
        (1.0 - elapsed / self.duration.as_secs_f32()).clamp(0.0, 1.0)
    }
}

/// Bounded in-memory notification list
#[derive(Debug, Default)]
pub struct ToastManager {
    toasts: VecDeque<Toast>,
    next_id: u64,
}

impl ToastManager {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, mut toast: Toast) -> u64 {
        toast.id = self.next_id;
        self.next_id += 1;
        if self.toasts.len() >= MAX_TOASTS {
            self.toasts.pop_front();
        }
        let id = toast.id;
        self.toasts.push_back(toast);
        id
    }

    pub fn remove(&mut self, id: u64) -> bool {
        let before = self.toasts.len();
        self.toasts.retain(|t| t.id != id);
        self.toasts.len() != before
    }

    /// Drop expired toasts. Returns how many were removed.
    pub fn prune_expired(&mut self) -> usize {
        let before = self.toasts.len();
        self.toasts.retain(|t| !t.is_expired());
        before - self.toasts.len()
    }

    pub fn toasts(&self) -> &VecDeque<Toast> {
        &self.toasts
    }

    pub fn count(&self) -> usize {
        self.toasts.len()
    }

    pub fn clear(&mut self) {
        self.toasts.clear();
    }
}

impl Notifier for ToastManager {
    fn notify(&mut self, message: &str, kind: NoticeKind) -> anyhow::Result<()> {
        self.push(Toast::new(message, kind));
        Ok(())
    }
}
