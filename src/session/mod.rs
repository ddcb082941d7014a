//! Per-page auto-scroll session.
//!
//! One [`AutoScrollSession`] is owned by whatever owns the page lifecycle.
//! It owns the timer queue (the page's event loop as far as the controller
//! is concerned), the state machine, the scheduler and the signal debouncer,
//! and it is the only place side effects run.
//!
//! ## Modules
//!
//! - `commands` - Host-facing operations (start/stop, toggles, raw input)
//! - `dispatch` - Pumping the timer queue and handling fired timers
//! - `effects` - Deferred state-entry effects, rollback and hard reset
//! - `lifecycle` - Page entry, teardown and re-initialization
//!
//! ## Driving a session
//!
//! ```ignore
//! let mut session = AutoScrollSession::new(Settings::load(), page, ToastManager::new());
//! session.start();
//! // host event loop:
//! session.advance_to(elapsed_ms);
//! session.on_raw_scroll(page_offset);
//! ```

mod commands;
mod dispatch;
mod effects;
mod lifecycle;

use crate::error::ScrollError;
use crate::machine::{ScrollState, ScrollStateMachine, Transition};
use crate::notifications::{Notifier, StatusPanel, StatusSnapshot};
use crate::perf::OperationStats;
use crate::proximity::{PageProximitySensor, ProximityReport, ViewportMetrics};
use crate::scheduler::ScrollScheduler;
use crate::settings::Settings;
use crate::signal::ScrollSignalDebouncer;
use crate::timers::{Millis, TimerId, TimerQueue};
use serde::Serialize;
use std::cell::Cell;
use std::rc::Rc;
use tracing::{info_span, warn};
use uuid::Uuid;

/// Shared "is scrolling" flag for UI consumers.
///
/// The state machine is authoritative: the session rewrites this flag on
/// every state change and `validate()` corrects it if someone else wrote it.
#[derive(Debug, Clone, Default)]
pub struct ActiveFlag(Rc<Cell<bool>>);

impl ActiveFlag {
    pub fn get(&self) -> bool {
        self.0.get()
    }

    pub fn set(&self, active: bool) {
        self.0.set(active);
    }
}

/// What `validate()` found and fixed
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct ValidationReport {
    /// Mirror disagreed with the machine and was overwritten
    pub mirror_corrected: bool,
    /// A tick was outstanding outside `Scrolling` and was cancelled
    pub stray_tick_cancelled: bool,
    /// `Scrolling` without an outstanding tick (logged only)
    pub missing_tick: bool,
}

impl ValidationReport {
    pub fn is_consistent(&self) -> bool {
        !(self.mirror_corrected || self.stray_tick_cancelled || self.missing_tick)
    }
}

/// Serializable snapshot for debugging a session
#[derive(Debug, Clone, Serialize)]
pub struct Diagnostics {
    pub session_id: String,
    pub now: Millis,
    pub state: ScrollState,
    pub description: &'static str,
    pub mirror_active: bool,
    pub locked: bool,
    pub pending: Option<ScrollState>,
    pub tick_outstanding: bool,
    pub ticks_this_run: u32,
    pub total_ticks: u64,
    pub since_last_transition: Millis,
    pub restart_offer: bool,
    pub proximity: ProximityReport,
    pub issues: Vec<String>,
    pub tick_timing: OperationStats,
    pub history: Vec<Transition>,
}

/// The auto-scroll controller for one page
pub struct AutoScrollSession<V, N, P = ()>
where
    V: ViewportMetrics,
    N: Notifier,
    P: StatusPanel,
{
    id: Uuid,
    span: tracing::Span,
    settings: Settings,
    timers: TimerQueue,
    machine: ScrollStateMachine,
    scheduler: ScrollScheduler,
    debouncer: ScrollSignalDebouncer,
    debounce_timer: Option<TimerId>,
    status_timer: Option<TimerId>,
    restart_timer: Option<TimerId>,
    auto_start_timer: Option<TimerId>,
    restart_offer: bool,
    /// A stop was queued behind the lock and already dropped the tick
    stop_deferred: bool,
    mirror: ActiveFlag,
    tick_timing: OperationStats,
    page: V,
    notifier: N,
    panel: P,
}

impl<V, N> AutoScrollSession<V, N, ()>
where
    V: ViewportMetrics,
    N: Notifier,
{
    /// Create a session without a status panel.
    pub fn new(settings: Settings, page: V, notifier: N) -> Self {
        Self::with_panel(settings, page, notifier, ())
    }
}

impl<V, N, P> AutoScrollSession<V, N, P>
where
    V: ViewportMetrics,
    N: Notifier,
    P: StatusPanel,
{
    /// Create a session in `Stopped`. Settings are read here and never again.
    pub fn with_panel(settings: Settings, page: V, notifier: N, panel: P) -> Self {
        let settings = match settings.validate() {
            Ok(()) => settings,
            Err(err) => {
                warn!(error = %err, "invalid settings, using defaults");
                Settings::default()
            }
        };

        let id = Uuid::new_v4();
        let timers = TimerQueue::new();
        Self {
            id,
            span: info_span!("autoscroll", session = %id),
            scheduler: ScrollScheduler::new(settings.scroll_step_pixels, settings.jitter_seed),
            machine: ScrollStateMachine::new(timers.now()),
            settings,
            timers,
            debouncer: ScrollSignalDebouncer::new(),
            debounce_timer: None,
            status_timer: None,
            restart_timer: None,
            auto_start_timer: None,
            restart_offer: false,
            stop_deferred: false,
            mirror: ActiveFlag::default(),
            tick_timing: OperationStats::new(),
            page,
            notifier,
            panel,
        }
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    /// Current time on the session clock
    pub fn now(&self) -> Millis {
        self.timers.now()
    }

    pub fn state(&self) -> ScrollState {
        self.machine.state()
    }

    pub fn is_paused(&self) -> bool {
        self.machine.is_paused()
    }

    pub fn is_active(&self) -> bool {
        self.machine.is_active()
    }

    /// Running or paused
    pub fn is_engaged(&self) -> bool {
        self.machine.is_engaged()
    }

    pub fn machine(&self) -> &ScrollStateMachine {
        &self.machine
    }

    /// Handle to the "is scrolling" mirror for UI consumers
    pub fn active_flag(&self) -> ActiveFlag {
        self.mirror.clone()
    }

    /// True while exactly the scheduler's tick is waiting to fire
    pub fn has_scheduled_tick(&self) -> bool {
        self.scheduler.has_outstanding(&self.timers)
    }

    /// Number of pending timers of any kind
    pub fn pending_timer_count(&self) -> usize {
        self.timers.len()
    }

    /// Whether user scroll listeners are attached
    pub fn listening(&self) -> bool {
        self.debouncer.is_bound()
    }

    pub fn total_ticks(&self) -> u64 {
        self.scheduler.total_ticks()
    }

    pub fn restart_offer_pending(&self) -> bool {
        self.restart_offer
    }

    pub fn page(&self) -> &V {
        &self.page
    }

    pub fn page_mut(&mut self) -> &mut V {
        &mut self.page
    }

    pub fn notifier(&self) -> &N {
        &self.notifier
    }

    pub fn notifier_mut(&mut self) -> &mut N {
        &mut self.notifier
    }

    pub fn panel(&self) -> &P {
        &self.panel
    }

    /// Current status as shown on the panel
    pub fn status(&self) -> StatusSnapshot {
        let state = self.machine.state();
        StatusSnapshot {
            state,
            description: state.description(),
            engaged: state.is_engaged(),
            total_ticks: self.scheduler.total_ticks(),
            offset: self.page.current_offset(),
        }
    }

    /// Check consistency and self-heal what policy allows.
    ///
    /// The mirror is overwritten from the machine; a stray tick outside
    /// `Scrolling` is cancelled; a missing tick while `Scrolling` is only
    /// logged, since only the scheduler may create one. A deferred stop
    /// legitimately leaves `Scrolling` without a tick until the lock expires.
    pub fn validate(&mut self) -> ValidationReport {
        let mut report = ValidationReport::default();
        let should_scroll = self.machine.is_active();

        if self.mirror.get() != should_scroll {
            let violation = ScrollError::InvariantViolation(format!(
                "mirror is {} while state is {}",
                self.mirror.get(),
                self.machine.state()
            ));
            warn!(error = %violation, "correcting mirror");
            self.mirror.set(should_scroll);
            report.mirror_corrected = true;
        }

        let has_tick = self.scheduler.has_outstanding(&self.timers);
        if !should_scroll && has_tick {
            warn!(state = %self.machine.state(), "tick scheduled outside scrolling, cancelling");
            self.scheduler.cancel(&mut self.timers);
            report.stray_tick_cancelled = true;
        } else if should_scroll && !has_tick && !self.stop_pending() {
            warn!("scrolling without a scheduled tick");
            report.missing_tick = true;
        }

        report
    }

    /// Serializable snapshot of everything worth knowing when debugging.
    pub fn diagnostics(&self) -> Diagnostics {
        let state = self.machine.state();
        Diagnostics {
            session_id: self.id.to_string(),
            now: self.timers.now(),
            state,
            description: state.description(),
            mirror_active: self.mirror.get(),
            locked: self.machine.is_locked(),
            pending: self.machine.pending().map(|r| r.to),
            tick_outstanding: self.has_scheduled_tick(),
            ticks_this_run: self.scheduler.ticks_this_run(),
            total_ticks: self.scheduler.total_ticks(),
            since_last_transition: self
                .timers
                .now()
                .saturating_sub(self.machine.last_transition_at()),
            restart_offer: self.restart_offer,
            proximity: PageProximitySensor::new().report(&self.page),
            issues: self.consistency_issues(),
            tick_timing: self.tick_timing.clone(),
            history: self.machine.history().to_vec(),
        }
    }

    fn consistency_issues(&self) -> Vec<String> {
        let mut issues = Vec::new();
        let state = self.machine.state();
        let has_tick = self.has_scheduled_tick();

        if self.mirror.get() != state.is_active() {
            issues.push(format!("mirror is {} but state is {state}", self.mirror.get()));
        }
        if state.is_active() && !has_tick && !self.stop_pending() {
            issues.push("scrolling without a scheduled tick".to_string());
        }
        if !state.is_active() && has_tick {
            issues.push(format!("tick scheduled while {state}"));
        }
        if state == ScrollState::Stopped && self.debouncer.is_bound() {
            issues.push("listeners attached while stopped".to_string());
        }
        issues
    }

    /// The tick is legitimately absent: a stop is queued, or was queued and
    /// then replaced by a later request that has not landed yet.
    fn stop_pending(&self) -> bool {
        match self.machine.pending() {
            Some(request) => self.stop_deferred || request.to == ScrollState::Stopped,
            None => false,
        }
    }
}
