//! Page entry, teardown, reset and the status panel.

use crate::helpers::{last_reason, past_lock, user_scroll_by, TestSessionBuilder};
use autoscroll::constants::{AUTO_START_DELAY_MS, STATUS_REFRESH_THROTTLE_MS};
use autoscroll::{ScrollState, TransitionReason};

#[test]
fn test_enter_page_auto_starts_when_enabled() {
    let mut session = TestSessionBuilder::new()
        .with_settings(|s| s.auto_start_on_entry = true)
        .build();

    assert!(session.enter_page());
    session.advance_by(AUTO_START_DELAY_MS - 1);
    assert_eq!(session.state(), ScrollState::Stopped);

    session.advance_by(1);
    assert_eq!(session.state(), ScrollState::Scrolling);
    assert_eq!(last_reason(&session), Some(TransitionReason::AutoStart));
}

#[test]
fn test_enter_page_does_nothing_by_default() {
    let mut session = TestSessionBuilder::new().build();
    assert!(!session.enter_page());
    session.advance_by(5_000);
    assert_eq!(session.state(), ScrollState::Stopped);
}

#[test]
fn test_auto_start_skipped_if_already_running() {
    let mut session = TestSessionBuilder::new()
        .with_settings(|s| s.auto_start_on_entry = true)
        .build();
    session.enter_page();
    session.start();
    session.advance_by(AUTO_START_DELAY_MS);

    let starts = session
        .machine()
        .history()
        .iter()
        .filter(|t| t.to == ScrollState::Scrolling)
        .count();
    assert_eq!(starts, 1);
}

#[test]
fn test_teardown_cancels_everything() {
    let mut session = TestSessionBuilder::new().build();
    session.start();
    past_lock(&mut session);
    user_scroll_by(&mut session, -400.0);
    assert_eq!(session.state(), ScrollState::Paused);

    session.teardown();
    assert_eq!(session.state(), ScrollState::Stopped);
    assert_eq!(last_reason(&session), Some(TransitionReason::PageUnload));
    assert_eq!(session.pending_timer_count(), 0);
    assert!(!session.listening());
    assert!(!session.active_flag().get());

    let ticks = session.total_ticks();
    session.advance_by(10_000);
    assert_eq!(session.total_ticks(), ticks);
    assert_eq!(session.state(), ScrollState::Stopped);
}

#[test]
fn test_teardown_when_idle_records_nothing() {
    let mut session = TestSessionBuilder::new().build();
    session.teardown();
    assert_eq!(session.machine().history().len(), 1);
}

#[test]
fn test_reset_reinitializes() {
    let mut session = TestSessionBuilder::new().build();
    session.start();
    session.advance_by(3_000);

    session.reset();
    assert_eq!(session.state(), ScrollState::Stopped);
    assert_eq!(session.machine().history().len(), 1);
    assert_eq!(last_reason(&session), Some(TransitionReason::Initialization));
    assert_eq!(session.pending_timer_count(), 0);
    assert!(session.start().is_applied());
}

#[test]
fn test_status_panel_is_throttled() {
    let mut session = TestSessionBuilder::new().build();
    session.start();
    session.run_pending();
    assert!(session.panel().refreshes.is_empty());

    session.advance_by(STATUS_REFRESH_THROTTLE_MS);
    assert_eq!(session.panel().refreshes.len(), 1);
    let status = &session.panel().refreshes[0];
    assert_eq!(status.state, ScrollState::Scrolling);
    assert_eq!(status.description, "Scrolling");
    assert!(status.engaged);

    // Never more than one refresh per throttle window
    session.advance_by(20_000);
    let refreshes = session.panel().refreshes.len() as u64;
    assert!(refreshes <= 20_000 / STATUS_REFRESH_THROTTLE_MS + 1);
}
