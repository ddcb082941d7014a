//! Failure handling: rollback, hard reset, faults and self-healing.

use crate::helpers::{last_reason, past_lock, FakePage, TestSessionBuilder};
use autoscroll::constants::MAX_TICKS_PER_RUN;
use autoscroll::{Direction, NoticeKind, ScrollState, TransitionReason};

#[test]
fn test_failed_entry_effect_rolls_back() {
    let mut session = TestSessionBuilder::new().failing_notifications(1).build();

    assert!(session.start().is_applied());
    assert_eq!(session.state(), ScrollState::Scrolling);
    session.run_pending();

    assert_eq!(session.state(), ScrollState::Stopped);
    assert_eq!(last_reason(&session), Some(TransitionReason::Rollback));
    assert!(!session.machine().is_locked());
    assert!(!session.has_scheduled_tick());
    assert!(!session.active_flag().get());
    assert_eq!(session.notifier().kinds(), vec![NoticeKind::Error]);

    // Lock was released by the rollback, so a retry applies immediately
    assert!(session.start().is_applied());
    assert!(session.has_scheduled_tick());
}

#[test]
fn test_rollback_discards_pending_request() {
    let mut session = TestSessionBuilder::new().failing_notifications(1).build();
    session.start();
    session.stop();
    assert!(session.machine().pending().is_some());

    session.run_pending();
    assert_eq!(session.state(), ScrollState::Stopped);
    assert!(session.machine().pending().is_none());

    session.advance_by(1_000);
    assert_eq!(last_reason(&session), Some(TransitionReason::Rollback));
}

#[test]
fn test_failed_pause_rolls_back_to_scrolling() {
    let mut session = TestSessionBuilder::new().build();
    session.start();
    past_lock(&mut session);

    session.notifier_mut().failures_left = 1;
    session.handle_user_signal(Direction::Up);
    session.run_pending();

    assert_eq!(session.state(), ScrollState::Scrolling);
    assert!(session.has_scheduled_tick());
    assert!(session.active_flag().get());
}

#[test]
fn test_failed_recovery_forces_reset() {
    let mut session = TestSessionBuilder::new().failing_notifications(2).build();
    session.start();
    session.run_pending();

    assert_eq!(session.state(), ScrollState::Stopped);
    assert_eq!(session.pending_timer_count(), 0);
    assert!(!session.listening());
    assert!(!session.active_flag().get());
    assert!(!session.machine().is_locked());
    assert!(session.notifier().delivered.is_empty());

    let last = session.machine().history().last().cloned().unwrap();
    assert_eq!(last.from, None);
    assert_eq!(last.reason, TransitionReason::ForceReset);
    assert_eq!(last.to_string(), "UNKNOWN -> stopped (force_reset)");

    // Usable again afterwards
    assert!(session.start().is_applied());
}

#[test]
fn test_tick_failure_stops() {
    let mut session = TestSessionBuilder::new().build();
    session.start();
    past_lock(&mut session);

    session.page_mut().fail_scrolls = true;
    session.advance_by(1_000);

    assert_eq!(session.state(), ScrollState::Stopped);
    assert_eq!(last_reason(&session), Some(TransitionReason::TickFailed));
    assert!(!session.has_scheduled_tick());

    session.advance_by(200);
    assert_eq!(session.notifier().kinds().last(), Some(&NoticeKind::Error));
}

#[test]
fn test_iteration_ceiling_stops_the_run() {
    let mut session = TestSessionBuilder::new()
        .with_page(FakePage::new(1.0e12, 800.0))
        .build();
    session.start();

    let mut guard = 0;
    while session.is_active() && guard < 20_000 {
        session.advance_by(1_000);
        guard += 1;
    }

    assert_eq!(session.state(), ScrollState::Stopped);
    assert_eq!(last_reason(&session), Some(TransitionReason::IterationLimit));
    assert_eq!(session.total_ticks(), u64::from(MAX_TICKS_PER_RUN));
    assert!(!session.has_scheduled_tick());
}

#[test]
fn test_reported_fault_waits_for_user() {
    let mut session = TestSessionBuilder::new().build();
    session.start();
    past_lock(&mut session);

    assert!(session.report_fault("content script crashed").is_applied());
    assert_eq!(session.state(), ScrollState::Error);
    assert!(!session.has_scheduled_tick());
    assert!(session.listening());
    assert!(!session.is_engaged());

    past_lock(&mut session);
    assert_eq!(session.notifier().kinds().last(), Some(&NoticeKind::Error));

    let outcome = session.handle_user_signal(Direction::Down);
    assert_eq!(
        outcome.applied().map(|t| t.reason),
        Some(TransitionReason::ErrorRecovery)
    );
    assert_eq!(session.state(), ScrollState::Stopped);
    assert!(!session.listening());
}

#[test]
fn test_fault_while_stopped_can_restart() {
    let mut session = TestSessionBuilder::new().build();
    session.report_fault("page script error");
    past_lock(&mut session);

    assert!(session.start().is_applied());
    assert_eq!(session.state(), ScrollState::Scrolling);
    assert!(session.has_scheduled_tick());
}

#[test]
fn test_validate_corrects_tampered_mirror() {
    let mut session = TestSessionBuilder::new().build();
    let flag = session.active_flag();

    flag.set(true);
    let report = session.validate();
    assert!(report.mirror_corrected);
    assert!(!flag.get());
    assert!(session.validate().is_consistent());

    session.start();
    flag.set(false);
    assert!(session.validate().mirror_corrected);
    assert!(flag.get());
}

#[test]
fn test_diagnostics_serialize() {
    let mut session = TestSessionBuilder::new().build();
    session.start();
    session.advance_by(2_000);

    let diagnostics = session.diagnostics();
    assert!(diagnostics.issues.is_empty(), "{:?}", diagnostics.issues);

    let json = serde_json::to_value(&diagnostics).unwrap();
    assert_eq!(json["state"], "scrolling");
    assert_eq!(json["description"], "Scrolling");
    assert_eq!(json["mirror_active"], true);
    assert_eq!(json["tick_outstanding"], true);
    assert_eq!(json["history"][1]["reason"], "user_start");
    assert_eq!(json["history"][1]["from"], "stopped");
    assert!(json["history"][0]["from"].is_null());
    assert!(json["history"][0].get("direction").is_none());
    assert_eq!(json["tick_timing"]["count"], session.total_ticks());
}
