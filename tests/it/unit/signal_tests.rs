//! Unit tests for the user scroll signal pipeline.

use autoscroll::signal::{Direction, ScrollSignalDebouncer, UserScrollSample};

fn bound_at(offset: f64) -> ScrollSignalDebouncer {
    let mut debouncer = ScrollSignalDebouncer::new();
    debouncer.bind(offset);
    debouncer
}

#[test]
fn test_burst_collapses_to_one_direction() {
    let mut debouncer = bound_at(5_000.0);

    // 100 events, 5ms apart, each 2px further up
    let mut emitted = Vec::new();
    for i in 0..100u64 {
        let sample = UserScrollSample::new(5_000.0 - 2.0 * (i + 1) as f64, i * 5);
        emitted.extend(debouncer.on_raw_event(sample));
    }
    assert!(emitted.is_empty(), "nothing emitted while events keep coming");

    let deadline = debouncer.deadline().unwrap();
    assert_eq!(deadline, 99 * 5 + 30);
    assert_eq!(debouncer.poll(deadline), Some(Direction::Up));
    assert_eq!(debouncer.poll(deadline + 100), None);
}

#[test]
fn test_small_jitter_is_never_classified() {
    let mut debouncer = bound_at(1_000.0);
    let mut t = 0;
    for offset in [1_005.0, 995.0, 1_010.0, 990.0, 1_020.0] {
        debouncer.on_raw_event(UserScrollSample::new(offset, t));
        assert_eq!(debouncer.poll(t + 30), None);
        t += 100;
    }
    assert_eq!(debouncer.last_offset(), 1_000.0);
}

#[test]
fn test_threshold_measured_from_last_classified_offset() {
    let mut debouncer = bound_at(0.0);
    debouncer.on_raw_event(UserScrollSample::new(15.0, 0));
    assert_eq!(debouncer.poll(30), None);

    // 15 + 15 = 30px from the baseline, which did not move
    debouncer.on_raw_event(UserScrollSample::new(30.0, 100));
    assert_eq!(debouncer.poll(130), Some(Direction::Down));
}

#[test]
fn test_throttle_window_follows_last_emission() {
    let mut debouncer = bound_at(0.0);
    debouncer.on_raw_event(UserScrollSample::new(-100.0, 0));
    assert_eq!(debouncer.poll(30), Some(Direction::Up));

    // 79 is inside [30, 80)
    debouncer.on_raw_event(UserScrollSample::new(200.0, 79));
    assert_eq!(debouncer.deadline(), None);

    debouncer.on_raw_event(UserScrollSample::new(200.0, 80));
    assert_eq!(debouncer.poll(110), Some(Direction::Down));
}

fn feed_burst(debouncer: &mut ScrollSignalDebouncer, net_px: f64) -> Vec<Direction> {
    // 100 samples spread over 10ms
    let mut emitted = Vec::new();
    for i in 0..100u64 {
        let position = 1_000.0 + net_px * (i + 1) as f64 / 100.0;
        emitted.extend(debouncer.on_raw_event(UserScrollSample::new(position, i / 10)));
    }
    for now in 10..200 {
        emitted.extend(debouncer.poll(now));
    }
    emitted
}

#[test]
fn test_burst_below_threshold_emits_nothing() {
    let mut debouncer = bound_at(1_000.0);
    assert!(feed_burst(&mut debouncer, 19.0).is_empty());
}

#[test]
fn test_burst_above_threshold_emits_once() {
    let mut debouncer = bound_at(1_000.0);
    assert_eq!(feed_burst(&mut debouncer, 25.0), vec![Direction::Down]);
}
