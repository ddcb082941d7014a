//! Unit tests for bottom-of-page detection.

use crate::helpers::FakePage;
use autoscroll::proximity::PageProximitySensor;

fn at_bottom(page: &FakePage) -> bool {
    PageProximitySensor::new().is_at_bottom(page)
}

#[test]
fn test_bottom_requires_every_condition() {
    // 3000 tall, 800 viewport: max offset 2200
    let page = FakePage::new(3_000.0, 800.0).at(2_200.0);
    assert!(at_bottom(&page));

    let report = PageProximitySensor::new().report(&page);
    assert_eq!(report.distance_from_bottom, 0.0);
    assert!(report.near_bottom && report.scrolled_enough && report.page_long_enough);
}

#[test]
fn test_tolerance_boundary_is_inclusive() {
    // distance exactly 150
    let page = FakePage::new(3_000.0, 800.0).at(2_050.0);
    assert!(at_bottom(&page));

    let page = FakePage::new(3_000.0, 800.0).at(2_049.0);
    assert!(!at_bottom(&page));
}

#[test]
fn test_short_page_is_never_at_bottom() {
    // 1100 is not more than 1.5 * 800
    let page = FakePage::new(1_100.0, 800.0).at(300.5);
    let report = PageProximitySensor::new().report(&page);
    assert!(report.near_bottom);
    assert!(!report.page_long_enough);
    assert!(!report.is_at_bottom());
}

#[test]
fn test_barely_scrolled_is_not_bottom() {
    // Near the end of a long-enough page but only 300px down
    let page = FakePage::new(1_250.0, 800.0).at(300.0);
    let report = PageProximitySensor::new().report(&page);
    assert!(report.near_bottom);
    assert!(report.page_long_enough);
    assert!(!report.scrolled_enough);
    assert!(!at_bottom(&page));
}

#[test]
fn test_loading_indicator_vetoes_bottom() {
    let mut page = FakePage::new(3_000.0, 800.0).at(2_200.0);
    page.loading = true;
    assert!(!at_bottom(&page));

    page.loading = false;
    assert!(at_bottom(&page));
}
