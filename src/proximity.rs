//! Bottom-of-page detection.
//!
//! Reports "at the bottom" only when the view is near the end of content
//! *and* the page is long enough to have been scrolled meaningfully *and*
//! no loading indicator suggests more content is on its way.

use crate::constants::{MIN_PAGE_LENGTH_RATIO, MIN_SCROLLED_PX, NEAR_BOTTOM_TOLERANCE_PX};
use serde::Serialize;

/// Geometry and scroll access to the host page.
///
/// All queries read the page at call time; consecutive calls may disagree
/// if the page mutates in between.
pub trait ViewportMetrics {
    /// Total scrollable content height
    fn scrollable_height(&self) -> f64;

    /// Height of the visible viewport
    fn viewport_height(&self) -> f64;

    /// Current vertical scroll offset
    fn current_offset(&self) -> f64;

    /// Scroll by `px` (positive is down).
    fn scroll_by(&mut self, px: f64) -> anyhow::Result<()>;

    /// Scroll to an absolute offset.
    fn scroll_to(&mut self, offset: f64) -> anyhow::Result<()> {
        let delta = offset - self.current_offset();
        self.scroll_by(delta)
    }

    /// True while a "loading more content" indicator is visible
    fn has_visible_loading_indicator(&self) -> bool;
}

/// The individual conditions behind a bottom decision
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ProximityReport {
    pub distance_from_bottom: f64,
    pub near_bottom: bool,
    pub scrolled_enough: bool,
    pub page_long_enough: bool,
    pub loading_indicator: bool,
}

impl ProximityReport {
    pub fn is_at_bottom(&self) -> bool {
        self.near_bottom && self.scrolled_enough && self.page_long_enough && !self.loading_indicator
    }
}

/// Stateless bottom detector
#[derive(Debug, Clone, Copy, Default)]
pub struct PageProximitySensor;

impl PageProximitySensor {
    pub fn new() -> Self {
        Self
    }

    /// Evaluate every condition against the page as it is right now.
    pub fn report(&self, page: &dyn ViewportMetrics) -> ProximityReport {
        let scrollable = page.scrollable_height();
        let viewport = page.viewport_height();
        let offset = page.current_offset();
        let distance_from_bottom = scrollable - (offset + viewport);

        ProximityReport {
            distance_from_bottom,
            near_bottom: distance_from_bottom <= NEAR_BOTTOM_TOLERANCE_PX,
            scrolled_enough: offset > MIN_SCROLLED_PX,
            page_long_enough: scrollable > viewport * MIN_PAGE_LENGTH_RATIO,
            loading_indicator: page.has_visible_loading_indicator(),
        }
    }

    pub fn is_at_bottom(&self, page: &dyn ViewportMetrics) -> bool {
        self.report(page).is_at_bottom()
    }
}
