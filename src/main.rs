//! autoscroll-sim: drive a session against a simulated infinite feed.
//!
//! Scrolls a page that grows until its feed runs out, simulates the user
//! scrolling up and back down once, then prints the session diagnostics as
//! JSON. Log verbosity follows `RUST_LOG` (default `autoscroll=info`).

use anyhow::{Context, Result};
use autoscroll::{AutoScrollSession, NoticeKind, Notifier, Settings, ViewportMetrics};
use tracing::info;
use tracing_subscriber::EnvFilter;

/// Simulation step of the host clock
const FRAME_MS: u64 = 16;

/// Give up after this much simulated time
const MAX_SIMULATED_MS: u64 = 10 * 60 * 1000;

/// A feed that appends a batch of content whenever the reader gets close to
/// the end, until it runs out of batches.
struct SimulatedFeed {
    height: f64,
    viewport: f64,
    offset: f64,
    batches_left: u32,
    batch_height: f64,
}

impl SimulatedFeed {
    fn new() -> Self {
        Self {
            height: 6_000.0,
            viewport: 900.0,
            offset: 0.0,
            batches_left: 4,
            batch_height: 3_000.0,
        }
    }

    fn user_scroll(&mut self, px: f64) {
        self.offset = (self.offset + px).clamp(0.0, self.height - self.viewport);
    }
}

impl ViewportMetrics for SimulatedFeed {
    fn scrollable_height(&self) -> f64 {
        self.height
    }

    fn viewport_height(&self) -> f64 {
        self.viewport
    }

    fn current_offset(&self) -> f64 {
        self.offset
    }

    fn scroll_by(&mut self, px: f64) -> Result<()> {
        self.offset = (self.offset + px).min(self.height - self.viewport);
        if self.batches_left > 0 && self.height - self.offset - self.viewport < 1_000.0 {
            self.batches_left -= 1;
            self.height += self.batch_height;
        }
        Ok(())
    }

    fn has_visible_loading_indicator(&self) -> bool {
        false
    }
}

/// Prints notifications to stderr
struct ConsoleNotifier;

impl Notifier for ConsoleNotifier {
    fn notify(&mut self, message: &str, kind: NoticeKind) -> Result<()> {
        eprintln!("{} {message}", kind.icon());
        Ok(())
    }
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("autoscroll=info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let settings = Settings::load();
    let mut session = AutoScrollSession::new(settings, SimulatedFeed::new(), ConsoleNotifier);
    info!(session = %session.id(), "simulation started");

    session.start();

    // Let it run a while, then the reader scrolls up to re-read something.
    session.advance_to(5_000);
    session.page_mut().user_scroll(-400.0);
    let offset = session.page().current_offset();
    session.on_raw_scroll(offset);
    session.advance_by(100);
    info!(state = %session.state(), "after scrolling up");

    // ...and scrolls back down to carry on.
    session.advance_by(3_000);
    session.page_mut().user_scroll(200.0);
    let offset = session.page().current_offset();
    session.on_raw_scroll(offset);
    session.advance_by(100);
    info!(state = %session.state(), "after scrolling down");

    let mut now = session.now();
    while session.is_engaged() && now < MAX_SIMULATED_MS {
        now += FRAME_MS;
        session.advance_to(now);
    }
    session.run_pending();

    let report = session.validate();
    info!(consistent = report.is_consistent(), elapsed_ms = now, "simulation finished");

    let diagnostics = serde_json::to_string_pretty(&session.diagnostics())
        .context("failed to serialize diagnostics")?;
    println!("{diagnostics}");

    session.teardown();
    Ok(())
}
