//! Unit tests for the auto-scroll controller.

mod perf_tests;
mod proximity_tests;
mod signal_tests;
