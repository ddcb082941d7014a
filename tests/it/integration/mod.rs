//! Integration tests for the auto-scroll controller.
//!
//! These drive whole sessions through the timer queue: machine, scheduler,
//! signal pipeline and collaborators together.

mod lifecycle_tests;
mod recovery_tests;
