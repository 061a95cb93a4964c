//! Cue timing
//!
//! This module provides:
//! - **Predictor**: pure math for the next fire instant of a periodic event
//! - **Scheduler**: per-identity tracker turning telemetry into fire decisions
//! - **Test mode**: one-shot forced fires for checking a setup end to end

mod error;
mod predictor;
mod scheduler;
mod test_mode;

#[cfg(test)]
mod scheduler_tests;

pub use error::CueError;
pub use predictor::ClockEventPredictor;
pub use scheduler::{CueDecision, CueScheduler, FireReason, SkipReason};
pub use test_mode::TestModeSet;
