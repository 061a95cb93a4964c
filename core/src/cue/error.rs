//! Error types for cue timing configuration

use thiserror::Error;

/// Errors while building a predictor from scheduler settings
#[derive(Debug, Error, PartialEq, Eq)]
pub enum CueError {
    #[error("event period must be at least one second")]
    ZeroPeriod,

    #[error("warning window ({warning_secs}s) must be shorter than the event period ({period_secs}s)")]
    WarningExceedsPeriod { warning_secs: u32, period_secs: u32 },
}
