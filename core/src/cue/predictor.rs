//! Clock-event prediction
//!
//! Events recur every `period` seconds of game clock. The cue should play
//! `warning` seconds ahead of each occurrence, so fire instants sit at
//! `k * period - warning`. The earliest instant ever produced is `-warning`.

use runecall_types::SchedulerSettings;

use super::error::CueError;

/// Computes fire instants for a fixed-period in-game event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ClockEventPredictor {
    period: i64,
    warning: i64,
}

impl ClockEventPredictor {
    pub fn new(period_secs: u32, warning_secs: u32) -> Result<Self, CueError> {
        if period_secs == 0 {
            return Err(CueError::ZeroPeriod);
        }
        if warning_secs >= period_secs {
            return Err(CueError::WarningExceedsPeriod {
                warning_secs,
                period_secs,
            });
        }
        Ok(Self {
            period: i64::from(period_secs),
            warning: i64::from(warning_secs),
        })
    }

    pub fn from_settings(settings: &SchedulerSettings) -> Result<Self, CueError> {
        Self::new(settings.period_secs, settings.warning_secs)
    }

    pub fn period(&self) -> i64 {
        self.period
    }

    pub fn warning(&self) -> i64 {
        self.warning
    }

    /// Next fire instant at or after `clock_time`.
    ///
    /// The boundary is the first multiple of the period that is `>= clock_time + warning`,
    /// shifted back by the warning window and clamped to `-warning`.
    pub fn next_fire(&self, clock_time: i64) -> i64 {
        let iteration = div_ceil(clock_time.saturating_add(self.warning), self.period);
        let next_fire = iteration.saturating_mul(self.period) - self.warning;
        next_fire.max(-self.warning)
    }
}

impl Default for ClockEventPredictor {
    fn default() -> Self {
        Self {
            period: 300,
            warning: 15,
        }
    }
}

/// Ceiling division for a positive divisor, correct for negative numerators.
fn div_ceil(numerator: i64, divisor: i64) -> i64 {
    let quotient = numerator / divisor;
    if numerator % divisor > 0 {
        quotient + 1
    } else {
        quotient
    }
}
