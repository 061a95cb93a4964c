//! Telemetry capture replay
//!
//! Feeds a JSON-lines capture (one game-state payload per line) through the
//! cue service. With a speed above zero the game clock deltas between lines
//! are slept, so cues come out at the pace they would in a live match.

use std::path::{Path, PathBuf};
use std::time::Duration;

use thiserror::Error;
use tokio::io::{AsyncBufReadExt, BufReader};

use runecall_core::{CueService, PlayerFactory, TelemetrySnapshot, TrackLoader};

#[derive(Debug, Error)]
pub enum ReplayError {
    #[error("failed to read telemetry capture {path:?}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ReplaySummary {
    pub lines: usize,
    /// Payloads usable by the scheduler
    pub snapshots: usize,
    /// Incomplete or paused payloads
    pub dropped: usize,
    /// Lines that are not valid JSON
    pub malformed: usize,
    /// Cues handed to a playback queue
    pub cues: usize,
    /// Cues that failed to play
    pub failed: usize,
}

/// Slowest pacing accepted; anything between zero and this is clamped up
pub const MIN_SPEED: f32 = 0.01;

/// Maps game clock progress to wall time
#[derive(Debug)]
pub struct ReplayClock {
    /// 1.0 = realtime, 0.0 = instant
    speed: f32,
    current: Option<i64>,
}

impl ReplayClock {
    pub fn new(speed: f32) -> Self {
        let speed = if speed > 0.0 { speed.max(MIN_SPEED) } else { 0.0 };
        Self {
            speed,
            current: None,
        }
    }

    pub fn speed(&self) -> f32 {
        self.speed
    }

    pub fn instant() -> Self {
        Self::new(0.0)
    }

    pub fn is_instant(&self) -> bool {
        self.speed == 0.0
    }

    /// Wall time to wait before a payload at `clock_time`. Clocks that jump
    /// backwards (a new match) don't wait.
    pub fn delay_until(&self, clock_time: i64) -> Duration {
        match self.current {
            Some(current) if !self.is_instant() && clock_time > current => {
                let secs = clock_time.saturating_sub(current) as f32 / self.speed;
                Duration::try_from_secs_f32(secs).unwrap_or(Duration::MAX)
            }
            _ => Duration::ZERO,
        }
    }

    pub async fn advance_to(&mut self, clock_time: i64) {
        let delay = self.delay_until(clock_time);
        if !delay.is_zero() {
            tokio::time::sleep(delay).await;
        }
        self.current = Some(clock_time);
    }
}

pub async fn replay_capture<F, L>(
    path: &Path,
    service: &CueService<F, L>,
    speed: f32,
) -> Result<ReplaySummary, ReplayError>
where
    F: PlayerFactory,
    L: TrackLoader<Track = <F::Player as runecall_core::AudioPlayer>::Track>,
{
    let read_error = |source| ReplayError::Read {
        path: path.to_path_buf(),
        source,
    };
    let file = tokio::fs::File::open(path).await.map_err(read_error)?;
    let mut lines = BufReader::new(file).lines();
    let mut clock = ReplayClock::new(speed);
    let mut summary = ReplaySummary::default();

    while let Some(line) = lines.next_line().await.map_err(read_error)? {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        summary.lines += 1;

        let snapshot = match TelemetrySnapshot::from_json(line) {
            Ok(Some(snapshot)) => snapshot,
            Ok(None) => {
                summary.dropped += 1;
                continue;
            }
            Err(e) => {
                tracing::debug!(line = summary.lines, error = %e, "Skipping malformed payload");
                summary.malformed += 1;
                continue;
            }
        };
        summary.snapshots += 1;
        clock.advance_to(snapshot.clock_time).await;

        match service.ingest_snapshot(&snapshot) {
            Ok(Some(_)) => summary.cues += 1,
            Ok(None) => {}
            Err(e) => {
                tracing::warn!(
                    token = %snapshot.token,
                    clock = snapshot.clock_time,
                    error = %e,
                    "Cue failed to play"
                );
                summary.failed += 1;
            }
        }
    }

    tracing::info!(?summary, path = ?path, "Replay finished");
    Ok(summary)
}
