//! Cue scheduler
//!
//! Keeps one schedule entry per identity token and decides, for every snapshot,
//! whether the cue for the upcoming periodic event should play now.
//!
//! # Decision order
//!
//! 1. Armed test mode fires immediately (and is consumed)
//! 2. Pre-game clock (`<= 0`) never fires
//! 3. A new match id re-anchors the schedule at the incoming clock
//! 4. Reaching the stored fire time advances the schedule, then fires only if
//!    the snapshot is still inside the warning window
//!
//! Entries are locked individually. The outer map lock is only taken to look
//! up or insert an entry, so different tokens never wait on each other's
//! decision.

use std::sync::Arc;

use hashbrown::HashMap;
use parking_lot::{Mutex, RwLock};
use runecall_types::SchedulerSettings;

use super::error::CueError;
use super::predictor::ClockEventPredictor;
use super::test_mode::TestModeSet;
use crate::telemetry::TelemetrySnapshot;

/// Why the scheduler decided to fire
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FireReason {
    /// Test mode was armed for the token
    TestMode,
    /// The snapshot landed inside the warning window of `boundary`
    Scheduled { boundary: i64 },
}

/// Why the scheduler stayed silent
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkipReason {
    Paused,
    PreGame,
    /// Next fire instant not reached yet
    Waiting { next_fire: i64 },
    /// The fire instant was passed by more than the warning window
    Late { boundary: i64, missed_by: i64 },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CueDecision {
    Fire(FireReason),
    Skip(SkipReason),
}

impl CueDecision {
    pub fn is_fire(&self) -> bool {
        matches!(self, CueDecision::Fire(_))
    }
}

/// Per-token schedule state
#[derive(Debug, Clone, PartialEq, Eq)]
struct ScheduleEntry {
    match_id: String,
    next_fire: i64,
}

#[derive(Debug)]
pub struct CueScheduler {
    predictor: ClockEventPredictor,
    advance_guard: i64,
    entries: RwLock<HashMap<String, Arc<Mutex<ScheduleEntry>>>>,
    test_mode: TestModeSet,
}

impl CueScheduler {
    pub fn new(predictor: ClockEventPredictor, advance_guard_secs: u32) -> Self {
        Self {
            predictor,
            advance_guard: i64::from(advance_guard_secs),
            entries: RwLock::new(HashMap::new()),
            test_mode: TestModeSet::new(),
        }
    }

    pub fn from_settings(settings: &SchedulerSettings) -> Result<Self, CueError> {
        let predictor = ClockEventPredictor::from_settings(settings)?;
        Ok(Self::new(predictor, settings.advance_guard_secs))
    }

    pub fn predictor(&self) -> &ClockEventPredictor {
        &self.predictor
    }

    /// Arm a one-shot forced fire for `token`. Returns false if already armed.
    pub fn enable_test_mode(&self, token: &str) -> bool {
        let armed = self.test_mode.arm(token);
        tracing::debug!(token, armed, "Test mode requested");
        armed
    }

    pub fn is_test_mode_armed(&self, token: &str) -> bool {
        self.test_mode.is_armed(token)
    }

    /// Decide whether the cue for `snapshot.token` should play now.
    pub fn ingest(&self, snapshot: &TelemetrySnapshot) -> CueDecision {
        // Paused snapshots are not valid input; leave test mode armed for the next real one
        if snapshot.is_paused {
            return CueDecision::Skip(SkipReason::Paused);
        }

        if self.test_mode.take(&snapshot.token) {
            tracing::info!(token = %snapshot.token, "Test mode consumed, firing");
            return CueDecision::Fire(FireReason::TestMode);
        }

        let clock_time = snapshot.clock_time;
        if clock_time <= 0 {
            return CueDecision::Skip(SkipReason::PreGame);
        }

        let entry = self.entry_for(snapshot);
        let mut entry = entry.lock();

        if entry.match_id != snapshot.match_id {
            let next_fire = self.predictor.next_fire(clock_time);
            tracing::debug!(
                token = %snapshot.token,
                old_match = %entry.match_id,
                new_match = %snapshot.match_id,
                next_fire,
                "Match changed, re-anchoring schedule"
            );
            entry.match_id.clone_from(&snapshot.match_id);
            entry.next_fire = next_fire;
        }

        if clock_time < entry.next_fire {
            return CueDecision::Skip(SkipReason::Waiting {
                next_fire: entry.next_fire,
            });
        }

        let boundary = entry.next_fire;
        entry.next_fire = self
            .predictor
            .next_fire(clock_time.saturating_add(self.advance_guard));

        let missed_by = clock_time - boundary;
        if missed_by <= self.predictor.warning() {
            tracing::info!(
                token = %snapshot.token,
                clock_time,
                boundary,
                next_fire = entry.next_fire,
                "Cue fired"
            );
            CueDecision::Fire(FireReason::Scheduled { boundary })
        } else {
            tracing::debug!(
                token = %snapshot.token,
                clock_time,
                boundary,
                missed_by,
                next_fire = entry.next_fire,
                "Cue window missed, skipping late fire"
            );
            CueDecision::Skip(SkipReason::Late {
                boundary,
                missed_by,
            })
        }
    }

    /// Stored fire instant for a token, if it has been seen in a running match
    pub fn next_fire_time(&self, token: &str) -> Option<i64> {
        let entries = self.entries.read();
        entries.get(token).map(|entry| entry.lock().next_fire)
    }

    /// Number of tokens with a schedule entry
    pub fn tracked_tokens(&self) -> usize {
        self.entries.read().len()
    }

    /// Tokens with a schedule entry, sorted
    pub fn tokens(&self) -> Vec<String> {
        let mut tokens: Vec<String> = self.entries.read().keys().cloned().collect();
        tokens.sort();
        tokens
    }

    /// Fetch the entry for the snapshot's token, creating it anchored at the
    /// snapshot's clock on first sight.
    fn entry_for(&self, snapshot: &TelemetrySnapshot) -> Arc<Mutex<ScheduleEntry>> {
        if let Some(entry) = self.entries.read().get(&snapshot.token) {
            return Arc::clone(entry);
        }

        let mut entries = self.entries.write();
        let entry = entries
            .entry(snapshot.token.clone())
            .or_insert_with(|| {
                let next_fire = self.predictor.next_fire(snapshot.clock_time);
                tracing::debug!(
                    token = %snapshot.token,
                    match_id = %snapshot.match_id,
                    next_fire,
                    "New schedule entry"
                );
                Arc::new(Mutex::new(ScheduleEntry {
                    match_id: snapshot.match_id.clone(),
                    next_fire,
                }))
            });
        Arc::clone(entry)
    }
}

impl Default for CueScheduler {
    fn default() -> Self {
        Self::new(ClockEventPredictor::default(), 5)
    }
}
