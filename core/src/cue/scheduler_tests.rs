//! Tests for CueScheduler decisions
//!
//! Verifies that:
//! - Cues fire once per period inside the warning window
//! - Pre-game, paused and late snapshots stay silent
//! - Test mode and match changes behave as overrides/resets

use std::sync::atomic::{AtomicUsize, Ordering};

use runecall_types::SchedulerSettings;

use crate::telemetry::TelemetrySnapshot;

use super::{ClockEventPredictor, CueDecision, CueError, CueScheduler, FireReason, SkipReason};

// ═══════════════════════════════════════════════════════════════════════════
// Test Helpers
// ═══════════════════════════════════════════════════════════════════════════

fn snap(token: &str, match_id: &str, clock_time: i64) -> TelemetrySnapshot {
    TelemetrySnapshot::new(token, match_id, clock_time)
}

/// Feed a clock sequence and return the clocks at which the cue fired
fn fires(
    scheduler: &CueScheduler,
    token: &str,
    match_id: &str,
    clocks: impl IntoIterator<Item = i64>,
) -> Vec<i64> {
    clocks
        .into_iter()
        .filter(|&clock| scheduler.ingest(&snap(token, match_id, clock)).is_fire())
        .collect()
}

// ═══════════════════════════════════════════════════════════════════════════
// Reference Scenario
// ═══════════════════════════════════════════════════════════════════════════

#[test]
fn test_reference_scenario() {
    let scheduler = CueScheduler::default();

    assert_eq!(
        scheduler.ingest(&snap("tok", "m1", 284)),
        CueDecision::Skip(SkipReason::Waiting { next_fire: 285 })
    );
    assert_eq!(scheduler.next_fire_time("tok"), Some(285));

    assert_eq!(
        scheduler.ingest(&snap("tok", "m1", 286)),
        CueDecision::Fire(FireReason::Scheduled { boundary: 285 })
    );
    assert_eq!(scheduler.next_fire_time("tok"), Some(585));

    // Silent stream until well past the next boundary
    assert_eq!(
        scheduler.ingest(&snap("tok", "m1", 601)),
        CueDecision::Skip(SkipReason::Late {
            boundary: 585,
            missed_by: 16
        })
    );
    assert_eq!(scheduler.next_fire_time("tok"), Some(885));
}

#[test]
fn test_warning_window_edge_is_inclusive() {
    let scheduler = CueScheduler::default();
    scheduler.ingest(&snap("tok", "m1", 100));

    assert_eq!(
        scheduler.ingest(&snap("tok", "m1", 300)),
        CueDecision::Fire(FireReason::Scheduled { boundary: 285 })
    );
    assert_eq!(scheduler.next_fire_time("tok"), Some(585));
}

#[test]
fn test_exact_boundary_fires() {
    let scheduler = CueScheduler::default();
    scheduler.ingest(&snap("tok", "m1", 280));

    assert!(scheduler.ingest(&snap("tok", "m1", 285)).is_fire());
    assert!(!scheduler.ingest(&snap("tok", "m1", 286)).is_fire());
}

// ═══════════════════════════════════════════════════════════════════════════
// Periodicity
// ═══════════════════════════════════════════════════════════════════════════

#[test]
fn test_fires_once_per_period_with_dense_updates() {
    let scheduler = CueScheduler::default();
    let fired = fires(&scheduler, "tok", "m1", 1..=1_500);

    assert_eq!(fired, vec![285, 585, 885, 1_185, 1_485]);
}

#[test]
fn test_fires_once_per_period_with_sparse_updates() {
    let scheduler = CueScheduler::default();
    // Every 7 seconds, never landing exactly on a boundary
    let fired = fires(&scheduler, "tok", "m1", (1..=1_200).step_by(7));

    assert_eq!(fired.len(), 4);
    for pair in fired.windows(2) {
        assert!(pair[1] - pair[0] >= 300 - 15, "fires too close: {pair:?}");
    }
    for clock in &fired {
        let offset = (clock + 15) % 300;
        assert!(offset <= 15, "fire at {clock} outside window");
    }
}

#[test]
fn test_duplicate_snapshot_does_not_refire() {
    let scheduler = CueScheduler::default();
    scheduler.ingest(&snap("tok", "m1", 10));

    assert!(scheduler.ingest(&snap("tok", "m1", 290)).is_fire());
    assert!(!scheduler.ingest(&snap("tok", "m1", 290)).is_fire());
    assert!(!scheduler.ingest(&snap("tok", "m1", 288)).is_fire());
}

#[test]
fn test_custom_period_from_settings() {
    let settings = SchedulerSettings {
        period_secs: 120,
        warning_secs: 10,
        advance_guard_secs: 5,
    };
    let scheduler = CueScheduler::from_settings(&settings).unwrap();
    let fired = fires(&scheduler, "tok", "m1", 1..=400);

    assert_eq!(fired, vec![110, 230, 350]);
}

#[test]
fn test_invalid_settings_are_rejected() {
    let settings = SchedulerSettings {
        period_secs: 0,
        ..Default::default()
    };
    assert_eq!(
        CueScheduler::from_settings(&settings).unwrap_err(),
        CueError::ZeroPeriod
    );
}

// ═══════════════════════════════════════════════════════════════════════════
// Guards
// ═══════════════════════════════════════════════════════════════════════════

#[test]
fn test_pregame_never_fires() {
    let scheduler = CueScheduler::default();
    let fired = fires(&scheduler, "tok", "m1", -90..=0);

    assert!(fired.is_empty());
    assert_eq!(
        scheduler.ingest(&snap("tok", "m1", -15)),
        CueDecision::Skip(SkipReason::PreGame)
    );
    // Pre-game snapshots do not create a schedule entry
    assert_eq!(scheduler.next_fire_time("tok"), None);
}

#[test]
fn test_paused_snapshot_is_ignored() {
    let scheduler = CueScheduler::default();
    scheduler.ingest(&snap("tok", "m1", 280));
    scheduler.enable_test_mode("tok");

    let paused = snap("tok", "m1", 290).paused(true);
    assert_eq!(scheduler.ingest(&paused), CueDecision::Skip(SkipReason::Paused));
    assert!(scheduler.is_test_mode_armed("tok"));
    assert_eq!(scheduler.next_fire_time("tok"), Some(285));
}

#[test]
fn test_late_update_is_suppressed() {
    let scheduler = CueScheduler::default();
    scheduler.ingest(&snap("tok", "m1", 200));

    let decision = scheduler.ingest(&snap("tok", "m1", 400));
    assert_eq!(
        decision,
        CueDecision::Skip(SkipReason::Late {
            boundary: 285,
            missed_by: 115
        })
    );
    // Schedule still moved on to the following occurrence
    assert_eq!(scheduler.next_fire_time("tok"), Some(585));
    assert!(scheduler.ingest(&snap("tok", "m1", 590)).is_fire());
}

// ═══════════════════════════════════════════════════════════════════════════
// Overrides & Resets
// ═══════════════════════════════════════════════════════════════════════════

#[test]
fn test_test_mode_fires_once_even_pregame() {
    let scheduler = CueScheduler::default();
    assert!(scheduler.enable_test_mode("tok"));

    assert_eq!(
        scheduler.ingest(&snap("tok", "m1", -60)),
        CueDecision::Fire(FireReason::TestMode)
    );
    assert_eq!(
        scheduler.ingest(&snap("tok", "m1", -59)),
        CueDecision::Skip(SkipReason::PreGame)
    );
}

#[test]
fn test_test_mode_does_not_touch_schedule() {
    let scheduler = CueScheduler::default();
    scheduler.ingest(&snap("tok", "m1", 100));
    scheduler.enable_test_mode("tok");

    assert_eq!(
        scheduler.ingest(&snap("tok", "m1", 101)),
        CueDecision::Fire(FireReason::TestMode)
    );
    assert_eq!(scheduler.next_fire_time("tok"), Some(285));
    assert!(!scheduler.ingest(&snap("tok", "m1", 102)).is_fire());
}

#[test]
fn test_test_mode_is_per_token() {
    let scheduler = CueScheduler::default();
    scheduler.enable_test_mode("alice");

    assert!(!scheduler.ingest(&snap("bob", "m1", 10)).is_fire());
    assert!(scheduler.ingest(&snap("alice", "m1", 10)).is_fire());
}

#[test]
fn test_match_change_reanchors_schedule() {
    let scheduler = CueScheduler::default();
    scheduler.ingest(&snap("tok", "m1", 500));
    assert_eq!(scheduler.next_fire_time("tok"), Some(585));

    // New match starts; the old pending fire time must be ignored
    assert_eq!(
        scheduler.ingest(&snap("tok", "m2", 30)),
        CueDecision::Skip(SkipReason::Waiting { next_fire: 285 })
    );
    assert_eq!(scheduler.next_fire_time("tok"), Some(285));
}

#[test]
fn test_rejoining_same_match_keeps_schedule() {
    let scheduler = CueScheduler::default();
    scheduler.ingest(&snap("tok", "m1", 200));
    assert!(scheduler.ingest(&snap("tok", "m1", 290)).is_fire());

    // Disconnect, pre-game noise from a lobby, reconnect to the same match
    scheduler.ingest(&snap("tok", "m1", -5));
    assert_eq!(scheduler.next_fire_time("tok"), Some(585));
    assert!(!scheduler.ingest(&snap("tok", "m1", 300)).is_fire());
}

#[test]
fn test_entry_created_inside_window_fires_immediately() {
    let scheduler = CueScheduler::default();
    // First sight of this token is already in the warning window of 585
    assert_eq!(
        scheduler.ingest(&snap("tok", "m1", 585)),
        CueDecision::Fire(FireReason::Scheduled { boundary: 585 })
    );
    assert_eq!(scheduler.tracked_tokens(), 1);
}

#[test]
fn test_tokens_are_listed_sorted() {
    let scheduler = CueScheduler::default();
    scheduler.ingest(&snap("zeta", "m1", 10));
    scheduler.ingest(&snap("alpha", "m2", 10));
    // Pre-game snapshots never create entries
    scheduler.ingest(&snap("lobby", "m3", -10));

    assert_eq!(scheduler.tokens(), vec!["alpha", "zeta"]);
}

// ═══════════════════════════════════════════════════════════════════════════
// Concurrency
// ═══════════════════════════════════════════════════════════════════════════

#[test]
fn test_concurrent_duplicates_fire_once() {
    let scheduler = CueScheduler::new(ClockEventPredictor::default(), 5);
    scheduler.ingest(&snap("tok", "m1", 100));
    let fired = AtomicUsize::new(0);

    std::thread::scope(|scope| {
        for _ in 0..16 {
            scope.spawn(|| {
                if scheduler.ingest(&snap("tok", "m1", 290)).is_fire() {
                    fired.fetch_add(1, Ordering::SeqCst);
                }
            });
        }
    });

    assert_eq!(fired.load(Ordering::SeqCst), 1);
}

#[test]
fn test_tokens_are_independent() {
    let scheduler = CueScheduler::default();

    std::thread::scope(|scope| {
        for i in 0..8 {
            let scheduler = &scheduler;
            scope.spawn(move || {
                let token = format!("player-{i}");
                let fired = fires(scheduler, &token, "m1", 1..=600);
                assert_eq!(fired, vec![285, 585]);
            });
        }
    });

    assert_eq!(scheduler.tracked_tokens(), 8);
}
