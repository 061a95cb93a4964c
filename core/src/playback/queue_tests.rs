//! Tests for PlaybackQueue hand-off and DestinationRegistry sharing

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use super::fakes::{PlayerCall, RecordingFactory, RecordingPlayer};
use super::{
    DestinationId, DestinationRegistry, EnqueueOutcome, PlaybackError, PlaybackQueue, QueueStatus,
    TrackEndReason, TrackSettings,
};

const GUILD: DestinationId = DestinationId(42);

fn settings(volume: u16, rate: u16) -> TrackSettings {
    TrackSettings::new(volume, rate).unwrap()
}

fn queue() -> (PlaybackQueue<RecordingPlayer>, RecordingPlayer) {
    let player = RecordingPlayer::new();
    (PlaybackQueue::new(GUILD, player.clone()), player)
}

// ═══════════════════════════════════════════════════════════════════════════
// Start / Queue / Hand-off
// ═══════════════════════════════════════════════════════════════════════════

#[test]
fn test_idle_player_starts_immediately_with_settings_first() {
    let (queue, player) = queue();

    let outcome = queue.enqueue("horn".to_string(), settings(40, 150)).unwrap();

    assert_eq!(outcome, EnqueueOutcome::Started);
    assert_eq!(
        player.calls(),
        vec![
            PlayerCall::Volume(40),
            PlayerCall::Rate(150),
            PlayerCall::Start("horn".to_string()),
        ]
    );
    assert!(queue.is_playing());
}

#[test]
fn test_busy_player_defers_and_hands_off_with_own_settings() {
    let (queue, player) = queue();

    queue.enqueue("a".to_string(), settings(30, 100)).unwrap();
    let outcome = queue.enqueue("b".to_string(), settings(90, 200)).unwrap();
    assert_eq!(outcome, EnqueueOutcome::Queued { position: 1 });
    assert_eq!(player.started(), vec!["a"]);

    assert!(queue.on_track_finished(TrackEndReason::Finished));

    assert_eq!(
        player.calls()[3..],
        [
            PlayerCall::Volume(90),
            PlayerCall::Rate(200),
            PlayerCall::Start("b".to_string()),
        ]
    );
    assert_eq!(queue.status(), QueueStatus { playing: true, pending: 0 });
}

#[test]
fn test_queue_preserves_fifo_order() {
    let (queue, player) = queue();
    for name in ["one", "two", "three", "four"] {
        queue.enqueue(name.to_string(), TrackSettings::default()).unwrap();
    }

    while queue.on_track_finished(TrackEndReason::Finished) {}

    assert_eq!(player.started(), vec!["one", "two", "three", "four"]);
    assert!(!queue.is_playing());
}

#[test]
fn test_finish_with_empty_queue_goes_idle() {
    let (queue, player) = queue();
    queue.enqueue("solo".to_string(), TrackSettings::default()).unwrap();

    assert!(!queue.on_track_finished(TrackEndReason::Finished));
    assert!(!queue.is_playing());

    // Next request starts right away again
    assert_eq!(
        queue.enqueue("again".to_string(), TrackSettings::default()),
        Ok(EnqueueOutcome::Started)
    );
    assert_eq!(player.started(), vec!["solo", "again"]);
}

// ═══════════════════════════════════════════════════════════════════════════
// Non-advancing Ends
// ═══════════════════════════════════════════════════════════════════════════

#[test]
fn test_stop_does_not_dequeue() {
    let (queue, player) = queue();
    queue.enqueue("a".to_string(), TrackSettings::default()).unwrap();
    queue.enqueue("b".to_string(), TrackSettings::default()).unwrap();

    queue.stop();
    assert!(!queue.on_track_finished(TrackEndReason::Stopped));

    assert_eq!(player.started(), vec!["a"]);
    assert_eq!(player.calls().last(), Some(&PlayerCall::StopAll));
    assert_eq!(queue.status(), QueueStatus { playing: false, pending: 1 });
}

#[test]
fn test_cleanup_and_replaced_do_not_dequeue() {
    let (queue, player) = queue();
    queue.enqueue("a".to_string(), TrackSettings::default()).unwrap();
    queue.enqueue("b".to_string(), TrackSettings::default()).unwrap();

    assert!(!queue.on_track_finished(TrackEndReason::Replaced));
    assert_eq!(queue.status(), QueueStatus { playing: true, pending: 1 });

    assert!(!queue.on_track_finished(TrackEndReason::Cleanup));
    assert_eq!(queue.status(), QueueStatus { playing: false, pending: 1 });
    assert_eq!(player.started(), vec!["a"]);
}

#[test]
fn test_load_failure_advances() {
    let (queue, player) = queue();
    queue.enqueue("broken".to_string(), TrackSettings::default()).unwrap();
    queue.enqueue("next".to_string(), TrackSettings::default()).unwrap();

    assert!(queue.on_track_finished(TrackEndReason::LoadFailed));
    assert_eq!(player.started(), vec!["broken", "next"]);
}

// ═══════════════════════════════════════════════════════════════════════════
// Start Failures
// ═══════════════════════════════════════════════════════════════════════════

#[test]
fn test_rejected_start_is_reported_and_not_requeued() {
    let (queue, player) = queue();
    player.refuse("bad");

    assert_eq!(
        queue.enqueue("bad".to_string(), TrackSettings::default()),
        Err(PlaybackError::StartRejected { destination: GUILD })
    );
    assert_eq!(queue.status(), QueueStatus { playing: false, pending: 0 });
}

#[test]
fn test_rejected_queued_track_is_skipped() {
    let (queue, player) = queue();
    player.refuse("bad");
    queue.enqueue("a".to_string(), TrackSettings::default()).unwrap();
    queue.enqueue("bad".to_string(), TrackSettings::default()).unwrap();
    queue.enqueue("c".to_string(), TrackSettings::default()).unwrap();

    assert!(queue.on_track_finished(TrackEndReason::Finished));
    assert_eq!(player.started(), vec!["a", "c"]);
    assert_eq!(queue.pending_len(), 0);
}

#[test]
fn test_clear_drops_pending_only() {
    let (queue, _player) = queue();
    for name in ["a", "b", "c"] {
        queue.enqueue(name.to_string(), TrackSettings::default()).unwrap();
    }

    assert_eq!(queue.clear(), 2);
    assert_eq!(queue.status(), QueueStatus { playing: true, pending: 0 });
}

// ═══════════════════════════════════════════════════════════════════════════
// Settings Validation
// ═══════════════════════════════════════════════════════════════════════════

#[test]
fn test_track_settings_bounds() {
    assert!(TrackSettings::new(0, 1).is_ok());
    assert!(TrackSettings::new(100, 400).is_ok());
    assert_eq!(
        TrackSettings::new(101, 100),
        Err(PlaybackError::InvalidVolume { volume: 101 })
    );
    assert_eq!(
        TrackSettings::new(300, 100),
        Err(PlaybackError::InvalidVolume { volume: 300 })
    );
    assert_eq!(
        TrackSettings::new(50, 0),
        Err(PlaybackError::InvalidRate { rate: 0 })
    );
    assert_eq!(
        TrackSettings::new(50, 401),
        Err(PlaybackError::InvalidRate { rate: 401 })
    );
}

// ═══════════════════════════════════════════════════════════════════════════
// Concurrency
// ═══════════════════════════════════════════════════════════════════════════

#[test]
fn test_concurrent_enqueue_starts_exactly_one() {
    let (queue, player) = queue();
    let started = AtomicUsize::new(0);

    std::thread::scope(|scope| {
        for i in 0..16 {
            let queue = &queue;
            let started = &started;
            scope.spawn(move || {
                let outcome = queue.enqueue(format!("t{i}"), TrackSettings::default()).unwrap();
                if outcome == EnqueueOutcome::Started {
                    started.fetch_add(1, Ordering::SeqCst);
                }
            });
        }
    });

    assert_eq!(started.load(Ordering::SeqCst), 1);
    assert_eq!(player.started().len(), 1);
    assert_eq!(queue.pending_len(), 15);
}

// ═══════════════════════════════════════════════════════════════════════════
// Registry
// ═══════════════════════════════════════════════════════════════════════════

#[test]
fn test_registry_creates_lazily_and_shares() {
    let factory = RecordingFactory::new();
    let registry = DestinationRegistry::new(factory.clone());
    assert!(registry.find(GUILD).is_none());

    let first = registry.get(GUILD);
    let second = registry.get(GUILD);

    assert!(Arc::ptr_eq(&first, &second));
    assert_eq!(factory.created(), 1);
    assert_eq!(registry.destinations(), vec![GUILD]);
}

#[test]
fn test_registry_destinations_are_independent() {
    let factory = RecordingFactory::new();
    let registry = DestinationRegistry::new(factory.clone());
    let other = DestinationId(7);

    registry.get(GUILD).enqueue("a".to_string(), TrackSettings::default()).unwrap();
    let outcome = registry.get(other).enqueue("b".to_string(), TrackSettings::default()).unwrap();

    assert_eq!(outcome, EnqueueOutcome::Started);
    assert_eq!(factory.player(GUILD).unwrap().started(), vec!["a"]);
    assert_eq!(factory.player(other).unwrap().started(), vec!["b"]);
}

#[test]
fn test_registry_concurrent_get_creates_one_player() {
    let factory = RecordingFactory::new();
    let registry = DestinationRegistry::new(factory.clone());

    std::thread::scope(|scope| {
        for _ in 0..8 {
            scope.spawn(|| {
                registry.get(GUILD);
            });
        }
    });

    assert_eq!(factory.created(), 1);
    assert_eq!(registry.len(), 1);
}

#[test]
fn test_registry_remove_then_get_recreates() {
    let factory = RecordingFactory::new();
    let registry = DestinationRegistry::new(factory.clone());
    registry.get(GUILD);

    assert!(registry.remove(GUILD).is_some());
    assert!(registry.is_empty());
    registry.get(GUILD);
    assert_eq!(factory.created(), 2);
}

#[test]
fn test_registry_recreated_destination_gets_new_player_key() {
    let registry = DestinationRegistry::new(RecordingFactory::new());
    let old = registry.get(GUILD).key();
    assert!(registry.find_player(old).is_some());

    registry.remove(GUILD);
    let new = registry.get(GUILD).key();

    assert_eq!(old.destination, new.destination);
    assert_ne!(old.generation, new.generation);
    assert!(registry.find_player(old).is_none());
    assert!(registry.find_player(new).is_some());
}
