//! Per-destination playback queue
//!
//! Serializes play requests onto one player. A request starts right away when
//! the player is idle, otherwise it waits at the tail. When a track ends
//! naturally the head of the queue is started with its own volume and rate.
//!
//! `enqueue` and `on_track_finished` share one lock per destination, so the
//! "is something playing" check and the queue mutation happen atomically.

use std::collections::VecDeque;

use parking_lot::Mutex;

use super::error::PlaybackError;
use super::player::{AudioPlayer, TrackEndReason};
use super::{DestinationId, PlayerKey};

pub const MAX_VOLUME: u8 = 100;
pub const MIN_RATE: u16 = 1;
pub const MAX_RATE: u16 = 400;

/// Volume and rate applied to the player right before a track starts
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TrackSettings {
    volume: u8,
    rate: u16,
}

impl TrackSettings {
    pub fn new(volume: u16, rate: u16) -> Result<Self, PlaybackError> {
        let volume = u8::try_from(volume)
            .ok()
            .filter(|v| *v <= MAX_VOLUME)
            .ok_or(PlaybackError::InvalidVolume { volume })?;
        if !(MIN_RATE..=MAX_RATE).contains(&rate) {
            return Err(PlaybackError::InvalidRate { rate });
        }
        Ok(Self { volume, rate })
    }

    pub fn volume(&self) -> u8 {
        self.volume
    }

    pub fn rate(&self) -> u16 {
        self.rate
    }
}

impl Default for TrackSettings {
    fn default() -> Self {
        Self {
            volume: MAX_VOLUME,
            rate: 100,
        }
    }
}

/// A request waiting for the player
#[derive(Debug)]
pub struct QueuedTrack<T> {
    pub track: T,
    pub settings: TrackSettings,
}

/// Result of a successful enqueue
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EnqueueOutcome {
    /// Player was idle and started the track
    Started,
    /// Track waits behind `position` other pending tracks
    Queued { position: usize },
}

#[derive(Debug)]
struct QueueState<T> {
    pending: VecDeque<QueuedTrack<T>>,
    playing: bool,
}

/// Snapshot of a queue for status displays
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct QueueStatus {
    pub playing: bool,
    pub pending: usize,
}

pub struct PlaybackQueue<P: AudioPlayer> {
    key: PlayerKey,
    player: P,
    state: Mutex<QueueState<P::Track>>,
}

impl<P: AudioPlayer> PlaybackQueue<P> {
    pub fn new(destination: DestinationId, player: P) -> Self {
        Self::with_key(PlayerKey::new(destination, 0), player)
    }

    pub fn with_key(key: PlayerKey, player: P) -> Self {
        Self {
            key,
            player,
            state: Mutex::new(QueueState {
                pending: VecDeque::new(),
                playing: false,
            }),
        }
    }

    pub fn destination(&self) -> DestinationId {
        self.key.destination
    }

    /// Identity of the player this queue drives
    pub fn key(&self) -> PlayerKey {
        self.key
    }

    pub fn player(&self) -> &P {
        &self.player
    }

    /// Start `track` if the player is idle, otherwise append it.
    ///
    /// A rejected start is reported as [`PlaybackError::StartRejected`]; the
    /// track is dropped and the player stays idle.
    pub fn enqueue(
        &self,
        track: P::Track,
        settings: TrackSettings,
    ) -> Result<EnqueueOutcome, PlaybackError> {
        let mut state = self.state.lock();

        if state.playing {
            state.pending.push_back(QueuedTrack { track, settings });
            let position = state.pending.len();
            tracing::debug!(destination = %self.key.destination, position, "Track queued");
            return Ok(EnqueueOutcome::Queued { position });
        }

        if self.start(track, settings) {
            state.playing = true;
            Ok(EnqueueOutcome::Started)
        } else {
            Err(PlaybackError::StartRejected {
                destination: self.key.destination,
            })
        }
    }

    /// Player callback for the end of the current track.
    ///
    /// Returns true if a queued track was started.
    pub fn on_track_finished(&self, reason: TrackEndReason) -> bool {
        let mut state = self.state.lock();

        if !reason.may_start_next() {
            // A replacement already occupies the player; anything else leaves it idle
            if reason != TrackEndReason::Replaced {
                state.playing = false;
            }
            tracing::debug!(
                destination = %self.key.destination,
                %reason,
                pending = state.pending.len(),
                "Track ended without advancing"
            );
            return false;
        }

        while let Some(next) = state.pending.pop_front() {
            if self.start(next.track, next.settings) {
                state.playing = true;
                return true;
            }
            tracing::warn!(
                destination = %self.key.destination,
                "Queued track refused by player, skipping"
            );
        }

        state.playing = false;
        tracing::debug!(destination = %self.key.destination, %reason, "Queue drained, player idle");
        false
    }

    /// Stop whatever is playing. The queue itself is left untouched; the
    /// player reports the stop through `on_track_finished`.
    pub fn stop(&self) {
        self.player.stop_all_tracks();
    }

    /// Drop all pending tracks, returning how many were removed
    pub fn clear(&self) -> usize {
        let mut state = self.state.lock();
        let removed = state.pending.len();
        state.pending.clear();
        removed
    }

    pub fn status(&self) -> QueueStatus {
        let state = self.state.lock();
        QueueStatus {
            playing: state.playing,
            pending: state.pending.len(),
        }
    }

    pub fn is_playing(&self) -> bool {
        self.state.lock().playing
    }

    pub fn pending_len(&self) -> usize {
        self.state.lock().pending.len()
    }

    /// Apply settings, then start. Volume and rate must be in place before
    /// the first frame goes out.
    fn start(&self, track: P::Track, settings: TrackSettings) -> bool {
        self.player.set_volume(settings.volume);
        self.player.set_rate(settings.rate);
        let started = self.player.start_track(track);
        if started {
            tracing::info!(
                destination = %self.key.destination,
                volume = settings.volume,
                rate = settings.rate,
                "Track started"
            );
        } else {
            tracing::warn!(destination = %self.key.destination, "Player refused to start track");
        }
        started
    }
}
