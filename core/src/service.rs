//! Cue service - the entry point hosts talk to
//!
//! Architecture:
//! - Telemetry goes through the `CueScheduler`; a fire resolves the token's
//!   destination and plays the configured cue sound
//! - Direct play requests skip the scheduler and go straight to the
//!   destination's `PlaybackQueue`
//! - Player end callbacks are routed back to the matching queue
//!
//! Token → destination lookup and sound loading are provided by the host.

use runecall_types::{AppConfig, CueSettings, PlaybackSettings};

use crate::cue::{CueDecision, CueError, CueScheduler};
use crate::playback::{
    AudioPlayer, DestinationId, DestinationRegistry, EnqueueOutcome, PlaybackError, PlayerFactory,
    PlayerKey, QueueStatus, TrackEndReason, TrackSettings,
};
use crate::telemetry::TelemetrySnapshot;

/// Finds the destination an identity's cues should play in
pub trait DestinationResolver: Send + Sync {
    fn resolve(&self, token: &str) -> Option<DestinationId>;
}

/// Turns a sound id into a track handle the player understands
pub trait TrackLoader: Send + Sync {
    type Track;

    fn load(&self, sound_id: &str) -> Result<Self::Track, PlaybackError>;
}

type TrackOf<F> = <<F as PlayerFactory>::Player as AudioPlayer>::Track;

pub struct CueService<F, L>
where
    F: PlayerFactory,
    L: TrackLoader<Track = TrackOf<F>>,
{
    scheduler: CueScheduler,
    registry: DestinationRegistry<F>,
    loader: L,
    resolver: Box<dyn DestinationResolver>,
    cue: CueSettings,
    playback: PlaybackSettings,
}

impl<F, L> CueService<F, L>
where
    F: PlayerFactory,
    L: TrackLoader<Track = TrackOf<F>>,
{
    pub fn new(
        scheduler: CueScheduler,
        factory: F,
        loader: L,
        resolver: Box<dyn DestinationResolver>,
    ) -> Self {
        Self {
            scheduler,
            registry: DestinationRegistry::new(factory),
            loader,
            resolver,
            cue: CueSettings::default(),
            playback: PlaybackSettings::default(),
        }
    }

    /// Build from configuration; fails only on invalid scheduler timing
    pub fn from_config(
        config: &AppConfig,
        factory: F,
        loader: L,
        resolver: Box<dyn DestinationResolver>,
    ) -> Result<Self, CueError> {
        let scheduler = CueScheduler::from_settings(&config.scheduler)?;
        Ok(Self::new(scheduler, factory, loader, resolver)
            .with_cue(config.cue.clone())
            .with_playback_defaults(config.playback))
    }

    pub fn with_cue(mut self, cue: CueSettings) -> Self {
        self.cue = cue;
        self
    }

    pub fn with_playback_defaults(mut self, playback: PlaybackSettings) -> Self {
        self.playback = playback;
        self
    }

    pub fn scheduler(&self) -> &CueScheduler {
        &self.scheduler
    }

    pub fn registry(&self) -> &DestinationRegistry<F> {
        &self.registry
    }

    pub fn playback_defaults(&self) -> PlaybackSettings {
        self.playback
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Telemetry
    // ─────────────────────────────────────────────────────────────────────────

    /// Feed one snapshot. Returns the playback outcome when a cue was played.
    ///
    /// Fires for tokens without a destination are dropped.
    pub fn ingest_snapshot(
        &self,
        snapshot: &TelemetrySnapshot,
    ) -> Result<Option<EnqueueOutcome>, PlaybackError> {
        let decision = self.scheduler.ingest(snapshot);
        let CueDecision::Fire(reason) = decision else {
            tracing::trace!(token = %snapshot.token, ?decision, "No cue");
            return Ok(None);
        };

        let Some(destination) = self.resolver.resolve(&snapshot.token) else {
            tracing::debug!(token = %snapshot.token, ?reason, "Cue fired for unlinked token");
            return Ok(None);
        };

        let cue = &self.cue;
        self.request_play(destination, &cue.sound_id, u16::from(cue.volume), cue.rate)
            .map(Some)
    }

    pub fn enable_test_mode(&self, token: &str) -> bool {
        self.scheduler.enable_test_mode(token)
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Playback
    // ─────────────────────────────────────────────────────────────────────────

    pub fn request_play(
        &self,
        destination: DestinationId,
        sound_id: &str,
        volume: u16,
        rate: u16,
    ) -> Result<EnqueueOutcome, PlaybackError> {
        let settings = TrackSettings::new(volume, rate)?;
        let track = self.loader.load(sound_id)?;
        let outcome = self.registry.get(destination).enqueue(track, settings)?;
        tracing::info!(%destination, sound_id, volume, rate, ?outcome, "Play request accepted");
        Ok(outcome)
    }

    /// Play with the configured default volume and rate
    pub fn request_play_default(
        &self,
        destination: DestinationId,
        sound_id: &str,
    ) -> Result<EnqueueOutcome, PlaybackError> {
        self.request_play(
            destination,
            sound_id,
            u16::from(self.playback.default_volume),
            self.playback.default_rate,
        )
    }

    /// Player callback. Ends from a player that no longer drives its
    /// destination (torn down, or replaced after a disconnect) are ignored.
    pub fn on_track_finished(&self, player: PlayerKey, reason: TrackEndReason) -> bool {
        match self.registry.find_player(player) {
            Some(queue) => queue.on_track_finished(reason),
            None => {
                tracing::debug!(%player, %reason, "Track end from a stale or unknown player");
                false
            }
        }
    }

    /// Stop the current track; pending tracks stay queued. Returns whether
    /// something was playing.
    pub fn stop(&self, destination: DestinationId) -> bool {
        match self.registry.find(destination) {
            Some(queue) => {
                let was_playing = queue.is_playing();
                queue.stop();
                was_playing
            }
            None => false,
        }
    }

    /// Drop pending tracks for a destination
    pub fn clear(&self, destination: DestinationId) -> usize {
        self.registry
            .find(destination)
            .map(|queue| queue.clear())
            .unwrap_or(0)
    }

    /// Tear down a destination after the chat client left its voice channel
    pub fn disconnect(&self, destination: DestinationId) -> bool {
        match self.registry.remove(destination) {
            Some(queue) => {
                queue.clear();
                queue.stop();
                tracing::info!(%destination, "Destination disconnected");
                true
            }
            None => false,
        }
    }

    pub fn status(&self, destination: DestinationId) -> Option<QueueStatus> {
        self.registry.find(destination).map(|queue| queue.status())
    }
}
