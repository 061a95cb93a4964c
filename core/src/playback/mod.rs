//! Playback sequencing
//!
//! One [`PlaybackQueue`] per destination serializes play requests onto that
//! destination's player; the [`DestinationRegistry`] creates them lazily.

mod error;
mod player;
mod queue;
mod registry;

#[cfg(test)]
pub(crate) mod fakes;
#[cfg(test)]
mod queue_tests;

use std::fmt;

pub use error::PlaybackError;
pub use player::{AudioPlayer, PlayerFactory, TrackEndReason};
pub use queue::{
    EnqueueOutcome, MAX_RATE, MAX_VOLUME, MIN_RATE, PlaybackQueue, QueueStatus, QueuedTrack,
    TrackSettings,
};
pub use registry::DestinationRegistry;

/// A single audio sink, e.g. the voice connection of one guild
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct DestinationId(pub u64);

impl fmt::Display for DestinationId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.0, f)
    }
}

impl From<u64> for DestinationId {
    fn from(id: u64) -> Self {
        Self(id)
    }
}

/// One player instance. Recreating a destination's queue bumps the generation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct PlayerKey {
    pub destination: DestinationId,
    pub generation: u64,
}

impl PlayerKey {
    pub fn new(destination: DestinationId, generation: u64) -> Self {
        Self {
            destination,
            generation,
        }
    }
}

impl fmt::Display for PlayerKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}#{}", self.destination, self.generation)
    }
}
