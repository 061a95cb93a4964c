//! Error types for playback requests

use thiserror::Error;

use super::DestinationId;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum PlaybackError {
    #[error("volume {volume} is out of range (0-100)")]
    InvalidVolume { volume: u16 },

    #[error("playback rate {rate}% is out of range (1-400)")]
    InvalidRate { rate: u16 },

    #[error("sound '{sound_id}' not found")]
    SoundNotFound { sound_id: String },

    #[error("failed to load sound '{sound_id}': {reason}")]
    LoadFailed { sound_id: String, reason: String },

    /// The player refused to start the track. Maps to a precondition failure
    /// for remote callers.
    #[error("player for destination {destination} refused to start the track")]
    StartRejected { destination: DestinationId },
}
