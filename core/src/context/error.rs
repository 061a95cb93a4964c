//! Error types for context operations

use thiserror::Error;

use crate::cue::CueError;
use crate::playback::PlaybackError;

/// Errors during configuration operations
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to load configuration")]
    Load(#[source] confy::ConfyError),

    #[error("failed to save configuration")]
    Save(#[source] confy::ConfyError),

    #[error("invalid scheduler settings")]
    InvalidSchedule(#[from] CueError),

    #[error("invalid cue sound settings")]
    InvalidCue(#[source] PlaybackError),

    #[error("invalid playback defaults")]
    InvalidPlaybackDefaults(#[source] PlaybackError),

    #[error("token '{token}' is not linked")]
    TokenNotLinked { token: String },
}
