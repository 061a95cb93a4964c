//! Error types for chat command handling

use thiserror::Error;

use crate::playback::PlaybackError;

#[derive(Debug, Error)]
pub enum CommandError {
    #[error("invalid quoting in command")]
    InvalidQuoting,

    /// Rendered clap message (usage errors and help output)
    #[error("{0}")]
    Parse(String),

    #[error("no telemetry token is linked to you")]
    NoLinkedToken,

    #[error(transparent)]
    Playback(#[from] PlaybackError),
}
