pub mod commands;
pub mod context;
pub mod cue;
pub mod playback;
pub mod service;
pub mod telemetry;

// Re-exports for convenience
pub use commands::{BotCommand, CommandContext, CommandError, parse_command};
pub use context::{AppConfig, AppConfigExt, ConfigError};
pub use cue::{ClockEventPredictor, CueDecision, CueError, CueScheduler, FireReason, SkipReason};
pub use playback::{
    AudioPlayer, DestinationId, DestinationRegistry, EnqueueOutcome, PlaybackError, PlaybackQueue,
    PlayerFactory, PlayerKey, QueueStatus, TrackEndReason, TrackSettings,
};
pub use service::{CueService, DestinationResolver, TrackLoader};
pub use telemetry::{GameStatePayload, TelemetrySnapshot};
