mod config;
mod error;

pub use config::{
    AppConfig, AppConfigExt, CueSettings, PlaybackSettings, SchedulerSettings,
    default_sounds_directory,
};
pub use error::ConfigError;
