//! Application configuration
//!
//! This module re-exports shared types from runecall-types and provides
//! platform-specific defaults and persistence for AppConfig.

use std::path::PathBuf;

pub use runecall_types::{AppConfig, CueSettings, PlaybackSettings, SchedulerSettings};

use super::error::ConfigError;
use crate::cue::ClockEventPredictor;
use crate::playback::{DestinationId, TrackSettings};

const APP_NAME: &str = "runecall";
const CONFIG_NAME: &str = "config";

// ─────────────────────────────────────────────────────────────────────────────
// Platform-Specific Defaults
// ─────────────────────────────────────────────────────────────────────────────

/// `<data dir>/runecall/sounds`, e.g. `~/.local/share/runecall/sounds` on Linux
pub fn default_sounds_directory() -> String {
    dirs::data_dir()
        .map(|p| p.join(APP_NAME).join("sounds"))
        .and_then(|p| p.to_str().map(String::from))
        .unwrap_or_default()
}

// ─────────────────────────────────────────────────────────────────────────────
// AppConfig Extensions
// ─────────────────────────────────────────────────────────────────────────────

/// Extension trait for AppConfig persistence and token links
pub trait AppConfigExt: Sized {
    fn load() -> Result<Self, ConfigError>;
    fn load_with_defaults() -> Self;
    fn save(&self) -> Result<(), ConfigError>;
    fn config_path() -> Option<PathBuf>;
    fn validate(&self) -> Result<(), ConfigError>;
    fn sounds_path(&self) -> PathBuf;
    fn link_token(&mut self, token: String, destination: DestinationId) -> Option<DestinationId>;
    fn unlink_token(&mut self, token: &str) -> Result<DestinationId, ConfigError>;
    fn destination_for(&self, token: &str) -> Option<DestinationId>;
}

impl AppConfigExt for AppConfig {
    fn load() -> Result<Self, ConfigError> {
        let mut config: AppConfig = confy::load(APP_NAME, CONFIG_NAME).map_err(ConfigError::Load)?;
        if config.sounds_directory.is_empty() {
            config.sounds_directory = default_sounds_directory();
        }
        config.validate()?;
        Ok(config)
    }

    /// Defaults with the platform sounds directory (used when no config file exists)
    fn load_with_defaults() -> Self {
        AppConfig::with_sounds_directory(default_sounds_directory())
    }

    fn save(&self) -> Result<(), ConfigError> {
        confy::store(APP_NAME, CONFIG_NAME, self).map_err(ConfigError::Save)
    }

    fn config_path() -> Option<PathBuf> {
        confy::get_configuration_file_path(APP_NAME, CONFIG_NAME).ok()
    }

    /// Reject settings that would make every cue or default play fail later
    fn validate(&self) -> Result<(), ConfigError> {
        ClockEventPredictor::from_settings(&self.scheduler)?;
        TrackSettings::new(u16::from(self.cue.volume), self.cue.rate)
            .map_err(ConfigError::InvalidCue)?;
        TrackSettings::new(
            u16::from(self.playback.default_volume),
            self.playback.default_rate,
        )
        .map_err(ConfigError::InvalidPlaybackDefaults)?;
        Ok(())
    }

    fn sounds_path(&self) -> PathBuf {
        PathBuf::from(&self.sounds_directory)
    }

    fn link_token(&mut self, token: String, destination: DestinationId) -> Option<DestinationId> {
        self.links.insert(token, destination.0).map(DestinationId)
    }

    fn unlink_token(&mut self, token: &str) -> Result<DestinationId, ConfigError> {
        self.links
            .remove(token)
            .map(DestinationId)
            .ok_or_else(|| ConfigError::TokenNotLinked {
                token: token.to_string(),
            })
    }

    fn destination_for(&self, token: &str) -> Option<DestinationId> {
        self.links.get(token).copied().map(DestinationId)
    }
}
