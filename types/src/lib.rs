//! Shared configuration types for runecall
//!
//! This crate contains serializable configuration types that are shared between
//! the cue engine (runecall-core) and the interactive host (runecall-cli).
//! Persistence lives in runecall-core behind the `AppConfigExt` trait.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

fn default_period_secs() -> u32 {
    300
}

fn default_warning_secs() -> u32 {
    15
}

fn default_advance_guard_secs() -> u32 {
    5
}

fn default_volume() -> u8 {
    100
}

fn default_rate() -> u16 {
    100
}

fn default_cue_sound() -> String {
    "rune".to_string()
}

fn default_command_prefix() -> String {
    "!".to_string()
}

// ─────────────────────────────────────────────────────────────────────────────
// Scheduler Settings
// ─────────────────────────────────────────────────────────────────────────────

/// Timing constants for the periodic in-game event the cue warns about.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SchedulerSettings {
    /// Seconds between two occurrences of the event
    #[serde(default = "default_period_secs")]
    pub period_secs: u32,

    /// How many seconds before each occurrence the cue should fire
    #[serde(default = "default_warning_secs")]
    pub warning_secs: u32,

    /// Offset added to the clock when re-predicting after a fire, so the
    /// boundary that was just handled is skipped
    #[serde(default = "default_advance_guard_secs")]
    pub advance_guard_secs: u32,
}

impl Default for SchedulerSettings {
    fn default() -> Self {
        Self {
            period_secs: default_period_secs(),
            warning_secs: default_warning_secs(),
            advance_guard_secs: default_advance_guard_secs(),
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Cue & Playback Settings
// ─────────────────────────────────────────────────────────────────────────────

/// The sound played when the scheduler fires
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CueSettings {
    #[serde(default = "default_cue_sound")]
    pub sound_id: String,

    /// Volume level (0-100)
    #[serde(default = "default_volume")]
    pub volume: u8,

    /// Playback rate in percent (100 = normal speed)
    #[serde(default = "default_rate")]
    pub rate: u16,
}

impl Default for CueSettings {
    fn default() -> Self {
        Self {
            sound_id: default_cue_sound(),
            volume: default_volume(),
            rate: default_rate(),
        }
    }
}

/// Defaults for direct play requests that omit volume or rate
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlaybackSettings {
    #[serde(default = "default_volume")]
    pub default_volume: u8,

    #[serde(default = "default_rate")]
    pub default_rate: u16,
}

impl Default for PlaybackSettings {
    fn default() -> Self {
        Self {
            default_volume: default_volume(),
            default_rate: default_rate(),
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// App Config
// ─────────────────────────────────────────────────────────────────────────────

/// Top-level configuration.
///
/// Note: Persistence methods (load/save) are provided by runecall-core via the
/// `AppConfigExt` trait, as they require platform-specific dependencies.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub scheduler: SchedulerSettings,

    #[serde(default)]
    pub cue: CueSettings,

    #[serde(default)]
    pub playback: PlaybackSettings,

    /// Directory with user sound files. Empty means "use the platform default".
    #[serde(default)]
    pub sounds_directory: String,

    /// Identity token -> guild id. Stand-in for the account storage that
    /// normally owns this mapping.
    #[serde(default)]
    pub links: HashMap<String, u64>,

    /// Prefix that marks a chat message as a bot command
    #[serde(default = "default_command_prefix")]
    pub command_prefix: String,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            scheduler: SchedulerSettings::default(),
            cue: CueSettings::default(),
            playback: PlaybackSettings::default(),
            sounds_directory: String::new(),
            links: HashMap::new(),
            command_prefix: default_command_prefix(),
        }
    }
}

impl AppConfig {
    pub fn with_sounds_directory(sounds_directory: String) -> Self {
        Self {
            sounds_directory,
            ..Default::default()
        }
    }
}
