//! Audio player capabilities injected by the host
//!
//! The core never decodes or sends audio itself. A host (chat client voice
//! connection, local speaker, test double) provides one player per destination
//! through a `PlayerFactory`.

use std::fmt;
use std::str::FromStr;

use super::PlayerKey;

/// Opaque player for one destination.
///
/// # Contract
///
/// - `start_track` is called while the destination's queue lock is held.
///   Implementations must report track ends asynchronously (from their own
///   thread or task), never by calling back into the queue from inside
///   `start_track`.
/// - `stop_all_tracks` is called without the lock held; the resulting end
///   should be reported with a non-advancing reason such as
///   [`TrackEndReason::Stopped`].
pub trait AudioPlayer: Send + Sync {
    /// Decoded or decodable track handle
    type Track: Send;

    /// Volume (0-100) applied to the next started track
    fn set_volume(&self, volume: u8);

    /// Playback rate in percent applied to the next started track
    fn set_rate(&self, rate: u16);

    /// Begin playing `track`. Returns false if the backend refused.
    fn start_track(&self, track: Self::Track) -> bool;

    fn stop_all_tracks(&self);
}

/// Creates the player for a destination on first reference.
///
/// Track ends must be reported with the `key` the player was created for, so
/// ends from a player that was torn down never reach its replacement.
pub trait PlayerFactory: Send + Sync {
    type Player: AudioPlayer;

    fn create(&self, key: PlayerKey) -> Self::Player;
}

/// Why the player stopped the current track
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TrackEndReason {
    /// Played to the end
    Finished,
    /// Backend could not decode or stream the track
    LoadFailed,
    /// Stopped on request (skip, stop command)
    Stopped,
    /// Another track took over the player
    Replaced,
    /// Player torn down (disconnect, shutdown)
    Cleanup,
}

impl TrackEndReason {
    /// Whether the queue may start the next pending track
    pub fn may_start_next(&self) -> bool {
        matches!(self, TrackEndReason::Finished | TrackEndReason::LoadFailed)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            TrackEndReason::Finished => "finished",
            TrackEndReason::LoadFailed => "load-failed",
            TrackEndReason::Stopped => "stopped",
            TrackEndReason::Replaced => "replaced",
            TrackEndReason::Cleanup => "cleanup",
        }
    }
}

impl fmt::Display for TrackEndReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TrackEndReason {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "finished" => Ok(TrackEndReason::Finished),
            "load-failed" | "load_failed" => Ok(TrackEndReason::LoadFailed),
            "stopped" => Ok(TrackEndReason::Stopped),
            "replaced" => Ok(TrackEndReason::Replaced),
            "cleanup" => Ok(TrackEndReason::Cleanup),
            other => Err(format!("unknown track end reason '{other}'")),
        }
    }
}
