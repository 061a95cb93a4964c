//! Recording test doubles for the player capabilities

use std::sync::Arc;

use hashbrown::{HashMap, HashSet};
use parking_lot::Mutex;

use super::{AudioPlayer, DestinationId, PlayerFactory, PlayerKey};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PlayerCall {
    Volume(u8),
    Rate(u16),
    Start(String),
    StopAll,
}

/// Player that records every call and refuses tracks named in `refused`
#[derive(Debug, Clone, Default)]
pub struct RecordingPlayer {
    calls: Arc<Mutex<Vec<PlayerCall>>>,
    refused: Arc<Mutex<HashSet<String>>>,
}

impl RecordingPlayer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn calls(&self) -> Vec<PlayerCall> {
        self.calls.lock().clone()
    }

    pub fn started(&self) -> Vec<String> {
        self.calls
            .lock()
            .iter()
            .filter_map(|call| match call {
                PlayerCall::Start(name) => Some(name.clone()),
                _ => None,
            })
            .collect()
    }

    pub fn refuse(&self, track: &str) {
        self.refused.lock().insert(track.to_string());
    }
}

impl AudioPlayer for RecordingPlayer {
    type Track = String;

    fn set_volume(&self, volume: u8) {
        self.calls.lock().push(PlayerCall::Volume(volume));
    }

    fn set_rate(&self, rate: u16) {
        self.calls.lock().push(PlayerCall::Rate(rate));
    }

    fn start_track(&self, track: String) -> bool {
        if self.refused.lock().contains(&track) {
            return false;
        }
        self.calls.lock().push(PlayerCall::Start(track));
        true
    }

    fn stop_all_tracks(&self) {
        self.calls.lock().push(PlayerCall::StopAll);
    }
}

/// Factory that hands out recording players and keeps a handle to the
/// latest one per destination
#[derive(Debug, Clone, Default)]
pub struct RecordingFactory {
    players: Arc<Mutex<HashMap<DestinationId, RecordingPlayer>>>,
    created: Arc<Mutex<usize>>,
}

impl RecordingFactory {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn player(&self, destination: DestinationId) -> Option<RecordingPlayer> {
        self.players.lock().get(&destination).cloned()
    }

    pub fn created(&self) -> usize {
        *self.created.lock()
    }
}

impl PlayerFactory for RecordingFactory {
    type Player = RecordingPlayer;

    fn create(&self, key: PlayerKey) -> RecordingPlayer {
        let player = RecordingPlayer::new();
        self.players.lock().insert(key.destination, player.clone());
        *self.created.lock() += 1;
        player
    }
}
