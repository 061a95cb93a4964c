//! Game-state telemetry
//!
//! The game client posts its state-integration payload on every tick. Only the
//! handful of fields the cue scheduler needs are modelled here; everything else
//! in the payload is ignored by serde.

use serde::Deserialize;

/// A validated telemetry update for one identity.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TelemetrySnapshot {
    pub token: String,
    pub match_id: String,
    /// Game clock in seconds. Negative during the pre-game countdown.
    pub clock_time: i64,
    pub is_paused: bool,
}

impl TelemetrySnapshot {
    pub fn new(token: impl Into<String>, match_id: impl Into<String>, clock_time: i64) -> Self {
        Self {
            token: token.into(),
            match_id: match_id.into(),
            clock_time,
            is_paused: false,
        }
    }

    pub fn paused(mut self, is_paused: bool) -> Self {
        self.is_paused = is_paused;
        self
    }

    /// Parse a raw payload and keep it only if it is usable by the scheduler.
    pub fn from_json(raw: &str) -> Result<Option<Self>, serde_json::Error> {
        let payload: GameStatePayload = serde_json::from_str(raw)?;
        Ok(payload.into_snapshot())
    }
}

#[derive(Debug, Default, Deserialize)]
pub struct GameStatePayload {
    #[serde(default)]
    pub auth: Option<AuthSection>,
    #[serde(default)]
    pub map: Option<MapSection>,
}

#[derive(Debug, Default, Deserialize)]
pub struct AuthSection {
    #[serde(default)]
    pub token: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct MapSection {
    #[serde(default)]
    pub matchid: Option<String>,
    #[serde(default)]
    pub clock_time: Option<i64>,
    #[serde(default)]
    pub paused: Option<bool>,
}

impl GameStatePayload {
    /// Drop payloads that are incomplete (menus, spectating, no auth block) or
    /// taken while the game is paused.
    pub fn into_snapshot(self) -> Option<TelemetrySnapshot> {
        let token = self.auth?.token.filter(|t| !t.is_empty())?;
        let map = self.map?;
        let match_id = map.matchid.filter(|m| !m.is_empty())?;
        let clock_time = map.clock_time?;
        if map.paused.unwrap_or(false) {
            return None;
        }

        Some(TelemetrySnapshot {
            token,
            match_id,
            clock_time,
            is_paused: false,
        })
    }
}
