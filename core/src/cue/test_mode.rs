//! One-shot test override
//!
//! Arming a token makes the very next snapshot for it fire, regardless of the
//! game clock. Consumption is a single remove under the lock, so a token armed
//! once fires at most once.

use hashbrown::HashSet;
use parking_lot::Mutex;

#[derive(Debug, Default)]
pub struct TestModeSet {
    armed: Mutex<HashSet<String>>,
}

impl TestModeSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Arm a token. Returns false if it was already armed.
    pub fn arm(&self, token: &str) -> bool {
        self.armed.lock().insert(token.to_string())
    }

    /// Disarm and report whether the token was armed.
    pub fn take(&self, token: &str) -> bool {
        self.armed.lock().remove(token)
    }

    pub fn is_armed(&self, token: &str) -> bool {
        self.armed.lock().contains(token)
    }

    pub fn len(&self) -> usize {
        self.armed.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.armed.lock().is_empty()
    }
}
