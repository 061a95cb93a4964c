//! Token → guild links
//!
//! Shared, synchronously readable copy of `AppConfig::links`. The service reads
//! it on every fire; the REPL updates it together with the persisted config.

use std::collections::HashMap;
use std::sync::Arc;

use parking_lot::RwLock;

use runecall_core::{DestinationId, DestinationResolver};

#[derive(Debug, Clone, Default)]
pub struct LinkTable {
    links: Arc<RwLock<HashMap<String, DestinationId>>>,
}

impl LinkTable {
    pub fn from_config(links: &HashMap<String, u64>) -> Self {
        let links = links
            .iter()
            .map(|(token, guild)| (token.clone(), DestinationId(*guild)))
            .collect();
        Self {
            links: Arc::new(RwLock::new(links)),
        }
    }

    pub fn link(&self, token: String, destination: DestinationId) {
        self.links.write().insert(token, destination);
    }

    pub fn unlink(&self, token: &str) -> Option<DestinationId> {
        self.links.write().remove(token)
    }

    pub fn len(&self) -> usize {
        self.links.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.links.read().is_empty()
    }
}

impl DestinationResolver for LinkTable {
    fn resolve(&self, token: &str) -> Option<DestinationId> {
        self.links.read().get(token).copied()
    }
}
