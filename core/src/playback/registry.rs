//! Destination registry
//!
//! Maps a destination (guild) to its playback queue and player. Queues are
//! created on first reference and shared by every caller that targets the
//! same destination. Each queue carries its own lock; the map lock is only
//! held for lookup and insertion.

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use hashbrown::HashMap;
use parking_lot::RwLock;

use super::{DestinationId, PlayerKey};
use super::player::PlayerFactory;
use super::queue::PlaybackQueue;

type SharedQueue<F> = Arc<PlaybackQueue<<F as PlayerFactory>::Player>>;

pub struct DestinationRegistry<F: PlayerFactory> {
    factory: F,
    destinations: RwLock<HashMap<DestinationId, SharedQueue<F>>>,
    /// Next player generation, shared by all destinations
    generation: AtomicU64,
}

impl<F: PlayerFactory> DestinationRegistry<F> {
    pub fn new(factory: F) -> Self {
        Self {
            factory,
            destinations: RwLock::new(HashMap::new()),
            generation: AtomicU64::new(1),
        }
    }

    /// Existing queue for `destination`, or a new one with a fresh player
    pub fn get(&self, destination: DestinationId) -> SharedQueue<F> {
        if let Some(queue) = self.destinations.read().get(&destination) {
            return Arc::clone(queue);
        }

        let mut destinations = self.destinations.write();
        let queue = destinations.entry(destination).or_insert_with(|| {
            let key = PlayerKey::new(destination, self.generation.fetch_add(1, Ordering::Relaxed));
            tracing::debug!(player = %key, "Creating player for destination");
            Arc::new(PlaybackQueue::with_key(key, self.factory.create(key)))
        });
        Arc::clone(queue)
    }

    /// Lookup without creating
    pub fn find(&self, destination: DestinationId) -> Option<SharedQueue<F>> {
        self.destinations.read().get(&destination).cloned()
    }

    /// The queue driven by exactly this player. `None` once the destination
    /// was removed or recreated with a newer player.
    pub fn find_player(&self, key: PlayerKey) -> Option<SharedQueue<F>> {
        self.find(key.destination).filter(|queue| queue.key() == key)
    }

    /// Forget a destination after the chat client disconnected from it
    pub fn remove(&self, destination: DestinationId) -> Option<SharedQueue<F>> {
        let removed = self.destinations.write().remove(&destination);
        if removed.is_some() {
            tracing::debug!(%destination, "Destination removed");
        }
        removed
    }

    pub fn destinations(&self) -> Vec<DestinationId> {
        let mut ids: Vec<_> = self.destinations.read().keys().copied().collect();
        ids.sort();
        ids
    }

    pub fn len(&self) -> usize {
        self.destinations.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.destinations.read().is_empty()
    }
}
