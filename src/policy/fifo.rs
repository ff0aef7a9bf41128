//! First-in, first-out eviction policy.
//!
//! Victims leave in registration order; hits do not change the ranking. A
//! re-put of an existing key re-registers it, so it moves to the young end.
//!
//! ```text
//!   front (oldest) ──► [A] ◄──► [B] ◄──► [C] ◄── back (newest)
//!   evict() pops the front
//! ```

use std::fmt;

use crate::ds::{IntrusiveList, SlotId, preallocation};
use crate::entry::{Entry, Victim};
use crate::error::ConfigError;
use crate::traits::EvictionPolicy;

/// Insertion-order ranking.
#[derive(Debug)]
pub struct FifoPolicy<K> {
    queue: IntrusiveList<K>,
    capacity: usize,
}

impl<K> FifoPolicy<K> {
    /// # Panics
    ///
    /// Panics if `capacity` is zero.
    pub fn new(capacity: usize) -> Self {
        match Self::try_new(capacity) {
            Ok(policy) => policy,
            Err(e) => panic!("{}", e),
        }
    }

    pub fn try_new(capacity: usize) -> Result<Self, ConfigError> {
        if capacity == 0 {
            return Err(ConfigError::zero_capacity());
        }
        Ok(Self {
            queue: IntrusiveList::with_capacity(preallocation(capacity)),
            capacity,
        })
    }

    /// Tracked keys from oldest to newest.
    pub fn age_order(&self) -> impl Iterator<Item = &K> {
        self.queue.iter()
    }
}

impl<K: Clone> EvictionPolicy<K> for FifoPolicy<K> {
    type Token = SlotId;

    fn capacity(&self) -> usize {
        self.capacity
    }

    fn new_entry<V>(&mut self, key: K, value: V) -> Entry<K, V, SlotId> {
        let id = self.queue.push_back(key.clone());
        Entry::new(key, value, id)
    }

    #[inline]
    fn record_hit(&mut self, _token: SlotId) {}

    fn evict(&mut self) -> Option<Victim<K, SlotId>> {
        let token = self.queue.front_id()?;
        let key = self.queue.remove(token)?;
        Some(Victim { key, token })
    }

    fn remove(&mut self, token: SlotId) {
        self.queue.remove(token);
    }

    fn tracked(&self) -> usize {
        self.queue.len()
    }

    fn name(&self) -> &'static str {
        "FIFO"
    }
}

impl<K> fmt::Display for FifoPolicy<K> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "FIFO(capacity={})", self.capacity)
    }
}
