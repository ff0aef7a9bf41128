//! # Least Recently Used (LRU) Eviction Policy
//!
//! Reference policy for the evaluation cache. Entries are ranked purely by
//! recency: every registration and every hit moves the key to the MRU end,
//! and the victim is always the LRU end.
//!
//! ## Architecture
//!
//! ```text
//!   ┌──────────────────────────────────────────────────────────────────┐
//!   │                        LruPolicy<K>                              │
//!   │                                                                  │
//!   │   IntrusiveList<K> (recency order, nodes in a SlotArena)         │
//!   │                                                                  │
//!   │   head ──► ┌──────┐ ◄──► ┌──────┐ ◄──► ┌──────┐ ◄── tail         │
//!   │    (MRU)   │  K   │      │  K   │      │  K   │   (LRU)          │
//!   │            │id_1  │      │id_2  │      │id_3  │                  │
//!   │            └──────┘      └──────┘      └──────┘                  │
//!   │                                                                  │
//!   │   token = SlotId of the node; the cache stores it in the Entry   │
//!   └──────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Operations
//!
//! ```text
//!   new_entry(D)            record_hit(B)            evict()
//!   ═════════════           ═════════════            ═══════
//!   [A] [B] [C]             [A] [B] [C]              [A] [B] [C]
//!    │                       │                                  │
//!    ▼                       ▼                                  ▼
//!   [D] [A] [B] [C]         [B] [A] [C]              [A] [B]   → C
//! ```
//!
//! | Method        | Complexity | Description                          |
//! |---------------|------------|--------------------------------------|
//! | `new_entry`   | O(1)       | Push key at the MRU end              |
//! | `record_hit`  | O(1)       | Move node to the MRU end             |
//! | `evict`       | O(1)       | Pop the LRU end                      |
//! | `remove`      | O(1)       | Unlink node by token                 |
//!
//! Recency is a total order, so LRU never needs a tie-break.

use std::fmt;

use crate::ds::{IntrusiveList, SlotId, preallocation};
use crate::entry::{Entry, Victim};
use crate::error::ConfigError;
use crate::traits::EvictionPolicy;

/// Least-recently-used ranking over an intrusive recency list.
///
/// # Example
///
/// ```
/// use cacheeval::cache::EvaluationCache;
/// use cacheeval::policy::lru::LruPolicy;
///
/// let mut cache = EvaluationCache::new(LruPolicy::new(2));
/// cache.put(1u64, "one");
/// cache.put(2u64, "two");
/// cache.get(&1);
/// cache.put(3u64, "three");
///
/// assert!(cache.contains(&1));
/// assert!(!cache.contains(&2));
/// ```
#[derive(Debug)]
pub struct LruPolicy<K> {
    list: IntrusiveList<K>,
    capacity: usize,
}

impl<K> LruPolicy<K> {
    /// # Panics
    ///
    /// Panics if `capacity` is zero. See [`try_new`](Self::try_new).
    pub fn new(capacity: usize) -> Self {
        match Self::try_new(capacity) {
            Ok(policy) => policy,
            Err(e) => panic!("{}", e),
        }
    }

    /// # Errors
    ///
    /// Returns [`ConfigError`] if `capacity` is zero.
    pub fn try_new(capacity: usize) -> Result<Self, ConfigError> {
        if capacity == 0 {
            return Err(ConfigError::zero_capacity());
        }
        Ok(Self {
            list: IntrusiveList::with_capacity(preallocation(capacity)),
            capacity,
        })
    }

    /// Tracked keys from most to least recently used.
    pub fn recency_order(&self) -> impl Iterator<Item = &K> {
        self.list.iter()
    }

    /// Key that `evict` would return next.
    pub fn peek_victim(&self) -> Option<&K> {
        self.list.back()
    }
}

impl<K: Clone> EvictionPolicy<K> for LruPolicy<K> {
    type Token = SlotId;

    #[inline]
    fn capacity(&self) -> usize {
        self.capacity
    }

    #[inline]
    fn new_entry<V>(&mut self, key: K, value: V) -> Entry<K, V, SlotId> {
        let id = self.list.push_front(key.clone());
        Entry::new(key, value, id)
    }

    #[inline]
    fn record_hit(&mut self, token: SlotId) {
        let moved = self.list.move_to_front(token);
        debug_assert!(moved, "record_hit on untracked token {:?}", token);
    }

    #[inline]
    fn evict(&mut self) -> Option<Victim<K, SlotId>> {
        self.list
            .pop_back_entry()
            .map(|(token, key)| Victim { key, token })
    }

    #[inline]
    fn remove(&mut self, token: SlotId) {
        self.list.remove(token);
    }

    fn tracked(&self) -> usize {
        self.list.len()
    }

    fn name(&self) -> &'static str {
        "LRU"
    }
}

impl<K> fmt::Display for LruPolicy<K> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "LRU(capacity={})", self.capacity)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // ==============================================
    // Ranking
    // ==============================================

    mod ranking {
        use super::*;

        #[test]
        fn new_entries_go_to_mru_end() {
            let mut lru = LruPolicy::new(3);
            lru.new_entry("a", ());
            lru.new_entry("b", ());
            lru.new_entry("c", ());

            let order: Vec<_> = lru.recency_order().copied().collect();
            assert_eq!(order, vec!["c", "b", "a"]);
            assert_eq!(lru.peek_victim(), Some(&"a"));
        }

        #[test]
        fn hit_moves_entry_to_front() {
            let mut lru = LruPolicy::new(3);
            let a = lru.new_entry("a", ());
            lru.new_entry("b", ());
            lru.record_hit(a.token());

            assert_eq!(lru.peek_victim(), Some(&"b"));
            assert_eq!(lru.evict().map(|v| v.key), Some("b"));
            assert_eq!(lru.evict().map(|v| v.key), Some("a"));
            assert_eq!(lru.evict(), None);
        }

        #[test]
        fn evict_returns_the_entry_token() {
            let mut lru = LruPolicy::new(2);
            let a = lru.new_entry(1u64, "x");
            let victim = lru.evict().unwrap();
            assert_eq!(victim.key, 1);
            assert_eq!(victim.token, a.token());
        }

        #[test]
        fn remove_unlinks_without_disturbing_order() {
            let mut lru = LruPolicy::new(3);
            lru.new_entry(1, ());
            let b = lru.new_entry(2, ());
            lru.new_entry(3, ());
            lru.remove(b.token());

            assert_eq!(lru.tracked(), 2);
            let order: Vec<_> = lru.recency_order().copied().collect();
            assert_eq!(order, vec![3, 1]);
        }
    }

    // ==============================================
    // Construction
    // ==============================================

    mod construction {
        use super::*;

        #[test]
        fn zero_capacity_is_rejected() {
            let err = LruPolicy::<u64>::try_new(0).unwrap_err();
            assert!(err.message().contains("capacity"));
        }

        #[test]
        fn maximal_capacity_is_accepted() {
            let lru = LruPolicy::<u64>::try_new(usize::MAX).unwrap();
            assert_eq!(lru.capacity(), usize::MAX);
        }

        #[test]
        #[should_panic(expected = "capacity")]
        fn new_panics_on_zero_capacity() {
            let _ = LruPolicy::<u64>::new(0);
        }

        #[test]
        fn display_and_name() {
            let lru = LruPolicy::<u64>::new(16);
            assert_eq!(lru.to_string(), "LRU(capacity=16)");
            assert_eq!(lru.name(), "LRU");
            assert_eq!(lru.capacity(), 16);
        }
    }
}
