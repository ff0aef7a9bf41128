//! # Least Frequently Used (LFU) Eviction Policy
//!
//! Ranks entries by how often they were read since registration. The victim
//! comes from the lowest-frequency bucket; inside a bucket the entry that
//! joined it first goes first.
//!
//! The most recently registered entry is passed over while anything else is
//! tracked. Without that, a newcomer alone at frequency 1 among entries that
//! were all read would be handed straight back on every retry.
//!
//! ## Architecture
//!
//! ```text
//!   ┌──────────────────────────────────────────────────────────────────────┐
//!   │                          LfuPolicy<K>                                │
//!   │                                                                      │
//!   │   nodes: SlotArena<LfuNode<K>>     token = SlotId into `nodes`       │
//!   │                                                                      │
//!   │   buckets: BTreeMap<u64, IntrusiveList<SlotId>>                      │
//!   │                                                                      │
//!   │     freq 1 ─► [C] ◄──► [D]          ← victim = front of lowest       │
//!   │     freq 3 ─► [A]                                                    │
//!   │     freq 7 ─► [B]                                                    │
//!   │                                                                      │
//!   │   LfuNode { key, freq, pos }   pos = node's SlotId inside its bucket │
//!   └──────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Operations
//!
//! | Method        | Complexity  | Description                              |
//! |---------------|-------------|------------------------------------------|
//! | `new_entry`   | O(log F)    | Append to the frequency-1 bucket         |
//! | `record_hit`  | O(log F)    | Move to the back of the `freq + 1` bucket|
//! | `evict`       | O(log F)    | Lowest bucket's front, newest passed over|
//! | `remove`      | O(log F)    | Unlink from its bucket                   |
//!
//! `F` is the number of distinct live frequencies, usually tiny.
//!
//! A re-put registers a fresh node, so an updated key restarts at frequency 1.

use std::collections::BTreeMap;
use std::fmt;

use crate::ds::{IntrusiveList, SlotArena, SlotId, preallocation};
use crate::entry::{Entry, Victim};
use crate::error::ConfigError;
use crate::traits::EvictionPolicy;

#[derive(Debug)]
struct LfuNode<K> {
    key: K,
    freq: u64,
    pos: SlotId,
}

/// Frequency-bucketed LFU with first-in tie-break.
#[derive(Debug)]
pub struct LfuPolicy<K> {
    nodes: SlotArena<LfuNode<K>>,
    buckets: BTreeMap<u64, IntrusiveList<SlotId>>,
    newest: Option<SlotId>,
    capacity: usize,
}

impl<K> LfuPolicy<K> {
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
            nodes: SlotArena::with_capacity(preallocation(capacity)),
            buckets: BTreeMap::new(),
            newest: None,
            capacity,
        })
    }

    /// Access frequency of the entry behind `token`.
    pub fn frequency(&self, token: SlotId) -> Option<u64> {
        self.nodes.get(token).map(|node| node.freq)
    }

    /// Lowest live frequency.
    pub fn min_frequency(&self) -> Option<u64> {
        self.buckets.keys().next().copied()
    }

    /// Key that `evict` would return next.
    pub fn peek_victim(&self) -> Option<&K> {
        let token = self.victim_token()?;
        self.nodes.get(token).map(|node| &node.key)
    }

    /// Lowest-ranked token, skipping the newest entry if another exists.
    fn victim_token(&self) -> Option<SlotId> {
        let mut ranked = self
            .buckets
            .values()
            .flat_map(|bucket| bucket.iter().copied());
        let first = ranked.next()?;
        if Some(first) != self.newest {
            return Some(first);
        }
        Some(ranked.next().unwrap_or(first))
    }

    fn enqueue(&mut self, token: SlotId, freq: u64) -> SlotId {
        self.buckets
            .entry(freq)
            .or_insert_with(IntrusiveList::new)
            .push_back(token)
    }

    fn dequeue(&mut self, freq: u64, pos: SlotId) {
        if let Some(bucket) = self.buckets.get_mut(&freq) {
            bucket.remove(pos);
            if bucket.is_empty() {
                self.buckets.remove(&freq);
            }
        }
    }

    #[cfg(any(test, debug_assertions))]
    pub fn debug_validate_invariants(&self) {
        let bucketed: usize = self.buckets.values().map(IntrusiveList::len).sum();
        assert_eq!(bucketed, self.nodes.len());
        for (freq, bucket) in &self.buckets {
            assert!(!bucket.is_empty(), "empty bucket {freq} left behind");
            bucket.debug_validate_invariants();
            for token in bucket.iter() {
                let node = self.nodes.get(*token).expect("bucketed token missing");
                assert_eq!(node.freq, *freq);
            }
        }
    }
}

impl<K: Clone> EvictionPolicy<K> for LfuPolicy<K> {
    type Token = SlotId;

    fn capacity(&self) -> usize {
        self.capacity
    }

    fn new_entry<V>(&mut self, key: K, value: V) -> Entry<K, V, SlotId> {
        // Placeholder position, patched once the bucket slot exists.
        let token = self.nodes.insert(LfuNode {
            key: key.clone(),
            freq: 1,
            pos: SlotId(usize::MAX),
        });
        let pos = self.enqueue(token, 1);
        if let Some(node) = self.nodes.get_mut(token) {
            node.pos = pos;
        }
        self.newest = Some(token);
        Entry::new(key, value, token)
    }

    fn record_hit(&mut self, token: SlotId) {
        let Some((freq, pos)) = self.nodes.get(token).map(|n| (n.freq, n.pos)) else {
            debug_assert!(false, "record_hit on untracked token {:?}", token);
            return;
        };
        self.dequeue(freq, pos);
        let next = freq.saturating_add(1);
        let pos = self.enqueue(token, next);
        if let Some(node) = self.nodes.get_mut(token) {
            node.freq = next;
            node.pos = pos;
        }
    }

    fn evict(&mut self) -> Option<Victim<K, SlotId>> {
        let token = self.victim_token()?;
        let node = self.nodes.remove(token)?;
        self.dequeue(node.freq, node.pos);
        if self.newest == Some(token) {
            self.newest = None;
        }
        Some(Victim {
            key: node.key,
            token,
        })
    }

    fn remove(&mut self, token: SlotId) {
        if let Some(node) = self.nodes.remove(token) {
            self.dequeue(node.freq, node.pos);
            if self.newest == Some(token) {
                self.newest = None;
            }
        }
    }

    fn tracked(&self) -> usize {
        self.nodes.len()
    }

    fn name(&self) -> &'static str {
        "LFU"
    }
}

impl<K> fmt::Display for LfuPolicy<K> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "LFU(capacity={})", self.capacity)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::EvaluationCache;

    #[test]
    fn evicts_lowest_frequency_first() {
        let mut lfu = LfuPolicy::new(4);
        let a = lfu.new_entry("a", ());
        let b = lfu.new_entry("b", ());
        lfu.new_entry("c", ());
        lfu.record_hit(a.token());
        lfu.record_hit(a.token());
        lfu.record_hit(b.token());
        lfu.new_entry("d", ());

        assert_eq!(lfu.frequency(a.token()), Some(3));
        assert_eq!(lfu.min_frequency(), Some(1));
        assert_eq!(lfu.evict().map(|v| v.key), Some("c"));
        assert_eq!(lfu.evict().map(|v| v.key), Some("b"));
        assert_eq!(lfu.evict().map(|v| v.key), Some("a"));
        assert_eq!(lfu.evict().map(|v| v.key), Some("d"));
        assert!(lfu.evict().is_none());
        lfu.debug_validate_invariants();
    }

    #[test]
    fn ties_go_to_the_first_entry_into_the_bucket() {
        let mut lfu = LfuPolicy::new(4);
        let a = lfu.new_entry(1u64, ());
        let b = lfu.new_entry(2u64, ());
        lfu.new_entry(3u64, ());
        // b reaches frequency 2 before a does.
        lfu.record_hit(b.token());
        lfu.record_hit(a.token());
        lfu.new_entry(4u64, ());

        assert_eq!(lfu.peek_victim(), Some(&3));
        assert_eq!(lfu.evict().map(|v| v.key), Some(3));
        assert_eq!(lfu.evict().map(|v| v.key), Some(2));
        assert_eq!(lfu.evict().map(|v| v.key), Some(1));
        assert_eq!(lfu.evict().map(|v| v.key), Some(4));
    }

    #[test]
    fn newest_entry_is_passed_over_while_others_exist() {
        let mut lfu = LfuPolicy::new(2);
        let a = lfu.new_entry('a', ());
        let b = lfu.new_entry('b', ());
        lfu.record_hit(a.token());
        lfu.record_hit(b.token());
        let c = lfu.new_entry('c', ());

        assert_eq!(lfu.min_frequency(), Some(1));
        assert_eq!(lfu.peek_victim(), Some(&'a'));
        assert_eq!(lfu.evict().map(|v| v.key), Some('a'));
        assert_eq!(lfu.evict().map(|v| v.key), Some('b'));
        let last = lfu.evict().unwrap();
        assert_eq!((last.key, last.token), ('c', c.token()));
        lfu.debug_validate_invariants();
    }

    #[test]
    fn read_cache_admits_newcomers_without_spinning() {
        let mut cache = EvaluationCache::new(LfuPolicy::new(2));
        cache.put(1u64, 1u64);
        cache.put(2, 2);
        assert_eq!(cache.get(&1), Some(&1));
        assert_eq!(cache.get(&2), Some(&2));

        assert!(cache.try_put(3, 3).is_ok());
        assert_eq!(cache.evict_spin_count(), 0);
        assert!(cache.contains(&3));
        assert!(!cache.contains(&1));
        assert!(cache.contains(&2));
    }

    #[test]
    fn remove_drops_empty_buckets() {
        let mut lfu = LfuPolicy::new(2);
        let a = lfu.new_entry('a', ());
        lfu.record_hit(a.token());
        lfu.new_entry('b', ());
        lfu.remove(a.token());

        assert_eq!(lfu.tracked(), 1);
        assert_eq!(lfu.frequency(a.token()), None);
        assert_eq!(lfu.min_frequency(), Some(1));
        lfu.debug_validate_invariants();
    }

    #[test]
    fn evicted_token_matches_entry_token() {
        let mut lfu = LfuPolicy::new(1);
        let a = lfu.new_entry(9u8, "nine");
        let victim = lfu.evict().unwrap();
        assert_eq!(victim.token, a.token());
        assert_eq!(victim.key, 9);
    }

    #[test]
    fn construction() {
        assert!(LfuPolicy::<u8>::try_new(0).is_err());
        assert_eq!(
            LfuPolicy::<u8>::try_new(usize::MAX).map(|p| p.capacity()),
            Ok(usize::MAX)
        );
        let lfu = LfuPolicy::<u8>::new(8);
        assert_eq!(lfu.to_string(), "LFU(capacity=8)");
        assert_eq!(lfu.name(), "LFU");
    }
}
