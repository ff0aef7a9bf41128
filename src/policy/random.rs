//! Random eviction policy.
//!
//! Victims are drawn uniformly from every tracked entry, including the one
//! being inserted, which makes this the policy that produces real
//! self-conflicts. The generator is a seeded `SmallRng`, so a given seed
//! replays identically.
//!
//! ## Architecture
//!
//! ```text
//!   nodes: SlotArena<RandomNode<K>>      dense: Vec<SlotId>
//!   ┌────────┬─────────────────────┐     ┌─────┬─────┬─────┬─────┐
//!   │ id_a   │ { key: A, index: 0 }│────►│id_a │id_b │id_c │id_d │
//!   │ id_b   │ { key: B, index: 1 }│     └─────┴─────┴─────┴─────┘
//!   │ ...    │                     │
//!   └────────┴─────────────────────┘
//!
//!   evict: i = rng.random_range(0..len)
//!          dense.swap_remove(i), patch moved node's index
//! ```
//!
//! All operations are O(1).

use std::fmt;

use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};

use crate::ds::{SlotArena, SlotId, preallocation};
use crate::entry::{Entry, Victim};
use crate::error::ConfigError;
use crate::traits::EvictionPolicy;

/// Seed used by [`RandomPolicy::new`].
pub const DEFAULT_SEED: u64 = 0x9e37_79b9_7f4a_7c15;

#[derive(Debug)]
struct RandomNode<K> {
    key: K,
    index: usize,
}

/// Uniform random victim selection driven by a seeded generator.
#[derive(Debug)]
pub struct RandomPolicy<K> {
    nodes: SlotArena<RandomNode<K>>,
    dense: Vec<SlotId>,
    rng: SmallRng,
    seed: u64,
    capacity: usize,
}

impl<K> RandomPolicy<K> {
    /// # Panics
    ///
    /// Panics if `capacity` is zero.
    pub fn new(capacity: usize) -> Self {
        Self::with_seed(capacity, DEFAULT_SEED)
    }

    /// # Panics
    ///
    /// Panics if `capacity` is zero.
    pub fn with_seed(capacity: usize, seed: u64) -> Self {
        match Self::try_with_seed(capacity, seed) {
            Ok(policy) => policy,
            Err(e) => panic!("{}", e),
        }
    }

    pub fn try_new(capacity: usize) -> Result<Self, ConfigError> {
        Self::try_with_seed(capacity, DEFAULT_SEED)
    }

    pub fn try_with_seed(capacity: usize, seed: u64) -> Result<Self, ConfigError> {
        if capacity == 0 {
            return Err(ConfigError::zero_capacity());
        }
        Ok(Self {
            nodes: SlotArena::with_capacity(preallocation(capacity)),
            dense: Vec::with_capacity(preallocation(capacity)),
            rng: SmallRng::seed_from_u64(seed),
            seed,
            capacity,
        })
    }

    pub fn seed(&self) -> u64 {
        self.seed
    }

    fn unlink(&mut self, token: SlotId) -> Option<K> {
        let node = self.nodes.remove(token)?;
        self.dense.swap_remove(node.index);
        if let Some(&moved) = self.dense.get(node.index)
            && let Some(moved_node) = self.nodes.get_mut(moved)
        {
            moved_node.index = node.index;
        }
        Some(node.key)
    }

    #[cfg(any(test, debug_assertions))]
    pub fn debug_validate_invariants(&self) {
        assert_eq!(self.dense.len(), self.nodes.len());
        for (index, token) in self.dense.iter().enumerate() {
            let node = self.nodes.get(*token).expect("dense token missing");
            assert_eq!(node.index, index);
        }
    }
}

impl<K: Clone> EvictionPolicy<K> for RandomPolicy<K> {
    type Token = SlotId;

    fn capacity(&self) -> usize {
        self.capacity
    }

    fn new_entry<V>(&mut self, key: K, value: V) -> Entry<K, V, SlotId> {
        let token = self.nodes.insert(RandomNode {
            key: key.clone(),
            index: self.dense.len(),
        });
        self.dense.push(token);
        Entry::new(key, value, token)
    }

    #[inline]
    fn record_hit(&mut self, _token: SlotId) {}

    fn evict(&mut self) -> Option<Victim<K, SlotId>> {
        if self.dense.is_empty() {
            return None;
        }
        let index = self.rng.random_range(0..self.dense.len());
        let token = self.dense[index];
        let key = self.unlink(token)?;
        Some(Victim { key, token })
    }

    fn remove(&mut self, token: SlotId) {
        self.unlink(token);
    }

    fn tracked(&self) -> usize {
        self.dense.len()
    }

    fn name(&self) -> &'static str {
        "Random"
    }
}

impl<K> fmt::Display for RandomPolicy<K> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Random(capacity={}, seed={})", self.capacity, self.seed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn drain(policy: &mut RandomPolicy<u32>) -> Vec<u32> {
        std::iter::from_fn(|| policy.evict().map(|v| v.key)).collect()
    }

    #[test]
    fn same_seed_same_victims() {
        let mut first = RandomPolicy::with_seed(16, 42);
        let mut second = RandomPolicy::with_seed(16, 42);
        for key in 0..16 {
            first.new_entry(key, ());
            second.new_entry(key, ());
        }
        assert_eq!(drain(&mut first), drain(&mut second));
    }

    #[test]
    fn evicts_every_tracked_key_exactly_once() {
        let mut policy = RandomPolicy::with_seed(32, 7);
        for key in 0..32 {
            policy.new_entry(key, ());
        }
        let mut victims = drain(&mut policy);
        victims.sort_unstable();
        assert_eq!(victims, (0..32).collect::<Vec<_>>());
        assert_eq!(policy.tracked(), 0);
    }

    #[test]
    fn remove_keeps_dense_index_consistent() {
        let mut policy = RandomPolicy::with_seed(4, 1);
        let tokens: Vec<_> = (0..4).map(|k| policy.new_entry(k, ()).token()).collect();
        policy.remove(tokens[0]);
        policy.remove(tokens[2]);
        policy.debug_validate_invariants();

        let mut rest = drain(&mut policy);
        rest.sort_unstable();
        assert_eq!(rest, vec![1, 3]);
    }

    #[test]
    fn construction() {
        assert!(RandomPolicy::<u8>::try_new(0).is_err());
        assert_eq!(
            RandomPolicy::<u8>::try_new(usize::MAX).map(|p| p.capacity()),
            Ok(usize::MAX)
        );
        let policy = RandomPolicy::<u8>::with_seed(3, 11);
        assert_eq!(policy.seed(), 11);
        assert_eq!(policy.to_string(), "Random(capacity=3, seed=11)");
        assert_eq!(RandomPolicy::<u8>::new(3).seed(), DEFAULT_SEED);
    }
}
