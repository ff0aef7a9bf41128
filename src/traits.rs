//! # Evaluation Trait Hierarchy
//!
//! This module defines the two seams of the evaluation engine: the eviction
//! policy contract that ranks entries, and the uniform cache facade that the
//! trace replay driver talks to.
//!
//! ## Architecture
//!
//! ```text
//!   ┌──────────────────────────┐      ┌──────────────────────────────┐
//!   │  TraceReplay (driver)    │─────►│  IntUniformCache<V>          │
//!   └──────────────────────────┘      │  UniformCache<K, V>          │
//!                                     │  get / put / remove / close  │
//!                                     └──────────────┬───────────────┘
//!                                                    │
//!                                                    ▼
//!                                     ┌──────────────────────────────┐
//!                                     │  EvaluationCache<K, V, P>    │
//!                                     │  content: K → Entry          │
//!                                     └──────────────┬───────────────┘
//!                                                    │ owns exactly one
//!                                                    ▼
//!                                     ┌──────────────────────────────┐
//!                                     │  EvictionPolicy<K>           │
//!                                     │  new_entry / record_hit      │
//!                                     │  evict / remove / close      │
//!                                     └──────────────────────────────┘
//! ```
//!
//! ## Trait Summary
//!
//! | Trait                | Purpose                                          |
//! |----------------------|--------------------------------------------------|
//! | `EvictionPolicy`     | Ranks entries and picks the eviction victim      |
//! | `UniformCache`       | Generic-key facade over any cache under test     |
//! | `IntUniformCache`    | `u64`-key facade, keys passed by value           |
//!
//! ## Thread Safety
//!
//! None of these traits require `Send` or `Sync`. A cache and its policy live
//! on one thread for the whole run; parallel comparisons build isolated
//! instances per worker.

use std::fmt;

use crate::entry::{Entry, Victim};

/// Pluggable strategy deciding which resident entry to evict.
///
/// A policy is owned by exactly one cache for its whole lifetime. It tracks
/// every registered entry in its own ranking structure and identifies it with
/// [`Token`](Self::Token).
///
/// # Contract
///
/// - [`new_entry`](Self::new_entry) registers the key and returns the entry.
/// - [`record_hit`](Self::record_hit) updates the ranking on every read.
/// - [`evict`](Self::evict) unregisters exactly one entry, the one ranked least
///   valuable, and returns its key and token. It may return the key currently
///   being inserted; the cache resolves that.
/// - [`remove`](Self::remove) unregisters an entry outside capacity pressure.
/// - Ties are broken by the order in which entries joined the tied group, so
///   replays are bit-identical.
///
/// # Example
///
/// ```
/// use cacheeval::policy::lru::LruPolicy;
/// use cacheeval::traits::EvictionPolicy;
///
/// let mut lru = LruPolicy::new(2);
/// let a = lru.new_entry("a", 1);
/// let _b = lru.new_entry("b", 2);
/// lru.record_hit(a.token());
///
/// assert_eq!(lru.evict().map(|v| v.key), Some("b"));
/// ```
pub trait EvictionPolicy<K>: fmt::Display {
    /// Policy-private handle stored in each entry.
    type Token: Copy + Eq + fmt::Debug;

    /// Maximum number of resident entries. Constant for the policy's lifetime.
    fn capacity(&self) -> usize;

    /// Registers `key` and wraps it with `value` in a new entry.
    fn new_entry<V>(&mut self, key: K, value: V) -> Entry<K, V, Self::Token>;

    /// Records a read hit on the entry identified by `token`.
    fn record_hit(&mut self, token: Self::Token);

    /// Unregisters and returns the least valuable entry, or `None` if nothing
    /// is tracked.
    fn evict(&mut self) -> Option<Victim<K, Self::Token>>;

    /// Unregisters the entry identified by `token`.
    fn remove(&mut self, token: Self::Token);

    /// Number of entries currently tracked.
    fn tracked(&self) -> usize;

    /// Short label used in reports, e.g. `"LRU"`.
    fn name(&self) -> &'static str;

    /// Teardown hook, called once with the cache's final resident size.
    fn close(&mut self, final_size: usize) {
        let tracked = self.tracked();
        if tracked != final_size {
            tracing::warn!(
                policy = self.name(),
                tracked,
                final_size,
                "policy closed with a size mismatch"
            );
        }
    }
}

/// Engine counters exposed by evaluation caches through the facade.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct EngineStats {
    pub len: usize,
    pub capacity: usize,
    pub evict_spin_count: u64,
    pub evictions: u64,
}

/// Uniform get/put/remove/close contract over any cache under test.
///
/// `close` consumes the boxed cache, so it runs exactly once and releases
/// everything the cache holds.
pub trait UniformCache<K, V> {
    /// Reads `key`, updating the cache's ranking on a hit.
    fn get(&mut self, key: &K) -> Option<&V>;

    /// Reads `key` without touching the ranking.
    fn peek(&self, key: &K) -> Option<&V>;

    fn contains(&self, key: &K) -> bool {
        self.peek(key).is_some()
    }

    fn put(&mut self, key: K, value: V);

    fn remove(&mut self, key: &K);

    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn capacity(&self) -> usize;

    /// Human-readable summary of the cache and its policy.
    fn describe(&self) -> String;

    /// Engine counters, if the cache is an evaluation cache.
    fn engine_stats(&self) -> Option<EngineStats> {
        None
    }

    fn close(self: Box<Self>);
}

/// [`UniformCache`] specialised to primitive `u64` keys passed by value.
pub trait IntUniformCache<V> {
    fn get(&mut self, key: u64) -> Option<&V>;

    fn peek(&self, key: u64) -> Option<&V>;

    fn contains(&self, key: u64) -> bool {
        self.peek(key).is_some()
    }

    fn put(&mut self, key: u64, value: V);

    fn remove(&mut self, key: u64);

    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn capacity(&self) -> usize;

    fn describe(&self) -> String;

    fn engine_stats(&self) -> Option<EngineStats> {
        None
    }

    fn close(self: Box<Self>);
}
