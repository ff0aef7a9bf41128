//! Unified facade builder for every shipped eviction policy.
//!
//! Builds an [`EvaluationCache`] around the chosen policy and erases it behind
//! a [`BenchmarkCache`]. The facade variant comes from the declared
//! [`KeyKind`], never from inspecting the key type at runtime.
//!
//! ## Example
//!
//! ```rust
//! use cacheeval::builder::{CacheBuilder, CachePolicy, KeyKind};
//! use cacheeval::traits::IntUniformCache;
//!
//! let mut cache = CacheBuilder::new(100)
//!     .policy(CachePolicy::Lfu)
//!     .build_for::<String>(KeyKind::Integer);
//! cache.put(1, "hello".to_string());
//! assert_eq!(cache.get(1), Some(&"hello".to_string()));
//! ```

use std::fmt;
use std::hash::Hash;

use crate::cache::{DEFAULT_SPIN_LIMIT, EvaluationCache, EvictionMode};
use crate::error::ConfigError;
use crate::facade::BenchmarkCache;
use crate::policy::{FifoPolicy, LfuPolicy, LruPolicy, RandomPolicy};
use crate::traits::{EvictionPolicy, IntUniformCache, UniformCache};

/// Available eviction policies.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CachePolicy {
    /// Least Recently Used eviction.
    #[default]
    Lru,
    /// First In, First Out eviction.
    Fifo,
    /// Least Frequently Used eviction, oldest first on ties.
    Lfu,
    /// Uniform random eviction from a seeded generator.
    Random { seed: u64 },
}

impl CachePolicy {
    /// Every policy, with `seed` for the random one.
    pub fn all(seed: u64) -> [CachePolicy; 4] {
        [
            CachePolicy::Lru,
            CachePolicy::Fifo,
            CachePolicy::Lfu,
            CachePolicy::Random { seed },
        ]
    }

    /// Short label matching the policy's own `name()`.
    pub fn name(&self) -> &'static str {
        match self {
            CachePolicy::Lru => "LRU",
            CachePolicy::Fifo => "FIFO",
            CachePolicy::Lfu => "LFU",
            CachePolicy::Random { .. } => "Random",
        }
    }
}

impl fmt::Display for CachePolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CachePolicy::Random { seed } => write!(f, "Random(seed={})", seed),
            other => f.write_str(other.name()),
        }
    }
}

/// Declared key representation of a cache under test.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash)]
pub enum KeyKind {
    /// Keys handed over by reference through [`UniformCache`].
    #[default]
    Generic,
    /// Primitive `u64` keys passed by value through [`IntUniformCache`].
    Integer,
}

/// Builder for facade-wrapped evaluation caches.
#[derive(Debug, Clone)]
pub struct CacheBuilder {
    capacity: usize,
    policy: CachePolicy,
    mode: EvictionMode,
    spin_limit: u64,
}

impl CacheBuilder {
    /// Create a new cache builder with the specified capacity.
    pub fn new(capacity: usize) -> Self {
        Self {
            capacity,
            policy: CachePolicy::default(),
            mode: EvictionMode::default(),
            spin_limit: DEFAULT_SPIN_LIMIT,
        }
    }

    pub fn policy(mut self, policy: CachePolicy) -> Self {
        self.policy = policy;
        self
    }

    pub fn mode(mut self, mode: EvictionMode) -> Self {
        self.mode = mode;
        self
    }

    pub fn spin_limit(mut self, spin_limit: u64) -> Self {
        self.spin_limit = spin_limit;
        self
    }

    /// Builds a generic-key facade.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] for a zero capacity or spin limit.
    pub fn try_build<K, V>(self) -> Result<BenchmarkCache<K, V>, ConfigError>
    where
        K: Clone + Eq + Hash + fmt::Debug + 'static,
        V: 'static,
    {
        self.boxed_generic().map(BenchmarkCache::Generic)
    }

    /// # Panics
    ///
    /// Panics on invalid configuration. See [`try_build`](Self::try_build).
    pub fn build<K, V>(self) -> BenchmarkCache<K, V>
    where
        K: Clone + Eq + Hash + fmt::Debug + 'static,
        V: 'static,
    {
        match self.try_build() {
            Ok(cache) => cache,
            Err(e) => panic!("{}", e),
        }
    }

    /// Builds a `u64`-key facade whose variant follows `kind`.
    pub fn try_build_for<V: 'static>(
        self,
        kind: KeyKind,
    ) -> Result<BenchmarkCache<u64, V>, ConfigError> {
        match kind {
            KeyKind::Generic => self.boxed_generic().map(BenchmarkCache::Generic),
            KeyKind::Integer => self.boxed_int().map(BenchmarkCache::Int),
        }
    }

    /// # Panics
    ///
    /// Panics on invalid configuration.
    pub fn build_for<V: 'static>(self, kind: KeyKind) -> BenchmarkCache<u64, V> {
        match self.try_build_for(kind) {
            Ok(cache) => cache,
            Err(e) => panic!("{}", e),
        }
    }

    fn boxed_generic<K, V>(self) -> Result<Box<dyn UniformCache<K, V>>, ConfigError>
    where
        K: Clone + Eq + Hash + fmt::Debug + 'static,
        V: 'static,
    {
        let cache: Box<dyn UniformCache<K, V>> = match self.policy {
            CachePolicy::Lru => Box::new(self.evaluation(LruPolicy::try_new(self.capacity)?)?),
            CachePolicy::Fifo => Box::new(self.evaluation(FifoPolicy::try_new(self.capacity)?)?),
            CachePolicy::Lfu => Box::new(self.evaluation(LfuPolicy::try_new(self.capacity)?)?),
            CachePolicy::Random { seed } => Box::new(
                self.evaluation(RandomPolicy::try_with_seed(self.capacity, seed)?)?,
            ),
        };
        Ok(cache)
    }

    fn boxed_int<V: 'static>(self) -> Result<Box<dyn IntUniformCache<V>>, ConfigError> {
        let cache: Box<dyn IntUniformCache<V>> = match self.policy {
            CachePolicy::Lru => Box::new(self.evaluation(LruPolicy::try_new(self.capacity)?)?),
            CachePolicy::Fifo => Box::new(self.evaluation(FifoPolicy::try_new(self.capacity)?)?),
            CachePolicy::Lfu => Box::new(self.evaluation(LfuPolicy::try_new(self.capacity)?)?),
            CachePolicy::Random { seed } => Box::new(
                self.evaluation(RandomPolicy::try_with_seed(self.capacity, seed)?)?,
            ),
        };
        Ok(cache)
    }

    fn evaluation<K, V, P>(&self, policy: P) -> Result<EvaluationCache<K, V, P>, ConfigError>
    where
        K: Clone + Eq + Hash + fmt::Debug,
        P: EvictionPolicy<K>,
    {
        EvaluationCache::builder(policy)
            .mode(self.mode)
            .spin_limit(self.spin_limit)
            .try_build()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn all_policies_basic_ops() {
        for policy in CachePolicy::all(7) {
            for kind in [KeyKind::Generic, KeyKind::Integer] {
                let mut cache = CacheBuilder::new(10)
                    .policy(policy)
                    .build_for::<String>(kind);
                assert_eq!(cache.key_kind(), kind);

                cache.put(1, "one".to_string());
                cache.put(2, "two".to_string());
                assert_eq!(cache.get(1), Some(&"one".to_string()));
                assert_eq!(cache.get(3), None);
                assert!(cache.contains(2));
                assert_eq!(cache.len(), 2);

                cache.put(1, "ONE".to_string());
                assert_eq!(cache.get(1), Some(&"ONE".to_string()));
                assert_eq!(cache.len(), 2);
                assert!(cache.describe().contains(policy.name()));
                cache.close();
            }
        }
    }

    #[test]
    fn capacity_enforcement() {
        let mut cache = CacheBuilder::new(2).build_for::<&str>(KeyKind::Integer);
        cache.put(1, "one");
        cache.put(2, "two");
        cache.put(3, "three");

        assert_eq!(cache.len(), 2);
        assert!(!cache.contains(1));
        assert!(cache.contains(2));
        assert!(cache.contains(3));
        assert_eq!(cache.engine_stats().map(|s| s.evictions), Some(1));
    }

    #[test]
    fn generic_keys_build_the_generic_variant() {
        let cache = CacheBuilder::new(4)
            .policy(CachePolicy::Fifo)
            .build::<String, u32>();
        assert_eq!(cache.key_kind(), KeyKind::Generic);
        assert_eq!(cache.capacity(), 4);
    }

    #[test]
    fn invalid_configuration_is_reported() {
        assert!(
            CacheBuilder::new(0)
                .try_build_for::<u8>(KeyKind::Integer)
                .is_err()
        );
        assert!(
            CacheBuilder::new(4)
                .spin_limit(0)
                .try_build::<u64, u8>()
                .is_err()
        );
    }

    #[test]
    fn evict_before_mode_is_forwarded() {
        let cache = CacheBuilder::new(3)
            .mode(EvictionMode::Before)
            .build_for::<u8>(KeyKind::Integer);
        assert!(!cache.describe().contains("evictAfter"));
    }

    #[test]
    fn policy_labels() {
        assert_eq!(CachePolicy::default(), CachePolicy::Lru);
        assert_eq!(CachePolicy::Random { seed: 3 }.to_string(), "Random(seed=3)");
        assert_eq!(CachePolicy::Lfu.to_string(), "LFU");
    }
}
