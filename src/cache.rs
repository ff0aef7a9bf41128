//! # Evaluation Cache
//!
//! Reference cache for comparing eviction policies: a hash map of entries
//! plus exactly one [`EvictionPolicy`] that decides every eviction. It is
//! single-threaded, and replays are deterministic.
//!
//! ## Architecture
//!
//! ```text
//!   ┌──────────────────────────────────────────────────────────────────────┐
//!   │                     EvaluationCache<K, V, P>                         │
//!   │                                                                      │
//!   │   content: FxHashMap<K, Entry<K, V, P::Token>>   (source of truth)   │
//!   │   policy:  P                                     (ranking + victim)  │
//!   │   listeners: [L0, L1, ...]                       (registration order)│
//!   │   evict_spin_count, evictions                    (diagnostics)       │
//!   └──────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Put Flow (evict-after, default)
//!
//! ```text
//!   put(K, V):
//!     1. K resident?  → drop it, policy.remove(old token)  (entry is superseded)
//!     2. entry = policy.new_entry(K, V)
//!     3. while resident size (with K) > capacity:
//!          victim = policy.evict()
//!          victim.key == K ?  → self-conflict:
//!                               evict_spin_count += 1
//!                               entry = policy.new_entry(K, V)   (re-register)
//!          otherwise          → notify listeners, drop victim from content
//!     4. content[K] = entry
//! ```
//!
//! In evict-before mode the victims are chosen before the new entry is
//! registered, so the inserted key can never be picked.
//!
//! ## Failure Semantics
//!
//! A victim that is not resident, a victim carrying a stale token, an empty
//! policy while the cache is over capacity, or an endless run of
//! self-conflicts all mean the policy is broken. [`try_put`] reports these as
//! [`PolicyViolation`]; [`put`] panics with the same message so that a broken
//! policy cannot produce plausible-looking statistics.
//!
//! [`try_put`]: EvaluationCache::try_put
//! [`put`]: EvaluationCache::put

use std::fmt;
use std::hash::Hash;
use std::marker::PhantomData;

use rustc_hash::FxHashMap;

use crate::entry::{Entry, Victim};
use crate::error::{ConfigError, PolicyViolation};
use crate::listener::{EvictionListener, Listeners};
#[cfg(feature = "metrics")]
use crate::metrics::metrics_impl::EvaluationMetrics;
#[cfg(feature = "metrics")]
use crate::metrics::snapshot::EvaluationMetricsSnapshot;
#[cfg(feature = "metrics")]
use crate::metrics::traits::{
    CoreMetricsRecorder, EvaluationMetricsRecorder, MetricsReset, MetricsSnapshotProvider,
};
use crate::traits::{EngineStats, EvictionPolicy, IntUniformCache, UniformCache};

/// Consecutive self-conflicts tolerated within one `put`.
pub const DEFAULT_SPIN_LIMIT: u64 = 1 << 16;

/// When capacity is enforced relative to registering the new entry.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EvictionMode {
    /// Register the new entry first, then evict while over capacity.
    #[default]
    After,
    /// Evict until there is room, then register the new entry.
    Before,
}

/// Final state handed back by [`EvaluationCache::close`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CloseReport {
    pub final_size: usize,
    pub capacity: usize,
    pub evict_spin_count: u64,
    pub evictions: u64,
}

/// Hash-map cache delegating every eviction decision to a policy.
///
/// # Example
///
/// ```
/// use cacheeval::cache::EvaluationCache;
/// use cacheeval::policy::lru::LruPolicy;
///
/// let mut cache = EvaluationCache::new(LruPolicy::new(2));
/// cache.put("a", 1);
/// cache.put("b", 2);
/// assert_eq!(cache.get(&"a"), Some(&1));
///
/// cache.put("c", 3); // evicts "b"
/// assert!(!cache.contains(&"b"));
/// assert_eq!(cache.len(), 2);
/// ```
pub struct EvaluationCache<K, V, P>
where
    P: EvictionPolicy<K>,
{
    content: FxHashMap<K, Entry<K, V, P::Token>>,
    policy: P,
    listeners: Listeners<K>,
    mode: EvictionMode,
    spin_limit: u64,
    evict_spin_count: u64,
    evictions: u64,
    #[cfg(feature = "metrics")]
    metrics: EvaluationMetrics,
}

impl<K, V, P> EvaluationCache<K, V, P>
where
    K: Clone + Eq + Hash + fmt::Debug,
    P: EvictionPolicy<K>,
{
    /// Creates an evict-after cache with no listeners.
    pub fn new(policy: P) -> Self {
        Self::builder(policy).build()
    }

    /// Starts a builder for listeners, eviction mode and spin limit.
    pub fn builder(policy: P) -> EvaluationCacheBuilder<K, V, P> {
        EvaluationCacheBuilder::new(policy)
    }

    /// Inserts or updates `key`, evicting as the policy decides.
    ///
    /// # Panics
    ///
    /// Panics if the policy violates its contract. See
    /// [`try_put`](Self::try_put).
    pub fn put(&mut self, key: K, value: V) {
        if let Err(e) = self.try_put(key, value) {
            panic!("{}", e);
        }
    }

    /// Inserts or updates `key`, reporting policy contract violations.
    ///
    /// After `Ok(())` the key is resident with `value` and
    /// `len() <= capacity()`. After an `Err` the key is absent and its pending
    /// entry is unregistered from the policy; victims the broken policy already
    /// gave up stay gone, so the run should be abandoned.
    pub fn try_put(&mut self, key: K, value: V) -> Result<(), PolicyViolation> {
        let replaced = match self.content.remove(&key) {
            Some(old) => {
                self.policy.remove(old.token());
                true
            },
            None => false,
        };

        #[cfg(feature = "metrics")]
        if replaced {
            self.metrics.record_insert_update();
        } else {
            self.metrics.record_insert_new();
        }

        let entry = match self.mode {
            EvictionMode::After => self.register_then_evict(&key, value)?,
            EvictionMode::Before => {
                if !replaced {
                    self.make_room()?;
                }
                self.policy.new_entry(key.clone(), value)
            },
        };
        self.content.insert(key, entry);

        #[cfg(debug_assertions)]
        self.validate_invariants();

        Ok(())
    }

    /// Whether one more entry would push the cache over capacity.
    #[inline]
    fn is_full(&self) -> bool {
        self.content.len() >= self.policy.capacity()
    }

    fn register_then_evict(
        &mut self,
        key: &K,
        value: V,
    ) -> Result<Entry<K, V, P::Token>, PolicyViolation> {
        let mut entry = self.policy.new_entry(key.clone(), value);
        let mut spins = 0u64;

        while self.is_full() {
            let victim = match self.next_victim() {
                Ok(victim) => victim,
                Err(e) => return Err(self.abandon(entry.token(), e)),
            };
            if victim.key != *key {
                if let Err(e) = self.evict_resident(victim) {
                    return Err(self.abandon(entry.token(), e));
                }
                continue;
            }

            if victim.token != entry.token() {
                let e = self.untracked(&victim.key);
                return Err(self.abandon(entry.token(), e));
            }
            // The policy already unregistered the pending entry.
            spins += 1;
            self.evict_spin_count += 1;
            #[cfg(feature = "metrics")]
            self.metrics.record_self_conflict();
            if spins > self.spin_limit {
                return Err(PolicyViolation::SpinLimitExceeded {
                    policy: self.policy.name(),
                    key: format!("{:?}", key),
                    spins,
                });
            }
            tracing::trace!(key = ?key, spins, "policy evicted the inserted key, re-registering");
            let (_, value, _) = entry.into_parts();
            entry = self.policy.new_entry(key.clone(), value);
        }

        Ok(entry)
    }

    /// Unregisters a pending entry before reporting `violation`.
    fn abandon(&mut self, pending: P::Token, violation: PolicyViolation) -> PolicyViolation {
        self.policy.remove(pending);
        violation
    }

    fn make_room(&mut self) -> Result<(), PolicyViolation> {
        while self.is_full() {
            let victim = self.next_victim()?;
            self.evict_resident(victim)?;
        }
        Ok(())
    }

    fn next_victim(&mut self) -> Result<Victim<K, P::Token>, PolicyViolation> {
        self.policy
            .evict()
            .ok_or_else(|| PolicyViolation::EvictedFromEmpty {
                policy: self.policy.name(),
                resident: self.content.len(),
                capacity: self.policy.capacity(),
            })
    }

    /// Notifies listeners, then drops the victim from the content map.
    fn evict_resident(&mut self, victim: Victim<K, P::Token>) -> Result<(), PolicyViolation> {
        match self.content.get(&victim.key) {
            Some(entry) if entry.token() == victim.token => {},
            _ => return Err(self.untracked(&victim.key)),
        }
        self.listeners.notify(&victim.key);
        self.content.remove(&victim.key);
        self.evictions += 1;
        #[cfg(feature = "metrics")]
        self.metrics.record_evicted_entry();
        Ok(())
    }

    fn untracked(&self, key: &K) -> PolicyViolation {
        PolicyViolation::UntrackedVictim {
            policy: self.policy.name(),
            key: format!("{:?}", key),
        }
    }

    /// Reads `key` and records the hit with the policy.
    ///
    /// Never evicts.
    pub fn get(&mut self, key: &K) -> Option<&V> {
        match self.content.get(key) {
            Some(entry) => {
                self.policy.record_hit(entry.token());
                #[cfg(feature = "metrics")]
                self.metrics.record_get_hit();
                Some(entry.value())
            },
            None => {
                #[cfg(feature = "metrics")]
                self.metrics.record_get_miss();
                None
            },
        }
    }

    /// Reads `key` without informing the policy.
    pub fn peek(&self, key: &K) -> Option<&V> {
        self.content.get(key).map(|entry| entry.value())
    }

    pub fn contains(&self, key: &K) -> bool {
        self.content.contains_key(key)
    }

    /// Removes `key` outside capacity pressure.
    ///
    /// Listeners are not notified and the eviction counter is untouched.
    pub fn remove(&mut self, key: &K) -> Option<V> {
        let entry = self.content.remove(key)?;
        self.policy.remove(entry.token());
        #[cfg(feature = "metrics")]
        self.metrics.record_remove();
        Some(entry.into_value())
    }

    /// Tears the cache down and lets the policy cross-check its final size.
    pub fn close(mut self) -> CloseReport {
        let report = CloseReport {
            final_size: self.content.len(),
            capacity: self.policy.capacity(),
            evict_spin_count: self.evict_spin_count,
            evictions: self.evictions,
        };
        self.policy.close(report.final_size);
        tracing::debug!(
            policy = self.policy.name(),
            size = report.final_size,
            capacity = report.capacity,
            evictions = report.evictions,
            evict_spins = report.evict_spin_count,
            "evaluation cache closed"
        );
        report
    }

    /// Resident entry count.
    pub fn len(&self) -> usize {
        self.content.len()
    }

    pub fn is_empty(&self) -> bool {
        self.content.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.policy.capacity()
    }

    /// Number of times the policy evicted the key being inserted.
    pub fn evict_spin_count(&self) -> u64 {
        self.evict_spin_count
    }

    /// Number of capacity evictions so far.
    pub fn evictions(&self) -> u64 {
        self.evictions
    }

    pub fn mode(&self) -> EvictionMode {
        self.mode
    }

    pub fn policy(&self) -> &P {
        &self.policy
    }

    /// Resident keys in unspecified order.
    pub fn keys(&self) -> impl Iterator<Item = &K> {
        self.content.keys()
    }

    pub fn stats(&self) -> EngineStats {
        EngineStats {
            len: self.content.len(),
            capacity: self.policy.capacity(),
            evict_spin_count: self.evict_spin_count,
            evictions: self.evictions,
        }
    }

    #[cfg(debug_assertions)]
    fn validate_invariants(&self) {
        debug_assert!(
            self.content.len() <= self.policy.capacity(),
            "resident size {} exceeds capacity {}",
            self.content.len(),
            self.policy.capacity()
        );
        debug_assert_eq!(
            self.content.len(),
            self.policy.tracked(),
            "content map and policy disagree on resident size"
        );
    }
}

impl<K, V, P> fmt::Display for EvaluationCache<K, V, P>
where
    P: EvictionPolicy<K>,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "EvaluationCache(size={}, capacity={}",
            self.content.len(),
            self.policy.capacity()
        )?;
        if self.mode == EvictionMode::After {
            write!(f, ", evictAfter=true, evictSpinCount={}", self.evict_spin_count)?;
        }
        write!(f, ", eviction={})", self.policy)
    }
}

impl<K, V, P> fmt::Debug for EvaluationCache<K, V, P>
where
    P: EvictionPolicy<K>,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EvaluationCache")
            .field("policy", &self.policy.name())
            .field("len", &self.content.len())
            .field("capacity", &self.policy.capacity())
            .field("mode", &self.mode)
            .field("evict_spin_count", &self.evict_spin_count)
            .field("listeners", &self.listeners)
            .finish_non_exhaustive()
    }
}

// ---------------------------------------------------------------------------
// Facade implementations
// ---------------------------------------------------------------------------

impl<K, V, P> UniformCache<K, V> for EvaluationCache<K, V, P>
where
    K: Clone + Eq + Hash + fmt::Debug,
    P: EvictionPolicy<K>,
{
    fn get(&mut self, key: &K) -> Option<&V> {
        EvaluationCache::get(self, key)
    }

    fn peek(&self, key: &K) -> Option<&V> {
        EvaluationCache::peek(self, key)
    }

    fn contains(&self, key: &K) -> bool {
        EvaluationCache::contains(self, key)
    }

    fn put(&mut self, key: K, value: V) {
        EvaluationCache::put(self, key, value)
    }

    fn remove(&mut self, key: &K) {
        EvaluationCache::remove(self, key);
    }

    fn len(&self) -> usize {
        EvaluationCache::len(self)
    }

    fn capacity(&self) -> usize {
        EvaluationCache::capacity(self)
    }

    fn describe(&self) -> String {
        self.to_string()
    }

    fn engine_stats(&self) -> Option<EngineStats> {
        Some(self.stats())
    }

    fn close(self: Box<Self>) {
        EvaluationCache::close(*self);
    }
}

impl<V, P> IntUniformCache<V> for EvaluationCache<u64, V, P>
where
    P: EvictionPolicy<u64>,
{
    fn get(&mut self, key: u64) -> Option<&V> {
        EvaluationCache::get(self, &key)
    }

    fn peek(&self, key: u64) -> Option<&V> {
        EvaluationCache::peek(self, &key)
    }

    fn contains(&self, key: u64) -> bool {
        EvaluationCache::contains(self, &key)
    }

    fn put(&mut self, key: u64, value: V) {
        EvaluationCache::put(self, key, value)
    }

    fn remove(&mut self, key: u64) {
        EvaluationCache::remove(self, &key);
    }

    fn len(&self) -> usize {
        EvaluationCache::len(self)
    }

    fn capacity(&self) -> usize {
        EvaluationCache::capacity(self)
    }

    fn describe(&self) -> String {
        self.to_string()
    }

    fn engine_stats(&self) -> Option<EngineStats> {
        Some(self.stats())
    }

    fn close(self: Box<Self>) {
        EvaluationCache::close(*self);
    }
}

#[cfg(feature = "metrics")]
impl<K, V, P> MetricsSnapshotProvider<EvaluationMetricsSnapshot> for EvaluationCache<K, V, P>
where
    P: EvictionPolicy<K>,
{
    fn snapshot(&self) -> EvaluationMetricsSnapshot {
        EvaluationMetricsSnapshot {
            get_calls: self.metrics.get_calls(),
            get_hits: self.metrics.get_hits,
            get_misses: self.metrics.get_misses,
            insert_calls: self.metrics.insert_calls(),
            insert_new: self.metrics.insert_new,
            insert_updates: self.metrics.insert_updates,
            evicted_entries: self.metrics.evicted_entries,
            self_conflicts: self.metrics.self_conflicts,
            removes: self.metrics.removes,
            cache_len: self.content.len(),
            capacity: self.policy.capacity(),
        }
    }
}

#[cfg(feature = "metrics")]
impl<K, V, P> MetricsReset for EvaluationCache<K, V, P>
where
    P: EvictionPolicy<K>,
{
    fn reset_metrics(&mut self) {
        self.metrics = EvaluationMetrics::default();
    }
}

// ---------------------------------------------------------------------------
// Builder
// ---------------------------------------------------------------------------

/// Builder for [`EvaluationCache`].
///
/// # Example
///
/// ```
/// use cacheeval::cache::{EvaluationCache, EvictionMode};
/// use cacheeval::policy::fifo::FifoPolicy;
///
/// let cache = EvaluationCache::<u64, String, _>::builder(FifoPolicy::new(8))
///     .mode(EvictionMode::Before)
///     .listener(|key: &u64| println!("evicted {key}"))
///     .try_build();
/// assert!(cache.is_ok());
/// ```
pub struct EvaluationCacheBuilder<K, V, P> {
    policy: P,
    mode: EvictionMode,
    spin_limit: u64,
    listeners: Listeners<K>,
    _values: PhantomData<fn() -> V>,
}

impl<K, V, P> EvaluationCacheBuilder<K, V, P>
where
    K: Clone + Eq + Hash + fmt::Debug,
    P: EvictionPolicy<K>,
{
    pub fn new(policy: P) -> Self {
        Self {
            policy,
            mode: EvictionMode::default(),
            spin_limit: DEFAULT_SPIN_LIMIT,
            listeners: Listeners::new(),
            _values: PhantomData,
        }
    }

    pub fn mode(mut self, mode: EvictionMode) -> Self {
        self.mode = mode;
        self
    }

    /// Maximum consecutive self-conflicts per `put` before the policy is
    /// reported as broken. Must be at least 1.
    pub fn spin_limit(mut self, spin_limit: u64) -> Self {
        self.spin_limit = spin_limit;
        self
    }

    /// Appends a listener; listeners fire in the order they were added.
    pub fn listener<L>(mut self, listener: L) -> Self
    where
        L: EvictionListener<K> + 'static,
    {
        self.listeners.push(Box::new(listener));
        self
    }

    /// # Errors
    ///
    /// Returns [`ConfigError`] if the spin limit is zero or the policy
    /// reports a zero capacity.
    pub fn try_build(self) -> Result<EvaluationCache<K, V, P>, ConfigError> {
        if self.spin_limit == 0 {
            return Err(ConfigError::new("spin limit must be at least 1"));
        }
        let capacity = self.policy.capacity();
        if capacity == 0 {
            return Err(ConfigError::zero_capacity());
        }
        tracing::debug!(
            policy = self.policy.name(),
            capacity,
            mode = ?self.mode,
            listeners = self.listeners.len(),
            "evaluation cache created"
        );
        Ok(EvaluationCache {
            content: FxHashMap::with_capacity_and_hasher(capacity, Default::default()),
            policy: self.policy,
            listeners: self.listeners,
            mode: self.mode,
            spin_limit: self.spin_limit,
            evict_spin_count: 0,
            evictions: 0,
            #[cfg(feature = "metrics")]
            metrics: EvaluationMetrics::default(),
        })
    }

    /// # Panics
    ///
    /// Panics if the configuration is invalid. See
    /// [`try_build`](Self::try_build).
    pub fn build(self) -> EvaluationCache<K, V, P> {
        match self.try_build() {
            Ok(cache) => cache,
            Err(e) => panic!("{}", e),
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
