//! Type-erased caches handed to the replay driver.
//!
//! ## Architecture
//!
//! ```text
//!   CacheBuilder ──(KeyKind)──► BenchmarkCache<K, V>
//!                                 ├── Generic(Box<dyn UniformCache<K, V>>)
//!                                 └── Int(Box<dyn IntUniformCache<V>>)
//!
//!   LoadingCache<K, V, F>  wraps any UniformCache and fills misses with F
//! ```
//!
//! The `u64` data path (`get`, `put`, ...) dispatches over both variants and
//! is what [`TraceReplay`](crate::replay::TraceReplay) drives. For other key
//! types only the generic variant exists; match on it to reach the cache.

use std::fmt;

use crate::builder::KeyKind;
use crate::traits::{EngineStats, IntUniformCache, UniformCache};

/// Cache under test, erased behind one of the two facade traits.
pub enum BenchmarkCache<K, V> {
    Generic(Box<dyn UniformCache<K, V>>),
    Int(Box<dyn IntUniformCache<V>>),
}

impl<K, V> BenchmarkCache<K, V> {
    pub fn key_kind(&self) -> KeyKind {
        match self {
            BenchmarkCache::Generic(_) => KeyKind::Generic,
            BenchmarkCache::Int(_) => KeyKind::Integer,
        }
    }

    pub fn len(&self) -> usize {
        match self {
            BenchmarkCache::Generic(cache) => cache.len(),
            BenchmarkCache::Int(cache) => cache.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn capacity(&self) -> usize {
        match self {
            BenchmarkCache::Generic(cache) => cache.capacity(),
            BenchmarkCache::Int(cache) => cache.capacity(),
        }
    }

    pub fn describe(&self) -> String {
        match self {
            BenchmarkCache::Generic(cache) => cache.describe(),
            BenchmarkCache::Int(cache) => cache.describe(),
        }
    }

    pub fn engine_stats(&self) -> Option<EngineStats> {
        match self {
            BenchmarkCache::Generic(cache) => cache.engine_stats(),
            BenchmarkCache::Int(cache) => cache.engine_stats(),
        }
    }

    /// Releases the underlying cache. Consumes the facade, so it runs once.
    pub fn close(self) {
        match self {
            BenchmarkCache::Generic(cache) => cache.close(),
            BenchmarkCache::Int(cache) => cache.close(),
        }
    }
}

impl<V> BenchmarkCache<u64, V> {
    pub fn get(&mut self, key: u64) -> Option<&V> {
        match self {
            BenchmarkCache::Generic(cache) => cache.get(&key),
            BenchmarkCache::Int(cache) => cache.get(key),
        }
    }

    pub fn peek(&self, key: u64) -> Option<&V> {
        match self {
            BenchmarkCache::Generic(cache) => cache.peek(&key),
            BenchmarkCache::Int(cache) => cache.peek(key),
        }
    }

    pub fn contains(&self, key: u64) -> bool {
        match self {
            BenchmarkCache::Generic(cache) => cache.contains(&key),
            BenchmarkCache::Int(cache) => cache.contains(key),
        }
    }

    pub fn put(&mut self, key: u64, value: V) {
        match self {
            BenchmarkCache::Generic(cache) => cache.put(key, value),
            BenchmarkCache::Int(cache) => cache.put(key, value),
        }
    }

    pub fn remove(&mut self, key: u64) {
        match self {
            BenchmarkCache::Generic(cache) => cache.remove(&key),
            BenchmarkCache::Int(cache) => cache.remove(key),
        }
    }
}

impl<V> IntUniformCache<V> for BenchmarkCache<u64, V> {
    fn get(&mut self, key: u64) -> Option<&V> {
        BenchmarkCache::get(self, key)
    }

    fn peek(&self, key: u64) -> Option<&V> {
        BenchmarkCache::peek(self, key)
    }

    fn contains(&self, key: u64) -> bool {
        BenchmarkCache::contains(self, key)
    }

    fn put(&mut self, key: u64, value: V) {
        BenchmarkCache::put(self, key, value)
    }

    fn remove(&mut self, key: u64) {
        BenchmarkCache::remove(self, key)
    }

    fn len(&self) -> usize {
        BenchmarkCache::len(self)
    }

    fn capacity(&self) -> usize {
        BenchmarkCache::capacity(self)
    }

    fn describe(&self) -> String {
        BenchmarkCache::describe(self)
    }

    fn engine_stats(&self) -> Option<EngineStats> {
        BenchmarkCache::engine_stats(self)
    }

    fn close(self: Box<Self>) {
        BenchmarkCache::close(*self)
    }
}

impl<K, V> fmt::Debug for BenchmarkCache<K, V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BenchmarkCache")
            .field("key_kind", &self.key_kind())
            .field("cache", &self.describe())
            .finish()
    }
}

/// Read-through wrapper that loads and stores a value on every miss.
///
/// # Example
///
/// ```
/// use cacheeval::cache::EvaluationCache;
/// use cacheeval::facade::LoadingCache;
/// use cacheeval::policy::lru::LruPolicy;
///
/// let inner: EvaluationCache<u64, u64, _> = EvaluationCache::new(LruPolicy::new(2));
/// let mut cache = LoadingCache::new(Box::new(inner), |key: &u64| key * 10);
///
/// assert_eq!(cache.get(&4), Some(&40));
/// assert_eq!(cache.get(&4), Some(&40));
/// assert_eq!(cache.loads(), 1);
/// ```
pub struct LoadingCache<K, V, F> {
    inner: Box<dyn UniformCache<K, V>>,
    loader: F,
    loads: u64,
    hits: u64,
}

impl<K, V, F> LoadingCache<K, V, F>
where
    K: Clone,
    F: FnMut(&K) -> V,
{
    pub fn new(inner: Box<dyn UniformCache<K, V>>, loader: F) -> Self {
        Self {
            inner,
            loader,
            loads: 0,
            hits: 0,
        }
    }

    /// Returns the cached value, loading and storing it first on a miss.
    ///
    /// A load is not reported to the inner cache as a hit.
    pub fn get(&mut self, key: &K) -> Option<&V> {
        if self.inner.contains(key) {
            self.hits += 1;
            return self.inner.get(key);
        }
        let value = (self.loader)(key);
        self.loads += 1;
        self.inner.put(key.clone(), value);
        self.inner.peek(key)
    }

    /// Number of loader invocations.
    pub fn loads(&self) -> u64 {
        self.loads
    }

    /// Number of reads served without loading.
    pub fn hits(&self) -> u64 {
        self.hits
    }

    pub fn inner(&self) -> &dyn UniformCache<K, V> {
        self.inner.as_ref()
    }
}

impl<K, V, F> UniformCache<K, V> for LoadingCache<K, V, F>
where
    K: Clone,
    F: FnMut(&K) -> V,
{
    fn get(&mut self, key: &K) -> Option<&V> {
        LoadingCache::get(self, key)
    }

    fn peek(&self, key: &K) -> Option<&V> {
        self.inner.peek(key)
    }

    fn put(&mut self, key: K, value: V) {
        self.inner.put(key, value);
    }

    fn remove(&mut self, key: &K) {
        self.inner.remove(key);
    }

    fn len(&self) -> usize {
        self.inner.len()
    }

    fn capacity(&self) -> usize {
        self.inner.capacity()
    }

    fn describe(&self) -> String {
        format!("LoadingCache(loads={}, inner={})", self.loads, self.inner.describe())
    }

    fn engine_stats(&self) -> Option<EngineStats> {
        self.inner.engine_stats()
    }

    fn close(self: Box<Self>) {
        self.inner.close();
    }
}
