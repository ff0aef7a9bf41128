//! Eviction listeners, invoked synchronously for every capacity eviction.
//!
//! Listeners are owned by the cache in registration order and called in that
//! order, on the calling thread, before the victim leaves the content map.
//! They receive the evicted key only and have no handle to the cache, so they
//! cannot re-enter it.
//!
//! # Example
//! ```
//! use cacheeval::cache::EvaluationCache;
//! use cacheeval::listener::EvictionLog;
//! use cacheeval::policy::lru::LruPolicy;
//!
//! let log = EvictionLog::new();
//! let mut cache = EvaluationCache::builder(LruPolicy::new(1))
//!     .listener(log.clone())
//!     .build();
//!
//! cache.put(1u64, "a");
//! cache.put(2u64, "b");
//! assert_eq!(log.keys(), vec![1]);
//! ```

use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;

/// Callback for capacity evictions.
///
/// Explicit removals through `remove` are not reported.
pub trait EvictionListener<K> {
    fn evicted(&mut self, key: &K);
}

impl<K, F> EvictionListener<K> for F
where
    F: FnMut(&K),
{
    fn evicted(&mut self, key: &K) {
        self(key)
    }
}

/// Ordered listener list owned by a cache.
pub(crate) struct Listeners<K> {
    list: Vec<Box<dyn EvictionListener<K>>>,
}

impl<K> Listeners<K> {
    pub(crate) fn new() -> Self {
        Self { list: Vec::new() }
    }

    pub(crate) fn push(&mut self, listener: Box<dyn EvictionListener<K>>) {
        self.list.push(listener);
    }

    pub(crate) fn len(&self) -> usize {
        self.list.len()
    }

    #[inline]
    pub(crate) fn notify(&mut self, key: &K) {
        for listener in &mut self.list {
            listener.evicted(key);
        }
    }
}

impl<K> fmt::Debug for Listeners<K> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Listeners")
            .field("len", &self.list.len())
            .finish()
    }
}

/// Listener that records evicted keys in order.
///
/// Clones share the same log, so one clone can be registered with a cache
/// while another is kept to read the result.
pub struct EvictionLog<K> {
    keys: Rc<RefCell<Vec<K>>>,
}

impl<K> EvictionLog<K> {
    pub fn new() -> Self {
        Self {
            keys: Rc::new(RefCell::new(Vec::new())),
        }
    }

    pub fn len(&self) -> usize {
        self.keys.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.keys.borrow().is_empty()
    }

    /// Drains the recorded keys.
    pub fn take(&self) -> Vec<K> {
        std::mem::take(&mut *self.keys.borrow_mut())
    }
}

impl<K: Clone> EvictionLog<K> {
    /// Copies the recorded keys in eviction order.
    pub fn keys(&self) -> Vec<K> {
        self.keys.borrow().clone()
    }
}

impl<K> Clone for EvictionLog<K> {
    fn clone(&self) -> Self {
        Self {
            keys: Rc::clone(&self.keys),
        }
    }
}

impl<K> Default for EvictionLog<K> {
    fn default() -> Self {
        Self::new()
    }
}

impl<K: Clone> EvictionListener<K> for EvictionLog<K> {
    fn evicted(&mut self, key: &K) {
        self.keys.borrow_mut().push(key.clone());
    }
}

impl<K> fmt::Debug for EvictionLog<K> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EvictionLog")
            .field("len", &self.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn listeners_fire_in_registration_order() {
        let order = Rc::new(RefCell::new(Vec::new()));
        let mut listeners: Listeners<u32> = Listeners::new();

        for tag in ["first", "second", "third"] {
            let order = Rc::clone(&order);
            listeners.push(Box::new(move |key: &u32| {
                order.borrow_mut().push((tag, *key));
            }));
        }
        assert_eq!(listeners.len(), 3);

        listeners.notify(&7);
        assert_eq!(
            *order.borrow(),
            vec![("first", 7), ("second", 7), ("third", 7)]
        );
    }

    #[test]
    fn log_clones_share_storage() {
        let log = EvictionLog::new();
        let mut handle = log.clone();
        handle.evicted(&"a");
        handle.evicted(&"b");

        assert_eq!(log.len(), 2);
        assert_eq!(log.keys(), vec!["a", "b"]);
        assert_eq!(log.take(), vec!["a", "b"]);
        assert!(handle.is_empty());
    }
}
