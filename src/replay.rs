//! Trace replay driver.
//!
//! Feeds a [`Trace`] to any [`IntUniformCache<u64>`] one access at a time and
//! tallies hits and misses. Each access is a read-through: `get`, and on a
//! miss `put(key, key)`. Explicit operation scripts ([`Operation`]) are
//! available for scenarios that mix reads, writes and removals; only reads
//! count towards the hit rate there.
//!
//! ```text
//!   Trace ──► TraceReplay::step ──► cache.get(key)
//!                                     ├─ Some ─► Hit
//!                                     └─ None ─► cache.put(key, key) ─► Miss
//! ```
//!
//! ## Example
//!
//! ```
//! use cacheeval::cache::EvaluationCache;
//! use cacheeval::policy::lru::LruPolicy;
//! use cacheeval::replay::replay;
//! use cacheeval::trace::Trace;
//!
//! let mut cache = EvaluationCache::<u64, u64, _>::new(LruPolicy::new(2));
//! let trace = Trace::from_keys("abac", [1, 2, 1, 3]);
//!
//! let tally = replay(&mut cache, &trace);
//! assert_eq!(tally.hits, 1);
//! assert_eq!(tally.misses, 3);
//! assert!(!cache.contains(&2));
//! ```

use std::fmt;

use crate::trace::Trace;
use crate::traits::IntUniformCache;

/// Result of one access.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AccessOutcome {
    Hit,
    Miss,
}

impl AccessOutcome {
    pub fn is_hit(self) -> bool {
        self == AccessOutcome::Hit
    }
}

/// Hit and miss tally.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct HitRate {
    pub hits: u64,
    pub misses: u64,
}

impl HitRate {
    pub fn record(&mut self, outcome: AccessOutcome) {
        match outcome {
            AccessOutcome::Hit => self.hits += 1,
            AccessOutcome::Miss => self.misses += 1,
        }
    }

    pub fn requests(self) -> u64 {
        self.hits + self.misses
    }

    pub fn hit_rate(self) -> f64 {
        let total = self.requests();
        if total == 0 {
            0.0
        } else {
            self.hits as f64 / total as f64
        }
    }

    pub fn miss_rate(self) -> f64 {
        if self.requests() == 0 {
            0.0
        } else {
            1.0 - self.hit_rate()
        }
    }
}

impl fmt::Display for HitRate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{:.2}% ({} hits / {} requests)",
            self.hit_rate() * 100.0,
            self.hits,
            self.requests()
        )
    }
}

/// Explicit cache operation for scripted replays.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operation {
    Get(u64),
    Put(u64),
    Remove(u64),
}

/// Applies one operation; reads report their outcome.
pub fn apply<C>(cache: &mut C, op: Operation) -> Option<AccessOutcome>
where
    C: IntUniformCache<u64> + ?Sized,
{
    match op {
        Operation::Get(key) => Some(if cache.get(key).is_some() {
            AccessOutcome::Hit
        } else {
            AccessOutcome::Miss
        }),
        Operation::Put(key) => {
            cache.put(key, key);
            None
        },
        Operation::Remove(key) => {
            cache.remove(key);
            None
        },
    }
}

/// Runs an operation script and tallies its reads.
pub fn replay_ops<C>(cache: &mut C, ops: &[Operation]) -> HitRate
where
    C: IntUniformCache<u64> + ?Sized,
{
    let mut tally = HitRate::default();
    for &op in ops {
        if let Some(outcome) = apply(cache, op) {
            tally.record(outcome);
        }
    }
    tally
}

/// Replays the whole trace as read-through accesses.
pub fn replay<C>(cache: &mut C, trace: &Trace) -> HitRate
where
    C: IntUniformCache<u64> + ?Sized,
{
    let mut driver = TraceReplay::new(cache, trace.clone());
    driver.run()
}

/// Step-by-step read-through replay of one trace against one cache.
pub struct TraceReplay<'c, C: ?Sized> {
    cache: &'c mut C,
    trace: Trace,
    position: usize,
    tally: HitRate,
}

impl<'c, C> TraceReplay<'c, C>
where
    C: IntUniformCache<u64> + ?Sized,
{
    pub fn new(cache: &'c mut C, trace: Trace) -> Self {
        Self {
            cache,
            trace,
            position: 0,
            tally: HitRate::default(),
        }
    }

    /// Delivers the next access, or `None` once the trace is exhausted.
    pub fn step(&mut self) -> Option<AccessOutcome> {
        let key = *self.trace.keys().get(self.position)?;
        self.position += 1;

        let outcome = if self.cache.get(key).is_some() {
            AccessOutcome::Hit
        } else {
            self.cache.put(key, key);
            AccessOutcome::Miss
        };
        self.tally.record(outcome);
        Some(outcome)
    }

    /// Delivers every remaining access and returns the total tally.
    pub fn run(&mut self) -> HitRate {
        while self.step().is_some() {}
        tracing::debug!(
            trace = self.trace.name(),
            hits = self.tally.hits,
            misses = self.tally.misses,
            cache = %self.cache.describe(),
            "trace replay finished"
        );
        self.tally
    }

    /// Accesses delivered so far.
    pub fn position(&self) -> usize {
        self.position
    }

    pub fn remaining(&self) -> usize {
        self.trace.len() - self.position
    }

    pub fn is_finished(&self) -> bool {
        self.position == self.trace.len()
    }

    pub fn tally(&self) -> HitRate {
        self.tally
    }

    pub fn trace(&self) -> &Trace {
        &self.trace
    }

    pub fn cache(&self) -> &C {
        &*self.cache
    }
}

impl<C: ?Sized> fmt::Debug for TraceReplay<'_, C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TraceReplay")
            .field("trace", &self.trace)
            .field("position", &self.position)
            .field("tally", &self.tally)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::builder::{CacheBuilder, CachePolicy, KeyKind};
    use crate::cache::EvaluationCache;
    use crate::policy::lru::LruPolicy;

    const A: u64 = 1;
    const B: u64 = 2;
    const C: u64 = 3;

    #[test]
    fn step_reports_each_access() {
        let mut cache = EvaluationCache::<u64, u64, _>::new(LruPolicy::new(2));
        let trace = Trace::from_keys("abac", [A, B, A, C]);
        let mut driver = TraceReplay::new(&mut cache, trace);

        assert_eq!(driver.step(), Some(AccessOutcome::Miss));
        assert_eq!(driver.step(), Some(AccessOutcome::Miss));
        assert_eq!(driver.step(), Some(AccessOutcome::Hit));
        assert_eq!(driver.remaining(), 1);
        assert_eq!(driver.step(), Some(AccessOutcome::Miss));
        assert_eq!(driver.step(), None);
        assert!(driver.is_finished());
        assert_eq!(driver.tally(), HitRate { hits: 1, misses: 3 });

        assert!(cache.contains(&A));
        assert!(!cache.contains(&B));
        assert!(cache.contains(&C));
    }

    #[test]
    fn scripted_puts_are_not_counted() {
        let mut cache = EvaluationCache::<u64, u64, _>::new(LruPolicy::new(2));
        let ops = [
            Operation::Put(A),
            Operation::Put(B),
            Operation::Get(A),
            Operation::Put(C),
            Operation::Get(B),
            Operation::Remove(A),
            Operation::Get(A),
        ];
        let tally = replay_ops(&mut cache, &ops);

        assert_eq!(tally, HitRate { hits: 1, misses: 2 });
        assert_eq!(cache.evictions(), 1);
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn replays_through_a_dyn_facade() {
        let mut cache = CacheBuilder::new(4)
            .policy(CachePolicy::Fifo)
            .build_for::<u64>(KeyKind::Integer);
        let trace = Trace::from_keys("loop", (0..5).cycle().take(20));
        let tally = {
            let facade: &mut dyn IntUniformCache<u64> = &mut cache;
            replay(facade, &trace)
        };

        // A loop one larger than the cache defeats FIFO entirely.
        assert_eq!(tally.hits, 0);
        assert_eq!(tally.requests(), 20);
        cache.close();
    }

    #[test]
    fn hit_rate_arithmetic() {
        let empty = HitRate::default();
        assert_eq!(empty.hit_rate(), 0.0);
        assert_eq!(empty.miss_rate(), 0.0);

        let tally = HitRate { hits: 3, misses: 1 };
        assert!((tally.hit_rate() - 0.75).abs() < f64::EPSILON);
        assert!((tally.miss_rate() - 0.25).abs() < f64::EPSILON);
        assert_eq!(tally.to_string(), "75.00% (3 hits / 4 requests)");
        assert!(AccessOutcome::Hit.is_hit());
    }
}
