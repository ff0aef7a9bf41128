//! Policy comparison runs.
//!
//! A [`ComparisonPlan`] is an immutable list of [`Variation`]s, one per
//! `(trace, capacity, policy)` combination. Every variation builds its own
//! cache, replays its trace, closes the cache and reports a
//! [`ComparisonResult`]. Runs share nothing but the trace keys, so
//! [`ComparisonPlan::run_parallel`] only splits the list across scoped
//! threads and keeps the results in plan order.
//!
//! ```text
//!   ComparisonPlanBuilder
//!     policies   [LRU, LFU]
//!     traces     [zipfian → caps [64, 256]] [loop → caps [100]]
//!          │
//!          ▼  (trace × capacity × policy)
//!   ComparisonPlan
//!     zipfian/64/LRU  zipfian/64/LFU  zipfian/256/LRU  ...  loop/100/LFU
//!          │
//!          ▼  run() or run_parallel(threads)
//!   Vec<ComparisonResult>  (same order)
//! ```
//!
//! ## Example
//!
//! ```
//! use cacheeval::builder::CachePolicy;
//! use cacheeval::comparison::ComparisonPlan;
//! use cacheeval::trace::{TraceGenerator, TracePattern};
//!
//! let trace = TraceGenerator::new(TracePattern::Zipfian { exponent: 1.0 })
//!     .universe(500)
//!     .length(5_000)
//!     .generate();
//!
//! let plan = ComparisonPlan::builder()
//!     .policies([CachePolicy::Lru, CachePolicy::Lfu])
//!     .capacities([50])
//!     .trace(trace)
//!     .build();
//!
//! let results = plan.run().unwrap();
//! assert_eq!(results.len(), 2);
//! assert_eq!(results[0].policy, "LRU");
//! ```

use std::fmt;
use std::thread;

use crate::builder::{CacheBuilder, CachePolicy, KeyKind};
use crate::cache::EvictionMode;
use crate::error::ConfigError;
use crate::replay::{HitRate, replay};
use crate::trace::Trace;

/// One isolated run: a policy at a capacity over a trace.
#[derive(Debug, Clone)]
pub struct Variation {
    pub policy: CachePolicy,
    pub key_kind: KeyKind,
    pub mode: EvictionMode,
    pub capacity: usize,
    pub trace: Trace,
}

impl Variation {
    /// Builds a fresh cache, replays the trace and closes the cache.
    pub fn run(&self) -> Result<ComparisonResult, ConfigError> {
        tracing::debug!(
            policy = self.policy.name(),
            trace = self.trace.name(),
            capacity = self.capacity,
            "comparison run started"
        );
        let mut cache = CacheBuilder::new(self.capacity)
            .policy(self.policy)
            .mode(self.mode)
            .try_build_for::<u64>(self.key_kind)?;

        let hit_rate = replay(&mut cache, &self.trace);
        let stats = cache.engine_stats().unwrap_or_default();
        let description = cache.describe();
        cache.close();

        let result = ComparisonResult {
            policy: self.policy.name(),
            trace: self.trace.name().to_string(),
            capacity: self.capacity,
            hit_rate,
            evictions: stats.evictions,
            evict_spin_count: stats.evict_spin_count,
            description,
        };
        tracing::debug!(
            policy = result.policy,
            trace = %result.trace,
            capacity = result.capacity,
            hit_rate = result.hit_rate.hit_rate(),
            evictions = result.evictions,
            evict_spins = result.evict_spin_count,
            "comparison run finished"
        );
        Ok(result)
    }
}

/// Outcome of one [`Variation`].
#[derive(Debug, Clone, PartialEq)]
pub struct ComparisonResult {
    pub policy: &'static str,
    pub trace: String,
    pub capacity: usize,
    pub hit_rate: HitRate,
    pub evictions: u64,
    pub evict_spin_count: u64,
    /// Cache summary captured just before close.
    pub description: String,
}

impl fmt::Display for ComparisonResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{:<8} {:<12} capacity={:<8} hit_rate={:.4} evictions={} spins={}",
            self.policy,
            self.trace,
            self.capacity,
            self.hit_rate.hit_rate(),
            self.evictions,
            self.evict_spin_count
        )
    }
}

/// Immutable set of variations.
#[derive(Debug, Clone)]
pub struct ComparisonPlan {
    variations: Vec<Variation>,
}

impl ComparisonPlan {
    pub fn builder() -> ComparisonPlanBuilder {
        ComparisonPlanBuilder::new()
    }

    pub fn variations(&self) -> &[Variation] {
        &self.variations
    }

    pub fn len(&self) -> usize {
        self.variations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.variations.is_empty()
    }

    /// Runs every variation in plan order on the calling thread.
    pub fn run(&self) -> Result<Vec<ComparisonResult>, ConfigError> {
        self.variations.iter().map(Variation::run).collect()
    }

    /// Runs the variations on up to `threads` scoped worker threads.
    ///
    /// Results come back in plan order and match [`run`](Self::run) exactly.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] if `threads` is zero or a variation cannot be
    /// built.
    pub fn run_parallel(&self, threads: usize) -> Result<Vec<ComparisonResult>, ConfigError> {
        if threads == 0 {
            return Err(ConfigError::new("thread count must be greater than zero"));
        }
        if self.variations.is_empty() {
            return Ok(Vec::new());
        }
        let chunk = self.variations.len().div_ceil(threads);

        thread::scope(|scope| {
            let workers: Vec<_> = self
                .variations
                .chunks(chunk)
                .map(|batch| {
                    scope.spawn(move || {
                        batch
                            .iter()
                            .map(Variation::run)
                            .collect::<Result<Vec<_>, _>>()
                    })
                })
                .collect();

            let mut results = Vec::with_capacity(self.variations.len());
            for worker in workers {
                match worker.join() {
                    Ok(Ok(batch)) => results.extend(batch),
                    Ok(Err(e)) => return Err(e),
                    Err(panic) => std::panic::resume_unwind(panic),
                }
            }
            Ok(results)
        })
    }
}

/// Builder crossing policies with traces and capacities.
#[derive(Debug, Clone, Default)]
pub struct ComparisonPlanBuilder {
    policies: Vec<CachePolicy>,
    capacities: Vec<usize>,
    traces: Vec<(Trace, Option<Vec<usize>>)>,
    key_kind: KeyKind,
    mode: EvictionMode,
}

impl ComparisonPlanBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn policy(mut self, policy: CachePolicy) -> Self {
        self.policies.push(policy);
        self
    }

    pub fn policies(mut self, policies: impl IntoIterator<Item = CachePolicy>) -> Self {
        self.policies.extend(policies);
        self
    }

    /// Default capacities for traces added without their own list.
    pub fn capacities(mut self, capacities: impl IntoIterator<Item = usize>) -> Self {
        self.capacities.extend(capacities);
        self
    }

    /// Adds a trace replayed at the default capacities.
    pub fn trace(mut self, trace: Trace) -> Self {
        self.traces.push((trace, None));
        self
    }

    /// Adds a trace replayed at its own capacities.
    pub fn trace_with_capacities(
        mut self,
        trace: Trace,
        capacities: impl IntoIterator<Item = usize>,
    ) -> Self {
        self.traces.push((trace, Some(capacities.into_iter().collect())));
        self
    }

    pub fn key_kind(mut self, key_kind: KeyKind) -> Self {
        self.key_kind = key_kind;
        self
    }

    pub fn mode(mut self, mode: EvictionMode) -> Self {
        self.mode = mode;
        self
    }

    /// # Errors
    ///
    /// Returns [`ConfigError`] if any dimension is empty or a capacity is zero.
    pub fn try_build(self) -> Result<ComparisonPlan, ConfigError> {
        if self.policies.is_empty() {
            return Err(ConfigError::new("comparison plan needs at least one policy"));
        }
        if self.traces.is_empty() {
            return Err(ConfigError::new("comparison plan needs at least one trace"));
        }

        let mut variations = Vec::new();
        for (trace, capacities) in &self.traces {
            let capacities = capacities.as_deref().unwrap_or(&self.capacities);
            if capacities.is_empty() {
                return Err(ConfigError::new(format!(
                    "trace {} has no capacities to run at",
                    trace.name()
                )));
            }
            for &capacity in capacities {
                if capacity == 0 {
                    return Err(ConfigError::zero_capacity());
                }
                for &policy in &self.policies {
                    variations.push(Variation {
                        policy,
                        key_kind: self.key_kind,
                        mode: self.mode,
                        capacity,
                        trace: trace.clone(),
                    });
                }
            }
        }

        tracing::debug!(variations = variations.len(), "comparison plan built");
        Ok(ComparisonPlan { variations })
    }

    /// # Panics
    ///
    /// Panics on invalid configuration. See [`try_build`](Self::try_build).
    pub fn build(self) -> ComparisonPlan {
        match self.try_build() {
            Ok(plan) => plan,
            Err(e) => panic!("{}", e),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::trace::{TraceGenerator, TracePattern};

    fn zipf_trace() -> Trace {
        TraceGenerator::new(TracePattern::Zipfian { exponent: 0.9 })
            .universe(300)
            .length(3_000)
            .seed(5)
            .generate()
    }

    mod plan {
        use super::*;

        #[test]
        fn crosses_traces_capacities_and_policies_in_order() {
            let plan = ComparisonPlan::builder()
                .policies([CachePolicy::Lru, CachePolicy::Fifo])
                .capacities([10, 20])
                .trace(Trace::from_keys("a", [1, 2, 3]))
                .trace_with_capacities(Trace::from_keys("b", [4]), [5])
                .build();

            let labels: Vec<_> = plan
                .variations()
                .iter()
                .map(|v| (v.trace.name().to_string(), v.capacity, v.policy.name()))
                .collect();
            assert_eq!(
                labels,
                vec![
                    ("a".to_string(), 10, "LRU"),
                    ("a".to_string(), 10, "FIFO"),
                    ("a".to_string(), 20, "LRU"),
                    ("a".to_string(), 20, "FIFO"),
                    ("b".to_string(), 5, "LRU"),
                    ("b".to_string(), 5, "FIFO"),
                ]
            );
            assert_eq!(plan.len(), 6);
        }

        #[test]
        fn empty_dimensions_are_config_errors() {
            let trace = Trace::from_keys("t", [1]);
            assert!(
                ComparisonPlan::builder()
                    .capacities([1])
                    .trace(trace.clone())
                    .try_build()
                    .is_err()
            );
            assert!(
                ComparisonPlan::builder()
                    .policy(CachePolicy::Lru)
                    .capacities([1])
                    .try_build()
                    .is_err()
            );
            assert!(
                ComparisonPlan::builder()
                    .policy(CachePolicy::Lru)
                    .trace(trace.clone())
                    .try_build()
                    .is_err()
            );
            assert!(
                ComparisonPlan::builder()
                    .policy(CachePolicy::Lru)
                    .trace_with_capacities(trace, [0])
                    .try_build()
                    .is_err()
            );
        }
    }

    mod run {
        use super::*;

        #[test]
        fn results_carry_run_statistics() {
            let plan = ComparisonPlan::builder()
                .policy(CachePolicy::Lru)
                .trace_with_capacities(Trace::from_keys("abac", [1, 2, 1, 3]), [2])
                .build();
            let results = plan.run().unwrap();

            assert_eq!(results.len(), 1);
            let result = &results[0];
            assert_eq!(result.trace, "abac");
            assert_eq!(result.capacity, 2);
            assert_eq!(result.hit_rate, HitRate { hits: 1, misses: 3 });
            assert_eq!(result.evictions, 1);
            assert_eq!(result.evict_spin_count, 0);
            assert!(result.description.contains("size=2"));
            assert!(result.to_string().starts_with("LRU"));
        }

        #[test]
        fn parallel_matches_sequential() {
            let plan = ComparisonPlan::builder()
                .policies(CachePolicy::all(11))
                .capacities([16, 64])
                .trace(zipf_trace())
                .key_kind(KeyKind::Integer)
                .build();

            let sequential = plan.run().unwrap();
            for threads in [1, 3, 16] {
                assert_eq!(plan.run_parallel(threads).unwrap(), sequential);
            }
        }

        #[test]
        fn random_policy_reports_self_conflicts() {
            let plan = ComparisonPlan::builder()
                .policy(CachePolicy::Random { seed: 1 })
                .capacities([4])
                .trace(zipf_trace())
                .build();
            let results = plan.run().unwrap();
            assert!(results[0].evict_spin_count > 0);
        }

        #[test]
        fn zero_threads_is_rejected() {
            let plan = ComparisonPlan::builder()
                .policy(CachePolicy::Lru)
                .capacities([1])
                .trace(Trace::from_keys("t", [1]))
                .build();
            assert!(plan.run_parallel(0).is_err());
        }
    }
}
