//! Immutable key traces and deterministic synthetic generators.
//!
//! A [`Trace`] is a named, ordered `u64` key sequence shared through an
//! `Arc<[u64]>`, so every isolated run can hold its own handle for free.
//! [`TraceGenerator`] produces the synthetic patterns used for comparisons;
//! the same parameters and seed always produce the same keys.
//!
//! ## Patterns
//!
//! | Pattern   | Keys                                                       |
//! |-----------|------------------------------------------------------------|
//! | `Uniform` | uniform in `[0, universe)`                                 |
//! | `Loop`    | `0, 1, ..., universe - 1, 0, 1, ...`                       |
//! | `Hotset`  | `hot_prob` of accesses to the first `hot_fraction` of keys |
//! | `Zipfian` | rank-frequency skew with the given exponent                |
//!
//! ## Example
//!
//! ```
//! use cacheeval::trace::{TraceGenerator, TracePattern};
//!
//! let trace = TraceGenerator::new(TracePattern::Loop)
//!     .universe(3)
//!     .length(7)
//!     .generate();
//! assert_eq!(trace.keys(), &[0, 1, 2, 0, 1, 2, 0]);
//! assert_eq!(trace.name(), "loop");
//! ```

use std::fmt;
use std::sync::Arc;

use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};
use rand_distr::{Distribution, Zipf};
use rustc_hash::FxHashSet;

use crate::error::ConfigError;

/// Named, immutable access trace.
#[derive(Clone, PartialEq, Eq)]
pub struct Trace {
    name: Arc<str>,
    keys: Arc<[u64]>,
}

impl Trace {
    pub fn new(name: impl Into<Arc<str>>, keys: impl Into<Arc<[u64]>>) -> Self {
        Self {
            name: name.into(),
            keys: keys.into(),
        }
    }

    pub fn from_keys(name: impl Into<Arc<str>>, keys: impl IntoIterator<Item = u64>) -> Self {
        Self::new(name, keys.into_iter().collect::<Vec<_>>())
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn keys(&self) -> &[u64] {
        &self.keys
    }

    pub fn len(&self) -> usize {
        self.keys.len()
    }

    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = u64> + '_ {
        self.keys.iter().copied()
    }

    /// Number of distinct keys in the trace.
    pub fn distinct_keys(&self) -> usize {
        self.keys.iter().collect::<FxHashSet<_>>().len()
    }
}

impl fmt::Debug for Trace {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Trace")
            .field("name", &self.name)
            .field("len", &self.keys.len())
            .finish()
    }
}

/// Synthetic access pattern.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum TracePattern {
    /// Uniform random keys in `[0, universe)`.
    Uniform,
    /// Sequential keys in `[0, universe)`, wrapping around.
    Loop,
    /// Hot/cold split with a configurable hot fraction and hot access probability.
    Hotset { hot_fraction: f64, hot_prob: f64 },
    /// Zipfian distribution over `[0, universe)`, key 0 the most popular.
    Zipfian { exponent: f64 },
}

impl TracePattern {
    /// Default trace name for this pattern.
    pub fn label(&self) -> &'static str {
        match self {
            TracePattern::Uniform => "uniform",
            TracePattern::Loop => "loop",
            TracePattern::Hotset { .. } => "hotset",
            TracePattern::Zipfian { .. } => "zipfian",
        }
    }
}

/// Deterministic generator for synthetic traces.
#[derive(Debug, Clone)]
pub struct TraceGenerator {
    pattern: TracePattern,
    name: Option<String>,
    universe: u64,
    length: usize,
    seed: u64,
}

impl TraceGenerator {
    pub const DEFAULT_UNIVERSE: u64 = 1024;
    pub const DEFAULT_LENGTH: usize = 10_000;
    pub const DEFAULT_SEED: u64 = 42;

    pub fn new(pattern: TracePattern) -> Self {
        Self {
            pattern,
            name: None,
            universe: Self::DEFAULT_UNIVERSE,
            length: Self::DEFAULT_LENGTH,
            seed: Self::DEFAULT_SEED,
        }
    }

    /// Overrides the trace name, which defaults to the pattern label.
    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// Number of distinct keys the pattern draws from.
    pub fn universe(mut self, universe: u64) -> Self {
        self.universe = universe;
        self
    }

    /// Number of accesses in the trace.
    pub fn length(mut self, length: usize) -> Self {
        self.length = length;
        self
    }

    pub fn seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    /// # Errors
    ///
    /// Returns [`ConfigError`] for an empty universe or out-of-range pattern
    /// parameters.
    pub fn try_generate(&self) -> Result<Trace, ConfigError> {
        if self.universe == 0 {
            return Err(ConfigError::new("trace universe must be greater than zero"));
        }
        let mut rng = SmallRng::seed_from_u64(self.seed);
        let universe = self.universe;

        let keys: Vec<u64> = match self.pattern {
            TracePattern::Uniform => (0..self.length)
                .map(|_| rng.random_range(0..universe))
                .collect(),
            TracePattern::Loop => (0..self.length as u64).map(|i| i % universe).collect(),
            TracePattern::Hotset {
                hot_fraction,
                hot_prob,
            } => {
                if !(hot_fraction > 0.0 && hot_fraction <= 1.0) {
                    return Err(ConfigError::new(format!(
                        "hot_fraction must be in (0, 1], got {}",
                        hot_fraction
                    )));
                }
                if !(0.0..=1.0).contains(&hot_prob) {
                    return Err(ConfigError::new(format!(
                        "hot_prob must be in [0, 1], got {}",
                        hot_prob
                    )));
                }
                let hot_size = ((universe as f64) * hot_fraction).round() as u64;
                let hot_size = hot_size.clamp(1, universe);
                (0..self.length)
                    .map(|_| {
                        if rng.random::<f64>() < hot_prob || hot_size == universe {
                            rng.random_range(0..hot_size)
                        } else {
                            rng.random_range(hot_size..universe)
                        }
                    })
                    .collect()
            },
            TracePattern::Zipfian { exponent } => {
                let zipf = Zipf::new(universe as f64, exponent).map_err(|e| {
                    ConfigError::new(format!("invalid zipfian exponent {}: {}", exponent, e))
                })?;
                (0..self.length)
                    .map(|_| {
                        let rank: f64 = zipf.sample(&mut rng);
                        (rank as u64).saturating_sub(1).min(universe - 1)
                    })
                    .collect()
            },
        };

        let name = self
            .name
            .clone()
            .unwrap_or_else(|| self.pattern.label().to_string());
        Ok(Trace::new(name, keys))
    }

    /// # Panics
    ///
    /// Panics on invalid parameters. See [`try_generate`](Self::try_generate).
    pub fn generate(&self) -> Trace {
        match self.try_generate() {
            Ok(trace) => trace,
            Err(e) => panic!("{}", e),
        }
    }
}
