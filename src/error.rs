//! Error types for the cacheeval library.
//!
//! ## Key Components
//!
//! - [`ConfigError`]: Returned when construction parameters are invalid
//!   (zero capacity, empty comparison plans, out-of-range generator settings).
//! - [`PolicyViolation`]: Returned when an eviction policy breaks its contract
//!   during a `put`. The panicking entry points abort the run instead.
//!
//! Absent keys are never errors: `get` and `remove` return `None`.
//!
//! ## Example Usage
//!
//! ```
//! use cacheeval::error::ConfigError;
//! use cacheeval::policy::lru::LruPolicy;
//!
//! let policy: Result<LruPolicy<u64>, ConfigError> = LruPolicy::try_new(100);
//! assert!(policy.is_ok());
//!
//! let bad = LruPolicy::<u64>::try_new(0);
//! assert!(bad.is_err());
//! ```

use std::fmt;

// ---------------------------------------------------------------------------
// ConfigError
// ---------------------------------------------------------------------------

/// Error returned when configuration parameters are invalid.
///
/// Produced by fallible constructors such as
/// [`LruPolicy::try_new`](crate::policy::lru::LruPolicy::try_new) and builder
/// `try_build()` methods. Carries a human-readable description of which
/// parameter failed validation.
///
/// # Example
///
/// ```
/// use cacheeval::policy::fifo::FifoPolicy;
///
/// let err = FifoPolicy::<u64>::try_new(0).unwrap_err();
/// assert!(err.to_string().contains("capacity"));
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfigError(String);

impl ConfigError {
    /// Creates a new `ConfigError` with the given description.
    #[inline]
    pub fn new(msg: impl Into<String>) -> Self {
        Self(msg.into())
    }

    /// Returns the error description.
    #[inline]
    pub fn message(&self) -> &str {
        &self.0
    }

    pub(crate) fn zero_capacity() -> Self {
        Self::new("cache capacity must be greater than zero")
    }
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl std::error::Error for ConfigError {}

// ---------------------------------------------------------------------------
// PolicyViolation
// ---------------------------------------------------------------------------

/// An eviction policy returned a result inconsistent with the cache contents.
///
/// Raised by [`EvaluationCache::try_put`](crate::cache::EvaluationCache::try_put).
/// Each variant carries the `Debug` rendering of the offending key so the
/// error stays independent of the key type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PolicyViolation {
    /// The cache was over capacity but `evict()` had nothing to return.
    EvictedFromEmpty {
        policy: &'static str,
        resident: usize,
        capacity: usize,
    },
    /// `evict()` returned a key that is not resident, or a stale token for a
    /// resident key.
    UntrackedVictim { policy: &'static str, key: String },
    /// `evict()` kept handing back the key being inserted.
    SpinLimitExceeded {
        policy: &'static str,
        key: String,
        spins: u64,
    },
}

impl fmt::Display for PolicyViolation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PolicyViolation::EvictedFromEmpty {
                policy,
                resident,
                capacity,
            } => write!(
                f,
                "{policy} policy returned no victim with {resident} resident entries over capacity {capacity}"
            ),
            PolicyViolation::UntrackedVictim { policy, key } => {
                write!(f, "{policy} policy evicted untracked entry {key}")
            },
            PolicyViolation::SpinLimitExceeded { policy, key, spins } => write!(
                f,
                "{policy} policy evicted the inserted key {key} {spins} times in a row"
            ),
        }
    }
}

impl std::error::Error for PolicyViolation {}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    // -- ConfigError ------------------------------------------------------

    #[test]
    fn config_display_shows_message() {
        let err = ConfigError::new("capacity must be > 0");
        assert_eq!(err.to_string(), "capacity must be > 0");
    }

    #[test]
    fn config_message_accessor() {
        let err = ConfigError::new("test");
        assert_eq!(err.message(), "test");
    }

    #[test]
    fn config_zero_capacity_mentions_capacity() {
        assert!(ConfigError::zero_capacity().message().contains("capacity"));
    }

    #[test]
    fn config_implements_std_error() {
        fn assert_error<T: std::error::Error>() {}
        assert_error::<ConfigError>();
    }

    // -- PolicyViolation --------------------------------------------------

    #[test]
    fn violation_display_names_policy_and_key() {
        let err = PolicyViolation::UntrackedVictim {
            policy: "LRU",
            key: "42".to_string(),
        };
        let msg = err.to_string();
        assert!(msg.contains("LRU"));
        assert!(msg.contains("42"));
    }

    #[test]
    fn violation_spin_limit_reports_count() {
        let err = PolicyViolation::SpinLimitExceeded {
            policy: "Random",
            key: "\"a\"".to_string(),
            spins: 17,
        };
        assert!(err.to_string().contains("17 times"));
    }

    #[test]
    fn violation_empty_reports_sizes() {
        let err = PolicyViolation::EvictedFromEmpty {
            policy: "FIFO",
            resident: 3,
            capacity: 2,
        };
        let msg = err.to_string();
        assert!(msg.contains("3 resident"));
        assert!(msg.contains("capacity 2"));
    }

    #[test]
    fn violation_implements_std_error() {
        fn assert_error<T: std::error::Error>() {}
        assert_error::<PolicyViolation>();
    }
}
