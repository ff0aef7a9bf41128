//! cacheeval: deterministic trace replay for comparing cache eviction policies.
//!
//! An [`EvaluationCache`](cache::EvaluationCache) owns one
//! [`EvictionPolicy`](traits::EvictionPolicy) and enforces capacity with it,
//! including the case where the policy hands back the key being inserted.
//! Caches are driven through the uniform facades in [`traits`] by the
//! [`replay`] driver, and [`comparison`] runs whole policy/trace/capacity
//! grids, optionally in parallel.
//!
//! See `DESIGN.md` for the module map and the decisions behind it.

pub mod builder;
pub mod cache;
pub mod comparison;
pub mod ds;
pub mod entry;
pub mod error;
pub mod facade;
pub mod listener;
pub mod policy;
pub mod replay;
pub mod trace;

#[cfg(feature = "metrics")]
pub mod metrics;

pub mod prelude;
pub mod traits;
