//! Opt-in counters for the evaluation engine (feature `metrics`).
//!
//! Recording, snapshotting and export are separate traits: the cache only
//! records, tests and benches read snapshots, and exporters publish them.

pub mod exporter;
pub mod metrics_impl;
pub mod snapshot;
pub mod traits;
