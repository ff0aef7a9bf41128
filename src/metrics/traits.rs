//! # Metrics Trait Hierarchy
//!
//! ```text
//!   ┌─────────────────────────────┐
//!   │     CoreMetricsRecorder     │  get hit/miss, insert new/update,
//!   │                             │  evicted entry
//!   └──────────────┬──────────────┘
//!                  │
//!                  ▼
//!   ┌─────────────────────────────┐
//!   │ EvaluationMetricsRecorder   │  self-conflict, explicit remove
//!   └─────────────────────────────┘
//!
//!   Consumption (decoupled from recording):
//!   ┌──────────────────────────────┐    ┌──────────────────────────────┐
//!   │ MetricsSnapshotProvider<S>   │    │ MetricsExporter<S>           │
//!   │ (bench/test)                 │    │ (text exposition)            │
//!   └──────────────────────────────┘    └──────────────────────────────┘
//! ```

/// Common counters for any cache under evaluation.
pub trait CoreMetricsRecorder {
    fn record_get_hit(&mut self);
    fn record_get_miss(&mut self);
    fn record_insert_new(&mut self);
    fn record_insert_update(&mut self);
    fn record_evicted_entry(&mut self);
}

/// Counters specific to the evaluation cache's eviction loop.
pub trait EvaluationMetricsRecorder: CoreMetricsRecorder {
    fn record_self_conflict(&mut self);
    fn record_remove(&mut self);
}

/// Snapshot provider for bench/testing.
pub trait MetricsSnapshotProvider<S> {
    fn snapshot(&self) -> S;
}

/// Reset metrics between tests or benchmark iterations.
pub trait MetricsReset {
    fn reset_metrics(&mut self);
}

/// Publish a snapshot to a monitoring backend.
pub trait MetricsExporter<S> {
    fn export(&self, snapshot: &S);
}
