use crate::metrics::traits::{CoreMetricsRecorder, EvaluationMetricsRecorder};

/// Plain counters owned by one `EvaluationCache`.
#[derive(Debug, Default, Clone)]
pub struct EvaluationMetrics {
    pub get_hits: u64,
    pub get_misses: u64,
    pub insert_new: u64,
    pub insert_updates: u64,
    pub evicted_entries: u64,
    pub self_conflicts: u64,
    pub removes: u64,
}

impl EvaluationMetrics {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get_calls(&self) -> u64 {
        self.get_hits + self.get_misses
    }

    pub fn insert_calls(&self) -> u64 {
        self.insert_new + self.insert_updates
    }
}

impl CoreMetricsRecorder for EvaluationMetrics {
    #[inline]
    fn record_get_hit(&mut self) {
        self.get_hits += 1;
    }

    #[inline]
    fn record_get_miss(&mut self) {
        self.get_misses += 1;
    }

    #[inline]
    fn record_insert_new(&mut self) {
        self.insert_new += 1;
    }

    #[inline]
    fn record_insert_update(&mut self) {
        self.insert_updates += 1;
    }

    #[inline]
    fn record_evicted_entry(&mut self) {
        self.evicted_entries += 1;
    }
}

impl EvaluationMetricsRecorder for EvaluationMetrics {
    #[inline]
    fn record_self_conflict(&mut self) {
        self.self_conflicts += 1;
    }

    #[inline]
    fn record_remove(&mut self) {
        self.removes += 1;
    }
}
