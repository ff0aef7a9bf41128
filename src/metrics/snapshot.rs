#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct EvaluationMetricsSnapshot {
    pub get_calls: u64,
    pub get_hits: u64,
    pub get_misses: u64,

    pub insert_calls: u64,
    pub insert_new: u64,
    pub insert_updates: u64,

    pub evicted_entries: u64,
    pub self_conflicts: u64, // evict() handed back the key being inserted
    pub removes: u64,

    // gauges captured at snapshot time
    pub cache_len: usize,
    pub capacity: usize,
}

impl EvaluationMetricsSnapshot {
    /// Hits over reads, `0.0` before the first read.
    pub fn hit_ratio(&self) -> f64 {
        if self.get_calls == 0 {
            0.0
        } else {
            self.get_hits as f64 / self.get_calls as f64
        }
    }
}
