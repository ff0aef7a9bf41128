use std::io::Write;
use std::sync::Mutex;

use crate::metrics::snapshot::EvaluationMetricsSnapshot;
use crate::metrics::traits::MetricsExporter;

/// Prometheus text exporter for evaluation snapshots.
///
/// Writes the text exposition format, one `# TYPE` line per sample. Write
/// errors are dropped; metrics never fail a run.
#[derive(Debug)]
pub struct PrometheusTextExporter<W: Write + Send> {
    prefix: String,
    writer: Mutex<W>,
}

impl<W: Write + Send> PrometheusTextExporter<W> {
    pub fn new(prefix: impl Into<String>, writer: W) -> Self {
        Self {
            prefix: prefix.into(),
            writer: Mutex::new(writer),
        }
    }

    /// Returns the underlying writer.
    pub fn into_inner(self) -> W {
        self.writer
            .into_inner()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn write_sample(&self, kind: &str, suffix: &str, value: u64) {
        let name = self.metric_name(suffix);
        let mut writer = self
            .writer
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        let _ = writeln!(writer, "# TYPE {} {}", name, kind);
        let _ = writeln!(writer, "{} {}", name, value);
    }

    fn metric_name(&self, suffix: &str) -> String {
        if self.prefix.is_empty() {
            suffix.to_string()
        } else {
            format!("{}_{}", self.prefix, suffix)
        }
    }
}

impl<W: Write + Send> MetricsExporter<EvaluationMetricsSnapshot> for PrometheusTextExporter<W> {
    fn export(&self, snapshot: &EvaluationMetricsSnapshot) {
        let counters = [
            ("get_calls_total", snapshot.get_calls),
            ("get_hits_total", snapshot.get_hits),
            ("get_misses_total", snapshot.get_misses),
            ("insert_calls_total", snapshot.insert_calls),
            ("insert_new_total", snapshot.insert_new),
            ("insert_updates_total", snapshot.insert_updates),
            ("evicted_entries_total", snapshot.evicted_entries),
            ("self_conflicts_total", snapshot.self_conflicts),
            ("removes_total", snapshot.removes),
        ];
        for (suffix, value) in counters {
            self.write_sample("counter", suffix, value);
        }
        self.write_sample("gauge", "cache_len", snapshot.cache_len as u64);
        self.write_sample("gauge", "capacity", snapshot.capacity as u64);
    }
}
