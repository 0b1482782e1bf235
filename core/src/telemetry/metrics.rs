use serde::{Deserialize, Serialize};
use std::sync::Mutex;

/// Counters shared between the pipeline thread and observers.
pub struct MetricsRecorder {
    inner: Mutex<MetricsSnapshot>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MetricsSnapshot {
    /// Records acquired from the source.
    pub records: u64,
    pub emitted: u64,
    /// Records rejected by the parser.
    pub skipped: u64,
    /// Iterations abandoned after parsing.
    pub failed: u64,
}

impl MetricsRecorder {
    pub fn new() -> Self {
        Self {
            inner: Mutex::new(MetricsSnapshot::default()),
        }
    }

    pub fn record_received(&self) {
        self.update(|metrics| metrics.records += 1);
    }

    pub fn record_emitted(&self) {
        self.update(|metrics| metrics.emitted += 1);
    }

    pub fn record_skipped(&self) {
        self.update(|metrics| metrics.skipped += 1);
    }

    pub fn record_failed(&self) {
        self.update(|metrics| metrics.failed += 1);
    }

    pub fn snapshot(&self) -> MetricsSnapshot {
        if let Ok(metrics) = self.inner.lock() {
            *metrics
        } else {
            MetricsSnapshot::default()
        }
    }

    fn update(&self, apply: impl FnOnce(&mut MetricsSnapshot)) {
        if let Ok(mut metrics) = self.inner.lock() {
            apply(&mut metrics);
        }
    }
}

impl Default for MetricsRecorder {
    fn default() -> Self {
        Self::new()
    }
}
