use crate::ingest::RawReading;
use crate::pipeline::{FieldSnapshot, IterationStage};
use crate::prelude::{FieldError, ParseError};
use log::{debug, error, info, log_enabled, warn, Level};

/// Formats pipeline events for the `log` facade.
pub struct LogManager {
    target: &'static str,
}

impl LogManager {
    pub fn new() -> Self {
        Self {
            target: "fieldcore::pipeline",
        }
    }

    /// Per-channel raw and filtered values, one line per channel.
    pub fn record_reading(
        &self,
        iteration: u64,
        labels: &[String],
        raw: &RawReading,
        smoothed: &[f64],
    ) {
        if !log_enabled!(target: self.target, Level::Debug) {
            return;
        }
        let mut entry = format!("[{iteration}] readings:");
        for ((label, raw), filtered) in labels.iter().zip(raw.as_slice()).zip(smoothed) {
            entry.push_str(&format!("\n  {label} raw: {raw}, filtered: {filtered:.2}"));
        }
        debug!(target: self.target, "{}", entry);
    }

    pub fn record_snapshot(&self, snapshot: &FieldSnapshot) {
        let (low, high) = snapshot.value_range().unwrap_or((f64::NAN, f64::NAN));
        info!(
            target: self.target,
            "[{}] strongest {} (channel {}), field range {:.2}..{:.2}",
            snapshot.iteration,
            snapshot.dominant_label,
            snapshot.dominant,
            low,
            high
        );
    }

    pub fn record_skip(&self, iteration: u64, record: &str, err: &ParseError) {
        warn!(
            target: self.target,
            "[{}] skipping record {:?}: {}", iteration, record, err
        );
    }

    pub fn record_failure(&self, iteration: u64, stage: IterationStage, err: &FieldError) {
        error!(
            target: self.target,
            "[{}] iteration abandoned during {:?}: {}", iteration, stage, err
        );
    }

    pub fn record(&self, message: &str) {
        info!(target: self.target, "{}", message);
    }
}

impl Default for LogManager {
    fn default() -> Self {
        Self::new()
    }
}
