use crate::math::StatsHelper;
use crate::prelude::{FieldError, FieldResult};
use ndarray::Array2;
use serde::{Deserialize, Serialize};
use std::time::{SystemTime, UNIX_EPOCH};

/// Result of one pipeline iteration, handed to the sink by value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FieldSnapshot {
    pub iteration: u64,
    /// Seconds since the UNIX epoch when the snapshot was assembled.
    pub timestamp: f64,
    pub raw: Vec<i64>,
    pub smoothed: Vec<f64>,
    /// Reconstructed field; axis 0 follows `x`, axis 1 follows `y`.
    pub field: Array2<f64>,
    pub dominant: usize,
    pub dominant_label: String,
}

impl FieldSnapshot {
    pub fn value_range(&self) -> Option<(f64, f64)> {
        StatsHelper::finite_range(self.field.iter())
    }

    pub fn to_json(&self) -> FieldResult<String> {
        serde_json::to_string(self).map_err(|err| FieldError::Sink(err.to_string()))
    }
}

pub(crate) fn now_seconds() -> f64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|elapsed| elapsed.as_secs_f64())
        .unwrap_or(0.0)
}
