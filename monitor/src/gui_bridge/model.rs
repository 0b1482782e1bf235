use fieldcore::FieldSnapshot;
use serde::{Deserialize, Serialize};

/// Display-oriented view of the latest snapshot.
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
pub struct VisualizationModel {
    pub iteration: u64,
    pub timestamp: f64,
    pub rows: usize,
    pub cols: usize,
    /// Field values row by row.
    pub field: Vec<Vec<f64>>,
    pub raw: Vec<i64>,
    pub smoothed: Vec<f64>,
    pub dominant: usize,
    pub dominant_label: String,
    /// Colour scale bounds.
    pub value_min: Option<f64>,
    pub value_max: Option<f64>,
}

impl From<&FieldSnapshot> for VisualizationModel {
    fn from(snapshot: &FieldSnapshot) -> Self {
        let (rows, cols) = snapshot.field.dim();
        let range = snapshot.value_range();
        Self {
            iteration: snapshot.iteration,
            timestamp: snapshot.timestamp,
            rows,
            cols,
            field: snapshot.field.outer_iter().map(|row| row.to_vec()).collect(),
            raw: snapshot.raw.clone(),
            smoothed: snapshot.smoothed.clone(),
            dominant: snapshot.dominant,
            dominant_label: snapshot.dominant_label.clone(),
            value_min: range.map(|(low, _)| low),
            value_max: range.map(|(_, high)| high),
        }
    }
}
