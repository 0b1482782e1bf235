use crate::math::geometry::Point2;
use crate::prelude::{FieldError, FieldResult};
use serde::{Deserialize, Serialize};

/// Normalized position of the receiver feeding one channel.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AnchorPosition {
    pub x: f64,
    pub y: f64,
}

impl AnchorPosition {
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    pub fn validate(&self) -> FieldResult<()> {
        let in_unit = |v: f64| (0.0..=1.0).contains(&v);
        if in_unit(self.x) && in_unit(self.y) {
            Ok(())
        } else {
            Err(FieldError::Config(format!(
                "anchor ({}, {}) lies outside the unit square",
                self.x, self.y
            )))
        }
    }

    pub fn point(&self) -> Point2 {
        Point2::new(self.x, self.y)
    }

    /// Four receivers on the corners of the surface, in the wiring order of the
    /// reference deployment.
    pub fn unit_square_corners() -> Vec<AnchorPosition> {
        vec![
            AnchorPosition::new(0.0, 0.0),
            AnchorPosition::new(1.0, 0.0),
            AnchorPosition::new(0.0, 1.0),
            AnchorPosition::new(1.0, 1.0),
        ]
    }
}

/// Upper bound on `rows * cols`.
pub const MAX_GRID_CELLS: usize = 1 << 24;

/// Number of samples along each axis of the reconstructed grid.
///
/// Cell `(i, j)` samples `x = i / (rows - 1)` and `y = j / (cols - 1)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct GridResolution {
    pub rows: usize,
    pub cols: usize,
}

impl Default for GridResolution {
    fn default() -> Self {
        Self { rows: 10, cols: 10 }
    }
}

impl GridResolution {
    pub fn new(rows: usize, cols: usize) -> Self {
        Self { rows, cols }
    }

    pub fn validate(&self) -> FieldResult<()> {
        if self.rows == 0 || self.cols == 0 {
            return Err(FieldError::Reconstruction(format!(
                "grid resolution {}x{} has an empty axis",
                self.rows, self.cols
            )));
        }
        match self.rows.checked_mul(self.cols) {
            Some(cells) if cells <= MAX_GRID_CELLS => Ok(()),
            _ => Err(FieldError::Reconstruction(format!(
                "grid resolution {}x{} exceeds {} cells",
                self.rows, self.cols, MAX_GRID_CELLS
            ))),
        }
    }

    pub fn cells(&self) -> usize {
        self.rows.saturating_mul(self.cols)
    }

    pub fn sample_point(&self, row: usize, col: usize) -> Point2 {
        Point2::new(axis_coordinate(row, self.rows), axis_coordinate(col, self.cols))
    }
}

fn axis_coordinate(index: usize, count: usize) -> f64 {
    if count <= 1 {
        0.0
    } else {
        index as f64 / (count - 1) as f64
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn anchors_outside_unit_square_are_rejected() {
        assert!(AnchorPosition::new(0.5, 1.0).validate().is_ok());
        assert!(matches!(
            AnchorPosition::new(1.2, 0.0).validate(),
            Err(FieldError::Config(_))
        ));
        assert!(AnchorPosition::new(f64::NAN, 0.0).validate().is_err());
    }

    #[test]
    fn sample_points_span_the_unit_square() {
        let grid = GridResolution::new(10, 5);
        assert_eq!(grid.sample_point(0, 0), Point2::new(0.0, 0.0));
        assert_eq!(grid.sample_point(9, 4), Point2::new(1.0, 1.0));
        assert_eq!(grid.sample_point(9, 2), Point2::new(1.0, 0.5));
        assert_eq!(GridResolution::new(1, 1).sample_point(0, 0), Point2::new(0.0, 0.0));
    }

    #[test]
    fn empty_axis_is_rejected() {
        assert!(GridResolution::new(0, 10).validate().is_err());
        assert!(GridResolution::default().validate().is_ok());
    }

    #[test]
    fn oversized_grid_is_rejected() {
        assert!(GridResolution::new(4096, 4096).validate().is_ok());
        assert!(GridResolution::new(4097, 4096).validate().is_err());
        let overflowing = GridResolution::new(usize::MAX, 2);
        assert!(overflowing.validate().is_err());
        assert_eq!(overflowing.cells(), usize::MAX);
    }
}
