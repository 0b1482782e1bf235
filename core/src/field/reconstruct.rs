use crate::field::layout::{AnchorPosition, GridResolution};
use crate::field::triangulation::Triangulation;
use crate::math::Point2;
use crate::prelude::{FieldError, FieldResult};
use ndarray::Array2;
use serde::{Deserialize, Serialize};

/// How grid cells outside the convex hull of the anchors are filled.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExtrapolationPolicy {
    /// Value of the nearest anchor; ties go to the lowest channel index.
    #[default]
    NearestAnchor,
    /// Linear value at the closest point of the hull outline.
    NearestHullPoint,
}

/// Weighted combination of up to three anchor values for one grid cell.
#[derive(Debug, Clone, Copy)]
struct Stencil {
    terms: [(usize, f64); 3],
    len: usize,
    interpolated: bool,
}

impl Stencil {
    fn interpolated(vertices: [usize; 3], weights: [f64; 3]) -> Self {
        Self {
            terms: [
                (vertices[0], weights[0]),
                (vertices[1], weights[1]),
                (vertices[2], weights[2]),
            ],
            len: 3,
            interpolated: true,
        }
    }

    fn extrapolated(terms: &[(usize, f64)]) -> Self {
        let mut stencil = Self {
            terms: [(0, 0.0); 3],
            len: terms.len(),
            interpolated: false,
        };
        stencil.terms[..terms.len()].copy_from_slice(terms);
        stencil
    }

    fn apply(&self, values: &[f64]) -> f64 {
        self.terms[..self.len]
            .iter()
            .map(|&(anchor, weight)| weight * values[anchor])
            .sum()
    }
}

/// Piecewise-linear field reconstruction over a fixed anchor layout.
///
/// The triangulation and every cell's interpolation weights are computed once;
/// each call to [`FieldReconstructor::reconstruct`] is a weighted sum per cell.
#[derive(Debug, Clone)]
pub struct FieldReconstructor {
    resolution: GridResolution,
    policy: ExtrapolationPolicy,
    anchor_count: usize,
    stencils: Vec<Stencil>,
}

impl FieldReconstructor {
    pub fn new(
        anchors: &[AnchorPosition],
        resolution: GridResolution,
        policy: ExtrapolationPolicy,
    ) -> FieldResult<Self> {
        resolution.validate()?;
        let points: Vec<_> = anchors.iter().map(AnchorPosition::point).collect();
        let mesh = Triangulation::new(&points)?;

        let mut stencils = Vec::with_capacity(resolution.cells());
        for row in 0..resolution.rows {
            for col in 0..resolution.cols {
                let sample = resolution.sample_point(row, col);
                let stencil = match mesh.locate(sample) {
                    Some((vertices, weights)) => Stencil::interpolated(vertices, weights),
                    None => extrapolate(&mesh, policy, sample)?,
                };
                stencils.push(stencil);
            }
        }

        Ok(Self {
            resolution,
            policy,
            anchor_count: anchors.len(),
            stencils,
        })
    }

    pub fn resolution(&self) -> GridResolution {
        self.resolution
    }

    pub fn policy(&self) -> ExtrapolationPolicy {
        self.policy
    }

    pub fn anchor_count(&self) -> usize {
        self.anchor_count
    }

    /// Number of grid cells filled by the extrapolation policy.
    pub fn extrapolated_cells(&self) -> usize {
        self.stencils.iter().filter(|s| !s.interpolated).count()
    }

    pub fn reconstruct(&self, values: &[f64]) -> FieldResult<Array2<f64>> {
        if values.len() != self.anchor_count {
            return Err(FieldError::Reconstruction(format!(
                "expected {} anchor values, got {}",
                self.anchor_count,
                values.len()
            )));
        }
        if let Some(index) = values.iter().position(|v| !v.is_finite()) {
            return Err(FieldError::Reconstruction(format!(
                "value for anchor {index} is not finite"
            )));
        }

        let cols = self.resolution.cols;
        Ok(Array2::from_shape_fn(
            (self.resolution.rows, cols),
            |(row, col)| self.stencils[row * cols + col].apply(values),
        ))
    }
}

fn extrapolate(
    mesh: &Triangulation,
    policy: ExtrapolationPolicy,
    sample: Point2,
) -> FieldResult<Stencil> {
    match policy {
        ExtrapolationPolicy::NearestAnchor => {
            let nearest = mesh
                .points()
                .iter()
                .enumerate()
                .fold(None::<(usize, f64)>, |best, (index, point)| {
                    let distance = point.distance_squared(&sample);
                    match best {
                        Some((_, d)) if d <= distance => best,
                        _ => Some((index, distance)),
                    }
                })
                .map(|(index, _)| index)
                .ok_or_else(|| FieldError::Reconstruction("no anchors".into()))?;
            Ok(Stencil::extrapolated(&[(nearest, 1.0)]))
        }
        ExtrapolationPolicy::NearestHullPoint => {
            let ([a, b], t) = mesh
                .nearest_boundary_point(sample)
                .ok_or_else(|| FieldError::Reconstruction("triangulation has no outline".into()))?;
            Ok(Stencil::extrapolated(&[(a, 1.0 - t), (b, t)]))
        }
    }
}

/// One-shot reconstruction with the default extrapolation policy.
pub fn reconstruct(
    anchors: &[AnchorPosition],
    values: &[f64],
    resolution: GridResolution,
) -> FieldResult<Array2<f64>> {
    FieldReconstructor::new(anchors, resolution, ExtrapolationPolicy::default())?
        .reconstruct(values)
}
