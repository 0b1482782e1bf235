//! Delaunay triangulation of a small anchor set.
//!
//! Anchor sets are tiny (one point per receiver), so the triangulation is built
//! by exhaustive search: every counter-clockwise triple whose circumcircle holds
//! no other anchor is a candidate, and candidates are accepted in lexicographic
//! order unless they overlap an already accepted triangle. The overlap check
//! resolves co-circular anchors (such as the four corners of the unit square)
//! into a single deterministic triangulation.

use crate::math::geometry::{
    barycentric, in_circle, lerp, orient, project_onto_segment, Point2, GEOMETRY_EPSILON,
};
use crate::prelude::{FieldError, FieldResult};
use std::collections::BTreeMap;

#[derive(Debug, Clone)]
pub struct Triangulation {
    points: Vec<Point2>,
    triangles: Vec<[usize; 3]>,
    boundary: Vec<[usize; 2]>,
}

impl Triangulation {
    pub fn new(points: &[Point2]) -> FieldResult<Self> {
        validate_points(points)?;

        let mut triangles: Vec<[usize; 3]> = Vec::new();
        let n = points.len();
        for i in 0..n {
            for j in (i + 1)..n {
                for k in (j + 1)..n {
                    let area = orient(points[i], points[j], points[k]);
                    if area.abs() <= GEOMETRY_EPSILON {
                        continue;
                    }
                    let triangle = if area > 0.0 { [i, j, k] } else { [i, k, j] };
                    if !circumcircle_is_empty(points, triangle)
                        || triangles
                            .iter()
                            .any(|accepted| overlaps(points, *accepted, triangle))
                    {
                        continue;
                    }
                    triangles.push(triangle);
                }
            }
        }

        if triangles.is_empty() {
            return Err(FieldError::Reconstruction(
                "anchor layout admits no triangle".into(),
            ));
        }

        let boundary = boundary_edges(&triangles);
        Ok(Self {
            points: points.to_vec(),
            triangles,
            boundary,
        })
    }

    pub fn points(&self) -> &[Point2] {
        &self.points
    }

    /// Counter-clockwise vertex indices of each triangle.
    pub fn triangles(&self) -> &[[usize; 3]] {
        &self.triangles
    }

    /// Edges used by exactly one triangle, i.e. the convex hull outline.
    pub fn boundary(&self) -> &[[usize; 2]] {
        &self.boundary
    }

    /// First triangle containing `p` together with its barycentric weights.
    pub fn locate(&self, p: Point2) -> Option<([usize; 3], [f64; 3])> {
        self.triangles.iter().find_map(|&[a, b, c]| {
            let weights = barycentric(self.points[a], self.points[b], self.points[c], p);
            weights
                .iter()
                .all(|&w| w >= -GEOMETRY_EPSILON)
                .then_some(([a, b, c], weights))
        })
    }

    /// Closest boundary point to `p` as `(edge, t)` where the point is `lerp(edge, t)`.
    pub fn nearest_boundary_point(&self, p: Point2) -> Option<([usize; 2], f64)> {
        let mut best: Option<([usize; 2], f64, f64)> = None;
        for &[a, b] in &self.boundary {
            let t = project_onto_segment(self.points[a], self.points[b], p);
            let distance = lerp(self.points[a], self.points[b], t).distance_squared(&p);
            if best.map_or(true, |(_, _, d)| distance < d) {
                best = Some(([a, b], t, distance));
            }
        }
        best.map(|(edge, t, _)| (edge, t))
    }
}

fn validate_points(points: &[Point2]) -> FieldResult<()> {
    if points.len() < 3 {
        return Err(FieldError::Reconstruction(format!(
            "at least 3 anchors are required, got {}",
            points.len()
        )));
    }
    if let Some(index) = points
        .iter()
        .position(|p| !(p.x.is_finite() && p.y.is_finite()))
    {
        return Err(FieldError::Reconstruction(format!(
            "anchor {index} has a non-finite coordinate"
        )));
    }
    for i in 0..points.len() {
        for j in (i + 1)..points.len() {
            if points[i].distance_squared(&points[j]) <= GEOMETRY_EPSILON {
                return Err(FieldError::Reconstruction(format!(
                    "anchors {i} and {j} coincide"
                )));
            }
        }
    }
    let (origin, direction) = (points[0], points[1]);
    if points[2..]
        .iter()
        .all(|&p| orient(origin, direction, p).abs() <= GEOMETRY_EPSILON)
    {
        return Err(FieldError::Reconstruction("anchors are collinear".into()));
    }
    Ok(())
}

fn circumcircle_is_empty(points: &[Point2], [a, b, c]: [usize; 3]) -> bool {
    points.iter().enumerate().all(|(index, &p)| {
        index == a
            || index == b
            || index == c
            || in_circle(points[a], points[b], points[c], p) <= GEOMETRY_EPSILON
    })
}

/// Separating-axis test on the edges of two counter-clockwise triangles.
fn overlaps(points: &[Point2], first: [usize; 3], second: [usize; 3]) -> bool {
    !separated(points, first, second) && !separated(points, second, first)
}

fn separated(points: &[Point2], triangle: [usize; 3], other: [usize; 3]) -> bool {
    (0..3).any(|edge| {
        let a = points[triangle[edge]];
        let b = points[triangle[(edge + 1) % 3]];
        other
            .iter()
            .all(|&vertex| orient(a, b, points[vertex]) <= GEOMETRY_EPSILON)
    })
}

fn boundary_edges(triangles: &[[usize; 3]]) -> Vec<[usize; 2]> {
    let mut usage: BTreeMap<(usize, usize), ([usize; 2], usize)> = BTreeMap::new();
    for triangle in triangles {
        for edge in 0..3 {
            let (a, b) = (triangle[edge], triangle[(edge + 1) % 3]);
            usage
                .entry((a.min(b), a.max(b)))
                .or_insert(([a, b], 0))
                .1 += 1;
        }
    }
    usage
        .into_values()
        .filter(|&(_, count)| count == 1)
        .map(|(edge, _)| edge)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn corners() -> Vec<Point2> {
        vec![
            Point2::new(0.0, 0.0),
            Point2::new(1.0, 0.0),
            Point2::new(0.0, 1.0),
            Point2::new(1.0, 1.0),
        ]
    }

    #[test]
    fn square_splits_into_two_triangles() {
        let mesh = Triangulation::new(&corners()).unwrap();
        assert_eq!(mesh.triangles().len(), 2);
        assert_eq!(mesh.boundary().len(), 4);
    }

    #[test]
    fn interior_anchor_yields_fan() {
        let mut points = corners();
        points.push(Point2::new(0.5, 0.4));
        let mesh = Triangulation::new(&points).unwrap();
        assert_eq!(mesh.triangles().len(), 4);
        assert!(mesh.triangles().iter().all(|t| t.contains(&4)));
    }

    #[test]
    fn locate_finds_containing_triangle() {
        let mesh = Triangulation::new(&corners()).unwrap();
        let (_, weights) = mesh.locate(Point2::new(0.2, 0.3)).unwrap();
        assert!((weights.iter().sum::<f64>() - 1.0).abs() < 1e-12);
        assert!(mesh.locate(Point2::new(1.5, 0.5)).is_none());
    }

    #[test]
    fn rejects_degenerate_layouts() {
        let collinear = [
            Point2::new(0.0, 0.0),
            Point2::new(0.5, 0.5),
            Point2::new(1.0, 1.0),
        ];
        assert!(matches!(
            Triangulation::new(&collinear),
            Err(FieldError::Reconstruction(_))
        ));

        let duplicate = [
            Point2::new(0.0, 0.0),
            Point2::new(0.0, 0.0),
            Point2::new(1.0, 1.0),
        ];
        assert!(Triangulation::new(&duplicate).is_err());
        assert!(Triangulation::new(&corners()[..2]).is_err());
    }

    #[test]
    fn nearest_boundary_point_projects_onto_hull() {
        let points = [
            Point2::new(0.0, 0.0),
            Point2::new(1.0, 0.0),
            Point2::new(0.0, 1.0),
        ];
        let mesh = Triangulation::new(&points).unwrap();
        let (edge, t) = mesh.nearest_boundary_point(Point2::new(1.0, 1.0)).unwrap();
        let hit = lerp(points[edge[0]], points[edge[1]], t);
        assert!((hit.x - 0.5).abs() < 1e-12);
        assert!((hit.y - 0.5).abs() < 1e-12);
    }
}
