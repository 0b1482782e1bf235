use serde::{Deserialize, Serialize};

/// Tolerance used for orientation and containment tests on the unit square.
pub const GEOMETRY_EPSILON: f64 = 1e-12;

/// A point in the normalized plane.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Point2 {
    pub x: f64,
    pub y: f64,
}

impl Point2 {
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    pub fn distance_squared(&self, other: &Point2) -> f64 {
        let dx = self.x - other.x;
        let dy = self.y - other.y;
        dx * dx + dy * dy
    }
}

/// Twice the signed area of `abc`; positive when counter-clockwise.
pub fn orient(a: Point2, b: Point2, c: Point2) -> f64 {
    (b.x - a.x) * (c.y - a.y) - (b.y - a.y) * (c.x - a.x)
}

/// Positive when `d` lies strictly inside the circumcircle of the counter-clockwise triangle `abc`.
pub fn in_circle(a: Point2, b: Point2, c: Point2, d: Point2) -> f64 {
    let (adx, ady) = (a.x - d.x, a.y - d.y);
    let (bdx, bdy) = (b.x - d.x, b.y - d.y);
    let (cdx, cdy) = (c.x - d.x, c.y - d.y);
    let ad = adx * adx + ady * ady;
    let bd = bdx * bdx + bdy * bdy;
    let cd = cdx * cdx + cdy * cdy;
    adx * (bdy * cd - bd * cdy) - ady * (bdx * cd - bd * cdx) + ad * (bdx * cdy - bdy * cdx)
}

/// Barycentric weights of `p` with respect to the non-degenerate triangle `abc`.
pub fn barycentric(a: Point2, b: Point2, c: Point2, p: Point2) -> [f64; 3] {
    let area = orient(a, b, c);
    [
        orient(b, c, p) / area,
        orient(c, a, p) / area,
        orient(a, b, p) / area,
    ]
}

/// Closest point to `p` on segment `ab`, as the interpolation parameter `t` in `[0, 1]`.
pub fn project_onto_segment(a: Point2, b: Point2, p: Point2) -> f64 {
    let (abx, aby) = (b.x - a.x, b.y - a.y);
    let length_squared = abx * abx + aby * aby;
    if length_squared <= GEOMETRY_EPSILON {
        return 0.0;
    }
    (((p.x - a.x) * abx + (p.y - a.y) * aby) / length_squared).clamp(0.0, 1.0)
}

/// Point at parameter `t` along `ab`.
pub fn lerp(a: Point2, b: Point2, t: f64) -> Point2 {
    Point2::new(a.x + (b.x - a.x) * t, a.y + (b.y - a.y) * t)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn orientation_sign_follows_winding() {
        let a = Point2::new(0.0, 0.0);
        let b = Point2::new(1.0, 0.0);
        let c = Point2::new(0.0, 1.0);
        assert!(orient(a, b, c) > 0.0);
        assert!(orient(a, c, b) < 0.0);
        assert_eq!(orient(a, b, Point2::new(2.0, 0.0)), 0.0);
    }

    #[test]
    fn in_circle_detects_interior_and_cocircular_points() {
        let a = Point2::new(0.0, 0.0);
        let b = Point2::new(1.0, 0.0);
        let c = Point2::new(0.0, 1.0);
        assert!(in_circle(a, b, c, Point2::new(0.5, 0.5)) > 0.0);
        assert_eq!(in_circle(a, b, c, Point2::new(1.0, 1.0)), 0.0);
        assert!(in_circle(a, b, c, Point2::new(2.0, 2.0)) < 0.0);
    }

    #[test]
    fn barycentric_weights_sum_to_one() {
        let a = Point2::new(0.0, 0.0);
        let b = Point2::new(1.0, 0.0);
        let c = Point2::new(0.0, 1.0);
        let w = barycentric(a, b, c, Point2::new(0.25, 0.25));
        assert!((w.iter().sum::<f64>() - 1.0).abs() < 1e-12);
        assert_eq!(barycentric(a, b, c, a), [1.0, 0.0, 0.0]);
    }

    #[test]
    fn projection_clamps_to_segment() {
        let a = Point2::new(0.0, 0.0);
        let b = Point2::new(1.0, 0.0);
        assert_eq!(project_onto_segment(a, b, Point2::new(0.25, 3.0)), 0.25);
        assert_eq!(project_onto_segment(a, b, Point2::new(-1.0, 1.0)), 0.0);
        assert_eq!(project_onto_segment(a, b, Point2::new(5.0, -1.0)), 1.0);
    }
}
