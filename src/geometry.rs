//! Geometric primitives shared by the detection stages: integer points,
//! polygon measures and the 3x3 projective transform.

use imageproc::geometric_transformations::Projection;

/// Integer pixel coordinate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Point {
    pub x: i32,
    pub y: i32,
}

impl Point {
    pub fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    pub fn distance_squared(&self, other: &Point) -> i64 {
        let dx = (self.x - other.x) as i64;
        let dy = (self.y - other.y) as i64;
        dx * dx + dy * dy
    }

    pub fn distance(&self, other: &Point) -> f64 {
        (self.distance_squared(other) as f64).sqrt()
    }
}

/// Twice the signed shoelace area of a closed polygon.
///
/// Positive for counterclockwise order in a y-up frame, which is clockwise
/// on screen.
pub fn twice_signed_area(points: &[Point]) -> i64 {
    if points.len() < 3 {
        return 0;
    }
    let mut sum = 0i64;
    let mut prev = points[points.len() - 1];
    for &p in points {
        sum += prev.x as i64 * p.y as i64 - p.x as i64 * prev.y as i64;
        prev = p;
    }
    sum
}

/// Absolute enclosed area of a closed polygon.
pub fn polygon_area(points: &[Point]) -> f64 {
    twice_signed_area(points).abs() as f64 / 2.0
}

/// Length of the closed polyline through `points`, including the closing
/// segment.
pub fn closed_arc_length(points: &[Point]) -> f64 {
    if points.len() < 2 {
        return 0.0;
    }
    let mut length = 0.0;
    let mut prev = points[points.len() - 1];
    for &p in points {
        length += prev.distance(&p);
        prev = p;
    }
    length
}

/// Projective mapping between two corner sets, backed by
/// `imageproc`'s [`Projection`].
#[derive(Debug, Clone, Copy)]
pub struct Transform3x3 {
    projection: Projection,
}

impl Transform3x3 {
    /// Solve for the transform mapping each `src[i]` onto `dst[i]`.
    ///
    /// Returns `None` when the correspondences do not determine a unique
    /// transform (three or more collinear corners, repeated points).
    pub fn from_quad(src: &[(f32, f32); 4], dst: &[(f32, f32); 4]) -> Option<Self> {
        if has_collinear_triple(src) || has_collinear_triple(dst) {
            return None;
        }
        let projection = Projection::from_control_points(*src, *dst)?;
        Some(Self { projection })
    }

    /// Map a point. Points on the line at infinity come out non-finite.
    pub fn apply(&self, x: f32, y: f32) -> (f32, f32) {
        self.projection * (x, y)
    }

    pub fn inverse(&self) -> Self {
        Self {
            projection: self.projection.invert(),
        }
    }

    pub fn projection(&self) -> &Projection {
        &self.projection
    }
}

fn has_collinear_triple(points: &[(f32, f32); 4]) -> bool {
    (0..points.len()).any(|skip| {
        let triangle: Vec<(f64, f64)> = points
            .iter()
            .enumerate()
            .filter(|&(i, _)| i != skip)
            .map(|(_, &(x, y))| (x as f64, y as f64))
            .collect();
        let [a, b, c] = [triangle[0], triangle[1], triangle[2]];
        let cross = (b.0 - a.0) * (c.1 - a.1) - (b.1 - a.1) * (c.0 - a.0);
        cross.abs() < 1e-9
    })
}
