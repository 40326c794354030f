//! Polygon simplification and selection of the document candidate.

use tracing::debug;

use crate::geometry::Point;
use crate::models::{Contour, Polygon, Quadrilateral};

/// Anchor hops used to find two far-apart points on a closed curve.
const ANCHOR_HOPS: usize = 3;

/// Largest four-vertex simplification among `contours`.
///
/// Contours enclosing `min_area` or less are ignored. Each remaining
/// contour is simplified with a tolerance of `simplify_factor` times its
/// perimeter. The strictly largest area wins, so ties keep the contour
/// seen first.
pub fn select_best(
    contours: &[Contour],
    min_area: f64,
    simplify_factor: f64,
) -> Option<Quadrilateral> {
    let mut best: Option<Quadrilateral> = None;
    let mut large = 0usize;

    for contour in contours {
        let area = contour.area();
        if area <= min_area {
            continue;
        }
        large += 1;

        let epsilon = simplify_factor * contour.perimeter();
        let polygon = approximate_polygon(contour.points(), epsilon);
        if polygon.len() != 4 {
            continue;
        }
        if best.as_ref().is_none_or(|b| area > b.area()) {
            best = Quadrilateral::from_polygon(&polygon, area);
        }
    }

    debug!(
        contours = contours.len(),
        large,
        found = best.is_some(),
        "Quadrilateral selection finished"
    );
    best
}

/// Douglas-Peucker simplification of a closed curve.
///
/// Points farther than `epsilon` from the chord they would be dropped
/// against are kept. The result starts at an anchor chosen by hopping to
/// the farthest point a few times and keeps traced order.
pub fn approximate_polygon(points: &[Point], epsilon: f64) -> Polygon {
    let n = points.len();
    if n == 0 {
        return Polygon::new(Vec::new());
    }
    let eps_sq = epsilon * epsilon;

    let mut anchor = 0;
    let (mut far, mut far_dist) = farthest_from(points, anchor);
    for _ in 1..ANCHOR_HOPS {
        anchor = far;
        (far, far_dist) = farthest_from(points, anchor);
    }
    if far_dist as f64 <= eps_sq {
        return Polygon::new(vec![points[anchor]]);
    }

    let mut kept = Vec::new();
    let mut stack = vec![(far, anchor), (anchor, far)];
    while let Some((first, last)) = stack.pop() {
        let start = points[first];
        let end = points[last];
        let mut pos = (first + 1) % n;
        if pos == last {
            kept.push(start);
            continue;
        }

        let dx = (end.x - start.x) as f64;
        let dy = (end.y - start.y) as f64;
        let mut max_dist = 0.0;
        let mut split = first;
        while pos != last {
            let p = points[pos];
            let dist = ((p.y - start.y) as f64 * dx - (p.x - start.x) as f64 * dy).abs();
            if dist > max_dist {
                max_dist = dist;
                split = pos;
            }
            pos = (pos + 1) % n;
        }

        // `dist` is the chord length times the distance to the chord line.
        if max_dist * max_dist <= eps_sq * (dx * dx + dy * dy) {
            kept.push(start);
        } else {
            stack.push((split, last));
            stack.push((first, split));
        }
    }
    Polygon::new(kept)
}

/// Index of the point farthest from `points[from]`, scanning forward in
/// traced order, with its squared distance. The first maximum wins; when
/// every point coincides the result is `from` itself.
fn farthest_from(points: &[Point], from: usize) -> (usize, i64) {
    let n = points.len();
    let origin = points[from];
    let mut best = (from, 0);
    for offset in 1..n {
        let idx = (from + offset) % n;
        let dist = origin.distance_squared(&points[idx]);
        if dist > best.1 {
            best = (idx, dist);
        }
    }
    best
}
