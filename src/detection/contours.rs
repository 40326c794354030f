use image::{GrayImage, Luma};
use imageproc::contours::{self, BorderType};
use tracing::debug;

use crate::geometry::Point;
use crate::models::{Contour, Image};

/// Outer boundaries of the foreground regions of a binary map.
///
/// Foreground is every non-zero pixel, grouped 8-connected. Only components
/// reachable from the image border through background are traced; regions
/// sitting inside another region's hole are skipped, as are isolated
/// single pixels. Contours come out in raster order of their first pixel,
/// each running counterclockwise on screen with straight runs collapsed to
/// their end points.
pub fn find_contours(binary: &Image) -> Vec<Contour> {
    let traced = contours::find_contours::<i32>(&padded_mask(binary));

    let mut found = Vec::new();
    let mut skipped = 0usize;
    for contour in traced {
        if contour.border_type != BorderType::Outer || contour.parent.is_some() {
            skipped += 1;
            continue;
        }
        let points: Vec<Point> = contour
            .points
            .iter()
            .map(|p| Point::new(p.x - 1, p.y - 1))
            .collect();
        // An isolated pixel has no border to follow.
        if points.len() < 2 {
            skipped += 1;
            continue;
        }
        found.push(Contour::new(compress_runs(&points)));
    }

    debug!(contours = found.len(), skipped, "Outer contours traced");
    found
}

/// Foreground mask with a one pixel background frame, so regions touching
/// the image edge still get an outer border.
fn padded_mask(binary: &Image) -> GrayImage {
    let (width, height) = (binary.width(), binary.height());
    GrayImage::from_fn(width + 2, height + 2, |x, y| {
        let inside = x >= 1 && y >= 1 && x <= width && y <= height;
        if inside && binary.luma(x - 1, y - 1) != 0 {
            Luma([255])
        } else {
            Luma([0])
        }
    })
}

/// Keep only the pixels where the closed chain changes direction.
fn compress_runs(points: &[Point]) -> Vec<Point> {
    let n = points.len();
    let step = |from: Point, to: Point| (to.x - from.x, to.y - from.y);
    (0..n)
        .filter(|&i| {
            let prev = points[(i + n - 1) % n];
            let next = points[(i + 1) % n];
            step(prev, points[i]) != step(points[i], next)
        })
        .map(|i| points[i])
        .collect()
}
