use image::{GrayImage, Luma, Rgb, RgbImage};
use imageproc::geometric_transformations::{Interpolation, warp_into};
use tracing::debug;

use crate::error::{Result, ScanError};
use crate::geometry::{Point, Transform3x3};
use crate::models::{Image, Quadrilateral};

/// Warp the region bounded by `quad` onto an axis-aligned rectangle.
///
/// Corners are read by position as top-right, top-left, bottom-left,
/// bottom-right. The output keeps the channel count of `source`; samples
/// whose bilinear neighbourhood leaves the source are black.
pub fn rectify(source: &Image, quad: &Quadrilateral) -> Result<Image> {
    let (width, height) = target_size(quad);
    let degenerate = || ScanError::DegenerateQuadrilateral { width, height };
    if width == 0 || height == 0 {
        return Err(degenerate());
    }

    let as_f32 = |p: Point| (p.x as f32, p.y as f32);
    let from = [
        as_f32(quad.top_left()),
        as_f32(quad.top_right()),
        as_f32(quad.bottom_left()),
        as_f32(quad.bottom_right()),
    ];
    let (w, h) = (width as f32, height as f32);
    let to = [(0.0, 0.0), (w, 0.0), (0.0, h), (w, h)];
    let transform = Transform3x3::from_quad(&from, &to).ok_or_else(degenerate)?;
    let projection = transform.projection();

    let out = if source.is_grayscale() {
        let mut out = GrayImage::new(width, height);
        warp_into(
            &source.to_gray_buffer()?,
            projection,
            Interpolation::Bilinear,
            Luma([0]),
            &mut out,
        );
        Image::from_gray_buffer(&out)
    } else {
        let mut out = RgbImage::new(width, height);
        warp_into(
            &source.to_raw_rgb_buffer()?,
            projection,
            Interpolation::Bilinear,
            Rgb([0, 0, 0]),
            &mut out,
        );
        Image::from_raw_rgb_buffer(&out)
    };

    debug!(width, height, "Quadrilateral rectified");
    Ok(out)
}

/// Output size: the larger horizontal and vertical corner spans.
pub fn target_size(quad: &Quadrilateral) -> (u32, u32) {
    let (tr, tl, bl, br) = (
        quad.top_right(),
        quad.top_left(),
        quad.bottom_left(),
        quad.bottom_right(),
    );
    let width = (tr.x - tl.x).unsigned_abs().max((br.x - bl.x).unsigned_abs());
    let height = (br.y - tr.y).unsigned_abs().max((bl.y - tl.y).unsigned_abs());
    (width, height)
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Axis-aligned rectangle in positional order.
    fn rect_quad(x0: i32, y0: i32, w: i32, h: i32) -> Quadrilateral {
        Quadrilateral::new(
            [
                Point::new(x0 + w, y0),
                Point::new(x0, y0),
                Point::new(x0, y0 + h),
                Point::new(x0 + w, y0 + h),
            ],
            (w * h) as f64,
        )
    }

    fn pattern(width: u32, height: u32) -> Image {
        Image::from_fn_gray(width, height, |x, y| ((x * 7 + y * 13) % 256) as u8).unwrap()
    }

    fn close(a: u8, b: u8) -> bool {
        a.abs_diff(b) <= 2
    }

    #[test]
    fn axis_aligned_rectangle_is_a_crop() {
        let src = pattern(80, 60);
        let out = rectify(&src, &rect_quad(10, 5, 40, 30)).unwrap();
        assert_eq!((out.width(), out.height()), (40, 30));
        for y in 0..30 {
            for x in 0..40 {
                let (got, want) = (out.luma(x, y), src.luma(x + 10, y + 5));
                assert!(close(got, want), "at {},{}: {} vs {}", x, y, got, want);
            }
        }
    }

    #[test]
    fn colour_channels_are_preserved() {
        let src = Image::new(50, 50, 3, [10u8, 120, 230].repeat(50 * 50)).unwrap();
        let out = rectify(&src, &rect_quad(5, 5, 20, 10)).unwrap();
        assert_eq!(out.channels(), 3);
        let px = out.pixel(7, 4);
        assert!(close(px[0], 10) && close(px[1], 120) && close(px[2], 230), "{:?}", px);
    }

    #[test]
    fn keystone_of_uniform_image_stays_uniform() {
        let src = Image::filled(100, 100, 1, 90).unwrap();
        let quad = Quadrilateral::new(
            [
                Point::new(70, 10),
                Point::new(30, 10),
                Point::new(10, 80),
                Point::new(90, 80),
            ],
            4200.0,
        );
        let out = rectify(&src, &quad).unwrap();
        assert_eq!((out.width(), out.height()), (80, 70));
        assert!(out.data().iter().all(|&v| close(v, 90)));
    }

    #[test]
    fn samples_outside_the_source_are_black() {
        let src = Image::filled(40, 40, 1, 200).unwrap();
        let out = rectify(&src, &rect_quad(-10, 0, 30, 20)).unwrap();
        assert_eq!(out.luma(0, 5), 0);
        assert!(close(out.luma(25, 5), 200));
    }

    #[test]
    fn zero_width_is_degenerate() {
        let src = Image::filled(40, 40, 1, 200).unwrap();
        let line = Quadrilateral::new(
            [
                Point::new(10, 0),
                Point::new(10, 0),
                Point::new(10, 30),
                Point::new(10, 30),
            ],
            0.0,
        );
        assert!(matches!(
            rectify(&src, &line),
            Err(ScanError::DegenerateQuadrilateral { width: 0, height: 30 })
        ));
    }

    #[test]
    fn collapsed_corners_are_degenerate() {
        let src = Image::filled(40, 40, 1, 200).unwrap();
        // Three corners on one line: spans are non-zero but no transform exists.
        let quad = Quadrilateral::new(
            [
                Point::new(20, 0),
                Point::new(0, 0),
                Point::new(10, 0),
                Point::new(30, 20),
            ],
            0.0,
        );
        assert!(matches!(
            rectify(&src, &quad),
            Err(ScanError::DegenerateQuadrilateral { .. })
        ));
    }
}
