use image::{Rgb, RgbImage};
use imageproc::drawing::draw_filled_circle_mut;

use crate::models::{Image, Quadrilateral};
use crate::pipeline::Detection;

pub const MARKER_RADIUS: i32 = 5;

/// Pure green. The canvas holds BGR bytes, and green is the middle
/// channel in either order.
const MARKER_COLOUR: Rgb<u8> = Rgb([0, 255, 0]);

impl Detection {
    /// The working image with a filled green dot on each detected corner.
    pub fn corner_overlay(&self) -> Option<Image> {
        self.quad()
            .map(|quad| draw_corners(&self.diagnostics().resized, quad))
    }
}

/// Three-channel copy of `image` with corner markers drawn on it.
pub fn draw_corners(image: &Image, quad: &Quadrilateral) -> Image {
    let mut canvas = RgbImage::from_fn(image.width(), image.height(), |x, y| {
        let p = image.pixel(x, y);
        if image.is_grayscale() {
            Rgb([p[0]; 3])
        } else {
            Rgb([p[0], p[1], p[2]])
        }
    });
    for corner in quad.corners() {
        draw_filled_circle_mut(&mut canvas, (corner.x, corner.y), MARKER_RADIUS, MARKER_COLOUR);
    }
    Image::from_raw_rgb_buffer(&canvas)
}
