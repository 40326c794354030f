#![allow(dead_code)]

use image::{DynamicImage, GrayImage, Luma, Rgb, RgbImage};
use imageproc::drawing::draw_polygon_mut;
use imageproc::point::Point as DrawPoint;
use pagefinder::{Image, Point};

/// Working size of the default pipeline.
pub const PHOTO_WIDTH: u32 = 480;
pub const PHOTO_HEIGHT: u32 = 640;

/// Slightly rotated page whose top-right corner is the highest point,
/// listed as top-right, top-left, bottom-left, bottom-right.
pub const PAGE_CORNERS: [(i32, i32); 4] = [(310, 200), (170, 203), (173, 346), (313, 343)];

/// Bounding box of [`PAGE_CORNERS`] as (width, height).
pub const PAGE_BBOX: (u32, u32) = (143, 146);

/// The same tilt mirrored left to right, so the top-left corner is the
/// highest point. Listed as top-left, top-right, bottom-right, bottom-left.
pub const MIRRORED_PAGE_CORNERS: [(i32, i32); 4] =
    [(170, 200), (310, 203), (313, 346), (173, 343)];

/// A 100x200 page with edges parallel to the photo's.
pub const UPRIGHT_PAGE_CORNERS: [(i32, i32); 4] = [(290, 220), (190, 220), (190, 420), (290, 420)];

fn polygon(corners: &[(i32, i32)], scale: i32) -> Vec<DrawPoint<i32>> {
    corners
        .iter()
        .map(|&(x, y)| DrawPoint::new(x * scale, y * scale))
        .collect()
}

/// White 480x640 grayscale photo with a black polygon drawn on it.
fn drawn_photo(corners: &[(i32, i32)]) -> Image {
    let mut img = GrayImage::from_pixel(PHOTO_WIDTH, PHOTO_HEIGHT, Luma([255]));
    draw_polygon_mut(&mut img, &polygon(corners, 1), Luma([0]));
    Image::from_dynamic(&DynamicImage::ImageLuma8(img)).expect("Failed to convert drawn photo")
}

pub fn page_photo() -> Image {
    drawn_photo(&PAGE_CORNERS)
}

pub fn mirrored_page_photo() -> Image {
    drawn_photo(&MIRRORED_PAGE_CORNERS)
}

pub fn upright_page_photo() -> Image {
    drawn_photo(&UPRIGHT_PAGE_CORNERS)
}

/// Same page at twice the working resolution, in colour.
pub fn large_colour_page_photo() -> Image {
    let mut img = RgbImage::from_pixel(PHOTO_WIDTH * 2, PHOTO_HEIGHT * 2, Rgb([240, 235, 230]));
    draw_polygon_mut(&mut img, &polygon(&PAGE_CORNERS, 2), Rgb([20, 30, 40]));
    Image::from_dynamic(&DynamicImage::ImageRgb8(img)).expect("Failed to convert colour photo")
}

/// White photo with a small tilted card, enclosing roughly 2,500 pixels.
pub fn small_card_photo() -> Image {
    drawn_photo(&[(250, 300), (200, 301), (201, 351), (251, 350)])
}

/// Featureless white photo.
pub fn blank_photo() -> Image {
    Image::filled(PHOTO_WIDTH, PHOTO_HEIGHT, 1, 255).expect("Failed to create blank photo")
}

/// Chebyshev distance between a detected corner and an expected one.
pub fn corner_offset(found: Point, expected: (i32, i32)) -> i32 {
    (found.x - expected.0).abs().max((found.y - expected.1).abs())
}

/// Whether `found` lies within `tolerance` of any of `corners`.
pub fn near_any(found: Point, corners: &[(i32, i32)], tolerance: i32) -> bool {
    corners.iter().any(|&c| corner_offset(found, c) <= tolerance)
}

/// Whether `actual` lies within `tolerance` (a fraction) of `expected`.
pub fn within(actual: u32, expected: u32, tolerance: f64) -> bool {
    (actual as f64 - expected as f64).abs() <= expected as f64 * tolerance
}
