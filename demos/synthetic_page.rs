//! Draws a tilted page on a blank photo, runs the pipeline and writes
//! every stage image into the directory given as the first argument.
//!
//! cargo run --example synthetic_page -- /tmp/pagefinder-demo

use image::{DynamicImage, Luma, GrayImage};
use imageproc::drawing::draw_polygon_mut;
use imageproc::point::Point;
use std::path::PathBuf;

use pagefinder::{DebugOutput, Image, Pipeline};

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt().with_env_filter("debug").init();

    let out_dir = std::env::args()
        .nth(1)
        .map(PathBuf::from)
        .unwrap_or_else(|| std::env::temp_dir().join("pagefinder-demo"));

    let mut photo = GrayImage::from_pixel(480, 640, Luma([235]));
    let page = [
        Point::new(330, 140),
        Point::new(120, 160),
        Point::new(140, 470),
        Point::new(360, 450),
    ];
    draw_polygon_mut(&mut photo, &page, Luma([25]));
    let photo = Image::from_dynamic(&DynamicImage::ImageLuma8(photo))?;

    let detection = Pipeline::default().detect(&photo)?;
    let rectified = detection.rectify()?;

    let debug = DebugOutput::prepare(&out_dir)?;
    for path in debug.write(&detection, rectified.as_ref())? {
        println!("wrote {}", path.display());
    }
    match rectified {
        Some(page) => println!("page: {}x{}", page.width(), page.height()),
        None => println!("no document detected"),
    }
    Ok(())
}
