//! Binary edge maps: Canny edge detection followed by a dilate/erode pass
//! that merges nearby edge fragments into closed outlines.

use image::GrayImage;
use imageproc::distance_transform::Norm;
use imageproc::morphology;

use crate::error::{Result, ScanError};
use crate::models::Image;
use tracing::debug;

/// Side of the square structuring element used for morphology.
pub const MORPH_KERNEL_SIZE: usize = 5;
/// Dilation passes applied to the raw edge map.
pub const DILATE_ITERATIONS: usize = 2;
/// Erosion passes applied after dilation.
pub const ERODE_ITERATIONS: usize = 1;

/// Every intermediate map of the edge stage.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EdgeMaps {
    pub edges: Image,
    pub dilated: Image,
    pub eroded: Image,
}

/// Canny edges cleaned by morphology; returns only the final binary map.
pub fn extract_edges(blurred: &Image, low_threshold: f32, high_threshold: f32) -> Result<Image> {
    Ok(extract_edge_maps(blurred, low_threshold, high_threshold)?.eroded)
}

pub fn extract_edge_maps(
    blurred: &Image,
    low_threshold: f32,
    high_threshold: f32,
) -> Result<EdgeMaps> {
    let edges = canny(blurred, low_threshold, high_threshold)?;
    let dilated = dilate(&edges, MORPH_KERNEL_SIZE, DILATE_ITERATIONS)?;
    let eroded = erode(&dilated, MORPH_KERNEL_SIZE, ERODE_ITERATIONS)?;
    debug!(
        edge_pixels = edges.count_nonzero(),
        cleaned_pixels = eroded.count_nonzero(),
        "Edge map extracted"
    );
    Ok(EdgeMaps {
        edges,
        dilated,
        eroded,
    })
}

/// Canny edge detector on a single-channel image, 255 on edges.
///
/// Runs `imageproc::edges::canny`, which smooths once more (sigma 1.4) and
/// measures gradients as the Euclidean norm of the Sobel pair. Pixels at or
/// above `high_threshold` seed edges and pixels at or above `low_threshold`
/// join them. Thresholds given in the wrong order are swapped. The
/// outermost pixel ring is never marked.
pub fn canny(image: &Image, low_threshold: f32, high_threshold: f32) -> Result<Image> {
    let gray = image.to_gray_buffer()?;
    if !low_threshold.is_finite() || !high_threshold.is_finite() {
        return Err(ScanError::InvalidConfig(format!(
            "edge thresholds must be finite, got {} and {}",
            low_threshold, high_threshold
        )));
    }
    let (low, high) = if low_threshold > high_threshold {
        (high_threshold, low_threshold)
    } else {
        (low_threshold, high_threshold)
    };
    let edges = imageproc::edges::canny(&gray, low, high);
    Ok(Image::from_gray_buffer(&edges))
}

/// Grow foreground with a square `kernel_size` element, `iterations` times.
pub fn dilate(image: &Image, kernel_size: usize, iterations: usize) -> Result<Image> {
    morph(image, kernel_size, iterations, Morph::Dilate)
}

/// Shrink foreground with a square `kernel_size` element, `iterations` times.
/// Pixels off the image do not count as background.
pub fn erode(image: &Image, kernel_size: usize, iterations: usize) -> Result<Image> {
    morph(image, kernel_size, iterations, Morph::Erode)
}

#[derive(Clone, Copy)]
enum Morph {
    Dilate,
    Erode,
}

impl Morph {
    /// One pass with the `LInf` ball of `radius`, a square element.
    fn pass(self, image: &GrayImage, radius: u8) -> GrayImage {
        match self {
            Morph::Dilate => morphology::dilate(image, Norm::LInf, radius),
            Morph::Erode => morphology::erode(image, Norm::LInf, radius),
        }
    }

    /// The distance transform saturates at width + height, so a map with
    /// nothing to grow into (or shrink from) must be left as it is.
    fn changes(self, image: &GrayImage) -> bool {
        match self {
            Morph::Dilate => image.iter().any(|&v| v != 0),
            Morph::Erode => image.iter().any(|&v| v == 0),
        }
    }
}

fn morph(image: &Image, kernel_size: usize, iterations: usize, op: Morph) -> Result<Image> {
    let radius = u8::try_from(kernel_size / 2).map_err(|_| {
        ScanError::InvalidConfig(format!("structuring element too large: {}", kernel_size))
    })?;
    let mut current = image.to_gray_buffer()?;
    for _ in 0..iterations {
        if !op.changes(&current) {
            break;
        }
        current = op.pass(&current, radius);
    }
    Ok(Image::from_gray_buffer(&current))
}
