//! Conversions between [`Image`] and the `image` crate, plus file helpers.

use image::{DynamicImage, GrayImage, ImageReader, Luma, Rgb, RgbImage};
use std::path::Path;
use tracing::debug;

use crate::error::{Result, ScanError};
use crate::models::Image;

impl Image {
    /// Grayscale sources stay single channel (alpha is dropped); everything
    /// else becomes three-channel BGR.
    pub fn from_dynamic(img: &DynamicImage) -> Result<Self> {
        if img.color().has_color() {
            let rgb = img.to_rgb8();
            let (width, height) = rgb.dimensions();
            let mut data = rgb.into_raw();
            for px in data.chunks_exact_mut(3) {
                px.swap(0, 2);
            }
            Image::new(width, height, 3, data)
        } else {
            let gray = img.to_luma8();
            let (width, height) = gray.dimensions();
            Image::new(width, height, 1, gray.into_raw())
        }
    }

    /// Back to an `image` crate buffer in RGB channel order.
    pub fn to_dynamic(&self) -> DynamicImage {
        if self.is_grayscale() {
            DynamicImage::ImageLuma8(self.gray_buffer_unchecked())
        } else {
            DynamicImage::ImageRgb8(RgbImage::from_fn(self.width(), self.height(), |x, y| {
                let p = self.pixel(x, y);
                Rgb([p[2], p[1], p[0]])
            }))
        }
    }

    /// Single-channel buffer for the `imageproc` stages.
    pub(crate) fn to_gray_buffer(&self) -> Result<GrayImage> {
        if !self.is_grayscale() {
            return Err(ScanError::InvalidImage(format!(
                "expected one channel, got {}",
                self.channels()
            )));
        }
        Ok(self.gray_buffer_unchecked())
    }

    /// Three-channel buffer with the samples in stored (BGR) order.
    pub(crate) fn to_raw_rgb_buffer(&self) -> Result<RgbImage> {
        if self.is_grayscale() {
            return Err(ScanError::InvalidImage(
                "expected three channels, got 1".to_string(),
            ));
        }
        Ok(RgbImage::from_fn(self.width(), self.height(), |x, y| {
            let p = self.pixel(x, y);
            Rgb([p[0], p[1], p[2]])
        }))
    }

    pub(crate) fn from_gray_buffer(buffer: &GrayImage) -> Self {
        let mut out = Image::zeroed(buffer.width(), buffer.height(), 1);
        out.data_mut().copy_from_slice(buffer.as_raw());
        out
    }

    /// Inverse of [`Image::to_raw_rgb_buffer`]; channel order is not touched.
    pub(crate) fn from_raw_rgb_buffer(buffer: &RgbImage) -> Self {
        let mut out = Image::zeroed(buffer.width(), buffer.height(), 3);
        out.data_mut().copy_from_slice(buffer.as_raw());
        out
    }

    fn gray_buffer_unchecked(&self) -> GrayImage {
        GrayImage::from_fn(self.width(), self.height(), |x, y| Luma([self.luma(x, y)]))
    }
}

/// Decode an image file.
pub fn load_image(path: impl AsRef<Path>) -> Result<Image> {
    let path = path.as_ref();
    let decoded = ImageReader::open(path)?.with_guessed_format()?.decode()?;
    debug!(
        path = %path.display(),
        width = decoded.width(),
        height = decoded.height(),
        "Image decoded"
    );
    Image::from_dynamic(&decoded)
}

/// Encode `image` to `path`; the format follows the file extension.
pub fn save_image(image: &Image, path: impl AsRef<Path>) -> Result<()> {
    image.to_dynamic().save(path.as_ref())?;
    Ok(())
}
