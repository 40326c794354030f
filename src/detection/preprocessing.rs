use imageproc::filter::separable_filter_equal;

use crate::error::{Result, ScanError};
use crate::models::Image;
use tracing::debug;

/// Fractional bits of the bilinear resize weights.
const RESIZE_COEF_BITS: u32 = 11;
const RESIZE_COEF_SCALE: u32 = 1 << RESIZE_COEF_BITS;

/// BGR luma weights in 14-bit fixed point (0.114, 0.587, 0.299).
const LUMA_B: u32 = 1868;
const LUMA_G: u32 = 9617;
const LUMA_R: u32 = 4899;
const LUMA_SHIFT: u32 = 14;

/// Blur weights are scaled so each 1-D pass sums to this value.
const BLUR_WEIGHT_SUM: u32 = 256;

/// Output of the preprocessing stage.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Preprocessed {
    /// Working-resolution copy of the source, same channel count.
    pub resized: Image,
    pub grayscale: Image,
    pub blurred: Image,
}

/// Resize into the working bounds, convert to grayscale and smooth.
pub fn preprocess(
    image: &Image,
    max_width: u32,
    max_height: u32,
    blur_kernel: usize,
) -> Result<Preprocessed> {
    if max_width == 0 || max_height == 0 {
        return Err(ScanError::InvalidConfig(format!(
            "working bounds must be positive, got {}x{}",
            max_width, max_height
        )));
    }
    let (width, height) = fit_within(image.width(), image.height(), max_width, max_height)?;
    debug!(
        src_width = image.width(),
        src_height = image.height(),
        width,
        height,
        "Resizing to working resolution"
    );

    let resized = resize(image, width, height);
    let grayscale = to_grayscale(&resized);
    let blurred = apply_blur(&grayscale, blur_kernel)?;

    Ok(Preprocessed {
        resized,
        grayscale,
        blurred,
    })
}

/// Working size for a `src_width x src_height` image inside the bounds.
///
/// One dimension is derived from the other while keeping the aspect
/// ratio; the derived value is rounded half-up and never below one pixel.
pub fn fit_within(
    src_width: u32,
    src_height: u32,
    max_width: u32,
    max_height: u32,
) -> Result<(u32, u32)> {
    if src_width == 0 || src_height == 0 {
        return Err(ScanError::InvalidImage(format!(
            "zero-area image {}x{}",
            src_width, src_height
        )));
    }
    let (sw, sh) = (src_width as u64, src_height as u64);
    let (mw, mh) = (max_width as u64, max_height as u64);

    let mut width = max_width;
    let mut height = max_height;
    if mw > mh * sw / sh {
        width = ((mh * sw) as f32 / sh as f32 + 0.5) as u32;
        width = width.max(1);
    } else if mh > mw * sh / sw {
        height = ((mw * sh) as f32 / sw as f32 + 0.5) as u32;
        height = height.max(1);
    }
    Ok((width, height))
}

/// Bilinear resize with pixel-centre alignment. Same-size input is copied.
pub fn resize(image: &Image, width: u32, height: u32) -> Image {
    if image.width() == width && image.height() == height {
        return image.clone();
    }
    let channels = image.channels() as usize;
    let src_stride = image.width() as usize * channels;
    let src = image.data();
    let x_taps = resize_taps(image.width(), width);
    let y_taps = resize_taps(image.height(), height);

    let mut out = Image::zeroed(width, height, image.channels());
    let dst = out.data_mut();
    let rounding = 1u32 << (2 * RESIZE_COEF_BITS - 1);

    for (y, ty) in y_taps.iter().enumerate() {
        let row0 = &src[ty.i0 * src_stride..(ty.i0 + 1) * src_stride];
        let row1 = &src[ty.i1 * src_stride..(ty.i1 + 1) * src_stride];
        let dst_row = &mut dst[y * width as usize * channels..(y + 1) * width as usize * channels];
        for (x, tx) in x_taps.iter().enumerate() {
            for c in 0..channels {
                let a = row0[tx.i0 * channels + c] as u32 * tx.w0
                    + row0[tx.i1 * channels + c] as u32 * tx.w1;
                let b = row1[tx.i0 * channels + c] as u32 * tx.w0
                    + row1[tx.i1 * channels + c] as u32 * tx.w1;
                let v = (a * ty.w0 + b * ty.w1 + rounding) >> (2 * RESIZE_COEF_BITS);
                dst_row[x * channels + c] = v.min(255) as u8;
            }
        }
    }
    out
}

struct Tap {
    i0: usize,
    i1: usize,
    w0: u32,
    w1: u32,
}

fn resize_taps(src_len: u32, dst_len: u32) -> Vec<Tap> {
    let scale = src_len as f64 / dst_len as f64;
    let last = src_len as usize - 1;
    (0..dst_len)
        .map(|d| {
            let f = ((d as f64 + 0.5) * scale - 0.5).max(0.0);
            let i0 = f.floor() as usize;
            if i0 >= last {
                return Tap {
                    i0: last,
                    i1: last,
                    w0: RESIZE_COEF_SCALE,
                    w1: 0,
                };
            }
            let w1 = ((f - i0 as f64) * RESIZE_COEF_SCALE as f64).round() as u32;
            Tap {
                i0,
                i1: i0 + 1,
                w0: RESIZE_COEF_SCALE - w1,
                w1,
            }
        })
        .collect()
}

/// Single-channel intensity. Colour input is read in BGR order.
pub fn to_grayscale(image: &Image) -> Image {
    if image.is_grayscale() {
        return image.clone();
    }
    let mut out = Image::zeroed(image.width(), image.height(), 1);
    let rounding = 1u32 << (LUMA_SHIFT - 1);
    for (dst, bgr) in out.data_mut().iter_mut().zip(image.data().chunks_exact(3)) {
        let y = bgr[0] as u32 * LUMA_B + bgr[1] as u32 * LUMA_G + bgr[2] as u32 * LUMA_R;
        *dst = ((y + rounding) >> LUMA_SHIFT).min(255) as u8;
    }
    out
}

/// 1-D Gaussian weights for an odd kernel size, summing to 256.
///
/// Sizes up to 7 use the binomial tables; larger kernels derive sigma from
/// the size as `0.3 * ((size - 1) / 2 - 1) + 0.8`.
pub fn gaussian_weights(size: usize) -> Result<Vec<u32>> {
    if size == 0 || size % 2 == 0 {
        return Err(ScanError::InvalidConfig(format!(
            "blur kernel must be odd, got {}",
            size
        )));
    }
    let kernel: Vec<f64> = match size {
        1 => vec![1.0],
        3 => vec![0.25, 0.5, 0.25],
        5 => vec![0.0625, 0.25, 0.375, 0.25, 0.0625],
        7 => vec![0.03125, 0.109375, 0.21875, 0.28125, 0.21875, 0.109375, 0.03125],
        _ => {
            let sigma = 0.3 * ((size as f64 - 1.0) * 0.5 - 1.0) + 0.8;
            let center = (size / 2) as f64;
            let raw: Vec<f64> = (0..size)
                .map(|i| {
                    let d = i as f64 - center;
                    (-(d * d) / (2.0 * sigma * sigma)).exp()
                })
                .collect();
            let total: f64 = raw.iter().sum();
            raw.into_iter().map(|w| w / total).collect()
        }
    };

    let mut weights: Vec<u32> = kernel
        .iter()
        .map(|w| (w * BLUR_WEIGHT_SUM as f64).round() as u32)
        .collect();
    // Fold the rounding residue into the centre tap.
    let residue = BLUR_WEIGHT_SUM as i64 - weights.iter().sum::<u32>() as i64;
    let center = size / 2;
    weights[center] = (weights[center] as i64 + residue) as u32;
    Ok(weights)
}

/// Separable Gaussian blur with replicated borders.
///
/// Each pass goes through `imageproc::filter::separable_filter_equal` with
/// the [`gaussian_weights`] taps; results are truncated to whole levels.
pub fn apply_blur(image: &Image, kernel_size: usize) -> Result<Image> {
    let kernel: Vec<f32> = gaussian_weights(kernel_size)?
        .into_iter()
        .map(|w| w as f32 / BLUR_WEIGHT_SUM as f32)
        .collect();
    if image.is_grayscale() {
        let blurred = separable_filter_equal(&image.to_gray_buffer()?, &kernel);
        Ok(Image::from_gray_buffer(&blurred))
    } else {
        let blurred = separable_filter_equal(&image.to_raw_rgb_buffer()?, &kernel);
        Ok(Image::from_raw_rgb_buffer(&blurred))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fit_keeps_bounds_and_aspect() {
        let sizes = [
            (4000, 3000),
            (3000, 4000),
            (1920, 1080),
            (480, 640),
            (100, 100),
            (7, 5000),
            (5000, 7),
            (641, 480),
            (123, 457),
        ];
        for &(sw, sh) in &sizes {
            let (w, h) = fit_within(sw, sh, 480, 640).unwrap();
            assert!(w >= 1 && w <= 480, "{}x{} -> {}x{}", sw, sh, w, h);
            assert!(h >= 1 && h <= 640, "{}x{} -> {}x{}", sw, sh, w, h);
            assert!(w == 480 || h == 640, "{}x{} -> {}x{}", sw, sh, w, h);

            // The derived side is within one pixel of the exact ratio.
            if w == 480 && h != 640 {
                let exact = 480.0 * sh as f64 / sw as f64;
                assert!((h as f64 - exact).abs() <= 1.0 || h == 1);
            } else if h == 640 && w != 480 {
                let exact = 640.0 * sw as f64 / sh as f64;
                assert!((w as f64 - exact).abs() <= 1.0 || w == 1);
            }
        }
    }

    #[test]
    fn fit_rounds_half_up() {
        // 640 * 1000 / 1500 = 426.67 -> 427
        assert_eq!(fit_within(1000, 1500, 480, 640).unwrap(), (427, 640));
        // 480 * 1000 / 1300 = 369.23 -> 369
        assert_eq!(fit_within(1300, 1000, 480, 640).unwrap(), (480, 369));
    }

    #[test]
    fn fit_matching_aspect_uses_both_bounds() {
        assert_eq!(fit_within(960, 1280, 480, 640).unwrap(), (480, 640));
    }

    #[test]
    fn fit_clamps_to_one_pixel() {
        assert_eq!(fit_within(1, 100_000, 480, 640).unwrap(), (1, 640));
    }

    #[test]
    fn fit_rejects_empty_source() {
        assert!(matches!(
            fit_within(0, 10, 480, 640),
            Err(ScanError::InvalidImage(_))
        ));
    }

    #[test]
    fn resize_same_size_is_copy() {
        let img = Image::from_fn_gray(9, 7, |x, y| (x * 20 + y) as u8).unwrap();
        assert_eq!(resize(&img, 9, 7), img);
    }

    #[test]
    fn resize_uniform_stays_uniform() {
        let img = Image::filled(50, 40, 3, 77).unwrap();
        let out = resize(&img, 17, 13);
        assert_eq!((out.width(), out.height(), out.channels()), (17, 13, 3));
        assert!(out.data().iter().all(|&v| v == 77));
    }

    #[test]
    fn resize_halves_a_gradient() {
        let img = Image::from_fn_gray(4, 1, |x, _| (x * 80) as u8).unwrap();
        let out = resize(&img, 2, 1);
        // Centres of the two output pixels fall between source pixels 0/1 and 2/3.
        assert_eq!(out.data(), &[40, 200]);
    }

    #[test]
    fn grayscale_reads_bgr() {
        let blue = Image::new(1, 1, 3, vec![255, 0, 0]).unwrap();
        let red = Image::new(1, 1, 3, vec![0, 0, 255]).unwrap();
        assert_eq!(to_grayscale(&blue).data(), &[29]);
        assert_eq!(to_grayscale(&red).data(), &[76]);
        let white = Image::filled(3, 2, 3, 255).unwrap();
        assert!(to_grayscale(&white).data().iter().all(|&v| v == 255));
    }

    #[test]
    fn binomial_weights() {
        assert_eq!(gaussian_weights(5).unwrap(), vec![16, 64, 96, 64, 16]);
        assert_eq!(gaussian_weights(1).unwrap(), vec![256]);
        let wide = gaussian_weights(11).unwrap();
        assert_eq!(wide.iter().sum::<u32>(), 256);
        assert!(gaussian_weights(4).is_err());
    }

    #[test]
    fn blur_preserves_flat_regions() {
        let img = Image::filled(12, 12, 1, 200).unwrap();
        assert_eq!(apply_blur(&img, 5).unwrap(), img);
    }

    #[test]
    fn blur_spreads_a_step() {
        let img = Image::from_fn_gray(10, 3, |x, _| if x < 5 { 255 } else { 0 }).unwrap();
        let out = apply_blur(&img, 5).unwrap();
        let row: Vec<u8> = (0..10).map(|x| out.luma(x, 1)).collect();
        assert_eq!(row, vec![255, 255, 255, 239, 175, 79, 15, 0, 0, 0]);
    }

    #[test]
    fn blur_keeps_colour_channels_apart() {
        let data = [10u8, 120, 230].repeat(8 * 8);
        let img = Image::new(8, 8, 3, data).unwrap();
        assert_eq!(apply_blur(&img, 5).unwrap(), img);
    }

    #[test]
    fn preprocess_produces_all_stages() {
        let img = Image::filled(960, 1280, 3, 128).unwrap();
        let pre = preprocess(&img, 480, 640, 5).unwrap();
        assert_eq!((pre.resized.width(), pre.resized.height()), (480, 640));
        assert_eq!(pre.resized.channels(), 3);
        assert_eq!(pre.grayscale.channels(), 1);
        assert_eq!(pre.blurred.channels(), 1);
    }
}
