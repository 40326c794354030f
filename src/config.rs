use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::error::{Result, ScanError};

/// Tunable parameters of the detection pipeline.
///
/// Missing fields in a config file fall back to the defaults below.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    /// Upper bound for the working image width.
    pub max_width: u32,
    /// Upper bound for the working image height.
    pub max_height: u32,
    /// Side length of the square Gaussian blur kernel (odd).
    pub blur_kernel: usize,
    /// Lower hysteresis threshold of the edge detector.
    pub canny_low: f32,
    /// Upper hysteresis threshold of the edge detector.
    pub canny_high: f32,
    /// Contours enclosing this area or less are ignored.
    pub min_contour_area: f64,
    /// Polygon simplification tolerance as a fraction of the contour perimeter.
    pub poly_simplify_factor: f64,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            max_width: 480,
            max_height: 640,
            blur_kernel: 5,
            canny_low: 100.0,
            canny_high: 200.0,
            min_contour_area: 300.0,
            poly_simplify_factor: 0.02,
        }
    }
}

impl PipelineConfig {
    /// Defaults with the stricter minimum contour area of 5000.
    pub fn strict() -> Self {
        Self {
            min_contour_area: 5000.0,
            ..Self::default()
        }
    }

    /// Load a JSON config file.
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self> {
        let text = std::fs::read_to_string(path.as_ref())?;
        let config: Self = serde_json::from_str(&text)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if self.max_width == 0 || self.max_height == 0 {
            return Err(ScanError::InvalidConfig(format!(
                "working bounds must be positive, got {}x{}",
                self.max_width, self.max_height
            )));
        }
        if self.blur_kernel == 0 || self.blur_kernel % 2 == 0 {
            return Err(ScanError::InvalidConfig(format!(
                "blur kernel must be odd, got {}",
                self.blur_kernel
            )));
        }
        if !(self.canny_low >= 0.0 && self.canny_high >= 0.0) {
            return Err(ScanError::InvalidConfig(format!(
                "edge thresholds must be non-negative, got {} / {}",
                self.canny_low, self.canny_high
            )));
        }
        if !(self.poly_simplify_factor > 0.0) {
            return Err(ScanError::InvalidConfig(format!(
                "simplify factor must be positive, got {}",
                self.poly_simplify_factor
            )));
        }
        Ok(())
    }
}
