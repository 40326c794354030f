use tracing::{debug, info, instrument, warn};

use crate::config::PipelineConfig;
use crate::detection::{self, EdgeMaps, Preprocessed};
use crate::error::Result;
use crate::models::{Image, Quadrilateral};

/// Every intermediate image of one run, kept for inspection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Diagnostics {
    /// Working-resolution copy of the input; the source for rectification.
    pub resized: Image,
    pub grayscale: Image,
    pub blurred: Image,
    /// Raw Canny output.
    pub edges: Image,
    pub dilated: Image,
    /// Final cleaned edge map the contours are traced on.
    pub eroded: Image,
}

/// Result of the detection stages, before rectification.
#[derive(Debug, Clone)]
pub struct Detection {
    diagnostics: Diagnostics,
    contour_count: usize,
    quad: Option<Quadrilateral>,
}

impl Detection {
    pub fn diagnostics(&self) -> &Diagnostics {
        &self.diagnostics
    }

    /// Number of outer contours traced on the edge map.
    pub fn contour_count(&self) -> usize {
        self.contour_count
    }

    /// Chosen document boundary in working-image coordinates.
    pub fn quad(&self) -> Option<&Quadrilateral> {
        self.quad.as_ref()
    }

    /// Flatten the detected quadrilateral out of the working image.
    ///
    /// `Ok(None)` when nothing was detected. A quadrilateral that cannot
    /// be rectified is an error; the detection stays usable afterwards.
    pub fn rectify(&self) -> Result<Option<Image>> {
        let Some(quad) = &self.quad else {
            return Ok(None);
        };
        match detection::rectify(&self.diagnostics.resized, quad) {
            Ok(page) => Ok(Some(page)),
            Err(err) => {
                warn!(corners = ?quad.corners(), %err, "Rectification rejected");
                Err(err)
            }
        }
    }
}

/// Everything produced by a full run.
#[derive(Debug, Clone)]
pub struct ScanOutput {
    pub diagnostics: Diagnostics,
    pub quad: Option<Quadrilateral>,
    pub rectified: Option<Image>,
}

/// Page detection pipeline.
///
/// Holds only its configuration; every call is independent, so one
/// pipeline can serve many images, including from several threads.
#[derive(Debug, Clone, Default)]
pub struct Pipeline {
    config: PipelineConfig,
}

impl Pipeline {
    pub fn new(config: PipelineConfig) -> Self {
        Self { config }
    }

    /// Override the edge detector thresholds.
    pub fn with_thresholds(mut self, low: f32, high: f32) -> Self {
        self.config.canny_low = low;
        self.config.canny_high = high;
        self
    }

    /// Override the minimum contour area.
    pub fn with_min_area(mut self, min_area: f64) -> Self {
        self.config.min_contour_area = min_area;
        self
    }

    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    /// Run preprocessing, edge extraction, contour tracing and
    /// quadrilateral selection.
    #[instrument(skip_all, fields(width = image.width(), height = image.height()))]
    pub fn detect(&self, image: &Image) -> Result<Detection> {
        let config = &self.config;
        config.validate()?;

        let Preprocessed {
            resized,
            grayscale,
            blurred,
        } = detection::preprocess(image, config.max_width, config.max_height, config.blur_kernel)?;

        let EdgeMaps {
            edges,
            dilated,
            eroded,
        } = detection::extract_edge_maps(&blurred, config.canny_low, config.canny_high)?;

        let contours = detection::find_contours(&eroded);
        let quad = detection::select_best(
            &contours,
            config.min_contour_area,
            config.poly_simplify_factor,
        );
        debug!(contours = contours.len(), "Contours collected");

        match &quad {
            Some(q) => info!(corners = ?q.corners(), area = q.area(), "Document candidate found"),
            None => info!("No document detected"),
        }

        Ok(Detection {
            diagnostics: Diagnostics {
                resized,
                grayscale,
                blurred,
                edges,
                dilated,
                eroded,
            },
            contour_count: contours.len(),
            quad,
        })
    }

    /// Detect and rectify in one call.
    #[instrument(skip_all, fields(width = image.width(), height = image.height()))]
    pub fn process(&self, image: &Image) -> Result<ScanOutput> {
        let detection = self.detect(image)?;
        let rectified = detection.rectify()?;
        if let Some(page) = &rectified {
            info!(width = page.width(), height = page.height(), "Page rectified");
        }
        let Detection {
            diagnostics, quad, ..
        } = detection;
        Ok(ScanOutput {
            diagnostics,
            quad,
            rectified,
        })
    }
}
