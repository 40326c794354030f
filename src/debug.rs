use std::path::{Path, PathBuf};
use tracing::debug;

use crate::codec::save_image;
use crate::error::{Result, ScanError};
use crate::models::Image;
use crate::pipeline::Detection;

/// Writes the intermediate images of a run as numbered PNG files.
#[derive(Debug, Clone)]
pub struct DebugOutput {
    dir: PathBuf,
}

impl DebugOutput {
    /// Use `dir` for debug images. The directory must be empty or
    /// non-existent; a missing one is created.
    pub fn prepare(dir: impl Into<PathBuf>) -> Result<Self> {
        let dir = dir.into();
        if dir.exists() {
            if std::fs::read_dir(&dir)?.next().is_some() {
                return Err(ScanError::DebugDirNotEmpty(dir));
            }
        } else {
            std::fs::create_dir_all(&dir)?;
        }
        Ok(Self { dir })
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Save every stage image plus the corner overlay and the rectified
    /// page when present. Returns the written paths in stage order.
    pub fn write(&self, detection: &Detection, rectified: Option<&Image>) -> Result<Vec<PathBuf>> {
        let d = detection.diagnostics();
        let overlay = detection.corner_overlay();
        let stages = [
            ("resized", Some(&d.resized)),
            ("grayscale", Some(&d.grayscale)),
            ("blurred", Some(&d.blurred)),
            ("edges", Some(&d.edges)),
            ("dilated", Some(&d.dilated)),
            ("eroded", Some(&d.eroded)),
            ("corners", overlay.as_ref()),
            ("rectified", rectified),
        ];

        let mut written = Vec::new();
        for (idx, (name, image)) in stages.into_iter().enumerate() {
            let Some(image) = image else {
                continue;
            };
            let path = self.dir.join(format!("{:02}_{}.png", idx, name));
            save_image(image, &path)?;
            debug!(path = %path.display(), "Saved debug image");
            written.push(path);
        }
        Ok(written)
    }
}
