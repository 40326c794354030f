use thiserror::Error;

/// Errors raised by the page detection pipeline and its collaborators.
///
/// "No document detected" is not an error; it is reported as `None`.
#[derive(Debug, Error)]
pub enum ScanError {
    #[error("invalid image: {0}")]
    InvalidImage(String),

    #[error("degenerate quadrilateral: rectified size would be {width}x{height}")]
    DegenerateQuadrilateral { width: u32, height: u32 },

    #[error("invalid pipeline configuration: {0}")]
    InvalidConfig(String),

    #[error("debug directory is not empty: {}", .0.display())]
    DebugDirNotEmpty(std::path::PathBuf),

    #[error("image codec error: {0}")]
    Codec(#[from] image::ImageError),

    #[error("file I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to parse configuration: {0}")]
    Config(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, ScanError>;
