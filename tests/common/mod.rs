mod fixtures;
pub use fixtures::*;

// Re-export commonly used types from pagefinder for tests
#[allow(unused_imports)]
pub use pagefinder::{Image, Pipeline, PipelineConfig, Point, Quadrilateral, ScanError};
