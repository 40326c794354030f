pub mod codec;
pub mod config;
pub mod debug;
pub mod detection;
pub mod error;
pub mod geometry;
pub mod models;
pub mod overlay;
pub mod pipeline;

pub use codec::{load_image, save_image};
pub use config::PipelineConfig;
pub use debug::DebugOutput;
pub use error::{Result, ScanError};
pub use geometry::{Point, Transform3x3};
pub use models::{Contour, Image, Polygon, Quadrilateral};
pub use pipeline::{Detection, Diagnostics, Pipeline, ScanOutput};
