//! The five detection stages, each a pure function over owned images.
//!
//! [`preprocessing`] bounds and smooths the input, [`edges`] builds the
//! cleaned edge map, [`contours`] traces outer boundaries, [`quads`] picks
//! the document candidate and [`rectify`] flattens it.

pub mod contours;
pub mod edges;
pub mod preprocessing;
pub mod quads;
pub mod rectify;

pub use contours::find_contours;
pub use edges::{canny, dilate, erode, extract_edge_maps, extract_edges, EdgeMaps};
pub use preprocessing::{preprocess, Preprocessed};
pub use quads::{approximate_polygon, select_best};
pub use rectify::rectify;
