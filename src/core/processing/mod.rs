//! Imagery processing: the load/despeckle pipeline and the change-detection
//! operations built on it.
pub mod ops;
pub mod pipeline;

pub use ops::{CHANGE_THRESHOLD_SIGMA, DifferenceStats};
pub use pipeline::{ImageryPipeline, ProcessedImage};
