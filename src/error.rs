//! Crate-level error type and `Result` alias for stable, structured error handling.
//! Converts underlying I/O, JSON and Earth Engine errors, and provides semantic
//! variants for request validation failures.
use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Error)]
pub enum Error {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid request body: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Earth Engine error: {0}")]
    EarthEngine(#[from] crate::io::EarthEngineError),

    #[error("Invalid argument: {arg}={value}")]
    InvalidArgument { arg: &'static str, value: String },

    #[error("At least one radar image is required")]
    NoImages,

    #[error("Polarisation mismatch: before={before}, after={after}")]
    PolarizationMismatch { before: String, after: String },

    #[error("Missing statistic in region reduction: {key}")]
    MissingStatistic { key: String },
}
