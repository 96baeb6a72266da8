use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::core::geometry::Roi;
use crate::error::{Error, Result};
use crate::types::Polarization;

/// Focal-mean radius in meters when a request leaves `smoothing` out.
pub const DEFAULT_SMOOTHING_RADIUS: u32 = 50;

fn default_smoothing() -> u32 {
    DEFAULT_SMOOTHING_RADIUS
}

/// One overlay: a median composite over a date range for one polarisation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RadarImageRequest {
    pub start_date: NaiveDate,
    /// Exclusive
    pub end_date: NaiveDate,
    pub polarisation: Polarization,
    /// Despeckle radius in meters
    #[serde(default = "default_smoothing")]
    pub smoothing: u32,
}

impl RadarImageRequest {
    /// Layer label, e.g. `VH 2023-01-01 - 2023-02-01`.
    pub fn label(&self) -> String {
        format!(
            "{} {} - {}",
            self.polarisation, self.start_date, self.end_date
        )
    }
}

/// Body of `POST /generate-map/`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RadarImagesRequest {
    pub roi: Roi,
    /// Draw order of the overlays
    pub images: Vec<RadarImageRequest>,
}

impl RadarImagesRequest {
    pub fn from_json(body: &[u8]) -> Result<Self> {
        let request: Self = serde_json::from_slice(body)?;
        request.validate()?;
        Ok(request)
    }

    pub fn validate(&self) -> Result<()> {
        if self.images.is_empty() {
            return Err(Error::NoImages);
        }
        Ok(())
    }
}

/// Body of `POST /detect-change/`: two composites of the same polarisation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChangeDetectionRequest {
    pub roi: Roi,
    pub before: RadarImageRequest,
    pub after: RadarImageRequest,
}

impl ChangeDetectionRequest {
    pub fn from_json(body: &[u8]) -> Result<Self> {
        let request: Self = serde_json::from_slice(body)?;
        request.validate()?;
        Ok(request)
    }

    /// Statistics are keyed by band name, so both sides must share it.
    pub fn validate(&self) -> Result<()> {
        if self.before.polarisation != self.after.polarisation {
            return Err(Error::PolarizationMismatch {
                before: self.before.polarisation.to_string(),
                after: self.after.polarisation.to_string(),
            });
        }
        Ok(())
    }
}
