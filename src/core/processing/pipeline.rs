use chrono::NaiveDate;
use tracing::debug;

use crate::core::geometry::Roi;
use crate::core::params::RadarImageRequest;
use crate::error::Result;
use crate::io::earthengine::{CollectionQuery, EarthEngine, ImageHandle};
use crate::types::{InstrumentMode, Polarization};

/// Sentinel-1 Ground Range Detected scenes in the Earth Engine catalog.
pub const S1_GRD_COLLECTION: &str = "COPERNICUS/S1_GRD";
/// Pixel spacing of the high-resolution IW GRD products.
pub const GRD_RESOLUTION_METERS: u32 = 10;

/// A despeckled composite together with the request it answers.
#[derive(Debug, Clone)]
pub struct ProcessedImage {
    pub image: ImageHandle,
    pub polarisation: Polarization,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub smoothing: u32,
}

impl ProcessedImage {
    pub fn label(&self) -> String {
        format!(
            "{} {} - {}",
            self.polarisation, self.start_date, self.end_date
        )
    }
}

/// Load → despeckle on top of an Earth Engine adapter. Every step is a remote
/// operation; errors are returned as-is.
pub struct ImageryPipeline<'a, E> {
    pub(crate) engine: &'a E,
}

impl<'a, E: EarthEngine> ImageryPipeline<'a, E> {
    pub fn new(engine: &'a E) -> Self {
        Self { engine }
    }

    /// Median IW composite over `[start, end)` for one polarisation, clipped
    /// to the region. An empty match set is not detected here.
    pub async fn load(
        &self,
        start: NaiveDate,
        end: NaiveDate,
        polarization: Polarization,
        roi: &Roi,
    ) -> Result<ImageHandle> {
        let query = CollectionQuery {
            collection_id: S1_GRD_COLLECTION.to_string(),
            polarization,
            instrument_mode: InstrumentMode::IW,
            resolution_meters: GRD_RESOLUTION_METERS,
            start,
            end,
            roi: roi.clone(),
        };
        let collection = self.engine.query_collection(&query).await?;
        let composite = self
            .engine
            .reduce_median(collection, polarization.band())
            .await?;
        Ok(self.engine.clip(composite, roi).await?)
    }

    /// Circular mean filter; `radius_meters` is the kernel radius.
    pub async fn despeckle(&self, image: ImageHandle, radius_meters: u32) -> Result<ImageHandle> {
        Ok(self
            .engine
            .focal_mean(image, f64::from(radius_meters))
            .await?)
    }

    pub async fn process(&self, request: &RadarImageRequest, roi: &Roi) -> Result<ProcessedImage> {
        debug!(
            "Loading {} composite {}..{} (smoothing {} m)",
            request.polarisation, request.start_date, request.end_date, request.smoothing
        );
        let image = self
            .load(
                request.start_date,
                request.end_date,
                request.polarisation,
                roi,
            )
            .await?;
        let image = self.despeckle(image, request.smoothing).await?;
        Ok(ProcessedImage {
            image,
            polarisation: request.polarisation,
            start_date: request.start_date,
            end_date: request.end_date,
            smoothing: request.smoothing,
        })
    }
}
