//! Change detection between two composites: difference, region statistics
//! and the `mean + 1.5 σ` threshold.
use tracing::debug;

use crate::core::geometry::Roi;
use crate::core::processing::pipeline::ImageryPipeline;
use crate::error::{Error, Result};
use crate::io::earthengine::{EarthEngine, ImageHandle, RegionStats, RegionStatsOptions};
use crate::types::Polarization;

/// Standard deviations above the mean a difference must reach to count as change.
pub const CHANGE_THRESHOLD_SIGMA: f64 = 1.5;

/// Mean and standard deviation of a difference image over the region.
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct DifferenceStats {
    pub band: String,
    pub mean: f64,
    pub std_dev: f64,
}

impl DifferenceStats {
    /// Pick `<band>_mean` and `<band>_stdDev` out of a reduction result.
    pub fn from_region_stats(stats: &RegionStats, polarization: Polarization) -> Result<Self> {
        let band = polarization.band();
        let lookup = |suffix: &str| {
            let key = format!("{}_{}", band, suffix);
            stats.get(&key).ok_or(Error::MissingStatistic { key })
        };
        Ok(Self {
            band: band.to_string(),
            mean: lookup("mean")?,
            std_dev: lookup("stdDev")?,
        })
    }

    pub fn upper_threshold(&self) -> f64 {
        self.mean + CHANGE_THRESHOLD_SIGMA * self.std_dev
    }
}

impl<'a, E: EarthEngine> ImageryPipeline<'a, E> {
    /// `first - second`, pixelwise.
    pub async fn diff(&self, first: &ImageHandle, second: &ImageHandle) -> Result<ImageHandle> {
        Ok(self.engine.subtract(first, second).await?)
    }

    /// Combined mean/stdDev reduction at GRD resolution, capped at 1e8 pixels
    /// with best-effort rescaling.
    pub async fn stats(
        &self,
        diff: &ImageHandle,
        roi: &Roi,
        polarization: Polarization,
    ) -> Result<DifferenceStats> {
        let stats = self
            .engine
            .reduce_region_stats(diff, roi, &RegionStatsOptions::default())
            .await?;
        let stats = DifferenceStats::from_region_stats(&stats, polarization)?;
        debug!(
            "Difference stats for {}: mean={:.4} stdDev={:.4}",
            stats.band, stats.mean, stats.std_dev
        );
        Ok(stats)
    }

    /// 1 where the difference exceeds `mean + 1.5 σ`.
    pub async fn threshold(&self, diff: &ImageHandle, stats: &DifferenceStats) -> Result<ImageHandle> {
        Ok(self
            .engine
            .greater_than(diff, stats.upper_threshold())
            .await?)
    }
}
