//! Recording stand-in for Earth Engine used by unit tests.

use std::sync::Mutex;

use crate::core::geometry::Roi;
use crate::types::VisParams;

use super::expr;
use super::{
    CollectionHandle, CollectionQuery, EarthEngine, EarthEngineError, ImageHandle, RegionStats,
    RegionStatsOptions, TileSource,
};

/// Builds real expression graphs, records every call, and fails on demand.
#[derive(Default)]
pub(crate) struct MockEarthEngine {
    pub calls: Mutex<Vec<String>>,
    pub rendered: Mutex<Vec<(ImageHandle, VisParams)>>,
    pub stats: RegionStats,
    pub fail_on: Option<&'static str>,
}

impl MockEarthEngine {
    pub fn with_stats(stats: RegionStats) -> Self {
        Self {
            stats,
            ..Default::default()
        }
    }

    pub fn failing_on(op: &'static str) -> Self {
        Self {
            fail_on: Some(op),
            ..Default::default()
        }
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }

    fn record(&self, op: &'static str, detail: String) -> Result<(), EarthEngineError> {
        self.calls.lock().unwrap().push(format!("{op}:{detail}"));
        if self.fail_on == Some(op) {
            return Err(EarthEngineError::Status {
                status: 400,
                message: format!("{op} rejected"),
            });
        }
        Ok(())
    }
}

impl EarthEngine for MockEarthEngine {
    async fn query_collection(
        &self,
        query: &CollectionQuery,
    ) -> Result<CollectionHandle, EarthEngineError> {
        self.record(
            "query_collection",
            format!("{}/{}..{}", query.polarization, query.start, query.end),
        )?;
        Ok(CollectionHandle::new(expr::image_collection(query)))
    }

    async fn reduce_median(
        &self,
        collection: CollectionHandle,
        band: &str,
    ) -> Result<ImageHandle, EarthEngineError> {
        self.record("reduce_median", band.to_string())?;
        Ok(ImageHandle::new(expr::select(
            expr::median(collection.into_node()),
            band,
        )))
    }

    async fn clip(&self, image: ImageHandle, roi: &Roi) -> Result<ImageHandle, EarthEngineError> {
        self.record("clip", roi.coordinates.len().to_string())?;
        Ok(ImageHandle::new(expr::clip(image.into_node(), roi)))
    }

    async fn focal_mean(
        &self,
        image: ImageHandle,
        radius_meters: f64,
    ) -> Result<ImageHandle, EarthEngineError> {
        self.record("focal_mean", radius_meters.to_string())?;
        Ok(ImageHandle::new(expr::focal_mean(
            image.into_node(),
            radius_meters,
        )))
    }

    async fn subtract(
        &self,
        minuend: &ImageHandle,
        subtrahend: &ImageHandle,
    ) -> Result<ImageHandle, EarthEngineError> {
        self.record("subtract", String::new())?;
        Ok(ImageHandle::new(expr::subtract(
            minuend.node().clone(),
            subtrahend.node().clone(),
        )))
    }

    async fn greater_than(
        &self,
        image: &ImageHandle,
        threshold: f64,
    ) -> Result<ImageHandle, EarthEngineError> {
        self.record("greater_than", threshold.to_string())?;
        Ok(ImageHandle::new(expr::greater_than(
            image.node().clone(),
            threshold,
        )))
    }

    async fn reduce_region_stats(
        &self,
        _image: &ImageHandle,
        _roi: &Roi,
        options: &RegionStatsOptions,
    ) -> Result<RegionStats, EarthEngineError> {
        self.record("reduce_region_stats", options.max_pixels.to_string())?;
        Ok(self.stats.clone())
    }

    async fn map_tiles(
        &self,
        image: &ImageHandle,
        vis: &VisParams,
    ) -> Result<TileSource, EarthEngineError> {
        self.record("map_tiles", format!("{}..{}", vis.min, vis.max))?;
        let mut rendered = self.rendered.lock().unwrap();
        rendered.push((image.clone(), vis.clone()));
        let n = rendered.len();
        Ok(TileSource {
            map_name: format!("projects/mock/maps/{n}"),
            url_template: format!("https://tiles.test/{n}/{{z}}/{{x}}/{{y}}"),
        })
    }
}
