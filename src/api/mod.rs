//! High-level entry points behind the HTTP endpoints: build the overlay map for
//! a list of radar composites, or run change detection between two of them.
//! Prefer these over wiring the pipeline and renderer by hand.
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::core::config::ServiceConfig;
use crate::core::params::{ChangeDetectionRequest, RadarImagesRequest};
use crate::core::processing::{DifferenceStats, ImageryPipeline};
use crate::core::render::{MapRenderer, Overlay};
use crate::error::{Error, Result};
use crate::io::earthengine::EarthEngine;
use crate::types::VisParams;

/// Success body of `POST /generate-map/`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MapResponse {
    pub map_url: String,
}

/// Statistics of a change-detection run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChangeSummary {
    pub band: String,
    pub mean: f64,
    pub std_dev: f64,
    pub threshold: f64,
}

impl From<&DifferenceStats> for ChangeSummary {
    fn from(stats: &DifferenceStats) -> Self {
        Self {
            band: stats.band.clone(),
            mean: stats.mean,
            std_dev: stats.std_dev,
            threshold: stats.upper_threshold(),
        }
    }
}

/// Success body of `POST /detect-change/`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChangeDetectionResponse {
    pub map_url: String,
    pub stats: ChangeSummary,
}

/// Stateless request processor: holds the adapter, the renderer and the
/// public URL of the artifact.
pub struct MapService<E> {
    engine: E,
    renderer: MapRenderer,
    map_url: String,
}

impl<E: EarthEngine> MapService<E> {
    pub fn new(engine: E, renderer: MapRenderer, map_url: impl Into<String>) -> Self {
        Self {
            engine,
            renderer,
            map_url: map_url.into(),
        }
    }

    pub fn from_config(engine: E, config: &ServiceConfig) -> Self {
        Self::new(
            engine,
            MapRenderer::new(config.artifact_path()),
            config.artifact_url(),
        )
    }

    pub fn engine(&self) -> &E {
        &self.engine
    }

    pub fn renderer(&self) -> &MapRenderer {
        &self.renderer
    }

    /// One despeckled overlay per requested image, in request order. The
    /// stretch comes from the first image and is shared by all layers.
    pub async fn generate_map(&self, request: &RadarImagesRequest) -> Result<MapResponse> {
        let first = request.images.first().ok_or(Error::NoImages)?;
        let vis = VisParams::for_polarization(first.polarisation);
        info!(
            "Generating map with {} layer(s), stretch [{}, {}]",
            request.images.len(),
            vis.min,
            vis.max
        );

        let pipeline = ImageryPipeline::new(&self.engine);
        let mut overlays = Vec::with_capacity(request.images.len());
        for radar_image in &request.images {
            let processed = pipeline.process(radar_image, &request.roi).await?;
            debug!("Prepared layer '{}'", processed.label());
            overlays.push(Overlay::from_processed(processed, vis.clone()));
        }

        self.renderer
            .render(&self.engine, &overlays, &request.roi)
            .await?;
        Ok(MapResponse {
            map_url: self.map_url.clone(),
        })
    }

    /// Before/after composites, their difference thresholded at `mean + 1.5 σ`.
    pub async fn detect_change(
        &self,
        request: &ChangeDetectionRequest,
    ) -> Result<ChangeDetectionResponse> {
        request.validate()?;
        let polarisation = request.before.polarisation;
        info!(
            "Detecting {} change between {} and {}",
            polarisation,
            request.before.label(),
            request.after.label()
        );

        let pipeline = ImageryPipeline::new(&self.engine);
        let before = pipeline.process(&request.before, &request.roi).await?;
        let after = pipeline.process(&request.after, &request.roi).await?;

        let diff = pipeline.diff(&before.image, &after.image).await?;
        let stats = pipeline.stats(&diff, &request.roi, polarisation).await?;
        let mask = pipeline.threshold(&diff, &stats).await?;

        let vis = VisParams::for_polarization(polarisation);
        let overlays = [
            Overlay::from_processed(before, vis.clone()),
            Overlay::from_processed(after, vis),
            Overlay::new(
                mask,
                format!("{} change > {:.2}", polarisation, stats.upper_threshold()),
                VisParams::change_mask(),
            ),
        ];
        self.renderer
            .render(&self.engine, &overlays, &request.roi)
            .await?;

        Ok(ChangeDetectionResponse {
            map_url: self.map_url.clone(),
            stats: ChangeSummary::from(&stats),
        })
    }
}
