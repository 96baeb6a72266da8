use std::path::{Path, PathBuf};

use tracing::{debug, info};

use crate::core::geometry::Roi;
use crate::core::processing::ProcessedImage;
use crate::error::Result;
use crate::io::earthengine::{EarthEngine, ImageHandle};
use crate::io::writers::MapDocument;
use crate::types::VisParams;

/// An image to draw, its layer label and stretch.
#[derive(Debug, Clone)]
pub struct Overlay {
    pub image: ImageHandle,
    pub label: String,
    pub vis: VisParams,
}

impl Overlay {
    pub fn new(image: ImageHandle, label: impl Into<String>, vis: VisParams) -> Self {
        Self {
            image,
            label: label.into(),
            vis,
        }
    }

    pub fn from_processed(processed: ProcessedImage, vis: VisParams) -> Self {
        let label = processed.label();
        Self::new(processed.image, label, vis)
    }
}

/// Turns overlays into tile layers on Earth Engine and writes the HTML map.
///
/// Every render goes to the same file. Concurrent renders are not
/// serialized; the last one to finish writing wins.
#[derive(Debug, Clone)]
pub struct MapRenderer {
    output_path: PathBuf,
}

impl MapRenderer {
    pub fn new(output_path: impl Into<PathBuf>) -> Self {
        Self {
            output_path: output_path.into(),
        }
    }

    pub fn output_path(&self) -> &Path {
        &self.output_path
    }

    pub async fn render<E: EarthEngine>(
        &self,
        engine: &E,
        overlays: &[Overlay],
        roi: &Roi,
    ) -> Result<PathBuf> {
        let mut doc = MapDocument::default();
        doc.bounds = roi.bounds();

        for overlay in overlays {
            let tiles = engine.map_tiles(&overlay.image, &overlay.vis).await?;
            debug!("Layer '{}' -> {}", overlay.label, tiles.map_name);
            doc.add_overlay(overlay.label.as_str(), tiles);
        }

        doc.save(&self.output_path).await?;
        info!(
            "Map with {} overlay(s) written to {:?}",
            doc.layers().len(),
            self.output_path
        );
        Ok(self.output_path.clone())
    }
}
