//! Google Earth Engine adapter.
//!
//! The processing pipeline and the map renderer only see the [`EarthEngine`]
//! trait: a narrow set of remote operations over opaque image handles. The
//! production implementation is [`RestEarthEngine`], which talks to the Earth
//! Engine REST API with a service-account [`Session`].
//!
//! Image handles carry an expression graph, not pixels. Building a handle is
//! cheap; work only happens on Earth Engine when statistics are reduced or a
//! map is requested.

pub mod auth;
pub mod expr;
pub mod rest;

#[cfg(test)]
pub(crate) mod mock;
#[cfg(test)]
pub(crate) mod stub;

use std::collections::BTreeMap;
use std::future::Future;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::core::geometry::Roi;
use crate::types::{InstrumentMode, Polarization, VisParams};

pub use auth::{CredentialError, EARTH_ENGINE_READONLY_SCOPE, ServiceAccountKey, Session};
pub use expr::{Expression, ValueNode};
pub use rest::RestEarthEngine;

/// Errors raised by Earth Engine calls.
#[derive(Debug, Error)]
pub enum EarthEngineError {
    #[error("HTTP error: {0}")]
    Http(String),
    #[error("{message} (HTTP {status})")]
    Status { status: u16, message: String },
    #[error("Invalid response: {0}")]
    InvalidResponse(String),
    #[error(transparent)]
    Credentials(#[from] CredentialError),
}

/// Lazily evaluated image on the remote platform.
#[derive(Clone, Debug, PartialEq)]
pub struct ImageHandle(ValueNode);

impl ImageHandle {
    pub fn new(node: ValueNode) -> Self {
        Self(node)
    }

    pub fn node(&self) -> &ValueNode {
        &self.0
    }

    pub fn into_node(self) -> ValueNode {
        self.0
    }
}

/// Lazily evaluated image collection on the remote platform.
#[derive(Clone, Debug, PartialEq)]
pub struct CollectionHandle(ValueNode);

impl CollectionHandle {
    pub fn new(node: ValueNode) -> Self {
        Self(node)
    }

    pub fn node(&self) -> &ValueNode {
        &self.0
    }

    pub fn into_node(self) -> ValueNode {
        self.0
    }
}

/// Catalog filter for a median composite.
#[derive(Clone, Debug, PartialEq)]
pub struct CollectionQuery {
    pub collection_id: String,
    pub polarization: Polarization,
    pub instrument_mode: InstrumentMode,
    pub resolution_meters: u32,
    pub start: NaiveDate,
    /// Exclusive upper bound
    pub end: NaiveDate,
    pub roi: Roi,
}

/// Options of the mean/stdDev region reduction.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct RegionStatsOptions {
    /// Nominal scale in meters
    pub scale: f64,
    pub max_pixels: f64,
    /// Let Earth Engine coarsen the scale when `max_pixels` would be exceeded
    pub best_effort: bool,
}

impl Default for RegionStatsOptions {
    fn default() -> Self {
        Self {
            scale: 10.0,
            max_pixels: 1e8,
            best_effort: true,
        }
    }
}

/// Dictionary returned by a region reduction, keyed `<band>_<statistic>`.
///
/// Values may be null when the region holds no valid pixels.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct RegionStats(BTreeMap<String, serde_json::Value>);

impl RegionStats {
    pub fn get(&self, key: &str) -> Option<f64> {
        self.0.get(key).and_then(serde_json::Value::as_f64)
    }
}

impl FromIterator<(String, f64)> for RegionStats {
    fn from_iter<I: IntoIterator<Item = (String, f64)>>(iter: I) -> Self {
        Self(
            iter.into_iter()
                .map(|(k, v)| (k, serde_json::Value::from(v)))
                .collect(),
        )
    }
}

impl From<serde_json::Map<String, serde_json::Value>> for RegionStats {
    fn from(map: serde_json::Map<String, serde_json::Value>) -> Self {
        Self(map.into_iter().collect())
    }
}

/// XYZ tile endpoint of a rendered image.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct TileSource {
    /// Resource name of the map on the remote platform
    pub map_name: String,
    /// Template with `{z}`, `{x}` and `{y}` placeholders
    pub url_template: String,
}

/// Remote geospatial operations used by the pipeline and the renderer.
///
/// Handles are passed by value where the operation wraps them into a new
/// graph node, and by reference where the call only reads them.
pub trait EarthEngine: Send + Sync {
    /// Filtered catalog collection.
    fn query_collection(
        &self,
        query: &CollectionQuery,
    ) -> impl Future<Output = Result<CollectionHandle, EarthEngineError>> + Send;

    /// Per-pixel median of a collection, restricted to one band.
    fn reduce_median(
        &self,
        collection: CollectionHandle,
        band: &str,
    ) -> impl Future<Output = Result<ImageHandle, EarthEngineError>> + Send;

    fn clip(
        &self,
        image: ImageHandle,
        roi: &Roi,
    ) -> impl Future<Output = Result<ImageHandle, EarthEngineError>> + Send;

    /// Circular mean filter, radius in meters.
    fn focal_mean(
        &self,
        image: ImageHandle,
        radius_meters: f64,
    ) -> impl Future<Output = Result<ImageHandle, EarthEngineError>> + Send;

    /// Pixelwise `minuend - subtrahend`.
    fn subtract(
        &self,
        minuend: &ImageHandle,
        subtrahend: &ImageHandle,
    ) -> impl Future<Output = Result<ImageHandle, EarthEngineError>> + Send;

    /// 1 where the pixel exceeds `threshold`, 0 elsewhere.
    fn greater_than(
        &self,
        image: &ImageHandle,
        threshold: f64,
    ) -> impl Future<Output = Result<ImageHandle, EarthEngineError>> + Send;

    /// Mean and standard deviation over the region.
    fn reduce_region_stats(
        &self,
        image: &ImageHandle,
        roi: &Roi,
        options: &RegionStatsOptions,
    ) -> impl Future<Output = Result<RegionStats, EarthEngineError>> + Send;

    /// Render the image with the given stretch and return its tile endpoint.
    fn map_tiles(
        &self,
        image: &ImageHandle,
        vis: &VisParams,
    ) -> impl Future<Output = Result<TileSource, EarthEngineError>> + Send;
}
