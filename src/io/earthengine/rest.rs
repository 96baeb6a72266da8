//! Earth Engine REST adapter.
//!
//! Graph-building operations never leave the process. Two calls hit the
//! network:
//! - `projects/{project}/value:compute` evaluates region statistics
//! - `projects/{project}/maps` renders an image and returns a map name whose
//!   tiles are served at `{api_base}/v1/{name}/tiles/{z}/{x}/{y}`

use std::sync::Arc;

use serde::Deserialize;
use serde::de::DeserializeOwned;
use serde_json::{Value, json};
use tracing::debug;

use crate::core::geometry::Roi;
use crate::types::VisParams;

use super::auth::Session;
use super::expr::{self, Expression};
use super::{
    CollectionHandle, CollectionQuery, EarthEngine, EarthEngineError, ImageHandle, RegionStats,
    RegionStatsOptions, TileSource,
};

/// Public Earth Engine API endpoint.
pub const DEFAULT_API_BASE: &str = "https://earthengine.googleapis.com";

#[derive(Deserialize)]
struct ComputeValueResponse {
    result: Value,
}

#[derive(Deserialize)]
struct MapResponse {
    name: String,
}

#[derive(Deserialize)]
struct ErrorBody {
    error: ErrorDetail,
}

#[derive(Deserialize)]
struct ErrorDetail {
    message: String,
}

/// Extracts `error.message` from a Google API error body, falling back to the raw text.
fn error_message(body: &[u8]) -> String {
    match serde_json::from_slice::<ErrorBody>(body) {
        Ok(parsed) => parsed.error.message,
        Err(_) => String::from_utf8_lossy(body).into_owned(),
    }
}

/// Earth Engine over HTTPS, authenticated by a shared [`Session`].
#[derive(Clone)]
pub struct RestEarthEngine {
    session: Arc<Session>,
    http: reqwest::Client,
    api_base: String,
}

impl RestEarthEngine {
    pub fn new(session: Arc<Session>) -> Result<Self, EarthEngineError> {
        Self::with_api_base(session, DEFAULT_API_BASE)
    }

    pub fn with_api_base(
        session: Arc<Session>,
        api_base: impl Into<String>,
    ) -> Result<Self, EarthEngineError> {
        let http = reqwest::Client::builder()
            .user_agent(concat!("sarmap/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| EarthEngineError::Http(format!("Failed to create HTTP client: {}", e)))?;
        Ok(Self {
            session,
            http,
            api_base: api_base.into().trim_end_matches('/').to_string(),
        })
    }

    fn project_url(&self, method: &str) -> String {
        format!(
            "{}/v1/projects/{}/{}",
            self.api_base,
            self.session.project_id(),
            method
        )
    }

    async fn post<T: DeserializeOwned>(&self, url: &str, body: &Value) -> Result<T, EarthEngineError> {
        let token = self.session.bearer_token().await?;
        debug!("POST {}", url);
        let response = self
            .http
            .post(url)
            .bearer_auth(token)
            .json(body)
            .send()
            .await
            .map_err(|e| EarthEngineError::Http(format!("Request failed: {}", e)))?;

        let status = response.status();
        let bytes = response
            .bytes()
            .await
            .map_err(|e| EarthEngineError::Http(format!("Failed to read response: {}", e)))?;

        if !status.is_success() {
            return Err(EarthEngineError::Status {
                status: status.as_u16(),
                message: error_message(&bytes),
            });
        }

        serde_json::from_slice(&bytes).map_err(|e| {
            EarthEngineError::InvalidResponse(format!("Unexpected response from {}: {}", url, e))
        })
    }
}

fn visualization_options(vis: &VisParams) -> Value {
    let mut options = json!({
        "ranges": [{ "min": vis.min, "max": vis.max }],
    });
    if let Some(palette) = &vis.palette {
        options["paletteColors"] = json!(palette);
    }
    options
}

impl EarthEngine for RestEarthEngine {
    async fn query_collection(
        &self,
        query: &CollectionQuery,
    ) -> Result<CollectionHandle, EarthEngineError> {
        Ok(CollectionHandle::new(expr::image_collection(query)))
    }

    async fn reduce_median(
        &self,
        collection: CollectionHandle,
        band: &str,
    ) -> Result<ImageHandle, EarthEngineError> {
        Ok(ImageHandle::new(expr::select(
            expr::median(collection.into_node()),
            band,
        )))
    }

    async fn clip(&self, image: ImageHandle, roi: &Roi) -> Result<ImageHandle, EarthEngineError> {
        Ok(ImageHandle::new(expr::clip(image.into_node(), roi)))
    }

    async fn focal_mean(
        &self,
        image: ImageHandle,
        radius_meters: f64,
    ) -> Result<ImageHandle, EarthEngineError> {
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
        Ok(ImageHandle::new(expr::greater_than(
            image.node().clone(),
            threshold,
        )))
    }

    async fn reduce_region_stats(
        &self,
        image: &ImageHandle,
        roi: &Roi,
        options: &RegionStatsOptions,
    ) -> Result<RegionStats, EarthEngineError> {
        let expression = Expression::new(expr::reduce_region(image.node().clone(), roi, options));
        let body = json!({ "expression": expression });
        let response: ComputeValueResponse =
            self.post(&self.project_url("value:compute"), &body).await?;
        match response.result {
            Value::Object(map) => Ok(RegionStats::from(map)),
            other => Err(EarthEngineError::InvalidResponse(format!(
                "Expected a dictionary of statistics, got {}",
                other
            ))),
        }
    }

    async fn map_tiles(
        &self,
        image: &ImageHandle,
        vis: &VisParams,
    ) -> Result<TileSource, EarthEngineError> {
        let body = json!({
            "expression": Expression::new(image.node().clone()),
            "fileFormat": "AUTO_JPEG_PNG",
            "visualizationOptions": visualization_options(vis),
        });
        let response: MapResponse = self.post(&self.project_url("maps"), &body).await?;
        let url_template = format!("{}/v1/{}/tiles/{{z}}/{{x}}/{{y}}", self.api_base, response.name);
        debug!("Map {} ready", response.name);
        Ok(TileSource {
            map_name: response.name,
            url_template,
        })
    }
}
