#![allow(dead_code)]

use std::sync::{Arc, Mutex};

use axum::Router;
use axum::body::Body;
use axum::http::{Request, Response, StatusCode};
use sarmap::api::MapService;
use sarmap::core::config::ServiceConfig;
use sarmap::core::geometry::Roi;
use sarmap::io::earthengine::expr;
use sarmap::io::earthengine::{
    CollectionHandle, CollectionQuery, EarthEngine, EarthEngineError, ImageHandle, RegionStats,
    RegionStatsOptions, TileSource,
};
use sarmap::types::VisParams;
use tempfile::TempDir;

/// In-process Earth Engine: builds real expression graphs, records calls,
/// and can be told to reject one operation.
#[derive(Default)]
pub struct FakeEarthEngine {
    pub calls: Mutex<Vec<String>>,
    pub rendered: Mutex<Vec<VisParams>>,
    pub stats: RegionStats,
    pub fail_on: Option<&'static str>,
}

impl FakeEarthEngine {
    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }

    pub fn rendered(&self) -> Vec<VisParams> {
        self.rendered.lock().unwrap().clone()
    }

    fn record(&self, op: &'static str, detail: String) -> Result<(), EarthEngineError> {
        self.calls.lock().unwrap().push(format!("{op}:{detail}"));
        if self.fail_on == Some(op) {
            return Err(EarthEngineError::Status {
                status: 400,
                message: format!("{op}: ImageCollection is empty"),
            });
        }
        Ok(())
    }
}

impl EarthEngine for FakeEarthEngine {
    async fn query_collection(
        &self,
        query: &CollectionQuery,
    ) -> Result<CollectionHandle, EarthEngineError> {
        self.record("query_collection", query.polarization.to_string())?;
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
        self.record("clip", String::new())?;
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
        _options: &RegionStatsOptions,
    ) -> Result<RegionStats, EarthEngineError> {
        self.record("reduce_region_stats", String::new())?;
        Ok(self.stats.clone())
    }

    async fn map_tiles(
        &self,
        _image: &ImageHandle,
        vis: &VisParams,
    ) -> Result<TileSource, EarthEngineError> {
        self.record("map_tiles", String::new())?;
        let mut rendered = self.rendered.lock().unwrap();
        rendered.push(vis.clone());
        let n = rendered.len();
        Ok(TileSource {
            map_name: format!("projects/fake/maps/{n}"),
            url_template: format!("https://tiles.test/{n}/{{z}}/{{x}}/{{y}}"),
        })
    }
}

pub struct TestApp {
    pub router: Router,
    pub service: Arc<MapService<FakeEarthEngine>>,
    pub config: ServiceConfig,
    _dir: TempDir,
}

impl TestApp {
    pub fn new(engine: FakeEarthEngine) -> Self {
        let dir = tempfile::tempdir().unwrap();
        let config = ServiceConfig {
            static_dir: dir.path().join("carte"),
            public_url: "https://maps.test".to_string(),
            ..Default::default()
        };
        let service = Arc::new(MapService::from_config(engine, &config));
        let router = sarmap::server::create_router(service.clone(), &config);
        Self {
            router,
            service,
            config,
            _dir: dir,
        }
    }

    pub fn engine(&self) -> &FakeEarthEngine {
        self.service.engine()
    }

    pub fn artifact(&self) -> Option<String> {
        std::fs::read_to_string(self.config.artifact_path()).ok()
    }
}

pub const ROI: &str = r#"{"type": "Polygon", "coordinates": [[[2.2, 48.8], [2.4, 48.8], [2.4, 48.9], [2.2, 48.8]]]}"#;

pub fn image_json(pol: &str, start: &str, end: &str, smoothing: Option<u32>) -> String {
    match smoothing {
        Some(s) => format!(
            r#"{{"startDate": "{start}", "endDate": "{end}", "polarisation": "{pol}", "smoothing": {s}}}"#
        ),
        None => format!(r#"{{"startDate": "{start}", "endDate": "{end}", "polarisation": "{pol}"}}"#),
    }
}

pub fn envelope(images: &[String]) -> String {
    format!(r#"{{"roi": {ROI}, "images": [{}]}}"#, images.join(", "))
}

pub fn post_json(uri: &str, body: String) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header("content-type", "application/json")
        .body(Body::from(body))
        .unwrap()
}

pub async fn json_body(response: Response<Body>) -> (StatusCode, serde_json::Value) {
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    (status, serde_json::from_slice(&bytes).unwrap())
}

/// Byte offsets of `labels` in the artifact, in the order given.
pub fn label_positions(html: &str, labels: &[&str]) -> Vec<usize> {
    labels
        .iter()
        .map(|l| html.find(l).unwrap_or_else(|| panic!("{l} not in map")))
        .collect()
}
