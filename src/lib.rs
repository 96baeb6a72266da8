#![doc = r#"
SARMAP — Sentinel-1 radar composites from Google Earth Engine, served as interactive maps.

This crate wraps a small HTTP service: a client posts a region of interest and one or more
(date range, polarisation, smoothing) requests, Earth Engine builds a despeckled median
composite for each, and the service writes a Leaflet map with one overlay per request.
All pixel work happens on Earth Engine; this crate only builds expression graphs, asks for
statistics and tile endpoints, and writes one HTML file.

Requirements
------------
- A Google Cloud service account registered for Earth Engine, with its JSON key.
- Rust 2024 edition toolchain.

Run the service
---------------
```text
sarmap --key-file service-account.json --bind 0.0.0.0:8000 \
       --public-url https://maps.example.org --static-dir carte --static-prefix /carte
```

```text
POST /generate-map/
{"roi": {"coordinates": [[[2.2, 48.8], [2.4, 48.8], [2.4, 48.9], [2.2, 48.8]]]},
 "images": [{"startDate": "2023-01-01", "endDate": "2023-02-01", "polarisation": "VH"},
            {"startDate": "2023-06-01", "endDate": "2023-07-01", "polarisation": "VH", "smoothing": 30}]}

200 {"map_url": "https://maps.example.org/carte/map_output.html"}
500 {"detail": "<error message>"}
```

Embed the service
-----------------
```rust,no_run
use std::sync::Arc;
use sarmap::api::MapService;
use sarmap::core::config::ServiceConfig;
use sarmap::io::earthengine::{EARTH_ENGINE_READONLY_SCOPE, RestEarthEngine, Session};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let config = ServiceConfig::default();
    let session = Session::initialize(&config.key_file, &[EARTH_ENGINE_READONLY_SCOPE]).await?;
    let engine = RestEarthEngine::new(Arc::new(session))?;
    let service = Arc::new(MapService::from_config(engine, &config));

    let app = sarmap::server::create_router(service, &config);
    let listener = tokio::net::TcpListener::bind(config.bind.as_str()).await?;
    axum::serve(listener, app).await?;
    Ok(())
}
```

Run the pipeline directly
-------------------------
```rust,no_run
use chrono::NaiveDate;
use sarmap::core::geometry::Roi;
use sarmap::core::processing::ImageryPipeline;
use sarmap::io::EarthEngine;
use sarmap::Polarization;

async fn change_mask<E: EarthEngine>(engine: &E, roi: &Roi) -> sarmap::Result<()> {
    let pipeline = ImageryPipeline::new(engine);
    let day = |m| NaiveDate::from_ymd_opt(2023, m, 1).unwrap();

    let before = pipeline.load(day(1), day(2), Polarization::Vh, roi).await?;
    let before = pipeline.despeckle(before, 50).await?;
    let after = pipeline.load(day(6), day(7), Polarization::Vh, roi).await?;
    let after = pipeline.despeckle(after, 50).await?;

    let diff = pipeline.diff(&before, &after).await?;
    let stats = pipeline.stats(&diff, roi, Polarization::Vh).await?;
    let _mask = pipeline.threshold(&diff, &stats).await?;
    Ok(())
}
```

Error handling
--------------
All library functions return `sarmap::Result<T>`; match on `sarmap::Error` to tell
credential, Earth Engine, validation and I/O failures apart. The HTTP layer does not:
every error becomes `500 {"detail": ...}`.

Useful modules
--------------
- [`api`] — request-level entry points (`MapService`).
- [`server`] — axum router and error responses.
- [`core`] — request schema, configuration, pipeline and renderer.
- [`io`] — Earth Engine adapter, service-account session and the HTML writer.
- [`types`] — `Polarization`, `InstrumentMode`, `VisParams`.
- [`error`] — crate-level `Error` and `Result`.
"#]

// Core modules (public)
pub mod api;
pub mod core;
pub mod error;
pub mod io;
pub mod server;
pub mod types;

// Curated public API surface
// Types
pub use crate::core::config::ServiceConfig;
pub use crate::core::geometry::Roi;
pub use crate::core::params::{ChangeDetectionRequest, RadarImageRequest, RadarImagesRequest};
pub use error::{Error, Result};
pub use types::{InstrumentMode, Polarization, VisParams};

// Remote platform
pub use io::earthengine::{
    CredentialError, EarthEngine, EarthEngineError, ImageHandle, RestEarthEngine, Session,
};

// High-level API re-exports
pub use api::{ChangeDetectionResponse, ChangeSummary, MapResponse, MapService};
pub use crate::core::processing::{DifferenceStats, ImageryPipeline, ProcessedImage};
pub use crate::core::render::{MapRenderer, Overlay};
