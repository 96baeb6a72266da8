//! HTTP surface: the map endpoints, the static mount holding the artifact,
//! open CORS and request tracing.
//!
//! Every failure, including a body that does not match the request schema,
//! is answered with `500 {"detail": "<message>"}`.

use std::sync::Arc;

use axum::{
    Json, Router,
    body::Bytes,
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::post,
};
use serde_json::json;
use tower_http::{cors::CorsLayer, services::ServeDir, trace::TraceLayer};
use tracing::warn;

use crate::api::{ChangeDetectionResponse, MapResponse, MapService};
use crate::core::config::ServiceConfig;
use crate::core::params::{ChangeDetectionRequest, RadarImagesRequest};
use crate::error::Error;
use crate::io::earthengine::EarthEngine;

/// Catch-all error response.
#[derive(Debug)]
pub struct ApiError(pub Error);

impl From<Error> for ApiError {
    fn from(e: Error) -> Self {
        ApiError(e)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let detail = self.0.to_string();
        warn!("Request failed: {}", detail);
        (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(json!({ "detail": detail })),
        )
            .into_response()
    }
}

async fn generate_map<E: EarthEngine + 'static>(
    State(service): State<Arc<MapService<E>>>,
    body: Bytes,
) -> Result<Json<MapResponse>, ApiError> {
    let request = RadarImagesRequest::from_json(&body)?;
    Ok(Json(service.generate_map(&request).await?))
}

async fn detect_change<E: EarthEngine + 'static>(
    State(service): State<Arc<MapService<E>>>,
    body: Bytes,
) -> Result<Json<ChangeDetectionResponse>, ApiError> {
    let request = ChangeDetectionRequest::from_json(&body)?;
    Ok(Json(service.detect_change(&request).await?))
}

pub fn create_router<E: EarthEngine + 'static>(
    service: Arc<MapService<E>>,
    config: &ServiceConfig,
) -> Router {
    Router::new()
        .route("/generate-map/", post(generate_map::<E>))
        .route("/detect-change/", post(detect_change::<E>))
        .nest_service(
            &config.static_prefix,
            ServeDir::new(&config.static_dir),
        )
        .layer(CorsLayer::very_permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(service)
}
