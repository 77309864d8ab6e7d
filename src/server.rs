//! HTTP server setup and configuration.
//!
//! This module provides the router and application state used by both
//! the production server and integration tests.

use axum::{
    extract::{rejection::JsonRejection, DefaultBodyLimit, Path, State},
    http::header::CONNECTION,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use std::sync::Arc;
use tower_http::{set_header::SetResponseHeaderLayer, trace::TraceLayer};

use crate::api::{self, DecodeRequest, EncodeRequest};
use crate::error::ApiError;
use crate::models::AppConfig;
use crate::services::{CodecService, InMemoryImageStore};

/// Largest request body accepted; base64 images are about 4/3 of the PNG size.
pub const MAX_BODY_BYTES: usize = 32 * 1024 * 1024;

/// Application state shared across all handlers.
#[derive(Clone)]
pub struct AppState {
    pub codec: Arc<CodecService>,
    pub images: Arc<InMemoryImageStore>,
    /// Absolute base for image links; relative links when unset
    pub public_url: Option<String>,
}

/// Create application state from a loaded configuration.
pub fn create_app_state(config: AppConfig, public_url: Option<String>) -> anyhow::Result<AppState> {
    config
        .validate()
        .map_err(|e| anyhow::anyhow!("Invalid configuration: {e}"))?;

    let codec = Arc::new(CodecService::new(&config)?);
    let images = Arc::new(InMemoryImageStore::new(config.store.max_images));

    Ok(AppState {
        codec,
        images,
        public_url,
    })
}

/// Build the API router with all endpoints and middleware.
///
/// This is the core router used by both production and tests.
pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/api/encode", post(handle_encode))
        .route("/api/decode", post(handle_decode))
        .route("/api/image/:id", get(handle_image))
        .route("/api/image/:id/download", get(handle_image_download))
        // Health check
        .route("/health", get(|| async { "OK" }))
        // Add state and tracing
        .with_state(state)
        .layer(DefaultBodyLimit::max(MAX_BODY_BYTES))
        .layer(TraceLayer::new_for_http())
        // One request per connection
        .layer(SetResponseHeaderLayer::overriding(
            CONNECTION,
            axum::http::HeaderValue::from_static("close"),
        ))
}

/// Turn axum's plain-text body rejection into the JSON error shape.
fn json_body<T>(payload: Result<Json<T>, JsonRejection>) -> Result<T, ApiError> {
    payload
        .map(|Json(body)| body)
        .map_err(|e| ApiError::BadRequest(e.body_text()))
}

// Wrapper handlers to extract state components for the underlying API handlers

async fn handle_encode(
    State(state): State<AppState>,
    payload: Result<Json<EncodeRequest>, JsonRejection>,
) -> Result<Response, ApiError> {
    let request = json_body(payload)?;
    api::handle_encode(
        State(state.codec),
        State(state.images),
        state.public_url,
        request,
    )
    .await
    .map(IntoResponse::into_response)
}

async fn handle_decode(
    State(state): State<AppState>,
    payload: Result<Json<DecodeRequest>, JsonRejection>,
) -> Result<Response, ApiError> {
    let request = json_body(payload)?;
    api::handle_decode(State(state.codec), request)
        .await
        .map(IntoResponse::into_response)
}

async fn handle_image(
    State(state): State<AppState>,
    path: Path<String>,
) -> Result<Response, ApiError> {
    api::handle_image(State(state.images), path).await
}

async fn handle_image_download(
    State(state): State<AppState>,
    path: Path<String>,
) -> Result<Response, ApiError> {
    api::handle_image_download(State(state.images), path).await
}
