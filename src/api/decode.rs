use axum::{
    extract::State,
    response::{IntoResponse, Json},
};
use base64::Engine;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use utoipa::ToSchema;

use crate::error::ApiError;
use crate::services::CodecService;

/// Request body for image decoding
#[derive(Debug, Deserialize, ToSchema)]
pub struct DecodeRequest {
    /// Key returned by /api/encode
    #[serde(default)]
    pub key: Option<String>,
    /// PNG image, base64 encoded (a `data:` URL prefix is accepted)
    #[serde(default)]
    pub image: Option<String>,
}

/// Response from the /api/decode endpoint
#[derive(Debug, Serialize, ToSchema)]
pub struct DecodeResponse {
    pub success: bool,
    /// Recovered text
    pub text: String,
}

/// Decode base64 image data, tolerating a `data:image/png;base64,` prefix.
pub fn decode_image_payload(payload: &str) -> Result<Vec<u8>, ApiError> {
    let data = match payload.split_once(";base64,") {
        Some((prefix, data)) if prefix.starts_with("data:") => data,
        _ => payload,
    };
    base64::engine::general_purpose::STANDARD
        .decode(data.trim())
        .map_err(|e| ApiError::BadRequest(format!("image is not valid base64: {e}")))
}

/// Decode an image with its key
///
/// The key is validated before the image is read, so a malformed key is
/// reported even when the image is also bad.
#[utoipa::path(
    post,
    path = "/api/decode",
    request_body = DecodeRequest,
    responses(
        (status = 200, description = "Text recovered", body = DecodeResponse),
        (status = 400, description = "Missing key or image, malformed key, or unreadable image"),
        (status = 422, description = "Key does not fit the image"),
    ),
    tag = "Codec"
)]
pub async fn handle_decode(
    State(codec): State<Arc<CodecService>>,
    request: DecodeRequest,
) -> Result<impl IntoResponse, ApiError> {
    let key = request
        .key
        .filter(|k| !k.trim().is_empty())
        .ok_or(ApiError::MissingField("key"))?;
    let image = request
        .image
        .filter(|i| !i.trim().is_empty())
        .ok_or(ApiError::MissingField("image"))?;

    let png_bytes = decode_image_payload(&image)?;

    tracing::info!(
        key_len = key.len(),
        size_bytes = png_bytes.len(),
        "Decode request received"
    );

    let text = codec.decode(png_bytes, key.trim().to_string()).await?;

    Ok(Json(DecodeResponse {
        success: true,
        text,
    }))
}
