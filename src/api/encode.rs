use axum::{
    extract::State,
    response::{IntoResponse, Json},
};
use base64::Engine;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use utoipa::ToSchema;

use crate::error::ApiError;
use crate::services::{CodecService, ImageStore};

/// Request body for text encoding
///
/// Exactly one of `text` or `file` must be set.
#[derive(Debug, Deserialize, ToSchema)]
pub struct EncodeRequest {
    /// Text to hide
    #[serde(default)]
    pub text: Option<String>,
    /// Uploaded text file
    #[serde(default)]
    pub file: Option<UploadedFile>,
}

/// A text file sent inline
#[derive(Debug, Deserialize, ToSchema)]
pub struct UploadedFile {
    /// Original file name; must end in `.txt`
    pub name: String,
    /// File content, base64 encoded
    pub content: String,
}

/// Response from the /api/encode endpoint
#[derive(Debug, Serialize, ToSchema)]
pub struct EncodeResponse {
    pub success: bool,
    /// Key needed to decode the image
    pub key: String,
    /// Id for /api/image/{id}
    pub image_id: String,
    /// URL to fetch the encoded PNG from
    pub image_url: String,
    /// Image width in pixels
    pub width: usize,
    /// Image height in pixels, including the decoy row
    pub height: usize,
    /// Characters outside the supported alphabet, which decoding will not restore
    pub dropped_chars: usize,
}

impl EncodeRequest {
    /// Resolve the request into the text to encode.
    pub fn into_text(self) -> Result<String, ApiError> {
        match (self.text, self.file) {
            (Some(_), Some(_)) => Err(ApiError::BadRequest(
                "provide either text or file, not both".to_string(),
            )),
            (Some(text), None) => Ok(text),
            (None, Some(file)) => file.into_text(),
            (None, None) => Err(ApiError::MissingField("text")),
        }
    }
}

impl UploadedFile {
    fn into_text(self) -> Result<String, ApiError> {
        if !self.name.to_ascii_lowercase().ends_with(".txt") {
            return Err(ApiError::BadRequest(format!(
                "unsupported file '{}': only .txt files are accepted",
                self.name
            )));
        }
        let bytes = base64::engine::general_purpose::STANDARD
            .decode(self.content.trim())
            .map_err(|e| ApiError::BadRequest(format!("file content is not valid base64: {e}")))?;
        Ok(String::from_utf8_lossy(&bytes).into_owned())
    }
}

/// Link for a stored image, absolute when a public base URL is configured.
pub fn image_url(public_url: Option<&str>, image_id: &str) -> String {
    let base = public_url.unwrap_or("").trim_end_matches('/');
    format!("{base}/api/image/{image_id}.png")
}

/// Encode text into an image
///
/// Hides the text in a freshly randomized PNG and returns the key needed
/// to read it back. The image is kept for download under `image_id`.
#[utoipa::path(
    post,
    path = "/api/encode",
    request_body = EncodeRequest,
    responses(
        (status = 200, description = "Text encoded", body = EncodeResponse),
        (status = 400, description = "Missing or empty text, or bad file upload"),
        (status = 413, description = "Text longer than the configured limit"),
    ),
    tag = "Codec"
)]
pub async fn handle_encode<S: ImageStore>(
    State(codec): State<Arc<CodecService>>,
    State(store): State<Arc<S>>,
    public_url: Option<String>,
    request: EncodeRequest,
) -> Result<impl IntoResponse, ApiError> {
    let text = request.into_text()?;

    tracing::info!(chars = text.chars().count(), "Encode request received");

    let outcome = codec.encode(text).await?;
    let image_id = store.insert(outcome.png_bytes).await?;

    Ok(Json(EncodeResponse {
        success: true,
        key: outcome.key,
        image_url: image_url(public_url.as_deref(), &image_id),
        image_id,
        width: outcome.width,
        height: outcome.height,
        dropped_chars: outcome.dropped_chars,
    }))
}
