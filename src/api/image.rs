use axum::{
    body::Bytes,
    extract::{Path, State},
    http::{header, StatusCode},
    response::{IntoResponse, Response},
};
use std::sync::Arc;

use crate::error::ApiError;
use crate::services::ImageStore;

/// Suggested file name for downloads.
pub const DOWNLOAD_FILENAME: &str = "encrypted_image.png";

async fn find_png<S: ImageStore>(store: &S, id: &str) -> Result<Vec<u8>, ApiError> {
    let id = id.strip_suffix(".png").unwrap_or(id);
    let image = store.get(id).await?.ok_or_else(|| {
        tracing::debug!(image_id = %id, "Image not found");
        ApiError::ImageNotFound
    })?;
    Ok(image.png_bytes)
}

/// Get an encoded PNG image
///
/// Returns the PNG produced by /api/encode. A `.png` suffix on the id is accepted.
#[utoipa::path(
    get,
    path = "/api/image/{id}",
    responses(
        (status = 200, description = "PNG image", content_type = "image/png"),
        (status = 404, description = "Unknown or evicted image id"),
    ),
    params(
        ("id" = String, Path, description = "Image id from /api/encode"),
    ),
    tag = "Images"
)]
pub async fn handle_image<S: ImageStore>(
    State(store): State<Arc<S>>,
    Path(id): Path<String>,
) -> Result<Response, ApiError> {
    let png_bytes = find_png(store.as_ref(), &id).await?;

    Ok((
        StatusCode::OK,
        [
            (header::CONTENT_TYPE, "image/png"),
            (header::CONTENT_LENGTH, &png_bytes.len().to_string()),
        ],
        Bytes::from(png_bytes),
    )
        .into_response())
}

/// Download an encoded PNG image
///
/// Same bytes as /api/image/{id}, sent as an attachment.
#[utoipa::path(
    get,
    path = "/api/image/{id}/download",
    responses(
        (status = 200, description = "PNG image attachment", content_type = "image/png"),
        (status = 404, description = "Unknown or evicted image id"),
    ),
    params(
        ("id" = String, Path, description = "Image id from /api/encode"),
    ),
    tag = "Images"
)]
pub async fn handle_image_download<S: ImageStore>(
    State(store): State<Arc<S>>,
    Path(id): Path<String>,
) -> Result<Response, ApiError> {
    let png_bytes = find_png(store.as_ref(), &id).await?;
    let disposition = format!("attachment; filename=\"{DOWNLOAD_FILENAME}\"");

    Ok((
        StatusCode::OK,
        [
            (header::CONTENT_TYPE, "image/png"),
            (header::CONTENT_LENGTH, &png_bytes.len().to_string()),
            (header::CONTENT_DISPOSITION, &disposition),
        ],
        Bytes::from(png_bytes),
    )
        .into_response())
}
