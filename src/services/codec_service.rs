use crate::error::ApiError;
use crate::models::{AppConfig, LimitsConfig};
use crate::rendering::{decode_png, encode_png};
use pixel_codec::{KeyPlan, Pipeline};
use std::sync::Arc;

/// A finished encode, ready to hand to a client
#[derive(Debug, Clone)]
pub struct EncodeOutcome {
    pub png_bytes: Vec<u8>,
    pub key: String,
    pub width: usize,
    pub height: usize,
    /// Characters outside the alphabet that will not come back on decode
    pub dropped_chars: usize,
}

/// Text <-> PNG service wrapping the codec pipeline and request limits
#[derive(Clone)]
pub struct CodecService {
    pipeline: Arc<Pipeline>,
    limits: LimitsConfig,
}

impl CodecService {
    pub fn new(config: &AppConfig) -> Result<Self, ApiError> {
        Ok(Self {
            pipeline: Arc::new(Pipeline::new(config.to_encode_options())?),
            limits: config.limits.clone(),
        })
    }

    pub fn limits(&self) -> &LimitsConfig {
        &self.limits
    }

    /// Encode text into a PNG and key.
    ///
    /// Uses spawn_blocking to keep pixel work and PNG optimization off the
    /// async runtime.
    pub async fn encode(&self, text: String) -> Result<EncodeOutcome, ApiError> {
        let service = self.clone();
        tokio::task::spawn_blocking(move || service.encode_blocking(&text))
            .await
            .map_err(|e| ApiError::Internal(format!("Encode task failed: {e}")))?
    }

    /// Decode a PNG with its key.
    pub async fn decode(&self, png_bytes: Vec<u8>, key: String) -> Result<String, ApiError> {
        let service = self.clone();
        tokio::task::spawn_blocking(move || service.decode_blocking(&png_bytes, &key))
            .await
            .map_err(|e| ApiError::Internal(format!("Decode task failed: {e}")))?
    }

    /// Synchronous encode, for the CLI and blocking contexts.
    pub fn encode_blocking(&self, text: &str) -> Result<EncodeOutcome, ApiError> {
        let size = text.chars().count();
        if size > self.limits.max_text_chars {
            return Err(ApiError::InputTooLarge {
                size,
                max: self.limits.max_text_chars,
            });
        }

        let encoded = self.pipeline.encode(text, &mut rand::thread_rng())?;
        let png_bytes = encode_png(&encoded.grid)?;

        tracing::info!(
            chars = size,
            width = encoded.grid.width(),
            height = encoded.grid.height(),
            size_bytes = png_bytes.len(),
            "Text encoded"
        );

        Ok(EncodeOutcome {
            png_bytes,
            key: encoded.key,
            width: encoded.grid.width(),
            height: encoded.grid.height(),
            dropped_chars: encoded.dropped_chars,
        })
    }

    /// Synchronous decode. The key is checked before the image is parsed.
    pub fn decode_blocking(&self, png_bytes: &[u8], key: &str) -> Result<String, ApiError> {
        let plan = KeyPlan::parse(key)?;
        let grid = decode_png(png_bytes, self.limits.max_image_pixels)?;
        let text = self.pipeline.decode_plan(grid, &plan)?;

        tracing::info!(chars = text.chars().count(), "Image decoded");
        Ok(text)
    }
}
