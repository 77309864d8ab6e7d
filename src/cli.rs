//! File-based encode and decode used by the command line.

use anyhow::Context;
use std::path::Path;

use crate::models::AppConfig;
use crate::services::{CodecService, EncodeOutcome};

/// Where the text to encode comes from.
pub enum TextSource<'a> {
    Inline(&'a str),
    File(&'a Path),
}

/// Where the decode key comes from.
pub enum KeySource<'a> {
    Inline(&'a str),
    File(&'a Path),
}

/// Encode text and write the PNG to `output`.
///
/// When `key_file` is given the key is written there as well.
pub fn encode_to_file(
    config: &AppConfig,
    source: TextSource<'_>,
    output: &Path,
    key_file: Option<&Path>,
) -> anyhow::Result<EncodeOutcome> {
    let text = match source {
        TextSource::Inline(text) => text.to_string(),
        TextSource::File(path) => {
            let bytes = std::fs::read(path)
                .with_context(|| format!("Failed to read {}", path.display()))?;
            String::from_utf8_lossy(&bytes).into_owned()
        }
    };

    let outcome = CodecService::new(config)?.encode_blocking(&text)?;

    std::fs::write(output, &outcome.png_bytes)
        .with_context(|| format!("Failed to write {}", output.display()))?;
    if let Some(key_file) = key_file {
        std::fs::write(key_file, &outcome.key)
            .with_context(|| format!("Failed to write {}", key_file.display()))?;
    }

    Ok(outcome)
}

/// Read a PNG and decode it with the given key.
pub fn decode_from_file(
    config: &AppConfig,
    image: &Path,
    key: KeySource<'_>,
) -> anyhow::Result<String> {
    let key = match key {
        KeySource::Inline(key) => key.to_string(),
        KeySource::File(path) => std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read {}", path.display()))?,
    };
    let png_bytes =
        std::fs::read(image).with_context(|| format!("Failed to read {}", image.display()))?;

    let text = CodecService::new(config)?.decode_blocking(&png_bytes, key.trim())?;
    Ok(text)
}
