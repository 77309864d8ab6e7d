use pixel_codec::EncodeOptions;
use serde::Deserialize;
use std::path::Path;

/// Application configuration loaded from a YAML file
#[derive(Debug, Deserialize, Clone, Default, PartialEq)]
pub struct AppConfig {
    /// Randomization tunables for encoding
    #[serde(default)]
    pub codec: CodecConfig,

    /// Request size limits
    #[serde(default)]
    pub limits: LimitsConfig,

    /// Encoded image store
    #[serde(default)]
    pub store: StoreConfig,
}

/// Inclusive `min..=max` range as written in YAML
#[derive(Debug, Deserialize, Clone, Copy, PartialEq, Eq)]
pub struct RangeConfig {
    pub min: usize,
    pub max: usize,
}

#[derive(Debug, Deserialize, Clone, PartialEq)]
pub struct CodecConfig {
    /// Dummy pixels inserted before every real pixel
    #[serde(default = "default_dummy_multiplier")]
    pub dummy_multiplier: RangeConfig,

    /// Number of matrix/cascade transforms per image
    #[serde(default = "default_transform_rounds")]
    pub transform_rounds: RangeConfig,

    /// Matrix entries are drawn from -bound..=bound
    #[serde(default = "default_matrix_entry_bound")]
    pub matrix_entry_bound: i64,

    /// Draws before falling back to the identity matrix
    #[serde(default = "default_matrix_attempts")]
    pub matrix_attempts: usize,
}

fn default_dummy_multiplier() -> RangeConfig {
    RangeConfig { min: 2, max: 7 }
}

fn default_transform_rounds() -> RangeConfig {
    RangeConfig { min: 2, max: 6 }
}

fn default_matrix_entry_bound() -> i64 {
    5
}

fn default_matrix_attempts() -> usize {
    100
}

impl Default for CodecConfig {
    fn default() -> Self {
        Self {
            dummy_multiplier: default_dummy_multiplier(),
            transform_rounds: default_transform_rounds(),
            matrix_entry_bound: default_matrix_entry_bound(),
            matrix_attempts: default_matrix_attempts(),
        }
    }
}

#[derive(Debug, Deserialize, Clone, PartialEq)]
pub struct LimitsConfig {
    /// Longest text accepted for encoding, in characters
    #[serde(default = "default_max_text_chars")]
    pub max_text_chars: usize,

    /// Largest image accepted for decoding, in pixels
    #[serde(default = "default_max_image_pixels")]
    pub max_image_pixels: u64,
}

fn default_max_text_chars() -> usize {
    100_000
}

fn default_max_image_pixels() -> u64 {
    16_000_000
}

impl Default for LimitsConfig {
    fn default() -> Self {
        Self {
            max_text_chars: default_max_text_chars(),
            max_image_pixels: default_max_image_pixels(),
        }
    }
}

#[derive(Debug, Deserialize, Clone, PartialEq)]
pub struct StoreConfig {
    /// Encoded images kept for download before the oldest is evicted
    #[serde(default = "default_max_images")]
    pub max_images: usize,
}

fn default_max_images() -> usize {
    256
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            max_images: default_max_images(),
        }
    }
}

impl AppConfig {
    /// Load configuration from an optional YAML file.
    ///
    /// A missing, unreadable or invalid file falls back to defaults.
    pub fn load(path: Option<&Path>) -> Self {
        let Some(path) = path else {
            tracing::debug!("No config file set, using defaults");
            return Self::default();
        };

        match std::fs::read_to_string(path) {
            Ok(content) => match Self::from_yaml(&content) {
                Ok(config) => {
                    tracing::info!(
                        path = %path.display(),
                        max_images = config.store.max_images,
                        "Loaded configuration"
                    );
                    config
                }
                Err(e) => {
                    tracing::warn!(%e, "Failed to parse config, using defaults");
                    Self::default()
                }
            },
            Err(e) => {
                tracing::warn!(%e, path = %path.display(), "Failed to read config, using defaults");
                Self::default()
            }
        }
    }

    /// Parse and validate a YAML document.
    pub fn from_yaml(content: &str) -> Result<Self, String> {
        let config: Self = serde_yaml::from_str(content).map_err(|e| e.to_string())?;
        config.validate()?;
        Ok(config)
    }

    /// Reject values the encoder cannot sample from.
    pub fn validate(&self) -> Result<(), String> {
        self.to_encode_options().validate()?;
        if self.codec.matrix_attempts == 0 {
            return Err("codec.matrix_attempts must be at least 1".to_string());
        }
        if self.limits.max_text_chars == 0 {
            return Err("limits.max_text_chars must be at least 1".to_string());
        }
        if self.limits.max_image_pixels == 0 {
            return Err("limits.max_image_pixels must be at least 1".to_string());
        }
        if self.store.max_images == 0 {
            return Err("store.max_images must be at least 1".to_string());
        }
        Ok(())
    }

    /// Encoder options for the codec pipeline.
    pub fn to_encode_options(&self) -> EncodeOptions {
        EncodeOptions {
            multiplier_range: self.codec.dummy_multiplier.min..=self.codec.dummy_multiplier.max,
            transform_rounds: self.codec.transform_rounds.min..=self.codec.transform_rounds.max,
            matrix_entry_bound: self.codec.matrix_entry_bound,
            matrix_attempts: self.codec.matrix_attempts,
        }
    }
}
