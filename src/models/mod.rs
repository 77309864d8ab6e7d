pub mod config;

pub use config::{AppConfig, CodecConfig, LimitsConfig, RangeConfig, StoreConfig};
