pub mod codec_service;
pub mod image_store;

pub use codec_service::{CodecService, EncodeOutcome};
pub use image_store::{image_id, ImageStore, InMemoryImageStore, StoredImage};
