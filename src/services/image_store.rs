use crate::error::ApiError;
use async_trait::async_trait;
use sha2::{Digest, Sha256};
use std::collections::{HashMap, VecDeque};
use std::sync::Arc;
use tokio::sync::RwLock;

/// An encoded image kept for later download
#[derive(Clone, Debug)]
pub struct StoredImage {
    /// PNG bytes as returned to the client
    pub png_bytes: Vec<u8>,
}

/// Trait for encoded image storage
#[async_trait]
pub trait ImageStore: Send + Sync {
    /// Store PNG bytes and return their id
    async fn insert(&self, png_bytes: Vec<u8>) -> Result<String, ApiError>;

    /// Find an image by id
    async fn get(&self, id: &str) -> Result<Option<StoredImage>, ApiError>;
}

/// Content id of a PNG: the first 16 hex characters of its SHA-256.
pub fn image_id(png_bytes: &[u8]) -> String {
    let digest = Sha256::digest(png_bytes);
    hex::encode(&digest[..8])
}

struct Entries {
    images: HashMap<String, StoredImage>,
    order: VecDeque<String>,
}

/// In-memory image storage, evicting the oldest entry when full
pub struct InMemoryImageStore {
    entries: Arc<RwLock<Entries>>,
    max_images: usize,
}

impl InMemoryImageStore {
    pub fn new(max_images: usize) -> Self {
        Self {
            entries: Arc::new(RwLock::new(Entries {
                images: HashMap::new(),
                order: VecDeque::new(),
            })),
            max_images: max_images.max(1),
        }
    }

    pub async fn len(&self) -> usize {
        self.entries.read().await.images.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }
}

#[async_trait]
impl ImageStore for InMemoryImageStore {
    async fn insert(&self, png_bytes: Vec<u8>) -> Result<String, ApiError> {
        let id = image_id(&png_bytes);
        let mut entries = self.entries.write().await;

        if entries.images.contains_key(&id) {
            return Ok(id);
        }

        while entries.order.len() >= self.max_images {
            if let Some(oldest) = entries.order.pop_front() {
                entries.images.remove(&oldest);
                tracing::debug!(image_id = %oldest, "Evicted stored image");
            }
        }

        entries
            .images
            .insert(id.clone(), StoredImage { png_bytes });
        entries.order.push_back(id.clone());
        Ok(id)
    }

    async fn get(&self, id: &str) -> Result<Option<StoredImage>, ApiError> {
        let entries = self.entries.read().await;
        Ok(entries.images.get(id).cloned())
    }
}
