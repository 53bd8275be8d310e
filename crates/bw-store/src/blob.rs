//! Blob storage port.
//!
//! Uploaded documents (PDFs, scans) live in blob storage; the platform only
//! saves objects, checks existence, and mints short-lived signed URLs. The
//! rendering/extraction pipelines that consume the blobs are external.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use chrono::Utc;
use rand::RngCore;
use tokio::sync::Mutex;

use crate::{Result, StoreError};

#[async_trait]
pub trait BlobStorage: Send + Sync {
    /// Write-once save. Fails if an object already exists under `key`.
    async fn save(&self, key: &str, bytes: Vec<u8>, content_type: &str) -> Result<()>;

    async fn exists(&self, key: &str) -> Result<bool>;

    /// Mint a time-limited download URL for an existing object.
    async fn signed_url(&self, key: &str, ttl: Duration) -> Result<String>;
}

struct StoredObject {
    content_type: String,
    bytes: Vec<u8>,
}

/// In-memory blob store for tests and the dev server.
#[derive(Clone)]
pub struct MemoryBlobStore {
    base_url: String,
    objects: Arc<Mutex<HashMap<String, StoredObject>>>,
}

impl MemoryBlobStore {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            objects: Arc::new(Mutex::new(HashMap::new())),
        }
    }

    pub async fn len(&self) -> usize {
        self.objects.lock().await.len()
    }

    pub async fn content_type(&self, key: &str) -> Option<String> {
        self.objects
            .lock()
            .await
            .get(key)
            .map(|o| o.content_type.clone())
    }

    pub async fn object_size(&self, key: &str) -> Option<usize> {
        self.objects.lock().await.get(key).map(|o| o.bytes.len())
    }
}

impl Default for MemoryBlobStore {
    fn default() -> Self {
        Self::new("https://blobs.local")
    }
}

#[async_trait]
impl BlobStorage for MemoryBlobStore {
    async fn save(&self, key: &str, bytes: Vec<u8>, content_type: &str) -> Result<()> {
        let mut objects = self.objects.lock().await;
        if objects.contains_key(key) {
            return Err(StoreError::AlreadyExists {
                path: key.to_string(),
            });
        }
        objects.insert(
            key.to_string(),
            StoredObject {
                content_type: content_type.to_string(),
                bytes,
            },
        );
        Ok(())
    }

    async fn exists(&self, key: &str) -> Result<bool> {
        Ok(self.objects.lock().await.contains_key(key))
    }

    async fn signed_url(&self, key: &str, ttl: Duration) -> Result<String> {
        if !self.exists(key).await? {
            return Err(StoreError::NotFound {
                path: key.to_string(),
            });
        }
        let expires = Utc::now().timestamp() + ttl.as_secs() as i64;
        let mut token = [0u8; 16];
        rand::thread_rng().fill_bytes(&mut token);
        Ok(format!(
            "{}/{}?expires={}&token={}",
            self.base_url,
            key,
            expires,
            hex::encode(token)
        ))
    }
}
