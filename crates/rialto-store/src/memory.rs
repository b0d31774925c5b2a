use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::RwLock;

use async_trait::async_trait;
use tracing::debug;

use rialto_types::ContentHash;

use crate::error::{StoreError, StoreResult};
use crate::traits::{MediaStore, StorageKey};

/// In-memory, HashMap-based media store.
///
/// Intended for tests and embedding. Carries a single failure-injection
/// switch so orchestration tests can exercise the storage-failure path.
pub struct InMemoryMediaStore {
    base_url: String,
    blobs: RwLock<HashMap<StorageKey, Vec<u8>>>,
    fail_next_put: AtomicBool,
}

impl InMemoryMediaStore {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            blobs: RwLock::new(HashMap::new()),
            fail_next_put: AtomicBool::new(false),
        }
    }

    /// Make the next `put` fail with a backend error.
    pub fn fail_next_put(&self) {
        self.fail_next_put.store(true, Ordering::SeqCst);
    }

    /// Number of stored blobs.
    pub fn len(&self) -> usize {
        self.blobs.read().expect("lock poisoned").len()
    }

    pub fn is_empty(&self) -> bool {
        self.blobs.read().expect("lock poisoned").is_empty()
    }
}

impl Default for InMemoryMediaStore {
    fn default() -> Self {
        Self::new("https://media.rialto.test")
    }
}

#[async_trait]
impl MediaStore for InMemoryMediaStore {
    async fn put(&self, content: &[u8]) -> StoreResult<StorageKey> {
        if self.fail_next_put.swap(false, Ordering::SeqCst) {
            return Err(StoreError::UploadFailed("injected failure".into()));
        }
        let key = StorageKey::for_content(&ContentHash::of(content));
        let mut blobs = self.blobs.write().expect("lock poisoned");
        // Idempotent: identical bytes always map to the same key.
        blobs.entry(key.clone()).or_insert_with(|| content.to_vec());
        debug!(key = %key, bytes = content.len(), "media stored");
        Ok(key)
    }

    async fn exists(&self, key: &StorageKey) -> StoreResult<bool> {
        Ok(self.blobs.read().expect("lock poisoned").contains_key(key))
    }

    fn url_for(&self, key: &StorageKey) -> String {
        format!("{}/{}", self.base_url, key)
    }
}
