use std::fmt;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use rialto_types::ContentHash;

use crate::error::StoreResult;

/// Reference key returned by the blob store for uploaded content.
///
/// Keys are derived from the content hash, so uploading the same bytes twice
/// yields the same key.
#[derive(Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct StorageKey(String);

impl StorageKey {
    /// The canonical key for a content hash.
    pub fn for_content(hash: &ContentHash) -> Self {
        Self(hash.to_hex())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for StorageKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "StorageKey({})", self.0)
    }
}

impl fmt::Display for StorageKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Blob store for binary media.
///
/// Implementations must satisfy:
/// - `put` is idempotent: re-uploading identical bytes returns the same key
///   without error.
/// - A key returned by `put` remains resolvable until explicitly deleted
///   (deletion is outside this boundary).
/// - Failures are propagated, never swallowed — the caller treats them as
///   fatal to the operation in progress.
#[async_trait]
pub trait MediaStore: Send + Sync {
    /// Upload content and return its reference key.
    async fn put(&self, content: &[u8]) -> StoreResult<StorageKey>;

    /// Whether content exists for the given key.
    async fn exists(&self, key: &StorageKey) -> StoreResult<bool>;

    /// Public URL for a stored object. Pure key-to-URL mapping; does not
    /// verify existence.
    fn url_for(&self, key: &StorageKey) -> String;
}
