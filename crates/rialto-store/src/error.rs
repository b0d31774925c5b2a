use thiserror::Error;

/// Errors from media storage operations.
#[derive(Debug, Error)]
pub enum StoreError {
    /// The referenced object does not exist.
    #[error("storage key not found: {0}")]
    KeyNotFound(String),

    /// Upload was rejected or the backend is unreachable.
    #[error("upload failed: {0}")]
    UploadFailed(String),

    /// The backend reported an I/O failure.
    #[error("storage backend error: {0}")]
    Backend(String),
}

/// Result alias for media storage operations.
pub type StoreResult<T> = Result<T, StoreError>;
