use rialto_types::ContentHash;
use thiserror::Error;

/// Errors from catalog operations.
#[derive(Debug, Error)]
pub enum CatalogError {
    /// No asset exists for the given content hash.
    #[error("asset not found: {0}")]
    AssetNotFound(ContentHash),

    /// No organization exists with the given name.
    #[error("organization not found: {0}")]
    OrganizationNotFound(String),

    /// An organization with this name already exists (names are unique).
    #[error("organization already exists: {0}")]
    DuplicateOrganization(String),

    /// The backing store reported a failure.
    #[error("catalog backend error: {0}")]
    Backend(String),
}

/// Result alias for catalog operations.
pub type CatalogResult<T> = Result<T, CatalogError>;
