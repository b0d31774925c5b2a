//! Catalog boundary for Rialto.
//!
//! The catalog is the mutable, synchronously-queried off-chain store of
//! asset, organization, and transaction metadata. This crate defines the
//! trait the engine orchestrates against and an in-memory implementation
//! for tests and embedding.
//!
//! Two operations carry the engine's correctness weight:
//! - [`AssetCatalog::append_right`] is an atomic set-add against the
//!   asset's current persisted state, never a read-then-overwrite.
//! - [`AssetCatalog::insert_transaction`] is unique on the transaction hash
//!   and tolerates duplicate inserts as no-ops, which is what makes
//!   reconciliation replay safe.

pub mod error;
pub mod memory;
pub mod traits;

pub use error::{CatalogError, CatalogResult};
pub use memory::InMemoryCatalog;
pub use traits::AssetCatalog;
