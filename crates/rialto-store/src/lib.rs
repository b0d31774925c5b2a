//! Object-storage boundary for Rialto.
//!
//! Binary media lives in an external blob store; the engine only needs two
//! operations at this boundary: upload bytes and obtain a reference key, and
//! issue a public URL for a key. Storage failures are fatal to asset
//! registration — no catalog entry is created without its content.

pub mod error;
pub mod memory;
pub mod traits;

pub use error::{StoreError, StoreResult};
pub use memory::InMemoryMediaStore;
pub use traits::{MediaStore, StorageKey};
