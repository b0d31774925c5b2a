//! Cryptographic primitives for Rialto.
//!
//! - [`RecoveryPhrase`] — BIP-39 phrase backing a ledger account
//! - [`Keychain`] — signing key and address derived from a phrase
//! - [`ContentHasher`] — domain-separated BLAKE3 hashing

pub mod error;
pub mod hasher;
pub mod keychain;
pub mod phrase;

pub use error::CryptoError;
pub use hasher::ContentHasher;
pub use keychain::{Keychain, Signature};
pub use phrase::RecoveryPhrase;
