//! Foundation types for Rialto.
//!
//! This crate provides the identity, monetary, and catalog-record types used
//! throughout the rights-transaction engine. Every other rialto crate depends
//! on `rialto-types`.
//!
//! # Key Types
//!
//! - [`ContentHash`] — Content-addressed identifier for a media asset
//! - [`IdentityHash`] — Stable, non-reversible join key for an organization
//! - [`TxHash`] — Hash of a submitted ledger transaction
//! - [`Address`] — Ledger account address
//! - [`TokenAmount`] — Integer amount in the ledger's smallest denomination
//! - [`Asset`], [`Organization`], [`LedgerTransaction`] — Catalog records

pub mod amount;
pub mod asset;
pub mod error;
pub mod hash;
pub mod organization;
pub mod transaction;

pub use amount::{TokenAmount, UNIT_SCALE};
pub use asset::{Asset, AssetKind};
pub use error::TypeError;
pub use hash::{Address, ContentHash, IdentityHash, TxHash};
pub use organization::{LedgerAccount, Organization};
pub use transaction::{AssetLedgerId, LedgerTransaction, TransactionKind};
