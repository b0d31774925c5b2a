//! Rights transaction engine.
//!
//! The engine bridges two stores with different consistency models: an
//! append-only on-chain ledger and a mutable off-chain catalog. Every
//! workflow follows the same shape — precondition checks with no side
//! effects, ledger call, event correlation, transaction persistence,
//! catalog mutation — and every failure mode maps to a stable
//! [`ErrorKind`] so callers can tell whether a retry is safe.
//!
//! Entry points:
//! - [`RightsEngine::register_asset`] / [`RightsEngine::purchase_rights`] —
//!   the two ledger-backed workflows
//! - [`RightsEngine::register_organization`] — tenant creation with account
//!   provisioning and an initial funding grant
//! - [`RightsEngine::reconcile`] — idempotent replay of catalog-side
//!   persistence for a transaction that already confirmed on-chain

pub mod config;
pub mod correlator;
pub mod engine;
pub mod error;
pub mod lease;
pub mod provisioner;

pub use config::EngineConfig;
pub use correlator::{correlate, Correlation};
pub use engine::{RegisterAssetRequest, RightsEngine, TransactionOutcome};
pub use error::{EngineError, EngineResult, ErrorKind};
pub use lease::{Lease, LeaseMap};
pub use provisioner::Provisioner;
