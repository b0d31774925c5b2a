//! Ledger client for Rialto.
//!
//! This crate is the engine's only path to the on-chain ledger. It provides:
//! - [`LedgerRpc`] — the retryable RPC boundary: balances, time-boxed
//!   account unlock, signed call submission, event subscription
//! - [`PendingCall`] — a handle whose `wait()` resolves when the
//!   transaction is mined or fails at the ledger level
//! - [`await_event`] — one-shot event wait with a bounded timeout and
//!   deterministic subscription teardown
//! - [`ContractCall`] — the fixed contract interface (registration,
//!   purchase, transfer); no arbitrary ABI generality
//! - [`ChainConfig`] — explicit configuration built once at startup and
//!   passed by reference; there is no ambient config singleton
//! - [`DevChain`] — an in-process ledger with mining delay, sequential
//!   asset ids, a call counter, and failure-injection switches for tests

pub mod call;
pub mod client;
pub mod config;
pub mod devnet;
pub mod error;
pub mod event;
pub mod retry;

pub use call::{CallSigner, ContractCall, SignedCall};
pub use client::{LedgerRpc, PendingCall, Receipt};
pub use config::{ChainConfig, TreasuryConfig};
pub use devnet::DevChain;
pub use error::{ChainError, ChainResult};
pub use event::{await_event, ContractEvent, EventStream};
pub use retry::{retry, retry_if, RetryPolicy};
