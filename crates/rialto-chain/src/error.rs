use std::time::Duration;

use rialto_types::{Address, TxHash};
use thiserror::Error;

/// Errors from the ledger client.
#[derive(Debug, Error)]
pub enum ChainError {
    /// Transport-level failure talking to the ledger node.
    #[error("ledger rpc error: {0}")]
    Rpc(String),

    /// The account is locked (or its unlock window has expired).
    #[error("account {address} is locked")]
    Locked { address: Address },

    /// The passphrase did not match the account.
    #[error("bad passphrase for account {address}")]
    BadPassphrase { address: Address },

    /// The transaction was mined but the contract rejected it.
    #[error("call {tx_hash} reverted: {reason}")]
    Reverted { tx_hash: TxHash, reason: String },

    /// No matching event arrived within the wait window.
    #[error("no matching contract event within {waited:?}")]
    EventTimeout { waited: Duration },

    /// The transaction was not mined within the wait window.
    #[error("transaction not mined within {waited:?}")]
    MiningTimeout { waited: Duration },

    /// The event channel closed while waiting.
    #[error("event subscription closed")]
    SubscriptionClosed,

    /// The submitted call carried an invalid signature.
    #[error("invalid call signature")]
    InvalidSignature,

    /// Stored key material could not be parsed into a signer.
    #[error("invalid recovery phrase: {0}")]
    InvalidPhrase(String),

    /// Failed to serialize a call payload for hashing.
    #[error("call serialization failed: {0}")]
    Serialization(String),
}

/// Result alias for ledger client operations.
pub type ChainResult<T> = Result<T, ChainError>;

impl ChainError {
    /// Whether resubmitting the same request could plausibly succeed.
    ///
    /// Contract-level rejections and signature failures are deterministic,
    /// so retrying them only repeats the failure.
    pub fn is_transient(&self) -> bool {
        matches!(
            self,
            ChainError::Rpc(_)
                | ChainError::EventTimeout { .. }
                | ChainError::MiningTimeout { .. }
                | ChainError::SubscriptionClosed
        )
    }
}
