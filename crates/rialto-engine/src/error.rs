use rialto_catalog::CatalogError;
use rialto_chain::ChainError;
use rialto_store::StoreError;
use rialto_types::{ContentHash, IdentityHash, TokenAmount, TxHash, TypeError};
use thiserror::Error;

/// Stable classification of an engine failure.
///
/// The kind determines whether a retry is safe, so it must never be
/// collapsed into a generic failure before reaching the caller.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    DuplicateAsset,
    NotFound,
    AlreadyOwned,
    InsufficientFunds,
    RegistrationMissing,
    AlreadyInProgress,
    LedgerTimeout,
    ConfirmedWithoutCorrelation,
    LedgerAheadOfCatalog,
    InvalidAmount,
    Upstream,
}

/// Errors from engine workflows.
///
/// The first six variants are precondition failures: they occur before any
/// ledger call and leave no trace. The ledger-ambiguity variants
/// (`LedgerTimeout`, `ConfirmedWithoutCorrelation`) and the post-ledger
/// variant (`LedgerAheadOfCatalog`) always carry the transaction hash when
/// one exists, so confirmed on-chain state is never silently dropped.
#[derive(Debug, Error)]
pub enum EngineError {
    /// An asset with this content hash already exists.
    #[error("asset already registered: {0}")]
    DuplicateAsset(ContentHash),

    /// No catalog entry for this content hash.
    #[error("asset not found: {0}")]
    NotFound(ContentHash),

    /// The buyer is the owner or already holds usage rights.
    #[error("{buyer} already holds rights to {asset}")]
    AlreadyOwned {
        asset: ContentHash,
        buyer: IdentityHash,
    },

    /// On-ledger balance is below the asset price.
    #[error("insufficient funds: need {needed}, have {available}")]
    InsufficientFunds {
        needed: TokenAmount,
        available: TokenAmount,
    },

    /// No registration transaction exists for this asset, so its ledger id
    /// cannot be resolved.
    #[error("no registration transaction for asset {0}")]
    RegistrationMissing(ContentHash),

    /// Another purchase of the same asset by the same buyer holds the lease.
    #[error("purchase of {asset} by {buyer} already in progress")]
    AlreadyInProgress {
        asset: ContentHash,
        buyer: IdentityHash,
    },

    /// The call was submitted but not confirmed within the wait window. The
    /// transaction may still land; resubmitting is not safe.
    #[error("ledger did not confirm {tx_hash} in time")]
    LedgerTimeout { tx_hash: TxHash },

    /// The call was mined but its contract event never arrived, so the
    /// ledger-assigned asset id is unknown. Funds have moved; resubmitting
    /// would double-pay.
    #[error("call {tx_hash} confirmed on the ledger but its event was not observed")]
    ConfirmedWithoutCorrelation { tx_hash: TxHash },

    /// The ledger call confirmed but catalog persistence failed even after
    /// retrying. Replayable via reconciliation, keyed on the hash.
    #[error("ledger transaction {tx_hash} confirmed but catalog persistence failed")]
    LedgerAheadOfCatalog { tx_hash: TxHash },

    /// The catalog-facing decimal price could not be converted exactly.
    #[error("invalid amount: {0}")]
    InvalidAmount(#[from] TypeError),

    #[error(transparent)]
    Catalog(#[from] CatalogError),

    #[error(transparent)]
    Chain(#[from] ChainError),

    #[error(transparent)]
    Store(#[from] StoreError),
}

/// Result alias for engine operations.
pub type EngineResult<T> = Result<T, EngineError>;

impl EngineError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            EngineError::DuplicateAsset(_) => ErrorKind::DuplicateAsset,
            EngineError::NotFound(_) => ErrorKind::NotFound,
            EngineError::AlreadyOwned { .. } => ErrorKind::AlreadyOwned,
            EngineError::InsufficientFunds { .. } => ErrorKind::InsufficientFunds,
            EngineError::RegistrationMissing(_) => ErrorKind::RegistrationMissing,
            EngineError::AlreadyInProgress { .. } => ErrorKind::AlreadyInProgress,
            EngineError::LedgerTimeout { .. } => ErrorKind::LedgerTimeout,
            EngineError::ConfirmedWithoutCorrelation { .. } => {
                ErrorKind::ConfirmedWithoutCorrelation
            }
            EngineError::LedgerAheadOfCatalog { .. } => ErrorKind::LedgerAheadOfCatalog,
            EngineError::InvalidAmount(_) => ErrorKind::InvalidAmount,
            EngineError::Catalog(_) | EngineError::Chain(_) | EngineError::Store(_) => {
                ErrorKind::Upstream
            }
        }
    }

    /// Whether resubmitting the same request cannot cause a duplicate
    /// on-chain effect.
    ///
    /// Precondition failures happened before any ledger call, so they are
    /// retry-safe (even when a retry is pointless, as for `DuplicateAsset`).
    /// Ledger-ambiguity and post-ledger failures are not: the original call
    /// may have moved funds, and the remedy is reconciliation, not
    /// resubmission. Raw upstream errors reach the caller only from reads or
    /// from submission attempts that never produced a transaction hash.
    pub fn retry_safe(&self) -> bool {
        !matches!(
            self.kind(),
            ErrorKind::LedgerTimeout
                | ErrorKind::ConfirmedWithoutCorrelation
                | ErrorKind::LedgerAheadOfCatalog
        )
    }
}
