use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::amount::TokenAmount;
use crate::hash::{ContentHash, IdentityHash, TxHash};

/// Identifier the contract assigns to a registered asset.
///
/// Assigned sequentially by the contract and obtainable only from the
/// emitted registration event; it is not derivable from the submitted call.
#[derive(
    Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct AssetLedgerId(pub u64);

impl fmt::Debug for AssetLedgerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "AssetLedgerId({})", self.0)
    }
}

impl fmt::Display for AssetLedgerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// The two ledger operations the engine submits.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TransactionKind {
    Registration,
    Purchase,
}

/// Off-chain mirror of a confirmed ledger transaction.
///
/// Written only after the ledger call is confirmed, immutable thereafter.
/// Serves as both audit log and the join between the catalog asset and the
/// on-chain asset id: a purchase resolves its `asset_ledger_id` from the
/// prior registration row.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct LedgerTransaction {
    pub tx_hash: TxHash,
    pub kind: TransactionKind,
    pub asset_content_hash: ContentHash,
    pub asset_ledger_id: AssetLedgerId,
    pub amount: TokenAmount,
    pub initiator: IdentityHash,
    pub counterparty: Option<IdentityHash>,
    pub recorded_at: DateTime<Utc>,
}

impl LedgerTransaction {
    /// Record an asset registration. Registrations carry a zero amount: the
    /// asset price is a contract parameter, not a payment.
    pub fn registration(
        tx_hash: TxHash,
        asset_content_hash: ContentHash,
        asset_ledger_id: AssetLedgerId,
        initiator: IdentityHash,
    ) -> Self {
        Self {
            tx_hash,
            kind: TransactionKind::Registration,
            asset_content_hash,
            asset_ledger_id,
            amount: TokenAmount::ZERO,
            initiator,
            counterparty: None,
            recorded_at: Utc::now(),
        }
    }

    /// Record a usage-right purchase from `initiator` (buyer) to
    /// `counterparty` (owner).
    pub fn purchase(
        tx_hash: TxHash,
        asset_content_hash: ContentHash,
        asset_ledger_id: AssetLedgerId,
        amount: TokenAmount,
        initiator: IdentityHash,
        counterparty: IdentityHash,
    ) -> Self {
        Self {
            tx_hash,
            kind: TransactionKind::Purchase,
            asset_content_hash,
            asset_ledger_id,
            amount,
            initiator,
            counterparty: Some(counterparty),
            recorded_at: Utc::now(),
        }
    }
}
