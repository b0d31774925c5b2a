use std::time::Duration;

use serde::{Deserialize, Serialize};
use tokio::sync::broadcast;
use tracing::trace;

use rialto_types::{Address, AssetLedgerId, TokenAmount, TxHash};

use crate::error::{ChainError, ChainResult};

/// Event emitted by the rights contract.
///
/// Every event carries the hash of the transaction that produced it, which
/// is the key used to correlate an event with the pending call that caused
/// it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum ContractEvent {
    AssetRegistered {
        tx_hash: TxHash,
        asset_id: AssetLedgerId,
        owner: Address,
        price: TokenAmount,
    },
    RightsPurchased {
        tx_hash: TxHash,
        asset_id: AssetLedgerId,
        buyer: Address,
        amount: TokenAmount,
    },
    TokensTransferred {
        tx_hash: TxHash,
        from: Address,
        to: Address,
        amount: TokenAmount,
    },
}

impl ContractEvent {
    pub fn name(&self) -> &'static str {
        match self {
            ContractEvent::AssetRegistered { .. } => "AssetRegistered",
            ContractEvent::RightsPurchased { .. } => "RightsPurchased",
            ContractEvent::TokensTransferred { .. } => "TokensTransferred",
        }
    }

    /// Hash of the transaction that produced this event.
    pub fn tx_hash(&self) -> TxHash {
        match self {
            ContractEvent::AssetRegistered { tx_hash, .. }
            | ContractEvent::RightsPurchased { tx_hash, .. }
            | ContractEvent::TokensTransferred { tx_hash, .. } => *tx_hash,
        }
    }

    /// Ledger-assigned asset id, for events that carry one.
    pub fn asset_id(&self) -> Option<AssetLedgerId> {
        match self {
            ContractEvent::AssetRegistered { asset_id, .. }
            | ContractEvent::RightsPurchased { asset_id, .. } => Some(*asset_id),
            ContractEvent::TokensTransferred { .. } => None,
        }
    }
}

/// Live subscription to contract events.
pub type EventStream = broadcast::Receiver<ContractEvent>;

/// Wait for the first event matching `matches`, up to `timeout`.
///
/// Events that do not match are skipped; a lagged receiver skips the missed
/// window and keeps listening. The subscription is dropped when this
/// returns, so no idle receiver lingers on the channel.
pub async fn await_event<F>(
    mut stream: EventStream,
    matches: F,
    timeout: Duration,
) -> ChainResult<ContractEvent>
where
    F: Fn(&ContractEvent) -> bool + Send,
{
    let wait = async {
        loop {
            match stream.recv().await {
                Ok(event) if matches(&event) => return Ok(event),
                Ok(event) => trace!(event = event.name(), "skipping non-matching event"),
                Err(broadcast::error::RecvError::Lagged(missed)) => {
                    trace!(missed, "event subscription lagged");
                }
                Err(broadcast::error::RecvError::Closed) => {
                    return Err(ChainError::SubscriptionClosed)
                }
            }
        }
    };
    match tokio::time::timeout(timeout, wait).await {
        Ok(result) => result,
        Err(_) => Err(ChainError::EventTimeout { waited: timeout }),
    }
}
