use std::time::Duration;

use tracing::{debug, warn};

use rialto_chain::{await_event, ChainError, EventStream, PendingCall};
use rialto_types::{AssetLedgerId, TxHash};

use crate::error::{EngineError, EngineResult};

/// Outcome of a correlated ledger call: the mined transaction and the
/// asset id the contract assigned to it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Correlation {
    pub tx_hash: TxHash,
    pub asset_id: AssetLedgerId,
}

/// Resolve the ledger-assigned asset id for a submitted call.
///
/// Races the mining-wait against the event-wait as two explicit futures.
/// The event, matched by transaction hash, is authoritative for the asset
/// id; the receipt alone cannot provide it because the contract assigns
/// ids sequentially at execution time.
///
/// Outcomes:
/// - event observed → `Correlation`
/// - mined, but no matching event within `event_timeout` →
///   `ConfirmedWithoutCorrelation { tx_hash }`; funds have moved, the
///   caller must not resubmit
/// - not mined within `mining_timeout` → `LedgerTimeout { tx_hash }`
/// - contract rejected the call → the ledger error, propagated
///
/// Both futures are dropped on return, so neither the receipt channel nor
/// the event subscription outlives the correlation.
pub async fn correlate(
    pending: PendingCall,
    stream: EventStream,
    mining_timeout: Duration,
    event_timeout: Duration,
) -> EngineResult<Correlation> {
    let tx_hash = pending.tx_hash;
    let mined = pending.wait_with_timeout(mining_timeout);
    let event = await_event(stream, move |e| e.tx_hash() == tx_hash, event_timeout);
    tokio::pin!(mined);
    tokio::pin!(event);

    tokio::select! {
        event_result = &mut event => match event_result {
            Ok(event) => {
                debug!(tx = %tx_hash, event = event.name(), "event observed before receipt");
                from_event(tx_hash, event.asset_id())
            }
            Err(ChainError::EventTimeout { .. }) | Err(ChainError::SubscriptionClosed) => {
                // No event is coming; the receipt decides between
                // paid-but-uncorrelated and plain timeout.
                match mined.await {
                    Ok(_) => {
                        warn!(tx = %tx_hash, "mined without a matching event");
                        Err(EngineError::ConfirmedWithoutCorrelation { tx_hash })
                    }
                    Err(ChainError::MiningTimeout { .. }) => {
                        Err(EngineError::LedgerTimeout { tx_hash })
                    }
                    Err(err) => Err(err.into()),
                }
            }
            Err(err) => Err(err.into()),
        },
        mined_result = &mut mined => match mined_result {
            Ok(receipt) => {
                debug!(tx = %tx_hash, block = receipt.block, "mined, waiting for event");
                match event.await {
                    Ok(event) => from_event(tx_hash, event.asset_id()),
                    Err(_) => {
                        warn!(tx = %tx_hash, "mined without a matching event");
                        Err(EngineError::ConfirmedWithoutCorrelation { tx_hash })
                    }
                }
            }
            Err(ChainError::MiningTimeout { .. }) => Err(EngineError::LedgerTimeout { tx_hash }),
            Err(err) => Err(err.into()),
        },
    }
}

fn from_event(tx_hash: TxHash, asset_id: Option<AssetLedgerId>) -> EngineResult<Correlation> {
    match asset_id {
        Some(asset_id) => Ok(Correlation { tx_hash, asset_id }),
        // The matching event carried no asset id; correlation failed even
        // though the call confirmed.
        None => Err(EngineError::ConfirmedWithoutCorrelation { tx_hash }),
    }
}
