use std::time::Duration;

use async_trait::async_trait;
use tokio::sync::oneshot;

use rialto_types::{Address, TokenAmount, TxHash};

use crate::call::{ContractCall, SignedCall};
use crate::error::{ChainError, ChainResult};
use crate::event::EventStream;

/// Receipt for a mined transaction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Receipt {
    pub tx_hash: TxHash,
    pub block: u64,
}

/// Handle to a submitted call.
///
/// The transaction hash is known as soon as the call is accepted for
/// mining; [`PendingCall::wait`] resolves once the transaction is mined,
/// with [`ChainError::Reverted`] if the contract rejected it.
#[derive(Debug)]
pub struct PendingCall {
    pub tx_hash: TxHash,
    pub(crate) receipt: oneshot::Receiver<ChainResult<Receipt>>,
}

impl PendingCall {
    pub fn new(tx_hash: TxHash, receipt: oneshot::Receiver<ChainResult<Receipt>>) -> Self {
        Self { tx_hash, receipt }
    }

    /// Wait for the transaction to be mined.
    pub async fn wait(self) -> ChainResult<Receipt> {
        match self.receipt.await {
            Ok(result) => result,
            Err(_) => Err(ChainError::Rpc("mining task dropped the receipt".into())),
        }
    }

    /// Wait for mining, bounded by `timeout`.
    pub async fn wait_with_timeout(self, timeout: Duration) -> ChainResult<Receipt> {
        match tokio::time::timeout(timeout, self.wait()).await {
            Ok(result) => result,
            Err(_) => Err(ChainError::MiningTimeout { waited: timeout }),
        }
    }
}

/// The engine's boundary to a ledger node.
///
/// Implementations must assign the transaction hash at submission time and
/// deliver exactly one receipt per submitted call.
#[async_trait]
pub trait LedgerRpc: Send + Sync {
    /// Current balance of an account. Unknown accounts report zero rather
    /// than an error.
    async fn balance_of(&self, address: &Address) -> ChainResult<TokenAmount>;

    /// Unlock an account for `window`; subsequent [`LedgerRpc::submit_unlocked`]
    /// calls from it succeed until the window expires.
    async fn unlock_account(
        &self,
        address: &Address,
        passphrase: &str,
        window: Duration,
    ) -> ChainResult<()>;

    /// Submit a signed contract call for mining.
    async fn submit_call(&self, call: SignedCall) -> ChainResult<PendingCall>;

    /// Submit a call from a previously unlocked account (treasury path).
    async fn submit_unlocked(&self, from: &Address, call: ContractCall)
        -> ChainResult<PendingCall>;

    /// Subscribe to contract events from this point forward.
    fn subscribe(&self) -> EventStream;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn pending_call_resolves_to_receipt() {
        let (tx, rx) = oneshot::channel();
        let hash = TxHash::from_raw([1; 32]);
        let pending = PendingCall::new(hash, rx);
        tx.send(Ok(Receipt { tx_hash: hash, block: 7 })).unwrap();

        let receipt = pending.wait().await.unwrap();
        assert_eq!(receipt.block, 7);
        assert_eq!(receipt.tx_hash, hash);
    }

    #[tokio::test]
    async fn dropped_sender_surfaces_as_rpc_error() {
        let (tx, rx) = oneshot::channel::<ChainResult<Receipt>>();
        let pending = PendingCall::new(TxHash::from_raw([1; 32]), rx);
        drop(tx);
        assert!(matches!(pending.wait().await, Err(ChainError::Rpc(_))));
    }

    #[tokio::test]
    async fn wait_with_timeout_expires() {
        let (_tx, rx) = oneshot::channel::<ChainResult<Receipt>>();
        let pending = PendingCall::new(TxHash::from_raw([1; 32]), rx);
        let err = pending
            .wait_with_timeout(Duration::from_millis(10))
            .await
            .unwrap_err();
        assert!(matches!(err, ChainError::MiningTimeout { .. }));
    }
}
