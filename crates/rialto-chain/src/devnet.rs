use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

use async_trait::async_trait;
use tokio::sync::{broadcast, oneshot};
use tracing::{debug, info};

use rialto_crypto::ContentHasher;
use rialto_types::{Address, AssetLedgerId, TokenAmount, TxHash};

use crate::call::{ContractCall, SignedCall};
use crate::client::{LedgerRpc, PendingCall, Receipt};
use crate::config::ChainConfig;
use crate::error::{ChainError, ChainResult};
use crate::event::{ContractEvent, EventStream};

#[derive(Debug, Clone, Copy)]
struct RegisteredAsset {
    owner: Address,
    price: TokenAmount,
}

struct ChainState {
    balances: HashMap<Address, TokenAmount>,
    passphrases: HashMap<Address, String>,
    unlocked_until: HashMap<Address, Instant>,
    assets: HashMap<AssetLedgerId, RegisteredAsset>,
    next_asset_id: u64,
    block: u64,
}

struct Shared {
    state: Mutex<ChainState>,
    events: broadcast::Sender<ContractEvent>,
    mining_delay: Duration,
    calls_submitted: AtomicU64,
    nonce: AtomicU64,
    fail_next_submit: AtomicBool,
    suppress_events: AtomicBool,
}

/// In-process ledger node.
///
/// Behaves like a single-node dev chain: submitted calls are assigned a
/// transaction hash immediately, mined after a configurable delay on a
/// background task, and successful calls emit the corresponding contract
/// event. Asset ids are assigned sequentially by the contract.
///
/// Failure-injection switches ([`DevChain::fail_next_submit`],
/// [`DevChain::suppress_events`]) let orchestration tests exercise the
/// degraded paths without a real node.
pub struct DevChain {
    shared: Arc<Shared>,
}

impl DevChain {
    pub fn new(config: &ChainConfig) -> Self {
        let mut balances = HashMap::new();
        let mut passphrases = HashMap::new();
        // The treasury starts funded so provisioning grants can be paid out.
        balances.insert(
            config.treasury.address,
            TokenAmount::from_units(10u128.pow(24)),
        );
        passphrases.insert(config.treasury.address, config.treasury.passphrase.clone());

        let (events, _) = broadcast::channel(config.event_channel_capacity);
        Self {
            shared: Arc::new(Shared {
                state: Mutex::new(ChainState {
                    balances,
                    passphrases,
                    unlocked_until: HashMap::new(),
                    assets: HashMap::new(),
                    next_asset_id: 1,
                    block: 0,
                }),
                events,
                mining_delay: config.mining_delay,
                calls_submitted: AtomicU64::new(0),
                nonce: AtomicU64::new(0),
                fail_next_submit: AtomicBool::new(false),
                suppress_events: AtomicBool::new(false),
            }),
        }
    }

    /// Overwrite an account balance.
    pub fn set_balance(&self, address: Address, amount: TokenAmount) {
        let mut state = self.shared.state.lock().expect("lock poisoned");
        state.balances.insert(address, amount);
    }

    /// Current balance, zero for unknown accounts.
    pub fn balance(&self, address: &Address) -> TokenAmount {
        let state = self.shared.state.lock().expect("lock poisoned");
        state.balances.get(address).copied().unwrap_or(TokenAmount::ZERO)
    }

    /// Contract-side record for an asset id, if registered.
    pub fn registered_price(&self, asset_id: AssetLedgerId) -> Option<TokenAmount> {
        let state = self.shared.state.lock().expect("lock poisoned");
        state.assets.get(&asset_id).map(|a| a.price)
    }

    /// Total calls submitted, including rejected ones.
    pub fn call_count(&self) -> u64 {
        self.shared.calls_submitted.load(Ordering::SeqCst)
    }

    /// Make the next submission fail at the transport level.
    pub fn fail_next_submit(&self) {
        self.shared.fail_next_submit.store(true, Ordering::SeqCst);
    }

    /// While set, mined calls emit no contract events.
    pub fn suppress_events(&self, on: bool) {
        self.shared.suppress_events.store(on, Ordering::SeqCst);
    }

    fn tx_hash_for(&self, from: &Address, call: &ContractCall, nonce: u64) -> ChainResult<TxHash> {
        let digest = ContentHasher::TX
            .hash_json(&(from, call.method(), call, nonce))
            .map_err(|e| ChainError::Serialization(e.to_string()))?;
        Ok(TxHash::from_raw(digest))
    }

    fn submit(&self, from: Address, call: ContractCall) -> ChainResult<PendingCall> {
        self.shared.calls_submitted.fetch_add(1, Ordering::SeqCst);
        if self.shared.fail_next_submit.swap(false, Ordering::SeqCst) {
            return Err(ChainError::Rpc("injected submit failure".into()));
        }

        let nonce = self.shared.nonce.fetch_add(1, Ordering::SeqCst);
        let tx_hash = self.tx_hash_for(&from, &call, nonce)?;
        debug!(tx = %tx_hash, method = call.method(), "call accepted for mining");

        let (receipt_tx, receipt_rx) = oneshot::channel();
        let shared = Arc::clone(&self.shared);
        tokio::spawn(async move {
            tokio::time::sleep(shared.mining_delay).await;
            let outcome = {
                let mut state = shared.state.lock().expect("lock poisoned");
                apply(&mut state, from, &call, tx_hash)
            };
            match outcome {
                Ok((receipt, event)) => {
                    if !shared.suppress_events.load(Ordering::SeqCst) {
                        // Send fails only when nobody is subscribed.
                        let _ = shared.events.send(event);
                    }
                    let _ = receipt_tx.send(Ok(receipt));
                }
                Err(err) => {
                    let _ = receipt_tx.send(Err(err));
                }
            }
        });

        Ok(PendingCall::new(tx_hash, receipt_rx))
    }
}

/// Execute a mined call against the contract state.
fn apply(
    state: &mut ChainState,
    from: Address,
    call: &ContractCall,
    tx_hash: TxHash,
) -> ChainResult<(Receipt, ContractEvent)> {
    let revert = |reason: &str| ChainError::Reverted {
        tx_hash,
        reason: reason.to_string(),
    };

    let event = match call {
        ContractCall::RegisterAsset { price } => {
            let asset_id = AssetLedgerId(state.next_asset_id);
            state.next_asset_id += 1;
            state.assets.insert(
                asset_id,
                RegisteredAsset {
                    owner: from,
                    price: *price,
                },
            );
            info!(tx = %tx_hash, asset_id = asset_id.0, "asset registered on ledger");
            ContractEvent::AssetRegistered {
                tx_hash,
                asset_id,
                owner: from,
                price: *price,
            }
        }
        ContractCall::PurchaseRights { asset_id, amount } => {
            let asset = state
                .assets
                .get(asset_id)
                .copied()
                .ok_or_else(|| revert("unknown asset"))?;
            if *amount < asset.price {
                return Err(revert("payment below asset price"));
            }
            let buyer_balance = state
                .balances
                .get(&from)
                .copied()
                .unwrap_or(TokenAmount::ZERO);
            let remaining = buyer_balance
                .checked_sub(*amount)
                .ok_or_else(|| revert("insufficient balance"))?;
            state.balances.insert(from, remaining);
            let owner_balance = state
                .balances
                .get(&asset.owner)
                .copied()
                .unwrap_or(TokenAmount::ZERO);
            let credited = owner_balance
                .checked_add(*amount)
                .ok_or_else(|| revert("owner balance overflow"))?;
            state.balances.insert(asset.owner, credited);
            ContractEvent::RightsPurchased {
                tx_hash,
                asset_id: *asset_id,
                buyer: from,
                amount: *amount,
            }
        }
        ContractCall::Transfer { to, amount } => {
            let from_balance = state
                .balances
                .get(&from)
                .copied()
                .unwrap_or(TokenAmount::ZERO);
            let remaining = from_balance
                .checked_sub(*amount)
                .ok_or_else(|| revert("insufficient balance"))?;
            state.balances.insert(from, remaining);
            let to_balance = state
                .balances
                .get(to)
                .copied()
                .unwrap_or(TokenAmount::ZERO);
            let credited = to_balance
                .checked_add(*amount)
                .ok_or_else(|| revert("recipient balance overflow"))?;
            state.balances.insert(*to, credited);
            ContractEvent::TokensTransferred {
                tx_hash,
                from,
                to: *to,
                amount: *amount,
            }
        }
    };

    state.block += 1;
    let receipt = Receipt {
        tx_hash,
        block: state.block,
    };
    Ok((receipt, event))
}

#[async_trait]
impl LedgerRpc for DevChain {
    async fn balance_of(&self, address: &Address) -> ChainResult<TokenAmount> {
        Ok(self.balance(address))
    }

    async fn unlock_account(
        &self,
        address: &Address,
        passphrase: &str,
        window: Duration,
    ) -> ChainResult<()> {
        let mut state = self.shared.state.lock().expect("lock poisoned");
        match state.passphrases.get(address) {
            Some(stored) if stored == passphrase => {
                state
                    .unlocked_until
                    .insert(*address, Instant::now() + window);
                debug!(address = %address, ?window, "account unlocked");
                Ok(())
            }
            _ => Err(ChainError::BadPassphrase { address: *address }),
        }
    }

    async fn submit_call(&self, call: SignedCall) -> ChainResult<PendingCall> {
        call.verify()?;
        self.submit(call.from, call.call)
    }

    async fn submit_unlocked(
        &self,
        from: &Address,
        call: ContractCall,
    ) -> ChainResult<PendingCall> {
        {
            let state = self.shared.state.lock().expect("lock poisoned");
            match state.unlocked_until.get(from) {
                Some(deadline) if *deadline > Instant::now() => {}
                _ => return Err(ChainError::Locked { address: *from }),
            }
        }
        self.submit(*from, call)
    }

    fn subscribe(&self) -> EventStream {
        self.shared.events.subscribe()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::call::CallSigner;
    use rialto_crypto::RecoveryPhrase;

    fn chain() -> (DevChain, ChainConfig) {
        let config = ChainConfig {
            mining_delay: Duration::from_millis(5),
            ..ChainConfig::default()
        };
        let chain = DevChain::new(&config);
        (chain, config)
    }

    fn signer() -> CallSigner {
        CallSigner::from_recovery(&RecoveryPhrase::generate())
    }

    fn register(signer: &CallSigner, price: u128) -> SignedCall {
        signer
            .sign(
                ContractCall::RegisterAsset {
                    price: TokenAmount::from_units(price),
                },
                0,
            )
            .unwrap()
    }

    #[tokio::test]
    async fn register_mines_and_emits_event() {
        let (chain, _) = chain();
        let signer = signer();
        let mut events = chain.subscribe();

        let pending = chain.submit_call(register(&signer, 500)).await.unwrap();
        let tx_hash = pending.tx_hash;
        let receipt = pending.wait().await.unwrap();
        assert_eq!(receipt.tx_hash, tx_hash);

        let event = events.recv().await.unwrap();
        match event {
            ContractEvent::AssetRegistered {
                tx_hash: event_tx,
                asset_id,
                owner,
                price,
            } => {
                assert_eq!(event_tx, tx_hash);
                assert_eq!(asset_id, AssetLedgerId(1));
                assert_eq!(owner, signer.address());
                assert_eq!(price, TokenAmount::from_units(500));
            }
            other => panic!("unexpected event {other:?}"),
        }
    }

    #[tokio::test]
    async fn asset_ids_are_sequential() {
        let (chain, _) = chain();
        let signer = signer();
        let mut events = chain.subscribe();

        for _ in 0..3 {
            chain
                .submit_call(register(&signer, 100))
                .await
                .unwrap()
                .wait()
                .await
                .unwrap();
        }
        let mut ids = Vec::new();
        for _ in 0..3 {
            ids.push(events.recv().await.unwrap().asset_id().unwrap());
        }
        assert_eq!(ids, vec![AssetLedgerId(1), AssetLedgerId(2), AssetLedgerId(3)]);
    }

    #[tokio::test]
    async fn purchase_moves_funds_between_accounts() {
        let (chain, _) = chain();
        let owner = signer();
        let buyer = signer();
        chain.set_balance(buyer.address(), TokenAmount::from_units(1_000));

        chain
            .submit_call(register(&owner, 400))
            .await
            .unwrap()
            .wait()
            .await
            .unwrap();

        let purchase = buyer
            .sign(
                ContractCall::PurchaseRights {
                    asset_id: AssetLedgerId(1),
                    amount: TokenAmount::from_units(400),
                },
                0,
            )
            .unwrap();
        chain.submit_call(purchase).await.unwrap().wait().await.unwrap();

        assert_eq!(chain.balance(&buyer.address()), TokenAmount::from_units(600));
        assert_eq!(chain.balance(&owner.address()), TokenAmount::from_units(400));
    }

    #[tokio::test]
    async fn purchase_with_insufficient_balance_reverts() {
        let (chain, _) = chain();
        let owner = signer();
        let buyer = signer();

        chain
            .submit_call(register(&owner, 400))
            .await
            .unwrap()
            .wait()
            .await
            .unwrap();

        let purchase = buyer
            .sign(
                ContractCall::PurchaseRights {
                    asset_id: AssetLedgerId(1),
                    amount: TokenAmount::from_units(400),
                },
                0,
            )
            .unwrap();
        let err = chain
            .submit_call(purchase)
            .await
            .unwrap()
            .wait()
            .await
            .unwrap_err();
        assert!(matches!(err, ChainError::Reverted { .. }));
    }

    #[tokio::test]
    async fn purchase_of_unknown_asset_reverts() {
        let (chain, _) = chain();
        let buyer = signer();
        chain.set_balance(buyer.address(), TokenAmount::from_units(1_000));

        let purchase = buyer
            .sign(
                ContractCall::PurchaseRights {
                    asset_id: AssetLedgerId(99),
                    amount: TokenAmount::from_units(400),
                },
                0,
            )
            .unwrap();
        let err = chain
            .submit_call(purchase)
            .await
            .unwrap()
            .wait()
            .await
            .unwrap_err();
        assert!(matches!(err, ChainError::Reverted { .. }));
    }

    #[tokio::test]
    async fn treasury_transfer_requires_unlock() {
        let (chain, config) = chain();
        let recipient = signer().address();
        let transfer = ContractCall::Transfer {
            to: recipient,
            amount: TokenAmount::from_units(100),
        };

        let err = chain
            .submit_unlocked(&config.treasury.address, transfer.clone())
            .await
            .unwrap_err();
        assert!(matches!(err, ChainError::Locked { .. }));

        chain
            .unlock_account(
                &config.treasury.address,
                &config.treasury.passphrase,
                Duration::from_secs(5),
            )
            .await
            .unwrap();
        chain
            .submit_unlocked(&config.treasury.address, transfer)
            .await
            .unwrap()
            .wait()
            .await
            .unwrap();
        assert_eq!(chain.balance(&recipient), TokenAmount::from_units(100));
    }

    #[tokio::test]
    async fn unlock_window_expires() {
        let (chain, config) = chain();
        chain
            .unlock_account(
                &config.treasury.address,
                &config.treasury.passphrase,
                Duration::from_millis(10),
            )
            .await
            .unwrap();
        tokio::time::sleep(Duration::from_millis(30)).await;

        let err = chain
            .submit_unlocked(
                &config.treasury.address,
                ContractCall::Transfer {
                    to: signer().address(),
                    amount: TokenAmount::from_units(1),
                },
            )
            .await
            .unwrap_err();
        assert!(matches!(err, ChainError::Locked { .. }));
    }

    #[tokio::test]
    async fn wrong_passphrase_is_rejected() {
        let (chain, config) = chain();
        let err = chain
            .unlock_account(&config.treasury.address, "wrong", Duration::from_secs(5))
            .await
            .unwrap_err();
        assert!(matches!(err, ChainError::BadPassphrase { .. }));
    }

    #[tokio::test]
    async fn tampered_signature_is_rejected_before_mining() {
        let (chain, _) = chain();
        let mut signed = register(&signer(), 100);
        signed.from = Address::from_public_key(&[7; 32]);
        let err = chain.submit_call(signed).await.unwrap_err();
        assert!(matches!(err, ChainError::InvalidSignature));
        assert_eq!(chain.call_count(), 0);
    }

    #[tokio::test]
    async fn injected_submit_failure_hits_once() {
        let (chain, _) = chain();
        let signer = signer();
        chain.fail_next_submit();

        let err = chain.submit_call(register(&signer, 100)).await.unwrap_err();
        assert!(matches!(err, ChainError::Rpc(_)));

        chain
            .submit_call(register(&signer, 100))
            .await
            .unwrap()
            .wait()
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn suppressed_events_still_mine() {
        let (chain, _) = chain();
        let signer = signer();
        let mut events = chain.subscribe();
        chain.suppress_events(true);

        chain
            .submit_call(register(&signer, 100))
            .await
            .unwrap()
            .wait()
            .await
            .unwrap();

        let got = tokio::time::timeout(Duration::from_millis(30), events.recv()).await;
        assert!(got.is_err(), "expected no event while suppressed");
    }

    #[tokio::test]
    async fn call_counter_counts_submissions() {
        let (chain, _) = chain();
        let signer = signer();
        assert_eq!(chain.call_count(), 0);
        chain
            .submit_call(register(&signer, 100))
            .await
            .unwrap()
            .wait()
            .await
            .unwrap();
        assert_eq!(chain.call_count(), 1);
    }
}
