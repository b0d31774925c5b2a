use std::sync::Arc;

use tracing::{info, warn};

use rialto_chain::{ChainConfig, ContractCall, LedgerRpc};
use rialto_crypto::{Keychain, RecoveryPhrase};
use rialto_types::{Address, LedgerAccount, TokenAmount};

use crate::error::EngineResult;
use crate::lease::LeaseMap;

/// Creates and funds per-tenant ledger accounts.
///
/// Funding draws on the configured treasury account, which is a single
/// shared signing identity: concurrent funding calls are serialized with a
/// waiting lease so two calls never race a nonce at the ledger layer.
pub struct Provisioner {
    ledger: Arc<dyn LedgerRpc>,
    config: ChainConfig,
    treasury_leases: LeaseMap<Address>,
}

impl Provisioner {
    pub fn new(ledger: Arc<dyn LedgerRpc>, config: ChainConfig) -> Self {
        Self {
            ledger,
            config,
            treasury_leases: LeaseMap::new(),
        }
    }

    /// Derive a fresh account and, if `funding` is nonzero, grant it an
    /// initial balance from the treasury.
    ///
    /// If the funding transfer fails after the account was derived, the
    /// account is still returned: a partially provisioned tenant is repaired
    /// later via [`Provisioner::refund`], not discarded. That degraded path
    /// is logged, never silent.
    pub async fn provision(&self, funding: TokenAmount) -> EngineResult<LedgerAccount> {
        let phrase = RecoveryPhrase::generate();
        let address = Keychain::from_phrase(&phrase).address();
        let mut account = LedgerAccount::new(address, phrase.as_str());
        info!(address = %address, "ledger account derived");

        if !funding.is_zero() {
            match self.fund(address, funding).await {
                Ok(()) => account.balance_snapshot = Some(funding),
                Err(err) => {
                    warn!(
                        address = %address,
                        %err,
                        "degraded provisioning: account derived but funding failed"
                    );
                }
            }
        }
        Ok(account)
    }

    /// Repair a partially provisioned account with an explicit transfer.
    ///
    /// Unlike the grant inside [`Provisioner::provision`], a failed refund
    /// is an error: the caller asked for exactly this transfer.
    pub async fn refund(&self, account: &LedgerAccount, amount: TokenAmount) -> EngineResult<TokenAmount> {
        self.fund(account.address, amount).await?;
        let balance = self.ledger.balance_of(&account.address).await?;
        info!(address = %account.address, %balance, "account refunded");
        Ok(balance)
    }

    async fn fund(&self, to: Address, amount: TokenAmount) -> EngineResult<()> {
        let treasury = self.config.treasury.address;
        let _lease = self.treasury_leases.acquire(&treasury).await;

        self.ledger
            .unlock_account(
                &treasury,
                &self.config.treasury.passphrase,
                self.config.unlock_window,
            )
            .await?;
        let pending = self
            .ledger
            .submit_unlocked(&treasury, ContractCall::Transfer { to, amount })
            .await?;
        let receipt = pending.wait_with_timeout(self.config.mining_timeout).await?;
        info!(to = %to, %amount, tx = %receipt.tx_hash, "funding transfer mined");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rialto_chain::DevChain;
    use std::time::Duration;

    fn setup() -> (Arc<DevChain>, Provisioner) {
        let config = ChainConfig {
            mining_delay: Duration::from_millis(5),
            ..ChainConfig::default()
        };
        let chain = Arc::new(DevChain::new(&config));
        let provisioner = Provisioner::new(chain.clone(), config);
        (chain, provisioner)
    }

    #[tokio::test]
    async fn provisioned_account_is_funded() {
        let (chain, provisioner) = setup();
        let grant = TokenAmount::from_units(1_000);

        let account = provisioner.provision(grant).await.unwrap();
        assert_eq!(chain.balance(&account.address), grant);
        assert_eq!(account.balance_snapshot, Some(grant));
    }

    #[tokio::test]
    async fn zero_funding_skips_the_treasury() {
        let (chain, provisioner) = setup();
        let account = provisioner.provision(TokenAmount::ZERO).await.unwrap();
        assert_eq!(chain.balance(&account.address), TokenAmount::ZERO);
        assert_eq!(account.balance_snapshot, None);
        assert_eq!(chain.call_count(), 0);
    }

    #[tokio::test]
    async fn phrase_recovers_the_provisioned_address() {
        let (_chain, provisioner) = setup();
        let account = provisioner.provision(TokenAmount::ZERO).await.unwrap();
        let keychain = Keychain::from_stored_phrase(&account.recovery_phrase).unwrap();
        assert_eq!(keychain.address(), account.address);
    }

    #[tokio::test]
    async fn funding_failure_still_returns_the_account() {
        let (chain, provisioner) = setup();
        chain.fail_next_submit();

        let account = provisioner
            .provision(TokenAmount::from_units(1_000))
            .await
            .unwrap();
        assert_eq!(chain.balance(&account.address), TokenAmount::ZERO);
        assert_eq!(account.balance_snapshot, None);
    }

    #[tokio::test]
    async fn refund_repairs_a_partially_provisioned_account() {
        let (chain, provisioner) = setup();
        chain.fail_next_submit();
        let account = provisioner
            .provision(TokenAmount::from_units(1_000))
            .await
            .unwrap();

        let balance = provisioner
            .refund(&account, TokenAmount::from_units(1_000))
            .await
            .unwrap();
        assert_eq!(balance, TokenAmount::from_units(1_000));
        assert_eq!(chain.balance(&account.address), balance);
    }

    #[tokio::test]
    async fn refund_failure_is_an_error() {
        let (chain, provisioner) = setup();
        let account = provisioner.provision(TokenAmount::ZERO).await.unwrap();

        chain.fail_next_submit();
        let result = provisioner
            .refund(&account, TokenAmount::from_units(100))
            .await;
        assert!(result.is_err());
    }

    #[tokio::test]
    async fn concurrent_provisioning_serializes_treasury_calls() {
        let (chain, provisioner) = setup();
        let provisioner = Arc::new(provisioner);
        let grant = TokenAmount::from_units(500);

        let tasks: Vec<_> = (0..4)
            .map(|_| {
                let provisioner = Arc::clone(&provisioner);
                tokio::spawn(async move { provisioner.provision(grant).await })
            })
            .collect();
        for task in tasks {
            let account = task.await.unwrap().unwrap();
            assert_eq!(chain.balance(&account.address), grant);
        }
    }
}
