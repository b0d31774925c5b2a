use std::sync::Arc;

use tracing::{error, info};

use rialto_catalog::AssetCatalog;
use rialto_chain::{
    retry, retry_if, CallSigner, ChainError, ContractCall, LedgerRpc, PendingCall, SignedCall,
};
use rialto_store::MediaStore;
use rialto_types::{
    Asset, AssetKind, ContentHash, IdentityHash, LedgerTransaction, Organization, TokenAmount,
    TransactionKind,
};

use crate::config::EngineConfig;
use crate::correlator::correlate;
use crate::error::{EngineError, EngineResult};
use crate::lease::LeaseMap;
use crate::provisioner::Provisioner;

/// Input to [`RightsEngine::register_asset`].
#[derive(Debug, Clone)]
pub struct RegisterAssetRequest {
    pub content: Vec<u8>,
    /// Catalog-facing decimal price, converted to ledger units exactly once
    /// at the engine boundary.
    pub price: String,
    pub kind: AssetKind,
    pub description: String,
    pub keywords: Vec<String>,
}

impl RegisterAssetRequest {
    pub fn new(content: Vec<u8>, price: impl Into<String>) -> Self {
        Self {
            content,
            price: price.into(),
            kind: AssetKind::default(),
            description: String::new(),
            keywords: Vec::new(),
        }
    }
}

/// Result of a completed ledger-backed workflow.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransactionOutcome {
    pub asset: Asset,
    pub transaction: LedgerTransaction,
}

/// Rights transaction orchestrator.
///
/// Owns the correctness of the two ledger-backed workflows. Both follow the
/// same sequence: precondition checks with no side effects, ledger call,
/// event correlation, transaction persistence (with its own bounded retry),
/// catalog mutation. The `LedgerTransaction` row is always written before
/// the asset or right it describes becomes visible, so a purchase can never
/// race ahead of its own registration record.
pub struct RightsEngine {
    catalog: Arc<dyn AssetCatalog>,
    media: Arc<dyn MediaStore>,
    ledger: Arc<dyn LedgerRpc>,
    provisioner: Provisioner,
    purchase_leases: LeaseMap<(ContentHash, IdentityHash)>,
    config: EngineConfig,
}

impl RightsEngine {
    pub fn new(
        catalog: Arc<dyn AssetCatalog>,
        media: Arc<dyn MediaStore>,
        ledger: Arc<dyn LedgerRpc>,
        config: EngineConfig,
    ) -> Self {
        let provisioner = Provisioner::new(Arc::clone(&ledger), config.chain.clone());
        Self {
            catalog,
            media,
            ledger,
            provisioner,
            purchase_leases: LeaseMap::new(),
            config,
        }
    }

    pub fn provisioner(&self) -> &Provisioner {
        &self.provisioner
    }

    /// Register a new asset: store its content, record it on the ledger,
    /// and mirror both into the catalog.
    pub async fn register_asset(
        &self,
        owner: &Organization,
        request: RegisterAssetRequest,
    ) -> EngineResult<TransactionOutcome> {
        // Preconditions: no side effects before these pass.
        let content_hash = ContentHash::of(&request.content);
        if self.catalog.find_by_hash(&content_hash).await?.is_some() {
            return Err(EngineError::DuplicateAsset(content_hash));
        }
        let price_units = TokenAmount::from_decimal_str(&request.price)?;
        let signer = CallSigner::from_stored_phrase(&owner.account.recovery_phrase)?;

        // Storage failure is fatal here: no catalog entry without content.
        let storage_key = self.media.put(&request.content).await?;
        let url = self.media.url_for(&storage_key);
        let mut asset = Asset::new(
            content_hash,
            storage_key.as_str().to_string(),
            url,
            owner.identity_hash,
            price_units,
        );
        asset.kind = request.kind;
        asset.description = request.description;
        asset.keywords = request.keywords;

        // Subscribe before submitting so the event cannot be missed.
        let stream = self.ledger.subscribe();
        let signed = signer.sign(
            ContractCall::RegisterAsset { price: price_units },
            rand::random(),
        )?;
        let pending = self.submit(signed).await?;
        let correlation = correlate(
            pending,
            stream,
            self.config.chain.mining_timeout,
            self.config.chain.event_timeout,
        )
        .await?;

        let transaction = LedgerTransaction::registration(
            correlation.tx_hash,
            content_hash,
            correlation.asset_id,
            owner.identity_hash,
        );
        self.persist_transaction(&transaction).await?;
        self.catalog.upsert_asset(&asset).await.map_err(|err| {
            error!(tx = %transaction.tx_hash, %err, "asset write failed after ledger confirmation");
            EngineError::LedgerAheadOfCatalog {
                tx_hash: transaction.tx_hash,
            }
        })?;

        info!(
            asset = %content_hash,
            ledger_id = %correlation.asset_id,
            tx = %transaction.tx_hash,
            "asset registered"
        );
        Ok(TransactionOutcome { asset, transaction })
    }

    /// Purchase usage rights to a registered asset for `buyer`.
    pub async fn purchase_rights(
        &self,
        content_hash: &ContentHash,
        buyer: &Organization,
    ) -> EngineResult<TransactionOutcome> {
        // One in-flight purchase per (asset, buyer), held through the
        // catalog mutation below. Taken before the asset snapshot: a
        // snapshot read outside the lease could go stale against a
        // concurrent purchase by the same buyer and pass the rights check
        // after that purchase already paid.
        let lease_key = (*content_hash, buyer.identity_hash);
        let _lease = self.purchase_leases.try_acquire(&lease_key).ok_or(
            EngineError::AlreadyInProgress {
                asset: *content_hash,
                buyer: buyer.identity_hash,
            },
        )?;

        let asset = self
            .catalog
            .find_by_hash(content_hash)
            .await?
            .ok_or(EngineError::NotFound(*content_hash))?;

        if asset.has_rights(&buyer.identity_hash) {
            return Err(EngineError::AlreadyOwned {
                asset: *content_hash,
                buyer: buyer.identity_hash,
            });
        }
        let price = asset.price_units;
        let signer = CallSigner::from_stored_phrase(&buyer.account.recovery_phrase)?;
        let balance = self.ledger.balance_of(&signer.address()).await?;
        if balance < price {
            return Err(EngineError::InsufficientFunds {
                needed: price,
                available: balance,
            });
        }

        // The ledger id comes from the registration row, the only record
        // that carries it.
        let registration = self
            .catalog
            .find_transaction(content_hash, TransactionKind::Registration)
            .await?
            .ok_or(EngineError::RegistrationMissing(*content_hash))?;

        let stream = self.ledger.subscribe();
        let signed = signer.sign(
            ContractCall::PurchaseRights {
                asset_id: registration.asset_ledger_id,
                amount: price,
            },
            rand::random(),
        )?;
        let pending = self.submit(signed).await?;
        let correlation = correlate(
            pending,
            stream,
            self.config.chain.mining_timeout,
            self.config.chain.event_timeout,
        )
        .await?;

        let transaction = LedgerTransaction::purchase(
            correlation.tx_hash,
            *content_hash,
            correlation.asset_id,
            price,
            buyer.identity_hash,
            asset.owner,
        );
        self.persist_transaction(&transaction).await?;

        // Atomic set-add against the current persisted rights, not the
        // value read at the top of this workflow.
        self.catalog
            .append_right(content_hash, buyer.identity_hash)
            .await
            .map_err(|err| {
                error!(tx = %transaction.tx_hash, %err, "right write failed after ledger confirmation");
                EngineError::LedgerAheadOfCatalog {
                    tx_hash: transaction.tx_hash,
                }
            })?;

        let asset = self
            .catalog
            .find_by_hash(content_hash)
            .await?
            .ok_or(EngineError::NotFound(*content_hash))?;
        info!(
            asset = %content_hash,
            buyer = %buyer.identity_hash,
            tx = %transaction.tx_hash,
            "rights purchased"
        );
        Ok(TransactionOutcome { asset, transaction })
    }

    /// Replay catalog-side persistence for a transaction that confirmed on
    /// the ledger but never reached the catalog.
    ///
    /// Idempotent, keyed on the transaction hash: the row insert is a no-op
    /// on replay and the right append is a set-add. Never touches the
    /// ledger.
    pub async fn reconcile(&self, transaction: &LedgerTransaction) -> EngineResult<()> {
        let inserted = self.catalog.insert_transaction(transaction).await?;
        if transaction.kind == TransactionKind::Purchase {
            self.catalog
                .append_right(&transaction.asset_content_hash, transaction.initiator)
                .await?;
        }
        info!(
            tx = %transaction.tx_hash,
            kind = ?transaction.kind,
            inserted,
            "transaction reconciled"
        );
        Ok(())
    }

    /// Reconcile a registration whose asset record is also missing,
    /// supplying the catalog entry that could not be written at the time.
    pub async fn reconcile_registration(
        &self,
        transaction: &LedgerTransaction,
        asset: &Asset,
    ) -> EngineResult<()> {
        self.catalog.insert_transaction(transaction).await?;
        if self.catalog.find_by_hash(&asset.content_hash).await?.is_none() {
            self.catalog.upsert_asset(asset).await?;
        }
        info!(tx = %transaction.tx_hash, asset = %asset.content_hash, "registration reconciled");
        Ok(())
    }

    /// Create a tenant: provision a funded ledger account and persist the
    /// organization record.
    pub async fn register_organization(
        &self,
        name: &str,
        funding: TokenAmount,
    ) -> EngineResult<Organization> {
        // Checked before provisioning so a name conflict never consumes a
        // treasury grant.
        if self.catalog.find_organization(name).await?.is_some() {
            return Err(rialto_catalog::CatalogError::DuplicateOrganization(name.to_string()).into());
        }
        let account = self.provisioner.provision(funding).await?;
        let organization = Organization::new(name, account);
        self.catalog.insert_organization(&organization).await?;
        info!(name, identity = %organization.identity_hash, "organization registered");
        Ok(organization)
    }

    /// Current on-ledger balance of an organization's account.
    pub async fn account_balance(&self, organization: &Organization) -> EngineResult<TokenAmount> {
        let balance = self.ledger.balance_of(&organization.account.address).await?;
        Ok(balance)
    }

    /// Submit a signed call, retrying transport failures.
    ///
    /// Retries happen only before a transaction hash exists; once
    /// submission succeeds the call is never resubmitted.
    async fn submit(&self, signed: SignedCall) -> EngineResult<PendingCall> {
        retry_if(
            &self.config.submit_retry,
            "submit_call",
            || {
                let ledger = Arc::clone(&self.ledger);
                let signed = signed.clone();
                async move { ledger.submit_call(signed).await }
            },
            ChainError::is_transient,
        )
        .await
        .map_err(Into::into)
    }

    /// Persist a confirmed transaction with its own bounded retry; if the
    /// catalog still refuses, surface `LedgerAheadOfCatalog` so the row can
    /// be replayed without resubmitting to the ledger.
    async fn persist_transaction(&self, transaction: &LedgerTransaction) -> EngineResult<()> {
        retry(&self.config.persist_retry, "insert_transaction", || {
            let catalog = Arc::clone(&self.catalog);
            let transaction = transaction.clone();
            async move { catalog.insert_transaction(&transaction).await.map(|_| ()) }
        })
        .await
        .map_err(|err| {
            error!(
                tx = %transaction.tx_hash,
                %err,
                "transaction row not persisted after ledger confirmation"
            );
            EngineError::LedgerAheadOfCatalog {
                tx_hash: transaction.tx_hash,
            }
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rialto_catalog::InMemoryCatalog;
    use rialto_chain::{ChainConfig, DevChain};
    use rialto_store::InMemoryMediaStore;
    use std::time::Duration;

    fn setup() -> (Arc<DevChain>, Arc<InMemoryCatalog>, RightsEngine) {
        let chain_config = ChainConfig {
            mining_delay: Duration::from_millis(5),
            ..ChainConfig::default()
        };
        let chain = Arc::new(DevChain::new(&chain_config));
        let catalog = Arc::new(InMemoryCatalog::new());
        let engine = RightsEngine::new(
            catalog.clone(),
            Arc::new(InMemoryMediaStore::default()),
            chain.clone(),
            EngineConfig {
                chain: chain_config,
                ..EngineConfig::default()
            },
        );
        (chain, catalog, engine)
    }

    #[tokio::test]
    async fn register_organization_provisions_and_persists() {
        let (chain, catalog, engine) = setup();
        let funding = TokenAmount::from_units(5_000);

        let org = engine.register_organization("acme", funding).await.unwrap();
        assert_eq!(chain.balance(&org.account.address), funding);
        assert!(catalog.find_organization("acme").await.unwrap().is_some());
    }

    #[tokio::test]
    async fn duplicate_organization_name_never_touches_the_treasury() {
        let (chain, _catalog, engine) = setup();
        engine
            .register_organization("acme", TokenAmount::ZERO)
            .await
            .unwrap();
        let before = chain.call_count();

        let err = engine
            .register_organization("acme", TokenAmount::from_units(1_000))
            .await
            .unwrap_err();
        assert!(matches!(err, EngineError::Catalog(_)));
        assert_eq!(chain.call_count(), before);
    }

    #[tokio::test]
    async fn account_balance_reads_the_ledger() {
        let (chain, _catalog, engine) = setup();
        let org = engine
            .register_organization("acme", TokenAmount::ZERO)
            .await
            .unwrap();
        assert_eq!(
            engine.account_balance(&org).await.unwrap(),
            TokenAmount::ZERO
        );

        chain.set_balance(org.account.address, TokenAmount::from_units(77));
        assert_eq!(
            engine.account_balance(&org).await.unwrap(),
            TokenAmount::from_units(77)
        );
    }
}
