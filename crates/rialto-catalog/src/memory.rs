use std::collections::HashMap;
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::RwLock;

use async_trait::async_trait;
use tracing::debug;

use rialto_types::{
    Asset, ContentHash, IdentityHash, LedgerAccount, LedgerTransaction, Organization,
    TransactionKind, TxHash,
};

use crate::error::{CatalogError, CatalogResult};
use crate::traits::AssetCatalog;

#[derive(Default)]
struct CatalogState {
    assets: HashMap<ContentHash, Asset>,
    transactions: Vec<LedgerTransaction>,
    tx_index: HashMap<TxHash, usize>,
    organizations: HashMap<String, Organization>,
}

/// In-memory catalog for tests and embedding.
///
/// All records are held behind one `RwLock`, which is what makes
/// `append_right` an atomic read-modify-write. A failure-injection counter
/// lets orchestration tests exercise the post-ledger persistence-failure
/// path.
pub struct InMemoryCatalog {
    inner: RwLock<CatalogState>,
    fail_transaction_inserts: AtomicU32,
}

impl InMemoryCatalog {
    pub fn new() -> Self {
        Self {
            inner: RwLock::new(CatalogState::default()),
            fail_transaction_inserts: AtomicU32::new(0),
        }
    }

    /// Make the next `n` calls to `insert_transaction` fail with a backend
    /// error.
    pub fn fail_transaction_inserts(&self, n: u32) {
        self.fail_transaction_inserts.store(n, Ordering::SeqCst);
    }

    /// Number of stored transactions.
    pub fn transaction_count(&self) -> usize {
        self.inner.read().expect("lock poisoned").transactions.len()
    }

    /// Number of stored assets.
    pub fn asset_count(&self) -> usize {
        self.inner.read().expect("lock poisoned").assets.len()
    }
}

impl Default for InMemoryCatalog {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl AssetCatalog for InMemoryCatalog {
    async fn find_by_hash(&self, hash: &ContentHash) -> CatalogResult<Option<Asset>> {
        let state = self.inner.read().expect("lock poisoned");
        Ok(state.assets.get(hash).cloned())
    }

    async fn upsert_asset(&self, asset: &Asset) -> CatalogResult<()> {
        let mut state = self.inner.write().expect("lock poisoned");
        state.assets.insert(asset.content_hash, asset.clone());
        Ok(())
    }

    async fn append_right(
        &self,
        hash: &ContentHash,
        identity: IdentityHash,
    ) -> CatalogResult<bool> {
        let mut state = self.inner.write().expect("lock poisoned");
        let asset = state
            .assets
            .get_mut(hash)
            .ok_or(CatalogError::AssetNotFound(*hash))?;
        let added = asset.grant_right(identity);
        debug!(asset = %hash, identity = %identity, added, "right appended");
        Ok(added)
    }

    async fn insert_transaction(&self, tx: &LedgerTransaction) -> CatalogResult<bool> {
        let remaining = self.fail_transaction_inserts.load(Ordering::SeqCst);
        if remaining > 0 {
            self.fail_transaction_inserts
                .store(remaining - 1, Ordering::SeqCst);
            return Err(CatalogError::Backend("injected failure".into()));
        }

        let mut state = self.inner.write().expect("lock poisoned");
        if state.tx_index.contains_key(&tx.tx_hash) {
            // Unique on tx hash; replay is a no-op.
            return Ok(false);
        }
        state.transactions.push(tx.clone());
        let index = state.transactions.len() - 1;
        state.tx_index.insert(tx.tx_hash, index);
        Ok(true)
    }

    async fn find_transaction(
        &self,
        hash: &ContentHash,
        kind: TransactionKind,
    ) -> CatalogResult<Option<LedgerTransaction>> {
        let state = self.inner.read().expect("lock poisoned");
        Ok(state
            .transactions
            .iter()
            .rev()
            .find(|tx| tx.asset_content_hash == *hash && tx.kind == kind)
            .cloned())
    }

    async fn find_transaction_by_hash(
        &self,
        tx_hash: &TxHash,
    ) -> CatalogResult<Option<LedgerTransaction>> {
        let state = self.inner.read().expect("lock poisoned");
        Ok(state
            .tx_index
            .get(tx_hash)
            .and_then(|&i| state.transactions.get(i))
            .cloned())
    }

    async fn find_organization(&self, name: &str) -> CatalogResult<Option<Organization>> {
        let state = self.inner.read().expect("lock poisoned");
        Ok(state.organizations.get(name).cloned())
    }

    async fn insert_organization(&self, org: &Organization) -> CatalogResult<()> {
        let mut state = self.inner.write().expect("lock poisoned");
        if state.organizations.contains_key(&org.name) {
            return Err(CatalogError::DuplicateOrganization(org.name.clone()));
        }
        state.organizations.insert(org.name.clone(), org.clone());
        Ok(())
    }

    async fn update_account(&self, name: &str, account: &LedgerAccount) -> CatalogResult<()> {
        let mut state = self.inner.write().expect("lock poisoned");
        let org = state
            .organizations
            .get_mut(name)
            .ok_or_else(|| CatalogError::OrganizationNotFound(name.to_string()))?;
        org.account = account.clone();
        Ok(())
    }
}
