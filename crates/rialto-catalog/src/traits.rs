use async_trait::async_trait;

use rialto_types::{
    Asset, ContentHash, IdentityHash, LedgerAccount, LedgerTransaction, Organization,
    TransactionKind, TxHash,
};

use crate::error::CatalogResult;

/// Query and mutation boundary for the off-chain catalog.
///
/// Implementations must satisfy:
/// - `append_right` mutates the asset's **current persisted** rights set
///   atomically; it never overwrites the set with a value the caller read
///   earlier.
/// - `insert_transaction` enforces uniqueness on the transaction hash and
///   treats a duplicate insert as a successful no-op, so a reconciliation
///   replay never creates a second row.
/// - All failures are propagated as errors, never absorbed.
#[async_trait]
pub trait AssetCatalog: Send + Sync {
    /// Look up an asset by its content hash.
    async fn find_by_hash(&self, hash: &ContentHash) -> CatalogResult<Option<Asset>>;

    /// Insert or replace an asset record, keyed by content hash.
    async fn upsert_asset(&self, asset: &Asset) -> CatalogResult<()>;

    /// Atomically add `identity` to the asset's rights set.
    ///
    /// Returns `true` if the identity was newly added, `false` if it was
    /// already present. Fails if the asset does not exist.
    async fn append_right(
        &self,
        hash: &ContentHash,
        identity: IdentityHash,
    ) -> CatalogResult<bool>;

    /// Record a confirmed ledger transaction.
    ///
    /// Returns `true` if the row was inserted, `false` if a row with the
    /// same transaction hash already existed (no-op).
    async fn insert_transaction(&self, tx: &LedgerTransaction) -> CatalogResult<bool>;

    /// Find the most recent transaction of `kind` for an asset.
    async fn find_transaction(
        &self,
        hash: &ContentHash,
        kind: TransactionKind,
    ) -> CatalogResult<Option<LedgerTransaction>>;

    /// Look up a transaction by its ledger hash.
    async fn find_transaction_by_hash(
        &self,
        tx_hash: &TxHash,
    ) -> CatalogResult<Option<LedgerTransaction>>;

    /// Look up an organization by its unique name.
    async fn find_organization(&self, name: &str) -> CatalogResult<Option<Organization>>;

    /// Persist a new organization. Fails if the name is taken.
    async fn insert_organization(&self, org: &Organization) -> CatalogResult<()>;

    /// Replace an organization's ledger account (explicit rotation only).
    async fn update_account(&self, name: &str, account: &LedgerAccount) -> CatalogResult<()>;
}
