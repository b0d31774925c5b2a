use rialto_chain::{ChainConfig, RetryPolicy};

/// Engine configuration.
///
/// Built once at startup; the treasury credentials inside
/// [`ChainConfig::treasury`] live for the process lifetime.
#[derive(Debug, Clone, Default)]
pub struct EngineConfig {
    pub chain: ChainConfig,
    /// Retry for submitting a call, applied only to transport failures that
    /// occurred before a transaction hash existed.
    pub submit_retry: RetryPolicy,
    /// Inner retry for persisting a confirmed transaction to the catalog,
    /// attempted before surfacing `LedgerAheadOfCatalog`.
    pub persist_retry: RetryPolicy,
}
