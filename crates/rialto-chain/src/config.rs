use std::time::Duration;

use rialto_types::{Address, TokenAmount};

/// Treasury account used to fund newly provisioned organizations.
///
/// The passphrase authorizes a time-boxed unlock on the ledger node; it is
/// never logged and its `Debug` output is redacted.
#[derive(Clone)]
pub struct TreasuryConfig {
    pub address: Address,
    pub passphrase: String,
    /// Amount granted to each newly provisioned organization.
    pub funding_grant: TokenAmount,
}

impl std::fmt::Debug for TreasuryConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TreasuryConfig")
            .field("address", &self.address)
            .field("passphrase", &"<redacted>")
            .field("funding_grant", &self.funding_grant)
            .finish()
    }
}

/// Ledger client configuration.
///
/// Built once at startup and passed by reference; there is no mutable
/// module-level cache of connection state.
#[derive(Debug, Clone)]
pub struct ChainConfig {
    /// RPC endpoint of the ledger node.
    pub endpoint: String,
    /// Address of the deployed rights contract.
    pub contract_address: Address,
    /// Treasury used for funding grants.
    pub treasury: TreasuryConfig,
    /// How long an account unlock stays valid.
    pub unlock_window: Duration,
    /// Simulated mining delay on the dev chain.
    pub mining_delay: Duration,
    /// Upper bound on waiting for a call to be mined.
    pub mining_timeout: Duration,
    /// Upper bound on waiting for the matching contract event.
    pub event_timeout: Duration,
    /// Capacity of the broadcast event channel.
    pub event_channel_capacity: usize,
}

impl Default for ChainConfig {
    fn default() -> Self {
        Self {
            endpoint: "http://127.0.0.1:8545".to_string(),
            contract_address: Address::from_public_key(b"rialto-rights-contract-v1-------"),
            treasury: TreasuryConfig {
                address: Address::from_public_key(b"rialto-treasury-account-v1------"),
                passphrase: "dev-treasury".to_string(),
                funding_grant: TokenAmount::from_units(10 * 10u128.pow(rialto_types::UNIT_SCALE)),
            },
            unlock_window: Duration::from_secs(15),
            mining_delay: Duration::from_millis(10),
            mining_timeout: Duration::from_secs(30),
            event_timeout: Duration::from_secs(30),
            event_channel_capacity: 256,
        }
    }
}
