use std::fmt;

use serde::{Deserialize, Serialize};

use crate::amount::TokenAmount;
use crate::hash::{Address, IdentityHash};

/// Per-tenant ledger account.
///
/// Created once at organization-creation time. The recovery phrase is the
/// signing secret for the account and is persisted alongside the
/// organization record; `Debug` redacts it.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LedgerAccount {
    pub address: Address,
    pub recovery_phrase: String,
    /// Last observed on-ledger balance, if one was ever read. Advisory only;
    /// the ledger is authoritative.
    pub balance_snapshot: Option<TokenAmount>,
}

impl LedgerAccount {
    pub fn new(address: Address, recovery_phrase: String) -> Self {
        Self {
            address,
            recovery_phrase,
            balance_snapshot: None,
        }
    }
}

impl fmt::Debug for LedgerAccount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LedgerAccount")
            .field("address", &self.address)
            .field("recovery_phrase", &"<redacted>")
            .field("balance_snapshot", &self.balance_snapshot)
            .finish()
    }
}

/// Tenant organization: unique name, derived identity hash, and exactly one
/// ledger account.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Organization {
    pub name: String,
    pub identity_hash: IdentityHash,
    pub account: LedgerAccount,
}

impl Organization {
    /// Build an organization record, deriving the identity hash from the
    /// name.
    pub fn new(name: impl Into<String>, account: LedgerAccount) -> Self {
        let name = name.into();
        let identity_hash = IdentityHash::of_name(&name);
        Self {
            name,
            identity_hash,
            account,
        }
    }
}
