use std::collections::BTreeSet;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::amount::TokenAmount;
use crate::hash::{ContentHash, IdentityHash};

/// Media classification carried by a catalog entry.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AssetKind {
    #[default]
    Photo,
    Video,
    Audio,
}

/// Catalog entry for a media asset.
///
/// `rights` is a set of organization identity hashes allowed to use the
/// asset; it always contains the owner, and an identity appears at most
/// once. `price_units == TokenAmount::ZERO` means the asset has not been
/// registered on the ledger yet.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Asset {
    pub content_hash: ContentHash,
    /// Reference key returned by the object-storage collaborator.
    pub storage_key: String,
    /// Public URL issued for the stored content.
    pub url: String,
    pub owner: IdentityHash,
    pub price_units: TokenAmount,
    pub rights: BTreeSet<IdentityHash>,
    pub kind: AssetKind,
    pub description: String,
    pub keywords: Vec<String>,
    pub created_at: DateTime<Utc>,
}

impl Asset {
    /// Create a fresh catalog entry owned by `owner`, with rights seeded to
    /// the owner alone.
    pub fn new(
        content_hash: ContentHash,
        storage_key: String,
        url: String,
        owner: IdentityHash,
        price_units: TokenAmount,
    ) -> Self {
        let mut rights = BTreeSet::new();
        rights.insert(owner);
        Self {
            content_hash,
            storage_key,
            url,
            owner,
            price_units,
            rights,
            kind: AssetKind::default(),
            description: String::new(),
            keywords: Vec::new(),
            created_at: Utc::now(),
        }
    }

    /// Whether `identity` is the owner or already holds usage rights.
    pub fn has_rights(&self, identity: &IdentityHash) -> bool {
        self.owner == *identity || self.rights.contains(identity)
    }

    /// Whether the asset has been registered on the ledger.
    pub fn is_registered(&self) -> bool {
        !self.price_units.is_zero()
    }

    /// Add a usage right. Returns `false` if the identity already held one.
    pub fn grant_right(&mut self, identity: IdentityHash) -> bool {
        self.rights.insert(identity)
    }
}
