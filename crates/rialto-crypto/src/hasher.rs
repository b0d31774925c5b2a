/// Domain-separated BLAKE3 hasher.
///
/// Each hasher carries a domain tag that is prepended to every computation,
/// so a transaction payload and an event payload with identical bytes never
/// produce the same hash.
pub struct ContentHasher {
    domain: &'static str,
}

impl ContentHasher {
    /// Hasher for submitted ledger calls (transaction hashes).
    pub const TX: Self = Self {
        domain: "rialto-tx-v1",
    };
    /// Hasher for contract event payloads.
    pub const EVENT: Self = Self {
        domain: "rialto-event-v1",
    };

    /// Create a hasher with a custom domain tag.
    pub const fn new(domain: &'static str) -> Self {
        Self { domain }
    }

    /// Hash raw bytes with domain separation.
    pub fn hash(&self, data: &[u8]) -> [u8; 32] {
        let mut hasher = blake3::Hasher::new();
        hasher.update(self.domain.as_bytes());
        hasher.update(b":");
        hasher.update(data);
        *hasher.finalize().as_bytes()
    }

    /// Hash a serializable value as JSON with domain separation.
    pub fn hash_json<T: serde::Serialize>(&self, value: &T) -> Result<[u8; 32], HasherError> {
        let data =
            serde_json::to_vec(value).map_err(|e| HasherError::Serialization(e.to_string()))?;
        Ok(self.hash(&data))
    }

    /// The domain tag used by this hasher.
    pub fn domain(&self) -> &str {
        self.domain
    }
}

/// Errors from hashing operations.
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum HasherError {
    #[error("serialization error: {0}")]
    Serialization(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hash_is_deterministic() {
        assert_eq!(ContentHasher::TX.hash(b"call"), ContentHasher::TX.hash(b"call"));
    }

    #[test]
    fn different_domains_produce_different_hashes() {
        assert_ne!(
            ContentHasher::TX.hash(b"same bytes"),
            ContentHasher::EVENT.hash(b"same bytes")
        );
    }

    #[test]
    fn hash_json_works() {
        let value = serde_json::json!({"asset_id": 7, "amount": "1000"});
        let h1 = ContentHasher::EVENT.hash_json(&value).unwrap();
        let h2 = ContentHasher::EVENT.hash_json(&value).unwrap();
        assert_eq!(h1, h2);
    }

    #[test]
    fn custom_domain() {
        let hasher = ContentHasher::new("rialto-custom-v1");
        assert_ne!(hasher.hash(b"data"), ContentHasher::TX.hash(b"data"));
    }
}
