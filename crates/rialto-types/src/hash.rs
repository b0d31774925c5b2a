use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::TypeError;

fn parse_fixed<const N: usize>(s: &str, prefix: &str) -> Result<[u8; N], TypeError> {
    let s = s.strip_prefix(prefix).unwrap_or(s);
    let bytes = hex::decode(s).map_err(|e| TypeError::InvalidHex(e.to_string()))?;
    if bytes.len() != N {
        return Err(TypeError::InvalidLength {
            expected: N,
            actual: bytes.len(),
        });
    }
    let mut arr = [0u8; N];
    arr.copy_from_slice(&bytes);
    Ok(arr)
}

/// Content-addressed identifier for a media asset.
///
/// Derived deterministically from the asset bytes using domain-separated
/// BLAKE3: the same bytes always produce the same hash, and a content hash
/// can never collide with an identity or transaction hash.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ContentHash {
    hash: [u8; 32],
}

impl ContentHash {
    /// Hash raw asset bytes.
    pub fn of(content: &[u8]) -> Self {
        let mut hasher = blake3::Hasher::new();
        hasher.update(b"rialto-content-v1:");
        hasher.update(content);
        Self {
            hash: *hasher.finalize().as_bytes(),
        }
    }

    /// The raw 32-byte hash.
    pub fn as_bytes(&self) -> &[u8; 32] {
        &self.hash
    }

    /// Full hex-encoded string.
    pub fn to_hex(&self) -> String {
        hex::encode(self.hash)
    }

    /// Short identifier (first 8 hex characters).
    pub fn short_id(&self) -> String {
        format!("media:{}", hex::encode(&self.hash[..4]))
    }

    /// Parse from a hex string (64 hex characters).
    pub fn from_hex(s: &str) -> Result<Self, TypeError> {
        Ok(Self {
            hash: parse_fixed(s, "media:")?,
        })
    }

    /// Create from a raw 32-byte hash. Use `of()` for production code.
    pub fn from_raw(hash: [u8; 32]) -> Self {
        Self { hash }
    }
}

impl fmt::Debug for ContentHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ContentHash({})", self.short_id())
    }
}

impl fmt::Display for ContentHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.short_id())
    }
}

/// Stable, non-reversible join key for an organization.
///
/// Derived from the organization's unique name; rights lists and transaction
/// rows carry this digest instead of the human-readable name.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct IdentityHash {
    hash: [u8; 32],
}

impl IdentityHash {
    /// Derive the identity hash for an organization name.
    pub fn of_name(name: &str) -> Self {
        let mut hasher = blake3::Hasher::new();
        hasher.update(b"rialto-identity-v1:");
        hasher.update(name.as_bytes());
        Self {
            hash: *hasher.finalize().as_bytes(),
        }
    }

    /// Create an ephemeral (random) identity for tests and demos.
    pub fn ephemeral() -> Self {
        let mut bytes = [0u8; 16];
        rand::Rng::fill(&mut rand::thread_rng(), &mut bytes);
        Self::of_name(&hex::encode(bytes))
    }

    /// The raw 32-byte hash.
    pub fn as_bytes(&self) -> &[u8; 32] {
        &self.hash
    }

    /// Full hex-encoded string.
    pub fn to_hex(&self) -> String {
        hex::encode(self.hash)
    }

    /// Short identifier (first 8 hex characters).
    pub fn short_id(&self) -> String {
        format!("org:{}", hex::encode(&self.hash[..4]))
    }

    /// Parse from a hex string (64 hex characters).
    pub fn from_hex(s: &str) -> Result<Self, TypeError> {
        Ok(Self {
            hash: parse_fixed(s, "org:")?,
        })
    }
}

impl fmt::Debug for IdentityHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "IdentityHash({})", self.short_id())
    }
}

impl fmt::Display for IdentityHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.short_id())
    }
}

/// Hash of a submitted ledger transaction.
///
/// Assigned by the ledger at submission time; unique per transaction and used
/// as the idempotency key for catalog replay.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct TxHash {
    hash: [u8; 32],
}

impl TxHash {
    /// The raw 32-byte hash.
    pub fn as_bytes(&self) -> &[u8; 32] {
        &self.hash
    }

    /// Full hex-encoded string.
    pub fn to_hex(&self) -> String {
        hex::encode(self.hash)
    }

    /// Short identifier (first 8 hex characters).
    pub fn short_id(&self) -> String {
        format!("tx:{}", hex::encode(&self.hash[..4]))
    }

    /// Parse from a hex string (64 hex characters).
    pub fn from_hex(s: &str) -> Result<Self, TypeError> {
        Ok(Self {
            hash: parse_fixed(s, "tx:")?,
        })
    }

    /// Create from a raw 32-byte hash.
    pub fn from_raw(hash: [u8; 32]) -> Self {
        Self { hash }
    }
}

impl fmt::Debug for TxHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "TxHash({})", self.short_id())
    }
}

impl fmt::Display for TxHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.short_id())
    }
}

/// Ledger account address (20 bytes, hex-displayed with an `0x` prefix).
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Address {
    bytes: [u8; 20],
}

impl Address {
    /// Create from raw address bytes.
    pub fn from_raw(bytes: [u8; 20]) -> Self {
        Self { bytes }
    }

    /// Derive an address from a 32-byte public key: the first 20 bytes of
    /// the domain-separated digest of the key.
    pub fn from_public_key(public_key: &[u8; 32]) -> Self {
        let mut hasher = blake3::Hasher::new();
        hasher.update(b"rialto-address-v1:");
        hasher.update(public_key);
        let digest = hasher.finalize();
        let mut bytes = [0u8; 20];
        bytes.copy_from_slice(&digest.as_bytes()[..20]);
        Self { bytes }
    }

    /// The raw 20 address bytes.
    pub fn as_bytes(&self) -> &[u8; 20] {
        &self.bytes
    }

    /// Full hex-encoded string with `0x` prefix.
    pub fn to_hex(&self) -> String {
        format!("0x{}", hex::encode(self.bytes))
    }

    /// Parse from a hex string (40 hex characters, optional `0x` prefix).
    pub fn from_hex(s: &str) -> Result<Self, TypeError> {
        Ok(Self {
            bytes: parse_fixed(s, "0x")?,
        })
    }
}

impl fmt::Debug for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Address(0x{}..)", hex::encode(&self.bytes[..4]))
    }
}

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_hex())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn content_hash_is_deterministic() {
        let h1 = ContentHash::of(b"photo bytes");
        let h2 = ContentHash::of(b"photo bytes");
        assert_eq!(h1, h2);
    }

    #[test]
    fn different_content_produces_different_hashes() {
        assert_ne!(ContentHash::of(b"a"), ContentHash::of(b"b"));
    }

    #[test]
    fn content_and_identity_domains_are_separated() {
        let content = ContentHash::of(b"acme");
        let identity = IdentityHash::of_name("acme");
        assert_ne!(content.as_bytes(), identity.as_bytes());
    }

    #[test]
    fn identity_hash_is_deterministic() {
        assert_eq!(IdentityHash::of_name("acme"), IdentityHash::of_name("acme"));
        assert_ne!(IdentityHash::of_name("acme"), IdentityHash::of_name("apex"));
    }

    #[test]
    fn ephemeral_identities_are_unique() {
        assert_ne!(IdentityHash::ephemeral(), IdentityHash::ephemeral());
    }

    #[test]
    fn content_hash_hex_roundtrip() {
        let h = ContentHash::of(b"roundtrip");
        let parsed = ContentHash::from_hex(&h.to_hex()).unwrap();
        assert_eq!(h, parsed);
    }

    #[test]
    fn tx_hash_hex_roundtrip() {
        let h = TxHash::from_raw([7u8; 32]);
        let parsed = TxHash::from_hex(&h.to_hex()).unwrap();
        assert_eq!(h, parsed);
    }

    #[test]
    fn hex_rejects_bad_length() {
        let err = ContentHash::from_hex("abcd").unwrap_err();
        assert_eq!(
            err,
            TypeError::InvalidLength {
                expected: 32,
                actual: 2
            }
        );
    }

    #[test]
    fn address_from_public_key_is_deterministic() {
        let a1 = Address::from_public_key(&[9u8; 32]);
        let a2 = Address::from_public_key(&[9u8; 32]);
        assert_eq!(a1, a2);
        assert_ne!(a1, Address::from_public_key(&[8u8; 32]));
    }

    #[test]
    fn address_hex_roundtrip_with_prefix() {
        let addr = Address::from_raw([0xab; 20]);
        let hex = addr.to_hex();
        assert!(hex.starts_with("0x"));
        assert_eq!(Address::from_hex(&hex).unwrap(), addr);
    }

    #[test]
    fn short_id_format() {
        let h = ContentHash::of(b"x");
        assert!(h.short_id().starts_with("media:"));
        assert_eq!(h.short_id().len(), 14); // "media:" + 8 hex chars
    }

    #[test]
    fn serde_roundtrip() {
        let h = ContentHash::of(b"serde");
        let json = serde_json::to_string(&h).unwrap();
        let parsed: ContentHash = serde_json::from_str(&json).unwrap();
        assert_eq!(h, parsed);
    }
}
