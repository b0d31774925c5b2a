use serde::{Deserialize, Serialize};

use rialto_types::Address;

use crate::error::CryptoError;
use crate::phrase::RecoveryPhrase;

/// Ed25519 signature over a submitted call.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Signature(#[serde(with = "signature_serde")] ed25519_dalek::Signature);

/// Signing key and ledger address derived from a recovery phrase.
///
/// Derivation is deterministic: the same phrase always yields the same key
/// and address, which is what makes the phrase sufficient to recover the
/// account.
pub struct Keychain {
    signing: ed25519_dalek::SigningKey,
}

impl Keychain {
    /// Derive the keychain from a recovery phrase.
    pub fn from_phrase(phrase: &RecoveryPhrase) -> Self {
        let seed = phrase.to_seed();
        let mut secret = [0u8; 32];
        secret.copy_from_slice(&seed[..32]);
        Self {
            signing: ed25519_dalek::SigningKey::from_bytes(&secret),
        }
    }

    /// Parse a stored phrase and derive its keychain.
    pub fn from_stored_phrase(phrase: &str) -> Result<Self, CryptoError> {
        Ok(Self::from_phrase(&RecoveryPhrase::parse(phrase)?))
    }

    /// The ledger address for this key.
    pub fn address(&self) -> Address {
        Address::from_public_key(&self.signing.verifying_key().to_bytes())
    }

    /// Raw public key bytes.
    pub fn public_key(&self) -> [u8; 32] {
        self.signing.verifying_key().to_bytes()
    }

    /// Sign a message.
    pub fn sign(&self, message: &[u8]) -> Signature {
        use ed25519_dalek::Signer;
        Signature(self.signing.sign(message))
    }

    /// Verify a signature against a public key.
    pub fn verify(
        public_key: &[u8; 32],
        message: &[u8],
        signature: &Signature,
    ) -> Result<(), CryptoError> {
        use ed25519_dalek::Verifier;
        let key = ed25519_dalek::VerifyingKey::from_bytes(public_key)
            .map_err(|_| CryptoError::InvalidSignature)?;
        key.verify(message, &signature.0)
            .map_err(|_| CryptoError::InvalidSignature)
    }
}

impl std::fmt::Debug for Keychain {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Keychain({})", self.address())
    }
}

impl std::fmt::Debug for Signature {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Signature({}...)", hex::encode(&self.0.to_bytes()[..8]))
    }
}

mod signature_serde {
    use serde::{self, Deserialize, Deserializer, Serializer};

    pub fn serialize<S>(sig: &ed25519_dalek::Signature, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_bytes(&sig.to_bytes())
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<ed25519_dalek::Signature, D::Error>
    where
        D: Deserializer<'de>,
    {
        let bytes: Vec<u8> = Vec::deserialize(deserializer)?;
        let arr: [u8; 64] = bytes
            .try_into()
            .map_err(|_| serde::de::Error::custom("expected 64-byte signature"))?;
        Ok(ed25519_dalek::Signature::from_bytes(&arr))
    }
}
