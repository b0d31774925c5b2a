use std::fmt;

use bip39::{Language, Mnemonic};
use rand::rngs::OsRng;
use rand::RngCore;

use crate::error::CryptoError;

/// Entropy bytes backing a generated phrase: 128 bits, twelve words.
const ENTROPY_BYTES: usize = 16;

/// BIP-39 recovery phrase backing a ledger account.
///
/// Generated from a cryptographically secure RNG at a fixed bit strength.
/// The phrase is the account's signing secret; `Debug` redacts it, and it is
/// only ever exposed through [`RecoveryPhrase::as_str`] for persistence
/// alongside the organization record.
#[derive(Clone, PartialEq, Eq)]
pub struct RecoveryPhrase {
    mnemonic: Mnemonic,
}

impl RecoveryPhrase {
    /// Generate a fresh twelve-word phrase from OS entropy.
    pub fn generate() -> Self {
        let mut entropy = [0u8; ENTROPY_BYTES];
        OsRng.fill_bytes(&mut entropy);
        let mnemonic = Mnemonic::from_entropy(&entropy)
            .expect("128-bit entropy is a valid BIP-39 strength");
        Self { mnemonic }
    }

    /// Parse a stored phrase.
    pub fn parse(phrase: &str) -> Result<Self, CryptoError> {
        let mnemonic = Mnemonic::parse_in_normalized(Language::English, phrase)
            .map_err(|e| CryptoError::InvalidPhrase(e.to_string()))?;
        Ok(Self { mnemonic })
    }

    /// The phrase words, space-separated.
    pub fn as_str(&self) -> String {
        self.mnemonic.to_string()
    }

    /// Derive the 64-byte seed for key derivation.
    pub fn to_seed(&self) -> [u8; 64] {
        self.mnemonic.to_seed("")
    }
}

impl fmt::Debug for RecoveryPhrase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "RecoveryPhrase(<redacted>)")
    }
}
