use serde::{Deserialize, Serialize};

use rialto_crypto::{Keychain, RecoveryPhrase, Signature};
use rialto_types::{Address, AssetLedgerId, TokenAmount};

use crate::error::{ChainError, ChainResult};

/// The fixed contract interface.
///
/// The deployed contract exposes exactly these operations; there is no
/// arbitrary-ABI generality, and extending the interface means adding a
/// variant here.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum ContractCall {
    /// Register an asset on the ledger at the given price.
    RegisterAsset { price: TokenAmount },
    /// Buy usage rights to a registered asset, paying `amount` to its owner.
    PurchaseRights {
        asset_id: AssetLedgerId,
        amount: TokenAmount,
    },
    /// Move tokens between accounts (funding grants and refunds).
    Transfer { to: Address, amount: TokenAmount },
}

impl ContractCall {
    /// Contract method name, used in logs and transaction hashing.
    pub fn method(&self) -> &'static str {
        match self {
            ContractCall::RegisterAsset { .. } => "register_asset",
            ContractCall::PurchaseRights { .. } => "purchase_rights",
            ContractCall::Transfer { .. } => "transfer",
        }
    }
}

/// A contract call bound to its sender and signed with the sender's key.
///
/// The nonce makes otherwise-identical calls hash to distinct transactions.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SignedCall {
    pub from: Address,
    pub public_key: [u8; 32],
    pub call: ContractCall,
    pub nonce: u64,
    pub signature: Signature,
}

impl SignedCall {
    /// The byte payload the signature covers.
    pub fn signing_payload(from: &Address, call: &ContractCall, nonce: u64) -> ChainResult<Vec<u8>> {
        serde_json::to_vec(&(from, call, nonce)).map_err(|e| ChainError::Serialization(e.to_string()))
    }

    /// Check the signature and that the sender address matches the key.
    pub fn verify(&self) -> ChainResult<()> {
        if Address::from_public_key(&self.public_key) != self.from {
            return Err(ChainError::InvalidSignature);
        }
        let payload = Self::signing_payload(&self.from, &self.call, self.nonce)?;
        Keychain::verify(&self.public_key, &payload, &self.signature)
            .map_err(|_| ChainError::InvalidSignature)
    }
}

/// Signs contract calls on behalf of one ledger account.
pub struct CallSigner {
    keychain: Keychain,
}

impl CallSigner {
    pub fn new(keychain: Keychain) -> Self {
        Self { keychain }
    }

    pub fn from_recovery(phrase: &RecoveryPhrase) -> Self {
        Self::new(Keychain::from_phrase(phrase))
    }

    /// Rebuild the signer from a stored recovery phrase.
    pub fn from_stored_phrase(phrase: &str) -> ChainResult<Self> {
        let keychain = Keychain::from_stored_phrase(phrase)
            .map_err(|e| ChainError::InvalidPhrase(e.to_string()))?;
        Ok(Self::new(keychain))
    }

    pub fn address(&self) -> Address {
        self.keychain.address()
    }

    /// Sign a call for submission.
    pub fn sign(&self, call: ContractCall, nonce: u64) -> ChainResult<SignedCall> {
        let from = self.keychain.address();
        let payload = SignedCall::signing_payload(&from, &call, nonce)?;
        Ok(SignedCall {
            from,
            public_key: self.keychain.public_key(),
            call,
            nonce,
            signature: self.keychain.sign(&payload),
        })
    }
}

impl std::fmt::Debug for CallSigner {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "CallSigner({})", self.address())
    }
}
