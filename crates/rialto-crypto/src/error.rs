use thiserror::Error;

/// Errors from key and phrase operations.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum CryptoError {
    #[error("invalid recovery phrase: {0}")]
    InvalidPhrase(String),

    #[error("invalid signature")]
    InvalidSignature,
}
