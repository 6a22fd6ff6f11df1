//! Error types for credential and token operations.

use thiserror::Error;

/// Credential and token errors.
#[derive(Error, Debug)]
pub enum CryptoError {
    /// Argon2 parameters rejected.
    #[error("Invalid hashing parameters: {0}")]
    InvalidParams(String),

    /// Password hashing failed.
    #[error("Password hashing failed: {0}")]
    Hashing(String),

    /// Stored hash is not a valid PHC string.
    #[error("Malformed password hash: {0}")]
    MalformedHash(String),

    /// Token signing failed.
    #[error("Token encoding failed: {0}")]
    Encoding(String),

    /// Token signature, format or expiry rejected.
    #[error("Invalid token: {0}")]
    InvalidToken(String),
}

/// Result type for credential and token operations.
pub type CryptoResult<T> = Result<T, CryptoError>;

impl From<CryptoError> for noetic_core::Error {
    fn from(err: CryptoError) -> Self {
        match err {
            CryptoError::InvalidToken(_) => noetic_core::Error::InvalidOrExpiredToken,
            CryptoError::Encoding(msg) => noetic_core::Error::Token(msg),
            other => noetic_core::Error::Hashing(other.to_string()),
        }
    }
}
