//! Password hashing using Argon2id.
//!
//! Hashes are stored as PHC strings, so verification reads the parameters
//! back out of the hash and keeps working after the defaults change.

use argon2::{
    password_hash::{PasswordHash, PasswordHasher as _, PasswordVerifier, SaltString},
    Algorithm, Argon2, Params, Version,
};
use rand::rngs::OsRng;
use serde::{Deserialize, Serialize};

use crate::error::{CryptoError, CryptoResult};

/// Argon2id parameters.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct HashParams {
    /// Memory in KiB (default: 19456 = 19 MiB).
    pub memory_kib: u32,
    /// Time iterations (default: 2).
    pub iterations: u32,
    /// Parallelism degree (default: 1).
    pub parallelism: u32,
}

impl Default for HashParams {
    fn default() -> Self {
        Self {
            memory_kib: 19456,
            iterations: 2,
            parallelism: 1,
        }
    }
}

impl HashParams {
    /// Minimal-cost parameters for tests. Never use in production.
    pub fn insecure_fast() -> Self {
        Self {
            memory_kib: 1024,
            iterations: 1,
            parallelism: 1,
        }
    }
}

/// Argon2id password hasher.
#[derive(Debug, Clone, Default)]
pub struct Argon2Hasher {
    params: HashParams,
}

impl Argon2Hasher {
    pub fn new(params: HashParams) -> Self {
        Self { params }
    }

    pub fn params(&self) -> &HashParams {
        &self.params
    }

    fn argon2(&self) -> CryptoResult<Argon2<'static>> {
        let params = Params::new(
            self.params.memory_kib,
            self.params.iterations,
            self.params.parallelism,
            None,
        )
        .map_err(|e| CryptoError::InvalidParams(e.to_string()))?;
        Ok(Argon2::new(Algorithm::Argon2id, Version::V0x13, params))
    }

    /// Hash a password with a fresh random salt.
    ///
    /// CPU-bound: call from a blocking thread.
    pub fn hash(&self, password: &str) -> CryptoResult<String> {
        let salt = SaltString::generate(&mut OsRng);
        let hash = self
            .argon2()?
            .hash_password(password.as_bytes(), &salt)
            .map_err(|e| CryptoError::Hashing(e.to_string()))?;
        Ok(hash.to_string())
    }

    /// Verify a password against a stored PHC hash.
    ///
    /// Returns `Ok(false)` on mismatch; errors only for malformed hashes.
    pub fn verify(&self, password: &str, hash: &str) -> CryptoResult<bool> {
        let parsed = PasswordHash::new(hash).map_err(|e| CryptoError::MalformedHash(e.to_string()))?;
        Ok(Argon2::default()
            .verify_password(password.as_bytes(), &parsed)
            .is_ok())
    }
}
