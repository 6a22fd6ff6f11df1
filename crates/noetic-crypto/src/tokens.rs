//! Access, refresh and one-time token primitives.
//!
//! Access tokens are HS256 JWTs carrying [`AccessClaims`]. Refresh tokens are
//! opaque random strings; only their SHA-256 digest is ever persisted.

use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine};
use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use rand::RngCore;
use sha2::{Digest, Sha256};
use uuid::Uuid;

use noetic_core::defaults::{API_ACCESS_KEY_BYTES, API_ACCESS_KEY_PREFIX, REFRESH_TOKEN_BYTES};
use noetic_core::{AccessClaims, User};

use crate::error::{CryptoError, CryptoResult};

// =============================================================================
// ACCESS TOKENS
// =============================================================================

/// Issues and validates signed access tokens.
#[derive(Clone)]
pub struct AccessTokenIssuer {
    encoding: EncodingKey,
    decoding: DecodingKey,
    lifetime: Duration,
}

impl std::fmt::Debug for AccessTokenIssuer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AccessTokenIssuer")
            .field("lifetime", &self.lifetime)
            .finish_non_exhaustive()
    }
}

impl AccessTokenIssuer {
    /// Create an issuer signing with `secret`. Tokens live for `lifetime`.
    pub fn new(secret: &[u8], lifetime: Duration) -> Self {
        Self {
            encoding: EncodingKey::from_secret(secret),
            decoding: DecodingKey::from_secret(secret),
            lifetime,
        }
    }

    pub fn lifetime(&self) -> Duration {
        self.lifetime
    }

    /// Claims for `user`, valid from now for the configured lifetime.
    pub fn claims_for(&self, user: &User) -> AccessClaims {
        let now = Utc::now();
        AccessClaims {
            sub: user.id,
            email: user.email.clone(),
            role: user.role,
            iat: now.timestamp(),
            exp: (now + self.lifetime).timestamp(),
        }
    }

    /// Sign an access token for `user`.
    pub fn issue(&self, user: &User) -> CryptoResult<String> {
        self.encode(&self.claims_for(user))
    }

    /// Sign arbitrary claims.
    pub fn encode(&self, claims: &AccessClaims) -> CryptoResult<String> {
        encode(&Header::new(Algorithm::HS256), claims, &self.encoding)
            .map_err(|e| CryptoError::Encoding(e.to_string()))
    }

    /// Validate signature and expiry, returning the claims.
    pub fn decode(&self, token: &str) -> CryptoResult<AccessClaims> {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.leeway = 0;
        decode::<AccessClaims>(token, &self.decoding, &validation)
            .map(|data| data.claims)
            .map_err(|e| CryptoError::InvalidToken(e.to_string()))
    }
}

// =============================================================================
// OPAQUE TOKENS
// =============================================================================

/// Generate a URL-safe refresh token from 32 random bytes.
pub fn generate_refresh_token() -> String {
    let mut bytes = [0u8; REFRESH_TOKEN_BYTES];
    rand::thread_rng().fill_bytes(&mut bytes);
    URL_SAFE_NO_PAD.encode(bytes)
}

/// Generate a single-use token for email verification or password reset.
pub fn generate_one_time_token() -> String {
    Uuid::new_v4().to_string()
}

/// Generate an API key pair: a public access key and a secret shown once.
pub fn generate_api_key_pair() -> (String, String) {
    let mut bytes = [0u8; API_ACCESS_KEY_BYTES];
    rand::thread_rng().fill_bytes(&mut bytes);
    let access_key = format!("{}{}", API_ACCESS_KEY_PREFIX, hex::encode(bytes));
    (access_key, generate_refresh_token())
}

/// SHA-256 hex digest of a token, used as its stored form.
pub fn hash_token(token: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(token.as_bytes());
    hex::encode(hasher.finalize())
}

/// Compare a presented token with a stored digest.
pub fn token_matches(token: &str, stored_hash: &str) -> bool {
    let presented = hash_token(token);
    presented.len() == stored_hash.len()
        && presented
            .bytes()
            .zip(stored_hash.bytes())
            .fold(0u8, |acc, (a, b)| acc | (a ^ b))
            == 0
}
