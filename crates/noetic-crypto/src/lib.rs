//! # noetic-crypto
//!
//! Credential and token primitives for noetic.
//!
//! - [`password`]: Argon2id password hashing with PHC-encoded output
//! - [`tokens`]: HS256 access tokens, opaque refresh tokens, one-time tokens,
//!   API key pairs
//!
//! Nothing here touches storage. Callers persist hashes and token digests.

pub mod error;
pub mod password;
pub mod tokens;

pub use error::{CryptoError, CryptoResult};
pub use password::{Argon2Hasher, HashParams};
pub use tokens::{
    generate_api_key_pair, generate_one_time_token, generate_refresh_token, hash_token,
    token_matches, AccessTokenIssuer,
};
