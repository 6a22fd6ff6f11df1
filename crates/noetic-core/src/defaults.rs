//! Centralized default constants for noetic.
//!
//! **This module is the single source of truth** for shared default values.
//! Configuration loaded from the environment falls back to these.

// =============================================================================
// AUTH
// =============================================================================

/// Access token lifetime in minutes (one day).
pub const ACCESS_TOKEN_EXPIRE_MINUTES: i64 = 60 * 24;

/// Refresh token binding lifetime in days.
pub const REFRESH_TOKEN_EXPIRE_DAYS: i64 = 14;

/// Consecutive failed logins before the account is locked.
pub const LOGIN_FAILED_LIMIT: i64 = 5;

/// Lockout window in minutes, measured from the first failure.
pub const LOGIN_LOCKED_MINUTES: i64 = 15;

/// Lifetime of email-verification and password-reset tokens in minutes.
pub const ONE_TIME_TOKEN_MINUTES: i64 = 10;

/// Minimum accepted password length.
pub const MIN_PASSWORD_LENGTH: usize = 8;

/// Random bytes in an opaque refresh token.
pub const REFRESH_TOKEN_BYTES: usize = 32;

/// Prefix of API access keys.
pub const API_ACCESS_KEY_PREFIX: &str = "nk_";

/// Random bytes behind an API access key.
pub const API_ACCESS_KEY_BYTES: usize = 16;

// =============================================================================
// CACHE KEYS
// =============================================================================

/// Prefix applied to every session cache key.
pub const CACHE_KEY_PREFIX: &str = "nt:";

/// Email verification token key prefix.
pub const EMAIL_VERIFY_PREFIX: &str = "email_verify:";

/// Password reset token key prefix.
pub const RESET_PASSWORD_PREFIX: &str = "reset_pw:";

/// Refresh token binding key prefix (keyed by user id).
pub const REFRESH_TOKEN_PREFIX: &str = "refresh_token:";

/// Failed-login counter key prefix (keyed by user id).
pub const LOGIN_FAIL_PREFIX: &str = "login_fail:";

// =============================================================================
// KNOWLEDGE / SEARCH
// =============================================================================

/// Vector index collection holding knowledge entries.
pub const KNOWLEDGE_COLLECTION: &str = "knowledge";

/// Default number of search results.
pub const SEARCH_LIMIT: i64 = 1;

/// Upper bound on search results per request.
pub const SEARCH_LIMIT_MAX: i64 = 50;

// =============================================================================
// EMBEDDING
// =============================================================================

/// Default OpenAI-compatible endpoint.
pub const OPENAI_URL: &str = "https://api.openai.com/v1";

/// Default embedding model name.
pub const EMBED_MODEL: &str = "text-embedding-3-small";

/// Default embedding vector dimension for text-embedding-3-small.
pub const EMBED_DIMENSION: usize = 1536;

/// Timeout for embedding requests (seconds).
pub const EMBED_TIMEOUT_SECS: u64 = 30;

// =============================================================================
// SERVER
// =============================================================================

/// Default HTTP server port.
pub const SERVER_PORT: u16 = 8000;

/// Default database URL.
pub const DATABASE_URL: &str = "postgres://localhost/noetic";

/// Default Redis URL.
pub const REDIS_URL: &str = "redis://localhost:6379/0";

/// Default frontend base URL used in emailed links.
pub const FRONTEND_URL: &str = "http://localhost:5173";
