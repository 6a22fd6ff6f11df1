//! Structured logging schema and field name constants for noetic.
//!
//! All crates use these names for structured `tracing` fields so log
//! aggregation can query by the same keys across every subsystem.
//!
//! ## Log Level Contract
//!
//! | Level | Usage |
//! |-------|-------|
//! | ERROR | Upstream failure or failed rollback, stores may be inconsistent |
//! | WARN  | Compensation applied, or a non-fatal side effect failed |
//! | INFO  | Lifecycle events, completed writes, logins |
//! | DEBUG | Decision points, cache hits and misses |
//! | TRACE | Per-item iteration (search candidates) |

// ─── Identity fields ───────────────────────────────────────────────────────

/// Subsystem originating the log event.
/// Values: "api", "auth", "knowledge", "db", "cache", "inference", "crypto"
pub const SUBSYSTEM: &str = "subsystem";

/// Component within a subsystem.
/// Examples: "pool", "session_cache", "saga", "openai", "vector_index"
pub const COMPONENT: &str = "component";

/// Logical operation name.
/// Examples: "signup", "login", "create_knowledge", "search"
pub const OPERATION: &str = "op";

// ─── Entity fields ─────────────────────────────────────────────────────────

/// User UUID being operated on.
pub const USER_ID: &str = "user_id";

/// Knowledge UUID being operated on.
pub const KNOWLEDGE_ID: &str = "knowledge_id";

/// Vector index collection name.
pub const COLLECTION: &str = "collection";

/// Search query text.
pub const QUERY: &str = "query";

// ─── Measurement fields ────────────────────────────────────────────────────

/// Wall-clock duration in milliseconds.
pub const DURATION_MS: &str = "duration_ms";

/// Number of results returned by a search or query.
pub const RESULT_COUNT: &str = "result_count";

/// Number of input texts sent to an embedding model.
pub const INPUT_COUNT: &str = "input_count";

/// Failed-login attempts recorded for a user.
pub const FAILED_ATTEMPTS: &str = "failed_attempts";

// ─── Saga fields ───────────────────────────────────────────────────────────

/// Compensation step name.
pub const STEP: &str = "step";

// ─── Database fields ───────────────────────────────────────────────────────

/// Number of active connections in the pool.
pub const POOL_SIZE: &str = "pool_size";

/// Number of idle connections in the pool.
pub const POOL_IDLE: &str = "pool_idle";

// ─── Inference fields ──────────────────────────────────────────────────────

/// Model name used for embedding.
pub const MODEL: &str = "model";

// ─── Outcome fields ────────────────────────────────────────────────────────

/// Error message when an operation fails.
pub const ERROR_MSG: &str = "error";

/// Slow operation threshold exceeded.
pub const SLOW: &str = "slow";
