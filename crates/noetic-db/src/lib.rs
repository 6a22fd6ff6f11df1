//! # noetic-db
//!
//! PostgreSQL storage layer for noetic.
//!
//! This crate provides:
//! - Connection pool management
//! - Repository implementations for users, credentials, auth providers,
//!   API keys and knowledge entries
//! - A pgvector-backed [`VectorIndex`](noetic_core::VectorIndex)
//!
//! ## Example
//!
//! ```rust,ignore
//! use noetic_db::{Database, KnowledgeRepository, KnowledgeForm};
//!
//! let db = Database::connect("postgres://localhost/noetic").await?;
//! db.migrate().await?;
//! let entry = db.knowledge.insert(owner_id, KnowledgeForm {
//!     topic: "rust".into(),
//!     tags: vec!["async".into()],
//!     title: "Pinning".into(),
//!     content: "...".into(),
//! }).await?;
//! ```
pub mod api_keys;
pub mod auth_providers;
pub mod credentials;
pub mod knowledge;
pub mod pool;
pub mod users;
pub mod vector_index;

// Shared with the integration tests in tests/.
#[cfg(feature = "migrations")]
pub mod test_fixtures;

use std::sync::Arc;

// Re-export core types
pub use noetic_core::*;

pub use api_keys::PgApiKeyRepository;
pub use auth_providers::PgAuthProviderRepository;
pub use credentials::PgCredentialRepository;
pub use knowledge::PgKnowledgeRepository;
pub use pool::{connect_pool, PoolConfig};
pub use users::PgUserRepository;
pub use vector_index::PgVectorIndex;

/// Postgres SQLSTATE for unique_violation.
const UNIQUE_VIOLATION: &str = "23505";

/// Map a write failure, turning unique violations on known constraints into
/// [`Error::DuplicateField`].
pub(crate) fn map_write_error(err: sqlx::Error) -> Error {
    if let sqlx::Error::Database(db_err) = &err {
        if db_err.code().as_deref() == Some(UNIQUE_VIOLATION) {
            if let Some(field) = db_err.constraint().and_then(unique_field_for_constraint) {
                return Error::DuplicateField(field);
            }
        }
    }
    Error::Database(err)
}

/// Unique field guarded by a named constraint.
pub fn unique_field_for_constraint(constraint: &str) -> Option<UniqueField> {
    match constraint {
        "users_email_key" => Some(UniqueField::Email),
        "users_name_key" => Some(UniqueField::Name),
        "knowledge_title_key" => Some(UniqueField::Title),
        _ => None,
    }
}

/// Combined database context with all repositories.
///
/// Repositories are `Arc`ed so services can hold them as trait objects.
#[derive(Clone)]
pub struct Database {
    /// The underlying connection pool.
    pub pool: sqlx::Pool<sqlx::Postgres>,
    pub users: Arc<PgUserRepository>,
    pub credentials: Arc<PgCredentialRepository>,
    pub auth_providers: Arc<PgAuthProviderRepository>,
    pub api_keys: Arc<PgApiKeyRepository>,
    pub knowledge: Arc<PgKnowledgeRepository>,
    /// Vector index sharing the relational pool.
    pub vectors: Arc<PgVectorIndex>,
}

impl Database {
    /// Create a new Database instance from a connection pool.
    pub fn new(pool: sqlx::Pool<sqlx::Postgres>) -> Self {
        Self {
            users: Arc::new(PgUserRepository::new(pool.clone())),
            credentials: Arc::new(PgCredentialRepository::new(pool.clone())),
            auth_providers: Arc::new(PgAuthProviderRepository::new(pool.clone())),
            api_keys: Arc::new(PgApiKeyRepository::new(pool.clone())),
            knowledge: Arc::new(PgKnowledgeRepository::new(pool.clone())),
            vectors: Arc::new(PgVectorIndex::new(pool.clone())),
            pool,
        }
    }

    /// Create a new Database instance by connecting to the given URL.
    pub async fn connect(url: &str) -> Result<Self> {
        Self::connect_with_config(url, PoolConfig::default()).await
    }

    /// Create with custom pool configuration.
    pub async fn connect_with_config(url: &str, config: PoolConfig) -> Result<Self> {
        let pool = connect_pool(url, &config).await?;
        Ok(Self::new(pool))
    }

    /// Run pending migrations.
    #[cfg(feature = "migrations")]
    pub async fn migrate(&self) -> Result<()> {
        sqlx::migrate!("../../migrations")
            .run(&self.pool)
            .await
            .map_err(|e| Error::Database(sqlx::Error::Migrate(Box::new(e))))?;
        Ok(())
    }

    /// Get the underlying connection pool.
    pub fn pool(&self) -> &sqlx::Pool<sqlx::Postgres> {
        &self.pool
    }

    /// Close every pooled connection.
    pub async fn close(&self) {
        self.pool.close().await;
    }
}
