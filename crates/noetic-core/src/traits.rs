//! Core traits for noetic abstractions.
//!
//! These traits define the interfaces that concrete implementations
//! must satisfy, enabling pluggable backends and testability.

use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::error::{Error, Result};
use crate::models::*;

// =============================================================================
// IDENTITY STORE TRAITS
// =============================================================================

/// Repository for canonical user records.
#[async_trait]
pub trait UserRepository: Send + Sync {
    /// Insert a new user. Unique violations map to `DuplicateField(Email | Name)`.
    async fn insert(&self, user: NewUser) -> Result<User>;

    /// Fetch a user by ID.
    async fn get(&self, id: Uuid) -> Result<Option<User>>;

    /// Fetch a user by email.
    async fn get_by_email(&self, email: &str) -> Result<Option<User>>;

    /// List all users, oldest first.
    async fn list(&self) -> Result<Vec<User>>;

    /// Set the verified flag and bump `updated_at`.
    async fn mark_verified(&self, id: Uuid) -> Result<Option<User>>;

    /// Delete a user. Owned credentials, providers and knowledge cascade.
    async fn delete(&self, id: Uuid) -> Result<bool>;
}

/// Repository for password credentials.
#[async_trait]
pub trait CredentialRepository: Send + Sync {
    /// Create the credential for a freshly registered user.
    async fn insert(&self, user_id: Uuid, password_hash: &str) -> Result<()>;

    /// Fetch the credential for a user.
    async fn get_by_user_id(&self, user_id: Uuid) -> Result<Option<Credential>>;

    /// Replace the password hash.
    async fn update_password(
        &self,
        user_id: Uuid,
        password_hash: &str,
        changed_at: DateTime<Utc>,
    ) -> Result<bool>;
}

/// Repository for auth provider records.
#[async_trait]
pub trait AuthProviderRepository: Send + Sync {
    /// Record a provider binding for a user.
    async fn insert(
        &self,
        user_id: Uuid,
        provider: &str,
        provider_subject: &str,
    ) -> Result<AuthProviderRecord>;

    /// Update last-login metadata for the user's provider record.
    async fn record_login(
        &self,
        user_id: Uuid,
        provider: &str,
        at: DateTime<Utc>,
        client: &ClientInfo,
    ) -> Result<()>;
}

/// Repository for user-owned API keys.
#[async_trait]
pub trait ApiKeyRepository: Send + Sync {
    /// Insert a new, active key.
    async fn insert(&self, key: NewApiKey) -> Result<ApiKey>;

    /// List a user's keys, newest first.
    async fn list(&self, user_id: Uuid) -> Result<Vec<ApiKey>>;

    /// Fetch a key by its public access key.
    async fn get_by_access_key(&self, access_key: &str) -> Result<Option<ApiKey>>;

    /// Enable or disable a key the user owns. `None` if no such key.
    async fn set_active(&self, user_id: Uuid, id: Uuid, is_active: bool)
        -> Result<Option<ApiKey>>;

    /// Delete a key the user owns. Returns false if no such key.
    async fn delete(&self, user_id: Uuid, id: Uuid) -> Result<bool>;

    /// Count one authenticated request against the key.
    async fn record_use(&self, id: Uuid, at: DateTime<Utc>) -> Result<()>;
}

// =============================================================================
// KNOWLEDGE STORE TRAITS
// =============================================================================

/// Repository for knowledge entries.
#[async_trait]
pub trait KnowledgeRepository: Send + Sync {
    /// Insert a new entry. A taken title maps to `DuplicateField(Title)`.
    async fn insert(&self, owner: Uuid, form: KnowledgeForm) -> Result<Knowledge>;

    /// Fetch an entry by ID.
    async fn get(&self, id: Uuid) -> Result<Option<Knowledge>>;

    /// Fetch an entry by its unique title.
    async fn get_by_title(&self, title: &str) -> Result<Option<Knowledge>>;

    /// List an owner's entries, newest first.
    async fn list(&self, owner: Uuid) -> Result<Vec<Knowledge>>;

    /// List an owner's entries with the given topic.
    async fn list_by_topic(&self, owner: Uuid, topic: &str) -> Result<Vec<Knowledge>>;

    /// List an owner's entries carrying the given tag.
    async fn list_by_tag(&self, owner: Uuid, tag: &str) -> Result<Vec<Knowledge>>;

    /// IDs of every entry owned by a user.
    async fn list_ids_by_owner(&self, owner: Uuid) -> Result<Vec<Uuid>>;

    /// Apply the present fields of `update` and bump `updated_at`.
    /// Returns `None` if the entry does not exist.
    async fn update(&self, id: Uuid, update: KnowledgeUpdate) -> Result<Option<Knowledge>>;

    /// Delete an entry. Returns false if it did not exist.
    async fn delete(&self, id: Uuid) -> Result<bool>;

    /// Re-insert a previously deleted entry with its original id and timestamps.
    async fn restore(&self, knowledge: &Knowledge) -> Result<Knowledge>;
}

// =============================================================================
// SESSION CACHE TRAITS
// =============================================================================

/// Key-value cache with per-key expiry.
#[async_trait]
pub trait SessionCache: Send + Sync {
    /// Store a value with a time-to-live, overwriting any previous value.
    async fn set_ex(&self, key: &str, value: &str, ttl: Duration) -> Result<()>;

    /// Fetch a value, `None` if absent or expired.
    async fn get(&self, key: &str) -> Result<Option<String>>;

    /// Delete a key. Deleting an absent key is not an error.
    async fn delete(&self, key: &str) -> Result<()>;

    /// Atomically increment an integer counter, arming `ttl` only when the
    /// increment created the key. Returns the new count.
    async fn incr_with_expiry(&self, key: &str, ttl: Duration) -> Result<i64>;
}

// =============================================================================
// INFERENCE TRAITS
// =============================================================================

/// Backend for generating embeddings.
#[async_trait]
pub trait EmbeddingBackend: Send + Sync {
    /// Generate embeddings for the given texts.
    ///
    /// Returns a vector of embedding vectors, one per input text.
    async fn embed_texts(&self, texts: &[String]) -> Result<Vec<Vector>>;

    /// Embed a single text.
    async fn embed(&self, text: &str) -> Result<Vector> {
        self.embed_texts(&[text.to_string()])
            .await?
            .into_iter()
            .next()
            .ok_or_else(|| Error::Embedding("Backend returned no embedding".to_string()))
    }

    /// Get the expected dimension of embedding vectors.
    fn dimension(&self) -> usize;

    /// Get the model name being used.
    fn model_name(&self) -> &str;
}

// =============================================================================
// VECTOR INDEX TRAITS
// =============================================================================

/// Nearest-neighbour index over embedding vectors.
#[async_trait]
pub trait VectorIndex: Send + Sync {
    /// Insert or replace points by id.
    async fn upsert(&self, collection: &str, points: Vec<VectorPoint>) -> Result<()>;

    /// Remove points by id. Missing ids are ignored.
    async fn delete(&self, collection: &str, ids: &[Uuid]) -> Result<()>;

    /// Return up to `limit` ids ranked nearest-first.
    async fn search(&self, collection: &str, vector: &Vector, limit: i64) -> Result<Vec<Uuid>>;
}

// =============================================================================
// NOTIFICATION TRAITS
// =============================================================================

/// Outbound notification channel (email delivery).
#[async_trait]
pub trait Notifier: Send + Sync {
    /// Deliver a message.
    async fn send(&self, message: EmailMessage) -> Result<()>;
}
