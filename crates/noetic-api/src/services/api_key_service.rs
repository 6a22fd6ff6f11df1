//! API key management and key-pair authentication.
//!
//! A key pair is an access key (public, stored as is) and a secret (shown
//! once at creation, stored as a SHA-256 digest). Requests presenting a
//! valid pair act as the key's owner.

use std::sync::Arc;

use chrono::Utc;
use tracing::{info, instrument, warn};
use uuid::Uuid;

use noetic_core::{
    AccessClaims, ApiKey, ApiKeyCreated, ApiKeyRepository, Error, NewApiKey, Result,
    UserRepository,
};
use noetic_crypto::{generate_api_key_pair, hash_token, token_matches, AccessTokenIssuer};

/// Longest accepted key name, in characters.
const MAX_NAME_LENGTH: usize = 100;

fn not_found(id: Uuid) -> Error {
    Error::NotFound(format!("API key {} not found", id))
}

#[derive(Clone)]
pub struct ApiKeyService {
    keys: Arc<dyn ApiKeyRepository>,
    users: Arc<dyn UserRepository>,
    tokens: AccessTokenIssuer,
}

impl ApiKeyService {
    pub fn new(
        keys: Arc<dyn ApiKeyRepository>,
        users: Arc<dyn UserRepository>,
        tokens: AccessTokenIssuer,
    ) -> Self {
        Self {
            keys,
            users,
            tokens,
        }
    }

    /// Create a key for `user_id`. The returned secret is not recoverable later.
    #[instrument(skip(self, name), fields(subsystem = "api_keys", op = "create_api_key", user_id = %user_id))]
    pub async fn create(&self, user_id: Uuid, name: &str) -> Result<ApiKeyCreated> {
        let name = name.trim();
        if name.is_empty() {
            return Err(Error::InvalidInput("name must not be empty".to_string()));
        }
        if name.chars().count() > MAX_NAME_LENGTH {
            return Err(Error::InvalidInput(format!(
                "name must be at most {} characters",
                MAX_NAME_LENGTH
            )));
        }

        let (access_key, secret_key) = generate_api_key_pair();
        let key = self
            .keys
            .insert(NewApiKey {
                user_id,
                name: name.to_string(),
                access_key,
                secret_hash: hash_token(&secret_key),
            })
            .await?;

        info!(api_key_id = %key.id, "API key created");
        Ok(ApiKeyCreated::new(key, secret_key))
    }

    /// The user's keys, newest first.
    pub async fn list(&self, user_id: Uuid) -> Result<Vec<ApiKey>> {
        self.keys.list(user_id).await
    }

    #[instrument(skip(self), fields(subsystem = "api_keys", op = "set_api_key_active", user_id = %user_id))]
    pub async fn set_active(&self, user_id: Uuid, id: Uuid, is_active: bool) -> Result<ApiKey> {
        let key = self
            .keys
            .set_active(user_id, id, is_active)
            .await?
            .ok_or_else(|| not_found(id))?;
        info!(api_key_id = %id, is_active, "API key toggled");
        Ok(key)
    }

    #[instrument(skip(self), fields(subsystem = "api_keys", op = "delete_api_key", user_id = %user_id))]
    pub async fn delete(&self, user_id: Uuid, id: Uuid) -> Result<()> {
        if !self.keys.delete(user_id, id).await? {
            return Err(not_found(id));
        }
        info!(api_key_id = %id, "API key deleted");
        Ok(())
    }

    /// Resolve a key pair to its owner's claims and count the request.
    ///
    /// Unknown keys and wrong secrets are indistinguishable. Usage
    /// accounting is best effort.
    #[instrument(skip_all, fields(subsystem = "api_keys", op = "authenticate_api_key"))]
    pub async fn authenticate(&self, access_key: &str, secret_key: &str) -> Result<AccessClaims> {
        let key = self
            .keys
            .get_by_access_key(access_key)
            .await?
            .filter(|key| token_matches(secret_key, &key.secret_hash))
            .ok_or(Error::InvalidCredentials)?;
        if !key.is_active {
            return Err(Error::Unauthorized("API key is disabled".to_string()));
        }

        let user = self
            .users
            .get(key.user_id)
            .await?
            .filter(|user| user.is_active)
            .ok_or(Error::InvalidCredentials)?;

        if let Err(e) = self.keys.record_use(key.id, Utc::now()).await {
            warn!(api_key_id = %key.id, error = %e, "Failed to record API key use");
        }
        Ok(self.tokens.claims_for(&user))
    }
}
