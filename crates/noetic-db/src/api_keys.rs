//! API key repository implementation.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{postgres::PgRow, Pool, Postgres, Row};
use tracing::instrument;
use uuid::Uuid;

use noetic_core::{new_v7, ApiKey, ApiKeyRepository, Error, NewApiKey, Result};

const API_KEY_COLUMNS: &str = "id, user_id, name, access_key, secret_hash, total_requests, \
                               is_active, last_used_at, created_at";

/// PostgreSQL implementation of ApiKeyRepository.
pub struct PgApiKeyRepository {
    pool: Pool<Postgres>,
}

impl PgApiKeyRepository {
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }
}

fn api_key_from_row(row: &PgRow) -> ApiKey {
    ApiKey {
        id: row.get("id"),
        user_id: row.get("user_id"),
        name: row.get("name"),
        access_key: row.get("access_key"),
        secret_hash: row.get("secret_hash"),
        total_requests: row.get("total_requests"),
        is_active: row.get("is_active"),
        last_used_at: row.get("last_used_at"),
        created_at: row.get("created_at"),
    }
}

#[async_trait]
impl ApiKeyRepository for PgApiKeyRepository {
    #[instrument(skip(self, key), fields(subsystem = "database", component = "api_keys", op = "insert"))]
    async fn insert(&self, key: NewApiKey) -> Result<ApiKey> {
        let row = sqlx::query(&format!(
            "INSERT INTO api_keys (id, user_id, name, access_key, secret_hash, created_at)
             VALUES ($1, $2, $3, $4, $5, $6)
             RETURNING {API_KEY_COLUMNS}"
        ))
        .bind(new_v7())
        .bind(key.user_id)
        .bind(&key.name)
        .bind(&key.access_key)
        .bind(&key.secret_hash)
        .bind(Utc::now())
        .fetch_one(&self.pool)
        .await
        .map_err(Error::Database)?;

        Ok(api_key_from_row(&row))
    }

    async fn list(&self, user_id: Uuid) -> Result<Vec<ApiKey>> {
        let rows = sqlx::query(&format!(
            "SELECT {API_KEY_COLUMNS} FROM api_keys
             WHERE user_id = $1
             ORDER BY created_at DESC, id DESC"
        ))
        .bind(user_id)
        .fetch_all(&self.pool)
        .await
        .map_err(Error::Database)?;

        Ok(rows.iter().map(api_key_from_row).collect())
    }

    async fn get_by_access_key(&self, access_key: &str) -> Result<Option<ApiKey>> {
        let row = sqlx::query(&format!(
            "SELECT {API_KEY_COLUMNS} FROM api_keys WHERE access_key = $1"
        ))
        .bind(access_key)
        .fetch_optional(&self.pool)
        .await
        .map_err(Error::Database)?;

        Ok(row.as_ref().map(api_key_from_row))
    }

    #[instrument(skip(self), fields(subsystem = "database", component = "api_keys", op = "set_active"))]
    async fn set_active(
        &self,
        user_id: Uuid,
        id: Uuid,
        is_active: bool,
    ) -> Result<Option<ApiKey>> {
        let row = sqlx::query(&format!(
            "UPDATE api_keys SET is_active = $3
             WHERE id = $1 AND user_id = $2
             RETURNING {API_KEY_COLUMNS}"
        ))
        .bind(id)
        .bind(user_id)
        .bind(is_active)
        .fetch_optional(&self.pool)
        .await
        .map_err(Error::Database)?;

        Ok(row.as_ref().map(api_key_from_row))
    }

    #[instrument(skip(self), fields(subsystem = "database", component = "api_keys", op = "delete"))]
    async fn delete(&self, user_id: Uuid, id: Uuid) -> Result<bool> {
        let result = sqlx::query("DELETE FROM api_keys WHERE id = $1 AND user_id = $2")
            .bind(id)
            .bind(user_id)
            .execute(&self.pool)
            .await
            .map_err(Error::Database)?;

        Ok(result.rows_affected() > 0)
    }

    async fn record_use(&self, id: Uuid, at: DateTime<Utc>) -> Result<()> {
        sqlx::query(
            "UPDATE api_keys SET total_requests = total_requests + 1, last_used_at = $2
             WHERE id = $1",
        )
        .bind(id)
        .bind(at)
        .execute(&self.pool)
        .await
        .map_err(Error::Database)?;

        Ok(())
    }
}
