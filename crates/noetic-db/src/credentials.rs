//! Password credential repository implementation.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{Pool, Postgres, Row};
use uuid::Uuid;

use noetic_core::{Credential, CredentialRepository, Error, Result};

/// PostgreSQL implementation of CredentialRepository.
pub struct PgCredentialRepository {
    pool: Pool<Postgres>,
}

impl PgCredentialRepository {
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl CredentialRepository for PgCredentialRepository {
    async fn insert(&self, user_id: Uuid, password_hash: &str) -> Result<()> {
        sqlx::query(
            "INSERT INTO credentials (user_id, password_hash, is_active, password_changed_at)
             VALUES ($1, $2, TRUE, $3)",
        )
        .bind(user_id)
        .bind(password_hash)
        .bind(Utc::now())
        .execute(&self.pool)
        .await
        .map_err(Error::Database)?;
        Ok(())
    }

    async fn get_by_user_id(&self, user_id: Uuid) -> Result<Option<Credential>> {
        let row = sqlx::query(
            "SELECT user_id, password_hash, is_active, password_changed_at
             FROM credentials WHERE user_id = $1",
        )
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(Error::Database)?;

        Ok(row.map(|row| Credential {
            user_id: row.get("user_id"),
            password_hash: row.get("password_hash"),
            is_active: row.get("is_active"),
            password_changed_at: row.get("password_changed_at"),
        }))
    }

    async fn update_password(
        &self,
        user_id: Uuid,
        password_hash: &str,
        changed_at: DateTime<Utc>,
    ) -> Result<bool> {
        let result = sqlx::query(
            "UPDATE credentials SET password_hash = $2, password_changed_at = $3
             WHERE user_id = $1",
        )
        .bind(user_id)
        .bind(password_hash)
        .bind(changed_at)
        .execute(&self.pool)
        .await
        .map_err(Error::Database)?;

        Ok(result.rows_affected() > 0)
    }
}
