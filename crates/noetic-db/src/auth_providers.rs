//! Auth provider repository implementation.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{Pool, Postgres, Row};
use uuid::Uuid;

use noetic_core::{new_v7, AuthProviderRecord, AuthProviderRepository, ClientInfo, Error, Result};

/// PostgreSQL implementation of AuthProviderRepository.
pub struct PgAuthProviderRepository {
    pool: Pool<Postgres>,
}

impl PgAuthProviderRepository {
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }

    /// All provider records for a user.
    pub async fn list_for_user(&self, user_id: Uuid) -> Result<Vec<AuthProviderRecord>> {
        let rows = sqlx::query(
            "SELECT id, user_id, provider, provider_subject, last_login_at,
                    last_login_ip, last_login_user_agent, created_at
             FROM auth_providers WHERE user_id = $1
             ORDER BY created_at",
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await
        .map_err(Error::Database)?;

        Ok(rows
            .into_iter()
            .map(|row| AuthProviderRecord {
                id: row.get("id"),
                user_id: row.get("user_id"),
                provider: row.get("provider"),
                provider_subject: row.get("provider_subject"),
                last_login_at: row.get("last_login_at"),
                last_login_ip: row.get("last_login_ip"),
                last_login_user_agent: row.get("last_login_user_agent"),
                created_at: row.get("created_at"),
            })
            .collect())
    }
}

#[async_trait]
impl AuthProviderRepository for PgAuthProviderRepository {
    async fn insert(
        &self,
        user_id: Uuid,
        provider: &str,
        provider_subject: &str,
    ) -> Result<AuthProviderRecord> {
        let id = new_v7();
        let now = Utc::now();
        sqlx::query(
            "INSERT INTO auth_providers (id, user_id, provider, provider_subject, created_at)
             VALUES ($1, $2, $3, $4, $5)",
        )
        .bind(id)
        .bind(user_id)
        .bind(provider)
        .bind(provider_subject)
        .bind(now)
        .execute(&self.pool)
        .await
        .map_err(Error::Database)?;

        Ok(AuthProviderRecord {
            id,
            user_id,
            provider: provider.to_string(),
            provider_subject: provider_subject.to_string(),
            last_login_at: None,
            last_login_ip: None,
            last_login_user_agent: None,
            created_at: now,
        })
    }

    async fn record_login(
        &self,
        user_id: Uuid,
        provider: &str,
        at: DateTime<Utc>,
        client: &ClientInfo,
    ) -> Result<()> {
        sqlx::query(
            "UPDATE auth_providers
             SET last_login_at = $3, last_login_ip = $4, last_login_user_agent = $5
             WHERE user_id = $1 AND provider = $2",
        )
        .bind(user_id)
        .bind(provider)
        .bind(at)
        .bind(&client.address)
        .bind(&client.user_agent)
        .execute(&self.pool)
        .await
        .map_err(Error::Database)?;
        Ok(())
    }
}
