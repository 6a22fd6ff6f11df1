//! User repository implementation.

use async_trait::async_trait;
use chrono::Utc;
use sqlx::{postgres::PgRow, Pool, Postgres, Row};
use tracing::instrument;
use uuid::Uuid;

use noetic_core::{new_v7, Error, NewUser, Result, User, UserRepository, UserRole};

use crate::map_write_error;

const USER_COLUMNS: &str = "id, email, name, role, is_active, is_verified, created_at, updated_at";

/// PostgreSQL implementation of UserRepository.
pub struct PgUserRepository {
    pool: Pool<Postgres>,
}

impl PgUserRepository {
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }
}

pub(crate) fn user_from_row(row: &PgRow) -> Result<User> {
    let role: String = row.get("role");
    let role = role
        .parse::<UserRole>()
        .map_err(|e| Error::Internal(format!("Corrupt user row: {}", e)))?;
    Ok(User {
        id: row.get("id"),
        email: row.get("email"),
        name: row.get("name"),
        role,
        is_active: row.get("is_active"),
        is_verified: row.get("is_verified"),
        created_at: row.get("created_at"),
        updated_at: row.get("updated_at"),
    })
}

#[async_trait]
impl UserRepository for PgUserRepository {
    #[instrument(skip(self, user), fields(subsystem = "database", component = "users", op = "insert"))]
    async fn insert(&self, user: NewUser) -> Result<User> {
        let now = Utc::now();
        let row = sqlx::query(&format!(
            "INSERT INTO users (id, email, name, role, is_active, is_verified, created_at, updated_at)
             VALUES ($1, $2, $3, $4, TRUE, FALSE, $5, $5)
             RETURNING {USER_COLUMNS}"
        ))
        .bind(new_v7())
        .bind(&user.email)
        .bind(&user.name)
        .bind(user.role.to_string())
        .bind(now)
        .fetch_one(&self.pool)
        .await
        .map_err(map_write_error)?;

        user_from_row(&row)
    }

    async fn get(&self, id: Uuid) -> Result<Option<User>> {
        let row = sqlx::query(&format!("SELECT {USER_COLUMNS} FROM users WHERE id = $1"))
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(Error::Database)?;

        row.as_ref().map(user_from_row).transpose()
    }

    async fn get_by_email(&self, email: &str) -> Result<Option<User>> {
        let row = sqlx::query(&format!("SELECT {USER_COLUMNS} FROM users WHERE email = $1"))
            .bind(email)
            .fetch_optional(&self.pool)
            .await
            .map_err(Error::Database)?;

        row.as_ref().map(user_from_row).transpose()
    }

    async fn list(&self) -> Result<Vec<User>> {
        let rows = sqlx::query(&format!(
            "SELECT {USER_COLUMNS} FROM users ORDER BY created_at ASC, id ASC"
        ))
        .fetch_all(&self.pool)
        .await
        .map_err(Error::Database)?;

        rows.iter().map(user_from_row).collect()
    }

    async fn mark_verified(&self, id: Uuid) -> Result<Option<User>> {
        let row = sqlx::query(&format!(
            "UPDATE users SET is_verified = TRUE, updated_at = $2
             WHERE id = $1
             RETURNING {USER_COLUMNS}"
        ))
        .bind(id)
        .bind(Utc::now())
        .fetch_optional(&self.pool)
        .await
        .map_err(Error::Database)?;

        row.as_ref().map(user_from_row).transpose()
    }

    #[instrument(skip(self), fields(subsystem = "database", component = "users", op = "delete"))]
    async fn delete(&self, id: Uuid) -> Result<bool> {
        let result = sqlx::query("DELETE FROM users WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(Error::Database)?;

        Ok(result.rows_affected() > 0)
    }
}
