//! Knowledge repository implementation.

use async_trait::async_trait;
use chrono::Utc;
use sqlx::{postgres::PgRow, Pool, Postgres, Row};
use tracing::instrument;
use uuid::Uuid;

use noetic_core::{
    new_v7, Error, Knowledge, KnowledgeForm, KnowledgeRepository, KnowledgeUpdate, Result,
};

use crate::map_write_error;

const KNOWLEDGE_COLUMNS: &str = "id, user_id, topic, tags, title, content, created_at, updated_at";

/// PostgreSQL implementation of KnowledgeRepository.
pub struct PgKnowledgeRepository {
    pool: Pool<Postgres>,
}

impl PgKnowledgeRepository {
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }

    async fn fetch_many(&self, sql: &str, owner: Uuid, arg: Option<&str>) -> Result<Vec<Knowledge>> {
        let mut query = sqlx::query(sql).bind(owner);
        if let Some(arg) = arg {
            query = query.bind(arg);
        }
        let rows = query
            .fetch_all(&self.pool)
            .await
            .map_err(Error::Database)?;
        Ok(rows.iter().map(knowledge_from_row).collect())
    }
}

fn knowledge_from_row(row: &PgRow) -> Knowledge {
    Knowledge {
        id: row.get("id"),
        user_id: row.get("user_id"),
        topic: row.get("topic"),
        tags: row.get("tags"),
        title: row.get("title"),
        content: row.get("content"),
        created_at: row.get("created_at"),
        updated_at: row.get("updated_at"),
    }
}

#[async_trait]
impl KnowledgeRepository for PgKnowledgeRepository {
    #[instrument(skip(self, form), fields(subsystem = "database", component = "knowledge", op = "insert", user_id = %owner))]
    async fn insert(&self, owner: Uuid, form: KnowledgeForm) -> Result<Knowledge> {
        let now = Utc::now();
        let row = sqlx::query(&format!(
            "INSERT INTO knowledge (id, user_id, topic, tags, title, content, created_at, updated_at)
             VALUES ($1, $2, $3, $4, $5, $6, $7, $7)
             RETURNING {KNOWLEDGE_COLUMNS}"
        ))
        .bind(new_v7())
        .bind(owner)
        .bind(&form.topic)
        .bind(&form.tags)
        .bind(&form.title)
        .bind(&form.content)
        .bind(now)
        .fetch_one(&self.pool)
        .await
        .map_err(map_write_error)?;

        Ok(knowledge_from_row(&row))
    }

    async fn get(&self, id: Uuid) -> Result<Option<Knowledge>> {
        let row = sqlx::query(&format!("SELECT {KNOWLEDGE_COLUMNS} FROM knowledge WHERE id = $1"))
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(Error::Database)?;

        Ok(row.as_ref().map(knowledge_from_row))
    }

    async fn get_by_title(&self, title: &str) -> Result<Option<Knowledge>> {
        let row = sqlx::query(&format!(
            "SELECT {KNOWLEDGE_COLUMNS} FROM knowledge WHERE title = $1"
        ))
        .bind(title)
        .fetch_optional(&self.pool)
        .await
        .map_err(Error::Database)?;

        Ok(row.as_ref().map(knowledge_from_row))
    }

    async fn list(&self, owner: Uuid) -> Result<Vec<Knowledge>> {
        let sql = format!(
            "SELECT {KNOWLEDGE_COLUMNS} FROM knowledge
             WHERE user_id = $1
             ORDER BY created_at DESC, id DESC"
        );
        self.fetch_many(&sql, owner, None).await
    }

    async fn list_by_topic(&self, owner: Uuid, topic: &str) -> Result<Vec<Knowledge>> {
        let sql = format!(
            "SELECT {KNOWLEDGE_COLUMNS} FROM knowledge
             WHERE user_id = $1 AND topic = $2
             ORDER BY created_at DESC, id DESC"
        );
        self.fetch_many(&sql, owner, Some(topic)).await
    }

    async fn list_by_tag(&self, owner: Uuid, tag: &str) -> Result<Vec<Knowledge>> {
        let sql = format!(
            "SELECT {KNOWLEDGE_COLUMNS} FROM knowledge
             WHERE user_id = $1 AND $2 = ANY(tags)
             ORDER BY created_at DESC, id DESC"
        );
        self.fetch_many(&sql, owner, Some(tag)).await
    }

    async fn list_ids_by_owner(&self, owner: Uuid) -> Result<Vec<Uuid>> {
        sqlx::query_scalar("SELECT id FROM knowledge WHERE user_id = $1")
            .bind(owner)
            .fetch_all(&self.pool)
            .await
            .map_err(Error::Database)
    }

    #[instrument(skip(self, update), fields(subsystem = "database", component = "knowledge", op = "update", knowledge_id = %id))]
    async fn update(&self, id: Uuid, update: KnowledgeUpdate) -> Result<Option<Knowledge>> {
        // COALESCE keeps the stored value for every absent field.
        let row = sqlx::query(&format!(
            "UPDATE knowledge SET
                topic = COALESCE($2, topic),
                tags = COALESCE($3, tags),
                title = COALESCE($4, title),
                content = COALESCE($5, content),
                updated_at = $6
             WHERE id = $1
             RETURNING {KNOWLEDGE_COLUMNS}"
        ))
        .bind(id)
        .bind(&update.topic)
        .bind(&update.tags)
        .bind(&update.title)
        .bind(&update.content)
        .bind(Utc::now())
        .fetch_optional(&self.pool)
        .await
        .map_err(map_write_error)?;

        Ok(row.as_ref().map(knowledge_from_row))
    }

    #[instrument(skip(self), fields(subsystem = "database", component = "knowledge", op = "delete", knowledge_id = %id))]
    async fn delete(&self, id: Uuid) -> Result<bool> {
        let result = sqlx::query("DELETE FROM knowledge WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(Error::Database)?;

        Ok(result.rows_affected() > 0)
    }

    #[instrument(skip(self, knowledge), fields(subsystem = "database", component = "knowledge", op = "restore", knowledge_id = %knowledge.id))]
    async fn restore(&self, knowledge: &Knowledge) -> Result<Knowledge> {
        let row = sqlx::query(&format!(
            "INSERT INTO knowledge (id, user_id, topic, tags, title, content, created_at, updated_at)
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
             RETURNING {KNOWLEDGE_COLUMNS}"
        ))
        .bind(knowledge.id)
        .bind(knowledge.user_id)
        .bind(&knowledge.topic)
        .bind(&knowledge.tags)
        .bind(&knowledge.title)
        .bind(&knowledge.content)
        .bind(knowledge.created_at)
        .bind(knowledge.updated_at)
        .fetch_one(&self.pool)
        .await
        .map_err(map_write_error)?;

        Ok(knowledge_from_row(&row))
    }
}
