//! pgvector-backed vector index.
//!
//! Points live in `vector_point`, keyed by `(collection, id)`. Search ranks by
//! cosine distance (`<=>`), nearest first.

use std::time::Instant;

use async_trait::async_trait;
use chrono::Utc;
use pgvector::Vector;
use sqlx::{Pool, Postgres};
use tracing::{debug, instrument};
use uuid::Uuid;

use noetic_core::{Error, Result, VectorIndex, VectorPoint};

/// PostgreSQL + pgvector implementation of VectorIndex.
pub struct PgVectorIndex {
    pool: Pool<Postgres>,
}

impl PgVectorIndex {
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }

    /// Number of points stored in a collection.
    pub async fn count(&self, collection: &str) -> Result<i64> {
        sqlx::query_scalar("SELECT COUNT(*) FROM vector_point WHERE collection = $1")
            .bind(collection)
            .fetch_one(&self.pool)
            .await
            .map_err(index_error)
    }
}

/// Failures here are vector index errors, never relational ones.
fn index_error(err: sqlx::Error) -> Error {
    Error::VectorIndex(err.to_string())
}

#[async_trait]
impl VectorIndex for PgVectorIndex {
    #[instrument(skip(self, points), fields(subsystem = "vector", component = "pgvector", op = "upsert", input_count = points.len()))]
    async fn upsert(&self, collection: &str, points: Vec<VectorPoint>) -> Result<()> {
        if points.is_empty() {
            return Ok(());
        }

        let mut tx = self.pool.begin().await.map_err(index_error)?;
        let now = Utc::now();
        for point in points {
            sqlx::query(
                "INSERT INTO vector_point (collection, id, vector, text, metadata, updated_at)
                 VALUES ($1, $2, $3, $4, $5, $6)
                 ON CONFLICT (collection, id) DO UPDATE SET
                    vector = EXCLUDED.vector,
                    text = EXCLUDED.text,
                    metadata = EXCLUDED.metadata,
                    updated_at = EXCLUDED.updated_at",
            )
            .bind(collection)
            .bind(point.id)
            .bind(&point.vector)
            .bind(&point.text)
            .bind(&point.metadata)
            .bind(now)
            .execute(&mut *tx)
            .await
            .map_err(index_error)?;
        }
        tx.commit().await.map_err(index_error)?;
        Ok(())
    }

    #[instrument(skip(self, ids), fields(subsystem = "vector", component = "pgvector", op = "delete", input_count = ids.len()))]
    async fn delete(&self, collection: &str, ids: &[Uuid]) -> Result<()> {
        if ids.is_empty() {
            return Ok(());
        }

        sqlx::query("DELETE FROM vector_point WHERE collection = $1 AND id = ANY($2)")
            .bind(collection)
            .bind(ids)
            .execute(&self.pool)
            .await
            .map_err(index_error)?;
        Ok(())
    }

    #[instrument(skip(self, vector), fields(subsystem = "vector", component = "pgvector", op = "search"))]
    async fn search(&self, collection: &str, vector: &Vector, limit: i64) -> Result<Vec<Uuid>> {
        let start = Instant::now();
        let ids: Vec<Uuid> = sqlx::query_scalar(
            "SELECT id FROM vector_point
             WHERE collection = $1
             ORDER BY vector <=> $2::vector, id
             LIMIT $3",
        )
        .bind(collection)
        .bind(vector)
        .bind(limit.max(0))
        .fetch_all(&self.pool)
        .await
        .map_err(index_error)?;

        debug!(
            result_count = ids.len(),
            duration_ms = start.elapsed().as_millis() as u64,
            "Vector search complete"
        );
        Ok(ids)
    }
}
