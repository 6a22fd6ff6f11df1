//! Knowledge orchestration across the relational store and the vector index.
//!
//! Every write touches both stores. Relational writes go first; the index
//! write follows, and a failure there is repaired by a compensating write
//! on the relational side (see [`Saga`]).

use std::sync::Arc;
use std::time::Instant;

use futures::FutureExt;
use tracing::{debug, info, instrument, trace, warn};
use uuid::Uuid;

use noetic_core::defaults::{KNOWLEDGE_COLLECTION, SEARCH_LIMIT_MAX};
use noetic_core::{
    AccessClaims, EmbeddingBackend, Error, Knowledge, KnowledgeForm, KnowledgeRepository,
    KnowledgeUpdate, Result, SearchRequest, UserRole, VectorIndex, VectorPoint,
};

use super::saga::Saga;

/// Knowledge orchestrator.
#[derive(Clone)]
pub struct KnowledgeService {
    repo: Arc<dyn KnowledgeRepository>,
    embedder: Arc<dyn EmbeddingBackend>,
    index: Arc<dyn VectorIndex>,
    collection: String,
}

fn require_non_empty(field: &str, value: &str) -> Result<()> {
    if value.trim().is_empty() {
        return Err(Error::InvalidInput(format!("{} must not be empty", field)));
    }
    Ok(())
}

fn validate_form(form: &KnowledgeForm) -> Result<()> {
    require_non_empty("title", &form.title)?;
    require_non_empty("topic", &form.topic)?;
    require_non_empty("content", &form.content)
}

fn validate_update(update: &KnowledgeUpdate) -> Result<()> {
    if update.is_empty() {
        return Err(Error::InvalidInput("No fields to update".to_string()));
    }
    if let Some(title) = &update.title {
        require_non_empty("title", title)?;
    }
    if let Some(topic) = &update.topic {
        require_non_empty("topic", topic)?;
    }
    if let Some(content) = &update.content {
        require_non_empty("content", content)?;
    }
    Ok(())
}

impl KnowledgeService {
    pub fn new(
        repo: Arc<dyn KnowledgeRepository>,
        embedder: Arc<dyn EmbeddingBackend>,
        index: Arc<dyn VectorIndex>,
    ) -> Self {
        Self {
            repo,
            embedder,
            index,
            collection: KNOWLEDGE_COLLECTION.to_string(),
        }
    }

    /// Use a different vector index collection.
    pub fn with_collection(mut self, collection: impl Into<String>) -> Self {
        self.collection = collection.into();
        self
    }

    pub fn collection(&self) -> &str {
        &self.collection
    }

    /// Embed the entry's content and write its point to the index.
    async fn index_entry(&self, knowledge: &Knowledge) -> Result<()> {
        let vector = self.embedder.embed(&knowledge.content).await?;
        let point = VectorPoint {
            id: knowledge.id,
            vector,
            text: knowledge.searchable_text(),
            metadata: knowledge.index_metadata(),
        };
        self.index.upsert(&self.collection, vec![point]).await
    }

    // =========================================================================
    // WRITES
    // =========================================================================

    /// Store a new entry and index it.
    #[instrument(skip(self, form), fields(subsystem = "knowledge", op = "create_knowledge", user_id = %owner))]
    pub async fn create(&self, owner: Uuid, form: KnowledgeForm) -> Result<Knowledge> {
        validate_form(&form)?;
        let start = Instant::now();

        let knowledge = self.repo.insert(owner, form).await?;

        let mut saga = Saga::new("create_knowledge");
        let repo = self.repo.clone();
        let id = knowledge.id;
        saga.on_failure("delete_row", move || {
            async move { repo.delete(id).await.map(|_| ()) }.boxed()
        });

        if let Err(e) = self.index_entry(&knowledge).await {
            return Err(saga.abort(e).await);
        }
        saga.commit();

        info!(
            knowledge_id = %knowledge.id,
            duration_ms = start.elapsed().as_millis() as u64,
            "Knowledge created"
        );
        Ok(knowledge)
    }

    /// Apply a partial update and re-index the entry.
    #[instrument(skip(self, update), fields(subsystem = "knowledge", op = "update_knowledge", knowledge_id = %id))]
    pub async fn update(&self, id: Uuid, update: KnowledgeUpdate) -> Result<Knowledge> {
        validate_update(&update)?;

        let snapshot = self
            .repo
            .get(id)
            .await?
            .ok_or_else(|| Error::NotFound(format!("Knowledge {} not found", id)))?;

        let updated = self
            .repo
            .update(id, update)
            .await?
            .ok_or_else(|| Error::NotFound(format!("Knowledge {} not found", id)))?;

        let mut saga = Saga::new("update_knowledge");
        let repo = self.repo.clone();
        let previous = KnowledgeUpdate::from(&snapshot);
        saga.on_failure("revert_row", move || {
            async move { repo.update(id, previous).await.map(|_| ()) }.boxed()
        });

        if let Err(e) = self.index_entry(&updated).await {
            return Err(saga.abort(e).await);
        }
        saga.commit();

        info!(knowledge_id = %id, "Knowledge updated");
        Ok(updated)
    }

    /// Remove an entry from both stores.
    #[instrument(skip(self), fields(subsystem = "knowledge", op = "delete_knowledge", knowledge_id = %id))]
    pub async fn delete(&self, id: Uuid) -> Result<bool> {
        let snapshot = self
            .repo
            .get(id)
            .await?
            .ok_or_else(|| Error::NotFound(format!("Knowledge {} not found", id)))?;

        if !self.repo.delete(id).await? {
            return Err(Error::NotFound(format!("Knowledge {} not found", id)));
        }

        let mut saga = Saga::new("delete_knowledge");
        let repo = self.repo.clone();
        saga.on_failure("restore_row", move || {
            async move { repo.restore(&snapshot).await.map(|_| ()) }.boxed()
        });

        if let Err(e) = self.index.delete(&self.collection, &[id]).await {
            return Err(saga.abort(e).await);
        }
        saga.commit();

        info!(knowledge_id = %id, "Knowledge deleted");
        Ok(true)
    }

    // =========================================================================
    // SEARCH
    // =========================================================================

    /// Semantic search. Results follow the index's ranking; filters only
    /// decide inclusion.
    #[instrument(skip(self, request), fields(subsystem = "knowledge", op = "search", result_count))]
    pub async fn search(&self, request: SearchRequest) -> Result<Vec<Knowledge>> {
        let query = request.query.trim();
        if query.is_empty() {
            return Err(Error::InvalidInput("Query must not be empty".to_string()));
        }
        let limit = request.limit.clamp(1, SEARCH_LIMIT_MAX);
        let start = Instant::now();

        let vector = self.embedder.embed(query).await?;
        let ids = self.index.search(&self.collection, &vector, limit).await?;

        let mut results = Vec::with_capacity(ids.len());
        for id in ids {
            let knowledge = match self.repo.get(id).await {
                Ok(Some(k)) => k,
                Ok(None) => {
                    debug!(knowledge_id = %id, "Skipping stale index entry");
                    continue;
                }
                Err(e) => {
                    warn!(knowledge_id = %id, error = %e, "Failed to load search hit, skipping");
                    continue;
                }
            };
            if let Some(topic) = &request.topic {
                if &knowledge.topic != topic {
                    trace!(knowledge_id = %id, "Filtered by topic");
                    continue;
                }
            }
            if let Some(tag) = &request.tag {
                if !knowledge.has_tag(tag) {
                    trace!(knowledge_id = %id, "Filtered by tag");
                    continue;
                }
            }
            results.push(knowledge);
        }

        tracing::Span::current().record("result_count", results.len() as u64);
        debug!(
            limit,
            duration_ms = start.elapsed().as_millis() as u64,
            "Search complete"
        );
        Ok(results)
    }

    // =========================================================================
    // READS
    // =========================================================================

    pub async fn get(&self, id: Uuid) -> Result<Knowledge> {
        self.repo
            .get(id)
            .await?
            .ok_or_else(|| Error::NotFound(format!("Knowledge {} not found", id)))
    }

    /// Fetch an entry the caller may modify: its owner or an admin.
    pub async fn get_owned(&self, id: Uuid, caller: &AccessClaims) -> Result<Knowledge> {
        let knowledge = self.get(id).await?;
        if knowledge.user_id != caller.sub && caller.role != UserRole::Admin {
            return Err(Error::Forbidden(
                "Knowledge belongs to another user".to_string(),
            ));
        }
        Ok(knowledge)
    }

    pub async fn get_by_title(&self, title: &str) -> Result<Knowledge> {
        self.repo
            .get_by_title(title)
            .await?
            .ok_or_else(|| Error::NotFound(format!("Knowledge titled '{}' not found", title)))
    }

    pub async fn list(&self, owner: Uuid) -> Result<Vec<Knowledge>> {
        self.repo.list(owner).await
    }

    pub async fn list_by_topic(&self, owner: Uuid, topic: &str) -> Result<Vec<Knowledge>> {
        self.repo.list_by_topic(owner, topic).await
    }

    pub async fn list_by_tag(&self, owner: Uuid, tag: &str) -> Result<Vec<Knowledge>> {
        self.repo.list_by_tag(owner, tag).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn form(title: &str, topic: &str, content: &str) -> KnowledgeForm {
        KnowledgeForm {
            topic: topic.to_string(),
            tags: vec![],
            title: title.to_string(),
            content: content.to_string(),
        }
    }

    #[test]
    fn test_validate_form_rejects_blank_fields() {
        assert!(validate_form(&form("t", "rust", "body")).is_ok());
        assert!(matches!(
            validate_form(&form("  ", "rust", "body")),
            Err(Error::InvalidInput(m)) if m.contains("title")
        ));
        assert!(validate_form(&form("t", "", "body")).is_err());
        assert!(validate_form(&form("t", "rust", "\n")).is_err());
    }

    #[test]
    fn test_validate_update() {
        assert!(validate_update(&KnowledgeUpdate::default()).is_err());
        let update = KnowledgeUpdate {
            tags: Some(vec![]),
            ..Default::default()
        };
        assert!(validate_update(&update).is_ok());
        let update = KnowledgeUpdate {
            content: Some(String::new()),
            ..Default::default()
        };
        assert!(validate_update(&update).is_err());
    }
}
