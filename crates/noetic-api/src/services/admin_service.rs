//! Administrative user management.

use std::sync::Arc;

use tracing::{error, info, instrument, warn};
use uuid::Uuid;

use noetic_core::defaults::{KNOWLEDGE_COLLECTION, REFRESH_TOKEN_PREFIX};
use noetic_core::{
    Error, KnowledgeRepository, Result, SessionCache, UserRepository, UserResponse, VectorIndex,
};

#[derive(Clone)]
pub struct AdminService {
    users: Arc<dyn UserRepository>,
    knowledge: Arc<dyn KnowledgeRepository>,
    index: Arc<dyn VectorIndex>,
    cache: Arc<dyn SessionCache>,
    collection: String,
}

impl AdminService {
    pub fn new(
        users: Arc<dyn UserRepository>,
        knowledge: Arc<dyn KnowledgeRepository>,
        index: Arc<dyn VectorIndex>,
        cache: Arc<dyn SessionCache>,
    ) -> Self {
        Self {
            users,
            knowledge,
            index,
            cache,
            collection: KNOWLEDGE_COLLECTION.to_string(),
        }
    }

    /// Purge points from this collection instead of the default one.
    /// Must match the knowledge service's collection.
    pub fn with_collection(mut self, collection: impl Into<String>) -> Self {
        self.collection = collection.into();
        self
    }

    pub async fn list_users(&self) -> Result<Vec<UserResponse>> {
        Ok(self
            .users
            .list()
            .await?
            .into_iter()
            .map(UserResponse::from)
            .collect())
    }

    pub async fn get_user(&self, id: Uuid) -> Result<UserResponse> {
        self.users
            .get(id)
            .await?
            .map(UserResponse::from)
            .ok_or_else(|| Error::NotFound(format!("User {} not found", id)))
    }

    /// Delete a user and everything they own.
    ///
    /// The row delete cascades to credentials, providers and knowledge.
    /// Index and session cleanup afterwards is best effort; leftover points
    /// are skipped by search.
    #[instrument(skip(self), fields(subsystem = "admin", op = "delete_user", user_id = %id))]
    pub async fn delete_user(&self, id: Uuid) -> Result<()> {
        let knowledge_ids = self.knowledge.list_ids_by_owner(id).await?;

        if !self.users.delete(id).await? {
            return Err(Error::NotFound(format!("User {} not found", id)));
        }

        if !knowledge_ids.is_empty() {
            if let Err(e) = self.index.delete(&self.collection, &knowledge_ids).await {
                error!(
                    error = %e,
                    stale_points = knowledge_ids.len(),
                    "Failed to purge vector points for deleted user"
                );
            }
        }

        let binding = format!("{}{}", REFRESH_TOKEN_PREFIX, id);
        if let Err(e) = self.cache.delete(&binding).await {
            warn!(error = %e, "Failed to drop refresh binding for deleted user");
        }

        info!(knowledge_count = knowledge_ids.len(), "User deleted");
        Ok(())
    }
}
