//! Service layer for business logic.

pub mod admin_service;
pub mod api_key_service;
pub mod auth_service;
pub mod knowledge_service;
pub mod notifier;
pub mod saga;
pub mod session_cache;

pub use admin_service::AdminService;
pub use api_key_service::ApiKeyService;
pub use auth_service::{AuthService, AuthSettings, IdentityStores};
pub use knowledge_service::KnowledgeService;
pub use notifier::{LogNotifier, WebhookNotifier};
pub use saga::Saga;
pub use session_cache::RedisSessionCache;
