//! # noetic-api
//!
//! Orchestrators, collaborator adapters and the HTTP surface for noetic.

pub mod config;
pub mod handlers;
pub mod services;

use axum::routing::{get, patch, post};
use axum::Router;
use tower_http::request_id::{MakeRequestId, PropagateRequestIdLayer, RequestId, SetRequestIdLayer};
use tower_http::trace::TraceLayer;
use uuid::Uuid;

use services::{AdminService, ApiKeyService, AuthService, KnowledgeService};

/// Shared state handed to every handler.
#[derive(Clone)]
pub struct AppState {
    pub auth: AuthService,
    pub knowledge: KnowledgeService,
    pub admin: AdminService,
    pub api_keys: ApiKeyService,
}

/// Request ID generator producing UUIDv7 values for `x-request-id`.
#[derive(Clone, Default)]
pub struct MakeRequestUuidV7;

impl MakeRequestId for MakeRequestUuidV7 {
    fn make_request_id<B>(&mut self, _request: &axum::http::Request<B>) -> Option<RequestId> {
        let id = Uuid::now_v7().to_string().parse().ok()?;
        Some(RequestId::new(id))
    }
}

/// Build the application router.
pub fn router(state: AppState) -> Router {
    use handlers::{admin, api_keys, auth, knowledge};

    Router::new()
        // Health check
        .route("/health", get(handlers::health_check))
        // Auth
        .route("/api/v1/auth/signup", post(auth::signup))
        .route("/api/v1/auth/login", post(auth::login))
        .route("/api/v1/auth/logout", post(auth::logout))
        .route("/api/v1/auth/refresh", post(auth::refresh))
        .route("/api/v1/auth/verify-email/:token", get(auth::verify_email))
        .route(
            "/api/v1/auth/verify-email/resend",
            post(auth::resend_verification),
        )
        .route(
            "/api/v1/auth/password-reset/request",
            post(auth::request_password_reset),
        )
        .route(
            "/api/v1/auth/password-reset/confirm",
            post(auth::confirm_password_reset),
        )
        .route("/api/v1/auth/me", get(auth::me))
        // Knowledge
        .route("/api/v1/knowledge", post(knowledge::create))
        .route("/api/v1/knowledge/search", get(knowledge::search))
        .route("/api/v1/knowledge/list", get(knowledge::list))
        .route(
            "/api/v1/knowledge/:id",
            get(knowledge::get)
                .put(knowledge::update)
                .delete(knowledge::delete),
        )
        .route("/api/v1/knowledge/title/:title", get(knowledge::get_by_title))
        .route("/api/v1/knowledge/topic/:topic", get(knowledge::list_by_topic))
        .route("/api/v1/knowledge/tag/:tag", get(knowledge::list_by_tag))
        // API keys
        .route("/api/v1/api_key", get(api_keys::list).post(api_keys::create))
        .route(
            "/api/v1/api_key/:id",
            patch(api_keys::set_active).delete(api_keys::delete),
        )
        // Admin
        .route("/api/v1/admin/users", get(admin::list_users))
        .route(
            "/api/v1/admin/users/:id",
            get(admin::get_user).delete(admin::delete_user),
        )
        .layer(TraceLayer::new_for_http())
        .layer(PropagateRequestIdLayer::x_request_id())
        .layer(SetRequestIdLayer::x_request_id(MakeRequestUuidV7))
        .with_state(state)
}
