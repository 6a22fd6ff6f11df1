//! Admin endpoints. Every handler requires the admin role.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use tracing::info;
use uuid::Uuid;

use noetic_core::UserResponse;

use super::{AdminUser, ApiResult};
use crate::AppState;

pub async fn list_users(
    State(state): State<AppState>,
    _admin: AdminUser,
) -> ApiResult<Json<Vec<UserResponse>>> {
    Ok(Json(state.admin.list_users().await?))
}

pub async fn get_user(
    State(state): State<AppState>,
    _admin: AdminUser,
    Path(id): Path<Uuid>,
) -> ApiResult<Json<UserResponse>> {
    Ok(Json(state.admin.get_user(id).await?))
}

pub async fn delete_user(
    State(state): State<AppState>,
    admin: AdminUser,
    Path(id): Path<Uuid>,
) -> ApiResult<StatusCode> {
    state.admin.delete_user(id).await?;
    info!(subsystem = "admin", admin_id = %admin.claims.sub, user_id = %id, "User removed by admin");
    Ok(StatusCode::NO_CONTENT)
}
