//! API key endpoints. Every route acts on the caller's own keys.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use uuid::Uuid;

use noetic_core::{ApiKey, ApiKeyCreated, ApiKeyForm, ApiKeyToggle};

use super::{ApiResult, AuthUser};
use crate::AppState;

pub async fn list(State(state): State<AppState>, user: AuthUser) -> ApiResult<Json<Vec<ApiKey>>> {
    Ok(Json(state.api_keys.list(user.id()).await?))
}

pub async fn create(
    State(state): State<AppState>,
    user: AuthUser,
    Json(form): Json<ApiKeyForm>,
) -> ApiResult<(StatusCode, Json<ApiKeyCreated>)> {
    let created = state.api_keys.create(user.id(), &form.name).await?;
    Ok((StatusCode::CREATED, Json(created)))
}

pub async fn set_active(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<Uuid>,
    Json(toggle): Json<ApiKeyToggle>,
) -> ApiResult<Json<ApiKey>> {
    Ok(Json(
        state
            .api_keys
            .set_active(user.id(), id, toggle.is_active)
            .await?,
    ))
}

pub async fn delete(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<Uuid>,
) -> ApiResult<StatusCode> {
    state.api_keys.delete(user.id(), id).await?;
    Ok(StatusCode::NO_CONTENT)
}
