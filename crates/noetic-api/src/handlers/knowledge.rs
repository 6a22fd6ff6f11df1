//! Knowledge endpoints.

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::Json;
use uuid::Uuid;

use noetic_core::{Knowledge, KnowledgeForm, KnowledgeUpdate, SearchRequest};

use super::{ApiResult, AuthUser};
use crate::AppState;

pub async fn search(
    State(state): State<AppState>,
    _user: AuthUser,
    Query(request): Query<SearchRequest>,
) -> ApiResult<Json<Vec<Knowledge>>> {
    Ok(Json(state.knowledge.search(request).await?))
}

pub async fn create(
    State(state): State<AppState>,
    user: AuthUser,
    Json(form): Json<KnowledgeForm>,
) -> ApiResult<(StatusCode, Json<Knowledge>)> {
    let knowledge = state.knowledge.create(user.id(), form).await?;
    Ok((StatusCode::CREATED, Json(knowledge)))
}

pub async fn list(
    State(state): State<AppState>,
    user: AuthUser,
) -> ApiResult<Json<Vec<Knowledge>>> {
    Ok(Json(state.knowledge.list(user.id()).await?))
}

pub async fn get(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> ApiResult<Json<Knowledge>> {
    Ok(Json(state.knowledge.get(id).await?))
}

pub async fn get_by_title(
    State(state): State<AppState>,
    Path(title): Path<String>,
) -> ApiResult<Json<Knowledge>> {
    Ok(Json(state.knowledge.get_by_title(&title).await?))
}

pub async fn list_by_topic(
    State(state): State<AppState>,
    user: AuthUser,
    Path(topic): Path<String>,
) -> ApiResult<Json<Vec<Knowledge>>> {
    Ok(Json(state.knowledge.list_by_topic(user.id(), &topic).await?))
}

pub async fn list_by_tag(
    State(state): State<AppState>,
    user: AuthUser,
    Path(tag): Path<String>,
) -> ApiResult<Json<Vec<Knowledge>>> {
    Ok(Json(state.knowledge.list_by_tag(user.id(), &tag).await?))
}

pub async fn update(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<Uuid>,
    Json(update): Json<KnowledgeUpdate>,
) -> ApiResult<Json<Knowledge>> {
    state.knowledge.get_owned(id, &user.claims).await?;
    Ok(Json(state.knowledge.update(id, update).await?))
}

pub async fn delete(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<Uuid>,
) -> ApiResult<Json<serde_json::Value>> {
    state.knowledge.get_owned(id, &user.claims).await?;
    let deleted = state.knowledge.delete(id).await?;
    Ok(Json(serde_json::json!({ "deleted": deleted })))
}
