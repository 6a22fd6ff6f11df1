//! Auth endpoints.

use std::net::SocketAddr;

use axum::extract::{ConnectInfo, Path, State};
use axum::http::{header, HeaderMap, StatusCode};
use axum::Json;
use serde::Deserialize;
use uuid::Uuid;

use noetic_core::{ClientInfo, LoginForm, LoginResponse, SignupForm, TokenPair, UserResponse};

use super::{ApiResult, AuthUser};
use crate::AppState;

#[derive(Debug, Deserialize)]
pub struct RefreshRequest {
    pub refresh_token: String,
    pub user_id: Uuid,
}

/// Body of the endpoints that only name an account by email.
#[derive(Debug, Deserialize)]
pub struct EmailRequest {
    pub email: String,
}

#[derive(Debug, Deserialize)]
pub struct PasswordResetConfirm {
    pub token: String,
    pub new_password: String,
}

/// Client address from `X-Forwarded-For` (first hop) or the peer socket.
pub fn client_info(headers: &HeaderMap, peer: Option<SocketAddr>) -> ClientInfo {
    let forwarded = headers
        .get("x-forwarded-for")
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.split(',').next())
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(String::from);

    ClientInfo {
        address: forwarded.or_else(|| peer.map(|addr| addr.ip().to_string())),
        user_agent: headers
            .get(header::USER_AGENT)
            .and_then(|v| v.to_str().ok())
            .map(String::from),
    }
}

pub async fn signup(
    State(state): State<AppState>,
    Json(form): Json<SignupForm>,
) -> ApiResult<(StatusCode, Json<UserResponse>)> {
    let user = state
        .auth
        .signup(&form.email, &form.password, &form.name)
        .await?;
    Ok((StatusCode::CREATED, Json(user)))
}

pub async fn login(
    State(state): State<AppState>,
    peer: Option<ConnectInfo<SocketAddr>>,
    headers: HeaderMap,
    Json(form): Json<LoginForm>,
) -> ApiResult<Json<LoginResponse>> {
    let client = client_info(&headers, peer.map(|ConnectInfo(addr)| addr));
    let response = state
        .auth
        .login(&form.email, &form.password, &client)
        .await?;
    Ok(Json(response))
}

pub async fn logout(State(state): State<AppState>, user: AuthUser) -> ApiResult<StatusCode> {
    state.auth.logout(user.id()).await?;
    Ok(StatusCode::NO_CONTENT)
}

pub async fn refresh(
    State(state): State<AppState>,
    Json(req): Json<RefreshRequest>,
) -> ApiResult<Json<TokenPair>> {
    let pair = state
        .auth
        .refresh_access_token(&req.refresh_token, req.user_id)
        .await?;
    Ok(Json(pair))
}

pub async fn verify_email(
    State(state): State<AppState>,
    Path(token): Path<String>,
) -> ApiResult<Json<UserResponse>> {
    Ok(Json(state.auth.verify_email(&token).await?))
}

pub async fn resend_verification(
    State(state): State<AppState>,
    Json(req): Json<EmailRequest>,
) -> ApiResult<Json<serde_json::Value>> {
    state.auth.resend_verification(&req.email).await?;
    Ok(Json(serde_json::json!({
        "message": "If the account exists and is unverified, a new link has been sent",
    })))
}

pub async fn request_password_reset(
    State(state): State<AppState>,
    Json(req): Json<EmailRequest>,
) -> ApiResult<Json<serde_json::Value>> {
    state.auth.request_password_reset(&req.email).await?;
    Ok(Json(serde_json::json!({
        "message": "If the email is registered, a reset link has been sent",
    })))
}

pub async fn confirm_password_reset(
    State(state): State<AppState>,
    Json(req): Json<PasswordResetConfirm>,
) -> ApiResult<StatusCode> {
    state
        .auth
        .reset_password(&req.token, &req.new_password)
        .await?;
    Ok(StatusCode::NO_CONTENT)
}

pub async fn me(State(state): State<AppState>, user: AuthUser) -> ApiResult<Json<UserResponse>> {
    Ok(Json(state.auth.current_user(user.id()).await?))
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    #[test]
    fn test_client_info_prefers_forwarded_for() {
        let mut headers = HeaderMap::new();
        headers.insert(
            "x-forwarded-for",
            HeaderValue::from_static("203.0.113.7, 10.0.0.1"),
        );
        headers.insert(header::USER_AGENT, HeaderValue::from_static("curl/8.5"));
        let peer: SocketAddr = "127.0.0.1:5000".parse().unwrap();

        let info = client_info(&headers, Some(peer));
        assert_eq!(info.address.as_deref(), Some("203.0.113.7"));
        assert_eq!(info.user_agent.as_deref(), Some("curl/8.5"));
    }

    #[test]
    fn test_client_info_falls_back_to_peer() {
        let peer: SocketAddr = "192.0.2.10:443".parse().unwrap();
        let info = client_info(&HeaderMap::new(), Some(peer));
        assert_eq!(info.address.as_deref(), Some("192.0.2.10"));
        assert!(info.user_agent.is_none());

        assert_eq!(client_info(&HeaderMap::new(), None), ClientInfo::default());
    }
}
