//! HTTP handlers and the request plumbing they share.

pub mod admin;
pub mod api_keys;
pub mod auth;
pub mod knowledge;

use axum::extract::FromRequestParts;
use axum::http::request::Parts;
use axum::http::{header, StatusCode};
use axum::response::IntoResponse;
use axum::Json;
use tracing::{debug, error};
use uuid::Uuid;

use noetic_core::{AccessClaims, Error, UserRole};

use crate::AppState;

// =============================================================================
// ERROR HANDLING
// =============================================================================

/// Error returned by every handler.
///
/// Renders as `{"error": <code>, "message": <message>}`. Upstream failures
/// are logged in full here and reported with a generic message.
#[derive(Debug)]
pub struct ApiError(pub Error);

impl From<Error> for ApiError {
    fn from(err: Error) -> Self {
        Self(err)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> axum::response::Response {
        let kind = self.0.kind();
        if kind.is_domain() {
            debug!(subsystem = "api", error_code = kind.code(), error = %self.0, "Request rejected");
        } else {
            error!(subsystem = "api", error_code = kind.code(), error = %self.0, "Request failed");
        }

        let status =
            StatusCode::from_u16(kind.http_status()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
        let body = Json(serde_json::json!({
            "error": kind.code(),
            "message": self.0.public_message(),
        }));

        (status, body).into_response()
    }
}

pub type ApiResult<T> = Result<T, ApiError>;

// =============================================================================
// AUTHENTICATION
// =============================================================================

fn bearer_token(parts: &Parts) -> Option<&str> {
    parts
        .headers
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "))
        .map(str::trim)
        .filter(|t| !t.is_empty())
}

/// Header naming the API access key.
pub const ACCESS_KEY_HEADER: &str = "x-access-key";

/// Header carrying the API secret key.
pub const SECRET_KEY_HEADER: &str = "x-secret-key";

fn header_value<'a>(parts: &'a Parts, name: &str) -> Option<&'a str> {
    parts
        .headers
        .get(name)
        .and_then(|v| v.to_str().ok())
        .map(str::trim)
        .filter(|v| !v.is_empty())
}

/// Extractor for requests carrying a valid access token, or failing that
/// an API key pair in [`ACCESS_KEY_HEADER`] and [`SECRET_KEY_HEADER`].
#[derive(Debug, Clone)]
pub struct AuthUser {
    pub claims: AccessClaims,
}

impl AuthUser {
    pub fn id(&self) -> Uuid {
        self.claims.sub
    }
}

#[axum::async_trait]
impl FromRequestParts<AppState> for AuthUser {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        if let Some(token) = bearer_token(parts) {
            let claims = state.auth.authenticate(token)?;
            return Ok(AuthUser { claims });
        }

        match (
            header_value(parts, ACCESS_KEY_HEADER),
            header_value(parts, SECRET_KEY_HEADER),
        ) {
            (Some(access), Some(secret)) => {
                let claims = state.api_keys.authenticate(access, secret).await?;
                Ok(AuthUser { claims })
            }
            _ => Err(Error::Unauthorized("Authentication required".to_string()).into()),
        }
    }
}

/// Extractor that additionally requires the admin role.
#[derive(Debug, Clone)]
pub struct AdminUser {
    pub claims: AccessClaims,
}

#[axum::async_trait]
impl FromRequestParts<AppState> for AdminUser {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let auth = AuthUser::from_request_parts(parts, state).await?;
        if auth.claims.role != UserRole::Admin {
            return Err(Error::Forbidden("Admin role required".to_string()).into());
        }
        Ok(AdminUser {
            claims: auth.claims,
        })
    }
}

// =============================================================================
// HEALTH CHECK
// =============================================================================

pub async fn health_check() -> impl IntoResponse {
    Json(serde_json::json!({
        "status": "healthy",
        "version": env!("CARGO_PKG_VERSION"),
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::to_bytes;
    use axum::http::Request;
    use noetic_core::UniqueField;

    fn parts_with_auth(value: Option<&str>) -> Parts {
        let mut builder = Request::builder().uri("/");
        if let Some(v) = value {
            builder = builder.header(header::AUTHORIZATION, v);
        }
        builder.body(()).unwrap().into_parts().0
    }

    #[test]
    fn test_bearer_token_parsing() {
        assert_eq!(bearer_token(&parts_with_auth(Some("Bearer abc"))), Some("abc"));
        assert_eq!(bearer_token(&parts_with_auth(Some("Basic abc"))), None);
        assert_eq!(bearer_token(&parts_with_auth(Some("Bearer   "))), None);
        assert_eq!(bearer_token(&parts_with_auth(None)), None);
    }

    #[test]
    fn test_header_value_trims_and_skips_blank() {
        let parts = Request::builder()
            .uri("/")
            .header(ACCESS_KEY_HEADER, " nk_abc ")
            .header(SECRET_KEY_HEADER, "  ")
            .body(())
            .unwrap()
            .into_parts()
            .0;
        assert_eq!(header_value(&parts, ACCESS_KEY_HEADER), Some("nk_abc"));
        assert_eq!(header_value(&parts, SECRET_KEY_HEADER), None);
    }

    async fn render(err: Error) -> (StatusCode, serde_json::Value) {
        let response = ApiError(err).into_response();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    #[tokio::test]
    async fn test_domain_error_body() {
        let (status, body) = render(Error::DuplicateField(UniqueField::Email)).await;
        assert_eq!(status, StatusCode::CONFLICT);
        assert_eq!(body["error"], "DUPLICATE_FIELD");
        assert_eq!(body["message"], "email already exists");
    }

    #[tokio::test]
    async fn test_upstream_error_body_is_generic() {
        let (status, body) = render(Error::Cache("redis at 10.0.0.3 refused".to_string())).await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body["error"], "UPSTREAM_FAILURE");
        assert_eq!(body["message"], "Operation failed");
    }

    #[tokio::test]
    async fn test_locked_status() {
        let (status, _) = render(Error::AccountLocked).await;
        assert_eq!(status, StatusCode::LOCKED);
    }
}
