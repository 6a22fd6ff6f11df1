//! Error types for noetic.
//!
//! Every failure carries an [`ErrorKind`]. Domain kinds are reported to
//! callers verbatim; upstream kinds are logged in full and reported with a
//! fixed generic message.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Result type alias using noetic's Error type.
pub type Result<T> = std::result::Result<T, Error>;

/// Message reported to callers for every upstream failure.
pub const GENERIC_FAILURE_MESSAGE: &str = "Operation failed";

/// Column protected by a uniqueness constraint.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UniqueField {
    Email,
    Name,
    Title,
}

impl std::fmt::Display for UniqueField {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Email => write!(f, "email"),
            Self::Name => write!(f, "name"),
            Self::Title => write!(f, "title"),
        }
    }
}

/// Caller-facing classification of an [`Error`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ErrorKind {
    DuplicateField,
    NotFound,
    InvalidCredentials,
    AccountLocked,
    InvalidOrExpiredToken,
    InvalidInput,
    Unauthorized,
    Forbidden,
    UpstreamFailure,
}

impl ErrorKind {
    /// Stable machine-readable code.
    pub fn code(&self) -> &'static str {
        match self {
            Self::DuplicateField => "DUPLICATE_FIELD",
            Self::NotFound => "NOT_FOUND",
            Self::InvalidCredentials => "INVALID_CREDENTIALS",
            Self::AccountLocked => "ACCOUNT_LOCKED",
            Self::InvalidOrExpiredToken => "INVALID_OR_EXPIRED_TOKEN",
            Self::InvalidInput => "INVALID_INPUT",
            Self::Unauthorized => "UNAUTHORIZED",
            Self::Forbidden => "FORBIDDEN",
            Self::UpstreamFailure => "UPSTREAM_FAILURE",
        }
    }

    /// HTTP status code conventionally attached to this kind.
    pub fn http_status(&self) -> u16 {
        match self {
            Self::DuplicateField => 409,
            Self::NotFound => 404,
            Self::InvalidCredentials => 401,
            Self::AccountLocked => 423,
            Self::InvalidOrExpiredToken => 401,
            Self::InvalidInput => 400,
            Self::Unauthorized => 401,
            Self::Forbidden => 403,
            Self::UpstreamFailure => 500,
        }
    }

    /// Whether this kind is a domain error (reported with its specific message).
    pub fn is_domain(&self) -> bool {
        !matches!(self, Self::UpstreamFailure)
    }
}

/// Core error type for noetic operations.
#[derive(Error, Debug)]
pub enum Error {
    /// A unique column already holds the submitted value
    #[error("{0} already exists")]
    DuplicateField(UniqueField),

    /// Resource not found
    #[error("Not found: {0}")]
    NotFound(String),

    /// Unknown email or wrong password; deliberately indistinguishable
    #[error("Invalid credentials")]
    InvalidCredentials,

    /// Failed-login threshold reached
    #[error("Account locked due to too many failed login attempts")]
    AccountLocked,

    /// Verification, reset, refresh or access token absent, expired or mismatched
    #[error("Invalid or expired token")]
    InvalidOrExpiredToken,

    /// Invalid input
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Missing or malformed authentication
    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    /// Forbidden (authenticated but not authorized)
    #[error("Forbidden: {0}")]
    Forbidden(String),

    /// Database operation failed (wraps sqlx::Error)
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Session cache operation failed
    #[error("Cache error: {0}")]
    Cache(String),

    /// Embedding generation failed
    #[error("Embedding error: {0}")]
    Embedding(String),

    /// Vector index operation failed
    #[error("Vector index error: {0}")]
    VectorIndex(String),

    /// Password hashing or verification failed
    #[error("Hashing error: {0}")]
    Hashing(String),

    /// Token signing failed
    #[error("Token error: {0}")]
    Token(String),

    /// Notification dispatch failed
    #[error("Notification error: {0}")]
    Notification(String),

    /// Serialization/deserialization error
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// A compensation step failed, leaving the stores inconsistent
    #[error("Rollback failed during {operation} at step {step}: {cause}")]
    RollbackFailed {
        operation: &'static str,
        step: &'static str,
        cause: String,
    },

    /// Internal error
    #[error("Internal error: {0}")]
    Internal(String),
}

impl Error {
    /// Classify this error for the caller.
    pub fn kind(&self) -> ErrorKind {
        match self {
            Error::DuplicateField(_) => ErrorKind::DuplicateField,
            Error::NotFound(_) => ErrorKind::NotFound,
            Error::InvalidCredentials => ErrorKind::InvalidCredentials,
            Error::AccountLocked => ErrorKind::AccountLocked,
            Error::InvalidOrExpiredToken => ErrorKind::InvalidOrExpiredToken,
            Error::InvalidInput(_) => ErrorKind::InvalidInput,
            Error::Unauthorized(_) => ErrorKind::Unauthorized,
            Error::Forbidden(_) => ErrorKind::Forbidden,
            Error::Database(_)
            | Error::Cache(_)
            | Error::Embedding(_)
            | Error::VectorIndex(_)
            | Error::Hashing(_)
            | Error::Token(_)
            | Error::Notification(_)
            | Error::Serialization(_)
            | Error::RollbackFailed { .. }
            | Error::Internal(_) => ErrorKind::UpstreamFailure,
        }
    }

    /// Whether this error is a domain error.
    pub fn is_domain(&self) -> bool {
        self.kind().is_domain()
    }

    /// Message safe to show to a caller. Upstream causes are never leaked.
    pub fn public_message(&self) -> String {
        if self.is_domain() {
            self.to_string()
        } else {
            GENERIC_FAILURE_MESSAGE.to_string()
        }
    }
}

impl From<serde_json::Error> for Error {
    fn from(e: serde_json::Error) -> Self {
        Error::Serialization(e.to_string())
    }
}

impl From<reqwest::Error> for Error {
    fn from(e: reqwest::Error) -> Self {
        Error::Internal(format!("Request error: {}", e))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display_duplicate_field() {
        let err = Error::DuplicateField(UniqueField::Email);
        assert_eq!(err.to_string(), "email already exists");
        let err = Error::DuplicateField(UniqueField::Title);
        assert_eq!(err.to_string(), "title already exists");
    }

    #[test]
    fn test_error_display_not_found() {
        let err = Error::NotFound("knowledge".to_string());
        assert_eq!(err.to_string(), "Not found: knowledge");
    }

    #[test]
    fn test_domain_kinds() {
        assert_eq!(
            Error::DuplicateField(UniqueField::Name).kind(),
            ErrorKind::DuplicateField
        );
        assert_eq!(Error::InvalidCredentials.kind(), ErrorKind::InvalidCredentials);
        assert_eq!(Error::AccountLocked.kind(), ErrorKind::AccountLocked);
        assert_eq!(
            Error::InvalidOrExpiredToken.kind(),
            ErrorKind::InvalidOrExpiredToken
        );
        assert!(Error::AccountLocked.is_domain());
    }

    #[test]
    fn test_upstream_kinds() {
        let errors = vec![
            Error::Cache("connection refused".to_string()),
            Error::Embedding("timeout".to_string()),
            Error::VectorIndex("unavailable".to_string()),
            Error::Hashing("bad params".to_string()),
            Error::Token("bad key".to_string()),
            Error::Internal("boom".to_string()),
            Error::RollbackFailed {
                operation: "delete_knowledge",
                step: "restore_row",
                cause: "db down".to_string(),
            },
        ];
        for err in errors {
            assert_eq!(err.kind(), ErrorKind::UpstreamFailure, "{err}");
            assert!(!err.is_domain());
        }
    }

    #[test]
    fn test_public_message_hides_upstream_cause() {
        let err = Error::Cache("redis://secret-host:6379 refused".to_string());
        assert_eq!(err.public_message(), GENERIC_FAILURE_MESSAGE);
        assert!(!err.public_message().contains("secret-host"));
    }

    #[test]
    fn test_public_message_keeps_domain_detail() {
        let err = Error::DuplicateField(UniqueField::Name);
        assert_eq!(err.public_message(), "name already exists");
    }

    #[test]
    fn test_http_status_mapping() {
        assert_eq!(ErrorKind::DuplicateField.http_status(), 409);
        assert_eq!(ErrorKind::NotFound.http_status(), 404);
        assert_eq!(ErrorKind::InvalidCredentials.http_status(), 401);
        assert_eq!(ErrorKind::AccountLocked.http_status(), 423);
        assert_eq!(ErrorKind::Forbidden.http_status(), 403);
        assert_eq!(ErrorKind::UpstreamFailure.http_status(), 500);
    }

    #[test]
    fn test_codes_are_unique() {
        let kinds = [
            ErrorKind::DuplicateField,
            ErrorKind::NotFound,
            ErrorKind::InvalidCredentials,
            ErrorKind::AccountLocked,
            ErrorKind::InvalidOrExpiredToken,
            ErrorKind::InvalidInput,
            ErrorKind::Unauthorized,
            ErrorKind::Forbidden,
            ErrorKind::UpstreamFailure,
        ];
        let mut codes: Vec<_> = kinds.iter().map(|k| k.code()).collect();
        codes.sort();
        codes.dedup();
        assert_eq!(codes.len(), kinds.len());
    }

    #[test]
    fn test_from_serde_json_error() {
        let json_err = serde_json::from_str::<i32>("not a number").unwrap_err();
        let err: Error = json_err.into();
        assert!(matches!(err, Error::Serialization(_)));
    }

    #[test]
    fn test_error_is_send_sync() {
        fn assert_send<T: Send>() {}
        fn assert_sync<T: Sync>() {}

        assert_send::<Error>();
        assert_sync::<Error>();
    }
}
