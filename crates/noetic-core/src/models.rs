//! Core data models for noetic.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

pub use pgvector::Vector;

// =============================================================================
// USER TYPES
// =============================================================================

/// Role assigned to a user account.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UserRole {
    Admin,
    #[default]
    User,
}

impl std::fmt::Display for UserRole {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Admin => write!(f, "admin"),
            Self::User => write!(f, "user"),
        }
    }
}

impl std::str::FromStr for UserRole {
    type Err = String;
    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "admin" => Ok(Self::Admin),
            "user" => Ok(Self::User),
            _ => Err(format!("Invalid user role: {}", s)),
        }
    }
}

/// Canonical user record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct User {
    pub id: Uuid,
    pub email: String,
    pub name: String,
    pub role: UserRole,
    pub is_active: bool,
    pub is_verified: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Fields needed to insert a new user.
#[derive(Debug, Clone)]
pub struct NewUser {
    pub email: String,
    pub name: String,
    pub role: UserRole,
}

/// Public view of a user, safe to return to clients.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserResponse {
    pub id: Uuid,
    pub email: String,
    pub name: String,
    pub role: UserRole,
    pub is_verified: bool,
    pub created_at: DateTime<Utc>,
}

impl From<User> for UserResponse {
    fn from(user: User) -> Self {
        Self {
            id: user.id,
            email: user.email,
            name: user.name,
            role: user.role,
            is_verified: user.is_verified,
            created_at: user.created_at,
        }
    }
}

/// Stored password credential. One per user, replaced on reset.
#[derive(Debug, Clone)]
pub struct Credential {
    pub user_id: Uuid,
    pub password_hash: String,
    pub is_active: bool,
    pub password_changed_at: DateTime<Utc>,
}

/// Provider kind for password sign-in.
pub const EMAIL_PROVIDER: &str = "email";

/// Auth provider record with last-login metadata.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AuthProviderRecord {
    pub id: Uuid,
    pub user_id: Uuid,
    pub provider: String,
    pub provider_subject: String,
    pub last_login_at: Option<DateTime<Utc>>,
    pub last_login_ip: Option<String>,
    pub last_login_user_agent: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// Client metadata captured at login.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClientInfo {
    pub address: Option<String>,
    pub user_agent: Option<String>,
}

// =============================================================================
// API KEY TYPES
// =============================================================================

/// A programmatic credential owned by a user. Only the secret's digest is stored.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ApiKey {
    pub id: Uuid,
    pub user_id: Uuid,
    pub name: String,
    pub access_key: String,
    #[serde(skip)]
    pub secret_hash: String,
    pub total_requests: i64,
    pub is_active: bool,
    pub last_used_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

/// Fields needed to insert a new API key.
#[derive(Debug, Clone)]
pub struct NewApiKey {
    pub user_id: Uuid,
    pub name: String,
    pub access_key: String,
    pub secret_hash: String,
}

/// Creation result. The only place the plaintext secret ever appears.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiKeyCreated {
    pub id: Uuid,
    pub name: String,
    pub access_key: String,
    pub secret_key: String,
    pub total_requests: i64,
    pub created_at: DateTime<Utc>,
}

impl ApiKeyCreated {
    pub fn new(key: ApiKey, secret_key: String) -> Self {
        Self {
            id: key.id,
            name: key.name,
            access_key: key.access_key,
            secret_key,
            total_requests: key.total_requests,
            created_at: key.created_at,
        }
    }
}

/// Request for creating an API key.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiKeyForm {
    pub name: String,
}

/// Request for enabling or disabling an API key.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiKeyToggle {
    pub is_active: bool,
}

// =============================================================================
// AUTH REQUEST / RESPONSE TYPES
// =============================================================================

/// Signup request.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SignupForm {
    pub email: String,
    pub password: String,
    pub name: String,
}

/// Login request.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoginForm {
    pub email: String,
    pub password: String,
}

/// Claims embedded in a signed access token.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccessClaims {
    /// Subject (user id).
    pub sub: Uuid,
    pub email: String,
    pub role: UserRole,
    /// Issued at (unix seconds).
    pub iat: i64,
    /// Expiry (unix seconds).
    pub exp: i64,
}

fn bearer() -> String {
    "bearer".to_string()
}

/// Successful login result.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoginResponse {
    pub access_token: String,
    pub refresh_token: String,
    #[serde(default = "bearer")]
    pub token_type: String,
    pub user: UserResponse,
}

/// Result of a refresh-token rotation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TokenPair {
    pub access_token: String,
    pub refresh_token: String,
    #[serde(default = "bearer")]
    pub token_type: String,
}

impl TokenPair {
    pub fn new(access_token: String, refresh_token: String) -> Self {
        Self {
            access_token,
            refresh_token,
            token_type: bearer(),
        }
    }
}

// =============================================================================
// KNOWLEDGE TYPES
// =============================================================================

/// A stored knowledge entry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Knowledge {
    pub id: Uuid,
    pub user_id: Uuid,
    pub topic: String,
    pub tags: Vec<String>,
    pub title: String,
    pub content: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Knowledge {
    /// Tag membership test. Duplicate tags are tolerated.
    pub fn has_tag(&self, tag: &str) -> bool {
        self.tags.iter().any(|t| t == tag)
    }

    /// Text indexed alongside the vector for this entry.
    pub fn searchable_text(&self) -> String {
        let mut text = String::with_capacity(self.content.len() + self.title.len() + 64);
        text.push_str(&self.title);
        text.push_str("\n\nTopic: ");
        text.push_str(&self.topic);
        if !self.tags.is_empty() {
            text.push_str("\nTags: ");
            text.push_str(&self.tags.join(", "));
        }
        text.push_str("\n\n");
        text.push_str(&self.content);
        text
    }

    /// Metadata snapshot stored with the vector point.
    pub fn index_metadata(&self) -> serde_json::Value {
        serde_json::json!({
            "topic": self.topic,
            "tags": self.tags,
            "title": self.title,
            "created_at": self.created_at.to_rfc3339(),
        })
    }
}

/// Request for creating a new knowledge entry.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct KnowledgeForm {
    pub topic: String,
    #[serde(default)]
    pub tags: Vec<String>,
    pub title: String,
    pub content: String,
}

/// Partial update for a knowledge entry. `None` fields are left untouched.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct KnowledgeUpdate {
    pub topic: Option<String>,
    pub tags: Option<Vec<String>>,
    pub title: Option<String>,
    pub content: Option<String>,
}

impl KnowledgeUpdate {
    pub fn is_empty(&self) -> bool {
        self.topic.is_none() && self.tags.is_none() && self.title.is_none() && self.content.is_none()
    }
}

impl From<&Knowledge> for KnowledgeUpdate {
    /// Full update that writes every mutable field back to the given values.
    fn from(k: &Knowledge) -> Self {
        Self {
            topic: Some(k.topic.clone()),
            tags: Some(k.tags.clone()),
            title: Some(k.title.clone()),
            content: Some(k.content.clone()),
        }
    }
}

/// Semantic search request.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchRequest {
    pub query: String,
    pub topic: Option<String>,
    pub tag: Option<String>,
    #[serde(default = "default_search_limit")]
    pub limit: i64,
}

fn default_search_limit() -> i64 {
    crate::defaults::SEARCH_LIMIT
}

// =============================================================================
// VECTOR INDEX TYPES
// =============================================================================

/// A single entry in the vector index.
#[derive(Debug, Clone)]
pub struct VectorPoint {
    pub id: Uuid,
    pub vector: Vector,
    pub text: String,
    pub metadata: serde_json::Value,
}

// =============================================================================
// NOTIFICATION TYPES
// =============================================================================

/// Outbound email handed to a notifier.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EmailMessage {
    pub to: String,
    pub subject: String,
    pub text: String,
}
