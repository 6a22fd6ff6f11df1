//! Server configuration loaded from the environment.
//!
//! | Variable                      | Default                          |
//! |-------------------------------|----------------------------------|
//! | `DATABASE_URL`                | `postgres://localhost/noetic`    |
//! | `DB_MAX_CONNECTIONS`          | 10                               |
//! | `DB_MIN_CONNECTIONS`          | 1                                |
//! | `DB_ACQUIRE_TIMEOUT_SECS`     | 30                               |
//! | `DB_IDLE_TIMEOUT_SECS`        | 600                              |
//! | `REDIS_URL`                   | `redis://localhost:6379/0`       |
//! | `HOST` / `PORT`               | `0.0.0.0` / 8000                 |
//! | `JWT_SECRET`                  | random per process (warns)       |
//! | `ACCESS_TOKEN_EXPIRE_MINUTES` | 1440                             |
//! | `REFRESH_TOKEN_EXPIRE_DAYS`   | 14                               |
//! | `LOGIN_FAILED_LIMIT`          | 5                                |
//! | `LOGIN_LOCKED_MINUTES`        | 15                               |
//! | `ONE_TIME_TOKEN_MINUTES`      | 10                               |
//! | `FRONTEND_URL`                | `http://localhost:5173`          |
//! | `NOTIFY_WEBHOOK_URL`          | unset (log-only notifications)   |
//! | `NOTIFY_WEBHOOK_SECRET`       | unset (unsigned webhook)         |
//! | `ALLOWED_ORIGINS`             | `FRONTEND_URL`                   |
//! | `VECTOR_COLLECTION`           | `knowledge`                      |
//!
//! Numeric settings must be positive and no larger than their ceiling
//! (see [`limits`]); anything else falls back to the default.
//!
//! Embedding settings (`OPENAI_*`, `EMBED_TIMEOUT_SECS`) are read by
//! [`noetic_inference::OpenAIConfig::from_env`].

use std::str::FromStr;
use std::time::Duration;

use tracing::warn;

use noetic_core::defaults;
use noetic_db::{pool, PoolConfig};

use crate::services::AuthSettings;

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub database_url: String,
    pub db_max_connections: u32,
    pub db_min_connections: u32,
    pub db_acquire_timeout_secs: u64,
    pub db_idle_timeout_secs: u64,
    pub redis_url: String,
    pub host: String,
    pub port: u16,
    pub jwt_secret: String,
    pub access_token_minutes: i64,
    pub refresh_token_days: i64,
    pub login_failed_limit: i64,
    pub login_locked_minutes: i64,
    pub one_time_token_minutes: i64,
    pub frontend_url: String,
    pub notify_webhook_url: Option<String>,
    pub notify_webhook_secret: Option<String>,
    pub allowed_origins: Vec<String>,
    pub vector_collection: String,
}

/// Upper bounds for numeric settings.
pub mod limits {
    pub const MAX_DB_CONNECTIONS: u32 = 1_000;
    pub const MAX_TIMEOUT_SECS: u64 = 24 * 3600;
    /// One year.
    pub const MAX_MINUTES: i64 = 365 * 24 * 60;
    pub const MAX_DAYS: i64 = 3_650;
    pub const MAX_LOGIN_FAILED_LIMIT: i64 = 1_000;
}

/// Parse a number in `1..=max`, falling back to `default` with a warning.
fn parse_or<T>(lookup: &impl Fn(&str) -> Option<String>, key: &str, default: T, max: T) -> T
where
    T: FromStr + PartialOrd + Default + Copy + std::fmt::Display,
{
    match lookup(key) {
        None => default,
        Some(raw) => match raw.trim().parse::<T>() {
            Ok(v) if v > T::default() && v <= max => v,
            _ => {
                warn!(
                    subsystem = "api",
                    component = "config",
                    key,
                    value = %raw,
                    default = %default,
                    "Invalid numeric setting, using default"
                );
                default
            }
        },
    }
}

fn non_empty(lookup: &impl Fn(&str) -> Option<String>, key: &str) -> Option<String> {
    lookup(key)
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

impl AppConfig {
    /// Load from process environment variables.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load using an arbitrary key lookup.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let jwt_secret = match non_empty(&lookup, "JWT_SECRET") {
            Some(secret) => secret,
            None => {
                warn!(
                    subsystem = "api",
                    component = "config",
                    "JWT_SECRET not set, using a random secret; tokens will not survive a restart"
                );
                noetic_crypto::generate_refresh_token()
            }
        };

        let frontend_url =
            non_empty(&lookup, "FRONTEND_URL").unwrap_or_else(|| defaults::FRONTEND_URL.to_string());

        let allowed_origins = match non_empty(&lookup, "ALLOWED_ORIGINS") {
            Some(list) => list
                .split(',')
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .map(String::from)
                .collect(),
            None => vec![frontend_url.clone()],
        };

        Self {
            database_url: non_empty(&lookup, "DATABASE_URL")
                .unwrap_or_else(|| defaults::DATABASE_URL.to_string()),
            db_max_connections: parse_or(
                &lookup,
                "DB_MAX_CONNECTIONS",
                pool::DEFAULT_MAX_CONNECTIONS,
                limits::MAX_DB_CONNECTIONS,
            ),
            db_min_connections: parse_or(
                &lookup,
                "DB_MIN_CONNECTIONS",
                pool::DEFAULT_MIN_CONNECTIONS,
                limits::MAX_DB_CONNECTIONS,
            ),
            db_acquire_timeout_secs: parse_or(
                &lookup,
                "DB_ACQUIRE_TIMEOUT_SECS",
                pool::DEFAULT_ACQUIRE_TIMEOUT_SECS,
                limits::MAX_TIMEOUT_SECS,
            ),
            db_idle_timeout_secs: parse_or(
                &lookup,
                "DB_IDLE_TIMEOUT_SECS",
                pool::DEFAULT_IDLE_TIMEOUT_SECS,
                limits::MAX_TIMEOUT_SECS,
            ),
            redis_url: non_empty(&lookup, "REDIS_URL")
                .unwrap_or_else(|| defaults::REDIS_URL.to_string()),
            host: non_empty(&lookup, "HOST").unwrap_or_else(|| "0.0.0.0".to_string()),
            port: parse_or(&lookup, "PORT", defaults::SERVER_PORT, u16::MAX),
            jwt_secret,
            access_token_minutes: parse_or(
                &lookup,
                "ACCESS_TOKEN_EXPIRE_MINUTES",
                defaults::ACCESS_TOKEN_EXPIRE_MINUTES,
                limits::MAX_MINUTES,
            ),
            refresh_token_days: parse_or(
                &lookup,
                "REFRESH_TOKEN_EXPIRE_DAYS",
                defaults::REFRESH_TOKEN_EXPIRE_DAYS,
                limits::MAX_DAYS,
            ),
            login_failed_limit: parse_or(
                &lookup,
                "LOGIN_FAILED_LIMIT",
                defaults::LOGIN_FAILED_LIMIT,
                limits::MAX_LOGIN_FAILED_LIMIT,
            ),
            login_locked_minutes: parse_or(
                &lookup,
                "LOGIN_LOCKED_MINUTES",
                defaults::LOGIN_LOCKED_MINUTES,
                limits::MAX_MINUTES,
            ),
            one_time_token_minutes: parse_or(
                &lookup,
                "ONE_TIME_TOKEN_MINUTES",
                defaults::ONE_TIME_TOKEN_MINUTES,
                limits::MAX_MINUTES,
            ),
            frontend_url,
            notify_webhook_url: non_empty(&lookup, "NOTIFY_WEBHOOK_URL"),
            notify_webhook_secret: non_empty(&lookup, "NOTIFY_WEBHOOK_SECRET"),
            allowed_origins,
            vector_collection: non_empty(&lookup, "VECTOR_COLLECTION")
                .unwrap_or_else(|| defaults::KNOWLEDGE_COLLECTION.to_string()),
        }
    }

    pub fn access_token_lifetime(&self) -> chrono::Duration {
        chrono::Duration::minutes(self.access_token_minutes)
    }

    pub fn auth_settings(&self) -> AuthSettings {
        AuthSettings {
            refresh_token_ttl: Duration::from_secs(self.refresh_token_days as u64 * 24 * 3600),
            login_failed_limit: self.login_failed_limit,
            login_locked: Duration::from_secs(self.login_locked_minutes as u64 * 60),
            one_time_token_ttl: Duration::from_secs(self.one_time_token_minutes as u64 * 60),
            frontend_url: self.frontend_url.clone(),
        }
    }

    pub fn pool_config(&self) -> PoolConfig {
        PoolConfig {
            max_connections: self.db_max_connections,
            min_connections: self.db_min_connections,
            acquire_timeout: Duration::from_secs(self.db_acquire_timeout_secs),
            idle_timeout: Duration::from_secs(self.db_idle_timeout_secs),
        }
    }

    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}
