//! Redis-backed session cache.
//!
//! Holds refresh-token bindings, one-time tokens and failed-login counters.
//! The connection is established lazily on first use and shared by every
//! caller; [`ConnectionManager`] multiplexes and reconnects on its own.
//!
//! ## Configuration
//!
//! - `REDIS_URL`: Redis connection URL (default: redis://localhost:6379/0)

use std::time::{Duration, Instant};

use async_trait::async_trait;
use redis::aio::ConnectionManager;
use redis::AsyncCommands;
use tokio::sync::{OnceCell, RwLock};
use tracing::{debug, info, instrument};

use noetic_core::defaults::CACHE_KEY_PREFIX;
use noetic_core::{Error, Result, SessionCache};

/// INCR, arming the expiry only when the key was just created.
const INCR_WITH_EXPIRY_SCRIPT: &str = r#"
local count = redis.call('INCR', KEYS[1])
if count == 1 then
    redis.call('EXPIRE', KEYS[1], ARGV[1])
end
return count
"#;

fn cache_error(err: redis::RedisError) -> Error {
    Error::Cache(err.to_string())
}

/// Session cache backed by Redis.
pub struct RedisSessionCache {
    client: redis::Client,
    connection: RwLock<OnceCell<ConnectionManager>>,
    prefix: String,
    incr_script: redis::Script,
}

impl RedisSessionCache {
    /// Validate the URL. No connection is made until first use.
    pub fn new(redis_url: &str) -> Result<Self> {
        let client = redis::Client::open(redis_url).map_err(cache_error)?;
        Ok(Self {
            client,
            connection: RwLock::new(OnceCell::new()),
            prefix: CACHE_KEY_PREFIX.to_string(),
            incr_script: redis::Script::new(INCR_WITH_EXPIRY_SCRIPT),
        })
    }

    /// Override the key prefix (default `nt:`).
    pub fn with_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.prefix = prefix.into();
        self
    }

    fn key(&self, key: &str) -> String {
        format!("{}{}", self.prefix, key)
    }

    /// Establish the connection now instead of on first use.
    pub async fn connect(&self) -> Result<()> {
        self.conn().await.map(|_| ())
    }

    /// Drop the shared connection. A later call reconnects.
    pub async fn close(&self) {
        let mut guard = self.connection.write().await;
        if guard.take().is_some() {
            info!(
                subsystem = "cache",
                component = "redis",
                op = "close",
                "Redis connection closed"
            );
        }
    }

    async fn conn(&self) -> Result<ConnectionManager> {
        let guard = self.connection.read().await;
        let conn = guard
            .get_or_try_init(|| async {
                let start = Instant::now();
                let manager = ConnectionManager::new(self.client.clone())
                    .await
                    .map_err(cache_error)?;
                info!(
                    subsystem = "cache",
                    component = "redis",
                    op = "connect",
                    duration_ms = start.elapsed().as_millis() as u64,
                    "Redis connection established"
                );
                Ok::<_, Error>(manager)
            })
            .await?;
        Ok(conn.clone())
    }
}

#[async_trait]
impl SessionCache for RedisSessionCache {
    #[instrument(skip(self, value), fields(subsystem = "cache", component = "redis", op = "set_ex"))]
    async fn set_ex(&self, key: &str, value: &str, ttl: Duration) -> Result<()> {
        let mut conn = self.conn().await?;
        conn.set_ex::<_, _, ()>(self.key(key), value, ttl.as_secs().max(1))
            .await
            .map_err(cache_error)
    }

    async fn get(&self, key: &str) -> Result<Option<String>> {
        let mut conn = self.conn().await?;
        let value: Option<String> = conn.get(self.key(key)).await.map_err(cache_error)?;
        debug!(
            subsystem = "cache",
            component = "redis",
            op = "get",
            hit = value.is_some(),
            "Cache lookup"
        );
        Ok(value)
    }

    async fn delete(&self, key: &str) -> Result<()> {
        let mut conn = self.conn().await?;
        conn.del::<_, ()>(self.key(key)).await.map_err(cache_error)
    }

    async fn incr_with_expiry(&self, key: &str, ttl: Duration) -> Result<i64> {
        let mut conn = self.conn().await?;
        self.incr_script
            .key(self.key(key))
            .arg(ttl.as_secs().max(1))
            .invoke_async(&mut conn)
            .await
            .map_err(cache_error)
    }
}
