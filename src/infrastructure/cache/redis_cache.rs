//! Redis-backed cache implementation.

use super::service::{CacheError, CacheResult, CacheService};
use async_trait::async_trait;
use redis::{AsyncCommands, Client, RedisError, aio::ConnectionManager};
use tracing::{debug, info};

/// Redis memo of resolved links.
///
/// Uses `ConnectionManager` so a dropped connection is re-established on the next
/// command. Keys never carry a TTL and are written with `SET NX`.
pub struct RedisCache {
    client: ConnectionManager,
    key_prefix: String,
}

impl RedisCache {
    /// Connects to Redis and validates the connection with a PING.
    ///
    /// # Arguments
    ///
    /// - `redis_url` - Redis connection string (e.g., `"redis://localhost:6379/1"`)
    /// - `key_prefix` - Namespace prepended to every raw URL; empty keeps raw URLs as keys
    ///
    /// # Errors
    ///
    /// Returns [`CacheError::OperationError`] if the URL is invalid and
    /// [`CacheError::ConnectionError`] if the server cannot be reached or fails the PING.
    pub async fn connect(redis_url: &str, key_prefix: impl Into<String>) -> CacheResult<Self> {
        info!("Connecting to Redis at {}", redis_url);

        let client = Client::open(redis_url).map_err(|e| {
            CacheError::OperationError(format!("Failed to create Redis client: {}", e))
        })?;

        let manager = ConnectionManager::new(client).await.map_err(|e| {
            CacheError::ConnectionError(format!("Failed to connect to Redis: {}", e))
        })?;

        let mut test_conn = manager.clone();
        test_conn
            .ping::<()>()
            .await
            .map_err(|e| CacheError::ConnectionError(format!("Redis PING failed: {}", e)))?;

        info!("✓ Connected to Redis");

        Ok(Self {
            client: manager,
            key_prefix: key_prefix.into(),
        })
    }

    fn build_key(&self, raw_url: &str) -> String {
        format!("{}{}", self.key_prefix, raw_url)
    }
}

/// Splits Redis failures into "could not reach the server" and everything else.
fn classify(context: &str, e: RedisError) -> CacheError {
    if e.is_io_error() || e.is_connection_refusal() || e.is_connection_dropped() || e.is_timeout()
    {
        CacheError::ConnectionError(format!("{}: {}", context, e))
    } else {
        CacheError::OperationError(format!("{}: {}", context, e))
    }
}

#[async_trait]
impl CacheService for RedisCache {
    async fn get(&self, raw_url: &str) -> CacheResult<Option<String>> {
        let key = self.build_key(raw_url);
        let mut conn = self.client.clone();

        let cached = conn
            .get::<_, Option<String>>(&key)
            .await
            .map_err(|e| classify("Redis GET failed", e))?;

        match &cached {
            Some(url) => debug!("Cache HIT: {} -> {}", raw_url, url),
            None => debug!("Cache MISS: {}", raw_url),
        }

        Ok(cached)
    }

    async fn set(&self, raw_url: &str, resolved_url: &str) -> CacheResult<()> {
        let key = self.build_key(raw_url);
        let mut conn = self.client.clone();

        let written = conn
            .set_nx::<_, _, bool>(&key, resolved_url)
            .await
            .map_err(|e| classify("Redis SETNX failed", e))?;

        if written {
            debug!("Cache SET: {} -> {}", raw_url, resolved_url);
        } else {
            debug!("Cache SET skipped, {} already memoized", raw_url);
        }

        Ok(())
    }

    async fn health_check(&self) -> bool {
        let mut conn = self.client.clone();
        conn.ping::<()>().await.is_ok()
    }
}
