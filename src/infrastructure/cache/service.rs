//! Cache service trait and error types.

use async_trait::async_trait;

/// Errors that can occur during cache operations.
#[derive(Debug, Clone, thiserror::Error)]
pub enum CacheError {
    /// The backend could not be reached. Safe to retry.
    #[error("Cache connection error: {0}")]
    ConnectionError(String),

    /// The backend answered with an error. Retrying will not help.
    #[error("Cache operation error: {0}")]
    OperationError(String),
}

impl CacheError {
    pub fn is_connection(&self) -> bool {
        matches!(self, Self::ConnectionError(_))
    }
}

/// Result type for cache operations.
pub type CacheResult<T> = Result<T, CacheError>;

/// Durable memo of resolved links: RawUrl -> ResolvedUrl.
///
/// Entries are permanent and write-once. Implementations must not expire them
/// and must not overwrite an existing value.
///
/// Unlike a read-through cache, errors here are **not** swallowed: a lost write
/// would silently drop the memo for that link, so every failure reaches the
/// caller.
///
/// # Implementations
///
/// - [`crate::infrastructure::cache::RedisCache`] - Redis-backed, survives restarts
/// - [`crate::infrastructure::cache::MemoryCache`] - In-process map for tests and cache-less runs
/// - [`crate::infrastructure::cache::ReconnectingCache`] - Retry decorator around either
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait CacheService: Send + Sync {
    /// Looks up the resolved URL memoized for `raw_url`.
    ///
    /// # Returns
    ///
    /// - `Ok(Some(url))` on cache hit
    /// - `Ok(None)` on cache miss
    async fn get(&self, raw_url: &str) -> CacheResult<Option<String>>;

    /// Memoizes `resolved_url` for `raw_url`.
    ///
    /// A second write for the same key is a no-op; the first value wins.
    async fn set(&self, raw_url: &str, resolved_url: &str) -> CacheResult<()>;

    /// Checks if the cache backend is reachable.
    async fn health_check(&self) -> bool;
}
