//! Durable memo of resolved links.
//!
//! Provides a [`CacheService`] trait with these implementations:
//! - [`RedisCache`] - Production Redis-backed cache
//! - [`MemoryCache`] - In-process map for testing/cache-less runs
//! - [`ReconnectingCache`] - Decorator adding the reconnect-and-retry policy

mod memory_cache;
mod reconnecting;
mod redis_cache;
mod service;

pub use memory_cache::MemoryCache;
pub use reconnecting::{ReconnectPolicy, ReconnectingCache, RetryMode};
pub use redis_cache::RedisCache;
pub use service::{CacheError, CacheResult, CacheService};

#[cfg(test)]
pub use service::MockCacheService;
