//! In-process cache implementation for tests or runs without Redis.

use std::collections::HashMap;

use super::service::{CacheResult, CacheService};
use async_trait::async_trait;
use tokio::sync::RwLock;
use tracing::debug;

/// A write-once map held in memory.
///
/// Memoization only lasts as long as the process, so a rerun after a crash
/// re-resolves every link.
///
/// # Use Cases
///
/// - Development runs without a Redis server
/// - Unit and integration tests
#[derive(Default)]
pub struct MemoryCache {
    entries: RwLock<HashMap<String, String>>,
}

impl MemoryCache {
    pub fn new() -> Self {
        debug!("Using MemoryCache (memoization is not durable)");
        Self::default()
    }

    /// Pre-populated cache, mainly for tests.
    pub fn with_entries<I, K, V>(entries: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        let entries = entries
            .into_iter()
            .map(|(k, v)| (k.into(), v.into()))
            .collect();

        Self {
            entries: RwLock::new(entries),
        }
    }

    pub async fn len(&self) -> usize {
        self.entries.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.entries.read().await.is_empty()
    }
}

#[async_trait]
impl CacheService for MemoryCache {
    async fn get(&self, raw_url: &str) -> CacheResult<Option<String>> {
        Ok(self.entries.read().await.get(raw_url).cloned())
    }

    async fn set(&self, raw_url: &str, resolved_url: &str) -> CacheResult<()> {
        self.entries
            .write()
            .await
            .entry(raw_url.to_string())
            .or_insert_with(|| resolved_url.to_string());
        Ok(())
    }

    async fn health_check(&self) -> bool {
        true
    }
}
