#![allow(dead_code)]

use async_trait::async_trait;
use link_resolver::application::services::RedirectResolver;
use link_resolver::infrastructure::cache::MemoryCache;
use link_resolver::infrastructure::network::{ConnectivityProbe, ReqwestFetcher};
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

/// Address nothing listens on; connecting fails immediately.
pub const CLOSED_PORT_URL: &str = "http://127.0.0.1:1";

/// Probe with a fixed answer that counts how often it was asked.
pub struct StaticProbe {
    up: bool,
    calls: AtomicUsize,
}

impl StaticProbe {
    pub fn up() -> Self {
        Self {
            up: true,
            calls: AtomicUsize::new(0),
        }
    }

    pub fn down() -> Self {
        Self {
            up: false,
            calls: AtomicUsize::new(0),
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl ConnectivityProbe for StaticProbe {
    async fn is_local_network_up(&self) -> bool {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.up
    }
}

pub fn fetcher() -> ReqwestFetcher {
    ReqwestFetcher::new(Duration::from_secs(5), "link-resolver-tests").unwrap()
}

pub fn create_test_resolver(
    cache: Arc<MemoryCache>,
    probe: Arc<StaticProbe>,
) -> RedirectResolver<ReqwestFetcher, StaticProbe> {
    RedirectResolver::new(cache, Arc::new(fetcher()), probe)
}

pub fn record_line(id: &str, urls: &[&str]) -> String {
    serde_json::json!([id, [{ "urls": urls, "domains": [] }, {}]]).to_string()
}
