//! Reconnect-and-retry decorator for cache backends.
//!
//! Connection failures are retried on a fixed backoff schedule according to a
//! [`RetryMode`]. Anything else, and any failure once the schedule runs out, is
//! returned to the caller unchanged.

use std::fmt;
use std::sync::Arc;
use std::sync::atomic::{AtomicU32, Ordering};
use std::time::Duration;

use super::service::{CacheError, CacheResult, CacheService};
use async_trait::async_trait;
use tokio_retry::RetryIf;
use tokio_retry::strategy::FixedInterval;
use tracing::{info, warn};

/// How many times a failed cache operation is retried.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RetryMode {
    /// Keep retrying until the backend comes back.
    Forever,
    /// Retry up to N times, then propagate the error.
    Limited(u32),
    /// Never retry.
    FailFast,
}

impl RetryMode {
    /// Parses `forever`, `limited` or `fail-fast` (case-insensitive).
    ///
    /// `max_retries` is only used by `limited`.
    pub fn parse(mode: &str, max_retries: u32) -> Option<Self> {
        match mode.trim().to_ascii_lowercase().as_str() {
            "forever" | "infinite" => Some(Self::Forever),
            "limited" => Some(Self::Limited(max_retries)),
            "fail-fast" | "failfast" | "none" => Some(Self::FailFast),
            _ => None,
        }
    }
}

impl fmt::Display for RetryMode {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Self::Forever => write!(f, "forever"),
            Self::Limited(n) => write!(f, "limited({})", n),
            Self::FailFast => write!(f, "fail-fast"),
        }
    }
}

/// Retry mode plus the sleep between attempts.
#[derive(Debug, Clone, Copy)]
pub struct ReconnectPolicy {
    pub mode: RetryMode,
    pub backoff: Duration,
}

impl ReconnectPolicy {
    pub fn new(mode: RetryMode, backoff: Duration) -> Self {
        Self { mode, backoff }
    }

    /// Sleep durations between attempts; its length is the retry budget.
    pub(crate) fn schedule(&self) -> Box<dyn Iterator<Item = Duration> + Send> {
        let interval = FixedInterval::new(self.backoff);
        match self.mode {
            RetryMode::Forever => Box::new(interval),
            RetryMode::Limited(n) => Box::new(interval.take(n as usize)),
            RetryMode::FailFast => Box::new(std::iter::empty()),
        }
    }
}

/// Wraps a [`CacheService`] so that connection failures are retried.
pub struct ReconnectingCache {
    inner: Arc<dyn CacheService>,
    policy: ReconnectPolicy,
}

impl ReconnectingCache {
    pub fn new(inner: Arc<dyn CacheService>, policy: ReconnectPolicy) -> Self {
        Self { inner, policy }
    }

    pub fn policy(&self) -> ReconnectPolicy {
        self.policy
    }

    fn on_failure(&self, op: &str, e: &CacheError) -> bool {
        if e.is_connection() {
            warn!(
                "Cache {} failed: {}. Sleeping {:?} before reconnecting ({} policy)",
                op, e, self.policy.backoff, self.policy.mode
            );
            true
        } else {
            false
        }
    }
}

fn note_attempt(op: &str, attempts: &AtomicU32) {
    let attempt = attempts.fetch_add(1, Ordering::Relaxed) + 1;
    if attempt > 1 {
        info!("Cache {} retry attempt {}", op, attempt - 1);
    }
}

#[async_trait]
impl CacheService for ReconnectingCache {
    async fn get(&self, raw_url: &str) -> CacheResult<Option<String>> {
        let attempts = AtomicU32::new(0);

        RetryIf::spawn(
            self.policy.schedule(),
            || {
                note_attempt("GET", &attempts);
                self.inner.get(raw_url)
            },
            |e: &CacheError| self.on_failure("GET", e),
        )
        .await
    }

    async fn set(&self, raw_url: &str, resolved_url: &str) -> CacheResult<()> {
        let attempts = AtomicU32::new(0);

        RetryIf::spawn(
            self.policy.schedule(),
            || {
                note_attempt("SET", &attempts);
                self.inner.set(raw_url, resolved_url)
            },
            |e: &CacheError| self.on_failure("SET", e),
        )
        .await
    }

    async fn health_check(&self) -> bool {
        self.inner.health_check().await
    }
}
