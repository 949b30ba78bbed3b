//! Redirect resolution with a durable, write-once memo.

use std::collections::{HashMap, HashSet};
use std::sync::{Arc, Mutex};

use crate::domain::entities::{Resolution, ResolutionOutcome};
use crate::error::ResolveError;
use crate::infrastructure::cache::CacheService;
use crate::infrastructure::network::{ConnectivityProbe, HopResponse, HttpFetcher, TransportError};
use crate::utils::placeholder::{PlaceholderDetector, SubstringDetector};
use crate::utils::url_normalizer::{is_well_formed, resolve_location};
use tokio::sync::Mutex as KeyLock;
use tracing::{debug, error, info, warn};

/// Default maximum number of redirects followed after the first response.
pub const DEFAULT_MAX_HOPS: usize = 10;

type InflightMap = Mutex<HashMap<String, Arc<KeyLock<()>>>>;

/// Drops the per-key lock entry once no task holds or awaits it.
struct InflightRelease<'a> {
    inflight: &'a InflightMap,
    raw_url: &'a str,
}

impl Drop for InflightRelease<'_> {
    fn drop(&mut self) {
        let mut inflight = self.inflight.lock().unwrap_or_else(|e| e.into_inner());
        // Only the map's own handle is left.
        if inflight
            .get(self.raw_url)
            .is_some_and(|key_lock| Arc::strong_count(key_lock) == 1)
        {
            inflight.remove(self.raw_url);
        }
    }
}

/// Resolves a RawUrl to its canonical destination.
///
/// # Flow
///
/// 1. Cache lookup. A hit returns immediately with no network traffic.
/// 2. One body-less request to the RawUrl. No redirect means the RawUrl is canonical.
/// 3. Redirects are followed hop by hop, up to `max_hops`. The first hop that
///    answers 2xx with a well-formed, non-placeholder URL is the answer.
/// 4. Chains that run out (hop limit, loop, dead end) fall back to the last
///    acceptable URL seen.
///
/// Only the original RawUrl is written to the cache, exactly once per
/// non-fatal resolution. Intermediate hops are not memoized.
///
/// # Transport failures
///
/// When a request fails without any HTTP response, the [`ConnectivityProbe`]
/// decides who is to blame:
/// - network up: the target is broken, the fallback URL is cached and returned
/// - network down: [`ResolveError::ConnectivityLost`] is returned and nothing is cached
///
/// # Concurrency
///
/// Concurrent calls for the same uncached RawUrl are serialised on a per-key
/// lock; the late arrivals find the answer in the cache.
pub struct RedirectResolver<F: HttpFetcher, P: ConnectivityProbe> {
    cache: Arc<dyn CacheService>,
    fetcher: Arc<F>,
    probe: Arc<P>,
    placeholder: Arc<dyn PlaceholderDetector>,
    max_hops: usize,
    inflight: InflightMap,
}

impl<F: HttpFetcher, P: ConnectivityProbe> RedirectResolver<F, P> {
    /// Creates a resolver with the default hop limit and placeholder patterns.
    pub fn new(cache: Arc<dyn CacheService>, fetcher: Arc<F>, probe: Arc<P>) -> Self {
        Self {
            cache,
            fetcher,
            probe,
            placeholder: Arc::new(SubstringDetector::default()),
            max_hops: DEFAULT_MAX_HOPS,
            inflight: Mutex::new(HashMap::new()),
        }
    }

    pub fn with_max_hops(mut self, max_hops: usize) -> Self {
        self.max_hops = max_hops;
        self
    }

    pub fn with_placeholder_detector(mut self, detector: Arc<dyn PlaceholderDetector>) -> Self {
        self.placeholder = detector;
        self
    }

    pub fn max_hops(&self) -> usize {
        self.max_hops
    }

    /// Resolves `raw_url` to a ResolvedUrl.
    ///
    /// # Errors
    ///
    /// Returns [`ResolveError::ConnectivityLost`] if the local network is down and
    /// [`ResolveError::Cache`] if the cache stays unreachable. Both are fatal for
    /// a batch run.
    pub async fn resolve(&self, raw_url: &str) -> Result<String, ResolveError> {
        Ok(self.resolve_detailed(raw_url).await?.url)
    }

    /// Like [`Self::resolve`], but also reports how the answer was reached.
    pub async fn resolve_detailed(&self, raw_url: &str) -> Result<Resolution, ResolveError> {
        if raw_url.is_empty() {
            return Ok(Resolution::new("", ResolutionOutcome::Empty));
        }

        if let Some(cached) = self.cache.get(raw_url).await? {
            debug!("Resolved {} from cache", raw_url);
            return Ok(Resolution::new(cached, ResolutionOutcome::CacheHit));
        }

        // Declared before the lock handle so it drops after it, including on cancellation.
        let _release = InflightRelease {
            inflight: &self.inflight,
            raw_url,
        };
        let key_lock = self.acquire_key(raw_url);
        let _guard = key_lock.lock().await;

        // Another task may have finished this key while we waited.
        match self.cache.get(raw_url).await? {
            Some(cached) => Ok(Resolution::new(cached, ResolutionOutcome::CacheHit)),
            None => self.resolve_uncached(raw_url).await,
        }
    }

    fn acquire_key(&self, raw_url: &str) -> Arc<KeyLock<()>> {
        let mut inflight = self.inflight.lock().unwrap_or_else(|e| e.into_inner());
        inflight
            .entry(raw_url.to_string())
            .or_insert_with(|| Arc::new(KeyLock::new(())))
            .clone()
    }

    async fn resolve_uncached(&self, raw_url: &str) -> Result<Resolution, ResolveError> {
        if !is_well_formed(raw_url) {
            debug!("{} is not an http(s) URL, keeping it as-is", raw_url);
            return self
                .settle(raw_url, Resolution::new(raw_url, ResolutionOutcome::Unrequestable))
                .await;
        }

        let first = match self.fetcher.fetch(raw_url).await {
            Ok(response) => response,
            Err(e) => {
                let resolution = self.on_transport_failure(raw_url, raw_url, 0, e).await?;
                return self.settle(raw_url, resolution).await;
            }
        };

        let resolution = if first.redirect_target().is_some() {
            self.follow_chain(raw_url, first).await?
        } else {
            Resolution::new(raw_url, ResolutionOutcome::NoRedirect)
        };

        self.settle(raw_url, resolution).await
    }

    /// Follows redirects starting from the first response, which is known to redirect.
    async fn follow_chain(
        &self,
        raw_url: &str,
        first: HopResponse,
    ) -> Result<Resolution, ResolveError> {
        let mut seen = HashSet::from([raw_url.to_string()]);
        let mut last_seen = raw_url.to_string();
        let mut current = first;

        for hop in 1..=self.max_hops {
            let Some(location) = current.redirect_target() else {
                return Ok(Resolution::new(
                    last_seen,
                    ResolutionOutcome::DeadEnd {
                        hops: hop - 1,
                        status: current.status,
                    },
                ));
            };
            let target = resolve_location(&current.url, location);

            if !is_well_formed(&target) {
                debug!("Redirect from {} leaves http(s): {}", current.url, target);
                return Ok(Resolution::new(
                    last_seen,
                    ResolutionOutcome::DeadEnd {
                        hops: hop - 1,
                        status: current.status,
                    },
                ));
            }

            if !seen.insert(target.clone()) {
                warn!("Redirect loop for {} at {}", raw_url, target);
                return Ok(Resolution::new(
                    last_seen,
                    ResolutionOutcome::RedirectLoop { hops: hop - 1 },
                ));
            }

            let acceptable = !self.placeholder.is_placeholder(&target);
            if !acceptable {
                debug!("Rejecting placeholder page {} as a terminal", target);
            }

            let response = match self.fetcher.fetch(&target).await {
                Ok(response) => response,
                Err(e) => {
                    let fallback = if acceptable { target } else { last_seen };
                    return self.on_transport_failure(raw_url, &fallback, hop, e).await;
                }
            };

            if acceptable {
                if response.is_success() {
                    return Ok(Resolution::new(
                        target,
                        ResolutionOutcome::Followed { hops: hop },
                    ));
                }
                last_seen = target;
            }

            current = response;
        }

        if current.redirect_target().is_none() {
            return Ok(Resolution::new(
                last_seen,
                ResolutionOutcome::DeadEnd {
                    hops: self.max_hops,
                    status: current.status,
                },
            ));
        }

        warn!(
            "Too many redirects for {} (limit {}), settling on {}",
            raw_url, self.max_hops, last_seen
        );
        Ok(Resolution::new(
            last_seen,
            ResolutionOutcome::HopLimitExceeded {
                hops: self.max_hops,
            },
        ))
    }

    /// Decides between "target broken" and "we are offline" after a failed request.
    async fn on_transport_failure(
        &self,
        raw_url: &str,
        fallback: &str,
        hops: usize,
        e: TransportError,
    ) -> Result<Resolution, ResolveError> {
        warn!("{}. Probing local connectivity", e);

        if self.probe.is_local_network_up().await {
            info!("Network is up, treating {} as broken", e.url());
            Ok(Resolution::new(
                fallback,
                ResolutionOutcome::TargetUnreachable { hops },
            ))
        } else {
            error!("Network is down while resolving {}; nothing cached", raw_url);
            Err(ResolveError::ConnectivityLost {
                url: raw_url.to_string(),
                source: e,
            })
        }
    }

    /// Writes the memo for `raw_url` and hands the resolution back.
    async fn settle(
        &self,
        raw_url: &str,
        resolution: Resolution,
    ) -> Result<Resolution, ResolveError> {
        if resolution.outcome.writes_cache() {
            self.cache.set(raw_url, &resolution.url).await?;
        }

        if resolution.outcome.is_fallback() {
            warn!(
                "Resolved {} -> {} ({})",
                raw_url, resolution.url, resolution.outcome
            );
        } else {
            debug!(
                "Resolved {} -> {} ({})",
                raw_url, resolution.url, resolution.outcome
            );
        }

        Ok(resolution)
    }
}
