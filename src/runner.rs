//! Runtime wiring for the binaries.
//!
//! Builds the cache, HTTP adapters and services from a [`Config`] and runs them.

use crate::application::services::{RedirectResolver, RepairOptions, RepairService, RepairSummary};
use crate::config::{Config, mask_connection_string};
use crate::domain::entities::Resolution;
use crate::infrastructure::cache::{
    CacheError, CacheService, MemoryCache, ReconnectingCache, RedisCache,
};
use crate::infrastructure::network::{GatewayProbe, ReqwestFetcher};
use crate::utils::placeholder::SubstringDetector;

use anyhow::{Context, Result};
use std::path::Path;
use std::sync::Arc;
use tokio_retry::RetryIf;

/// Resolver wired to the real HTTP adapters.
pub type Resolver = RedirectResolver<ReqwestFetcher, GatewayProbe>;

/// Opens the configured cache backend behind the reconnect policy.
///
/// Without a Redis URL an in-process [`MemoryCache`] is used. The initial Redis
/// connection is retried with the same policy as later operations.
///
/// # Errors
///
/// Returns an error if the Redis URL is invalid or the server stays unreachable
/// once the retry policy gives up.
pub async fn open_cache(config: &Config) -> Result<Arc<dyn CacheService>> {
    let policy = config.reconnect_policy();

    let backend: Arc<dyn CacheService> = if let Some(redis_url) = &config.redis_url {
        let redis = RetryIf::spawn(
            policy.schedule(),
            || RedisCache::connect(redis_url, config.cache_key_prefix.clone()),
            |e: &CacheError| {
                if e.is_connection() {
                    tracing::warn!(
                        "Redis at {} unavailable: {}. Retrying in {:?}",
                        mask_connection_string(redis_url),
                        e,
                        policy.backoff
                    );
                }
                e.is_connection()
            },
        )
        .await
        .context("Failed to connect to Redis")?;

        tracing::info!("Cache enabled (Redis)");
        Arc::new(redis)
    } else {
        tracing::warn!("REDIS_URL not set, using in-memory cache. Memoization ends with this run");
        Arc::new(MemoryCache::new())
    };

    Ok(Arc::new(ReconnectingCache::new(backend, policy)))
}

/// Builds the resolver with the real HTTP fetcher, gateway probe and placeholder patterns.
///
/// # Errors
///
/// Returns an error if the cache cannot be opened or an HTTP client cannot be built.
pub async fn build_resolver(config: &Config) -> Result<Arc<Resolver>> {
    let cache = open_cache(config).await?;

    let fetcher = ReqwestFetcher::new(config.request_timeout(), &config.user_agent)
        .context("Failed to build HTTP client")?;
    let probe = GatewayProbe::new(config.connectivity_probe_url.clone(), config.probe_timeout())
        .context("Failed to build connectivity probe client")?;

    let resolver = RedirectResolver::new(cache, Arc::new(fetcher), Arc::new(probe))
        .with_max_hops(config.max_redirects)
        .with_placeholder_detector(Arc::new(SubstringDetector::from_csv(
            &config.placeholder_patterns,
        )));

    Ok(Arc::new(resolver))
}

/// Repairs every pending record file of `input_dir` into `output_dir`.
///
/// # Errors
///
/// Returns an error on filesystem failures, an unreachable cache, or lost
/// connectivity. Completed files stay in place; rerunning resumes from the
/// first unfinished file.
pub async fn run_repair(config: &Config, input_dir: &Path, output_dir: &Path) -> Result<RepairSummary> {
    let resolver = build_resolver(config).await?;
    let options = RepairOptions::new(
        &config.input_file_pattern,
        config.resolve_concurrency,
        config.repair_user_urls,
    )?;
    let service = RepairService::new(resolver, options);

    tracing::info!(
        "Repairing {} into {}",
        input_dir.display(),
        output_dir.display()
    );

    match service.process(input_dir, output_dir).await {
        Ok(summary) => Ok(summary),
        Err(e) if e.is_connectivity_lost() => {
            tracing::error!("Aborting: {}", e);
            Err(anyhow::Error::new(e).context(
                "Local network connectivity lost. Restore connectivity and rerun; finished files are kept",
            ))
        }
        Err(e) => {
            tracing::error!("Aborting: {}", e);
            Err(anyhow::Error::new(e).context("Repair pass failed"))
        }
    }
}

/// Resolves individual URLs, in order.
///
/// # Errors
///
/// Stops at the first fatal resolution error.
pub async fn run_resolve(config: &Config, urls: &[String]) -> Result<Vec<Resolution>> {
    let resolver = build_resolver(config).await?;
    let mut resolutions = Vec::with_capacity(urls.len());

    for url in urls {
        let resolution = resolver
            .resolve_detailed(url)
            .await
            .with_context(|| format!("Failed to resolve {}", url))?;
        resolutions.push(resolution);
    }

    Ok(resolutions)
}
