//! CLI administration tool for link-resolver.
//!
//! Inspects and seeds the resolution cache and checks connectivity without
//! running a repair pass.
//!
//! # Usage
//!
//! ```bash
//! # Look up a memoized resolution
//! cargo run --bin admin -- cache get http://t.co/abc
//!
//! # Seed a resolution by hand (write-once)
//! cargo run --bin admin -- cache seed http://t.co/abc https://example.com/page
//!
//! # Check the cache backend
//! cargo run --bin admin -- cache check
//!
//! # Check the connectivity probe address
//! cargo run --bin admin -- probe
//! ```
//!
//! # Environment Variables
//!
//! Same as the main binary; see [`link_resolver::config`].
//!
//! # Features
//!
//! - **Cache Tools**: Lookup, manual seeding and backend health check
//! - **Connectivity Check**: One probe against `CONNECTIVITY_PROBE_URL`
//! - **Interactive Prompts**: Confirmation before writing to the cache
//! - **Colored Output**: Terminal-friendly formatting using `colored` crate

use link_resolver::config::{self, Config, mask_connection_string};
use link_resolver::infrastructure::cache::{CacheService, RetryMode};
use link_resolver::infrastructure::network::{ConnectivityProbe, GatewayProbe};
use link_resolver::runner;
use link_resolver::utils::url_normalizer::{extract_domain, is_well_formed};

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use colored::*;
use dialoguer::Confirm;
use std::sync::Arc;

/// CLI tool for managing link-resolver.
#[derive(Parser)]
#[command(name = "admin")]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

/// Top-level command groups.
#[derive(Subcommand)]
enum Commands {
    /// Resolution cache operations
    Cache {
        #[command(subcommand)]
        action: CacheAction,
    },

    /// Check the connectivity probe address
    Probe,
}

/// Cache subcommands.
#[derive(Subcommand)]
enum CacheAction {
    /// Show the memoized resolution of a raw URL
    Get {
        raw_url: String,
    },

    /// Store a resolution by hand
    Seed {
        raw_url: String,
        resolved_url: String,

        /// Skip confirmation prompt
        #[arg(short = 'y', long)]
        yes: bool,
    },

    /// Check the cache backend
    Check,
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load environment variables from .env file
    dotenvy::dotenv().ok();

    let cli = Cli::parse();

    let mut config = config::load_from_env().context("Invalid configuration")?;
    // Report an unreachable backend instead of waiting for it.
    config.cache_retry_mode = RetryMode::FailFast;

    match cli.command {
        Commands::Cache { action } => handle_cache_action(action, &config).await?,
        Commands::Probe => handle_probe(&config).await?,
    }

    Ok(())
}

/// Dispatches cache commands.
async fn handle_cache_action(action: CacheAction, config: &Config) -> Result<()> {
    match action {
        CacheAction::Get { raw_url } => {
            let cache = runner::open_cache(config).await?;
            get_entry(cache, &raw_url).await?;
        }
        CacheAction::Seed {
            raw_url,
            resolved_url,
            yes,
        } => {
            let cache = runner::open_cache(config).await?;
            seed_entry(cache, &raw_url, &resolved_url, yes).await?;
        }
        CacheAction::Check => check_cache(config).await?,
    }

    Ok(())
}

async fn get_entry(cache: Arc<dyn CacheService>, raw_url: &str) -> Result<()> {
    println!("{}", "🔎 Cache lookup".bright_blue().bold());
    println!();

    let cached = cache
        .get(raw_url)
        .await
        .map_err(|e| anyhow::anyhow!("Cache lookup failed: {}", e))?;

    println!("  Raw URL:  {}", raw_url.cyan());
    match cached {
        Some(resolved) => {
            let domain = extract_domain(&resolved).unwrap_or_else(|| "-".to_string());
            println!("  Resolved: {}", resolved.bright_yellow().bold());
            println!("  Domain:   {}", domain.bright_black());
        }
        None => println!("  {}", "Not cached yet".yellow()),
    }
    println!();

    Ok(())
}

/// Writes a resolution by hand after a confirmation prompt.
///
/// Entries are write-once: an existing entry is shown and left untouched.
async fn seed_entry(
    cache: Arc<dyn CacheService>,
    raw_url: &str,
    resolved_url: &str,
    skip_confirm: bool,
) -> Result<()> {
    println!("{}", "📝 Seed cache entry".bright_blue().bold());
    println!();

    if let Some(existing) = cache
        .get(raw_url)
        .await
        .map_err(|e| anyhow::anyhow!("Cache lookup failed: {}", e))?
    {
        println!(
            "{}",
            "⚠️  Already cached, entries are never overwritten".yellow()
        );
        println!("  {} -> {}", raw_url.cyan(), existing.bright_yellow());
        return Ok(());
    }

    if !is_well_formed(resolved_url) {
        println!(
            "{}",
            "⚠️  Resolved URL is not an http(s) URL".yellow()
        );
    }

    println!("  Raw URL:  {}", raw_url.cyan());
    println!("  Resolved: {}", resolved_url.bright_yellow().bold());
    println!();

    if !skip_confirm {
        let confirmed = Confirm::new()
            .with_prompt("Write this entry?")
            .default(false)
            .interact()?;

        if !confirmed {
            println!("{}", "❌ Cancelled".red());
            return Ok(());
        }
    }

    cache
        .set(raw_url, resolved_url)
        .await
        .map_err(|e| anyhow::anyhow!("Failed to write entry: {}", e))?;

    println!();
    println!("{}", "✅ Entry written".green().bold());
    println!();

    Ok(())
}

async fn check_cache(config: &Config) -> Result<()> {
    println!("{}", "🔍 Checking cache backend...".bright_blue().bold());
    println!();

    match &config.redis_url {
        Some(url) => println!("  Redis: {}", mask_connection_string(url).cyan()),
        None => println!(
            "  {}",
            "REDIS_URL not set, the in-memory cache is not durable".yellow()
        ),
    }

    let cache = match runner::open_cache(config).await {
        Ok(cache) => cache,
        Err(e) => {
            println!("{}", "❌ Cache backend unreachable".red().bold());
            println!("  {}", format!("{:#}", e).red());
            anyhow::bail!("Cache health check failed");
        }
    };

    if cache.health_check().await {
        println!("{}", "✅ Cache backend is healthy".green().bold());
    } else {
        println!("{}", "❌ Cache backend did not answer PING".red().bold());
        anyhow::bail!("Cache health check failed");
    }
    println!();

    Ok(())
}

async fn handle_probe(config: &Config) -> Result<()> {
    println!("{}", "📡 Connectivity probe".bright_blue().bold());
    println!();

    let probe = GatewayProbe::new(config.connectivity_probe_url.clone(), config.probe_timeout())
        .context("Failed to build probe client")?;

    println!("  Target: {}", probe.target().cyan());

    if probe.is_local_network_up().await {
        println!("{}", "✅ Local network is up".green().bold());
    } else {
        println!("{}", "❌ Local network is down".red().bold());
        anyhow::bail!("Connectivity probe failed");
    }
    println!();

    Ok(())
}
