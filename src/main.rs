//! `link-resolver` command-line entry point.
//!
//! ```bash
//! # Repair every pending file of INPUT_DIR into OUTPUT_DIR
//! link-resolver repair --input-dir extracted --output-dir fixed
//!
//! # Resolve a few links by hand
//! link-resolver resolve http://t.co/abc http://bit.ly/xyz
//! ```

use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::Result;
use clap::{Parser, Subcommand};
use link_resolver::config::{self, Config};
use link_resolver::runner;
use link_resolver::utils::url_normalizer::extract_domain;
use tracing_subscriber::EnvFilter;

/// Resolves shortened links in harvested tweet records.
#[derive(Parser)]
#[command(name = "link-resolver")]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Repair the URL lists of every pending record file
    Repair {
        /// Directory of extracted record files (overrides INPUT_DIR)
        #[arg(short, long)]
        input_dir: Option<PathBuf>,

        /// Directory for repaired files (overrides OUTPUT_DIR)
        #[arg(short, long)]
        output_dir: Option<PathBuf>,
    },

    /// Resolve URLs and print their canonical destination
    Resolve {
        #[arg(required = true)]
        urls: Vec<String>,
    },
}

#[tokio::main]
async fn main() -> ExitCode {
    dotenvy::dotenv().ok();

    let cli = Cli::parse();

    let config = match config::load_from_env() {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Invalid configuration: {:#}", e);
            return ExitCode::FAILURE;
        }
    };

    init_tracing(&config);
    config.print_summary();

    match run(cli.command, &config).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!("{:#}", e);
            ExitCode::FAILURE
        }
    }
}

fn init_tracing(config: &Config) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(config.log_level.as_str()));

    if config.log_format == "json" {
        tracing_subscriber::fmt()
            .json()
            .with_env_filter(filter)
            .init();
    } else {
        tracing_subscriber::fmt().with_env_filter(filter).init();
    }
}

async fn run(command: Commands, config: &Config) -> Result<()> {
    match command {
        Commands::Repair {
            input_dir,
            output_dir,
        } => {
            let input_dir = input_dir.unwrap_or_else(|| config.input_dir.clone());
            let output_dir = output_dir.unwrap_or_else(|| config.output_dir.clone());

            let summary = runner::run_repair(config, &input_dir, &output_dir).await?;

            tracing::info!(
                "Done: {} file(s) repaired, {} skipped, {} record(s) fixed, {} unchanged, {} malformed",
                summary.files_processed,
                summary.files_skipped,
                summary.records_fixed,
                summary.records_passed_through,
                summary.records_malformed
            );
        }
        Commands::Resolve { urls } => {
            for resolution in runner::run_resolve(config, &urls).await? {
                let domain = extract_domain(&resolution.url).unwrap_or_else(|| "-".to_string());
                println!("{}\t{}\t{}", resolution.url, domain, resolution.outcome);
            }
        }
    }

    Ok(())
}
