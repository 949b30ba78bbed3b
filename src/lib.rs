//! # Link Resolver
//!
//! Repairs the link data of harvested tweet records: every shortened or
//! redirecting URL is followed to its canonical destination, memoized in Redis,
//! and written back together with its domain.
//!
//! ## Architecture
//!
//! - **Domain Layer** ([`domain`]) - Record shapes and resolution outcomes
//! - **Application Layer** ([`application`]) - Redirect resolution and the batch repair pipeline
//! - **Infrastructure Layer** ([`infrastructure`]) - Redis cache, HTTP fetcher, connectivity probe
//! - **Runner** ([`runner`]) - Wiring used by the `link-resolver` and `admin` binaries
//!
//! ## Features
//!
//! - Write-once durable memo of RawUrl → ResolvedUrl
//! - Redirect chains with hop limit, loop detection and placeholder rejection
//! - Connectivity probe separating broken links from a dead local network
//! - Resumable, file-at-a-time batch processing
//!
//! ## Quick Start
//!
//! ```bash
//! export REDIS_URL="redis://localhost:6379/0"  # Optional
//!
//! cargo run -- repair --input-dir extracted --output-dir fixed
//! ```
//!
//! ## Configuration
//!
//! Configuration is loaded from environment variables via [`config::Config`].
//! See [`config`] module for available options.

pub mod application;
pub mod domain;
pub mod error;
pub mod infrastructure;
pub mod utils;

pub mod config;
pub mod runner;

pub use error::{PipelineError, ResolveError};

/// Commonly used types for external consumers.
///
/// Re-exports frequently used types to simplify imports for library users
/// and integration tests.
pub mod prelude {
    pub use crate::application::services::{
        RedirectResolver, RepairOptions, RepairService, RepairSummary,
    };
    pub use crate::domain::entities::{ExtractedRecord, Resolution, ResolutionOutcome};
    pub use crate::error::{PipelineError, ResolveError};
    pub use crate::infrastructure::cache::{CacheService, MemoryCache};
    pub use crate::infrastructure::network::{
        ConnectivityProbe, GatewayProbe, HopResponse, HttpFetcher, ReqwestFetcher,
    };
}
