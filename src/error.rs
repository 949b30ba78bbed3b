//! Error types surfaced by the resolver and the batch pipeline.
//!
//! Recoverable conditions (a broken target with the network up, an overlong
//! chain, a rejected placeholder page) never show up here: the resolver turns
//! them into a fallback answer. What remains is fatal for a batch run.

use std::path::PathBuf;

use crate::infrastructure::cache::CacheError;
use crate::infrastructure::network::TransportError;

/// Fatal errors from [`crate::application::services::RedirectResolver::resolve`].
#[derive(Debug, thiserror::Error)]
pub enum ResolveError {
    /// A request failed and the connectivity probe failed too. Nothing was cached.
    #[error("Connectivity lost while resolving {url}: {source}")]
    ConnectivityLost {
        url: String,
        #[source]
        source: TransportError,
    },

    /// The cache stayed unreachable after the reconnect policy gave up.
    #[error(transparent)]
    Cache(#[from] CacheError),
}

impl ResolveError {
    pub fn is_connectivity_lost(&self) -> bool {
        matches!(self, Self::ConnectivityLost { .. })
    }
}

/// A record line that could not be decoded. Logged and skipped, never propagated.
#[derive(Debug, thiserror::Error)]
pub enum RecordError {
    #[error("Malformed record: {0}")]
    Malformed(#[from] serde_json::Error),

    #[error("Malformed record: {0}")]
    Shape(String),
}

/// Errors that abort a [`crate::application::services::RepairService::process`] pass.
#[derive(Debug, thiserror::Error)]
pub enum PipelineError {
    #[error("I/O error on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Input file pattern is not a valid regex: {0}")]
    Pattern(#[from] regex::Error),

    #[error(transparent)]
    Resolve(#[from] ResolveError),
}

impl PipelineError {
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    pub fn is_connectivity_lost(&self) -> bool {
        matches!(self, Self::Resolve(e) if e.is_connectivity_lost())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_connectivity_lost_message_names_url() {
        let err = ResolveError::ConnectivityLost {
            url: "http://t.co/abc".to_string(),
            source: TransportError::Timeout {
                url: "http://t.co/abc".to_string(),
            },
        };

        assert!(err.is_connectivity_lost());
        assert!(err.to_string().contains("http://t.co/abc"));
    }

    #[test]
    fn test_pipeline_error_detects_connectivity_loss() {
        let err = PipelineError::from(ResolveError::ConnectivityLost {
            url: "http://t.co/abc".to_string(),
            source: TransportError::Connect {
                url: "http://t.co/abc".to_string(),
                reason: "network unreachable".to_string(),
            },
        });
        assert!(err.is_connectivity_lost());

        let err = PipelineError::from(ResolveError::Cache(CacheError::ConnectionError(
            "refused".to_string(),
        )));
        assert!(!err.is_connectivity_lost());
    }
}
