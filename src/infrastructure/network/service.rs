//! Network seam traits and error types.

use async_trait::async_trait;

/// Target-level failure: the request never produced an HTTP response.
#[derive(Debug, Clone, thiserror::Error)]
pub enum TransportError {
    #[error("Invalid request URL {url}: {reason}")]
    InvalidUrl { url: String, reason: String },

    #[error("Request to {url} timed out")]
    Timeout { url: String },

    #[error("Could not connect to {url}: {reason}")]
    Connect { url: String, reason: String },

    #[error("Request to {url} failed: {reason}")]
    Request { url: String, reason: String },
}

impl TransportError {
    pub fn url(&self) -> &str {
        match self {
            Self::InvalidUrl { url, .. }
            | Self::Timeout { url }
            | Self::Connect { url, .. }
            | Self::Request { url, .. } => url,
        }
    }
}

/// The parts of one response the redirect state machine looks at.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HopResponse {
    /// URL the request was sent to.
    pub url: String,
    pub status: u16,
    /// Raw `Location` header value, if any.
    pub location: Option<String>,
}

impl HopResponse {
    pub fn new(url: impl Into<String>, status: u16, location: Option<String>) -> Self {
        Self {
            url: url.into(),
            status,
            location,
        }
    }

    /// A 3xx status carrying a non-empty `Location` header.
    pub fn redirect_target(&self) -> Option<&str> {
        if !(300..=399).contains(&self.status) {
            return None;
        }

        self.location
            .as_deref()
            .map(str::trim)
            .filter(|l| !l.is_empty())
    }

    pub fn is_success(&self) -> bool {
        (200..=299).contains(&self.status)
    }
}

/// Issues one body-less request without following redirects.
///
/// # Implementations
///
/// - [`crate::infrastructure::network::ReqwestFetcher`] - `reqwest` HEAD client
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait HttpFetcher: Send + Sync {
    /// # Errors
    ///
    /// Returns [`TransportError`] when no HTTP response was received
    /// (DNS failure, refused connection, timeout, TLS failure).
    async fn fetch(&self, url: &str) -> Result<HopResponse, TransportError>;
}

/// Binary "is my own network up" check.
///
/// Only consulted after a request to a target has already failed, to tell a broken
/// target apart from a dead local link.
///
/// # Implementations
///
/// - [`crate::infrastructure::network::GatewayProbe`] - HEAD against a fixed local address
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ConnectivityProbe: Send + Sync {
    async fn is_local_network_up(&self) -> bool;
}
