//! Connectivity probe against a fixed, always-reachable address.

use std::time::Duration;

use super::service::ConnectivityProbe;
use async_trait::async_trait;
use tracing::{debug, warn};

/// Sends one HEAD request to a local gateway (or any address assumed reachable).
///
/// Any HTTP response, whatever its status, counts as "up". Only transport errors
/// count as "down". The address is a liveness signal, never a data source.
#[derive(Clone)]
pub struct GatewayProbe {
    client: reqwest::Client,
    target: String,
}

impl GatewayProbe {
    /// # Errors
    ///
    /// Fails if the HTTP client cannot be built.
    pub fn new(target: impl Into<String>, timeout: Duration) -> Result<Self, reqwest::Error> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .redirect(reqwest::redirect::Policy::none())
            .build()?;

        Ok(Self {
            client,
            target: target.into(),
        })
    }

    pub fn target(&self) -> &str {
        &self.target
    }
}

#[async_trait]
impl ConnectivityProbe for GatewayProbe {
    async fn is_local_network_up(&self) -> bool {
        match self.client.head(&self.target).send().await {
            Ok(response) => {
                debug!("Connectivity probe {} answered {}", self.target, response.status());
                true
            }
            Err(e) => {
                warn!("Connectivity probe {} failed: {}", self.target, e);
                false
            }
        }
    }
}
