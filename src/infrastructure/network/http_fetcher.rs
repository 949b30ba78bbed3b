//! `reqwest`-backed [`HttpFetcher`].

use std::time::Duration;

use super::service::{HopResponse, HttpFetcher, TransportError};
use async_trait::async_trait;
use reqwest::{Method, StatusCode, header};
use tracing::debug;

/// HEAD client with redirects disabled; the resolver follows them itself.
#[derive(Clone)]
pub struct ReqwestFetcher {
    client: reqwest::Client,
}

impl ReqwestFetcher {
    /// Builds the client.
    ///
    /// # Errors
    ///
    /// Fails if the TLS backend cannot be initialised.
    pub fn new(timeout: Duration, user_agent: &str) -> Result<Self, reqwest::Error> {
        let client = reqwest::Client::builder()
            .user_agent(user_agent)
            .timeout(timeout)
            .redirect(reqwest::redirect::Policy::none())
            .build()?;

        Ok(Self { client })
    }

    async fn send(&self, method: Method, url: &str) -> Result<HopResponse, TransportError> {
        let response = self
            .client
            .request(method, url)
            .send()
            .await
            .map_err(|e| transport_error(url, e))?;

        let location = response
            .headers()
            .get(header::LOCATION)
            .and_then(|v| v.to_str().ok())
            .map(|v| v.to_string());

        Ok(HopResponse::new(url, response.status().as_u16(), location))
    }
}

fn transport_error(url: &str, e: reqwest::Error) -> TransportError {
    let url = url.to_string();

    if e.is_builder() {
        TransportError::InvalidUrl {
            url,
            reason: e.to_string(),
        }
    } else if e.is_timeout() {
        TransportError::Timeout { url }
    } else if e.is_connect() {
        TransportError::Connect {
            url,
            reason: e.to_string(),
        }
    } else {
        TransportError::Request {
            url,
            reason: e.to_string(),
        }
    }
}

#[async_trait]
impl HttpFetcher for ReqwestFetcher {
    async fn fetch(&self, url: &str) -> Result<HopResponse, TransportError> {
        let response = self.send(Method::HEAD, url).await?;

        if response.status == StatusCode::METHOD_NOT_ALLOWED.as_u16() {
            debug!("HEAD not allowed by {}, retrying with GET", url);
            return self.send(Method::GET, url).await;
        }

        debug!("{} {} -> {:?}", response.status, url, response.location);
        Ok(response)
    }
}
