//! Outbound HTTP: redirect hops and the connectivity probe.

mod connectivity;
mod http_fetcher;
mod service;

pub use connectivity::GatewayProbe;
pub use http_fetcher::ReqwestFetcher;
pub use service::{ConnectivityProbe, HopResponse, HttpFetcher, TransportError};

#[cfg(test)]
pub use service::{MockConnectivityProbe, MockHttpFetcher};
