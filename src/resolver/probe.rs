//! Reachability probes
//!
//! A probe is a single HTTP GET that does not follow redirects and succeeds
//! only on status `200`. Every failure mode collapses into a
//! [`ProbeOutcome`] instead of an error.

use crate::config::HttpConfig;
use async_trait::async_trait;
use reqwest::{redirect::Policy, Client, StatusCode};
use url::Url;

/// Result of one reachability probe
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProbeOutcome {
    /// The URL answered with exactly `200`
    Reachable,

    /// The URL answered with any other status (redirects and 403 included)
    UnexpectedStatus(u16),

    /// The request timed out
    Timeout,

    /// Connection or TLS handshake failure
    ConnectFailed(String),

    /// Any other request failure
    RequestFailed(String),
}

impl ProbeOutcome {
    pub fn is_reachable(&self) -> bool {
        matches!(self, Self::Reachable)
    }
}

/// Performs reachability checks for the resolver
#[async_trait]
pub trait Probe: Send + Sync {
    async fn probe(&self, url: &Url) -> ProbeOutcome;
}

/// Builds the HTTP client used for probing
///
/// Redirects are never followed: the probe validates the exact URL that will
/// be stored, not wherever it points to.
pub fn build_probe_client(config: &HttpConfig) -> Result<Client, reqwest::Error> {
    Client::builder()
        .user_agent(config.user_agent.as_str())
        .timeout(config.request_timeout())
        .connect_timeout(config.connect_timeout())
        .redirect(Policy::none())
        .gzip(true)
        .brotli(true)
        .build()
}

/// Probe backed by a real HTTP client
#[derive(Debug, Clone)]
pub struct HttpProbe {
    client: Client,
}

impl HttpProbe {
    pub fn new(config: &HttpConfig) -> Result<Self, reqwest::Error> {
        Ok(Self {
            client: build_probe_client(config)?,
        })
    }
}

#[async_trait]
impl Probe for HttpProbe {
    async fn probe(&self, url: &Url) -> ProbeOutcome {
        match self.client.get(url.clone()).send().await {
            Ok(response) if response.status() == StatusCode::OK => ProbeOutcome::Reachable,
            Ok(response) => {
                let status = response.status().as_u16();
                if status == 403 {
                    tracing::debug!("Probe of {} was refused with 403", url);
                }
                ProbeOutcome::UnexpectedStatus(status)
            }
            Err(e) => classify_error(&e),
        }
    }
}

/// Maps a request error to a probe outcome
fn classify_error(e: &reqwest::Error) -> ProbeOutcome {
    if e.is_timeout() {
        ProbeOutcome::Timeout
    } else if e.is_connect() {
        ProbeOutcome::ConnectFailed(e.to_string())
    } else {
        ProbeOutcome::RequestFailed(e.to_string())
    }
}
