//! Reachability checks
//!
//! A check only answers "did the endpoint respond, and with which status". The
//! timeout and the ok/not-ok decision belong to the availability prober.

use async_trait::async_trait;

use crate::config::{ProbeConfig, ProbeMethod};
use crate::errors::{AppResult, ProbeError, ProbeResult};
use crate::utils::{StandardHttpClient, UrlUtils};

/// Issues one reachability request against a stream URL
#[async_trait]
pub trait ReachabilityCheck: Send + Sync {
    /// Returns the HTTP status the endpoint answered with
    async fn check(&self, url: &str) -> ProbeResult<u16>;
}

/// HTTP implementation backed by reqwest.
///
/// Only the response head is awaited; live stream bodies are never read.
pub struct HttpReachabilityChecker {
    http_client: StandardHttpClient,
    method: ProbeMethod,
}

impl HttpReachabilityChecker {
    pub fn new(config: &ProbeConfig) -> AppResult<Self> {
        let http_client =
            StandardHttpClient::with_connection_timeout(config.timeout, &config.user_agent)?;
        Ok(Self {
            http_client,
            method: config.method,
        })
    }
}

#[async_trait]
impl ReachabilityCheck for HttpReachabilityChecker {
    async fn check(&self, url: &str) -> ProbeResult<u16> {
        let client = self.http_client.inner_client();
        let request = match self.method {
            ProbeMethod::Get => client.get(url),
            ProbeMethod::Head => client.head(url),
        };

        let response = request
            .send()
            .await
            .map_err(|e| ProbeError::network(UrlUtils::obfuscate_credentials(&e.to_string())))?;

        Ok(response.status().as_u16())
    }
}
