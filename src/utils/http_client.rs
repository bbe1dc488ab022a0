use std::time::Duration;

use reqwest::Client;
use tracing::debug;

use crate::errors::{AppResult, SourceError, SourceResult};
use crate::utils::url::UrlUtils;

/// Thin reqwest wrapper shared by playlist acquisition and probing
#[derive(Clone)]
pub struct StandardHttpClient {
    client: Client,
}

impl StandardHttpClient {
    /// Create new HTTP client with a total request timeout
    pub fn with_timeout(timeout: Duration, user_agent: &str) -> AppResult<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .user_agent(user_agent)
            .build()?;

        Ok(Self { client })
    }

    /// Create new HTTP client with only a connection timeout.
    ///
    /// Callers are expected to bound the whole request themselves.
    pub fn with_connection_timeout(connect_timeout: Duration, user_agent: &str) -> AppResult<Self> {
        let client = Client::builder()
            .connect_timeout(connect_timeout)
            .user_agent(user_agent)
            .build()?;

        Ok(Self { client })
    }

    /// Fetch URL and return its body as text
    pub async fn fetch_text(&self, url: &str) -> SourceResult<String> {
        let safe_url = UrlUtils::obfuscate_credentials(url);
        debug!("Fetching text content from: {}", safe_url);

        let response = self.client.get(url).send().await.map_err(|e| {
            if e.is_timeout() {
                SourceError::Timeout {
                    url: safe_url.clone(),
                }
            } else {
                SourceError::network(&safe_url, UrlUtils::obfuscate_credentials(&e.to_string()))
            }
        })?;

        let status = response.status();
        if !status.is_success() {
            return Err(SourceError::Http {
                status: status.as_u16(),
                url: safe_url,
            });
        }

        let content = response.text().await.map_err(|e| SourceError::Decode {
            origin: safe_url.clone(),
            message: e.to_string(),
        })?;

        debug!("Successfully fetched {} characters of text content", content.len());
        Ok(content)
    }

    /// Get underlying reqwest client for custom operations
    pub fn inner_client(&self) -> &Client {
        &self.client
    }
}
