//! Fetching capability and detail documents.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use tracing::{debug, instrument};

use crate::config::WebdataConfig;
use crate::error::{FetchErrorKind, SourceFetchError};

/// Retrieves the text of a capability or detail document.
#[async_trait]
pub trait CapabilityFetcher: Send + Sync {
    /// Fetch `url`, failing with [`FetchErrorKind::Timeout`] after `timeout`.
    async fn fetch_text(&self, url: &str, timeout: Duration) -> Result<String, SourceFetchError>;
}

/// [`CapabilityFetcher`] over HTTP.
pub struct HttpFetcher {
    client: Client,
}

impl HttpFetcher {
    pub fn new(config: &WebdataConfig) -> Result<Self, reqwest::Error> {
        let client = Client::builder()
            .connect_timeout(config.connect_timeout)
            .user_agent(config.user_agent.as_str())
            .build()?;

        Ok(Self { client })
    }

    pub fn with_client(client: Client) -> Self {
        Self { client }
    }
}

fn classify(url: &str, timeout: Duration, error: reqwest::Error, reading_body: bool) -> SourceFetchError {
    let kind = if error.is_timeout() {
        FetchErrorKind::Timeout(timeout)
    } else if reading_body {
        FetchErrorKind::Body(error.to_string())
    } else {
        FetchErrorKind::Transport(error.to_string())
    };
    SourceFetchError::new(url, kind)
}

#[async_trait]
impl CapabilityFetcher for HttpFetcher {
    #[instrument(skip(self), fields(url = %url))]
    async fn fetch_text(&self, url: &str, timeout: Duration) -> Result<String, SourceFetchError> {
        let response = self
            .client
            .get(url)
            .timeout(timeout)
            .send()
            .await
            .map_err(|e| classify(url, timeout, e, false))?;

        let status = response.status();
        if !status.is_success() {
            return Err(SourceFetchError::new(url, FetchErrorKind::Status(status.as_u16())));
        }

        let body = response
            .text()
            .await
            .map_err(|e| classify(url, timeout, e, true))?;
        debug!(bytes = body.len(), "Fetched document");
        Ok(body)
    }
}
