//! HTTP client utilities.

use reqwest::{Client, IntoUrl, RequestBuilder};
use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use crate::config::HttpConfig;
use crate::sources::SourceError;

/// Header carrying the Elsevier API key
pub const API_KEY_HEADER: &str = "X-ELS-APIKey";

/// Shared HTTP client that authenticates every request
#[derive(Clone)]
pub struct HttpClient {
    client: Arc<Client>,
    api_key: Arc<str>,
}

impl HttpClient {
    /// Create a new HTTP client from configuration
    pub fn new(config: &HttpConfig, api_key: &str) -> Result<Self, SourceError> {
        let client = Client::builder()
            .user_agent(config.user_agent.as_str())
            .timeout(Duration::from_secs(config.timeout_secs))
            .connect_timeout(Duration::from_secs(config.connect_timeout_secs))
            .pool_idle_timeout(Duration::from_secs(90))
            .build()
            .map_err(|e| SourceError::Network(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self::from_client(Arc::new(client), api_key))
    }

    /// Create from an existing reqwest Client
    pub fn from_client(client: Arc<Client>, api_key: &str) -> Self {
        Self {
            client,
            api_key: Arc::from(api_key),
        }
    }

    /// Start an authenticated GET request
    pub fn get<U: IntoUrl>(&self, url: U) -> RequestBuilder {
        self.client
            .get(url)
            .header(API_KEY_HEADER, self.api_key.as_ref())
    }
}

impl fmt::Debug for HttpClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HttpClient")
            .field("api_key", &"<redacted>")
            .finish_non_exhaustive()
    }
}
