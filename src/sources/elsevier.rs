//! Elsevier source: ScienceDirect search and full text, Scopus citations.

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use url::Url;

use crate::config::{Config, Endpoints, PagingConfig};
use crate::models::{Article, Field};
use crate::sources::{Source, SourceError};
use crate::utils::HttpClient;

/// Elsevier research source
///
/// Every request carries the configured API key. Search, article and
/// citation operations live in sibling modules as further `impl` blocks.
#[derive(Debug, Clone)]
pub struct ElsevierSource {
    pub(super) client: HttpClient,
    pub(super) endpoints: Endpoints,
    pub(super) paging: PagingConfig,
}

impl ElsevierSource {
    /// Create a source from configuration
    pub fn new(config: &Config) -> Result<Self, SourceError> {
        config
            .validate()
            .map_err(|e| SourceError::InvalidRequest(e.to_string()))?;
        let client = HttpClient::new(&config.http, &config.api_key)?;
        Ok(Self::with_client(client, config))
    }

    /// Create with a custom HTTP client (for testing)
    pub fn with_client(client: HttpClient, config: &Config) -> Self {
        Self {
            client,
            endpoints: config.endpoints.clone(),
            paging: config.paging.clone(),
        }
    }

    /// Identifiers combined into one citation query
    pub fn batch_size(&self) -> usize {
        self.paging.batch_size
    }

    /// GET a URL and return the body, failing on non-success status
    pub(super) async fn get_text(&self, url: Url, accept: &str) -> Result<String, SourceError> {
        tracing::debug!(%url, accept, "GET");

        let response = self
            .client
            .get(url.clone())
            .header(reqwest::header::ACCEPT, accept)
            .send()
            .await
            .map_err(|e| SourceError::Network(format!("Request to {} failed: {}", url, e)))?;

        let status = response.status();
        if !status.is_success() {
            return Err(SourceError::Api(format!(
                "{} returned status: {}",
                url.path(),
                status
            )));
        }

        response
            .text()
            .await
            .map_err(|e| SourceError::Network(format!("Failed to read response: {}", e)))
    }

    /// GET a URL and deserialize its JSON body
    pub(super) async fn get_json<T: DeserializeOwned>(&self, url: Url) -> Result<T, SourceError> {
        let body = self.get_text(url, "application/json").await?;
        Ok(serde_json::from_str(&body)?)
    }
}

#[async_trait]
impl Source for ElsevierSource {
    async fn fetch_links(
        &self,
        query: &str,
        target_count: usize,
    ) -> Result<Vec<String>, SourceError> {
        ElsevierSource::fetch_links(self, query, target_count).await
    }

    async fn fetch_article(&self, link: &str) -> Result<Article, SourceError> {
        ElsevierSource::fetch_article(self, link).await
    }

    async fn citation_count(&self, identifier: &Field<u64>) -> Field<u64> {
        ElsevierSource::citation_count(self, identifier).await
    }
}
