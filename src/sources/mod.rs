//! Data sources for the mining pipeline.
//!
//! The [`Source`] trait is the seam between the batch runner and the remote
//! API. [`ElsevierSource`] talks to ScienceDirect and Scopus; [`MockSource`]
//! serves canned articles for tests.
//!
//! Requests are issued one at a time and never retried. A failed search page
//! is fatal to the caller; failures while resolving an individual article
//! field become a [`FieldError`](crate::models::FieldError) instead.

mod article;
mod citations;
mod elsevier;
mod search;

pub mod mock;

pub use elsevier::ElsevierSource;
pub use mock::MockSource;

use crate::models::{Article, Field, FieldError};
use async_trait::async_trait;

/// Operations the batch runner needs from a search-and-retrieval backend.
#[async_trait]
pub trait Source: Send + Sync + std::fmt::Debug {
    /// Collect result links for `query`, paging until `target_count` results
    /// have been requested
    async fn fetch_links(&self, query: &str, target_count: usize)
        -> Result<Vec<String>, SourceError>;

    /// Retrieve and parse one article
    async fn fetch_article(&self, link: &str) -> Result<Article, SourceError>;

    /// Look up the citation count for a resolved identifier
    async fn citation_count(&self, identifier: &Field<u64>) -> Field<u64>;
}

/// Errors that can occur when interacting with a source
#[derive(Debug, thiserror::Error)]
pub enum SourceError {
    /// Network or HTTP error
    #[error("Network error: {0}")]
    Network(String),

    /// Parsing error (XML, JSON)
    #[error("Parse error: {0}")]
    Parse(String),

    /// Invalid request parameters
    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    /// API error from the source
    #[error("API error: {0}")]
    Api(String),

    /// IO error (file system)
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// TSV output error
    #[error("TSV error: {0}")]
    Csv(#[from] csv::Error),
}

impl From<reqwest::Error> for SourceError {
    fn from(err: reqwest::Error) -> Self {
        SourceError::Network(err.to_string())
    }
}

impl From<serde_json::Error> for SourceError {
    fn from(err: serde_json::Error) -> Self {
        SourceError::Parse(format!("JSON: {}", err))
    }
}

impl From<quick_xml::Error> for SourceError {
    fn from(err: quick_xml::Error) -> Self {
        SourceError::Parse(format!("XML: {}", err))
    }
}

impl From<url::ParseError> for SourceError {
    fn from(err: url::ParseError) -> Self {
        SourceError::InvalidRequest(format!("URL: {}", err))
    }
}

impl From<SourceError> for FieldError {
    fn from(err: SourceError) -> Self {
        match err {
            SourceError::Parse(msg) => FieldError::Parse(msg),
            other => FieldError::Network(other.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_source_error_to_field_error() {
        let parse: FieldError = SourceError::Parse("bad".into()).into();
        assert_eq!(parse, FieldError::Parse("bad".into()));

        let api: FieldError = SourceError::Api("status 500".into()).into();
        assert!(matches!(api, FieldError::Network(msg) if msg.contains("500")));
    }
}
