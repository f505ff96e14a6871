//! Mock source for testing purposes.

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Mutex;

use crate::models::{Article, Field, FieldError, OpenArticle};
use crate::sources::{Source, SourceError};
use crate::utils::tokenize;

/// A mock source that serves predefined links, articles and citation counts.
#[derive(Debug, Default)]
pub struct MockSource {
    links: Vec<String>,
    articles: HashMap<String, Article>,
    citations: HashMap<u64, u64>,
    fetched: Mutex<Vec<String>>,
}

impl MockSource {
    /// Create a new mock source.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add an article; its link is appended to the search results.
    pub fn with_article(mut self, article: Article) -> Self {
        let link = article.link().to_string();
        self.links.push(link.clone());
        self.articles.insert(link, article);
        self
    }

    /// Append a search result link that has no article behind it.
    pub fn with_broken_link(mut self, link: &str) -> Self {
        self.links.push(link.to_string());
        self
    }

    /// Set the citation count returned for an identifier.
    pub fn with_citations(mut self, identifier: u64, count: u64) -> Self {
        self.citations.insert(identifier, count);
        self
    }

    /// Links passed to `fetch_article`, in call order.
    pub fn fetched(&self) -> Vec<String> {
        self.fetched.lock().map(|g| g.clone()).unwrap_or_default()
    }
}

#[async_trait]
impl Source for MockSource {
    async fn fetch_links(
        &self,
        _query: &str,
        target_count: usize,
    ) -> Result<Vec<String>, SourceError> {
        Ok(self.links.iter().take(target_count).cloned().collect())
    }

    async fn fetch_article(&self, link: &str) -> Result<Article, SourceError> {
        if let Ok(mut fetched) = self.fetched.lock() {
            fetched.push(link.to_string());
        }
        self.articles
            .get(link)
            .cloned()
            .ok_or_else(|| SourceError::Api(format!("{} returned status: 404 Not Found", link)))
    }

    async fn citation_count(&self, identifier: &Field<u64>) -> Field<u64> {
        let id = identifier.as_ref().map_err(|_| FieldError::Unresolved)?;
        self.citations.get(id).copied().ok_or(FieldError::Missing)
    }
}

/// Helper function to create an open-access article for testing.
pub fn make_open_article(link: &str, identifier: u64, title: &str, body: &str) -> Article {
    Article::Open(OpenArticle {
        link: link.to_string(),
        title: Ok(title.to_string()),
        identifier: Ok(identifier),
        abstract_tokens: Ok(tokenize(title)),
        body: Ok(tokenize(body)),
    })
}

/// Helper function to create a closed-access article for testing.
pub fn make_closed_article(link: &str) -> Article {
    Article::Closed {
        link: link.to_string(),
    }
}
