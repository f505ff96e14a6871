//! ScienceDirect search pagination.

use serde::Deserialize;

use crate::models::PageRequest;
use crate::sources::{ElsevierSource, SourceError};

#[derive(Debug, Deserialize)]
struct SearchEnvelope {
    #[serde(rename = "search-results")]
    results: SearchResults,
}

#[derive(Debug, Deserialize)]
struct SearchResults {
    entry: Vec<SearchEntry>,
}

#[derive(Debug, Deserialize)]
struct SearchEntry {
    #[serde(rename = "prism:url")]
    url: Option<String>,
    error: Option<String>,
}

impl ElsevierSource {
    /// Collect result links for `query`, page by page.
    ///
    /// Any failed page aborts the whole collection.
    pub async fn fetch_links(
        &self,
        query: &str,
        target_count: usize,
    ) -> Result<Vec<String>, SourceError> {
        let pages = PageRequest::plan(query, target_count, self.paging.page_size);
        let mut links = Vec::new();

        for page in &pages {
            let url = page.url(&self.endpoints.search_url)?;
            let envelope: SearchEnvelope = self.get_json(url).await?;
            let page_links = Self::parse_search_page(envelope);
            tracing::debug!(start = ?page.start, found = page_links.len(), "search page");
            links.extend(page_links);
        }

        tracing::info!(query, pages = pages.len(), links = links.len(), "search complete");
        Ok(links)
    }

    fn parse_search_page(envelope: SearchEnvelope) -> Vec<String> {
        envelope
            .results
            .entry
            .into_iter()
            .filter_map(|entry| match entry.url {
                Some(url) => Some(url),
                None => {
                    if let Some(error) = entry.error {
                        tracing::debug!(error = %error, "search entry without link");
                    } else {
                        tracing::warn!("search entry without prism:url");
                    }
                    None
                }
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_search_page() {
        let json = r#"{
            "search-results": {
                "opensearch:totalResults": "2",
                "entry": [
                    {"prism:url": "https://api.elsevier.com/content/article/pii/S1", "dc:title": "A"},
                    {"dc:title": "no link"},
                    {"prism:url": "https://api.elsevier.com/content/article/pii/S2"}
                ]
            }
        }"#;
        let envelope: SearchEnvelope = serde_json::from_str(json).unwrap();
        let links = ElsevierSource::parse_search_page(envelope);
        assert_eq!(
            links,
            vec![
                "https://api.elsevier.com/content/article/pii/S1",
                "https://api.elsevier.com/content/article/pii/S2"
            ]
        );
    }

    #[test]
    fn test_empty_result_set() {
        let json = r#"{"search-results": {"entry": [{"@_fa": "true", "error": "Result set was empty"}]}}"#;
        let envelope: SearchEnvelope = serde_json::from_str(json).unwrap();
        assert!(ElsevierSource::parse_search_page(envelope).is_empty());
    }

    #[test]
    fn test_missing_entry_is_an_error() {
        let json = r#"{"service-error": {"status": {"statusCode": "INVALID_INPUT"}}}"#;
        assert!(serde_json::from_str::<SearchEnvelope>(json).is_err());
    }
}
