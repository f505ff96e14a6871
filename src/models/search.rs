//! Search pagination state.

use url::Url;

/// One page of a ScienceDirect search
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageRequest {
    pub query: String,
    /// `None` for the first page, which is requested without an offset
    pub start: Option<usize>,
    pub count: usize,
}

impl PageRequest {
    /// Plan every page needed to request `target_count` results.
    ///
    /// The first page has no offset; later pages start at
    /// `page_size + 1`, `2 * page_size + 1`, ... up to and including
    /// `target_count`.
    pub fn plan(query: &str, target_count: usize, page_size: usize) -> Vec<PageRequest> {
        let page_size = page_size.max(1);
        let first = PageRequest {
            query: query.to_string(),
            start: None,
            count: page_size,
        };

        std::iter::once(first)
            .chain(
                (page_size + 1..=target_count)
                    .step_by(page_size)
                    .map(|start| PageRequest {
                        query: query.to_string(),
                        start: Some(start),
                        count: page_size,
                    }),
            )
            .collect()
    }

    /// Build the page URL against a search endpoint
    pub fn url(&self, base: &str) -> Result<Url, url::ParseError> {
        let mut url = Url::parse(base)?;
        {
            let mut pairs = url.query_pairs_mut();
            pairs
                .append_pair("query", &self.query)
                .append_pair("count", &self.count.to_string());
            if let Some(start) = self.start {
                pairs.append_pair("start", &start.to_string());
            }
        }
        Ok(url)
    }
}
