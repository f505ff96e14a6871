//! Citation record resolved from a Scopus search entry.

use serde::{Deserialize, Serialize};

/// Bibliographic fields resolved for one requested identifier
///
/// Field order matches the columns of the citation TSV log.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CitationRecord {
    /// The identifier as requested
    pub identifier: String,
    /// `prism:coverDate`
    pub cover_date: String,
    /// `citedby-count`
    pub cited_by_count: u64,
    /// `dc:title`
    pub title: String,
    /// `pubmed-id` echoed by Scopus
    pub pubmed_id: String,
}
