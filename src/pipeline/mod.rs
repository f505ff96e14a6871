//! Batch runner: search, fetch, clean and tabulate.
//!
//! Links are processed strictly in order. A failed search page aborts the
//! run; a failed article is logged, counted and skipped. Closed-access
//! articles never reach the table.

use std::sync::Arc;

use crate::models::{Article, ArticleRecord, ArticleTable, Field, OpenArticle};
use crate::sources::{Source, SourceError};
use crate::utils::{clean, CleanOptions};

/// What happened to one link
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LinkOutcome {
    /// An open-access article was added to the table
    Recorded,
    /// The article is not open access
    SkippedClosed,
    /// Retrieval or parsing failed
    Failed,
}

/// Turns a search query into an [`ArticleTable`]
#[derive(Debug, Clone)]
pub struct BatchRunner {
    source: Arc<dyn Source>,
    options: CleanOptions,
}

impl BatchRunner {
    pub fn new(source: Arc<dyn Source>) -> Self {
        Self {
            source,
            options: CleanOptions::default(),
        }
    }

    /// Use different cleaning options for abstracts and bodies
    pub fn with_options(mut self, options: CleanOptions) -> Self {
        self.options = options;
        self
    }

    /// Search for `query` and tabulate every open-access result
    pub async fn run(&self, query: &str, target_count: usize) -> Result<ArticleTable, SourceError> {
        let links = self.source.fetch_links(query, target_count).await?;
        Ok(self.process_links(&links, |_, _| {}).await)
    }

    /// Tabulate the given links, reporting each outcome to `on_link`
    pub async fn process_links<F>(&self, links: &[String], mut on_link: F) -> ArticleTable
    where
        F: FnMut(&str, LinkOutcome),
    {
        let mut table = ArticleTable::new();

        for link in links {
            let outcome = match self.source.fetch_article(link).await {
                Ok(Article::Open(article)) => {
                    let record = self.assemble(article).await;
                    table.rows.push(record);
                    LinkOutcome::Recorded
                }
                Ok(Article::Closed { .. }) => {
                    tracing::debug!(link = %link, "not open access, skipping");
                    table.skipped_closed += 1;
                    LinkOutcome::SkippedClosed
                }
                Err(e) => {
                    tracing::warn!(link = %link, error = %e, "failed to fetch article");
                    table.failed += 1;
                    LinkOutcome::Failed
                }
            };
            on_link(link, outcome);
        }

        tracing::info!(
            recorded = table.rows.len(),
            closed = table.skipped_closed,
            failed = table.failed,
            "batch run complete"
        );
        table
    }

    async fn assemble(&self, article: OpenArticle) -> ArticleRecord {
        let citation_count = self.source.citation_count(&article.identifier).await;
        ArticleRecord {
            link: article.link,
            identifier: article.identifier,
            title: article.title,
            abstract_tokens: self.clean_field(article.abstract_tokens),
            body: self.clean_field(article.body),
            citation_count,
        }
    }

    fn clean_field(&self, tokens: Field<Vec<String>>) -> Field<Vec<String>> {
        tokens.map(|tokens| clean(&tokens, &self.options))
    }
}

/// Output file name for a batch run, derived from the query and count
pub fn output_file_name(query: &str, target_count: usize) -> String {
    let stem: String = query
        .trim()
        .chars()
        .map(|c| if c.is_alphanumeric() { c } else { '_' })
        .collect();
    let stem = if stem.is_empty() { "query".to_string() } else { stem };
    format!("{}_{}.tsv", stem, target_count)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::FieldError;
    use crate::sources::mock::{make_closed_article, make_open_article};
    use crate::sources::MockSource;

    fn runner(source: MockSource) -> (Arc<MockSource>, BatchRunner) {
        let source = Arc::new(source);
        let runner = BatchRunner::new(source.clone()).with_options(CleanOptions::basic());
        (source, runner)
    }

    #[tokio::test]
    async fn test_closed_articles_never_recorded() {
        let (_, runner) = runner(
            MockSource::new()
                .with_article(make_open_article("L1", 1, "First", "Body one."))
                .with_article(make_closed_article("L2"))
                .with_article(make_open_article("L3", 3, "Third", "Body three.")),
        );

        let table = runner.run("q", 10).await.unwrap();
        let links: Vec<&str> = table.rows.iter().map(|r| r.link.as_str()).collect();
        assert_eq!(links, vec!["L1", "L3"]);
        assert_eq!(table.skipped_closed, 1);
        assert_eq!(table.failed, 0);
    }

    #[tokio::test]
    async fn test_failed_article_does_not_abort() {
        let (source, runner) = runner(
            MockSource::new()
                .with_broken_link("L0")
                .with_article(make_open_article("L1", 1, "First", "Body")),
        );

        let table = runner.run("q", 10).await.unwrap();
        assert_eq!(table.len(), 1);
        assert_eq!(table.failed, 1);
        assert_eq!(source.fetched(), vec!["L0", "L1"]);
    }

    #[tokio::test]
    async fn test_fields_are_cleaned_and_citations_resolved() {
        let (_, runner) = runner(
            MockSource::new()
                .with_article(make_open_article(
                    "L1",
                    42,
                    "Heart Failure",
                    "See https://x.org for 3 (more) DATA.",
                ))
                .with_citations(42, 9),
        );

        let table = runner.run("q", 10).await.unwrap();
        let record = &table.rows[0];
        assert_eq!(record.title, Ok("Heart Failure".to_string()));
        assert_eq!(
            record.abstract_tokens.as_deref().unwrap(),
            ["heart", "failure"]
        );
        assert_eq!(
            record.body.as_deref().unwrap(),
            ["see", "for", "more", "data"]
        );
        assert_eq!(record.citation_count, Ok(9));
    }

    #[tokio::test]
    async fn test_unresolved_identifier_skips_citation_lookup() {
        let article = Article::Open(OpenArticle {
            link: "L1".to_string(),
            title: Err(FieldError::Missing),
            identifier: Err(FieldError::Parse("x".into())),
            abstract_tokens: Err(FieldError::Missing),
            body: Ok(vec!["Body".into()]),
        });
        let (_, runner) = runner(MockSource::new().with_article(article));

        let table = runner.run("q", 10).await.unwrap();
        assert_eq!(table.rows[0].citation_count, Err(FieldError::Unresolved));
        assert_eq!(table.rows[0].abstract_tokens, Err(FieldError::Missing));
    }

    #[tokio::test]
    async fn test_progress_callback_sees_every_link() {
        let (_, runner) = runner(
            MockSource::new()
                .with_article(make_closed_article("L1"))
                .with_broken_link("L2")
                .with_article(make_open_article("L3", 3, "T", "B")),
        );
        let links = vec!["L1".to_string(), "L2".to_string(), "L3".to_string()];

        let mut seen = Vec::new();
        runner
            .process_links(&links, |link, outcome| seen.push((link.to_string(), outcome)))
            .await;
        assert_eq!(
            seen,
            vec![
                ("L1".to_string(), LinkOutcome::SkippedClosed),
                ("L2".to_string(), LinkOutcome::Failed),
                ("L3".to_string(), LinkOutcome::Recorded),
            ]
        );
    }

    #[test]
    fn test_output_file_name() {
        assert_eq!(output_file_name("heart disease", 5000), "heart_disease_5000.tsv");
        assert_eq!(output_file_name("  ", 10), "query_10.tsv");
        assert_eq!(output_file_name("TITLE(cancer)", 200), "TITLE_cancer__200.tsv");
    }
}
