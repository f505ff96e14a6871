//! Run summaries rendered as terminal tables.

use comfy_table::{presets::UTF8_FULL, ContentArrangement, Table};
use std::io::IsTerminal;
use terminal_size::{terminal_size, Width};
use unicode_width::{UnicodeWidthChar, UnicodeWidthStr};

use crate::models::{ArticleTable, CitationRecord, Field};

/// Table width when stdout is not a terminal
const FALLBACK_WIDTH: u16 = 100;

const ELLIPSIS: &str = "...";

/// Whether stderr, where progress is drawn, is a terminal
pub fn is_terminal() -> bool {
    std::io::stderr().is_terminal()
}

fn table_width() -> u16 {
    terminal_size()
        .map(|(Width(width), _)| width)
        .unwrap_or(FALLBACK_WIDTH)
}

/// Shorten a title to `max_width` display columns, marking the cut with `...`
pub fn truncate_title(title: &str, max_width: usize) -> String {
    let title = title.trim();
    if title.width() <= max_width {
        return title.to_string();
    }

    let budget = max_width.saturating_sub(ELLIPSIS.len());
    let mut used = 0;
    let kept: String = title
        .chars()
        .take_while(|c| {
            used += c.width().unwrap_or(0);
            used <= budget
        })
        .collect();
    format!("{}{}", kept, ELLIPSIS)
}

fn show<T: ToString>(field: &Field<T>) -> String {
    match field {
        Ok(value) => value.to_string(),
        Err(_) => "-".to_string(),
    }
}

fn token_count(field: &Field<Vec<String>>) -> String {
    match field {
        Ok(tokens) => tokens.len().to_string(),
        Err(_) => "-".to_string(),
    }
}

fn new_table(header: Vec<&str>) -> Table {
    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_width(table_width())
        .set_header(header);
    table
}

/// Summary table of a batch run: one line per recorded article
pub fn articles_table(table: &ArticleTable, title_width: usize) -> Table {
    let mut out = new_table(vec!["Identifier", "Title", "Abstract", "Body", "Citations"]);
    for record in &table.rows {
        let title = match &record.title {
            Ok(title) => truncate_title(title, title_width),
            Err(_) => "-".to_string(),
        };
        out.add_row(vec![
            show(&record.identifier),
            title,
            token_count(&record.abstract_tokens),
            token_count(&record.body),
            show(&record.citation_count),
        ]);
    }
    out
}

/// Table of resolved citation records
pub fn citations_table(records: &[CitationRecord], title_width: usize) -> Table {
    let mut out = new_table(vec!["Identifier", "Date", "Cited by", "Title", "PubMed"]);
    for record in records {
        out.add_row(vec![
            record.identifier.clone(),
            record.cover_date.clone(),
            record.cited_by_count.to_string(),
            truncate_title(&record.title, title_width),
            record.pubmed_id.clone(),
        ]);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{ArticleRecord, FieldError};

    #[test]
    fn test_truncate_title() {
        assert_eq!(truncate_title("Cardiac remodeling", 10), "Cardiac...");
        assert_eq!(truncate_title("  Short  ", 10), "Short");
        assert_eq!(truncate_title("Heart", 2), "...");
    }

    #[test]
    fn test_truncate_title_counts_columns() {
        // each CJK char is two columns wide
        assert_eq!(truncate_title("心臓病の研究", 7), "心臓...");
    }

    #[test]
    fn test_articles_table_rows() {
        let table = ArticleTable {
            rows: vec![ArticleRecord {
                link: "L1".to_string(),
                identifier: Ok(42),
                title: Ok("Cardiac remodeling".to_string()),
                abstract_tokens: Ok(vec!["a".into(), "b".into(), "c".into()]),
                body: Err(FieldError::Missing),
                citation_count: Err(FieldError::Unresolved),
            }],
            ..ArticleTable::default()
        };
        let rendered = articles_table(&table, 40).to_string();
        assert!(rendered.contains("42"));
        assert!(rendered.contains("Cardiac remodeling"));
        assert!(rendered.contains("Citations"));
    }
}
