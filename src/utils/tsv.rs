//! Tab-separated output for article tables and citation logs.

use std::fs::OpenOptions;
use std::io::Write;
use std::path::Path;

use crate::models::{ArticleRecord, ArticleTable, CitationRecord};
use crate::sources::SourceError;

fn tsv_writer<W: Write>(writer: W, has_headers: bool) -> csv::Writer<W> {
    csv::WriterBuilder::new()
        .delimiter(b'\t')
        .has_headers(has_headers)
        .from_writer(writer)
}

/// Write an article table with a header row
pub fn write_article_table<W: Write>(table: &ArticleTable, writer: W) -> Result<(), SourceError> {
    let mut out = tsv_writer(writer, false);
    out.write_record(ArticleRecord::HEADER)?;
    for record in &table.rows {
        out.write_record(record.to_row())?;
    }
    out.flush()?;
    Ok(())
}

/// Write an article table to a file, replacing any existing file
pub fn save_article_table(table: &ArticleTable, path: &Path) -> Result<(), SourceError> {
    let file = std::fs::File::create(path)?;
    write_article_table(table, file)
}

/// Destination for resolved citation records
///
/// Records are handed over one at a time as they resolve.
pub trait CitationSink {
    fn append(&mut self, record: &CitationRecord) -> Result<(), SourceError>;
}

impl CitationSink for Vec<CitationRecord> {
    fn append(&mut self, record: &CitationRecord) -> Result<(), SourceError> {
        self.push(record.clone());
        Ok(())
    }
}

/// Append to both sinks, the first one first
impl<A: CitationSink, B: CitationSink> CitationSink for (A, B) {
    fn append(&mut self, record: &CitationRecord) -> Result<(), SourceError> {
        self.0.append(record)?;
        self.1.append(record)
    }
}

/// Headerless TSV log that flushes after every record
#[derive(Debug)]
pub struct TsvCitationSink<W: Write> {
    writer: csv::Writer<W>,
    written: usize,
}

impl TsvCitationSink<std::fs::File> {
    /// Open a log file in append mode, creating it if needed
    pub fn open_append(path: &Path) -> Result<Self, SourceError> {
        let file = OpenOptions::new().create(true).append(true).open(path)?;
        Ok(Self::from_writer(file))
    }
}

impl<W: Write> TsvCitationSink<W> {
    pub fn from_writer(writer: W) -> Self {
        Self {
            writer: tsv_writer(writer, false),
            written: 0,
        }
    }

    /// Records appended through this sink
    pub fn written(&self) -> usize {
        self.written
    }

    /// Flush and return the underlying writer
    pub fn into_inner(self) -> Result<W, SourceError> {
        self.writer
            .into_inner()
            .map_err(|e| SourceError::Io(e.into_error()))
    }
}

impl<W: Write> CitationSink for TsvCitationSink<W> {
    fn append(&mut self, record: &CitationRecord) -> Result<(), SourceError> {
        self.writer.serialize(record)?;
        self.writer.flush()?;
        self.written += 1;
        Ok(())
    }
}
