//! Scopus citation lookups, single and batched.

use serde::Deserialize;
use serde_json::{Map, Value};
use url::Url;

use crate::config::MAX_BATCH_SIZE;
use crate::models::{CitationRecord, Field};
use crate::sources::{ElsevierSource, SourceError};
use crate::utils::CitationSink;

type Entry = Map<String, Value>;

/// Entry fields requested for each batch lookup
const BATCH_FIELDS: &str = "citedby-count,prism:coverDate,dc:title,pubmed-id";

#[derive(Debug, Deserialize)]
struct BatchEnvelope {
    #[serde(rename = "search-results")]
    results: BatchResults,
}

#[derive(Debug, Deserialize)]
struct BatchResults {
    #[serde(default)]
    entry: Vec<Entry>,
}

/// Build the OR query for a batch of PubMed identifiers
pub(crate) fn batch_query(identifiers: &[String]) -> String {
    identifiers
        .iter()
        .map(|id| format!("PMID({})", id))
        .collect::<Vec<_>>()
        .join(" OR ")
}

/// A scalar entry field as a string; Scopus mixes strings and numbers
fn text_field(entry: &Entry, key: &'static str) -> Result<String, &'static str> {
    match entry.get(key) {
        Some(Value::String(s)) => Ok(s.clone()),
        Some(Value::Number(n)) => Ok(n.to_string()),
        _ => Err(key),
    }
}

fn record_from_entry(identifier: &str, entry: &Entry) -> Result<CitationRecord, String> {
    let cover_date = text_field(entry, "prism:coverDate")?;
    let cited_by = text_field(entry, "citedby-count")?;
    let title = text_field(entry, "dc:title")?;
    let pubmed_id = text_field(entry, "pubmed-id")?;

    let cited_by_count = cited_by
        .trim()
        .parse()
        .map_err(|_| format!("citedby-count {:?} is not a count", cited_by))?;

    Ok(CitationRecord {
        identifier: identifier.to_string(),
        cover_date,
        cited_by_count,
        title,
        pubmed_id,
    })
}

/// Pair response entries with requested identifiers.
///
/// Entries that echo a `pubmed-id` are paired with that identifier first.
/// Entries without an echo then take the identifier at their own position
/// if it is still unclaimed. An echo naming nothing requested, or naming an
/// identifier already claimed, drops the entry. Pairs keep response order.
pub(crate) fn pair_entries<'a>(
    identifiers: &'a [String],
    entries: &'a [Entry],
) -> Vec<(&'a str, &'a Entry)> {
    let mut claimed = vec![false; identifiers.len()];
    let mut assigned: Vec<Option<usize>> = vec![None; entries.len()];

    for (position, entry) in entries.iter().enumerate() {
        let Ok(echo) = text_field(entry, "pubmed-id") else {
            continue;
        };
        let found = identifiers
            .iter()
            .enumerate()
            .position(|(i, id)| !claimed[i] && id.trim() == echo.trim());
        match found {
            Some(index) => {
                claimed[index] = true;
                assigned[position] = Some(index);
            }
            None => tracing::warn!(position, echo = %echo, "batch entry echoes no pending identifier"),
        }
    }

    for (position, entry) in entries.iter().enumerate() {
        if assigned[position].is_some() || entry.contains_key("pubmed-id") {
            continue;
        }
        if position < identifiers.len() && !claimed[position] {
            claimed[position] = true;
            assigned[position] = Some(position);
        } else {
            tracing::warn!(position, "unmatched entry in batch response");
        }
    }

    entries
        .iter()
        .zip(assigned)
        .filter_map(|(entry, index)| index.map(|i| (identifiers[i].as_str(), entry)))
        .collect()
}

impl ElsevierSource {
    /// Resolve up to 25 PubMed identifiers with one OR query.
    ///
    /// Each resolved record is appended to `sink` before the next entry is
    /// examined. Entries missing an expected field are skipped with a
    /// warning; a failed request yields no records.
    pub async fn lookup_batch<S: CitationSink + ?Sized>(
        &self,
        identifiers: &[String],
        sink: &mut S,
    ) -> Result<Vec<CitationRecord>, SourceError> {
        if identifiers.len() > MAX_BATCH_SIZE {
            return Err(SourceError::InvalidRequest(format!(
                "batch of {} identifiers exceeds {}",
                identifiers.len(),
                MAX_BATCH_SIZE
            )));
        }
        if identifiers.is_empty() {
            return Ok(Vec::new());
        }

        let mut url = Url::parse(&self.endpoints.scopus_url)?;
        url.query_pairs_mut()
            .append_pair("query", &batch_query(identifiers))
            .append_pair("field", BATCH_FIELDS);

        let envelope: BatchEnvelope = match self.get_json(url).await {
            Ok(envelope) => envelope,
            Err(e) => {
                tracing::warn!(error = %e, first = %identifiers[0], "unable to send batch request");
                return Ok(Vec::new());
            }
        };

        let mut records = Vec::new();
        for (identifier, entry) in pair_entries(identifiers, &envelope.results.entry) {
            match record_from_entry(identifier, entry) {
                Ok(record) => {
                    sink.append(&record)?;
                    records.push(record);
                }
                Err(missing) => {
                    tracing::warn!(identifier, missing = %missing, "unable to retrieve article");
                }
            }
        }

        Ok(records)
    }

    /// Run [`lookup_batch`](Self::lookup_batch) over consecutive chunks of
    /// `identifiers`, including a final partial chunk. Returns the number of
    /// records written.
    pub async fn run_citation_batches<S: CitationSink + ?Sized>(
        &self,
        identifiers: &[String],
        sink: &mut S,
    ) -> Result<usize, SourceError> {
        let batch_size = self.paging.batch_size.clamp(1, MAX_BATCH_SIZE);
        let mut written = 0;

        for (n, chunk) in identifiers.chunks(batch_size).enumerate() {
            let records = self.lookup_batch(chunk, sink).await?;
            tracing::info!(batch = n + 1, requested = chunk.len(), resolved = records.len(), "batch done");
            written += records.len();
        }

        Ok(written)
    }

    /// Citation count for a single PubMed identifier
    pub async fn cited_by(&self, pmid: &str) -> Field<u64> {
        self.single_cited_by(&format!("PMID({})", pmid.trim())).await
    }
}
