//! Utility modules supporting the mining pipeline.
//!
//! - [`HttpClient`]: reqwest client that adds the API key header to every request
//! - [`clean`]: the token cleaning pipeline (links, digits, punctuation, stopwords, stemming)
//! - [`write_article_table`], [`TsvCitationSink`]: tab-separated output
//! - [`articles_table`], [`citations_table`]: terminal summaries
//!
//! # Cleaning
//!
//! ```rust
//! use scidir_miner::utils::{clean, CleanOptions};
//!
//! let tokens = ["Visit", "https://example.org", "the", "3rd", "(results)."];
//! let cleaned = clean(&tokens, &CleanOptions::basic());
//! assert_eq!(cleaned, vec!["visit", "the", "results"]);
//! ```

pub mod clean;
mod display;
mod http;
mod tsv;

pub use clean::{clean, clean_text, tokenize, CleanOptions};
pub use display::{articles_table, citations_table, is_terminal, truncate_title};
pub use http::{HttpClient, API_KEY_HEADER};
pub use tsv::{save_article_table, write_article_table, CitationSink, TsvCitationSink};
