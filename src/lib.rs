//! # scidir-miner
//!
//! Client and text-mining pipeline for the Elsevier ScienceDirect and Scopus
//! REST APIs.
//!
//! ## Architecture
//!
//! The library is organized into several modules:
//!
//! - [`models`]: Core data structures (ArticleRecord, CitationRecord, etc.)
//! - [`sources`]: The [`Source`] trait and the Elsevier implementation
//!   (search pagination, article retrieval, citation lookup)
//! - [`pipeline`]: The batch runner that turns a search query into a table
//! - [`utils`]: HTTP client, text cleaning, TSV output and terminal display
//! - [`config`]: Configuration management

pub mod config;
pub mod models;
pub mod pipeline;
pub mod sources;
pub mod utils;

// Re-export commonly used types
pub use crate::config::Config;
pub use models::{ArticleRecord, CitationRecord};
pub use pipeline::BatchRunner;
pub use sources::{ElsevierSource, Source, SourceError};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
