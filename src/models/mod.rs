//! Core data models for articles, citation records and search pagination.

mod article;
mod citation;
mod search;

pub use article::{Article, ArticleRecord, ArticleTable, Field, FieldError, OpenArticle};
pub use citation::CitationRecord;
pub use search::PageRequest;
