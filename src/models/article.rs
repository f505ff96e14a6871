//! Article models: the parsed XML representation and the output row.

/// Why a field could not be resolved
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum FieldError {
    /// The element or key is absent from the response
    #[error("field not present in response")]
    Missing,

    /// The request for the field failed
    #[error("network error: {0}")]
    Network(String),

    /// The value was present but could not be interpreted
    #[error("parse error: {0}")]
    Parse(String),

    /// A field this one depends on was not resolved
    #[error("dependency not resolved")]
    Unresolved,
}

/// A field that resolves independently of its siblings
pub type Field<T> = Result<T, FieldError>;

/// A fetched article, split on its open-access flag
#[derive(Debug, Clone, PartialEq)]
pub enum Article {
    /// `openaccess` was `"0"`; nothing else was resolved
    Closed { link: String },

    /// Any other `openaccess` value
    Open(OpenArticle),
}

impl Article {
    /// The link the article was fetched from
    pub fn link(&self) -> &str {
        match self {
            Article::Closed { link } => link,
            Article::Open(open) => &open.link,
        }
    }

    pub fn is_open_access(&self) -> bool {
        matches!(self, Article::Open(_))
    }
}

/// Fields parsed once from an open-access article's XML
#[derive(Debug, Clone, PartialEq)]
pub struct OpenArticle {
    pub link: String,
    pub title: Field<String>,
    pub identifier: Field<u64>,
    /// Whitespace-split abstract
    pub abstract_tokens: Field<Vec<String>>,
    /// Whitespace-split body text
    pub body: Field<Vec<String>>,
}

/// One row of the batch output
#[derive(Debug, Clone, PartialEq)]
pub struct ArticleRecord {
    pub link: String,
    pub identifier: Field<u64>,
    pub title: Field<String>,
    pub abstract_tokens: Field<Vec<String>>,
    pub body: Field<Vec<String>>,
    pub citation_count: Field<u64>,
}

impl ArticleRecord {
    /// Column names of the TSV output
    pub const HEADER: [&'static str; 6] =
        ["link", "identifier", "title", "abstract", "text", "citations"];

    /// Render the record as TSV cells; unresolved fields become empty cells
    pub fn to_row(&self) -> [String; 6] {
        [
            self.link.clone(),
            cell(&self.identifier, |id| id.to_string()),
            cell(&self.title, |title| title.clone()),
            cell(&self.abstract_tokens, |tokens| tokens.join(" ")),
            cell(&self.body, |tokens| tokens.join(" ")),
            cell(&self.citation_count, |count| count.to_string()),
        ]
    }
}

fn cell<T>(field: &Field<T>, render: impl FnOnce(&T) -> String) -> String {
    field.as_ref().map(render).unwrap_or_default()
}

/// Accumulated result of a batch run
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ArticleTable {
    /// Open-access articles in link order
    pub rows: Vec<ArticleRecord>,
    /// Links skipped because the article is not open access
    pub skipped_closed: usize,
    /// Links whose retrieval or parsing failed
    pub failed: usize,
}

impl ArticleTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}
