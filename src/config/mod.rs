//! Configuration management.
//!
//! Settings are layered: built-in defaults, then an optional TOML file, then
//! `SCIDIR_MINER_*` environment variables, and finally the API key from
//! `ELSKEY`.
//!
//! # Configuration File Format
//!
//! ```toml
//! api_key = "your-elsevier-key"
//!
//! [endpoints]
//! search_url = "https://api.elsevier.com/content/search/sciencedirect"
//! scopus_url = "https://api.elsevier.com/content/search/scopus"
//!
//! [http]
//! timeout_secs = 30
//! connect_timeout_secs = 10
//!
//! [paging]
//! page_size = 200
//! batch_size = 25
//! ```

use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};

/// Environment variable holding the Elsevier API key
pub const API_KEY_ENV: &str = "ELSKEY";

/// Prefix for environment overrides (e.g. `SCIDIR_MINER_HTTP__TIMEOUT_SECS`)
pub const ENV_PREFIX: &str = "SCIDIR_MINER";

/// Largest number of identifiers the Scopus endpoint accepts in one OR query
pub const MAX_BATCH_SIZE: usize = 25;

/// Application configuration
#[derive(Clone, Serialize, Deserialize)]
pub struct Config {
    /// Elsevier API key, sent as `X-ELS-APIKey` on every request
    #[serde(default)]
    pub api_key: String,

    /// Remote endpoints
    #[serde(default)]
    pub endpoints: Endpoints,

    /// HTTP client settings
    #[serde(default)]
    pub http: HttpConfig,

    /// Pagination and batching
    #[serde(default)]
    pub paging: PagingConfig,
}

impl Config {
    /// Create a configuration with default settings and the given API key
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            endpoints: Endpoints::default(),
            http: HttpConfig::default(),
            paging: PagingConfig::default(),
        }
    }

    /// Point both search endpoints at another base URL (used with mock servers)
    pub fn with_base_url(mut self, base: &str) -> Self {
        let base = base.trim_end_matches('/');
        self.endpoints.search_url = format!("{}/content/search/sciencedirect", base);
        self.endpoints.scopus_url = format!("{}/content/search/scopus", base);
        self
    }

    /// Check the invariants the rest of the crate relies on
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.api_key.trim().is_empty() {
            return Err(ConfigError::MissingApiKey);
        }
        if self.paging.page_size == 0 {
            return Err(ConfigError::Invalid("paging.page_size must be positive".into()));
        }
        if self.paging.batch_size == 0 || self.paging.batch_size > MAX_BATCH_SIZE {
            return Err(ConfigError::Invalid(format!(
                "paging.batch_size must be between 1 and {}",
                MAX_BATCH_SIZE
            )));
        }
        Ok(())
    }

    /// Render the configuration as TOML with the API key redacted
    pub fn to_redacted_toml(&self) -> Result<String, ConfigError> {
        let mut shown = self.clone();
        if !shown.api_key.is_empty() {
            shown.api_key = "<redacted>".to_string();
        }
        toml::to_string_pretty(&shown).map_err(|e| ConfigError::Invalid(e.to_string()))
    }
}

impl fmt::Debug for Config {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Config")
            .field("api_key", &"<redacted>")
            .field("endpoints", &self.endpoints)
            .field("http", &self.http)
            .field("paging", &self.paging)
            .finish()
    }
}

/// Remote API endpoints
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Endpoints {
    /// ScienceDirect search endpoint
    #[serde(default = "default_search_url")]
    pub search_url: String,

    /// Scopus search endpoint (citation counts)
    #[serde(default = "default_scopus_url")]
    pub scopus_url: String,
}

impl Default for Endpoints {
    fn default() -> Self {
        Self {
            search_url: default_search_url(),
            scopus_url: default_scopus_url(),
        }
    }
}

fn default_search_url() -> String {
    "https://api.elsevier.com/content/search/sciencedirect".to_string()
}

fn default_scopus_url() -> String {
    "https://api.elsevier.com/content/search/scopus".to_string()
}

/// HTTP client settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HttpConfig {
    /// Whole-request timeout in seconds
    #[serde(default = "default_timeout")]
    pub timeout_secs: u64,

    /// Connection timeout in seconds
    #[serde(default = "default_connect_timeout")]
    pub connect_timeout_secs: u64,

    /// User agent sent with every request
    #[serde(default = "default_user_agent")]
    pub user_agent: String,
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            timeout_secs: default_timeout(),
            connect_timeout_secs: default_connect_timeout(),
            user_agent: default_user_agent(),
        }
    }
}

fn default_timeout() -> u64 {
    30
}

fn default_connect_timeout() -> u64 {
    10
}

fn default_user_agent() -> String {
    concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION")).to_string()
}

/// Pagination and batching settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PagingConfig {
    /// Results requested per search page
    #[serde(default = "default_page_size")]
    pub page_size: usize,

    /// Identifiers combined into one citation query
    #[serde(default = "default_batch_size")]
    pub batch_size: usize,
}

impl Default for PagingConfig {
    fn default() -> Self {
        Self {
            page_size: default_page_size(),
            batch_size: default_batch_size(),
        }
    }
}

fn default_page_size() -> usize {
    200
}

fn default_batch_size() -> usize {
    MAX_BATCH_SIZE
}

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("API key missing: set {API_KEY_ENV} or api_key in the config file")]
    MissingApiKey,

    #[error("Failed to load configuration: {0}")]
    Load(#[from] config::ConfigError),

    #[error("Invalid configuration: {0}")]
    Invalid(String),
}

/// Load configuration, taking the API key from `ELSKEY` when it is set
pub fn load_config(path: Option<&Path>) -> Result<Config, ConfigError> {
    load_config_with_key(path, std::env::var(API_KEY_ENV).ok())
}

/// Load configuration with an explicit API key override
pub fn load_config_with_key(
    path: Option<&Path>,
    api_key: Option<String>,
) -> Result<Config, ConfigError> {
    let mut builder = config::Config::builder();
    if let Some(path) = path {
        builder = builder.add_source(config::File::from(path).required(true));
    }
    let settings = builder
        .add_source(
            config::Environment::with_prefix(ENV_PREFIX)
                .prefix_separator("_")
                .separator("__")
                .try_parsing(true),
        )
        .build()?;

    let mut config: Config = settings.try_deserialize()?;
    if let Some(key) = api_key.filter(|k| !k.trim().is_empty()) {
        config.api_key = key;
    }
    config.validate()?;
    Ok(config)
}

/// Find the default configuration file, if one exists
pub fn find_config_file() -> Option<PathBuf> {
    let local = PathBuf::from("scidir-miner.toml");
    if local.is_file() {
        return Some(local);
    }
    dirs::config_dir()
        .map(|dir| dir.join("scidir-miner").join("config.toml"))
        .filter(|path| path.is_file())
}
