use serde::Deserialize;

/// Main configuration structure
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub search: SearchConstraints,
    #[serde(default)]
    pub record: RecordOptions,
    #[serde(default)]
    pub fetcher: FetcherConfig,
}

/// Constraints on which links the crawl follows
#[derive(Debug, Clone, Deserialize)]
pub struct SearchConstraints {
    /// Maximum depth to crawl from the seed URL
    #[serde(rename = "depth")]
    pub max_depth: u32,

    /// Only follow links whose host matches the page they were found on
    #[serde(rename = "same-host", default)]
    pub same_host: bool,

    /// Anchors must contain at least one element with one of these tags
    #[serde(rename = "contains-tags", default)]
    pub contains_tags: Vec<String>,

    /// Optional cap on simultaneous fetches (unbounded when absent)
    #[serde(rename = "max-concurrent-fetches", default)]
    pub max_concurrent_fetches: Option<usize>,
}

/// Options for recording attribute values
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RecordOptions {
    /// Tags whose attribute is recorded
    #[serde(default)]
    pub tags: Vec<String>,

    /// Attribute name to record
    #[serde(default)]
    pub attr: String,

    /// Output format for recorded values
    #[serde(default)]
    pub format: RecordFormat,
}

/// Line format used when printing recorded values
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RecordFormat {
    #[default]
    Text,
    Json,
}

/// HTTP fetcher configuration
#[derive(Debug, Clone, Deserialize)]
pub struct FetcherConfig {
    /// User-Agent header sent with every request
    #[serde(rename = "user-agent", default = "default_user_agent")]
    pub user_agent: String,

    /// Whole-request timeout in seconds
    #[serde(rename = "timeout-secs", default = "default_timeout_secs")]
    pub timeout_secs: u64,

    /// Skip TLS certificate verification
    #[serde(rename = "accept-invalid-certs", default)]
    pub accept_invalid_certs: bool,
}

impl Default for FetcherConfig {
    fn default() -> Self {
        Self {
            user_agent: default_user_agent(),
            timeout_secs: default_timeout_secs(),
            accept_invalid_certs: false,
        }
    }
}

fn default_user_agent() -> String {
    "Mozilla/5.0".to_string()
}

fn default_timeout_secs() -> u64 {
    30
}
