use serde::Deserialize;
use std::time::Duration;

/// Main configuration structure for Trade-Harvest
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub api: ApiConfig,
    pub client: ClientConfig,
    #[serde(default)]
    pub scrape: ScrapeConfig,
    pub output: OutputConfig,
    #[serde(default, rename = "category")]
    pub categories: Vec<CategoryEntry>,
}

/// Paginated listing API configuration
#[derive(Debug, Clone, Deserialize)]
pub struct ApiConfig {
    /// Endpoint that serves one page of a sub-category
    #[serde(rename = "base-url")]
    pub base_url: String,

    /// Number of records requested per page
    #[serde(rename = "page-size", default = "default_page_size")]
    pub page_size: u32,

    /// Per-request timeout (seconds)
    #[serde(rename = "timeout-secs", default = "default_api_timeout")]
    pub timeout_secs: u64,

    /// Referer header sent with every API request
    pub referer: String,

    /// Absolute prefix for the relative URLs inside product records
    #[serde(rename = "site-root")]
    pub site_root: String,
}

/// HTTP client identity
#[derive(Debug, Clone, Deserialize)]
pub struct ClientConfig {
    /// Browser-like User-Agent string
    #[serde(rename = "user-agent")]
    pub user_agent: String,

    /// Timeout for listing page fetches during discovery (seconds)
    #[serde(rename = "discovery-timeout-secs", default = "default_discovery_timeout")]
    pub discovery_timeout_secs: u64,
}

/// How records without a product identifier are accumulated
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum AnonymousRecords {
    /// Never append records that lack an identifier
    #[default]
    Drop,
    /// Append the record the first time that exact record is seen
    KeepFirst,
}

/// Pagination, stagnation and retry tuning
#[derive(Debug, Clone, Deserialize)]
pub struct ScrapeConfig {
    /// Pause between consecutive pages of one target (milliseconds)
    #[serde(rename = "page-delay-ms", default = "default_page_delay")]
    pub page_delay_ms: u64,

    /// Pause before retrying a target after an outage (milliseconds)
    #[serde(rename = "retry-cooldown-ms", default = "default_retry_cooldown")]
    pub retry_cooldown_ms: u64,

    /// Consecutive pages without new items that end a scrape
    #[serde(rename = "stagnation-threshold", default = "default_stagnation_threshold")]
    pub stagnation_threshold: u32,

    /// Attempts per target, including the first
    #[serde(rename = "max-attempts", default = "default_max_attempts")]
    pub max_attempts: u32,

    /// Outages on pages at or beyond this number are not retried
    #[serde(rename = "retry-page-limit", default = "default_retry_page_limit")]
    pub retry_page_limit: u32,

    #[serde(rename = "anonymous-records", default)]
    pub anonymous_records: AnonymousRecords,
}

impl ScrapeConfig {
    pub fn page_delay(&self) -> Duration {
        Duration::from_millis(self.page_delay_ms)
    }

    pub fn retry_cooldown(&self) -> Duration {
        Duration::from_millis(self.retry_cooldown_ms)
    }
}

impl Default for ScrapeConfig {
    fn default() -> Self {
        Self {
            page_delay_ms: default_page_delay(),
            retry_cooldown_ms: default_retry_cooldown(),
            stagnation_threshold: default_stagnation_threshold(),
            max_attempts: default_max_attempts(),
            retry_page_limit: default_retry_page_limit(),
            anonymous_records: AnonymousRecords::default(),
        }
    }
}

/// Output locations
#[derive(Debug, Clone, Deserialize)]
pub struct OutputConfig {
    /// Root directory of the raw (bronze) layer
    #[serde(rename = "bronze-path")]
    pub bronze_path: String,

    /// Directory holding the consolidated (silver) CSV
    #[serde(rename = "silver-path")]
    pub silver_path: String,

    /// Path to the SQLite run ledger
    #[serde(rename = "ledger-path")]
    pub ledger_path: String,
}

/// A top-level category and its listing page
#[derive(Debug, Clone, Deserialize)]
pub struct CategoryEntry {
    pub name: String,
    pub url: String,
}

fn default_page_size() -> u32 {
    50
}

fn default_api_timeout() -> u64 {
    30
}

fn default_discovery_timeout() -> u64 {
    15
}

fn default_page_delay() -> u64 {
    3_000
}

fn default_retry_cooldown() -> u64 {
    120_000
}

fn default_stagnation_threshold() -> u32 {
    3
}

fn default_max_attempts() -> u32 {
    2
}

fn default_retry_page_limit() -> u32 {
    20
}
