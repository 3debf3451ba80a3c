use serde::Deserialize;

/// Main configuration structure for Shelf-Sweep
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub site: SiteConfig,
    pub crawler: CrawlerConfig,
    pub output: OutputConfig,
    #[serde(default)]
    pub ingest: IngestConfig,
}

/// Target site configuration
#[derive(Debug, Clone, Deserialize)]
pub struct SiteConfig {
    /// URL of the first catalog listing page
    #[serde(rename = "start-url")]
    pub start_url: String,

    /// Currency symbol stripped from price fields before parsing
    #[serde(rename = "currency-symbol", default = "default_currency_symbol")]
    pub currency_symbol: String,

    /// User-Agent header sent with every request
    #[serde(rename = "user-agent", default = "default_user_agent")]
    pub user_agent: String,
}

/// Crawler behavior configuration
#[derive(Debug, Clone, Deserialize)]
pub struct CrawlerConfig {
    /// Maximum number of concurrent detail-page fetches
    #[serde(rename = "fetch-workers")]
    pub fetch_workers: u32,

    /// Capacity of the queue feeding the database writer
    #[serde(rename = "queue-capacity")]
    pub queue_capacity: u32,

    /// Retry attempts after a transient fetch failure
    #[serde(rename = "max-retries")]
    pub max_retries: u32,

    /// Delay between retry attempts (milliseconds, grows linearly)
    #[serde(rename = "retry-backoff-ms")]
    pub retry_backoff_ms: u64,

    /// Per-request timeout (seconds)
    #[serde(rename = "request-timeout-secs")]
    pub request_timeout_secs: u64,
}

/// Output configuration
#[derive(Debug, Clone, Deserialize)]
pub struct OutputConfig {
    /// Path to the SQLite database file
    #[serde(rename = "database-path")]
    pub database_path: String,
}

/// Ingestion configuration
#[derive(Debug, Clone, Default, Deserialize)]
pub struct IngestConfig {
    /// How re-harvested records are written
    #[serde(default)]
    pub mode: IngestMode,
}

/// Write policy for records that may already exist in the store
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum IngestMode {
    /// Always insert; re-running a harvest appends duplicate book rows
    #[default]
    Append,

    /// Update the existing row matching on UPC, insert when there is none
    Upsert,
}

fn default_currency_symbol() -> String {
    "£".to_string()
}

fn default_user_agent() -> String {
    format!("shelf-sweep/{}", env!("CARGO_PKG_VERSION"))
}
