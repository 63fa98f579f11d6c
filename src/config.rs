// Global configuration constants - single source of truth

use chrono::NaiveDate;

pub struct Config;

impl Config {
    // HTTP/Network config
    pub const REQUEST_TIMEOUT_SECS: u64 = 10;
    pub const CONNECT_TIMEOUT_SECS: u64 = 10;
    pub const MAX_CONTENT_SIZE: usize = 10 * 1024 * 1024; // 10MB
    pub const MAX_RETRIES: u32 = 2;
    pub const RETRY_BACKOFF_MS: u64 = 500;
    pub const RETRY_BACKOFF_MAX_MS: u64 = 5_000;
    pub const USER_AGENT: &'static str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36";

    // Pagination
    pub const MAX_PAGES: u32 = 50;

    // Output
    pub const DEFAULT_OUTPUT: &'static str = "reviews.json";
}

/// Runtime settings for one scrape, assembled from CLI arguments and passed
/// down explicitly.
#[derive(Debug, Clone)]
pub struct ScrapeConfig {
    pub user_agent: String,
    pub timeout_secs: u64,
    pub max_retries: u32,
    /// Hard upper bound on review pages fetched per run.
    pub max_pages: u32,
    /// Stop once a review older than the start date shows up (newest-first sites).
    pub stop_at_older: bool,
    /// Replaces the platform's public origin, e.g. for a local mirror.
    pub base_url: Option<String>,
    /// Anchor for relative dates such as "3 days ago".
    pub today: NaiveDate,
}

impl ScrapeConfig {
    pub fn new(today: NaiveDate) -> Self {
        Self {
            user_agent: Config::USER_AGENT.to_string(),
            timeout_secs: Config::REQUEST_TIMEOUT_SECS,
            max_retries: Config::MAX_RETRIES,
            max_pages: Config::MAX_PAGES,
            stop_at_older: false,
            base_url: None,
            today,
        }
    }
}

impl Default for ScrapeConfig {
    fn default() -> Self {
        Self::new(chrono::Local::now().date_naive())
    }
}
