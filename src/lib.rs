pub mod backoff;
pub mod cli;
pub mod config;
pub mod date_filter;
pub mod export;
pub mod logging;
pub mod models;
pub mod network;
pub mod orchestrator;
pub mod pager;
pub mod parser;
pub mod platform_scraper;
pub mod platforms;

// Re-export main types for library usage
pub use config::{Config, ScrapeConfig};
pub use date_filter::{check_date, parse_review_date, DateRange, DateVerdict};
pub use export::OutputFormat;
pub use models::{Query, RawReview, Review, Source, ValidationError};
pub use network::{FetchError, FetchResult, HttpClient, PageFetcher};
pub use orchestrator::{Orchestrator, RunError, RunRequest, RunSummary};
pub use pager::{Pager, PagerReport, StopReason};
pub use platform_scraper::{PlatformScraper, ScrapeError, ScrapeOutcome, ScrapeStatus};
pub use platforms::Platform;
