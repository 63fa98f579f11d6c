//! Runs one scrape end to end: validate, dispatch, write.

use std::path::PathBuf;

use crate::config::ScrapeConfig;
use crate::export::{write_reviews_file, ExportError, OutputFormat};
use crate::models::{Query, Source, ValidationError};
use crate::network::{FetchError, HttpClient, PageFetcher};
use crate::platform_scraper::{PlatformScraper, ScrapeError, ScrapeStatus};
use crate::platforms;

/// Unvalidated user input for a run
#[derive(Debug, Clone)]
pub struct RunRequest {
    pub company_name: String,
    pub start_date: String,
    pub end_date: String,
    pub source: String,
    pub output: PathBuf,
    pub format: OutputFormat,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunSummary {
    pub source: Source,
    pub written: usize,
    pub output_path: PathBuf,
    pub status: ScrapeStatus,
    pub pages_fetched: u32,
}

#[derive(Debug, thiserror::Error)]
pub enum RunError {
    #[error("validation error: {0}")]
    Validation(#[from] ValidationError),

    #[error("could not create HTTP client: {0}")]
    Client(#[source] FetchError),

    #[error("scraping error: {0}")]
    Scrape(#[from] ScrapeError),

    #[error("output error: {0}")]
    Export(#[from] ExportError),
}

impl RunError {
    /// Process exit status: 2=invalid input, 3=I/O or setup error, 4=network error
    pub fn exit_code(&self) -> u8 {
        match self {
            RunError::Validation(_) => 2,
            RunError::Scrape(ScrapeError::SearchUrl { .. }) => 2,
            RunError::Scrape(ScrapeError::Search { .. }) => 4,
            RunError::Client(_) | RunError::Export(_) => 3,
        }
    }
}

pub struct Orchestrator<'a> {
    config: &'a ScrapeConfig,
    fetcher: &'a dyn PageFetcher,
}

impl<'a> Orchestrator<'a> {
    pub fn new(config: &'a ScrapeConfig, fetcher: &'a dyn PageFetcher) -> Self {
        Self { config, fetcher }
    }

    /// Validate `request`, scrape the requested platform and write the output
    /// file. Nothing is fetched or written if validation fails.
    pub async fn run(&self, request: &RunRequest) -> Result<RunSummary, RunError> {
        tracing::info!("Validating input parameters...");
        let query = Query::parse(
            &request.company_name,
            &request.start_date,
            &request.end_date,
            &request.source,
            request.output.clone(),
        )?;

        tracing::info!(
            "Scraping reviews for '{}' from {} ({} to {})",
            query.company_name,
            query.source,
            query.start_date,
            query.end_date
        );

        let platform = platforms::for_source(query.source, self.config.base_url.as_deref());
        let outcome = PlatformScraper::new(platform.as_ref(), self.fetcher, self.config)
            .scrape(&query.company_name, query.start_date, query.end_date)
            .await?;

        match outcome.status {
            ScrapeStatus::CompanyNotFound => tracing::warn!(
                "Company '{}' not found on {}; writing empty result",
                query.company_name,
                query.source
            ),
            ScrapeStatus::Completed if outcome.reviews.is_empty() => tracing::warn!(
                "No reviews found for '{}' in the specified date range",
                query.company_name
            ),
            ScrapeStatus::Completed => {}
        }
        if outcome.undated > 0 {
            tracing::warn!(count = outcome.undated, "Dropped reviews with unrecognized dates");
        }

        write_reviews_file(&query.output_path, &outcome.reviews, request.format)?;
        tracing::info!(
            "Successfully saved {} reviews to {}",
            outcome.reviews.len(),
            query.output_path.display()
        );

        Ok(RunSummary {
            source: query.source,
            written: outcome.reviews.len(),
            output_path: query.output_path,
            status: outcome.status,
            pages_fetched: outcome.pages_fetched,
        })
    }
}

/// Run with the real HTTP client built from `config`.
pub async fn run(request: &RunRequest, config: &ScrapeConfig) -> Result<RunSummary, RunError> {
    let client = HttpClient::from_config(config).map_err(RunError::Client)?;
    Orchestrator::new(config, &client).run(request).await
}
