use clap::{Parser, Subcommand};
use std::path::PathBuf;

use crate::config::{Config, ScrapeConfig};
use crate::export::OutputFormat;
use crate::orchestrator::RunRequest;

/// CLI entry point for scraping product reviews.
/// Exit codes: 0=success, 2=invalid arguments, 3=I/O error, 4=network error
#[derive(Parser, Debug)]
#[command(name = "review_scraper")]
#[command(about = "Scrape SaaS product reviews from G2, Capterra or TrustRadius")]
#[command(version)]
pub struct Cli {
    #[arg(long, global = true, help = "Also write rotated text and JSON logs to this directory")]
    pub log_dir: Option<PathBuf>,

    #[arg(short, long, global = true, help = "Log at debug level unless RUST_LOG is set")]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Scrape one platform for a company's reviews within a date range.
    Run(RunArgs),
}

#[derive(clap::Args, Debug, Clone)]
pub struct RunArgs {
    #[arg(
        long = "company_name",
        visible_alias = "company-name",
        alias = "company",
        help = "Company or product name to search for"
    )]
    pub company_name: String,

    #[arg(
        long = "start_date",
        visible_alias = "start-date",
        help = "First review date to keep (YYYY-MM-DD)"
    )]
    pub start_date: String,

    #[arg(
        long = "end_date",
        visible_alias = "end-date",
        help = "Last review date to keep (YYYY-MM-DD)"
    )]
    pub end_date: String,

    #[arg(long, help = "Review platform: G2, Capterra or TrustRadius")]
    pub source: String,

    #[arg(short, long, default_value = Config::DEFAULT_OUTPUT, help = "Output file path")]
    pub output: PathBuf,

    #[arg(long, value_enum, default_value_t = OutputFormat::Json, help = "Output file format")]
    pub format: OutputFormat,

    #[arg(
        long,
        default_value_t = Config::MAX_PAGES,
        value_parser = clap::value_parser!(u32).range(1..),
        help = "Hard limit on review pages fetched"
    )]
    pub max_pages: u32,

    #[arg(
        long,
        default_value_t = Config::REQUEST_TIMEOUT_SECS,
        value_parser = clap::value_parser!(u64).range(1..),
        help = "Per-request timeout in seconds"
    )]
    pub timeout: u64,

    #[arg(long, default_value_t = Config::MAX_RETRIES, help = "Retries per request on transient failures")]
    pub retries: u32,

    #[arg(long, default_value = Config::USER_AGENT, help = "User agent string for requests")]
    pub user_agent: String,

    #[arg(long, help = "Stop paginating at the first review older than start_date (newest-first listings)")]
    pub stop_at_older: bool,

    #[arg(long, hide = true)]
    pub base_url: Option<String>,
}

impl Cli {
    /// On error, clap prints help and exits with code 2 (usage error).
    pub fn parse_args() -> Self {
        Self::parse()
    }
}

impl RunArgs {
    pub fn to_request(&self) -> RunRequest {
        RunRequest {
            company_name: self.company_name.clone(),
            start_date: self.start_date.clone(),
            end_date: self.end_date.clone(),
            source: self.source.clone(),
            output: self.output.clone(),
            format: self.format,
        }
    }

    pub fn to_config(&self, today: chrono::NaiveDate) -> ScrapeConfig {
        ScrapeConfig {
            user_agent: self.user_agent.clone(),
            timeout_secs: self.timeout,
            max_retries: self.retries,
            max_pages: self.max_pages,
            stop_at_older: self.stop_at_older,
            base_url: self.base_url.clone(),
            today,
        }
    }
}
