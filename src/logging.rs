//! Logging setup: a terminal layer always, plus daily-rotated text and JSON
//! files when a log directory is given.
//!
//! `RUST_LOG` overrides the default level, e.g.
//! `RUST_LOG=review_scraper=debug,reqwest=warn`.

use std::path::Path;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Layer, Registry};

#[derive(Debug, thiserror::Error)]
pub enum LoggingError {
    #[error("could not create log directory {path}: {source}")]
    LogDir {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("logging already initialized: {0}")]
    AlreadyInitialized(#[from] tracing_subscriber::util::TryInitError),
}

/// Keeps the background log writers alive; drop it only at exit.
#[must_use]
pub struct LogGuard {
    _guards: Vec<WorkerGuard>,
}

/// Default filter directive when `RUST_LOG` is unset
pub fn default_directive(verbose: bool) -> &'static str {
    if verbose {
        "debug"
    } else {
        "info"
    }
}

fn env_filter(verbose: bool) -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_directive(verbose)))
}

/// Initialize the global subscriber. Call once, from `main`.
///
/// Creates, when `log_dir` is set:
/// 1. `review_scraper.log` - human-readable text, no ANSI colors
/// 2. `review_scraper.json.log` - structured JSON for analysis
pub fn init_logging(log_dir: Option<&Path>, verbose: bool) -> Result<LogGuard, LoggingError> {
    let mut layers: Vec<Box<dyn Layer<Registry> + Send + Sync>> = Vec::new();
    let mut guards = Vec::new();

    // Terminal output goes to stderr so stdout stays clean for piping
    layers.push(
        fmt::layer()
            .with_writer(std::io::stderr)
            .with_target(false)
            .compact()
            .with_filter(env_filter(verbose))
            .boxed(),
    );

    if let Some(log_path) = log_dir {
        std::fs::create_dir_all(log_path).map_err(|source| LoggingError::LogDir {
            path: log_path.display().to_string(),
            source,
        })?;

        let (text_writer, text_guard) =
            tracing_appender::non_blocking(tracing_appender::rolling::daily(log_path, "review_scraper.log"));
        let (json_writer, json_guard) =
            tracing_appender::non_blocking(tracing_appender::rolling::daily(log_path, "review_scraper.json.log"));
        guards.push(text_guard);
        guards.push(json_guard);

        layers.push(
            fmt::layer()
                .with_writer(text_writer)
                .with_target(true)
                .with_line_number(true)
                .with_ansi(false)
                .compact()
                .with_filter(env_filter(verbose))
                .boxed(),
        );

        layers.push(
            fmt::layer()
                .json()
                .with_writer(json_writer)
                .with_target(true)
                .with_line_number(true)
                .with_current_span(true)
                .with_span_list(true)
                .with_filter(env_filter(verbose))
                .boxed(),
        );
    }

    tracing_subscriber::registry().with(layers).try_init()?;

    if let Some(log_path) = log_dir {
        tracing::debug!("Writing logs to {}", log_path.display());
    }

    Ok(LogGuard { _guards: guards })
}
