use std::process::ExitCode;

use review_scraper::cli::{Cli, Commands};
use review_scraper::logging::{self, LoggingError};
use review_scraper::{orchestrator, RunError};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum MainError {
    #[error(transparent)]
    Run(#[from] RunError),

    #[error("Logging error: {0}")]
    Logging(#[from] LoggingError),
}

impl MainError {
    /// 2=invalid arguments, 3=I/O or setup error, 4=network error
    fn exit_code(&self) -> u8 {
        match self {
            MainError::Run(e) => e.exit_code(),
            MainError::Logging(_) => 3,
        }
    }
}

async fn run_command(command: Commands) -> Result<(), MainError> {
    match command {
        Commands::Run(args) => {
            let config = args.to_config(chrono::Local::now().date_naive());
            let summary = orchestrator::run(&args.to_request(), &config).await?;
            println!(
                "Wrote {} {} reviews to {}",
                summary.written,
                summary.source,
                summary.output_path.display()
            );
        }
    }
    Ok(())
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse_args();

    let _log_guard = match logging::init_logging(cli.log_dir.as_deref(), cli.verbose) {
        Ok(guard) => guard,
        Err(e) => {
            let e = MainError::from(e);
            eprintln!("{}", e);
            return ExitCode::from(e.exit_code());
        }
    };

    match run_command(cli.command).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!("{}", e);
            ExitCode::from(e.exit_code())
        }
    }
}
