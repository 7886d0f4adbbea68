//! `dropbox-catalog`: mirror Dropbox folder and file metadata into a database.
//!
//! Configuration comes from the environment, optionally seeded from a `.env`
//! file (see `core_runtime::config`).
//! Exits with status 0 after the summary line and 1 on any error.

use anyhow::Context;
use core_runtime::config::load_dotenv;
use core_runtime::logging::{init_logging, LoggingConfig};
use core_runtime::AppConfig;
use std::process::ExitCode;
use tracing::{debug, error};

#[tokio::main]
async fn main() -> ExitCode {
    // Before logging, so LOG_* settings in the file apply too
    let dotenv = load_dotenv();

    let logging = match LoggingConfig::from_env() {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Invalid logging configuration: {e}");
            LoggingConfig::default()
        }
    };
    if let Err(e) = init_logging(logging) {
        eprintln!("Failed to initialize logging: {e}");
    }

    match dotenv {
        Ok(Some(path)) => debug!(path = %path.display(), "Loaded .env file"),
        Ok(None) => {}
        Err(e) => {
            error!("{e}");
            return ExitCode::FAILURE;
        }
    }

    match run().await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("Sync failed: {e:#}");
            ExitCode::FAILURE
        }
    }
}

async fn run() -> anyhow::Result<()> {
    let config = AppConfig::from_env().context("failed to load configuration")?;

    core_service::run(&config)
        .await
        .with_context(|| format!("failed to sync {}", config.start_path))?;

    Ok(())
}
