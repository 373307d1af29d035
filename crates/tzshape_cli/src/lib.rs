//! # tzshape - Command-Line Entry Point
//!
//! Resolves coordinates to time zone identifiers from the terminal. This
//! entry point handles CLI parsing, configuration loading, logging setup and
//! running the selected command.
//!
//! ## Quick Start
//!
//! ```bash
//! # Which zone is Berlin in?
//! tzshape lookup 52.52 13.405
//!
//! # Use a full timezone-boundary-builder release, Europe only
//! tzshape --data combined.json.gz --bounds 34,-25,72,45 zones
//!
//! # Resolve a file of `lat,lon` lines as JSON
//! tzshape --json batch points.csv
//!
//! # Index statistics
//! tzshape stats
//! ```
//!
//! ## Configuration
//!
//! Settings are loaded from a TOML file (default: `tzshape.toml`). If the
//! file doesn't exist, a default configuration will be created. Command-line
//! options override the file.
//!
//! Logs are written to stderr; stdout carries only command output.

use tracing::error;

mod app;
mod cli;
mod config;
mod logging;
mod signals;

use app::Application;
use cli::CliArgs;
use config::AppConfig;

/// Main entry point for the command-line tool.
///
/// 1. Command-line argument parsing
/// 2. Configuration loading for logging settings
/// 3. Logging system initialization
/// 4. Application creation and execution
///
/// # Exit Codes
///
/// * **0**: Command completed
/// * **1**: Invalid configuration, unreadable data or a failed lookup
pub async fn init() -> Result<(), Box<dyn std::error::Error>> {
    let args = CliArgs::parse();

    // Load configuration to get logging settings
    let mut config = AppConfig::load_from_file(&args.config_path)
        .await
        .unwrap_or_default();
    if let Some(level) = &args.log_level {
        config.logging.level = level.clone();
    }

    if let Err(e) = logging::setup_logging(&config.logging, args.json_logs) {
        eprintln!("❌ Failed to setup logging: {e}");
        std::process::exit(1);
    }

    match Application::new(args).await {
        Ok(app) => {
            if let Err(e) = app.run().await {
                error!("❌ Command failed: {e}");
                std::process::exit(1);
            }
        }
        Err(e) => {
            error!("❌ Failed to start: {e}");
            std::process::exit(1);
        }
    }

    Ok(())
}

// Re-export configuration types for library usage
pub use cli::Action;
pub use config::{BoundsSettings, DataSettings, LoggingSettings};
