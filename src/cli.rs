//! Command-line interface shared by both assistant binaries

use crate::app::Application;
use crate::classifier::Taxonomy;
use crate::config::Settings;
use crate::error::AppError;
use crate::logging::{init_logging, resolve_level, LogLevel};
use clap::Parser;
use dotenv::dotenv;
use log::info;

/// AI-assisted alert troubleshooting
#[derive(Parser, Debug)]
#[command(version, about)]
pub struct Cli {
    /// Alert message to analyze; omit to enter interactive mode
    pub alert: Option<String>,

    /// Log level threshold (overrides LOG_LEVEL)
    #[arg(long, value_enum, ignore_case = true)]
    pub log_level: Option<LogLevel>,
}

/// Parse arguments, load configuration and run the assistant
///
/// # Errors
///
/// Returns `AppError` for configuration problems or a failed one-shot
/// analysis. Interactive-mode analysis failures are reported inline and do
/// not end the session.
pub async fn run(taxonomy: Taxonomy) -> Result<(), AppError> {
    dotenv().ok();
    let cli = Cli::parse();

    let settings = Settings::from_env()?;
    let level = resolve_level(cli.log_level, settings.log_level.as_deref());
    init_logging(level);
    // Settings load before the logger exists, so this is logged here.
    info!("Configuration loaded: {}", settings.model.describe());

    let app = Application::from_settings(&settings, taxonomy)?;
    match &cli.alert {
        Some(alert) => app.run_once(alert).await,
        None => app.run_interactive().await,
    }
}
