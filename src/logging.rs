//! Logging setup and styled console output
//!
//! Structured logging goes through `log`/`env_logger` with a severity
//! threshold resolved from the `--log-level` flag or the `LOG_LEVEL`
//! environment variable. User-facing banners (alarm echo, analysis results,
//! success/error notices) are printed with colored headers via `console`.

use clap::ValueEnum;
use console::{style, Color};
use log::LevelFilter;
use std::str::FromStr;

/// Log severity threshold accepted by `--log-level` and `LOG_LEVEL`
///
/// The five documented values map onto the four `log` crate levels;
/// WARNING maps to `warn` and CRITICAL to `error`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum LogLevel {
    #[value(name = "DEBUG")]
    Debug,
    #[value(name = "INFO")]
    Info,
    #[value(name = "WARNING")]
    Warning,
    #[value(name = "ERROR")]
    Error,
    #[value(name = "CRITICAL")]
    Critical,
}

impl LogLevel {
    /// Convert to the `log` crate filter level
    pub fn to_filter(self) -> LevelFilter {
        match self {
            LogLevel::Debug => LevelFilter::Debug,
            LogLevel::Info => LevelFilter::Info,
            LogLevel::Warning => LevelFilter::Warn,
            LogLevel::Error => LevelFilter::Error,
            LogLevel::Critical => LevelFilter::Error,
        }
    }
}

impl FromStr for LogLevel {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_uppercase().as_str() {
            "DEBUG" => Ok(LogLevel::Debug),
            "INFO" => Ok(LogLevel::Info),
            "WARNING" | "WARN" => Ok(LogLevel::Warning),
            "ERROR" => Ok(LogLevel::Error),
            "CRITICAL" => Ok(LogLevel::Critical),
            other => Err(format!(
                "invalid log level '{}', expected one of DEBUG, INFO, WARNING, ERROR, CRITICAL",
                other
            )),
        }
    }
}

/// Resolve the effective log level from the CLI flag and the environment value
///
/// Precedence: explicit flag, then `LOG_LEVEL`, then INFO. An unparseable
/// environment value falls back to INFO rather than aborting startup.
pub fn resolve_level(flag: Option<LogLevel>, env_value: Option<&str>) -> LogLevel {
    if let Some(level) = flag {
        return level;
    }
    env_value
        .and_then(|v| v.parse().ok())
        .unwrap_or(LogLevel::Info)
}

/// Initialize the global logger with the given threshold
///
/// `RUST_LOG` still applies for per-module overrides, but the overall
/// threshold comes from the resolved level.
pub fn init_logging(level: LogLevel) {
    env_logger::Builder::from_default_env()
        .filter_level(level.to_filter())
        .init();
}

/// Print a message with a colored, bolded header
pub fn styled_log(header: &str, message: &str, color: Color) {
    println!(
        "{}\n{}",
        style(format!("{}:", header)).fg(color).bold(),
        style(message).fg(color)
    );
}

/// Print a success notice with a green header
pub fn log_success(message: &str) {
    styled_log("SUCCESS", message, Color::Green);
}

/// Print an error notice with a red header
pub fn log_error(message: &str) {
    styled_log("ERROR", message, Color::Red);
}

/// Print a warning notice with a yellow header
pub fn log_warning(message: &str) {
    styled_log("WARNING", message, Color::Yellow);
}
