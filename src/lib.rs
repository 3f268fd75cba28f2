/// Alert and event taxonomy types
pub mod alert;

/// Application assembly and run modes
pub mod app;

/// Analysis agent pipeline
pub mod agent;

/// Keyword-based alert classification
pub mod classifier;

/// Command-line interface
pub mod cli;

/// Configuration loading
pub mod config;

/// Error types for the assistant
pub mod error;

/// LLM backends and provider selection
pub mod llm;

/// Logging setup and styled console output
pub mod logging;

/// MCP client and Confluence integration
pub mod mcp;

/// Frontline response stage
pub mod respond;

/// Curated runbook entries
pub mod runbook;

// Re-export commonly used types
pub use agent::{AnalysisAgent, TroubleshootingReport};
pub use alert::{Alert, EventId, Severity};
pub use classifier::{Classifier, Taxonomy};
pub use config::Settings;
pub use error::{AnalysisError, AppError, ConfigError, McpError};
