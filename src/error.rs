use thiserror::Error;

/// Errors that can occur during configuration loading
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error(
        "OPENAI_API_KEY is required for OpenAI models. \
         Set it in your environment or .env file"
    )]
    MissingApiKey,

    #[error("Unsupported model type: {0}. Supported types: openai, ollama, mock")]
    UnsupportedModelType(String),
}

/// Errors that can occur while talking to the MCP server
#[derive(Error, Debug)]
pub enum McpError {
    #[error("Failed to spawn MCP server '{command}': {source}")]
    Spawn {
        command: String,
        #[source]
        source: std::io::Error,
    },

    #[error(
        "Confluence credentials incomplete: CONFLUENCE_URL, CONFLUENCE_USERNAME and \
         CONFLUENCE_API_TOKEN must all be set. Complete the Atlassian API token setup first"
    )]
    MissingCredentials,

    #[error("MCP server closed the connection")]
    ConnectionClosed,

    #[error("MCP request timed out")]
    Timeout,

    #[error("JSON-RPC error {code}: {message}")]
    Rpc { code: i64, message: String },

    #[error("Tool '{tool}' reported an error: {message}")]
    ToolFailed { tool: String, message: String },

    #[error("Malformed MCP payload: {0}")]
    MalformedPayload(String),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Top-level application error, aggregating the subsystem errors
#[derive(Error, Debug)]
pub enum AppError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("MCP error: {0}")]
    Mcp(#[from] McpError),

    #[error("Analysis error: {0}")]
    Analysis(#[from] AnalysisError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Errors that can occur during AI analysis
#[derive(Error, Debug)]
pub enum AnalysisError {
    #[error("Backend communication failed: {0}")]
    BackendError(String),

    #[error("Request timeout")]
    Timeout,

    #[error("Invalid response format: {0}")]
    InvalidResponse(String),

    #[error("HTTP error: {0}")]
    HttpError(#[from] reqwest::Error),
}
