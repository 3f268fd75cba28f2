//! Configuration loading from environment variables
//!
//! Settings are read once at startup and held as read-only state for the rest
//! of the process lifetime. Loading goes through an injectable lookup function
//! so tests can supply values without mutating the process environment.

use crate::error::ConfigError;

/// Model provider selection, resolved from `MODEL_TYPE` and related variables
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ModelConfig {
    /// Hosted OpenAI-compatible completion API
    OpenAi { api_key: String, model: String },
    /// Local Ollama inference server
    Ollama { base_url: String, model: String },
    /// Canned responses, for tests and offline runs
    Mock,
}

impl ModelConfig {
    /// Human-readable provider/model description for startup banners
    pub fn describe(&self) -> String {
        match self {
            ModelConfig::OpenAi { model, .. } => format!("OpenAI - {}", model),
            ModelConfig::Ollama { base_url, model } => {
                format!("Ollama - {} at {}", model, base_url)
            }
            ModelConfig::Mock => "Mock backend".to_string(),
        }
    }
}

/// Confluence connection settings for the MCP server
///
/// All three values must be present before the MCP client will start the
/// server subprocess; `is_complete` is checked up front so the failure is a
/// clear configuration message instead of a subprocess error.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ConfluenceSettings {
    pub url: Option<String>,
    pub username: Option<String>,
    pub api_token: Option<String>,
}

impl ConfluenceSettings {
    /// Whether URL, username and API token are all configured
    pub fn is_complete(&self) -> bool {
        self.url.is_some() && self.username.is_some() && self.api_token.is_some()
    }
}

/// Typed application settings, loaded from the environment at startup
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    /// Which LLM backend to use
    pub model: ModelConfig,
    /// Confluence/MCP connection settings
    pub confluence: ConfluenceSettings,
    /// Raw `LOG_LEVEL` value, parsed by the logging module
    pub log_level: Option<String>,
}

impl Settings {
    /// Load settings from the process environment
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if `MODEL_TYPE` names an unsupported provider or
    /// if `MODEL_TYPE=openai` and `OPENAI_API_KEY` is not set.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load settings through a custom variable lookup
    ///
    /// This is the testable core of `from_env`: the lookup closure stands in
    /// for `std::env::var`.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let model_type = lookup("MODEL_TYPE")
            .unwrap_or_else(|| "openai".to_string())
            .to_lowercase();

        let model = match model_type.as_str() {
            "openai" => {
                let api_key = lookup("OPENAI_API_KEY").ok_or(ConfigError::MissingApiKey)?;
                let model = lookup("OPENAI_MODEL").unwrap_or_else(|| "gpt-4".to_string());
                ModelConfig::OpenAi { api_key, model }
            }
            "ollama" => {
                let base_url = lookup("OLLAMA_BASE_URL")
                    .unwrap_or_else(|| "http://localhost:11434".to_string());
                let model = lookup("OLLAMA_MODEL").unwrap_or_else(|| "llama2".to_string());
                ModelConfig::Ollama { base_url, model }
            }
            "mock" => ModelConfig::Mock,
            other => return Err(ConfigError::UnsupportedModelType(other.to_string())),
        };

        let confluence = ConfluenceSettings {
            url: lookup("CONFLUENCE_URL").filter(|v| !v.is_empty()),
            username: lookup("CONFLUENCE_USERNAME").filter(|v| !v.is_empty()),
            api_token: lookup("CONFLUENCE_API_TOKEN").filter(|v| !v.is_empty()),
        };

        Ok(Settings {
            model,
            confluence,
            log_level: lookup("LOG_LEVEL").filter(|v| !v.is_empty()),
        })
    }
}
