//! LLM backend implementations and provider selection

pub mod backends;
pub mod provider;

pub use backends::{LlmBackend, MockBackend, OllamaBackend, OpenAiBackend};
pub use provider::backend_from_settings;

use crate::alert::Severity;
use serde::{Deserialize, Serialize};

/// Prompt pair sent to an LLM backend
///
/// Hosted chat APIs take the system and user parts separately; the Ollama
/// generate API gets them concatenated.
#[derive(Debug, Clone, PartialEq)]
pub struct AnalysisPrompt {
    /// Role/instruction preamble
    pub system: String,
    /// The alert-specific request
    pub user: String,
}

impl AnalysisPrompt {
    /// The prompt as a single text block, for completion-style APIs
    pub fn as_single_text(&self) -> String {
        format!("{}\n\n{}", self.system, self.user)
    }
}

/// Structured troubleshooting insight produced by an LLM backend
///
/// This structure matches the JSON the backends instruct the model to emit.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ModelInsight {
    /// Brief description of the main issue or finding
    pub summary: String,
    /// Most likely underlying cause, when the model can name one
    pub root_cause: Option<String>,
    /// Specific actionable steps
    pub recommendations: Vec<String>,
    /// Severity assessment
    pub severity: Severity,
}

impl ModelInsight {
    pub fn new(
        summary: String,
        root_cause: Option<String>,
        recommendations: Vec<String>,
        severity: Severity,
    ) -> Self {
        Self {
            summary,
            root_cause,
            recommendations,
            severity,
        }
    }
}
