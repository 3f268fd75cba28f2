//! Model provider factory
//!
//! Maps the resolved `ModelConfig` onto a concrete backend handle.

use crate::config::ModelConfig;
use crate::error::AnalysisError;
use crate::llm::backends::{LlmBackend, MockBackend, OllamaBackend, OpenAiBackend};
use log::info;
use std::sync::Arc;

/// Construct the LLM backend selected by configuration
///
/// # Errors
///
/// Returns `AnalysisError` if the underlying HTTP client cannot be built.
pub fn backend_from_settings(model: &ModelConfig) -> Result<Arc<dyn LlmBackend>, AnalysisError> {
    match model {
        ModelConfig::OpenAi { api_key, model } => {
            info!("Creating OpenAI backend: {}", model);
            Ok(Arc::new(OpenAiBackend::new(
                api_key.clone(),
                model.clone(),
            )?))
        }
        ModelConfig::Ollama { base_url, model } => {
            info!("Creating Ollama backend: {} at {}", model, base_url);
            Ok(Arc::new(OllamaBackend::new(
                base_url.clone(),
                model.clone(),
            )?))
        }
        ModelConfig::Mock => {
            info!("Creating mock backend");
            Ok(Arc::new(MockBackend::success()))
        }
    }
}
