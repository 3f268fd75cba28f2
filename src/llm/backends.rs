use crate::alert::Severity;
use crate::error::AnalysisError;
use crate::llm::{AnalysisPrompt, ModelInsight};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::future::Future;
use std::pin::Pin;
use std::time::Duration;

/// Trait for LLM backend implementations
pub trait LlmBackend: Send + Sync {
    fn generate<'a>(
        &'a self,
        prompt: &'a AnalysisPrompt,
    ) -> Pin<Box<dyn Future<Output = Result<ModelInsight, AnalysisError>> + Send + 'a>>;
}

/// Expected JSON structure from the model's response
#[derive(Debug, Serialize, Deserialize)]
struct WireInsight {
    summary: String,
    root_cause: Option<String>,
    recommendations: Vec<String>,
    severity: String,
}

impl WireInsight {
    fn into_insight(self) -> ModelInsight {
        let severity = parse_severity(&self.severity);
        ModelInsight::new(self.summary, self.root_cause, self.recommendations, severity)
    }
}

/// Parse the severity string from a model response
///
/// Models occasionally answer "high" where the instructions say "warning";
/// unknown values default to Info.
pub(crate) fn parse_severity(severity_str: &str) -> Severity {
    match severity_str.to_lowercase().as_str() {
        "critical" => Severity::Critical,
        "warning" | "high" => Severity::Warning,
        _ => Severity::Info,
    }
}

/// Extract JSON from model response text
///
/// LLMs sometimes wrap JSON in markdown code blocks or add surrounding
/// prose. This attempts to pull out the JSON portion; if no structure is
/// found the original text is returned and the caller's parse will fail
/// with a useful message.
pub(crate) fn extract_json(response_text: &str) -> String {
    let text = response_text.trim();

    if let Some(start) = text.find("```json") {
        let json_start = start + 7;
        if let Some(end) = text[json_start..].find("```") {
            return text[json_start..json_start + end].trim().to_string();
        }
    }

    if let Some(start) = text.find("```") {
        if let Some(end) = text[start + 3..].find("```") {
            let candidate = text[start + 3..start + 3 + end].trim();
            if candidate.starts_with('{') && candidate.ends_with('}') {
                return candidate.to_string();
            }
        }
    }

    if let Some(start) = text.find('{') {
        if let Some(end) = text.rfind('}') {
            if start < end {
                return text[start..=end].to_string();
            }
        }
    }

    text.to_string()
}

fn parse_wire_insight(raw: &str) -> Result<ModelInsight, AnalysisError> {
    let json_text = extract_json(raw);
    let wire: WireInsight = serde_json::from_str(&json_text).map_err(|e| {
        AnalysisError::InvalidResponse(format!(
            "Failed to parse model JSON response: {}. Response was: {}",
            e, json_text
        ))
    })?;
    Ok(wire.into_insight())
}

/// Ollama backend for local LLM inference
///
/// Communicates with a local Ollama server over its generate API.
pub struct OllamaBackend {
    client: Client,
    base_url: String,
    model: String,
}

#[derive(Debug, Serialize)]
struct OllamaRequest {
    model: String,
    prompt: String,
    stream: bool,
    options: OllamaOptions,
}

#[derive(Debug, Serialize)]
struct OllamaOptions {
    temperature: f32,
    top_p: f32,
    max_tokens: u32,
}

#[derive(Debug, Deserialize)]
struct OllamaResponse {
    response: String,
    #[allow(dead_code)]
    done: bool,
    #[serde(default)]
    error: Option<String>,
}

impl OllamaBackend {
    /// Create a new Ollama backend
    ///
    /// # Arguments
    /// * `base_url` - Ollama server URL (e.g., "http://localhost:11434")
    /// * `model` - Model name to use (e.g., "llama2", "mistral")
    pub fn new(base_url: String, model: String) -> Result<Self, AnalysisError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(60))
            .no_proxy()
            .build()?;

        Ok(Self {
            client,
            base_url,
            model,
        })
    }

    fn api_url(&self) -> String {
        format!("{}/api/generate", self.base_url.trim_end_matches('/'))
    }
}

impl LlmBackend for OllamaBackend {
    fn generate<'a>(
        &'a self,
        prompt: &'a AnalysisPrompt,
    ) -> Pin<Box<dyn Future<Output = Result<ModelInsight, AnalysisError>> + Send + 'a>> {
        Box::pin(async move {
            let request = OllamaRequest {
                model: self.model.clone(),
                prompt: prompt.as_single_text(),
                stream: false,
                options: OllamaOptions {
                    // Low temperature for consistent troubleshooting output
                    temperature: 0.1,
                    top_p: 0.9,
                    max_tokens: 1000,
                },
            };

            let response = self
                .client
                .post(self.api_url())
                .json(&request)
                .send()
                .await
                .map_err(|e| AnalysisError::BackendError(format!("HTTP request failed: {}", e)))?;

            if !response.status().is_success() {
                let status = response.status();
                let error_text = response
                    .text()
                    .await
                    .unwrap_or_else(|_| "Unknown error".to_string());
                return Err(AnalysisError::BackendError(format!(
                    "Ollama API returned error {}: {}",
                    status, error_text
                )));
            }

            let ollama_response: OllamaResponse = response.json().await.map_err(|e| {
                AnalysisError::InvalidResponse(format!("Failed to parse Ollama response: {}", e))
            })?;

            if let Some(error) = ollama_response.error {
                return Err(AnalysisError::BackendError(format!(
                    "Ollama error: {}",
                    error
                )));
            }

            parse_wire_insight(&ollama_response.response)
        })
    }
}

/// OpenAI backend for hosted LLM inference
///
/// Talks to the chat completions API with JSON response format enforced.
/// Also works against any OpenAI-compatible endpoint via `with_base_url`.
pub struct OpenAiBackend {
    client: Client,
    api_key: String,
    model: String,
    base_url: String,
}

#[derive(Debug, Serialize)]
struct OpenAiRequest {
    model: String,
    messages: Vec<OpenAiMessage>,
    temperature: f32,
    max_tokens: u32,
    response_format: OpenAiResponseFormat,
}

#[derive(Debug, Serialize)]
struct OpenAiMessage {
    role: String,
    content: String,
}

#[derive(Debug, Serialize)]
struct OpenAiResponseFormat {
    #[serde(rename = "type")]
    format_type: String,
}

#[derive(Debug, Deserialize)]
struct OpenAiResponse {
    choices: Vec<OpenAiChoice>,
    #[serde(default)]
    error: Option<OpenAiError>,
}

#[derive(Debug, Deserialize)]
struct OpenAiChoice {
    message: OpenAiResponseMessage,
    #[allow(dead_code)]
    finish_reason: Option<String>,
}

#[derive(Debug, Deserialize)]
struct OpenAiResponseMessage {
    content: String,
}

#[derive(Debug, Deserialize)]
struct OpenAiError {
    message: String,
    #[serde(rename = "type")]
    error_type: String,
}

impl OpenAiBackend {
    /// Create a new OpenAI backend against the public API
    pub fn new(api_key: String, model: String) -> Result<Self, AnalysisError> {
        Self::with_base_url(api_key, model, "https://api.openai.com/v1".to_string())
    }

    /// Create a backend against a custom OpenAI-compatible endpoint
    pub fn with_base_url(
        api_key: String,
        model: String,
        base_url: String,
    ) -> Result<Self, AnalysisError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(60))
            .no_proxy()
            .build()?;

        Ok(Self {
            client,
            api_key,
            model,
            base_url,
        })
    }

    fn api_url(&self) -> String {
        format!("{}/chat/completions", self.base_url.trim_end_matches('/'))
    }
}

impl LlmBackend for OpenAiBackend {
    fn generate<'a>(
        &'a self,
        prompt: &'a AnalysisPrompt,
    ) -> Pin<Box<dyn Future<Output = Result<ModelInsight, AnalysisError>> + Send + 'a>> {
        Box::pin(async move {
            let request = OpenAiRequest {
                model: self.model.clone(),
                messages: vec![
                    OpenAiMessage {
                        role: "system".to_string(),
                        content: prompt.system.clone(),
                    },
                    OpenAiMessage {
                        role: "user".to_string(),
                        content: prompt.user.clone(),
                    },
                ],
                temperature: 0.1,
                max_tokens: 1000,
                response_format: OpenAiResponseFormat {
                    format_type: "json_object".to_string(),
                },
            };

            let response = self
                .client
                .post(self.api_url())
                .header("Authorization", format!("Bearer {}", self.api_key))
                .header("Content-Type", "application/json")
                .json(&request)
                .send()
                .await
                .map_err(|e| AnalysisError::BackendError(format!("HTTP request failed: {}", e)))?;

            if !response.status().is_success() {
                let status = response.status();
                let error_text = response
                    .text()
                    .await
                    .unwrap_or_else(|_| "Unknown error".to_string());
                return Err(AnalysisError::BackendError(format!(
                    "OpenAI API returned error {}: {}",
                    status, error_text
                )));
            }

            let openai_response: OpenAiResponse = response.json().await.map_err(|e| {
                AnalysisError::InvalidResponse(format!("Failed to parse OpenAI response: {}", e))
            })?;

            if let Some(error) = openai_response.error {
                return Err(AnalysisError::BackendError(format!(
                    "OpenAI API error ({}): {}",
                    error.error_type, error.message
                )));
            }

            let content = openai_response
                .choices
                .first()
                .ok_or_else(|| {
                    AnalysisError::InvalidResponse("No choices in OpenAI response".to_string())
                })?
                .message
                .content
                .clone();

            parse_wire_insight(&content)
        })
    }
}

/// Mock backend for testing and offline development
///
/// Returns configurable canned responses, optionally after a delay, and
/// tracks invocations so tests can assert on the prompts it received.
pub struct MockBackend {
    responses: Vec<Result<ModelInsight, MockError>>,
    current_index: std::sync::Mutex<usize>,
    delay: Option<Duration>,
    call_count: std::sync::Mutex<usize>,
    last_prompt: std::sync::Mutex<Option<AnalysisPrompt>>,
}

/// Cloneable stand-in for AnalysisError, which is not Clone
#[derive(Debug, Clone)]
enum MockError {
    Backend(String),
    Timeout,
}

impl MockError {
    fn to_analysis_error(&self) -> AnalysisError {
        match self {
            MockError::Backend(msg) => AnalysisError::BackendError(msg.clone()),
            MockError::Timeout => AnalysisError::Timeout,
        }
    }
}

impl MockBackend {
    /// Mock that always returns the given insight
    pub fn with_insight(insight: ModelInsight) -> Self {
        Self::with_responses(vec![Ok(insight)])
    }

    /// Mock that always returns a generic successful insight
    pub fn success() -> Self {
        Self::with_insight(ModelInsight::new(
            "Mock analysis summary".to_string(),
            Some("Mock root cause".to_string()),
            vec![
                "Mock recommendation 1".to_string(),
                "Mock recommendation 2".to_string(),
            ],
            Severity::Info,
        ))
    }

    /// Mock that always fails with a backend error
    pub fn error(message: String) -> Self {
        Self::with_responses(vec![Err(MockError::Backend(message))])
    }

    /// Mock that always fails with a timeout
    pub fn timeout() -> Self {
        Self::with_responses(vec![Err(MockError::Timeout)])
    }

    /// Mock cycling through the given responses in order
    pub fn cycling(responses: Vec<Result<ModelInsight, String>>) -> Self {
        Self::with_responses(
            responses
                .into_iter()
                .map(|r| r.map_err(MockError::Backend))
                .collect(),
        )
    }

    fn with_responses(responses: Vec<Result<ModelInsight, MockError>>) -> Self {
        assert!(
            !responses.is_empty(),
            "MockBackend requires at least one response"
        );
        Self {
            responses,
            current_index: std::sync::Mutex::new(0),
            delay: None,
            call_count: std::sync::Mutex::new(0),
            last_prompt: std::sync::Mutex::new(None),
        }
    }

    /// Add a delay to every response
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    /// Number of times generate() has been called
    pub fn call_count(&self) -> usize {
        *self.call_count.lock().unwrap()
    }

    /// The last prompt passed to generate()
    pub fn last_prompt(&self) -> Option<AnalysisPrompt> {
        self.last_prompt.lock().unwrap().clone()
    }
}

impl LlmBackend for MockBackend {
    fn generate<'a>(
        &'a self,
        prompt: &'a AnalysisPrompt,
    ) -> Pin<Box<dyn Future<Output = Result<ModelInsight, AnalysisError>> + Send + 'a>> {
        Box::pin(async move {
            *self.call_count.lock().unwrap() += 1;
            *self.last_prompt.lock().unwrap() = Some(prompt.clone());

            if let Some(delay) = self.delay {
                tokio::time::sleep(delay).await;
            }

            let mut index = self.current_index.lock().unwrap();
            let response = &self.responses[*index % self.responses.len()];
            *index += 1;

            match response {
                Ok(insight) => Ok(insight.clone()),
                Err(e) => Err(e.to_analysis_error()),
            }
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_prompt() -> AnalysisPrompt {
        AnalysisPrompt {
            system: "You are a troubleshooting assistant.".to_string(),
            user: "Analyze: replication lag over 30s".to_string(),
        }
    }

    #[test]
    fn test_ollama_api_url_formatting() {
        let with_slash =
            OllamaBackend::new("http://localhost:11434/".to_string(), "llama2".to_string())
                .unwrap();
        assert_eq!(with_slash.api_url(), "http://localhost:11434/api/generate");

        let without_slash =
            OllamaBackend::new("http://localhost:11434".to_string(), "llama2".to_string())
                .unwrap();
        assert_eq!(
            without_slash.api_url(),
            "http://localhost:11434/api/generate"
        );
    }

    #[test]
    fn test_openai_backend_urls() {
        let backend =
            OpenAiBackend::new("sk-test-key".to_string(), "gpt-4".to_string()).unwrap();
        assert_eq!(
            backend.api_url(),
            "https://api.openai.com/v1/chat/completions"
        );

        let custom = OpenAiBackend::with_base_url(
            "sk-test-key".to_string(),
            "gpt-4".to_string(),
            "https://llm.internal/v1/".to_string(),
        )
        .unwrap();
        assert_eq!(custom.api_url(), "https://llm.internal/v1/chat/completions");
    }

    #[test]
    fn test_parse_severity() {
        assert_eq!(parse_severity("critical"), Severity::Critical);
        assert_eq!(parse_severity("CRITICAL"), Severity::Critical);
        assert_eq!(parse_severity("warning"), Severity::Warning);
        assert_eq!(parse_severity("high"), Severity::Warning);
        assert_eq!(parse_severity("info"), Severity::Info);
        assert_eq!(parse_severity("unknown"), Severity::Info);
    }

    #[test]
    fn test_extract_json_from_markdown_block() {
        let response = "Here's the analysis:\n\n```json\n{\"summary\": \"High CPU\"}\n```\n\nDone.";
        let json = extract_json(response);
        assert_eq!(json, "{\"summary\": \"High CPU\"}");
    }

    #[test]
    fn test_extract_json_fenced_block_with_braces_in_prose() {
        // Braces in the surrounding prose must not win over the fenced JSON.
        let response = "Check the {affected} host first:\n\
                        ```json\n\
                        {\"summary\": \"High CPU\", \"root_cause\": null, \
                        \"recommendations\": [], \"severity\": \"warning\"}\n\
                        ```\n\
                        Then {rerun} the check.";

        let insight = parse_wire_insight(response).unwrap();
        assert_eq!(insight.summary, "High CPU");
        assert_eq!(insight.severity, Severity::Warning);
    }

    #[test]
    fn test_extract_json_from_plain_code_block() {
        let response = "Result:\n```\n{\"summary\": \"Memory issue\"}\n```";
        let json = extract_json(response);
        assert_eq!(json, "{\"summary\": \"Memory issue\"}");
    }

    #[test]
    fn test_extract_json_from_surrounding_text() {
        let response = "Analysis shows: {\"summary\": \"Test\"} - end";
        let json = extract_json(response);
        assert_eq!(json, "{\"summary\": \"Test\"}");
    }

    #[test]
    fn test_extract_json_passes_through_plain_json() {
        let response = r#"{"summary": "OK", "root_cause": null, "recommendations": [], "severity": "info"}"#;
        assert_eq!(extract_json(response), response);
    }

    #[test]
    fn test_parse_wire_insight() {
        let raw = r#"{
            "summary": "Replication lag growing",
            "root_cause": "Replica I/O saturation",
            "recommendations": ["Throttle batch writes", "Check replica disks"],
            "severity": "warning"
        }"#;

        let insight = parse_wire_insight(raw).unwrap();
        assert_eq!(insight.summary, "Replication lag growing");
        assert_eq!(
            insight.root_cause,
            Some("Replica I/O saturation".to_string())
        );
        assert_eq!(insight.recommendations.len(), 2);
        assert_eq!(insight.severity, Severity::Warning);
    }

    #[test]
    fn test_parse_wire_insight_rejects_malformed_json() {
        let result = parse_wire_insight("not json at all");
        assert!(matches!(result, Err(AnalysisError::InvalidResponse(_))));
    }

    #[tokio::test]
    async fn test_mock_backend_success() {
        let backend = MockBackend::success();
        let prompt = test_prompt();

        let insight = backend.generate(&prompt).await.unwrap();
        assert_eq!(insight.summary, "Mock analysis summary");
        assert_eq!(backend.call_count(), 1);
        assert_eq!(backend.last_prompt().unwrap(), prompt);
    }

    #[tokio::test]
    async fn test_mock_backend_error() {
        let backend = MockBackend::error("boom".to_string());

        let result = backend.generate(&test_prompt()).await;
        match result {
            Err(AnalysisError::BackendError(msg)) => assert_eq!(msg, "boom"),
            other => panic!("expected BackendError, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_mock_backend_timeout() {
        let backend = MockBackend::timeout();
        let result = backend.generate(&test_prompt()).await;
        assert!(matches!(result, Err(AnalysisError::Timeout)));
    }

    #[tokio::test]
    async fn test_mock_backend_cycles_responses() {
        let ok = ModelInsight::new("ok".to_string(), None, vec![], Severity::Info);
        let backend = MockBackend::cycling(vec![Ok(ok), Err("fail".to_string())]);
        let prompt = test_prompt();

        assert!(backend.generate(&prompt).await.is_ok());
        assert!(backend.generate(&prompt).await.is_err());
        assert!(backend.generate(&prompt).await.is_ok());
        assert_eq!(backend.call_count(), 3);
    }

    #[test]
    #[should_panic(expected = "at least one response")]
    fn test_mock_backend_rejects_empty_response_list() {
        let _ = MockBackend::cycling(vec![]);
    }

    #[tokio::test]
    async fn test_mock_backend_with_delay() {
        let backend = MockBackend::success().with_delay(Duration::from_millis(10));
        let start = std::time::Instant::now();
        backend.generate(&test_prompt()).await.unwrap();
        assert!(start.elapsed() >= Duration::from_millis(10));
    }

    // Integration tests against live servers require credentials and are ignored.
    #[tokio::test]
    #[ignore = "Requires running Ollama server"]
    async fn test_ollama_backend_integration() {
        let backend =
            OllamaBackend::new("http://localhost:11434".to_string(), "llama2".to_string())
                .unwrap();
        let result = backend.generate(&test_prompt()).await;
        match result {
            Ok(insight) => assert!(!insight.summary.is_empty()),
            Err(e) => println!("Expected error (no Ollama server): {:?}", e),
        }
    }
}
