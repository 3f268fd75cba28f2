//! Alert analysis agent
//!
//! The linear analysis pipeline: classify the alert, extract search
//! keywords, look for matching Confluence documentation, pull the curated
//! runbook entry, and ask the model for a structured insight. Documentation
//! lookup degrades gracefully: if the MCP client is not configured or the
//! search fails, analysis proceeds without excerpts and the report says so.

use crate::alert::{Alert, EventId, Timestamp};
use crate::classifier::{extract_keywords, Classifier, Taxonomy};
use crate::error::AnalysisError;
use crate::llm::{AnalysisPrompt, LlmBackend, ModelInsight};
use crate::mcp::{ConfluenceClient, SearchHit};
use crate::runbook::{runbook_for, Runbook};
use chrono::Utc;
use log::{info, warn};
use serde::Serialize;
use std::fmt::Write as _;
use std::sync::Arc;
use std::time::Duration;

/// Structured troubleshooting response for one alert
#[derive(Debug, Clone, Serialize)]
pub struct TroubleshootingReport {
    /// When the report was generated
    pub generated_at: Timestamp,
    /// The analyzed alert
    pub alert: Alert,
    /// Classification result
    pub event_id: EventId,
    /// Curated runbook entry for the event
    pub runbook: Runbook,
    /// Documentation excerpts found for the alert
    pub documentation: Vec<SearchHit>,
    /// Whether a documentation search completed successfully
    pub documentation_searched: bool,
    /// Model-generated insight
    pub insight: ModelInsight,
}

impl TroubleshootingReport {
    /// Render the report as console text
    pub fn render(&self) -> String {
        let mut out = String::new();

        let _ = writeln!(out, "Event: {} ({})", self.event_id, self.runbook.event_name);
        let _ = writeln!(out, "Severity: {}", self.insight.severity);
        let _ = writeln!(out);
        let _ = writeln!(out, "Summary: {}", self.insight.summary);
        if let Some(root_cause) = &self.insight.root_cause {
            let _ = writeln!(out, "Likely cause: {}", root_cause);
        }

        let _ = writeln!(out);
        let _ = writeln!(out, "Immediate actions:");
        for (i, action) in self.runbook.immediate_actions.iter().enumerate() {
            let _ = writeln!(out, "  {}. {}", i + 1, action);
        }

        if !self.insight.recommendations.is_empty() {
            let _ = writeln!(out);
            let _ = writeln!(out, "Recommendations:");
            for rec in &self.insight.recommendations {
                let _ = writeln!(out, "  - {}", rec);
            }
        }

        let _ = writeln!(out);
        let _ = writeln!(out, "Escalation: {}", self.runbook.escalation);

        let _ = writeln!(out);
        if self.documentation.is_empty() {
            if self.documentation_searched {
                let _ = writeln!(out, "Documentation: no matching pages found");
            } else {
                let _ = writeln!(out, "Documentation: search unavailable");
            }
        } else {
            let _ = writeln!(out, "Documentation:");
            for hit in &self.documentation {
                match &hit.url {
                    Some(url) => {
                        let _ = writeln!(out, "  - {} ({})", hit.title, url);
                    }
                    None => {
                        let _ = writeln!(out, "  - {}", hit.title);
                    }
                }
            }
        }

        out
    }
}

/// Agent that turns an alert into a troubleshooting report
pub struct AnalysisAgent {
    classifier: Classifier,
    backend: Arc<dyn LlmBackend>,
    confluence: Option<ConfluenceClient>,
    max_attempts: u32,
    base_retry_delay: Duration,
}

impl AnalysisAgent {
    /// Create an agent for a taxonomy with the given backend
    ///
    /// `confluence` is optional; without it the agent skips documentation
    /// search rather than failing.
    pub fn new(
        taxonomy: Taxonomy,
        backend: Arc<dyn LlmBackend>,
        confluence: Option<ConfluenceClient>,
    ) -> Self {
        Self {
            classifier: Classifier::for_taxonomy(taxonomy),
            backend,
            confluence,
            max_attempts: 3,
            base_retry_delay: Duration::from_secs(1),
        }
    }

    /// Override the retry policy for the model call
    pub fn with_retry(mut self, max_attempts: u32, base_delay: Duration) -> Self {
        self.max_attempts = max_attempts.max(1);
        self.base_retry_delay = base_delay;
        self
    }

    /// Analyze an alert end to end
    ///
    /// # Errors
    ///
    /// Returns `AnalysisError` when the model call fails after all retry
    /// attempts. Documentation search failures do not fail the analysis.
    pub async fn analyze(&self, alert: &Alert) -> Result<TroubleshootingReport, AnalysisError> {
        info!("Starting alert analysis: {}", alert.message);

        let event_id = self.classifier.classify(&alert.message);
        let runbook = runbook_for(event_id);
        let (documentation, documentation_searched) = self.search_documentation(alert).await;

        let prompt = build_prompt(alert, event_id, &runbook, &documentation);
        let insight = self.generate_with_retry(&prompt).await?;

        Ok(TroubleshootingReport {
            generated_at: Utc::now(),
            alert: alert.clone(),
            event_id,
            runbook,
            documentation,
            documentation_searched,
            insight,
        })
    }

    /// Search Confluence for documentation matching the alert
    ///
    /// Returns the hits and whether the search completed. Failures are
    /// logged and reported as an empty, unsearched result.
    async fn search_documentation(&self, alert: &Alert) -> (Vec<SearchHit>, bool) {
        let Some(confluence) = &self.confluence else {
            info!("No Confluence client configured, skipping documentation search");
            return (Vec::new(), false);
        };

        let keywords = extract_keywords(&alert.message);
        let query = if keywords.is_empty() {
            alert.message.clone()
        } else {
            keywords.join(" ")
        };

        match confluence.search(&query, None).await {
            Ok(hits) => {
                info!("Documentation search returned {} hits", hits.len());
                (hits, true)
            }
            Err(e) => {
                warn!("Documentation search failed, continuing without it: {}", e);
                (Vec::new(), false)
            }
        }
    }

    /// Call the model, retrying transient failures with exponential backoff
    async fn generate_with_retry(
        &self,
        prompt: &AnalysisPrompt,
    ) -> Result<ModelInsight, AnalysisError> {
        let mut attempt = 1;
        loop {
            match self.backend.generate(prompt).await {
                Ok(insight) => return Ok(insight),
                Err(e) if attempt < self.max_attempts => {
                    let delay = self.base_retry_delay * 2_u32.pow(attempt - 1);
                    warn!(
                        "Model call failed (attempt {}/{}), retrying in {:?}: {}",
                        attempt, self.max_attempts, delay, e
                    );
                    tokio::time::sleep(delay).await;
                    attempt += 1;
                }
                Err(e) => return Err(e),
            }
        }
    }
}

/// System prompt instructing the model to answer in the wire JSON format
const SYSTEM_PROMPT: &str = "You are an operations troubleshooting expert analyzing system \
alerts. Respond in JSON format with fields: summary (string), root_cause (string or null), \
recommendations (array of strings), severity (\"info\", \"warning\", or \"critical\").";

/// Compose the analysis prompt from the pipeline's findings
fn build_prompt(
    alert: &Alert,
    event_id: EventId,
    runbook: &Runbook,
    documentation: &[SearchHit],
) -> AnalysisPrompt {
    let mut user = String::new();

    let _ = writeln!(user, "## Alert");
    let _ = writeln!(user, "{}", alert.message);
    let _ = writeln!(user);
    let _ = writeln!(user, "## Classification");
    let _ = writeln!(user, "Event ID: {} ({})", event_id, runbook.event_name);
    let _ = writeln!(user);
    let _ = writeln!(user, "## Standard procedure");
    for action in runbook.immediate_actions {
        let _ = writeln!(user, "- {}", action);
    }
    let _ = writeln!(user, "Escalation: {}", runbook.escalation);

    if !documentation.is_empty() {
        let _ = writeln!(user);
        let _ = writeln!(user, "## Documentation excerpts");
        for hit in documentation {
            if hit.title.is_empty() {
                let _ = writeln!(user, "- {}", hit.excerpt);
            } else {
                let _ = writeln!(user, "- {}: {}", hit.title, hit.excerpt);
            }
        }
    }

    let _ = writeln!(user);
    let _ = writeln!(
        user,
        "Provide clear, actionable troubleshooting guidance for this alert."
    );

    AnalysisPrompt {
        system: SYSTEM_PROMPT.to_string(),
        user,
    }
}
