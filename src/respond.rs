//! Frontline response stage
//!
//! Second stage after analysis: turns a troubleshooting report into a
//! message suitable for the on-call engineer and dispatches it through the
//! configured notification channels. The channels here are simulations that
//! log what a real integration would send. If the model call fails, the
//! responder falls back to a message assembled from the analysis report
//! instead of failing the whole run.

use crate::agent::TroubleshootingReport;
use crate::alert::Severity;
use crate::llm::{AnalysisPrompt, LlmBackend, ModelInsight};
use crate::logging::styled_log;
use console::Color;
use log::{info, warn};
use std::fmt::Write as _;
use std::sync::Arc;

/// A notification channel to the on-call engineer
pub trait Notifier: Send + Sync {
    /// Channel name, e.g. "email"
    fn channel(&self) -> &'static str;

    /// Deliver a message and return a delivery confirmation
    fn notify(&self, recipient: &str, message: &str) -> String;
}

/// Simulated email channel
pub struct EmailNotifier;

impl Notifier for EmailNotifier {
    fn channel(&self) -> &'static str {
        "email"
    }

    fn notify(&self, recipient: &str, message: &str) -> String {
        styled_log("EMAIL", &format!("To {}: {}", recipient, message), Color::Cyan);
        format!("Email sent to {}", recipient)
    }
}

/// Simulated phone call channel
pub struct PhoneNotifier;

impl Notifier for PhoneNotifier {
    fn channel(&self) -> &'static str {
        "phone"
    }

    fn notify(&self, recipient: &str, message: &str) -> String {
        styled_log(
            "PHONE",
            &format!("Calling {}: {}", recipient, message),
            Color::Magenta,
        );
        format!("Phone call placed to {}", recipient)
    }
}

/// Outcome of the frontline response stage
#[derive(Debug, Clone)]
pub struct FrontlineResponse {
    /// Message prepared for the on-call engineer
    pub message: String,
    /// Delivery confirmations from the channels used
    pub notifications: Vec<String>,
    /// True when the model call failed and the message was assembled
    /// from the analysis report instead
    pub fell_back: bool,
}

/// Default recipient when no on-call contact is configured
const DEFAULT_RECIPIENT: &str = "on-call engineer";

const RESPONDER_SYSTEM_PROMPT: &str = "You are a frontline incident responder. Given an \
analyzed alert, write a concise handoff message for the on-call engineer. Respond in JSON \
format with fields: summary (string), root_cause (string or null), recommendations (array \
of strings), severity (\"info\", \"warning\", or \"critical\").";

/// Prepares and dispatches the on-call handoff for an analyzed alert
pub struct FrontlineResponder {
    backend: Arc<dyn LlmBackend>,
    notifiers: Vec<Box<dyn Notifier>>,
    recipient: String,
}

impl FrontlineResponder {
    /// Responder with the simulated email and phone channels
    pub fn new(backend: Arc<dyn LlmBackend>) -> Self {
        Self::with_notifiers(
            backend,
            vec![Box::new(EmailNotifier), Box::new(PhoneNotifier)],
            DEFAULT_RECIPIENT.to_string(),
        )
    }

    /// Responder with custom channels and recipient
    pub fn with_notifiers(
        backend: Arc<dyn LlmBackend>,
        notifiers: Vec<Box<dyn Notifier>>,
        recipient: String,
    ) -> Self {
        Self {
            backend,
            notifiers,
            recipient,
        }
    }

    /// Produce the handoff message and dispatch notifications
    ///
    /// Never fails: a model error downgrades to a fallback message built
    /// from the analysis report.
    pub async fn respond(&self, report: &TroubleshootingReport) -> FrontlineResponse {
        let prompt = build_responder_prompt(report);

        let (message, fell_back) = match self.backend.generate(&prompt).await {
            Ok(insight) => (format_handoff(&insight), false),
            Err(e) => {
                warn!("Frontline model call failed, using analysis report: {}", e);
                (fallback_message(report), true)
            }
        };

        let notifications = self.dispatch(report.insight.severity, &message);
        FrontlineResponse {
            message,
            notifications,
            fell_back,
        }
    }

    /// Pick channels by severity: critical pages every channel, warning
    /// goes to email only, info stays on the console.
    fn dispatch(&self, severity: Severity, message: &str) -> Vec<String> {
        let channels: &[&str] = match severity {
            Severity::Critical => &["email", "phone"],
            Severity::Warning => &["email"],
            Severity::Info => &[],
        };

        let mut confirmations = Vec::new();
        for notifier in &self.notifiers {
            if channels.contains(&notifier.channel()) {
                info!("Notifying via {}", notifier.channel());
                confirmations.push(notifier.notify(&self.recipient, message));
            }
        }
        confirmations
    }
}

fn build_responder_prompt(report: &TroubleshootingReport) -> AnalysisPrompt {
    let mut user = String::new();
    let _ = writeln!(user, "## Analyzed alert");
    let _ = writeln!(user, "Alert: {}", report.alert.message);
    let _ = writeln!(
        user,
        "Event: {} ({})",
        report.event_id, report.runbook.event_name
    );
    let _ = writeln!(user, "Severity: {}", report.insight.severity);
    let _ = writeln!(user, "Analysis: {}", report.insight.summary);
    if let Some(root_cause) = &report.insight.root_cause {
        let _ = writeln!(user, "Likely cause: {}", root_cause);
    }
    for rec in &report.insight.recommendations {
        let _ = writeln!(user, "- {}", rec);
    }
    let _ = writeln!(user);
    let _ = writeln!(
        user,
        "Write the handoff message for the on-call engineer."
    );

    AnalysisPrompt {
        system: RESPONDER_SYSTEM_PROMPT.to_string(),
        user,
    }
}

fn format_handoff(insight: &ModelInsight) -> String {
    let mut message = insight.summary.clone();
    if !insight.recommendations.is_empty() {
        message.push_str(" Next steps: ");
        message.push_str(&insight.recommendations.join("; "));
        message.push('.');
    }
    message
}

fn fallback_message(report: &TroubleshootingReport) -> String {
    format!(
        "[{}] {}: {}. Immediate actions: {}. Escalation: {}",
        report.event_id,
        report.runbook.event_name,
        report.insight.summary,
        report.runbook.immediate_actions.join("; "),
        report.runbook.escalation
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::alert::{Alert, EventId};
    use crate::llm::MockBackend;
    use crate::runbook::runbook_for;
    use chrono::Utc;
    use std::sync::Mutex;

    /// Records deliveries instead of printing them
    struct RecordingNotifier {
        name: &'static str,
        deliveries: Arc<Mutex<Vec<(String, String)>>>,
    }

    impl Notifier for RecordingNotifier {
        fn channel(&self) -> &'static str {
            self.name
        }

        fn notify(&self, recipient: &str, message: &str) -> String {
            self.deliveries
                .lock()
                .unwrap()
                .push((recipient.to_string(), message.to_string()));
            format!("{} delivered", self.name)
        }
    }

    fn report_with_severity(severity: Severity) -> TroubleshootingReport {
        TroubleshootingReport {
            generated_at: Utc::now(),
            alert: Alert::new("CPU usage at 95% on web-01"),
            event_id: EventId::HighCpu,
            runbook: runbook_for(EventId::HighCpu),
            documentation: vec![],
            documentation_searched: false,
            insight: ModelInsight::new(
                "CPU saturated".to_string(),
                Some("Runaway process".to_string()),
                vec!["Kill the process".to_string()],
                severity,
            ),
        }
    }

    fn recording_responder(
        backend: Arc<dyn LlmBackend>,
    ) -> (FrontlineResponder, Arc<Mutex<Vec<(String, String)>>>) {
        let email_log = Arc::new(Mutex::new(Vec::new()));
        let phone_log = Arc::clone(&email_log);
        let responder = FrontlineResponder::with_notifiers(
            backend,
            vec![
                Box::new(RecordingNotifier {
                    name: "email",
                    deliveries: Arc::clone(&email_log),
                }),
                Box::new(RecordingNotifier {
                    name: "phone",
                    deliveries: phone_log,
                }),
            ],
            "dba-oncall".to_string(),
        );
        (responder, email_log)
    }

    #[tokio::test]
    async fn test_respond_uses_model_output() {
        let insight = ModelInsight::new(
            "Restart the web tier".to_string(),
            None,
            vec!["Drain traffic first".to_string()],
            Severity::Info,
        );
        let backend = Arc::new(MockBackend::with_insight(insight));
        let (responder, _) = recording_responder(backend);

        let response = responder.respond(&report_with_severity(Severity::Info)).await;
        assert!(!response.fell_back);
        assert!(response.message.contains("Restart the web tier"));
        assert!(response.message.contains("Drain traffic first"));
    }

    #[tokio::test]
    async fn test_respond_falls_back_when_model_fails() {
        let backend = Arc::new(MockBackend::error("model unavailable".to_string()));
        let (responder, _) = recording_responder(backend);

        let response = responder.respond(&report_with_severity(Severity::Info)).await;
        assert!(response.fell_back);
        assert!(response.message.contains("SYS-001"));
        assert!(response.message.contains("CPU saturated"));
        assert!(response.message.contains("Escalation:"));
    }

    #[tokio::test]
    async fn test_critical_alert_notifies_all_channels() {
        let backend = Arc::new(MockBackend::success());
        let (responder, deliveries) = recording_responder(backend);

        let response = responder
            .respond(&report_with_severity(Severity::Critical))
            .await;
        assert_eq!(response.notifications.len(), 2);
        assert_eq!(deliveries.lock().unwrap().len(), 2);
        assert!(deliveries
            .lock()
            .unwrap()
            .iter()
            .all(|(recipient, _)| recipient == "dba-oncall"));
    }

    #[tokio::test]
    async fn test_warning_alert_notifies_email_only() {
        let backend = Arc::new(MockBackend::success());
        let (responder, _) = recording_responder(backend);

        let response = responder
            .respond(&report_with_severity(Severity::Warning))
            .await;
        assert_eq!(response.notifications, vec!["email delivered".to_string()]);
    }

    #[tokio::test]
    async fn test_info_alert_sends_no_notifications() {
        let backend = Arc::new(MockBackend::success());
        let (responder, deliveries) = recording_responder(backend);

        let response = responder.respond(&report_with_severity(Severity::Info)).await;
        assert!(response.notifications.is_empty());
        assert!(deliveries.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_prompt_carries_report_context() {
        let backend = Arc::new(MockBackend::success());
        let (responder, _) = recording_responder(backend.clone());

        responder
            .respond(&report_with_severity(Severity::Warning))
            .await;

        let prompt = backend.last_prompt().unwrap();
        assert!(prompt.user.contains("CPU usage at 95% on web-01"));
        assert!(prompt.user.contains("SYS-001"));
        assert!(prompt.user.contains("Runaway process"));
    }

    #[test]
    fn test_builtin_notifiers_confirm_delivery() {
        let email = EmailNotifier.notify("oncall", "check web-01");
        assert_eq!(email, "Email sent to oncall");

        let phone = PhoneNotifier.notify("oncall", "check web-01");
        assert_eq!(phone, "Phone call placed to oncall");
    }
}
