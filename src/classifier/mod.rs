//! Alert classification into the fixed event-ID taxonomy
pub mod rules;

pub use rules::KeywordRule;

use crate::alert::EventId;
use log::{debug, info};

/// Which event-ID taxonomy the assistant classifies against
///
/// The `ai-alert` binary uses the general system taxonomy, `ai-dba` the
/// database taxonomy.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Taxonomy {
    /// General system alerts (SYS/NET/STO/APP/AUTH event IDs)
    General,
    /// Database alarms (DB event IDs)
    Database,
}

impl Taxonomy {
    /// The fallback event ID for text matching no rule in this taxonomy
    pub fn unknown_event(&self) -> EventId {
        match self {
            Taxonomy::General => EventId::AlertUnknown,
            Taxonomy::Database => EventId::DbUnknown,
        }
    }
}

/// Pattern-matching classifier mapping alert text to one event ID
///
/// Rules are evaluated in a fixed order and the first matching rule wins.
/// Text that matches no rule is classified as the taxonomy's unknown event.
pub struct Classifier {
    rules: Vec<KeywordRule>,
    fallback: EventId,
}

impl Classifier {
    /// Create a classifier with the built-in rule set for a taxonomy
    pub fn for_taxonomy(taxonomy: Taxonomy) -> Self {
        let rules = match taxonomy {
            Taxonomy::General => rules::general_rules(),
            Taxonomy::Database => rules::database_rules(),
        };

        Self {
            rules,
            fallback: taxonomy.unknown_event(),
        }
    }

    /// Classify an alert message into an event ID
    pub fn classify(&self, message: &str) -> EventId {
        let lowered = message.to_lowercase();

        for rule in &self.rules {
            if rule.matches(&lowered) {
                info!("Alert classified as {}", rule.event_id());
                return rule.event_id();
            }
        }

        debug!("No classification rule matched, falling back to {}", self.fallback);
        self.fallback
    }
}

/// Domain terms recognized by the keyword extractor
const SEARCH_TERMS: &[&str] = &[
    "cpu",
    "memory",
    "disk",
    "connection",
    "network",
    "timeout",
    "service",
    "application",
    "authentication",
    "replication",
    "deadlock",
    "backup",
    "performance",
    "query",
    "lock",
];

/// Extract documentation search keywords from an alert message
///
/// Returns the known domain terms that appear in the message plus any numeric
/// threshold tokens (e.g. `95%`), preserving the order of first appearance.
pub fn extract_keywords(message: &str) -> Vec<String> {
    let lowered = message.to_lowercase();
    let mut keywords: Vec<String> = SEARCH_TERMS
        .iter()
        .filter(|term| lowered.contains(*term))
        .map(|term| term.to_string())
        .collect();

    keywords.extend(numeric_tokens(message));
    keywords
}

/// Scan for digit runs, keeping a trailing percent sign when present
fn numeric_tokens(message: &str) -> Vec<String> {
    let mut tokens = Vec::new();
    let mut current = String::new();
    let mut chars = message.chars().peekable();

    while let Some(c) = chars.next() {
        if c.is_ascii_digit() {
            current.push(c);
            if chars.peek() == Some(&'%') {
                current.push('%');
                chars.next();
                tokens.push(std::mem::take(&mut current));
            }
        } else if !current.is_empty() {
            tokens.push(std::mem::take(&mut current));
        }
    }

    if !current.is_empty() {
        tokens.push(current);
    }

    tokens
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_general_classification_mappings() {
        let classifier = Classifier::for_taxonomy(Taxonomy::General);

        assert_eq!(
            classifier.classify("CPU usage is high on web-01"),
            EventId::HighCpu
        );
        assert_eq!(
            classifier.classify("Memory exhausted on app server"),
            EventId::MemoryPressure
        );
        assert_eq!(
            classifier.classify("Connection limit reached on load balancer"),
            EventId::ConnectionLimit
        );
        assert_eq!(
            classifier.classify("Disk space running out on /var"),
            EventId::DiskSpace
        );
        assert_eq!(
            classifier.classify("Payment service is down"),
            EventId::ServiceDown
        );
        assert_eq!(
            classifier.classify("Application failed to respond"),
            EventId::ServiceDown
        );
        assert_eq!(
            classifier.classify("Login errors reported by multiple users"),
            EventId::AuthFailure
        );
        assert_eq!(
            classifier.classify("Request timeout talking to upstream"),
            EventId::NetworkTimeout
        );
    }

    #[test]
    fn test_general_classification_numeric_thresholds() {
        let classifier = Classifier::for_taxonomy(Taxonomy::General);

        assert_eq!(classifier.classify("cpu at 95% for 10 minutes"), EventId::HighCpu);
        assert_eq!(classifier.classify("cpu above 90 percent"), EventId::HighCpu);
    }

    #[test]
    fn test_general_unknown_fallback() {
        let classifier = Classifier::for_taxonomy(Taxonomy::General);

        assert_eq!(
            classifier.classify("Something strange happened"),
            EventId::AlertUnknown
        );
        assert_eq!(classifier.classify(""), EventId::AlertUnknown);
    }

    #[test]
    fn test_database_classification_mappings() {
        let classifier = Classifier::for_taxonomy(Taxonomy::Database);

        assert_eq!(
            classifier.classify("Database CPU high on primary"),
            EventId::DbHighCpu
        );
        assert_eq!(
            classifier.classify("memory critical on replica"),
            EventId::DbMemoryPressure
        );
        assert_eq!(
            classifier.classify("maximum connection count hit"),
            EventId::DbConnectionLimit
        );
        assert_eq!(
            classifier.classify("disk is full on data volume"),
            EventId::DbDiskSpace
        );
        assert_eq!(
            classifier.classify("replication lag exceeds 30s"),
            EventId::DbReplicationLag
        );
        assert_eq!(
            classifier.classify("Deadlock detected in orders schema"),
            EventId::DbDeadlock
        );
        assert_eq!(
            classifier.classify("Nightly backup failed"),
            EventId::DbBackupFailure
        );
    }

    #[test]
    fn test_database_unknown_fallback() {
        let classifier = Classifier::for_taxonomy(Taxonomy::Database);

        assert_eq!(
            classifier.classify("vacuum ran longer than usual"),
            EventId::DbUnknown
        );
    }

    #[test]
    fn test_first_match_wins() {
        // CPU rule precedes the disk rule, so a message matching both
        // classifies as high CPU.
        let classifier = Classifier::for_taxonomy(Taxonomy::General);

        assert_eq!(
            classifier.classify("cpu high and disk full at the same time"),
            EventId::HighCpu
        );
    }

    #[test]
    fn test_classification_is_case_insensitive() {
        let classifier = Classifier::for_taxonomy(Taxonomy::General);

        assert_eq!(classifier.classify("CPU HIGH"), EventId::HighCpu);
        assert_eq!(classifier.classify("cpu high"), EventId::HighCpu);
    }

    #[test]
    fn test_extract_keywords_domain_terms() {
        let keywords = extract_keywords("Database CPU high, replication lag growing");

        assert!(keywords.contains(&"cpu".to_string()));
        assert!(keywords.contains(&"replication".to_string()));
        assert!(!keywords.contains(&"backup".to_string()));
    }

    #[test]
    fn test_extract_keywords_numeric_tokens() {
        let keywords = extract_keywords("cpu at 95% for 10 minutes");

        assert!(keywords.contains(&"95%".to_string()));
        assert!(keywords.contains(&"10".to_string()));
    }

    #[test]
    fn test_extract_keywords_empty_message() {
        assert!(extract_keywords("").is_empty());
    }

    #[test]
    fn test_numeric_tokens_at_end_of_message() {
        assert_eq!(numeric_tokens("load is 42"), vec!["42".to_string()]);
    }
}
