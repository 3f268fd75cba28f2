//! Built-in classification rules for the alert taxonomies
//!
//! Each rule pairs an event ID with keyword groups. A rule matches when every
//! group contributes at least one keyword found in the lowercased alert text.
//! Rule order matters: the classifier takes the first match.

use crate::alert::EventId;

/// A keyword-group matching rule for one event ID
///
/// `groups` is a conjunction of disjunctions: the rule matches when each
/// group has at least one keyword appearing in the text.
pub struct KeywordRule {
    event_id: EventId,
    groups: Vec<Vec<&'static str>>,
}

impl KeywordRule {
    /// Create a new rule
    ///
    /// # Arguments
    ///
    /// * `event_id` - Classification assigned when this rule matches
    /// * `groups` - Keyword groups; each group must match at least once
    pub fn new(event_id: EventId, groups: Vec<Vec<&'static str>>) -> Self {
        Self { event_id, groups }
    }

    /// Whether this rule matches the given lowercased text
    pub fn matches(&self, lowered_text: &str) -> bool {
        self.groups
            .iter()
            .all(|group| group.iter().any(|kw| lowered_text.contains(kw)))
    }

    /// The event ID this rule assigns
    pub fn event_id(&self) -> EventId {
        self.event_id
    }
}

/// Rules for the general system alert taxonomy
pub fn general_rules() -> Vec<KeywordRule> {
    vec![
        KeywordRule::new(
            EventId::HighCpu,
            vec![vec!["cpu"], vec!["high", "90", "95"]],
        ),
        KeywordRule::new(
            EventId::MemoryPressure,
            vec![vec!["memory"], vec!["critical", "exhausted"]],
        ),
        KeywordRule::new(
            EventId::ConnectionLimit,
            vec![vec!["connection"], vec!["limit", "maximum"]],
        ),
        KeywordRule::new(
            EventId::DiskSpace,
            vec![vec!["disk"], vec!["space", "full"]],
        ),
        KeywordRule::new(
            EventId::ServiceDown,
            vec![
                vec!["service", "application"],
                vec!["down", "failed", "unavailable"],
            ],
        ),
        KeywordRule::new(EventId::AuthFailure, vec![vec!["authentication", "login"]]),
        KeywordRule::new(EventId::NetworkTimeout, vec![vec!["network", "timeout"]]),
    ]
}

/// Rules for the database alarm taxonomy
pub fn database_rules() -> Vec<KeywordRule> {
    vec![
        KeywordRule::new(
            EventId::DbHighCpu,
            vec![vec!["cpu"], vec!["high", "90", "95"]],
        ),
        KeywordRule::new(
            EventId::DbMemoryPressure,
            vec![vec!["memory"], vec!["critical", "exhausted"]],
        ),
        KeywordRule::new(
            EventId::DbConnectionLimit,
            vec![vec!["connection"], vec!["limit", "maximum"]],
        ),
        KeywordRule::new(
            EventId::DbDiskSpace,
            vec![vec!["disk"], vec!["space", "full"]],
        ),
        KeywordRule::new(
            EventId::DbReplicationLag,
            vec![vec!["replication"], vec!["lag", "delay"]],
        ),
        KeywordRule::new(EventId::DbDeadlock, vec![vec!["deadlock"]]),
        KeywordRule::new(
            EventId::DbBackupFailure,
            vec![vec!["backup"], vec!["fail"]],
        ),
    ]
}
