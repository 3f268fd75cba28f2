//! Static troubleshooting procedures per event ID
//!
//! These entries are the curated first-response steps the assistant always
//! has on hand, independent of whatever live documentation the Confluence
//! search turns up. Unknown events get a generic fallback entry.

use crate::alert::{EventId, Severity};
use serde::Serialize;

/// Curated troubleshooting procedure for one event ID
#[derive(Debug, Clone, Copy, Serialize, PartialEq)]
pub struct Runbook {
    /// Human-readable event name
    pub event_name: &'static str,
    /// Actions to take right away, in order
    pub immediate_actions: &'static [&'static str],
    /// When and how to escalate
    pub escalation: &'static str,
    /// Severity assigned to this event class
    pub severity: Severity,
}

/// Look up the runbook entry for an event ID
pub fn runbook_for(event_id: EventId) -> Runbook {
    match event_id {
        EventId::HighCpu => Runbook {
            event_name: "High CPU Usage",
            immediate_actions: &[
                "Check top processes consuming CPU",
                "Review system load averages",
                "Identify resource-intensive applications",
                "Consider scaling or load balancing",
            ],
            escalation: "If CPU remains high for >15 minutes, page on-call engineer",
            severity: Severity::Critical,
        },
        EventId::MemoryPressure => Runbook {
            event_name: "Memory Pressure",
            immediate_actions: &[
                "Review memory usage by processes",
                "Check for memory leaks in applications",
                "Clear unnecessary caches",
                "Monitor swap usage and consider restart",
            ],
            escalation: "Critical - immediate system admin involvement required",
            severity: Severity::Critical,
        },
        EventId::ConnectionLimit => Runbook {
            event_name: "Connection Limit Reached",
            immediate_actions: &[
                "Review active connections",
                "Check for connection leaks in applications",
                "Increase connection limits if appropriate",
                "Monitor connection pool usage",
            ],
            escalation: "If connections don't decrease within 10 minutes",
            severity: Severity::Critical,
        },
        EventId::NetworkTimeout => Runbook {
            event_name: "Network/Timeout Issues",
            immediate_actions: &[
                "Check network connectivity",
                "Review firewall and routing rules",
                "Test DNS resolution",
                "Monitor network latency and packet loss",
            ],
            escalation: "If affecting multiple services, escalate",
            severity: Severity::Warning,
        },
        EventId::DiskSpace => Runbook {
            event_name: "Disk Space Low",
            immediate_actions: &[
                "Identify largest files and directories",
                "Clean up temporary files and logs",
                "Archive old data if possible",
                "Consider adding storage capacity",
            ],
            escalation: "If disk usage >95%, immediate action required",
            severity: Severity::Warning,
        },
        EventId::ServiceDown => Runbook {
            event_name: "Service/Application Down",
            immediate_actions: &[
                "Check service status and logs",
                "Attempt service restart",
                "Verify dependencies are running",
                "Check for recent deployments or changes",
            ],
            escalation: "If service doesn't recover in 5 minutes, escalate",
            severity: Severity::Critical,
        },
        EventId::AuthFailure => Runbook {
            event_name: "Authentication Issues",
            immediate_actions: &[
                "Check authentication service status",
                "Review authentication logs",
                "Verify user credentials and permissions",
                "Check network connectivity to auth services",
            ],
            escalation: "If affecting multiple users, escalate immediately",
            severity: Severity::Warning,
        },
        EventId::DbHighCpu => Runbook {
            event_name: "High Database CPU Usage",
            immediate_actions: &[
                "Check current running queries",
                "Identify long-running transactions",
                "Review connection pool usage",
                "Check for blocking locks",
            ],
            escalation: "If CPU remains high for >15 minutes, page on-call DBA",
            severity: Severity::Critical,
        },
        EventId::DbMemoryPressure => Runbook {
            event_name: "Database Memory Pressure",
            immediate_actions: &[
                "Review memory allocation settings",
                "Check for memory leaks in applications",
                "Restart non-critical database connections",
                "Monitor swap usage",
            ],
            escalation: "Critical - immediate DBA involvement required",
            severity: Severity::Critical,
        },
        EventId::DbConnectionLimit => Runbook {
            event_name: "Database Connection Limit Reached",
            immediate_actions: &[
                "Kill idle connections older than 30 minutes",
                "Review application connection pooling",
                "Increase max_connections temporarily if safe",
                "Check for connection leaks",
            ],
            escalation: "If connections don't decrease within 10 minutes",
            severity: Severity::Critical,
        },
        EventId::DbDiskSpace => Runbook {
            event_name: "Database Disk Space Low",
            immediate_actions: &[
                "Check data and WAL/redo volume usage",
                "Purge or archive old partitions and logs",
                "Verify autovacuum or cleanup jobs are running",
                "Plan storage expansion",
            ],
            escalation: "If data volume usage >95%, page on-call DBA",
            severity: Severity::Warning,
        },
        EventId::DbReplicationLag => Runbook {
            event_name: "Replication Lag",
            immediate_actions: &[
                "Measure current lag on each replica",
                "Check replica I/O and network throughput",
                "Look for long-running transactions on the primary",
                "Pause non-essential read traffic on lagging replicas",
            ],
            escalation: "If lag keeps growing for >10 minutes, escalate to DBA team",
            severity: Severity::Warning,
        },
        EventId::DbDeadlock => Runbook {
            event_name: "Deadlock Detected",
            immediate_actions: &[
                "Capture the deadlock graph from database logs",
                "Identify the involved transactions and tables",
                "Check application retry behavior",
                "Review recent schema or query changes",
            ],
            escalation: "If deadlocks recur within the hour, escalate",
            severity: Severity::Warning,
        },
        EventId::DbBackupFailure => Runbook {
            event_name: "Backup Failure",
            immediate_actions: &[
                "Check backup job logs for the failure cause",
                "Verify backup storage availability and space",
                "Re-run the backup manually if safe",
                "Confirm the last known good backup",
            ],
            escalation: "If no successful backup within the retention window, escalate",
            severity: Severity::Warning,
        },
        EventId::AlertUnknown | EventId::DbUnknown => Runbook {
            event_name: "Unknown Event",
            immediate_actions: &["Review alarm details", "Check system logs"],
            escalation: "Contact the on-call team for analysis",
            severity: Severity::Info,
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_every_event_id_has_a_runbook() {
        for id in EventId::all() {
            let runbook = runbook_for(*id);
            assert!(!runbook.event_name.is_empty(), "empty name for {}", id);
            assert!(
                !runbook.immediate_actions.is_empty(),
                "no actions for {}",
                id
            );
            assert!(!runbook.escalation.is_empty(), "no escalation for {}", id);
        }
    }

    #[test]
    fn test_runbook_names_match_event_labels() {
        for id in EventId::all() {
            if id.is_unknown() {
                continue;
            }
            assert_eq!(runbook_for(*id).event_name, id.label());
        }
    }

    #[test]
    fn test_unknown_events_share_fallback_entry() {
        let general = runbook_for(EventId::AlertUnknown);
        let database = runbook_for(EventId::DbUnknown);

        assert_eq!(general, database);
        assert_eq!(general.severity, Severity::Info);
    }

    #[test]
    fn test_critical_classifications() {
        assert_eq!(runbook_for(EventId::HighCpu).severity, Severity::Critical);
        assert_eq!(
            runbook_for(EventId::DbConnectionLimit).severity,
            Severity::Critical
        );
        assert_eq!(
            runbook_for(EventId::DbReplicationLag).severity,
            Severity::Warning
        );
    }

    #[test]
    fn test_runbook_serializes_to_json() {
        let runbook = runbook_for(EventId::DbDeadlock);
        let json = serde_json::to_string(&runbook).unwrap();

        assert!(json.contains("Deadlock Detected"));
        assert!(json.contains("deadlock graph"));
    }
}
