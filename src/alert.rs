//! Core alert types for the AI Alert Assistant
//!
//! This module defines the fundamental data structures used throughout the application
//! for representing incoming alerts, event classifications, and severity levels.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Timestamp type for consistent time handling across the application
pub type Timestamp = DateTime<Utc>;

/// An incoming alert or alarm message
///
/// Represents a single free-text alert as provided by a user or a monitoring
/// system, together with the time it was received.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Alert {
    /// When the alert was received by the assistant
    pub received_at: Timestamp,
    /// The free-text alert message content
    pub message: String,
}

impl Alert {
    /// Create a new alert from a message, timestamped now
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            received_at: Utc::now(),
            message: message.into(),
        }
    }
}

/// Fixed classification code assigned to an incoming alert
///
/// Event IDs form two taxonomies: general system alerts (`SYS-*`, `NET-*`,
/// `STO-*`, `APP-*`, `AUTH-*`) and database alarms (`DB-*`). Each taxonomy
/// has an unknown fallback for text that matches no known pattern.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum EventId {
    /// SYS-001: High CPU usage
    #[serde(rename = "SYS-001")]
    HighCpu,
    /// SYS-002: Memory pressure / exhaustion
    #[serde(rename = "SYS-002")]
    MemoryPressure,
    /// NET-001: Connection limit reached
    #[serde(rename = "NET-001")]
    ConnectionLimit,
    /// NET-002: Network or timeout issues
    #[serde(rename = "NET-002")]
    NetworkTimeout,
    /// STO-001: Disk space low
    #[serde(rename = "STO-001")]
    DiskSpace,
    /// APP-001: Service or application down
    #[serde(rename = "APP-001")]
    ServiceDown,
    /// AUTH-001: Authentication issues
    #[serde(rename = "AUTH-001")]
    AuthFailure,
    /// ALERT-UNKNOWN: general alert matching no known pattern
    #[serde(rename = "ALERT-UNKNOWN")]
    AlertUnknown,
    /// DB-001: High database CPU usage
    #[serde(rename = "DB-001")]
    DbHighCpu,
    /// DB-002: Database memory pressure
    #[serde(rename = "DB-002")]
    DbMemoryPressure,
    /// DB-003: Database connection limit reached
    #[serde(rename = "DB-003")]
    DbConnectionLimit,
    /// DB-004: Database disk space low
    #[serde(rename = "DB-004")]
    DbDiskSpace,
    /// DB-005: Replication lag
    #[serde(rename = "DB-005")]
    DbReplicationLag,
    /// DB-006: Deadlock detected
    #[serde(rename = "DB-006")]
    DbDeadlock,
    /// DB-007: Backup failure
    #[serde(rename = "DB-007")]
    DbBackupFailure,
    /// DB-UNKNOWN: database alarm matching no known pattern
    #[serde(rename = "DB-UNKNOWN")]
    DbUnknown,
}

impl EventId {
    /// The stable wire code for this event ID (e.g. "SYS-001")
    pub fn code(&self) -> &'static str {
        match self {
            EventId::HighCpu => "SYS-001",
            EventId::MemoryPressure => "SYS-002",
            EventId::ConnectionLimit => "NET-001",
            EventId::NetworkTimeout => "NET-002",
            EventId::DiskSpace => "STO-001",
            EventId::ServiceDown => "APP-001",
            EventId::AuthFailure => "AUTH-001",
            EventId::AlertUnknown => "ALERT-UNKNOWN",
            EventId::DbHighCpu => "DB-001",
            EventId::DbMemoryPressure => "DB-002",
            EventId::DbConnectionLimit => "DB-003",
            EventId::DbDiskSpace => "DB-004",
            EventId::DbReplicationLag => "DB-005",
            EventId::DbDeadlock => "DB-006",
            EventId::DbBackupFailure => "DB-007",
            EventId::DbUnknown => "DB-UNKNOWN",
        }
    }

    /// Human-curated label for this event ID
    pub fn label(&self) -> &'static str {
        match self {
            EventId::HighCpu => "High CPU Usage",
            EventId::MemoryPressure => "Memory Pressure",
            EventId::ConnectionLimit => "Connection Limit Reached",
            EventId::NetworkTimeout => "Network/Timeout Issues",
            EventId::DiskSpace => "Disk Space Low",
            EventId::ServiceDown => "Service/Application Down",
            EventId::AuthFailure => "Authentication Issues",
            EventId::AlertUnknown => "Unknown Event",
            EventId::DbHighCpu => "High Database CPU Usage",
            EventId::DbMemoryPressure => "Database Memory Pressure",
            EventId::DbConnectionLimit => "Database Connection Limit Reached",
            EventId::DbDiskSpace => "Database Disk Space Low",
            EventId::DbReplicationLag => "Replication Lag",
            EventId::DbDeadlock => "Deadlock Detected",
            EventId::DbBackupFailure => "Backup Failure",
            EventId::DbUnknown => "Unknown Database Event",
        }
    }

    /// Whether this is one of the unknown fallback classifications
    pub fn is_unknown(&self) -> bool {
        matches!(self, EventId::AlertUnknown | EventId::DbUnknown)
    }

    /// All event IDs, in taxonomy order
    pub fn all() -> &'static [EventId] {
        &[
            EventId::HighCpu,
            EventId::MemoryPressure,
            EventId::ConnectionLimit,
            EventId::NetworkTimeout,
            EventId::DiskSpace,
            EventId::ServiceDown,
            EventId::AuthFailure,
            EventId::AlertUnknown,
            EventId::DbHighCpu,
            EventId::DbMemoryPressure,
            EventId::DbConnectionLimit,
            EventId::DbDiskSpace,
            EventId::DbReplicationLag,
            EventId::DbDeadlock,
            EventId::DbBackupFailure,
            EventId::DbUnknown,
        ]
    }
}

impl fmt::Display for EventId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.code())
    }
}

impl FromStr for EventId {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        EventId::all()
            .iter()
            .find(|id| id.code().eq_ignore_ascii_case(s))
            .copied()
            .ok_or_else(|| format!("unknown event ID: {}", s))
    }
}

/// Severity level for classified events and AI-generated insights
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    /// Informational, no action required
    Info,
    /// Warning that may require attention
    Warning,
    /// Critical issue requiring immediate attention
    Critical,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Severity::Info => write!(f, "info"),
            Severity::Warning => write!(f, "warning"),
            Severity::Critical => write!(f, "critical"),
        }
    }
}
