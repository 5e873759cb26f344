use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::MonitorError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Warning,
    Critical,
}

impl Severity {
    pub fn as_str(&self) -> &'static str {
        match self {
            Severity::Warning => "warning",
            Severity::Critical => "critical",
        }
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Severity {
    type Err = MonitorError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "warning" => Ok(Severity::Warning),
            "critical" => Ok(Severity::Critical),
            _ => Err(MonitorError::InvalidField {
                field: "severity".to_string(),
                reason: format!("unknown severity '{s}'"),
            }),
        }
    }
}

/// Alert lifecycle: `active -> acknowledged -> resolved`, or `active -> resolved`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AlertStatus {
    Active,
    Acknowledged,
    Resolved,
}

impl AlertStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            AlertStatus::Active => "active",
            AlertStatus::Acknowledged => "acknowledged",
            AlertStatus::Resolved => "resolved",
        }
    }

    pub fn is_open(&self) -> bool {
        !matches!(self, AlertStatus::Resolved)
    }

    fn rank(&self) -> u8 {
        match self {
            AlertStatus::Active => 0,
            AlertStatus::Acknowledged => 1,
            AlertStatus::Resolved => 2,
        }
    }

    /// Only forward moves are legal; resolved is terminal.
    pub fn can_transition_to(&self, next: AlertStatus) -> bool {
        next.rank() > self.rank()
    }
}

impl fmt::Display for AlertStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for AlertStatus {
    type Err = MonitorError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "active" => Ok(AlertStatus::Active),
            "acknowledged" | "ack" => Ok(AlertStatus::Acknowledged),
            "resolved" => Ok(AlertStatus::Resolved),
            _ => Err(MonitorError::InvalidField {
                field: "status".to_string(),
                reason: format!("unknown alert status '{s}'"),
            }),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Alert {
    pub id: String,
    pub service_id: String,
    pub threshold_id: String,
    pub message: String,
    pub timestamp: DateTime<Utc>,
    pub severity: Severity,
    pub status: AlertStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub acknowledged_at: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub resolved_at: Option<DateTime<Utc>>,
}

impl Alert {
    pub fn is_open(&self) -> bool {
        self.status.is_open()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_forward_transitions_only() {
        assert!(AlertStatus::Active.can_transition_to(AlertStatus::Acknowledged));
        assert!(AlertStatus::Active.can_transition_to(AlertStatus::Resolved));
        assert!(AlertStatus::Acknowledged.can_transition_to(AlertStatus::Resolved));

        assert!(!AlertStatus::Acknowledged.can_transition_to(AlertStatus::Active));
        assert!(!AlertStatus::Resolved.can_transition_to(AlertStatus::Active));
        assert!(!AlertStatus::Resolved.can_transition_to(AlertStatus::Acknowledged));
        assert!(!AlertStatus::Active.can_transition_to(AlertStatus::Active));
    }

    #[test]
    fn test_parse_status_and_severity() {
        assert_eq!("ACK".parse::<AlertStatus>().unwrap(), AlertStatus::Acknowledged);
        assert_eq!("critical".parse::<Severity>().unwrap(), Severity::Critical);
        assert!("open".parse::<AlertStatus>().is_err());
    }

    #[test]
    fn test_lowercase_wire_format() {
        let json = serde_json::to_string(&AlertStatus::Acknowledged).unwrap();
        assert_eq!(json, "\"acknowledged\"");
        let json = serde_json::to_string(&Severity::Warning).unwrap();
        assert_eq!(json, "\"warning\"");
    }
}
