use serde::{Deserialize, Serialize};
use std::fmt;

use crate::models::threshold::Threshold;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ServiceStatus {
    Operational,
    Degraded,
    Down,
    Maintenance,
}

impl ServiceStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            ServiceStatus::Operational => "Operational",
            ServiceStatus::Degraded => "Degraded",
            ServiceStatus::Down => "Down",
            ServiceStatus::Maintenance => "Maintenance",
        }
    }

    /// Whether the service is reachable at all (degraded still counts as up)
    pub fn is_up(&self) -> bool {
        matches!(self, ServiceStatus::Operational | ServiceStatus::Degraded)
    }
}

impl fmt::Display for ServiceStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One latency sample in a service's rolling history
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MetricSample {
    /// Wall-clock label, `HH:MM`
    pub time: String,
    /// Latency in milliseconds
    pub latency: f64,
}

impl MetricSample {
    pub fn new(time: impl Into<String>, latency: f64) -> Self {
        Self {
            time: time.into(),
            latency,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Service {
    pub id: String,
    pub name: String,
    pub url: String,
    pub status: ServiceStatus,
    pub uptime_percentage: f64,
    #[serde(default)]
    pub history: Vec<MetricSample>,
    #[serde(default)]
    pub last_checked: String,
    #[serde(default)]
    pub region: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tags: Option<Vec<String>>,
    #[serde(default)]
    pub thresholds: Vec<Threshold>,
}

impl Service {
    pub fn new(id: impl Into<String>, name: impl Into<String>, url: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            url: url.into(),
            status: ServiceStatus::Operational,
            uptime_percentage: 100.0,
            history: Vec::new(),
            last_checked: String::new(),
            region: String::new(),
            tags: None,
            thresholds: Vec::new(),
        }
    }

    pub fn with_status(mut self, status: ServiceStatus) -> Self {
        self.status = status;
        self
    }

    pub fn with_uptime(mut self, uptime_percentage: f64) -> Self {
        self.uptime_percentage = uptime_percentage;
        self
    }

    pub fn with_history(mut self, history: Vec<MetricSample>) -> Self {
        self.history = history;
        self
    }

    pub fn with_thresholds(mut self, thresholds: Vec<Threshold>) -> Self {
        self.thresholds = thresholds;
        self
    }

    /// Most recent latency sample, if any history exists
    pub fn latest_latency(&self) -> Option<f64> {
        self.history.last().map(|sample| sample.latency)
    }

    pub fn threshold(&self, threshold_id: &str) -> Option<&Threshold> {
        self.thresholds.iter().find(|t| t.id == threshold_id)
    }
}
