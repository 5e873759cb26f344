use tabled::{Table, Tabled};
use serde::Serialize;

use crate::analysis::DashboardSummary;
use crate::models::{Alert, Service, Threshold};

/// Items that can be shown as a table or as JSON
pub trait OutputFormat {
    fn to_table(&self) -> String;
    fn to_json(&self) -> Result<String, serde_json::Error>;
}

#[derive(Tabled, Serialize, Debug)]
pub struct ServiceRow {
    #[tabled(rename = "ID")]
    pub id: String,
    #[tabled(rename = "Name")]
    pub name: String,
    #[tabled(rename = "Status")]
    pub status: String,
    #[tabled(rename = "Uptime")]
    pub uptime: String,
    #[tabled(rename = "Latency")]
    pub latency: String,
    #[tabled(rename = "Region")]
    pub region: String,
    #[tabled(rename = "Thresholds")]
    pub thresholds: String,
}

#[derive(Tabled, Serialize, Debug)]
pub struct ThresholdRow {
    #[tabled(rename = "ID")]
    pub id: String,
    #[tabled(rename = "Rule")]
    pub rule: String,
    #[tabled(rename = "Duration")]
    pub duration: String,
    #[tabled(rename = "Enabled")]
    pub enabled: String,
}

#[derive(Tabled, Serialize, Debug)]
pub struct AlertRow {
    #[tabled(rename = "ID")]
    pub id: String,
    #[tabled(rename = "Service")]
    pub service: String,
    #[tabled(rename = "Message")]
    pub message: String,
    #[tabled(rename = "Severity")]
    pub severity: String,
    #[tabled(rename = "Status")]
    pub status: String,
    #[tabled(rename = "Raised")]
    pub raised: String,
}

#[derive(Tabled, Serialize, Debug)]
pub struct SummaryRow {
    #[tabled(rename = "Metric")]
    pub label: String,
    #[tabled(rename = "Count")]
    pub count: usize,
}

impl ServiceRow {
    pub fn from_service(service: &Service) -> Self {
        let enabled = service.thresholds.iter().filter(|t| t.enabled).count();
        Self {
            id: service.id.clone(),
            name: service.name.clone(),
            status: service.status.to_string(),
            uptime: format!("{:.2}%", service.uptime_percentage),
            latency: service
                .latest_latency()
                .map(|ms| format!("{:.0} ms", ms))
                .unwrap_or_else(|| "-".to_string()),
            region: if service.region.is_empty() { "-".to_string() } else { service.region.clone() },
            thresholds: format!("{}/{}", enabled, service.thresholds.len()),
        }
    }
}

impl ThresholdRow {
    pub fn from_threshold(threshold: &Threshold) -> Self {
        Self {
            id: threshold.id.clone(),
            rule: threshold.describe(),
            duration: format!("{} min", threshold.duration_minutes),
            enabled: if threshold.enabled { "ON" } else { "OFF" }.to_string(),
        }
    }
}

impl AlertRow {
    pub fn from_alert(alert: &Alert) -> Self {
        Self {
            id: alert.id.clone(),
            service: alert.service_id.clone(),
            message: alert.message.clone(),
            severity: alert.severity.to_string(),
            status: alert.status.to_string(),
            raised: alert.timestamp.format("%Y-%m-%d %H:%M:%S").to_string(),
        }
    }
}

impl OutputFormat for [Service] {
    fn to_table(&self) -> String {
        if self.is_empty() {
            return "No services configured.".to_string();
        }
        Table::new(self.iter().map(ServiceRow::from_service)).to_string()
    }

    fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }
}

impl OutputFormat for [Threshold] {
    fn to_table(&self) -> String {
        if self.is_empty() {
            return "No thresholds configured.".to_string();
        }
        Table::new(self.iter().map(ThresholdRow::from_threshold)).to_string()
    }

    fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }
}

impl OutputFormat for [&Alert] {
    fn to_table(&self) -> String {
        if self.is_empty() {
            return "No alerts found.".to_string();
        }
        Table::new(self.iter().map(|alert| AlertRow::from_alert(alert))).to_string()
    }

    fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }
}

impl OutputFormat for DashboardSummary {
    fn to_table(&self) -> String {
        let rows = [
            ("Monitors", self.monitors.total),
            ("Up", self.monitors.up),
            ("Down", self.monitors.down),
            ("Paused", self.monitors.paused),
            ("Active alerts", self.alerts.active),
            ("Acknowledged alerts", self.alerts.acknowledged),
            ("Resolved alerts", self.alerts.resolved),
        ]
        .into_iter()
        .map(|(label, count)| SummaryRow {
            label: label.to_string(),
            count,
        });
        Table::new(rows).to_string()
    }

    fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }
}
