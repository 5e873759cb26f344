use std::collections::HashMap;

use chrono::{DateTime, Utc};

use crate::error::{MonitorError, MonitorResult};
use crate::models::{Alert, AlertStatus, MetricKind, Service, ServiceStatus, Severity, Threshold};
use crate::utils::IdGenerator;

/// Outcome of an acknowledge/resolve request on an existing alert
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Transition {
    Applied,
    /// Alert was already at or past the requested status
    Unchanged,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct AlertFilter {
    pub status: Option<AlertStatus>,
    pub severity: Option<Severity>,
}

impl AlertFilter {
    pub fn status(status: AlertStatus) -> Self {
        Self {
            status: Some(status),
            severity: None,
        }
    }

    pub fn matches(&self, alert: &Alert) -> bool {
        self.status.is_none_or(|status| alert.status == status)
            && self.severity.is_none_or(|severity| alert.severity == severity)
    }
}

pub fn alert_severity(service: &Service, threshold: &Threshold) -> Severity {
    if threshold.metric == MetricKind::Uptime || service.status == ServiceStatus::Down {
        Severity::Critical
    } else {
        Severity::Warning
    }
}

/// `Latency > 200 (Current: 450)`
pub fn alert_message(threshold: &Threshold, observed: f64) -> String {
    format!(
        "{} {} {} (Current: {})",
        threshold.metric,
        threshold.operator,
        threshold.value,
        observed.round() as i64
    )
}

/// Owns every alert record and enforces the lifecycle rules.
///
/// At most one alert per (service, threshold) pair is open (active or
/// acknowledged) at a time. Alerts only move forward and are never removed.
#[derive(Debug, Default)]
pub struct AlertManager {
    alerts: Vec<Alert>,
    ids: IdGenerator,
    /// service id -> threshold id -> position of its open alert
    open: HashMap<String, HashMap<String, usize>>,
}

impl AlertManager {
    pub fn new(alerts: Vec<Alert>, ids: IdGenerator) -> Self {
        let mut manager = Self {
            alerts,
            ids,
            open: HashMap::new(),
        };
        manager.reindex();
        manager
    }

    fn reindex(&mut self) {
        self.open.clear();
        for (position, alert) in self.alerts.iter().enumerate() {
            if alert.is_open() {
                self.open
                    .entry(alert.service_id.clone())
                    .or_default()
                    .entry(alert.threshold_id.clone())
                    .or_insert(position);
            }
        }
    }

    pub fn alerts(&self) -> &[Alert] {
        &self.alerts
    }

    pub fn get(&self, alert_id: &str) -> Option<&Alert> {
        self.alerts.iter().find(|a| a.id == alert_id)
    }

    pub fn open_alert_for(&self, service_id: &str, threshold_id: &str) -> Option<&Alert> {
        self.open
            .get(service_id)
            .and_then(|by_threshold| by_threshold.get(threshold_id))
            .and_then(|&position| self.alerts.get(position))
    }

    /// Record a breach. Returns the new alert, or `None` when an open alert
    /// for the same service and threshold already exists.
    pub fn raise(
        &mut self,
        service: &Service,
        threshold: &Threshold,
        observed: f64,
        now: DateTime<Utc>,
    ) -> Option<&Alert> {
        if self.open_alert_for(&service.id, &threshold.id).is_some() {
            return None;
        }

        let alert = Alert {
            id: self.ids.next_id(),
            service_id: service.id.clone(),
            threshold_id: threshold.id.clone(),
            message: alert_message(threshold, observed),
            timestamp: now,
            severity: alert_severity(service, threshold),
            status: AlertStatus::Active,
            acknowledged_at: None,
            resolved_at: None,
        };

        tracing::info!(
            alert_id = %alert.id,
            service_id = %alert.service_id,
            threshold_id = %alert.threshold_id,
            severity = %alert.severity,
            "Alert raised: {}",
            alert.message
        );

        self.open
            .entry(alert.service_id.clone())
            .or_default()
            .insert(alert.threshold_id.clone(), self.alerts.len());
        self.alerts.push(alert);
        self.alerts.last()
    }

    pub fn acknowledge(&mut self, alert_id: &str, now: DateTime<Utc>) -> MonitorResult<Transition> {
        self.transition(alert_id, AlertStatus::Acknowledged, now)
    }

    pub fn resolve(&mut self, alert_id: &str, now: DateTime<Utc>) -> MonitorResult<Transition> {
        self.transition(alert_id, AlertStatus::Resolved, now)
    }

    fn transition(
        &mut self,
        alert_id: &str,
        next: AlertStatus,
        now: DateTime<Utc>,
    ) -> MonitorResult<Transition> {
        let position = self
            .alerts
            .iter()
            .position(|a| a.id == alert_id)
            .ok_or_else(|| MonitorError::AlertNotFound(alert_id.to_string()))?;
        let alert = &mut self.alerts[position];

        if !alert.status.can_transition_to(next) {
            tracing::debug!(
                alert_id,
                current = %alert.status,
                requested = %next,
                "Alert transition ignored"
            );
            return Ok(Transition::Unchanged);
        }

        match next {
            AlertStatus::Acknowledged => alert.acknowledged_at = Some(now),
            AlertStatus::Resolved => alert.resolved_at = Some(now),
            AlertStatus::Active => {}
        }
        tracing::info!(alert_id, from = %alert.status, to = %next, "Alert transitioned");
        alert.status = next;
        if !next.is_open() {
            self.reindex();
        }

        Ok(Transition::Applied)
    }

    /// Put back an earlier copy of an alert, undoing a transition that
    /// couldn't be saved
    pub(crate) fn restore(&mut self, previous: Alert) {
        if let Some(alert) = self.alerts.iter_mut().find(|a| a.id == previous.id) {
            *alert = previous;
            self.reindex();
        }
    }

    /// Matching alerts, newest first. Alerts created at the same instant
    /// list the most recently raised first.
    pub fn list(&self, filter: &AlertFilter) -> Vec<&Alert> {
        let mut matching: Vec<&Alert> = self
            .alerts
            .iter()
            .rev()
            .filter(|alert| filter.matches(alert))
            .collect();
        matching.sort_by(|a, b| b.timestamp.cmp(&a.timestamp));
        matching
    }

    pub fn count_by_status(&self, status: AlertStatus) -> usize {
        self.alerts.iter().filter(|a| a.status == status).count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::ComparisonOperator;
    use chrono::Duration;

    fn manager() -> AlertManager {
        AlertManager::new(Vec::new(), IdGenerator::sequential("alert"))
    }

    fn latency_rule() -> Threshold {
        Threshold::new("th-lat", MetricKind::Latency, ComparisonOperator::GreaterThan, 200.0)
    }

    fn api() -> Service {
        Service::new("svc-a", "Service A", "https://a.example.com")
    }

    #[test]
    fn test_raise_creates_active_warning() {
        let mut alerts = manager();
        let alert = alerts.raise(&api(), &latency_rule(), 450.0, Utc::now()).cloned().unwrap();

        assert_eq!(alert.id, "alert-1");
        assert_eq!(alert.message, "Latency > 200 (Current: 450)");
        assert_eq!(alert.severity, Severity::Warning);
        assert_eq!(alert.status, AlertStatus::Active);
        assert_eq!(alert.service_id, "svc-a");
        assert_eq!(alert.threshold_id, "th-lat");
    }

    #[test]
    fn test_raise_is_idempotent_while_open() {
        let mut alerts = manager();
        let now = Utc::now();
        for _ in 0..5 {
            alerts.raise(&api(), &latency_rule(), 450.0, now);
        }
        assert_eq!(alerts.alerts().len(), 1);

        alerts.acknowledge("alert-1", now).unwrap();
        assert!(alerts.raise(&api(), &latency_rule(), 450.0, now).is_none());
        assert_eq!(alerts.alerts().len(), 1);
    }

    #[test]
    fn test_resolution_reopens_detection() {
        let mut alerts = manager();
        let now = Utc::now();
        alerts.raise(&api(), &latency_rule(), 450.0, now);
        alerts.resolve("alert-1", now).unwrap();

        let again = alerts.raise(&api(), &latency_rule(), 460.0, now).cloned().unwrap();
        assert_eq!(again.id, "alert-2");
        assert_eq!(alerts.alerts().len(), 2);
        assert_eq!(alerts.get("alert-1").unwrap().status, AlertStatus::Resolved);
    }

    #[test]
    fn test_dedup_is_per_pair() {
        let mut alerts = manager();
        let now = Utc::now();
        let other_rule = Threshold::new("th-up", MetricKind::Uptime, ComparisonOperator::LessThan, 99.9);
        let other_service = Service::new("svc-b", "Service B", "https://b.example.com");

        alerts.raise(&api(), &latency_rule(), 450.0, now);
        alerts.raise(&api(), &other_rule, 98.0, now);
        alerts.raise(&other_service, &latency_rule(), 300.0, now);

        assert_eq!(alerts.alerts().len(), 3);
    }

    #[test]
    fn test_severity_rules() {
        let uptime = Threshold::new("th-up", MetricKind::Uptime, ComparisonOperator::LessThan, 99.9);
        let down = api().with_status(ServiceStatus::Down);

        assert_eq!(alert_severity(&api(), &uptime), Severity::Critical);
        assert_eq!(alert_severity(&down, &latency_rule()), Severity::Critical);
        assert_eq!(alert_severity(&api(), &latency_rule()), Severity::Warning);
        assert_eq!(
            alert_severity(&api().with_status(ServiceStatus::Degraded), &latency_rule()),
            Severity::Warning
        );
    }

    #[test]
    fn test_message_rounds_observed_only() {
        let uptime = Threshold::new("th-up", MetricKind::Uptime, ComparisonOperator::LessThan, 99.9);
        assert_eq!(alert_message(&uptime, 98.45), "Uptime < 99.9 (Current: 98)");
        assert_eq!(alert_message(&latency_rule(), 249.5), "Latency > 200 (Current: 250)");
    }

    #[test]
    fn test_lifecycle_never_moves_backward() {
        let mut alerts = manager();
        let now = Utc::now();
        alerts.raise(&api(), &latency_rule(), 450.0, now);

        assert_eq!(alerts.acknowledge("alert-1", now).unwrap(), Transition::Applied);
        assert_eq!(alerts.acknowledge("alert-1", now).unwrap(), Transition::Unchanged);
        assert_eq!(alerts.get("alert-1").unwrap().status, AlertStatus::Acknowledged);

        assert_eq!(alerts.resolve("alert-1", now).unwrap(), Transition::Applied);
        assert_eq!(alerts.resolve("alert-1", now).unwrap(), Transition::Unchanged);
        assert_eq!(alerts.acknowledge("alert-1", now).unwrap(), Transition::Unchanged);
        assert_eq!(alerts.get("alert-1").unwrap().status, AlertStatus::Resolved);
    }

    #[test]
    fn test_resolve_directly_from_active() {
        let mut alerts = manager();
        let now = Utc::now();
        alerts.raise(&api(), &latency_rule(), 450.0, now);

        assert_eq!(alerts.resolve("alert-1", now).unwrap(), Transition::Applied);
        let alert = alerts.get("alert-1").unwrap();
        assert_eq!(alert.status, AlertStatus::Resolved);
        assert!(alert.acknowledged_at.is_none());
        assert_eq!(alert.resolved_at, Some(now));
    }

    #[test]
    fn test_unknown_alert_reports_not_found() {
        let mut alerts = manager();
        let err = alerts.acknowledge("missing", Utc::now()).unwrap_err();
        assert!(matches!(err, MonitorError::AlertNotFound(id) if id == "missing"));
        assert!(alerts.resolve("missing", Utc::now()).is_err());
    }

    #[test]
    fn test_list_sorted_newest_first_with_filters() {
        let mut alerts = manager();
        let start = Utc::now();
        let uptime = Threshold::new("th-up", MetricKind::Uptime, ComparisonOperator::LessThan, 99.9);

        alerts.raise(&api(), &latency_rule(), 450.0, start);
        alerts.raise(&api(), &uptime, 98.0, start + Duration::seconds(10));
        let other = Service::new("svc-b", "Service B", "https://b.example.com");
        alerts.raise(&other, &latency_rule(), 300.0, start + Duration::seconds(5));
        alerts.acknowledge("alert-3", start).unwrap();

        let all: Vec<&str> = alerts.list(&AlertFilter::default()).iter().map(|a| a.id.as_str()).collect();
        assert_eq!(all, vec!["alert-2", "alert-3", "alert-1"]);

        let active = alerts.list(&AlertFilter::status(AlertStatus::Active));
        assert_eq!(active.len(), 2);

        let critical = alerts.list(&AlertFilter {
            status: None,
            severity: Some(Severity::Critical),
        });
        assert_eq!(critical.len(), 1);
        assert_eq!(critical[0].id, "alert-2");
    }

    #[test]
    fn test_loaded_open_alerts_block_duplicates() {
        let now = Utc::now();
        let mut seed = manager();
        seed.raise(&api(), &latency_rule(), 450.0, now);
        seed.raise(&api().with_status(ServiceStatus::Down), &Threshold::with_defaults("th-other"), 900.0, now);
        seed.resolve("alert-2", now).unwrap();

        let mut alerts = AlertManager::new(seed.alerts().to_vec(), IdGenerator::sequential_after("alert", ["alert-2"]));
        assert_eq!(alerts.open_alert_for("svc-a", "th-lat").map(|a| a.id.as_str()), Some("alert-1"));
        assert!(alerts.open_alert_for("svc-a", "th-other").is_none());

        assert!(alerts.raise(&api(), &latency_rule(), 460.0, now).is_none());
        let reopened = alerts.raise(&api(), &Threshold::with_defaults("th-other"), 900.0, now).cloned().unwrap();
        assert_eq!(reopened.id, "alert-3");
    }

    #[test]
    fn test_open_index_follows_transitions() {
        let mut alerts = manager();
        let now = Utc::now();
        alerts.raise(&api(), &latency_rule(), 450.0, now);

        alerts.acknowledge("alert-1", now).unwrap();
        assert_eq!(alerts.open_alert_for("svc-a", "th-lat").map(|a| a.status), Some(AlertStatus::Acknowledged));

        alerts.resolve("alert-1", now).unwrap();
        assert!(alerts.open_alert_for("svc-a", "th-lat").is_none());

        alerts.raise(&api(), &latency_rule(), 450.0, now);
        assert_eq!(alerts.open_alert_for("svc-a", "th-lat").map(|a| a.id.as_str()), Some("alert-2"));
    }

    #[test]
    fn test_restore_undoes_resolution() {
        let mut alerts = manager();
        let now = Utc::now();
        alerts.raise(&api(), &latency_rule(), 450.0, now);
        let before = alerts.get("alert-1").cloned().unwrap();

        alerts.resolve("alert-1", now).unwrap();
        alerts.restore(before);

        assert_eq!(alerts.get("alert-1").unwrap().status, AlertStatus::Active);
        assert!(alerts.get("alert-1").unwrap().resolved_at.is_none());
        assert!(alerts.raise(&api(), &latency_rule(), 450.0, now).is_none());
    }

    #[test]
    fn test_list_ties_prefer_latest_raised() {
        let mut alerts = manager();
        let now = Utc::now();
        let other = Service::new("svc-b", "Service B", "https://b.example.com");
        alerts.raise(&api(), &latency_rule(), 450.0, now);
        alerts.raise(&other, &latency_rule(), 300.0, now);

        let ids: Vec<&str> = alerts.list(&AlertFilter::default()).iter().map(|a| a.id.as_str()).collect();
        assert_eq!(ids, vec!["alert-2", "alert-1"]);
    }
}
