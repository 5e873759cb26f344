use serde::Serialize;

use crate::alerts::AlertManager;
use crate::models::{AlertStatus, Service, ServiceStatus};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct MonitorCounts {
    pub total: usize,
    pub up: usize,
    pub down: usize,
    /// Services in maintenance
    pub paused: usize,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct AlertCounts {
    pub active: usize,
    pub acknowledged: usize,
    pub resolved: usize,
}

/// Headline numbers for the overview page
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct DashboardSummary {
    pub monitors: MonitorCounts,
    pub alerts: AlertCounts,
}

impl DashboardSummary {
    pub fn build(services: &[Service], alerts: &AlertManager) -> Self {
        let monitors = MonitorCounts {
            total: services.len(),
            up: services.iter().filter(|s| s.status.is_up()).count(),
            down: services
                .iter()
                .filter(|s| s.status == ServiceStatus::Down)
                .count(),
            paused: services
                .iter()
                .filter(|s| s.status == ServiceStatus::Maintenance)
                .count(),
        };

        let alerts = AlertCounts {
            active: alerts.count_by_status(AlertStatus::Active),
            acknowledged: alerts.count_by_status(AlertStatus::Acknowledged),
            resolved: alerts.count_by_status(AlertStatus::Resolved),
        };

        Self { monitors, alerts }
    }
}
