use anyhow::Result;

use crate::models::{Service, ServiceStatus};

/// Point-in-time metric readings for one service
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MetricSnapshot {
    /// Most recent latency sample in ms, `None` when there is no history
    pub latest_latency: Option<f64>,
    pub uptime_percentage: f64,
    pub status: ServiceStatus,
}

impl MetricSnapshot {
    pub fn from_service(service: &Service) -> Self {
        Self {
            latest_latency: service.latest_latency(),
            uptime_percentage: service.uptime_percentage,
            status: service.status,
        }
    }

    /// Stand-in for a real error-rate computation, derived from status
    pub fn error_rate(&self) -> f64 {
        match self.status {
            ServiceStatus::Down => 100.0,
            ServiceStatus::Degraded => 15.0,
            ServiceStatus::Operational | ServiceStatus::Maintenance => 0.0,
        }
    }
}

/// Supplies the current metrics for a service.
///
/// Errors are isolated per service by the scheduler: one failing snapshot
/// skips that service for the tick and nothing else.
pub trait MetricSnapshotProvider: Send + Sync {
    fn snapshot(&self, service: &Service) -> Result<MetricSnapshot>;
}

/// Reads the metrics already held in the in-memory service state
#[derive(Debug, Default, Clone, Copy)]
pub struct ServiceStateProvider;

impl MetricSnapshotProvider for ServiceStateProvider {
    fn snapshot(&self, service: &Service) -> Result<MetricSnapshot> {
        Ok(MetricSnapshot::from_service(service))
    }
}
