//! The monitoring session state.
//!
//! [`Monitor`] owns the services (with their threshold rules), the alert
//! records, and the key-value store both collections are persisted to. Every
//! mutation rewrites the affected collection in full.

pub mod session;
pub mod thresholds;

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};

use crate::alerts::{evaluate_all, AlertFilter, AlertManager, Transition};
use crate::analysis::DashboardSummary;
use crate::error::{MonitorError, MonitorResult};
use crate::metrics::{MetricSimulator, MetricSnapshotProvider};
use crate::models::seed::default_services;
use crate::models::{Alert, Service, Threshold, ThresholdField};
use crate::storage::{load_collection, save_collection, KeyValueStore, ALERTS_KEY, SERVICES_KEY};
use crate::utils::IdGenerator;

pub use session::{lock_monitor, Session, SharedMonitor};
pub use thresholds::{ThresholdDraft, ThresholdStore};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum IdScheme {
    #[default]
    Uuid,
    /// `alert-1`, `th-1`, ... continuing after whatever is already stored
    Sequential,
}

#[derive(Debug, Default)]
pub struct MonitorOptions {
    pub id_scheme: IdScheme,
    pub simulator: Option<MetricSimulator>,
}

/// What one evaluation pass did
#[derive(Debug, Clone, Default)]
pub struct TickReport {
    pub services_evaluated: usize,
    pub breaches: usize,
    pub raised: Vec<Alert>,
    /// Services skipped because their metrics couldn't be read
    pub failed_services: Vec<String>,
    pub samples_taken: usize,
    pub persist_error: Option<String>,
}

pub struct Monitor {
    thresholds: ThresholdStore,
    alerts: AlertManager,
    threshold_ids: IdGenerator,
    simulator: Option<MetricSimulator>,
    store: Box<dyn KeyValueStore>,
}

impl std::fmt::Debug for Monitor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Monitor")
            .field("services", &self.thresholds.services().len())
            .field("alerts", &self.alerts.alerts().len())
            .field("simulated", &self.simulator.is_some())
            .finish()
    }
}

impl Monitor {
    /// Load both collections from `store`. A missing or unreadable service
    /// list is replaced by the mock services; a missing or unreadable alert
    /// list starts empty.
    pub fn open(store: Box<dyn KeyValueStore>, options: MonitorOptions) -> Result<Self> {
        let stored_services: Option<Vec<Service>> =
            load_collection(store.as_ref(), SERVICES_KEY).context("Failed to load services")?;
        let alerts: Vec<Alert> = load_collection(store.as_ref(), ALERTS_KEY)
            .context("Failed to load alerts")?
            .unwrap_or_default();

        let seeded = stored_services.is_none();
        let services = stored_services.unwrap_or_else(default_services);

        let monitor = Self::from_parts(services, alerts, store, options);
        if seeded {
            tracing::info!(count = monitor.services().len(), "Seeding default services");
            monitor.persist_services()?;
        }

        tracing::debug!(
            services = monitor.services().len(),
            alerts = monitor.alerts.alerts().len(),
            "Monitor state loaded"
        );
        Ok(monitor)
    }

    pub fn from_parts(
        services: Vec<Service>,
        alerts: Vec<Alert>,
        store: Box<dyn KeyValueStore>,
        options: MonitorOptions,
    ) -> Self {
        let thresholds = ThresholdStore::new(services);
        let (alert_ids, threshold_ids) = match options.id_scheme {
            IdScheme::Uuid => (IdGenerator::uuid(), IdGenerator::uuid()),
            IdScheme::Sequential => (
                IdGenerator::sequential_after("alert", alerts.iter().map(|a| a.id.as_str())),
                IdGenerator::sequential_after("th", thresholds.all_threshold_ids()),
            ),
        };

        Self {
            alerts: AlertManager::new(alerts, alert_ids),
            thresholds,
            threshold_ids,
            simulator: options.simulator,
            store,
        }
    }

    pub fn services(&self) -> &[Service] {
        self.thresholds.services()
    }

    pub fn service(&self, service_id: &str) -> MonitorResult<&Service> {
        self.thresholds.service(service_id)
    }

    pub fn thresholds(&self, service_id: &str) -> MonitorResult<&[Threshold]> {
        self.thresholds.thresholds(service_id)
    }

    pub fn alert_manager(&self) -> &AlertManager {
        &self.alerts
    }

    pub fn alert(&self, alert_id: &str) -> MonitorResult<&Alert> {
        self.alerts
            .get(alert_id)
            .ok_or_else(|| MonitorError::AlertNotFound(alert_id.to_string()))
    }

    pub fn list_alerts(&self, filter: &AlertFilter) -> Vec<&Alert> {
        self.alerts.list(filter)
    }

    pub fn summary(&self) -> DashboardSummary {
        DashboardSummary::build(self.services(), &self.alerts)
    }

    /// Start editing a service's rules
    pub fn draft_thresholds(&self, service_id: &str) -> MonitorResult<ThresholdDraft> {
        Ok(ThresholdDraft::new(service_id, self.thresholds(service_id)?.to_vec()))
    }

    pub fn threshold_ids(&self) -> &IdGenerator {
        &self.threshold_ids
    }

    /// Replace and persist a service's whole rule set. If the write fails the
    /// previous rules are put back.
    pub fn save_thresholds(&mut self, service_id: &str, thresholds: Vec<Threshold>) -> MonitorResult<()> {
        let previous = self.thresholds(service_id)?.to_vec();
        self.thresholds.save(service_id, thresholds)?;
        if let Err(e) = self.persist_services() {
            self.thresholds.save(service_id, previous)?;
            return Err(e.into());
        }
        tracing::info!(service_id, "Thresholds saved");
        Ok(())
    }

    pub fn save_draft(&mut self, draft: ThresholdDraft) -> MonitorResult<()> {
        let service_id = draft.service_id().to_string();
        self.save_thresholds(&service_id, draft.into_thresholds())
    }

    pub fn add_threshold(&mut self, service_id: &str) -> MonitorResult<Threshold> {
        let mut draft = self.draft_thresholds(service_id)?;
        let added = draft.add_default(&self.threshold_ids).clone();
        self.save_draft(draft)?;
        Ok(added)
    }

    pub fn remove_threshold(&mut self, service_id: &str, threshold_id: &str) -> MonitorResult<()> {
        let mut draft = self.draft_thresholds(service_id)?;
        if !draft.remove(threshold_id) {
            return Err(MonitorError::ThresholdNotFound {
                service_id: service_id.to_string(),
                threshold_id: threshold_id.to_string(),
            });
        }
        self.save_draft(draft)
    }

    pub fn update_threshold(
        &mut self,
        service_id: &str,
        threshold_id: &str,
        field: ThresholdField,
    ) -> MonitorResult<Threshold> {
        let mut draft = self.draft_thresholds(service_id)?;
        let updated = draft.update(threshold_id, field)?.clone();
        self.save_draft(draft)?;
        Ok(updated)
    }

    /// Acknowledge and persist. A transition that can't be saved is undone,
    /// so on `Err` the alert is exactly as it was.
    pub fn acknowledge(&mut self, alert_id: &str, now: DateTime<Utc>) -> MonitorResult<Transition> {
        let previous = self.alert(alert_id)?.clone();
        let transition = self.alerts.acknowledge(alert_id, now)?;
        self.persist_transition(previous, transition)
    }

    /// Resolve and persist, with the same rollback as [`Monitor::acknowledge`]
    pub fn resolve(&mut self, alert_id: &str, now: DateTime<Utc>) -> MonitorResult<Transition> {
        let previous = self.alert(alert_id)?.clone();
        let transition = self.alerts.resolve(alert_id, now)?;
        self.persist_transition(previous, transition)
    }

    fn persist_transition(&mut self, previous: Alert, transition: Transition) -> MonitorResult<Transition> {
        if transition == Transition::Applied {
            if let Err(e) = self.persist_alerts() {
                self.alerts.restore(previous);
                return Err(e.into());
            }
        }
        Ok(transition)
    }

    /// One evaluation pass over every service and every threshold.
    ///
    /// A service whose metrics can't be read is skipped; the rest of the pass
    /// still runs. Persistence failures are reported, not raised.
    pub fn tick(&mut self, provider: &dyn MetricSnapshotProvider, now: DateTime<Utc>) -> TickReport {
        let mut report = TickReport::default();

        if let Some(simulator) = self.simulator.as_mut() {
            report.samples_taken = simulator.advance(self.thresholds.services_mut(), now);
        }

        for service in self.thresholds.services() {
            let snapshot = match provider.snapshot(service) {
                Ok(snapshot) => snapshot,
                Err(e) => {
                    tracing::warn!(service_id = %service.id, error = %e, "Skipping service, metrics unavailable");
                    report.failed_services.push(service.id.clone());
                    continue;
                }
            };
            report.services_evaluated += 1;

            for breach in evaluate_all(&snapshot, &service.thresholds) {
                report.breaches += 1;
                if let Some(alert) = self.alerts.raise(service, &breach.threshold, breach.observed, now) {
                    report.raised.push(alert.clone());
                }
            }
        }

        let mut persist_errors = Vec::new();
        if report.samples_taken > 0 {
            if let Err(e) = self.persist_services() {
                persist_errors.push(e.to_string());
            }
        }
        if !report.raised.is_empty() {
            if let Err(e) = self.persist_alerts() {
                persist_errors.push(e.to_string());
            }
        }
        if !persist_errors.is_empty() {
            let message = persist_errors.join("; ");
            tracing::error!(error = %message, "Failed to persist tick results");
            report.persist_error = Some(message);
        }

        tracing::debug!(
            services = report.services_evaluated,
            breaches = report.breaches,
            raised = report.raised.len(),
            "Tick complete"
        );
        report
    }

    /// Write both collections
    pub fn flush(&self) -> Result<()> {
        self.persist_services()?;
        self.persist_alerts()
    }

    fn persist_services(&self) -> Result<()> {
        save_collection(self.store.as_ref(), SERVICES_KEY, self.services())
            .context("Failed to persist services")
    }

    fn persist_alerts(&self) -> Result<()> {
        save_collection(self.store.as_ref(), ALERTS_KEY, self.alerts.alerts())
            .context("Failed to persist alerts")
    }
}
