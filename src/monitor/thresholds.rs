use std::collections::HashSet;

use crate::error::{MonitorError, MonitorResult};
use crate::models::{Service, Threshold, ThresholdField};
use crate::utils::IdGenerator;

/// Services and the threshold rules they own
#[derive(Debug, Default, Clone)]
pub struct ThresholdStore {
    services: Vec<Service>,
}

impl ThresholdStore {
    pub fn new(services: Vec<Service>) -> Self {
        Self { services }
    }

    pub fn services(&self) -> &[Service] {
        &self.services
    }

    pub(crate) fn services_mut(&mut self) -> &mut [Service] {
        &mut self.services
    }

    pub fn service(&self, service_id: &str) -> MonitorResult<&Service> {
        self.services
            .iter()
            .find(|s| s.id == service_id)
            .ok_or_else(|| MonitorError::ServiceNotFound(service_id.to_string()))
    }

    pub fn thresholds(&self, service_id: &str) -> MonitorResult<&[Threshold]> {
        Ok(&self.service(service_id)?.thresholds)
    }

    /// Replace a service's whole rule set. Ids must be unique within the set.
    pub fn save(&mut self, service_id: &str, thresholds: Vec<Threshold>) -> MonitorResult<()> {
        let mut seen = HashSet::new();
        for threshold in &thresholds {
            if !seen.insert(threshold.id.as_str()) {
                return Err(MonitorError::DuplicateThreshold {
                    service_id: service_id.to_string(),
                    threshold_id: threshold.id.clone(),
                });
            }
        }

        let service = self
            .services
            .iter_mut()
            .find(|s| s.id == service_id)
            .ok_or_else(|| MonitorError::ServiceNotFound(service_id.to_string()))?;
        service.thresholds = thresholds;
        Ok(())
    }

    pub fn all_threshold_ids(&self) -> impl Iterator<Item = &str> {
        self.services
            .iter()
            .flat_map(|s| s.thresholds.iter().map(|t| t.id.as_str()))
    }
}

/// Working copy of one service's rules while they are being edited.
/// Nothing is applied until the draft is saved back through the store.
#[derive(Debug, Clone)]
pub struct ThresholdDraft {
    service_id: String,
    thresholds: Vec<Threshold>,
}

impl ThresholdDraft {
    pub fn new(service_id: impl Into<String>, thresholds: Vec<Threshold>) -> Self {
        Self {
            service_id: service_id.into(),
            thresholds,
        }
    }

    pub fn service_id(&self) -> &str {
        &self.service_id
    }

    pub fn thresholds(&self) -> &[Threshold] {
        &self.thresholds
    }

    /// Append a rule with the default settings and a fresh id
    pub fn add_default(&mut self, ids: &IdGenerator) -> &Threshold {
        let mut id = ids.next_id();
        while self.thresholds.iter().any(|t| t.id == id) {
            id = ids.next_id();
        }
        self.thresholds.push(Threshold::with_defaults(id));
        &self.thresholds[self.thresholds.len() - 1]
    }

    pub fn remove(&mut self, threshold_id: &str) -> bool {
        let before = self.thresholds.len();
        self.thresholds.retain(|t| t.id != threshold_id);
        self.thresholds.len() != before
    }

    pub fn update(&mut self, threshold_id: &str, field: ThresholdField) -> MonitorResult<&Threshold> {
        let service_id = &self.service_id;
        let threshold = self
            .thresholds
            .iter_mut()
            .find(|t| t.id == threshold_id)
            .ok_or_else(|| MonitorError::ThresholdNotFound {
                service_id: service_id.clone(),
                threshold_id: threshold_id.to_string(),
            })?;
        threshold.apply(field);
        Ok(threshold)
    }

    pub fn into_thresholds(self) -> Vec<Threshold> {
        self.thresholds
    }
}
