use anyhow::Result;
use serde_json::json;

use crate::cli::ThresholdAction;
use crate::commands::render;
use crate::models::ThresholdField;
use crate::monitor::Monitor;

pub fn handle_thresholds_action(
    action: ThresholdAction,
    monitor: &mut Monitor,
    json_output: bool,
) -> Result<String> {
    match action {
        ThresholdAction::List { service } => render(monitor.thresholds(&service)?, json_output),
        ThresholdAction::Add { service } => {
            let added = monitor.add_threshold(&service)?;
            if json_output {
                Ok(serde_json::to_string_pretty(&added)?)
            } else {
                Ok(format!(
                    "Added threshold {} to {}: {} for {} min",
                    added.id,
                    service,
                    added.describe(),
                    added.duration_minutes
                ))
            }
        }
        ThresholdAction::Remove { service, threshold } => {
            monitor.remove_threshold(&service, &threshold)?;
            if json_output {
                Ok(json!({
                    "status": "success",
                    "serviceId": service,
                    "removed": threshold,
                })
                .to_string())
            } else {
                Ok(format!("Removed threshold {} from {}", threshold, service))
            }
        }
        ThresholdAction::Set {
            service,
            threshold,
            field,
            value,
        } => {
            let field = ThresholdField::parse(&field, &value)?;
            let updated = monitor.update_threshold(&service, &threshold, field)?;
            if json_output {
                Ok(serde_json::to_string_pretty(&updated)?)
            } else {
                let state = if updated.enabled { "enabled" } else { "disabled" };
                Ok(format!(
                    "Updated threshold {}: {} for {} min ({})",
                    updated.id,
                    updated.describe(),
                    updated.duration_minutes,
                    state
                ))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::monitor::{IdScheme, MonitorOptions};
    use crate::storage::MemoryStore;

    fn monitor() -> Monitor {
        let options = MonitorOptions {
            id_scheme: IdScheme::Sequential,
            ..MonitorOptions::default()
        };
        Monitor::open(Box::new(MemoryStore::new()), options).unwrap()
    }

    #[test]
    fn test_add_set_remove() {
        let mut monitor = monitor();

        let added = handle_thresholds_action(
            ThresholdAction::Add { service: "svc-search".to_string() },
            &mut monitor,
            true,
        )
        .unwrap();
        let added: serde_json::Value = serde_json::from_str(&added).unwrap();
        let id = added["id"].as_str().unwrap().to_string();
        assert_eq!(added["metric"], "Latency");
        assert_eq!(added["value"], 500.0);

        let message = handle_thresholds_action(
            ThresholdAction::Set {
                service: "svc-search".to_string(),
                threshold: id.clone(),
                field: "value".to_string(),
                value: "-20".to_string(),
            },
            &mut monitor,
            false,
        )
        .unwrap();
        assert!(message.contains("Latency > 0"));
        assert_eq!(monitor.thresholds("svc-search").unwrap()[0].value, 0.0);

        handle_thresholds_action(
            ThresholdAction::Remove {
                service: "svc-search".to_string(),
                threshold: id,
            },
            &mut monitor,
            false,
        )
        .unwrap();
        assert!(monitor.thresholds("svc-search").unwrap().is_empty());
    }

    #[test]
    fn test_list_unknown_service_fails() {
        let mut monitor = monitor();
        let err = handle_thresholds_action(
            ThresholdAction::List { service: "svc-missing".to_string() },
            &mut monitor,
            false,
        )
        .unwrap_err();
        assert!(err.to_string().contains("svc-missing"));
    }

    #[test]
    fn test_set_rejects_unknown_field() {
        let mut monitor = monitor();
        let result = handle_thresholds_action(
            ThresholdAction::Set {
                service: "svc-payments".to_string(),
                threshold: "th-payments-latency".to_string(),
                field: "colour".to_string(),
                value: "red".to_string(),
            },
            &mut monitor,
            false,
        );
        assert!(result.is_err());
        assert_eq!(monitor.thresholds("svc-payments").unwrap()[0].value, 200.0);
    }
}
