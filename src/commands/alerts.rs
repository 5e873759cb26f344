use anyhow::Result;
use chrono::Utc;

use crate::alerts::{AlertFilter, Transition};
use crate::cli::AlertAction;
use crate::commands::render;
use crate::monitor::Monitor;

pub fn handle_alerts_action(action: AlertAction, monitor: &mut Monitor, json_output: bool) -> Result<String> {
    match action {
        AlertAction::List { status, severity } => {
            let filter = AlertFilter { status, severity };
            let alerts = monitor.list_alerts(&filter);
            render(alerts.as_slice(), json_output)
        }
        AlertAction::Ack { id } => {
            let transition = monitor.acknowledge(&id, Utc::now())?;
            describe_transition(monitor, &id, transition, "acknowledged", json_output)
        }
        AlertAction::Resolve { id } => {
            let transition = monitor.resolve(&id, Utc::now())?;
            describe_transition(monitor, &id, transition, "resolved", json_output)
        }
    }
}

fn describe_transition(
    monitor: &Monitor,
    alert_id: &str,
    transition: Transition,
    verb: &str,
    json_output: bool,
) -> Result<String> {
    let alert = monitor.alert(alert_id)?;
    if json_output {
        return Ok(serde_json::to_string_pretty(alert)?);
    }

    Ok(match transition {
        Transition::Applied => format!("Alert {} {}: {}", alert.id, verb, alert.message),
        Transition::Unchanged => format!("Alert {} is already {}, nothing to do", alert.id, alert.status),
    })
}
