use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use chrono::Utc;
use serde_json::json;
use tokio::sync::mpsc;

use crate::metrics::{MetricSnapshotProvider, ServiceStateProvider};
use crate::models::Alert;
use crate::monitor::{Monitor, Session, TickReport};
use crate::output::OutputFormat;
use crate::scheduler::Scheduler;

pub fn handle_tick_command(monitor: &mut Monitor, json_output: bool) -> Result<String> {
    let report = monitor.tick(&ServiceStateProvider, Utc::now());
    if let Some(error) = &report.persist_error {
        anyhow::bail!("Evaluation ran but results were not saved: {}", error);
    }
    render_report(&report, json_output)
}

pub fn render_report(report: &TickReport, json_output: bool) -> Result<String> {
    if json_output {
        let value = json!({
            "servicesEvaluated": report.services_evaluated,
            "breaches": report.breaches,
            "failedServices": report.failed_services,
            "samplesTaken": report.samples_taken,
            "raised": report.raised,
        });
        return Ok(serde_json::to_string_pretty(&value)?);
    }

    let mut output = format!(
        "Evaluated {} services: {} breaches, {} new alerts",
        report.services_evaluated,
        report.breaches,
        report.raised.len()
    );
    if !report.failed_services.is_empty() {
        output.push_str(&format!("\nSkipped (metrics unavailable): {}", report.failed_services.join(", ")));
    }
    if !report.raised.is_empty() {
        let raised: Vec<&Alert> = report.raised.iter().collect();
        output.push('\n');
        output.push_str(&raised.as_slice().to_table());
    }
    Ok(output)
}

/// Evaluate on a fixed interval until Ctrl-C or until `duration` elapses
pub async fn handle_run_command(
    monitor: Monitor,
    interval: Duration,
    duration: Option<Duration>,
    json_output: bool,
) -> Result<()> {
    let (tx, mut rx) = mpsc::unbounded_channel();
    let provider: Arc<dyn MetricSnapshotProvider> = Arc::new(ServiceStateProvider);

    let mut session = Session::new(monitor);
    session.start(Scheduler::new(interval).with_reports(tx), provider).await;
    tracing::info!(interval_secs = interval.as_secs(), "Monitoring started");
    if !json_output {
        println!("Monitoring every {}s, press Ctrl-C to stop", interval.as_secs());
    }

    let deadline = async {
        match duration {
            Some(duration) => tokio::time::sleep(duration).await,
            None => std::future::pending().await,
        }
    };
    tokio::pin!(deadline);

    loop {
        tokio::select! {
            _ = tokio::signal::ctrl_c() => {
                tracing::info!("Interrupted, stopping monitor");
                break;
            }
            _ = &mut deadline => {
                tracing::info!("Run duration elapsed, stopping monitor");
                break;
            }
            Some(report) = rx.recv() => print_report(&report, json_output),
        }
    }

    session.close().await?;
    while let Ok(report) = rx.try_recv() {
        print_report(&report, json_output);
    }
    Ok(())
}

fn print_report(report: &TickReport, json_output: bool) {
    if let Some(error) = &report.persist_error {
        eprintln!("Warning: failed to save evaluation results: {}", error);
    }
    if json_output {
        for alert in &report.raised {
            match serde_json::to_string(alert) {
                Ok(line) => println!("{}", line),
                Err(e) => eprintln!("Error: Failed to serialize alert: {}", e),
            }
        }
        return;
    }
    for alert in &report.raised {
        println!(
            "[{}] {} {} {}: {}",
            alert.timestamp.format("%H:%M:%S"),
            alert.severity.as_str().to_uppercase(),
            alert.service_id,
            alert.id,
            alert.message
        );
    }
}
