//! Periodic threshold evaluation.
//!
//! [`Scheduler::spawn`] starts a tokio task that evaluates every service once
//! immediately and then on every interval tick, until the returned
//! [`SchedulerHandle`] is stopped or dropped.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tokio_util::sync::CancellationToken;

use crate::metrics::MetricSnapshotProvider;
use crate::monitor::{lock_monitor, SharedMonitor, TickReport};

pub const DEFAULT_INTERVAL: Duration = Duration::from_secs(5);

#[derive(Debug)]
pub struct Scheduler {
    interval: Duration,
    reports: Option<mpsc::UnboundedSender<TickReport>>,
}

impl Default for Scheduler {
    fn default() -> Self {
        Self::new(DEFAULT_INTERVAL)
    }
}

impl Scheduler {
    pub fn new(interval: Duration) -> Self {
        Self {
            interval,
            reports: None,
        }
    }

    /// Send every tick's report to `sender` as well as logging it
    pub fn with_reports(mut self, sender: mpsc::UnboundedSender<TickReport>) -> Self {
        self.reports = Some(sender);
        self
    }

    pub fn spawn(
        self,
        monitor: SharedMonitor,
        provider: Arc<dyn MetricSnapshotProvider>,
    ) -> SchedulerHandle {
        let cancel = CancellationToken::new();
        let ticks = Arc::new(AtomicU64::new(0));

        let task = tokio::spawn(run(
            self.interval,
            monitor,
            provider,
            self.reports,
            cancel.clone(),
            Arc::clone(&ticks),
        ));

        SchedulerHandle {
            cancel,
            ticks,
            task: Some(task),
        }
    }
}

async fn run(
    period: Duration,
    monitor: SharedMonitor,
    provider: Arc<dyn MetricSnapshotProvider>,
    reports: Option<mpsc::UnboundedSender<TickReport>>,
    cancel: CancellationToken,
    ticks: Arc<AtomicU64>,
) {
    tracing::info!(interval_ms = period.as_millis() as u64, "Scheduler started");

    // First tick completes immediately
    let mut interval = tokio::time::interval(period);
    interval.set_missed_tick_behavior(MissedTickBehavior::Delay);

    loop {
        tokio::select! {
            biased;
            _ = cancel.cancelled() => {
                tracing::info!("Scheduler stopping");
                break;
            }
            _ = interval.tick() => {
                // The whole pass runs under one lock so ticks never interleave
                let report = {
                    let mut monitor = lock_monitor(&monitor);
                    monitor.tick(provider.as_ref(), Utc::now())
                };
                ticks.fetch_add(1, Ordering::SeqCst);

                if !report.raised.is_empty() {
                    tracing::info!(raised = report.raised.len(), "New alerts raised");
                }
                if let Some(sender) = &reports {
                    let _ = sender.send(report);
                }
            }
        }
    }
}

/// Disposer for a running scheduler. Dropping it cancels the task;
/// [`SchedulerHandle::stop`] also waits for it to finish.
#[derive(Debug)]
pub struct SchedulerHandle {
    cancel: CancellationToken,
    ticks: Arc<AtomicU64>,
    task: Option<JoinHandle<()>>,
}

impl SchedulerHandle {
    /// Number of completed evaluation passes
    pub fn ticks(&self) -> u64 {
        self.ticks.load(Ordering::SeqCst)
    }

    pub fn is_running(&self) -> bool {
        self.task.as_ref().is_some_and(|task| !task.is_finished())
    }

    pub async fn stop(mut self) {
        self.cancel.cancel();
        if let Some(task) = self.task.take() {
            if let Err(e) = task.await {
                tracing::error!(error = %e, "Scheduler task ended abnormally");
            }
        }
    }
}

impl Drop for SchedulerHandle {
    fn drop(&mut self) {
        self.cancel.cancel();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::metrics::ServiceStateProvider;
    use crate::monitor::{IdScheme, Monitor, MonitorOptions};
    use crate::models::{ComparisonOperator, MetricKind, MetricSample, Service, Threshold};
    use crate::storage::MemoryStore;
    use std::sync::Mutex;

    fn shared_monitor() -> SharedMonitor {
        let service = Service::new("svc-a", "Service A", "https://a.example.com")
            .with_history(vec![MetricSample::new("10:00", 450.0)])
            .with_thresholds(vec![Threshold::new(
                "th-lat",
                MetricKind::Latency,
                ComparisonOperator::GreaterThan,
                200.0,
            )]);
        let monitor = Monitor::from_parts(
            vec![service],
            Vec::new(),
            Box::new(MemoryStore::new()),
            MonitorOptions {
                id_scheme: IdScheme::Sequential,
                simulator: None,
            },
        );
        Arc::new(Mutex::new(monitor))
    }

    #[tokio::test]
    async fn test_first_tick_runs_immediately() {
        let monitor = shared_monitor();
        let (tx, mut rx) = mpsc::unbounded_channel();

        // An hour-long interval: only the immediate tick can produce a report
        let handle = Scheduler::new(Duration::from_secs(3600))
            .with_reports(tx)
            .spawn(Arc::clone(&monitor), Arc::new(ServiceStateProvider));

        let report = tokio::time::timeout(Duration::from_secs(2), rx.recv())
            .await
            .expect("first tick should not wait for the interval")
            .unwrap();
        assert_eq!(report.raised.len(), 1);
        assert_eq!(handle.ticks(), 1);

        handle.stop().await;
        assert_eq!(lock_monitor(&monitor).alert_manager().alerts().len(), 1);
    }

    #[tokio::test]
    async fn test_repeated_ticks_do_not_duplicate() {
        let monitor = shared_monitor();
        let handle = Scheduler::new(Duration::from_millis(10))
            .spawn(Arc::clone(&monitor), Arc::new(ServiceStateProvider));

        while handle.ticks() < 5 {
            tokio::time::sleep(Duration::from_millis(5)).await;
        }
        handle.stop().await;

        assert_eq!(lock_monitor(&monitor).alert_manager().alerts().len(), 1);
    }

    #[tokio::test]
    async fn test_no_ticks_after_stop() {
        let monitor = shared_monitor();
        let handle = Scheduler::new(Duration::from_millis(10))
            .spawn(Arc::clone(&monitor), Arc::new(ServiceStateProvider));

        while handle.ticks() < 2 {
            tokio::time::sleep(Duration::from_millis(5)).await;
        }
        let ticks = Arc::clone(&handle.ticks);
        handle.stop().await;

        let stopped_at = ticks.load(Ordering::SeqCst);
        tokio::time::sleep(Duration::from_millis(60)).await;
        assert_eq!(ticks.load(Ordering::SeqCst), stopped_at);
    }

    #[tokio::test]
    async fn test_dropping_handle_cancels() {
        let monitor = shared_monitor();
        let handle = Scheduler::new(Duration::from_millis(10))
            .spawn(Arc::clone(&monitor), Arc::new(ServiceStateProvider));
        let cancel = handle.cancel.clone();

        drop(handle);
        assert!(cancel.is_cancelled());
    }
}
