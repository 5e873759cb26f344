// A signed-in monitoring session: shared monitor state plus its scheduler
use std::sync::{Arc, Mutex, MutexGuard};

use anyhow::{Context, Result};

use crate::metrics::MetricSnapshotProvider;
use crate::monitor::Monitor;
use crate::scheduler::{Scheduler, SchedulerHandle};

pub type SharedMonitor = Arc<Mutex<Monitor>>;

/// Lock the shared monitor, recovering the state if a previous holder panicked
pub fn lock_monitor(monitor: &SharedMonitor) -> MutexGuard<'_, Monitor> {
    monitor.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

#[derive(Debug)]
pub struct Session {
    monitor: SharedMonitor,
    scheduler: Option<SchedulerHandle>,
}

impl Session {
    pub fn new(monitor: Monitor) -> Self {
        Self {
            monitor: Arc::new(Mutex::new(monitor)),
            scheduler: None,
        }
    }

    pub fn monitor(&self) -> SharedMonitor {
        Arc::clone(&self.monitor)
    }

    pub fn is_monitoring(&self) -> bool {
        self.scheduler.as_ref().is_some_and(SchedulerHandle::is_running)
    }

    /// Start periodic evaluation. A scheduler that is already running is
    /// stopped first so only one ever drives the monitor.
    pub async fn start(&mut self, scheduler: Scheduler, provider: Arc<dyn MetricSnapshotProvider>) {
        if let Some(previous) = self.scheduler.take() {
            previous.stop().await;
        }
        self.scheduler = Some(scheduler.spawn(self.monitor(), provider));
    }

    pub async fn stop_monitoring(&mut self) {
        if let Some(handle) = self.scheduler.take() {
            handle.stop().await;
        }
    }

    /// End the session: stop the scheduler and write everything out
    pub async fn close(mut self) -> Result<()> {
        self.stop_monitoring().await;
        lock_monitor(&self.monitor)
            .flush()
            .context("Failed to flush monitor state on close")?;
        tracing::info!("Session closed");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::metrics::ServiceStateProvider;
    use crate::monitor::{IdScheme, MonitorOptions};
    use crate::storage::{load_collection, Database, MemoryStore, SERVICES_KEY};
    use crate::models::Service;
    use std::time::Duration;
    use tempfile::TempDir;

    #[tokio::test]
    async fn test_session_lifecycle() {
        let temp_dir = TempDir::new().unwrap();
        let db_path = temp_dir.path().join("sentinel.db");
        let monitor = Monitor::open(
            Box::new(Database::new(&db_path).unwrap()),
            MonitorOptions {
                id_scheme: IdScheme::Sequential,
                simulator: None,
            },
        )
        .unwrap();

        let mut session = Session::new(monitor);
        assert!(!session.is_monitoring());

        session
            .start(Scheduler::new(Duration::from_millis(10)), Arc::new(ServiceStateProvider))
            .await;
        assert!(session.is_monitoring());

        // The seeded services breach immediately
        let monitor = session.monitor();
        for _ in 0..200 {
            if !lock_monitor(&monitor).alert_manager().alerts().is_empty() {
                break;
            }
            tokio::time::sleep(Duration::from_millis(5)).await;
        }
        assert!(!lock_monitor(&monitor).alert_manager().alerts().is_empty());

        session.close().await.unwrap();

        let db = Database::new(&db_path).unwrap();
        let services: Vec<Service> = load_collection(&db, SERVICES_KEY).unwrap().unwrap();
        assert_eq!(services.len(), 4);
    }

    #[tokio::test]
    async fn test_restart_replaces_running_scheduler() {
        let monitor = Monitor::from_parts(
            Vec::new(),
            Vec::new(),
            Box::new(MemoryStore::new()),
            MonitorOptions::default(),
        );
        let mut session = Session::new(monitor);

        let (first_tx, mut first_rx) = tokio::sync::mpsc::unbounded_channel();
        session
            .start(
                Scheduler::new(Duration::from_millis(10)).with_reports(first_tx),
                Arc::new(ServiceStateProvider),
            )
            .await;
        assert!(first_rx.recv().await.is_some());

        let (second_tx, mut second_rx) = tokio::sync::mpsc::unbounded_channel();
        session
            .start(
                Scheduler::new(Duration::from_millis(10)).with_reports(second_tx),
                Arc::new(ServiceStateProvider),
            )
            .await;

        // The first task has ended, so its sender is gone once the backlog drains
        let drained = tokio::time::timeout(Duration::from_secs(2), async {
            while first_rx.recv().await.is_some() {}
        })
        .await;
        assert!(drained.is_ok(), "first scheduler kept running after restart");

        for _ in 0..3 {
            let report = tokio::time::timeout(Duration::from_secs(2), second_rx.recv()).await;
            assert!(matches!(report, Ok(Some(_))));
        }
        assert!(session.is_monitoring());

        session.stop_monitoring().await;
        assert!(!session.is_monitoring());
    }
}
