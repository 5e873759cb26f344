// Metric snapshots and the polling simulator that feeds them
pub mod provider;
pub mod simulator;

pub use provider::{MetricSnapshot, MetricSnapshotProvider, ServiceStateProvider};
pub use simulator::{MetricSimulator, MAX_JITTER_MS};
