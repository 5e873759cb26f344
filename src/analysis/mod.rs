// Aggregate views over services and alerts
pub mod summary;

pub use summary::{AlertCounts, DashboardSummary, MonitorCounts};
