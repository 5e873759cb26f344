// Domain models: services, threshold rules and alerts
pub mod alert;
pub mod seed;
pub mod service;
pub mod threshold;

pub use alert::{Alert, AlertStatus, Severity};
pub use service::{MetricSample, Service, ServiceStatus};
pub use threshold::{ComparisonOperator, MetricKind, Threshold, ThresholdField};
