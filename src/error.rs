#[derive(Debug, thiserror::Error)]
pub enum MonitorError {
    #[error("Alert not found: {0}")]
    AlertNotFound(String),

    #[error("Service not found: {0}")]
    ServiceNotFound(String),

    #[error("Threshold not found: {threshold_id} on service {service_id}")]
    ThresholdNotFound {
        service_id: String,
        threshold_id: String,
    },

    #[error("Duplicate threshold id {threshold_id} on service {service_id}")]
    DuplicateThreshold {
        service_id: String,
        threshold_id: String,
    },

    #[error("Invalid {field}: {reason}")]
    InvalidField { field: String, reason: String },

    #[error(transparent)]
    Storage(#[from] anyhow::Error),
}

pub type MonitorResult<T> = Result<T, MonitorError>;
