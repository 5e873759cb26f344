use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::MonitorError;

/// Which metric a threshold watches
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MetricKind {
    Latency,
    Uptime,
    #[serde(rename = "Error Rate")]
    ErrorRate,
    /// Anything a newer or older build wrote that we don't understand.
    /// Never breaches.
    #[serde(other)]
    Unknown,
}

impl MetricKind {
    pub fn label(&self) -> &'static str {
        match self {
            MetricKind::Latency => "Latency",
            MetricKind::Uptime => "Uptime",
            MetricKind::ErrorRate => "Error Rate",
            MetricKind::Unknown => "Unknown",
        }
    }
}

impl fmt::Display for MetricKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for MetricKind {
    type Err = MonitorError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "latency" => Ok(MetricKind::Latency),
            "uptime" => Ok(MetricKind::Uptime),
            "error rate" | "error-rate" | "error_rate" | "errorrate" => Ok(MetricKind::ErrorRate),
            _ => Err(MonitorError::InvalidField {
                field: "metric".to_string(),
                reason: format!("unknown metric '{s}', expected latency, uptime or error-rate"),
            }),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ComparisonOperator {
    #[serde(rename = ">")]
    GreaterThan,
    #[serde(rename = "<")]
    LessThan,
    #[serde(other)]
    Unknown,
}

impl ComparisonOperator {
    pub fn symbol(&self) -> &'static str {
        match self {
            ComparisonOperator::GreaterThan => ">",
            ComparisonOperator::LessThan => "<",
            ComparisonOperator::Unknown => "?",
        }
    }
}

impl fmt::Display for ComparisonOperator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.symbol())
    }
}

impl FromStr for ComparisonOperator {
    type Err = MonitorError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            ">" | "gt" | "greater-than" | "greaterthan" => Ok(ComparisonOperator::GreaterThan),
            "<" | "lt" | "less-than" | "lessthan" => Ok(ComparisonOperator::LessThan),
            _ => Err(MonitorError::InvalidField {
                field: "operator".to_string(),
                reason: format!("unknown operator '{s}', expected '>' or '<'"),
            }),
        }
    }
}

pub const DEFAULT_THRESHOLD_VALUE: f64 = 500.0;
pub const DEFAULT_DURATION_MINUTES: u32 = 5;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Threshold {
    pub id: String,
    pub metric: MetricKind,
    pub operator: ComparisonOperator,
    pub value: f64,
    /// Stored and shown, not enforced during evaluation
    pub duration_minutes: u32,
    pub enabled: bool,
}

impl Threshold {
    pub fn new(
        id: impl Into<String>,
        metric: MetricKind,
        operator: ComparisonOperator,
        value: f64,
    ) -> Self {
        Self {
            id: id.into(),
            metric,
            operator,
            value: value.max(0.0),
            duration_minutes: DEFAULT_DURATION_MINUTES,
            enabled: true,
        }
    }

    /// Rule created by the settings editor's "add" action
    pub fn with_defaults(id: impl Into<String>) -> Self {
        Self::new(
            id,
            MetricKind::Latency,
            ComparisonOperator::GreaterThan,
            DEFAULT_THRESHOLD_VALUE,
        )
    }

    pub fn disabled(mut self) -> Self {
        self.enabled = false;
        self
    }

    pub fn apply(&mut self, field: ThresholdField) {
        match field {
            ThresholdField::Metric(metric) => self.metric = metric,
            ThresholdField::Operator(operator) => self.operator = operator,
            ThresholdField::Value(value) => self.value = value.max(0.0),
            ThresholdField::DurationMinutes(minutes) => self.duration_minutes = minutes,
            ThresholdField::Enabled(enabled) => self.enabled = enabled,
        }
    }

    /// `Latency > 200`
    pub fn describe(&self) -> String {
        format!("{} {} {}", self.metric, self.operator, self.value)
    }
}

/// A single-field edit to a threshold
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ThresholdField {
    Metric(MetricKind),
    Operator(ComparisonOperator),
    Value(f64),
    DurationMinutes(u32),
    Enabled(bool),
}

impl ThresholdField {
    /// Parse a `field` / `value` pair as typed on the command line.
    /// Negative numbers clamp to zero.
    pub fn parse(field: &str, value: &str) -> Result<Self, MonitorError> {
        let invalid = |reason: String| MonitorError::InvalidField {
            field: field.to_string(),
            reason,
        };

        match field {
            "metric" => Ok(ThresholdField::Metric(value.parse()?)),
            "operator" => Ok(ThresholdField::Operator(value.parse()?)),
            "value" => {
                let parsed: f64 = value
                    .parse()
                    .map_err(|_| invalid(format!("'{value}' is not a number")))?;
                if !parsed.is_finite() {
                    return Err(invalid(format!("'{value}' is not a finite number")));
                }
                Ok(ThresholdField::Value(parsed.max(0.0)))
            }
            "duration" | "duration_minutes" | "durationMinutes" => {
                let parsed: i64 = value
                    .parse()
                    .map_err(|_| invalid(format!("'{value}' is not a whole number of minutes")))?;
                let minutes = u32::try_from(parsed.max(0)).unwrap_or(u32::MAX);
                Ok(ThresholdField::DurationMinutes(minutes))
            }
            "enabled" => match value {
                "true" | "on" | "yes" => Ok(ThresholdField::Enabled(true)),
                "false" | "off" | "no" => Ok(ThresholdField::Enabled(false)),
                _ => Err(invalid(format!("'{value}' is not a boolean"))),
            },
            _ => Err(invalid(
                "expected one of metric, operator, value, duration, enabled".to_string(),
            )),
        }
    }
}
