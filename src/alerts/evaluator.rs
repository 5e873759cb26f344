use crate::metrics::MetricSnapshot;
use crate::models::{ComparisonOperator, MetricKind, Threshold};

/// Result of checking one threshold against one snapshot
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Evaluation {
    pub breached: bool,
    /// Unrounded reading the comparison was made against
    pub observed: f64,
}

/// A breaching threshold found while evaluating a service
#[derive(Debug, Clone, PartialEq)]
pub struct Breach {
    pub threshold: Threshold,
    pub observed: f64,
}

/// Reading for the given metric, or `None` if the metric isn't one we know
pub fn observed_value(snapshot: &MetricSnapshot, metric: MetricKind) -> Option<f64> {
    match metric {
        MetricKind::Latency => Some(snapshot.latest_latency.unwrap_or(0.0)),
        MetricKind::Uptime => Some(snapshot.uptime_percentage),
        MetricKind::ErrorRate => Some(snapshot.error_rate()),
        MetricKind::Unknown => None,
    }
}

/// Check a single threshold. Pure; disabled rules and unknown
/// metric/operator combinations never breach.
pub fn evaluate(snapshot: &MetricSnapshot, threshold: &Threshold) -> Evaluation {
    let Some(observed) = observed_value(snapshot, threshold.metric) else {
        return Evaluation {
            breached: false,
            observed: 0.0,
        };
    };

    if !threshold.enabled {
        return Evaluation {
            breached: false,
            observed,
        };
    }

    let breached = match (threshold.metric, threshold.operator) {
        // Error rate only alerts on the way up
        (MetricKind::ErrorRate, ComparisonOperator::LessThan) => false,
        (_, ComparisonOperator::GreaterThan) => observed > threshold.value,
        (_, ComparisonOperator::LessThan) => observed < threshold.value,
        (_, ComparisonOperator::Unknown) => false,
    };

    Evaluation { breached, observed }
}

/// Every enabled threshold currently breached for this snapshot
pub fn evaluate_all<'a>(
    snapshot: &MetricSnapshot,
    thresholds: impl IntoIterator<Item = &'a Threshold>,
) -> Vec<Breach> {
    thresholds
        .into_iter()
        .filter_map(|threshold| {
            let evaluation = evaluate(snapshot, threshold);
            evaluation.breached.then(|| Breach {
                threshold: threshold.clone(),
                observed: evaluation.observed,
            })
        })
        .collect()
}
