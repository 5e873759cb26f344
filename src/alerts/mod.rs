pub mod evaluator;
pub mod lifecycle;

pub use evaluator::{evaluate, evaluate_all, observed_value, Breach, Evaluation};
pub use lifecycle::{alert_message, alert_severity, AlertFilter, AlertManager, Transition};
