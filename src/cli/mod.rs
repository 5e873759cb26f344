pub mod args;

pub use args::{AlertAction, Cli, Commands, ConfigAction, ThresholdAction};
