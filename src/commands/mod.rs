// Command handlers module
pub mod alerts;
pub mod config;
pub mod monitor;
pub mod services;
pub mod thresholds;

use anyhow::{Context, Result};

use crate::config::Config;
use crate::metrics::MetricSimulator;
use crate::monitor::{Monitor, MonitorOptions};
use crate::output::OutputFormat;
use crate::storage::Database;

pub use alerts::handle_alerts_action;
pub use config::handle_config_action;
pub use monitor::{handle_run_command, handle_tick_command};
pub use services::{handle_services_command, handle_summary_command};
pub use thresholds::handle_thresholds_action;

/// Open the monitor against the configured SQLite file
pub fn open_monitor(config: &Config) -> Result<Monitor> {
    let path = config.storage_path()?;
    let database = Database::new(&path)
        .with_context(|| format!("Failed to open storage at {}", path.display()))?;
    Monitor::open(Box::new(database), monitor_options(config))
}

pub fn monitor_options(config: &Config) -> MonitorOptions {
    let simulator = config
        .simulation
        .enabled
        .then(|| MetricSimulator::new(config.simulation.seed, config.simulation.jitter_ms));
    MonitorOptions {
        simulator,
        ..MonitorOptions::default()
    }
}

pub(crate) fn render<T: OutputFormat + ?Sized>(item: &T, json_output: bool) -> Result<String> {
    if json_output {
        Ok(item.to_json()?)
    } else {
        Ok(item.to_table())
    }
}
