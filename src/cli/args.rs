use clap::{Parser, Subcommand};

use crate::models::{AlertStatus, Severity};

#[derive(Parser, Debug)]
#[command(name = "sentinel")]
#[command(about = "Service health monitoring with threshold alerts")]
#[command(version)]
pub struct Cli {
    /// Custom config file path
    #[arg(long, global = true)]
    pub config: Option<String>,

    /// Override the storage database path
    #[arg(long, global = true)]
    pub storage: Option<String>,

    /// Verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// JSON output format
    #[arg(long, global = true)]
    pub json: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// List monitored services
    Services,

    /// Show monitor and alert counts
    Summary,

    /// Inspect or edit a service's alert thresholds
    Thresholds {
        #[command(subcommand)]
        action: ThresholdAction,
    },

    /// List, acknowledge or resolve alerts
    Alerts {
        #[command(subcommand)]
        action: AlertAction,
    },

    /// Run a single evaluation pass and exit
    Tick,

    /// Evaluate thresholds periodically until interrupted
    Run {
        /// Stop after this many seconds instead of waiting for Ctrl-C
        #[arg(long)]
        duration_secs: Option<u64>,

        /// Override the configured evaluation interval
        #[arg(long)]
        interval_secs: Option<u64>,

        /// Don't generate mock latency samples
        #[arg(long)]
        no_simulation: bool,
    },

    /// Configuration management
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

#[derive(Subcommand, Debug)]
pub enum ThresholdAction {
    /// Show a service's thresholds
    List {
        service: String,
    },
    /// Add a threshold with default settings (Latency > 500, 5 min)
    Add {
        service: String,
    },
    /// Remove a threshold
    Remove {
        service: String,
        threshold: String,
    },
    /// Change one field of a threshold
    Set {
        service: String,
        threshold: String,
        /// metric, operator, value, duration or enabled
        field: String,
        value: String,
    },
}

#[derive(Subcommand, Debug)]
pub enum AlertAction {
    /// List alerts, newest first
    List {
        /// active, acknowledged or resolved
        #[arg(long)]
        status: Option<AlertStatus>,
        /// warning or critical
        #[arg(long)]
        severity: Option<Severity>,
    },
    /// Acknowledge an active alert
    Ack {
        id: String,
    },
    /// Resolve an alert
    Resolve {
        id: String,
    },
}

#[derive(Subcommand, Debug)]
pub enum ConfigAction {
    /// Show current configuration
    Show,
    /// Initialize fresh configuration
    Init,
    /// Set configuration value
    Set {
        /// Configuration key (e.g., scheduler.interval_secs)
        key: String,
        /// Configuration value
        value: String,
    },
}
