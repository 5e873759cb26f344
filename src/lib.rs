// sentinel library crate
// Exposes modules for integration testing

pub mod alerts;
pub mod analysis;
pub mod cli;
pub mod commands;
pub mod config;
pub mod error;
pub mod metrics;
pub mod models;
pub mod monitor;
pub mod output;
pub mod scheduler;
pub mod storage;
pub mod utils;

pub use error::{MonitorError, MonitorResult};
pub use monitor::{Monitor, MonitorOptions, Session};
