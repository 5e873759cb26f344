// sentinel: service health monitoring with threshold alerts
use std::path::{Path, PathBuf};
use std::time::Duration;

use clap::Parser;
use serde_json::json;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use sentinel::cli::{Cli, Commands};
use sentinel::commands::{
    handle_alerts_action, handle_config_action, handle_run_command, handle_services_command,
    handle_summary_command, handle_thresholds_action, handle_tick_command, open_monitor,
};
use sentinel::config::Config;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let config_path = match &cli.config {
        Some(path) => PathBuf::from(path),
        None => Config::default_path()?,
    };

    // Load configuration
    let mut config = match Config::load_from(&config_path) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Error: Failed to load configuration: {e:#}");
            std::process::exit(1);
        }
    };
    if let Some(storage) = &cli.storage {
        config.storage.path = storage.clone();
    }

    init_tracing(&config, cli.verbose);

    let json_output = cli.json || config.wants_json();
    if let Err(e) = run(cli, config, &config_path, json_output).await {
        if json_output {
            println!("{}", json!({ "status": "error", "message": format!("{e:#}") }));
        } else {
            eprintln!("Error: {e:#}");
        }
        std::process::exit(1);
    }

    Ok(())
}

fn init_tracing(config: &Config, verbose: bool) {
    let fallback = if verbose { "debug" } else { config.logging.level.as_str() };
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(fallback)),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}

async fn run(cli: Cli, config: Config, config_path: &Path, json_output: bool) -> anyhow::Result<()> {
    let output = match cli.command {
        Commands::Services => handle_services_command(&open_monitor(&config)?, json_output)?,
        Commands::Summary => handle_summary_command(&open_monitor(&config)?, json_output)?,
        Commands::Thresholds { action } => {
            let mut monitor = open_monitor(&config)?;
            handle_thresholds_action(action, &mut monitor, json_output)?
        }
        Commands::Alerts { action } => {
            let mut monitor = open_monitor(&config)?;
            handle_alerts_action(action, &mut monitor, json_output)?
        }
        Commands::Tick => {
            let mut monitor = open_monitor(&config)?;
            handle_tick_command(&mut monitor, json_output)?
        }
        Commands::Run {
            duration_secs,
            interval_secs,
            no_simulation,
        } => {
            let mut config = config;
            if no_simulation {
                config.simulation.enabled = false;
            }
            let interval = Duration::from_secs(interval_secs.unwrap_or(config.scheduler.interval_secs).max(1));
            let monitor = open_monitor(&config)?;
            return handle_run_command(monitor, interval, duration_secs.map(Duration::from_secs), json_output).await;
        }
        Commands::Config { action } => handle_config_action(action, config_path, json_output)?,
    };

    println!("{}", output);
    Ok(())
}
