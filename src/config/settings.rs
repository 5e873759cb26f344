use serde::{Deserialize, Serialize};
use anyhow::{Result, Context};
use std::path::{Path, PathBuf};
use std::fs;

use crate::metrics::MAX_JITTER_MS;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Config {
    pub scheduler: SchedulerConfig,
    pub storage: StorageConfig,
    pub simulation: SimulationConfig,
    pub output: OutputConfig,
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SchedulerConfig {
    pub interval_secs: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct StorageConfig {
    pub path: String, // "~/..." is expanded against the home directory
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SimulationConfig {
    pub enabled: bool,
    pub jitter_ms: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub seed: Option<u64>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct OutputConfig {
    pub format: String, // "table" or "json"
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct LoggingConfig {
    pub level: String, // tracing filter directive, e.g. "info" or "sentinel=debug"
}

impl Default for Config {
    fn default() -> Self {
        Self {
            scheduler: SchedulerConfig {
                interval_secs: 5,
            },
            storage: StorageConfig {
                path: "~/.config/sentinel/sentinel.db".to_string(),
            },
            simulation: SimulationConfig {
                enabled: true,
                jitter_ms: 40.0,
                seed: None,
            },
            output: OutputConfig {
                format: "table".to_string(),
            },
            logging: LoggingConfig {
                level: "info".to_string(),
            },
        }
    }
}

impl Config {
    /// Load `config_path`, writing the defaults there on first use
    pub fn load_from(config_path: &Path) -> Result<Self> {
        if !config_path.exists() {
            let config = Self::default();
            config.save_to(config_path)?;
            return Ok(config);
        }

        let contents = fs::read_to_string(config_path)
            .with_context(|| format!("Failed to read config file: {}", config_path.display()))?;

        let config: Self = toml::from_str(&contents)
            .with_context(|| format!("Failed to parse config file: {}", config_path.display()))?;

        Ok(config)
    }

    pub fn save_to(&self, config_path: &Path) -> Result<()> {
        if let Some(parent) = config_path.parent() {
            fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create config directory: {}", parent.display()))?;
        }

        let contents = self.to_commented_toml()?;

        fs::write(config_path, contents)
            .with_context(|| format!("Failed to write config file: {}", config_path.display()))?;

        Ok(())
    }

    /// TOML with a comment above every option
    pub fn to_commented_toml(&self) -> Result<String> {
        let mut output = String::new();

        output.push_str("# sentinel configuration\n");
        output.push_str("# Service health monitoring and threshold alerting\n");
        output.push_str("\n");

        output.push_str("[scheduler]\n");
        output.push_str("# Seconds between threshold evaluations while `sentinel run` is active.\n");
        output.push_str("# The first evaluation happens immediately on start.\n");
        output.push_str(&format!("interval_secs = {}\n", self.scheduler.interval_secs));
        output.push_str("\n");

        output.push_str("[storage]\n");
        output.push_str("# SQLite file holding the service and alert collections\n");
        output.push_str(&format!("path = {}\n", toml_string(&self.storage.path)));
        output.push_str("\n");

        output.push_str("[simulation]\n");
        output.push_str("# Generate mock latency samples on every evaluation\n");
        output.push_str(&format!("enabled = {}\n", self.simulation.enabled));
        output.push_str("# Largest change between two consecutive samples, in milliseconds\n");
        output.push_str(&format!("jitter_ms = {:?}\n", self.simulation.jitter_ms));
        output.push_str("# Fixed random seed for reproducible samples (omit for random)\n");
        match self.simulation.seed {
            Some(seed) => output.push_str(&format!("seed = {}\n", seed)),
            None => output.push_str("# seed = 42\n"),
        }
        output.push_str("\n");

        output.push_str("[output]\n");
        output.push_str("# \"table\" or \"json\"; --json overrides\n");
        output.push_str(&format!("format = {}\n", toml_string(&self.output.format)));
        output.push_str("\n");

        output.push_str("[logging]\n");
        output.push_str("# Log filter used when RUST_LOG is not set\n");
        output.push_str(&format!("level = {}\n", toml_string(&self.logging.level)));

        Ok(output)
    }

    pub fn default_path() -> Result<PathBuf> {
        let home = dirs::home_dir()
            .context("Failed to determine home directory")?;
        Ok(home.join(".config").join("sentinel").join("config.toml"))
    }

    pub fn storage_path(&self) -> Result<PathBuf> {
        expand_home(&self.storage.path)
    }

    pub fn wants_json(&self) -> bool {
        self.output.format == "json"
    }

    pub fn set_value(&mut self, key: &str, value: &str) -> Result<()> {
        match key {
            "scheduler.interval_secs" => {
                let secs: u64 = value.parse()
                    .with_context(|| format!("Invalid interval value: {}", value))?;
                if secs == 0 {
                    anyhow::bail!("Interval must be at least 1 second");
                }
                self.scheduler.interval_secs = secs;
            }
            "storage.path" => {
                if value.trim().is_empty() {
                    anyhow::bail!("Storage path must not be empty");
                }
                self.storage.path = value.to_string();
            }
            "simulation.enabled" => {
                self.simulation.enabled = value.parse()
                    .with_context(|| format!("Invalid boolean value: {}", value))?;
            }
            "simulation.jitter_ms" => {
                let jitter: f64 = value.parse()
                    .with_context(|| format!("Invalid jitter value: {}", value))?;
                if !jitter.is_finite() || jitter < 0.0 {
                    anyhow::bail!("Jitter must be a non-negative number");
                }
                if jitter > MAX_JITTER_MS {
                    anyhow::bail!("Jitter must be at most {} ms", MAX_JITTER_MS);
                }
                self.simulation.jitter_ms = jitter;
            }
            "simulation.seed" => {
                self.simulation.seed = if value == "none" {
                    None
                } else {
                    Some(value.parse().with_context(|| format!("Invalid seed value: {}", value))?)
                };
            }
            "output.format" => {
                if !["table", "json"].contains(&value) {
                    anyhow::bail!("Invalid output format: {}. Must be 'table' or 'json'", value);
                }
                self.output.format = value.to_string();
            }
            "logging.level" => self.logging.level = value.to_string(),
            _ => anyhow::bail!("Unknown configuration key: {}", key),
        }
        Ok(())
    }
}

fn toml_string(value: &str) -> String {
    toml::Value::String(value.to_string()).to_string()
}

fn expand_home(path: &str) -> Result<PathBuf> {
    match path.strip_prefix("~/") {
        Some(rest) => {
            let home = dirs::home_dir()
                .context("Failed to determine home directory")?;
            Ok(home.join(rest))
        }
        None => Ok(PathBuf::from(path)),
    }
}
