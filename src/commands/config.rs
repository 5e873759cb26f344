use std::path::Path;

use anyhow::{Context, Result};
use serde_json::json;

use crate::cli::ConfigAction;
use crate::config::Config;

pub fn handle_config_action(action: ConfigAction, config_path: &Path, json_output: bool) -> Result<String> {
    match action {
        ConfigAction::Init => {
            Config::default()
                .save_to(config_path)
                .context("Failed to initialize config")?;
            if json_output {
                Ok(json!({
                    "status": "success",
                    "message": "Configuration initialized successfully",
                    "path": config_path.display().to_string(),
                })
                .to_string())
            } else {
                Ok(format!("Configuration initialized at: {}", config_path.display()))
            }
        }
        ConfigAction::Show => {
            let config = Config::load_from(config_path).context("Failed to load config")?;
            if json_output {
                Ok(serde_json::to_string_pretty(&config)?)
            } else {
                let toml_str = toml::to_string_pretty(&config).context("Failed to serialize config")?;
                Ok(format!("Configuration ({})\n{}", config_path.display(), toml_str))
            }
        }
        ConfigAction::Set { key, value } => {
            let mut config = Config::load_from(config_path).context("Failed to load config")?;
            config
                .set_value(&key, &value)
                .context("Invalid configuration")?;
            config.save_to(config_path).context("Failed to save config")?;
            if json_output {
                Ok(json!({
                    "status": "success",
                    "message": format!("Configuration updated: {} = {}", key, value),
                })
                .to_string())
            } else {
                Ok(format!("Configuration updated: {} = {}", key, value))
            }
        }
    }
}
