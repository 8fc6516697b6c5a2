//! Configuration management

use crate::error::Result;
use crate::types::Config;
use crate::utils::paths::{ensure_dir, get_config_dir, get_config_path};
use std::env;
use std::path::Path;
use tokio::fs;
use tokio::process::Command;

/// Environment overrides for the API key and base URL
const API_KEY_VAR: &str = "POPCORN_API_KEY";
const BASE_URL_VAR: &str = "POPCORN_BASE_URL";

/// Load configuration from file, then apply environment overrides
pub async fn load_config() -> Result<Config> {
    let config_path = get_config_path();

    let mut config = if Path::new(&config_path).exists() {
        let content = fs::read_to_string(&config_path).await?;
        // Missing keys fall back to defaults
        serde_json::from_str(&content)?
    } else {
        Config::default()
    };

    apply_env(&mut config, |name| env::var(name).ok());
    Ok(config)
}

fn apply_env(config: &mut Config, var: impl Fn(&str) -> Option<String>) {
    if let Some(key) = var(API_KEY_VAR).filter(|v| !v.is_empty()) {
        config.api_key = key;
    }
    if let Some(url) = var(BASE_URL_VAR).filter(|v| !v.is_empty()) {
        config.base_url = url;
    }
}

/// Save configuration to file
pub async fn save_config(config: &Config) -> Result<()> {
    ensure_dir(&get_config_dir()).await?;
    let content = serde_json::to_string_pretty(config)?;
    fs::write(get_config_path(), content).await?;
    Ok(())
}

/// Open config file in editor
pub async fn edit_config(editor: &str) -> Result<()> {
    let config_path = get_config_path();

    // Ensure config file exists
    if !Path::new(&config_path).exists() {
        save_config(&Config::default()).await?;
    }

    Command::new(editor)
        .arg(&config_path)
        .status()
        .await?;

    Ok(())
}
