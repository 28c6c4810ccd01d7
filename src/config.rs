// Configuration management

use anyhow::{Context, Result};
use std::fs;
use std::path::{Path, PathBuf};

use crate::models::AppConfig;

/// Overrides `service_url` from the config file when set
pub const BACKEND_URL_ENV: &str = "CRAVYN_BACKEND_URL";

pub fn get_config_dir() -> Result<PathBuf> {
    let config_dir = dirs::config_dir()
        .ok_or_else(|| anyhow::anyhow!("Could not determine config directory"))?
        .join("cravyn");

    fs::create_dir_all(&config_dir).context("Failed to create config directory")?;

    Ok(config_dir)
}

pub fn get_config_path() -> Result<PathBuf> {
    Ok(get_config_dir()?.join("config.toml"))
}

pub fn get_log_path() -> Result<PathBuf> {
    Ok(get_config_dir()?.join("cravyn.log"))
}

/// Load the user's config, writing the defaults on first run, then apply
/// the environment override.
pub fn load_config() -> Result<AppConfig> {
    let mut config = load_config_from(&get_config_path()?)?;
    apply_env_override(&mut config, std::env::var(BACKEND_URL_ENV).ok());
    Ok(config)
}

pub fn load_config_from(config_path: &Path) -> Result<AppConfig> {
    if !config_path.exists() {
        let default_config = AppConfig::default();
        save_config_to(config_path, &default_config)?;
        return Ok(default_config);
    }

    let contents = fs::read_to_string(config_path).context("Failed to read config file")?;

    let config: AppConfig = toml::from_str(&contents).context("Failed to parse config file")?;

    Ok(config)
}

pub fn save_config_to(config_path: &Path, config: &AppConfig) -> Result<()> {
    let contents = toml::to_string_pretty(config).context("Failed to serialize config")?;

    fs::write(config_path, contents).context("Failed to write config file")?;

    Ok(())
}

fn apply_env_override(config: &mut AppConfig, backend_url: Option<String>) {
    if let Some(url) = backend_url.filter(|u| !u.trim().is_empty()) {
        config.service_url = url;
    }
}
