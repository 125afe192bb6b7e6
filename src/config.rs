use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::mail::remote::DEFAULT_BASE_URL;
use crate::mailbox::DEFAULT_STORAGE_KEY;

const APP_DIR: &str = "rs_mail_browser";

#[derive(Debug, Serialize, Deserialize, Clone, Default, PartialEq)]
pub struct Config {
    pub base_url: Option<String>,
    pub db_path: Option<String>,
    pub storage_key: Option<String>,
    pub timeout_secs: Option<u64>,
    /// Treat a 5xx on the list endpoint as "no more pages". The mock server relies on it.
    pub server_error_ends_list: Option<bool>,
}

impl Config {
    pub fn base_url(&self) -> &str {
        self.base_url.as_deref().unwrap_or(DEFAULT_BASE_URL)
    }

    pub fn storage_key(&self) -> &str {
        self.storage_key.as_deref().unwrap_or(DEFAULT_STORAGE_KEY)
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs.unwrap_or(15))
    }

    pub fn server_error_ends_list(&self) -> bool {
        self.server_error_ends_list.unwrap_or(true)
    }
}

pub fn config_dir() -> Result<PathBuf> {
    let p = dirs::config_dir()
        .ok_or_else(|| anyhow::anyhow!("no config dir available"))?
        .join(APP_DIR);
    fs::create_dir_all(&p)?;
    Ok(p)
}

pub fn config_path() -> Result<PathBuf> {
    Ok(config_dir()?.join("config.toml"))
}

pub fn default_db_path() -> Result<PathBuf> {
    Ok(config_dir()?.join("state.db"))
}

pub fn log_path() -> Result<PathBuf> {
    Ok(config_dir()?.join("tui.log"))
}

pub fn load_config() -> Result<Config> {
    load_config_from(&config_path()?)
}

/// Read the config at `path`, writing a commented-out template first if it is missing.
pub fn load_config_from(path: &Path) -> Result<Config> {
    if !path.exists() {
        let sample = Config {
            base_url: Some(DEFAULT_BASE_URL.to_string()),
            db_path: None,
            storage_key: Some(DEFAULT_STORAGE_KEY.to_string()),
            timeout_secs: Some(15),
            server_error_ends_list: Some(true),
        };
        let tom = toml::to_string_pretty(&sample)?;
        let commented: String = tom.lines().map(|l| format!("# {l}\n")).collect();
        fs::write(path, commented)?;
        log::info!("wrote template config to {}", path.display());
        return Ok(Config::default());
    }
    let s = fs::read_to_string(path)?;
    let cfg: Config = toml::from_str(&s)?;
    Ok(cfg)
}

pub fn resolve_db_path(cfg: &Config) -> Result<PathBuf> {
    if let Some(p) = &cfg.db_path {
        Ok(PathBuf::from(p))
    } else {
        default_db_path()
    }
}
