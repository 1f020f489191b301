//! Configuration
//!
//! Settings live in `<config dir>/habitflow/config.toml`. Every field has a
//! default, so a missing or partial file is fine. Environment variables
//! override the file.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::error::{HabitError, Result};
use crate::sync::DEFAULT_MAX_ATTEMPTS;
use crate::types::StreakPolicy;

pub const ENV_DATA_FILE: &str = "HABITFLOW_DATA_FILE";
pub const ENV_USER_ID: &str = "HABITFLOW_USER_ID";
pub const ENV_API_BASE_URL: &str = "HABITFLOW_API_BASE_URL";
pub const ENV_REMOTE: &str = "HABITFLOW_REMOTE";
pub const ENV_STREAK_POLICY: &str = "HABITFLOW_STREAK_POLICY";

/// Default location of the config file
pub fn default_config_path() -> PathBuf {
    dirs::config_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("habitflow")
        .join("config.toml")
}

/// Default location of the snapshot file
pub fn default_data_file() -> PathBuf {
    dirs::data_local_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("habitflow")
        .join("habitflow.json")
}

fn default_base_url() -> String {
    "http://localhost:8000".to_string()
}

fn default_timeout_secs() -> u64 {
    10
}

fn default_max_attempts() -> u32 {
    DEFAULT_MAX_ATTEMPTS
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Config {
    /// Snapshot file holding habits and entries
    #[serde(default = "default_data_file")]
    pub data_file: PathBuf,

    /// User id used when creating the profile
    #[serde(default)]
    pub user_id: Option<String>,

    #[serde(default)]
    pub streak_policy: StreakPolicy,

    #[serde(default)]
    pub remote: RemoteSettings,
}

/// HabitFlow API settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RemoteSettings {
    /// Queue writes and ask the API for insights
    #[serde(default)]
    pub enabled: bool,

    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// Request timeout in seconds
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,

    /// Delivery attempts before a queued write is dropped
    #[serde(default = "default_max_attempts")]
    pub max_attempts: u32,
}

impl Default for RemoteSettings {
    fn default() -> Self {
        Self {
            enabled: false,
            base_url: default_base_url(),
            timeout_secs: default_timeout_secs(),
            max_attempts: default_max_attempts(),
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            data_file: default_data_file(),
            user_id: None,
            streak_policy: StreakPolicy::default(),
            remote: RemoteSettings::default(),
        }
    }
}

impl Config {
    /// Load from the default location, apply environment overrides
    pub fn load() -> Result<Self> {
        let mut config = Self::load_from(&default_config_path())?;
        config.apply_overrides(|key| std::env::var(key).ok())?;
        Ok(config)
    }

    /// Load from a file; a missing file yields the defaults
    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let content = std::fs::read_to_string(path)?;
        toml::from_str(&content)
            .map_err(|e| HabitError::ConfigError(format!("{}: {}", path.display(), e)))
    }

    pub fn save_to(&self, path: &Path) -> Result<()> {
        let content =
            toml::to_string_pretty(self).map_err(|e| HabitError::ConfigError(e.to_string()))?;
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(path, content)?;
        Ok(())
    }

    /// Apply overrides from an environment-like lookup
    pub fn apply_overrides<F>(&mut self, lookup: F) -> Result<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(path) = lookup(ENV_DATA_FILE).filter(|v| !v.is_empty()) {
            self.data_file = PathBuf::from(path);
        }
        if let Some(user_id) = lookup(ENV_USER_ID).filter(|v| !v.is_empty()) {
            self.user_id = Some(user_id);
        }
        if let Some(url) = lookup(ENV_API_BASE_URL).filter(|v| !v.is_empty()) {
            self.remote.base_url = url.trim_end_matches('/').to_string();
        }
        if let Some(flag) = lookup(ENV_REMOTE) {
            self.remote.enabled = parse_flag(ENV_REMOTE, &flag)?;
        }
        if let Some(policy) = lookup(ENV_STREAK_POLICY) {
            self.streak_policy = policy.trim().parse()?;
        }
        Ok(())
    }
}

fn parse_flag(key: &str, value: &str) -> Result<bool> {
    match value.trim().to_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" | "" => Ok(false),
        other => Err(HabitError::ConfigError(format!(
            "{} must be a boolean, got '{}'",
            key, other
        ))),
    }
}
