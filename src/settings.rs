use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::{
    fs,
    path::{Path, PathBuf},
};

const ENABLE_LOGS: bool = true;

use crate::log_warn;

pub const CONFIG_ENV: &str = "VISITLOG_CONFIG";
pub const DB_PATH_ENV: &str = "VISITLOG_DB_PATH";
pub const ADMIN_PASSWORD_ENV: &str = "VISITLOG_ADMIN_PASSWORD";
pub const LOG_LEVEL_ENV: &str = "VISITLOG_LOG_LEVEL";

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct AppConfig {
    pub db_path: PathBuf,
    pub admin_password: String,
    pub log_level: String,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            db_path: PathBuf::from("visits.sqlite3"),
            admin_password: "changeme".into(),
            log_level: "info".into(),
        }
    }
}

impl AppConfig {
    /// Reads `path` if it exists. Unparseable contents fall back to defaults.
    pub fn from_file(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }

        let contents = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config from {}", path.display()))?;
        Ok(serde_json::from_str(&contents).unwrap_or_else(|err| {
            log_warn!("Ignoring malformed config {}: {err}", path.display());
            Self::default()
        }))
    }

    /// File (explicit path, else `VISITLOG_CONFIG`), then environment overrides.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let env_path = std::env::var_os(CONFIG_ENV).map(PathBuf::from);
        let mut config = match path.map(Path::to_path_buf).or(env_path) {
            Some(path) => Self::from_file(&path)?,
            None => Self::default(),
        };
        config.apply_overrides(|key| std::env::var(key).ok());
        Ok(config)
    }

    pub fn apply_overrides<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(value) = lookup(DB_PATH_ENV).filter(|v| !v.is_empty()) {
            self.db_path = PathBuf::from(value);
        }
        if let Some(value) = lookup(ADMIN_PASSWORD_ENV) {
            self.admin_password = value;
        }
        if let Some(value) = lookup(LOG_LEVEL_ENV).filter(|v| !v.is_empty()) {
            self.log_level = value;
        }
    }

    pub fn save(&self, path: &Path) -> Result<()> {
        let serialized = serde_json::to_string_pretty(self)?;
        fs::write(path, serialized)
            .with_context(|| format!("Failed to write config to {}", path.display()))
    }

    pub fn log_filter(&self) -> log::LevelFilter {
        self.log_level.parse().unwrap_or(log::LevelFilter::Info)
    }
}
