use std::path::Path;

use figment::{
    providers::{Env, Format, Toml},
    Figment,
};
use serde::{Deserialize, Serialize};
use tracing::debug;

pub const DEFAULT_POLL_INTERVAL_SECS: u64 = 300;

/// Top-level config (recurrent.toml + RECURRENT_* env overrides).
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RecurrentConfig {
    #[serde(default)]
    pub database: DatabaseConfig,
    #[serde(default)]
    pub worker: WorkerConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    #[serde(default = "default_db_path")]
    pub path: String,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            path: default_db_path(),
        }
    }
}

impl DatabaseConfig {
    /// Create the directory holding the database file if it does not exist yet.
    pub fn ensure_parent_dir(&self) -> crate::error::Result<()> {
        if let Some(parent) = Path::new(&self.path).parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }
        Ok(())
    }
}

/// Recurring-task worker settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WorkerConfig {
    /// Seconds between passes of the `run` loop.
    /// Override with env var: RECURRENT_WORKER__POLL_INTERVAL_SECS=60
    #[serde(default = "default_poll_interval_secs")]
    pub poll_interval_secs: u64,
}

impl Default for WorkerConfig {
    fn default() -> Self {
        Self {
            poll_interval_secs: DEFAULT_POLL_INTERVAL_SECS,
        }
    }
}

fn default_poll_interval_secs() -> u64 {
    DEFAULT_POLL_INTERVAL_SECS
}

fn default_db_path() -> String {
    let home = std::env::var("HOME").unwrap_or_else(|_| ".".to_string());
    format!("{}/.recurrent/recurrent.db", home)
}

impl RecurrentConfig {
    /// Load config from a TOML file with RECURRENT_* env var overrides.
    ///
    /// Checks in order:
    ///   1. Explicit path argument
    ///   2. ~/.recurrent/recurrent.toml
    ///
    /// A missing file is not an error: every section has defaults.
    pub fn load(config_path: Option<&str>) -> crate::error::Result<Self> {
        let path = config_path
            .map(String::from)
            .unwrap_or_else(default_config_path);
        debug!(%path, "loading config");

        let config: RecurrentConfig = Figment::new()
            .merge(Toml::file(&path))
            .merge(Env::prefixed("RECURRENT_").split("__"))
            .extract()
            .map_err(|e| crate::error::RecurrentError::Config(e.to_string()))?;

        Ok(config)
    }
}

fn default_config_path() -> String {
    let home = std::env::var("HOME").unwrap_or_else(|_| ".".to_string());
    format!("{}/.recurrent/recurrent.toml", home)
}
