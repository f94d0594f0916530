//! Configuration loading and management
//!
//! Handles parsing of `.daybook.toml` in the data directory.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::lock::DEFAULT_LOCK_TIMEOUT_MS;
use crate::task::{Priority, DEFAULT_CATEGORY, STOCK_CATEGORIES};

/// Name of the configuration file inside the data directory
pub const CONFIG_FILE: &str = ".daybook.toml";

/// Longest lock wait accepted in `store.lock_timeout_ms`
const MAX_LOCK_TIMEOUT_MS: u64 = 60_000;

/// Main configuration structure
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// Store configuration
    #[serde(default)]
    pub store: StoreConfig,

    /// Task defaults
    #[serde(default)]
    pub tasks: TasksConfig,
}

/// Store-related configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoreConfig {
    /// Store file, relative to the data directory
    #[serde(default = "default_store_file")]
    pub file: String,

    /// How long to wait for the store lock
    #[serde(default = "default_lock_timeout_ms")]
    pub lock_timeout_ms: u64,
}

fn default_store_file() -> String {
    "store.json".to_string()
}

fn default_lock_timeout_ms() -> u64 {
    DEFAULT_LOCK_TIMEOUT_MS
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            file: default_store_file(),
            lock_timeout_ms: default_lock_timeout_ms(),
        }
    }
}

/// Tasks configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TasksConfig {
    /// Category for tasks created without one
    #[serde(default = "default_category")]
    pub default_category: String,

    /// Priority for tasks created without one
    #[serde(default = "default_priority")]
    pub default_priority: String,

    /// Categories offered for selection
    #[serde(default = "default_categories")]
    pub categories: Vec<String>,
}

fn default_category() -> String {
    DEFAULT_CATEGORY.to_string()
}

fn default_priority() -> String {
    Priority::default().to_string()
}

fn default_categories() -> Vec<String> {
    STOCK_CATEGORIES.iter().map(|name| name.to_string()).collect()
}

impl Default for TasksConfig {
    fn default() -> Self {
        Self {
            default_category: default_category(),
            default_priority: default_priority(),
            categories: default_categories(),
        }
    }
}

impl TasksConfig {
    pub fn priority(&self) -> crate::error::Result<Priority> {
        self.default_priority.parse()
    }

    fn validate(&self) -> crate::error::Result<()> {
        if self.default_category.trim().is_empty() {
            return Err(crate::error::Error::InvalidConfig(
                "tasks.default_category cannot be empty".to_string(),
            ));
        }
        self.priority().map_err(|_| {
            crate::error::Error::InvalidConfig(format!(
                "tasks.default_priority: invalid priority '{}' (expected low|medium|high)",
                self.default_priority
            ))
        })?;
        if self.categories.iter().any(|name| name.trim().is_empty()) {
            return Err(crate::error::Error::InvalidConfig(
                "tasks.categories cannot contain empty names".to_string(),
            ));
        }
        Ok(())
    }
}

impl StoreConfig {
    /// Absolute store path for a data directory
    pub fn path_in(&self, data_dir: &Path) -> PathBuf {
        data_dir.join(&self.file)
    }

    fn validate(&self) -> crate::error::Result<()> {
        if self.file.trim().is_empty() {
            return Err(crate::error::Error::InvalidConfig(
                "store.file cannot be empty".to_string(),
            ));
        }
        if self.lock_timeout_ms == 0 || self.lock_timeout_ms > MAX_LOCK_TIMEOUT_MS {
            return Err(crate::error::Error::InvalidConfig(format!(
                "store.lock_timeout_ms must be between 1 and {MAX_LOCK_TIMEOUT_MS}"
            )));
        }
        Ok(())
    }
}

impl Config {
    /// Load configuration from a `.daybook.toml` file
    pub fn load(path: &Path) -> crate::error::Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: Config = toml::from_str(&content)?;
        config.validate()?;
        Ok(config)
    }

    /// Load configuration from the data directory, or return defaults
    pub fn load_from_dir(data_dir: &Path) -> Self {
        let config_path = data_dir.join(CONFIG_FILE);
        if !config_path.exists() {
            return Self::default();
        }
        Self::load(&config_path).unwrap_or_else(|err| {
            tracing::warn!(path = %config_path.display(), error = %err, "invalid config, using defaults");
            Self::default()
        })
    }

    /// Save configuration to a file
    pub fn save(&self, path: &Path) -> crate::error::Result<()> {
        let content = toml::to_string_pretty(self)?;
        std::fs::write(path, content)?;
        Ok(())
    }

    fn validate(&self) -> crate::error::Result<()> {
        self.store.validate()?;
        self.tasks.validate()?;
        Ok(())
    }
}
