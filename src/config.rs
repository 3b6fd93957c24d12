//! Configuration module for gator.
//!
//! The configuration is a small JSON document stored at
//! `~/.gatorconfig.json`, read and written wholesale. It carries the
//! database URL and the name of the currently logged-in user.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::{GatorError, Result};

/// File name of the configuration document in the home directory.
const CONFIG_FILE_NAME: &str = ".gatorconfig.json";

/// Environment variable overriding the configuration file location.
const CONFIG_PATH_ENV: &str = "GATOR_CONFIG";

/// Persisted gator configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Database connection URL.
    #[serde(default = "default_db_url")]
    pub db_url: String,
    /// Name of the currently logged-in user, if any.
    #[serde(default)]
    pub current_user_name: Option<String>,
}

fn default_db_url() -> String {
    "sqlite:gator.db".to_string()
}

impl Default for Config {
    fn default() -> Self {
        Self {
            db_url: default_db_url(),
            current_user_name: None,
        }
    }
}

impl Config {
    /// Load the configuration from the given path.
    ///
    /// A missing file yields the default configuration so first-run
    /// commands like `register` work before any login has happened.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        if !path.exists() {
            return Ok(Self::default());
        }

        let contents = std::fs::read_to_string(path)
            .map_err(|e| GatorError::Config(format!("failed to read {}: {}", path.display(), e)))?;

        serde_json::from_str(&contents)
            .map_err(|e| GatorError::Config(format!("failed to parse {}: {}", path.display(), e)))
    }

    /// Write the configuration to the given path, replacing the whole
    /// document.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        let contents = serde_json::to_string(self)
            .map_err(|e| GatorError::Config(format!("failed to serialize config: {}", e)))?;

        std::fs::write(path, contents)
            .map_err(|e| GatorError::Config(format!("failed to write {}: {}", path.display(), e)))
    }

    /// Set the current user and persist the change.
    pub fn set_current_user(path: impl AsRef<Path>, name: &str) -> Result<()> {
        let mut config = Self::load(&path)?;
        config.current_user_name = Some(name.to_string());
        config.save(&path)
    }

    /// Read the current user name from the persisted configuration.
    pub fn read_current_user(path: impl AsRef<Path>) -> Result<Option<String>> {
        Ok(Self::load(path)?.current_user_name)
    }
}

/// Resolve the configuration file location.
///
/// `GATOR_CONFIG` takes precedence; otherwise the file lives in the
/// user's home directory.
pub fn config_path() -> PathBuf {
    if let Ok(path) = std::env::var(CONFIG_PATH_ENV) {
        return PathBuf::from(path);
    }
    let home = std::env::var("HOME").unwrap_or_else(|_| ".".to_string());
    Path::new(&home).join(CONFIG_FILE_NAME)
}
