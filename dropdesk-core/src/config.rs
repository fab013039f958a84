use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use crate::error::{DeskError, Result};

/// Environment variable overriding the dropdesk home directory
pub const HOME_ENV: &str = "DROPDESK_HOME";

/// Configuration for the dropdesk CLI, stored in `~/.dropdesk/config.toml`
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DeskConfig {
    #[serde(default)]
    pub storage: StorageConfig,
    #[serde(default)]
    pub downloads: DownloadsConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StorageConfig {
    /// JSON key-value file backing the task list
    pub path: PathBuf,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DownloadsConfig {
    /// Directory that save-as writes into
    pub dir: PathBuf,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Default log filter when RUST_LOG is unset (e.g. "info", "dropdesk_core=debug")
    pub level: Option<String>,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            path: PathBuf::from("${dropdesk_home}/storage.json"),
        }
    }
}

impl Default for DownloadsConfig {
    fn default() -> Self {
        let dir = match dirs::download_dir() {
            Some(dir) => dir,
            None => PathBuf::from("${dropdesk_home}/downloads"),
        };
        Self { dir }
    }
}

impl DeskConfig {
    /// Load config from `<home>/config.toml`, falling back to defaults when
    /// the file does not exist. Invalid TOML is an error.
    pub fn load_or_default() -> Result<Self> {
        Self::load_from(&Self::config_path())
    }

    /// Load config from an explicit path
    pub fn load_from(path: &Path) -> Result<Self> {
        let mut config = if path.exists() {
            let content = fs::read_to_string(path)?;
            toml::from_str(&content).map_err(|e| {
                DeskError::config(format!("invalid TOML in {}: {}", path.display(), e))
            })?
        } else {
            tracing::debug!(path = %path.display(), "No config file, using defaults");
            Self::default()
        };

        config.expand_variables();
        Ok(config)
    }

    /// Dropdesk home: `$DROPDESK_HOME` or `~/.dropdesk`
    pub fn home_dir() -> PathBuf {
        match env::var_os(HOME_ENV) {
            Some(home) if !home.is_empty() => PathBuf::from(home),
            _ => dirs::home_dir()
                .unwrap_or_else(|| PathBuf::from("."))
                .join(".dropdesk"),
        }
    }

    /// Get config file path: `<home>/config.toml`
    pub fn config_path() -> PathBuf {
        Self::home_dir().join("config.toml")
    }

    /// Expand ${var} references in paths
    fn expand_variables(&mut self) {
        let mut vars = HashMap::new();
        vars.insert("HOME".to_string(), env::var("HOME").unwrap_or_default());
        vars.insert(
            "dropdesk_home".to_string(),
            Self::home_dir().display().to_string(),
        );

        self.storage.path = Self::expand_path(&self.storage.path, &vars);
        self.downloads.dir = Self::expand_path(&self.downloads.dir, &vars);
    }

    fn expand_path(path: &Path, vars: &HashMap<String, String>) -> PathBuf {
        PathBuf::from(Self::expand_string(&path.display().to_string(), vars))
    }

    /// Expand ${var} references in a string
    fn expand_string(s: &str, vars: &HashMap<String, String>) -> String {
        let mut result = s.to_string();

        for (key, value) in vars {
            let pattern = format!("${{{}}}", key);
            result = result.replace(&pattern, value);
        }

        result
    }

    /// Save config to file
    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }

        let toml_str = toml::to_string_pretty(self)
            .map_err(|e| DeskError::config(format!("failed to serialize config: {}", e)))?;

        fs::write(path, toml_str)?;
        Ok(())
    }
}
