use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

use crate::app::infrastructure::error::AppError;

const APP_DIR: &str = "formula-settings";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AppConfig {
    /// Storage key the document is kept under
    #[serde(default = "default_storage_key")]
    pub storage_key: String,

    /// Directory for the file storage; platform data dir when unset
    #[serde(default)]
    pub data_dir: Option<PathBuf>,

    /// JSON file used instead of the embedded bootstrap snapshot
    #[serde(default)]
    pub bootstrap_path: Option<PathBuf>,

    /// Ignore persisted state and start over from the bootstrap snapshot
    #[serde(default)]
    pub reset_state: bool,

    #[serde(default = "default_log_level")]
    pub log_level: String,
}

fn default_storage_key() -> String {
    "state".to_string()
}

fn default_log_level() -> String {
    "warn".to_string()
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            storage_key: default_storage_key(),
            data_dir: None,
            bootstrap_path: None,
            reset_state: false,
            log_level: default_log_level(),
        }
    }
}

impl AppConfig {
    /// Load config from the default location, or create default if not exists
    pub fn load() -> Self {
        Self::load_from(&Self::get_config_path())
    }

    pub fn load_from(path: &Path) -> Self {
        match fs::read_to_string(path) {
            Ok(contents) => match serde_json::from_str(&contents) {
                Ok(config) => config,
                Err(e) => {
                    tracing::warn!("failed to parse config {}: {e}; using defaults", path.display());
                    Self::default()
                }
            },
            Err(_) => {
                let default = Self::default();
                if let Err(e) = default.save_to(path) {
                    tracing::debug!("could not write default config: {e}");
                }
                default
            }
        }
    }

    pub fn save_to(&self, path: &Path) -> Result<(), AppError> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }

        let json = serde_json::to_string_pretty(self)?;
        fs::write(path, json)?;

        Ok(())
    }

    /// Get config file path (cross-platform)
    pub fn get_config_path() -> PathBuf {
        let mut path = dirs::config_dir().unwrap_or_else(|| PathBuf::from("."));
        path.push(APP_DIR);
        path.push("config.json");
        path
    }

    /// Directory the file storage writes into
    pub fn storage_dir(&self) -> PathBuf {
        match &self.data_dir {
            Some(dir) => dir.clone(),
            None => {
                let mut path = dirs::data_dir().unwrap_or_else(|| PathBuf::from("."));
                path.push(APP_DIR);
                path.push("storage");
                path
            }
        }
    }

    /// Reads the bootstrap file if one is configured
    pub fn read_bootstrap(&self) -> Result<Option<String>, AppError> {
        match &self.bootstrap_path {
            Some(path) => fs::read_to_string(path).map(Some).map_err(|e| {
                AppError::Config(format!("cannot read bootstrap {}: {e}", path.display()))
            }),
            None => Ok(None),
        }
    }
}
