use crate::error::ConfigError;
use crate::window::WindowConfig;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// Top-level settings read at startup.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub window: WindowConfig,
    /// Filter directive used when `TGDESK_LOG` is unset.
    pub log_level: String,
    /// Phone numbers to sign in with on launch.
    pub accounts: Vec<String>,
    /// Frames to run for in headless mode.
    pub headless_frames: u64,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            window: WindowConfig::default(),
            log_level: "info".to_string(),
            accounts: Vec::new(),
            headless_frames: 3,
        }
    }
}

/// Returns the config file path: `<config_dir>/tgdesk/config.json`.
pub fn config_path() -> PathBuf {
    let base = dirs::config_dir().unwrap_or_else(|| PathBuf::from("."));
    base.join("tgdesk").join("config.json")
}

/// Read and parse a config file.
pub fn read_config(path: &Path) -> Result<Config, ConfigError> {
    let contents = fs::read_to_string(path).map_err(|source| ConfigError::Read {
        path: path.display().to_string(),
        source,
    })?;
    serde_json::from_str(&contents).map_err(|source| ConfigError::Parse {
        path: path.display().to_string(),
        source,
    })
}

/// Load the config from `path`, falling back to defaults if the file is
/// missing or unreadable.
///
/// A file that exists but cannot be used is handed back alongside the
/// defaults, so the caller can report it once logging is up.
pub fn load_config_from(path: &Path) -> (Config, Option<ConfigError>) {
    if !path.exists() {
        return (Config::default(), None);
    }
    match read_config(path) {
        Ok(config) => (config, None),
        Err(e) => (Config::default(), Some(e)),
    }
}

/// Load the config from its default location.
pub fn load_config() -> (Config, Option<ConfigError>) {
    load_config_from(&config_path())
}
