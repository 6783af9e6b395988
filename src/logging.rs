//! File logging. The terminal belongs to the UI, so log output goes to
//! `<data_local_dir>/tgdesk/tgdesk.log`.

use crate::error::LogError;
use std::fs::{self, OpenOptions};
use std::path::PathBuf;
use std::sync::Mutex;
use tracing_subscriber::EnvFilter;

/// Environment variable holding filter directives, e.g. `tgdesk=debug`.
pub const LOG_ENV: &str = "TGDESK_LOG";

pub fn log_path() -> PathBuf {
    let base = dirs::data_local_dir().unwrap_or_else(|| PathBuf::from("."));
    base.join("tgdesk").join("tgdesk.log")
}

/// Directives from the environment win over the configured level.
fn build_filter(from_env: Option<String>, default_level: &str) -> Result<EnvFilter, LogError> {
    let directives = from_env
        .filter(|v| !v.trim().is_empty())
        .unwrap_or_else(|| default_level.to_string());
    Ok(EnvFilter::try_new(directives)?)
}

/// Install the global subscriber. Returns the log file path.
pub fn init(default_level: &str) -> Result<PathBuf, LogError> {
    let filter = build_filter(std::env::var(LOG_ENV).ok(), default_level)?;

    let path = log_path();
    let file_error = |source| LogError::File {
        path: path.display().to_string(),
        source,
    };
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).map_err(file_error)?;
    }
    let file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(&path)
        .map_err(file_error)?;

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(Mutex::new(file))
        .with_ansi(false)
        .with_target(false)
        .try_init()
        .map_err(|_| LogError::AlreadySet)?;
    Ok(path)
}
