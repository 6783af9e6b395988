use std::io;
use thiserror::Error;

/// Failures raised by a [`crate::window::Window`].
#[derive(Debug, Error)]
pub enum WindowError {
    /// The surface could not be created. Fatal at startup.
    #[error("failed to create window surface: {0}")]
    Init(#[source] io::Error),
    #[error("window I/O failed: {0}")]
    Io(#[from] io::Error),
    #[error("window used before init()")]
    NotInitialized,
}

/// Failures that abort [`crate::app::App::run`].
#[derive(Debug, Error)]
pub enum AppError {
    #[error(transparent)]
    Window(#[from] WindowError),
    #[error("application init failed: {0}")]
    Init(String),
}

/// Error returned by a layer or panel lifecycle hook.
///
/// Hook errors raised during teardown are logged and never escalated.
#[derive(Debug, Error)]
#[error("{0}")]
pub struct HookError(String);

impl HookError {
    pub fn new(message: impl Into<String>) -> Self {
        Self(message.into())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AccountError {
    #[error("\"{0}\" is not a valid phone number")]
    InvalidPhone(String),
    #[error("account {0} is already added")]
    Duplicate(String),
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config {path}: {source}")]
    Read {
        path: String,
        #[source]
        source: io::Error,
    },
    #[error("invalid config {path}: {source}")]
    Parse {
        path: String,
        #[source]
        source: serde_json::Error,
    },
}

#[derive(Debug, Error)]
pub enum LogError {
    #[error("failed to open log file {path}: {source}")]
    File {
        path: String,
        #[source]
        source: io::Error,
    },
    #[error("invalid log filter: {0}")]
    Filter(#[from] tracing_subscriber::filter::ParseError),
    #[error("a global subscriber is already installed")]
    AlreadySet,
}

/// Extract a readable message from a caught panic payload.
pub(crate) fn panic_message(payload: &(dyn std::any::Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic".to_string()
    }
}
