#![forbid(unsafe_code)]

use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum TaskuiError {
    #[error("no active session - run 'taskui login' first")]
    MissingSession,

    #[error("{field}: {message}")]
    Validation { field: String, message: String },

    #[error("{0}")]
    Unauthorized(String),

    #[error("request failed: {0}")]
    Network(#[source] reqwest::Error),

    #[error("{message}")]
    Server { status: u16, message: String },

    #[error("config error: {0}")]
    Config(String),

    #[error("invalid config key '{0}'")]
    InvalidConfigKey(String),

    #[error("invalid config value for '{key}': {msg}")]
    InvalidConfigValue { key: String, msg: String },

    #[error("operation cancelled")]
    Cancelled,

    #[error("io error at {path}: {source}")]
    IoPath {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("{0}")]
    Other(String),
}

impl TaskuiError {
    /// True for failures that should send the user back to the login form.
    #[must_use]
    pub fn is_auth(&self) -> bool {
        matches!(self, Self::MissingSession | Self::Unauthorized(_))
    }
}
