//! Error types for LedgerWatch

use thiserror::Error;

use crate::alerting::NotificationError;

/// Result type alias using LedgerWatch's Error type
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that abort a monitoring run.
///
/// Per-key problems (an unreachable explorer, an ambiguous page) are not
/// errors; they are recorded on the key's [`Outcome`](crate::models::Outcome).
#[derive(Error, Debug)]
pub enum Error {
    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// The extraction pattern captured something that is not a number
    #[error("Failed to parse captured value {raw:?} as a number")]
    Parse {
        /// Raw text captured by the pattern
        raw: String,
    },

    /// HTTP client could not be constructed
    #[error("HTTP client error: {0}")]
    Http(#[from] reqwest::Error),

    /// Alert delivery failed
    #[error("Notification error: {0}")]
    Notification(#[from] NotificationError),

    /// A lookup task panicked or was cancelled
    #[error("Lookup task failed: {0}")]
    Task(#[from] tokio::task::JoinError),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization error
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Internal error
    #[error("Internal error: {0}")]
    Internal(String),
}

impl Error {
    /// Create a config error
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    /// Create an internal error
    pub fn internal(msg: impl Into<String>) -> Self {
        Self::Internal(msg.into())
    }

    /// Create a parse error for a non-numeric capture
    pub fn parse(raw: impl Into<String>) -> Self {
        Self::Parse { raw: raw.into() }
    }
}

impl From<config::ConfigError> for Error {
    fn from(err: config::ConfigError) -> Self {
        Self::Config(err.to_string())
    }
}

impl From<regex::Error> for Error {
    fn from(err: regex::Error) -> Self {
        Self::Config(format!("invalid extraction pattern: {err}"))
    }
}
