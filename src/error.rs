//! Error types for the SARSA arena crate

use std::path::PathBuf;

use thiserror::Error;

/// Main error type for the SARSA arena crate
#[derive(Error, Debug)]
#[non_exhaustive]
pub enum Error {
    #[error("action space for role '{role}' is empty")]
    EmptyActionSpace { role: String },

    #[error("invalid configuration: {message}")]
    InvalidConfiguration { message: String },

    #[error("malformed snapshot {path}: {reason}")]
    MalformedSnapshot { path: PathBuf, reason: String },

    #[error("invalid state key '{key}': {reason}")]
    InvalidStateKey { key: String, reason: String },

    #[error("unknown role '{input}'. Expected one of: {expected}")]
    ParseRole { input: String, expected: String },

    #[error("unknown protagonist '{input}'. Expected one of: {expected}")]
    ParseProtagonist { input: String, expected: String },

    #[error("failed to {operation}: {source}")]
    Io {
        operation: String,
        #[source]
        source: std::io::Error,
    },

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("progress bar template error: {message}")]
    ProgressBarTemplate { message: String },
}

/// Convenience type alias for Results using the crate's Error type
pub type Result<T> = std::result::Result<T, Error>;

impl From<std::io::Error> for Error {
    fn from(source: std::io::Error) -> Self {
        Error::Io {
            operation: "IO operation".to_string(),
            source,
        }
    }
}
