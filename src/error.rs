//! @ai:module:intent Define error types for configuration, discovery and probe clients
//! @ai:module:layer domain
//! @ai:module:public_api Error, ClientError, Result
//! @ai:module:stateless true

use std::path::PathBuf;
use std::time::Duration;
use thiserror::Error;

/// @ai:intent Batch-level errors; anything that stops the verifier from proceeding at all
#[derive(Error, Debug)]
pub enum Error {
    #[error("Failed to read config file {path}: {source}")]
    ConfigRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse config file {path}: {source}")]
    ConfigParse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    #[error("Invalid configuration: {field}: {message}")]
    InvalidConfig { field: String, message: String },

    #[error("Model discovery failed at {endpoint}: {source}")]
    Discovery {
        endpoint: String,
        #[source]
        source: ClientError,
    },

    #[error("No verification tasks were created")]
    NoTasks,

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON serialization error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("TOML serialization error: {0}")]
    TomlSerialize(#[from] toml::ser::Error),
}

impl Error {
    /// @ai:intent Shorthand for a validation failure on one config field
    /// @ai:effects pure
    pub fn invalid(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self::InvalidConfig {
            field: field.into(),
            message: message.into(),
        }
    }
}

pub type Result<T> = std::result::Result<T, Error>;

/// @ai:intent Failure of a single probe-client call
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ClientError {
    #[error("HTTP {status}: {body}")]
    Status { status: u16, body: String },

    #[error("transport error: {0}")]
    Transport(String),

    #[error("failed to decode response: {0}")]
    Decode(String),

    #[error("request timed out after {0:?}")]
    Timeout(Duration),

    #[error("failed to build client: {0}")]
    Build(String),

    #[error("{0}")]
    Scripted(String),
}

impl ClientError {
    /// @ai:intent Whether a retry could plausibly succeed
    /// @ai:effects pure
    pub fn is_retryable(&self) -> bool {
        match self {
            ClientError::Transport(_) | ClientError::Timeout(_) => true,
            ClientError::Status { status, .. } => *status == 429 || *status >= 500,
            _ => false,
        }
    }
}

impl From<reqwest::Error> for ClientError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_decode() {
            ClientError::Decode(err.to_string())
        } else if err.is_builder() {
            ClientError::Build(err.to_string())
        } else {
            ClientError::Transport(err.to_string())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_retryable_classification() {
        assert!(ClientError::Transport("reset".to_string()).is_retryable());
        assert!(ClientError::Timeout(Duration::from_secs(1)).is_retryable());
        assert!(ClientError::Status { status: 429, body: String::new() }.is_retryable());
        assert!(ClientError::Status { status: 503, body: String::new() }.is_retryable());
        assert!(!ClientError::Status { status: 401, body: String::new() }.is_retryable());
        assert!(!ClientError::Decode("bad json".to_string()).is_retryable());
    }

    #[test]
    fn test_invalid_config_message() {
        let err = Error::invalid("run.concurrency", "must be between 1 and 100");
        assert_eq!(
            err.to_string(),
            "Invalid configuration: run.concurrency: must be between 1 and 100"
        );
    }
}
