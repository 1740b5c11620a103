//! Error handling module
//!
//! This module defines the error types and result type aliases used in the application.

use thiserror::Error;
use std::io;

use crate::config::ConfigError;

/// Exit code reported when the configuration cannot be resolved.
pub const EXIT_CONFIG_ERROR: i32 = 23;

/// Exit code reported when the engine cannot be started or dies.
pub const EXIT_ENGINE_ERROR: i32 = 1;

/// Adapter error type
#[derive(Error, Debug)]
pub enum AdapterError {
    /// Configuration resolution or synthesis failed
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Engine bootstrap error
    #[error("Engine error: {0}")]
    Engine(String),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    /// Engine document serialization error
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl AdapterError {
    /// Process exit code the host should observe for this error
    pub fn exit_code(&self) -> i32 {
        match self {
            AdapterError::Config(_) => EXIT_CONFIG_ERROR,
            _ => EXIT_ENGINE_ERROR,
        }
    }
}

/// Result type alias
///
/// This is a `Result` type alias that uses our custom `AdapterError`.
pub type Result<T> = std::result::Result<T, AdapterError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_conversion() {
        let io_err = io::Error::new(io::ErrorKind::NotFound, "engine binary not found");
        let err: AdapterError = io_err.into();

        match err {
            AdapterError::Io(_) => {}
            _ => panic!("Should convert to IO error"),
        }
    }

    #[test]
    fn test_exit_codes() {
        let err: AdapterError = ConfigError::UnsupportedMode("quic".to_string()).into();
        assert_eq!(err.exit_code(), 23);

        let err = AdapterError::Engine("failed to spawn".to_string());
        assert_eq!(err.exit_code(), 1);
    }

    #[test]
    fn test_error_display() {
        let err: AdapterError = ConfigError::Validation {
            field: "localAddr".to_string(),
            reason: "no address left after splitting".to_string(),
        }
        .into();
        let err_str = format!("{}", err);
        assert!(err_str.contains("localAddr"));
        assert!(err_str.starts_with("Configuration error"));
    }
}
