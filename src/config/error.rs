//! Configuration errors
//!
//! This module defines error types for the configuration module.

use std::fmt;
use std::error::Error;

/// Configuration error type
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    /// A numeric or enumerated field could not be parsed
    Parse {
        field: String,
        value: String,
        reason: String,
    },

    /// Transport mode is known but not implemented, or not known at all
    UnsupportedMode(String),

    /// The environment options string is malformed
    Options(String),

    /// A resolved value failed validation
    Validation {
        field: String,
        reason: String,
    },
}

impl ConfigError {
    /// Create a parse error for `field` with the raw `value`
    pub fn parse(field: &str, value: &str, reason: impl Into<String>) -> Self {
        ConfigError::Parse {
            field: field.to_string(),
            value: value.to_string(),
            reason: reason.into(),
        }
    }

    /// Create a validation error for `field`
    pub fn validation(field: &str, reason: impl Into<String>) -> Self {
        ConfigError::Validation {
            field: field.to_string(),
            reason: reason.into(),
        }
    }

    /// Name of the offending field, when the error concerns a single field
    pub fn field(&self) -> Option<&str> {
        match self {
            ConfigError::Parse { field, .. } | ConfigError::Validation { field, .. } => Some(field),
            ConfigError::UnsupportedMode(_) => Some("mode"),
            ConfigError::Options(_) => None,
        }
    }
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::Parse { field, value, reason } =>
                write!(f, "invalid {}: {:?}: {}", field, value, reason),

            ConfigError::UnsupportedMode(mode) =>
                write!(f, "unsupported mode: {}", mode),

            ConfigError::Options(msg) =>
                write!(f, "malformed plugin options: {}", msg),

            ConfigError::Validation { field, reason } =>
                write!(f, "invalid value for '{}': {}", field, reason),
        }
    }
}

impl Error for ConfigError {}

/// Result type alias for configuration operations
pub type Result<T> = std::result::Result<T, ConfigError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_error_names_field_and_value() {
        let err = ConfigError::parse("localPort", "70000", "number too large to fit in target type");
        let msg = err.to_string();
        assert!(msg.contains("localPort"));
        assert!(msg.contains("70000"));
        assert_eq!(err.field(), Some("localPort"));
    }

    #[test]
    fn test_unsupported_mode_display() {
        let err = ConfigError::UnsupportedMode("quic".to_string());
        assert_eq!(err.to_string(), "unsupported mode: quic");
        assert_eq!(err.field(), Some("mode"));
    }
}
