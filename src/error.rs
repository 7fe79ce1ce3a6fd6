//! Error types for oas-recorder
//!
//! This module defines the error hierarchy for the entire crate.
//! All public APIs return `Result<T, Error>` where Error is defined here.

use thiserror::Error;

/// The main error type for oas-recorder
#[derive(Error, Debug)]
pub enum Error {
    // ============================================================================
    // Configuration Errors
    // ============================================================================
    #[error("Configuration error: {message}")]
    Config { message: String },

    #[error("Invalid config value for '{field}': {message}")]
    InvalidConfigValue { field: String, message: String },

    #[error("Failed to parse YAML: {0}")]
    YamlParse(#[from] serde_yaml::Error),

    #[error("Failed to parse JSON: {0}")]
    JsonParse(#[from] serde_json::Error),

    // ============================================================================
    // Ingestion Errors
    // ============================================================================
    #[error("Invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    #[error("Invalid exchange: {message}")]
    InvalidExchange { message: String },

    #[error("HAR error: {message}")]
    Har { message: String },

    // ============================================================================
    // Path Template Errors
    // ============================================================================
    #[error("Invalid path template '{template}': {message}")]
    InvalidTemplate { template: String, message: String },

    #[error("Cannot parameterise endpoint {index} on host '{host}': {reason}")]
    Parameterise {
        host: String,
        index: usize,
        reason: String,
    },

    // ============================================================================
    // I/O Errors
    // ============================================================================
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("File not found: {path}")]
    FileNotFound { path: String },

    // ============================================================================
    // Generic Errors
    // ============================================================================
    #[error("{0}")]
    Other(String),
}

impl Error {
    /// Create a config error
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config {
            message: message.into(),
        }
    }

    /// Create an invalid config value error
    pub fn invalid_config(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self::InvalidConfigValue {
            field: field.into(),
            message: message.into(),
        }
    }

    /// Create an invalid exchange error
    pub fn invalid_exchange(message: impl Into<String>) -> Self {
        Self::InvalidExchange {
            message: message.into(),
        }
    }

    /// Create a HAR error
    pub fn har(message: impl Into<String>) -> Self {
        Self::Har {
            message: message.into(),
        }
    }

    /// Create an invalid template error
    pub fn invalid_template(template: impl Into<String>, message: impl Into<String>) -> Self {
        Self::InvalidTemplate {
            template: template.into(),
            message: message.into(),
        }
    }

    /// Create a parameterise validation error
    pub fn parameterise(host: impl Into<String>, index: usize, reason: impl Into<String>) -> Self {
        Self::Parameterise {
            host: host.into(),
            index,
            reason: reason.into(),
        }
    }

    /// Check if this error is a validation failure that left state untouched
    pub fn is_validation(&self) -> bool {
        matches!(
            self,
            Error::Parameterise { .. } | Error::InvalidTemplate { .. }
        )
    }

    /// Check if this error was caused by malformed caller input
    pub fn is_bad_input(&self) -> bool {
        matches!(
            self,
            Error::InvalidUrl(_)
                | Error::InvalidExchange { .. }
                | Error::Har { .. }
                | Error::JsonParse(_)
        )
    }
}

/// Result type alias for oas-recorder
pub type Result<T> = std::result::Result<T, Error>;

/// Extension trait for adding context to errors
pub trait ResultExt<T> {
    /// Add context to an error
    fn context(self, message: impl Into<String>) -> Result<T>;

    /// Add context with a closure (lazy evaluation)
    fn with_context<F: FnOnce() -> String>(self, f: F) -> Result<T>;
}

impl<T, E: Into<Error>> ResultExt<T> for std::result::Result<T, E> {
    fn context(self, message: impl Into<String>) -> Result<T> {
        self.map_err(|e| {
            let inner = e.into();
            Error::Other(format!("{}: {}", message.into(), inner))
        })
    }

    fn with_context<F: FnOnce() -> String>(self, f: F) -> Result<T> {
        self.map_err(|e| {
            let inner = e.into();
            Error::Other(format!("{}: {}", f(), inner))
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = Error::config("test message");
        assert_eq!(err.to_string(), "Configuration error: test message");

        let err = Error::parameterise("api.example.com", 3, "index out of range");
        assert_eq!(
            err.to_string(),
            "Cannot parameterise endpoint 3 on host 'api.example.com': index out of range"
        );

        let err = Error::invalid_template("/users/{}", "empty parameter name");
        assert_eq!(
            err.to_string(),
            "Invalid path template '/users/{}': empty parameter name"
        );
    }

    #[test]
    fn test_error_classification() {
        assert!(Error::parameterise("h", 0, "x").is_validation());
        assert!(Error::invalid_template("/x", "y").is_validation());
        assert!(!Error::config("x").is_validation());

        assert!(Error::invalid_exchange("no host").is_bad_input());
        assert!(Error::har("bad log").is_bad_input());
        assert!(!Error::parameterise("h", 0, "x").is_bad_input());
    }

    #[test]
    fn test_result_context() {
        let result: Result<()> = Err(Error::config("inner"));
        let with_context = result.context("outer");
        assert!(with_context
            .unwrap_err()
            .to_string()
            .contains("outer: Configuration error: inner"));
    }
}
