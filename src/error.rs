//! Error types for pagefeed
//!
//! This module defines the error hierarchy for the entire crate.
//! Fetch failures never escape a session: they are turned into a
//! human-readable message with [`Error::user_message`] and stored as state.
//! Configuration and registration errors are returned to the caller.

use crate::adapter::extract_path;
use serde_json::Value;
use thiserror::Error;

/// Message used when a failure carries no usable text
pub const GENERIC_FETCH_ERROR: &str = "Failed to fetch data";

/// The main error type for pagefeed
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
    // HTTP Errors
    // ============================================================================
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("HTTP {status}: {body}")]
    HttpStatus { status: u16, body: String },

    #[error("Rate limited, retry after {retry_after_seconds}s")]
    RateLimited { retry_after_seconds: u64 },

    #[error("Invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    // ============================================================================
    // Data Processing Errors
    // ============================================================================
    #[error("Failed to decode response: {message}")]
    Decode { message: String },

    // ============================================================================
    // Session Errors
    // ============================================================================
    #[error("Scroll registration failed: {message}")]
    Scroll { message: String },

    // ============================================================================
    // I/O Errors
    // ============================================================================
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    // ============================================================================
    // Generic Errors
    // ============================================================================
    #[error("{0}")]
    Other(String),

    #[error(transparent)]
    Anyhow(#[from] anyhow::Error),
}

impl Error {
    /// Create a config error
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config {
            message: message.into(),
        }
    }

    /// Create an invalid config value error
    pub fn invalid_value(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self::InvalidConfigValue {
            field: field.into(),
            message: message.into(),
        }
    }

    /// Create an HTTP status error
    pub fn http_status(status: u16, body: impl Into<String>) -> Self {
        Self::HttpStatus {
            status,
            body: body.into(),
        }
    }

    /// Create a decode error
    pub fn decode(message: impl Into<String>) -> Self {
        Self::Decode {
            message: message.into(),
        }
    }

    /// Create a scroll registration error
    pub fn scroll(message: impl Into<String>) -> Self {
        Self::Scroll {
            message: message.into(),
        }
    }

    /// Message suitable for showing next to a retry affordance.
    ///
    /// Prefers a structured `message` field in the error payload (top level,
    /// `error.message` or `responseObject.message`), then the error's own
    /// display text, then [`GENERIC_FETCH_ERROR`].
    pub fn user_message(&self) -> String {
        if let Self::HttpStatus { body, .. } = self {
            if let Some(message) = structured_message(body) {
                return message;
            }
        }

        let message = self.to_string();
        if message.trim().is_empty() {
            GENERIC_FETCH_ERROR.to_string()
        } else {
            message
        }
    }
}

/// Pull a message out of a JSON error payload
fn structured_message(body: &str) -> Option<String> {
    let value: Value = serde_json::from_str(body).ok()?;
    ["message", "error.message", "responseObject.message"]
        .iter()
        .find_map(|path| {
            extract_path(&value, path)?
                .as_str()
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .map(ToString::to_string)
        })
}

/// Result type alias for pagefeed
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

        let err = Error::invalid_value("limit", "must be greater than 0");
        assert_eq!(
            err.to_string(),
            "Invalid config value for 'limit': must be greater than 0"
        );

        let err = Error::http_status(404, "Not found");
        assert_eq!(err.to_string(), "HTTP 404: Not found");
    }

    #[test]
    fn test_user_message_prefers_structured_field() {
        let err = Error::http_status(400, r#"{"message": "Page out of range"}"#);
        assert_eq!(err.user_message(), "Page out of range");

        let err = Error::http_status(500, r#"{"error": {"message": "Backend down"}}"#);
        assert_eq!(err.user_message(), "Backend down");

        let err = Error::http_status(500, r#"{"responseObject": {"message": "Nope"}}"#);
        assert_eq!(err.user_message(), "Nope");
    }

    #[test]
    fn test_user_message_skips_non_string_fields() {
        let err = Error::http_status(
            422,
            r#"{"message": 17, "error": {"message": "Invalid cursor"}}"#,
        );
        assert_eq!(err.user_message(), "Invalid cursor");
    }

    #[test]
    fn test_user_message_falls_back_to_display() {
        let err = Error::http_status(502, "<html>Bad Gateway</html>");
        assert_eq!(err.user_message(), "HTTP 502: <html>Bad Gateway</html>");

        let err = Error::http_status(500, r#"{"message": "   "}"#);
        assert_eq!(err.user_message(), "HTTP 500: {\"message\": \"   \"}");

        let err = Error::decode("missing items");
        assert_eq!(err.user_message(), "Failed to decode response: missing items");
    }

    #[test]
    fn test_user_message_generic_fallback() {
        let err = Error::Other(String::new());
        assert_eq!(err.user_message(), GENERIC_FETCH_ERROR);
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
