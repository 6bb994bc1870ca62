//! Error types for tap-incident
//!
//! This module defines the error hierarchy for the whole extractor.
//! All public APIs return `Result<T, Error>` where Error is defined here.

use serde_json::Value;
use thiserror::Error;

/// The main error type for tap-incident
#[derive(Error, Debug)]
pub enum Error {
    // ============================================================================
    // Configuration Errors
    // ============================================================================
    #[error("Configuration error: {message}")]
    Config { message: String },

    #[error("Missing required config field: {field}")]
    MissingConfigField { field: String },

    #[error("Invalid config value for '{field}': {message}")]
    InvalidConfigValue { field: String, message: String },

    #[error("Failed to parse JSON: {0}")]
    JsonParse(#[from] serde_json::Error),

    // ============================================================================
    // HTTP Errors
    // ============================================================================
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("API error {status}: {message}")]
    Api {
        status: u16,
        message: String,
        /// Response body, when it parsed as JSON
        body: Option<Value>,
    },

    #[error("Invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    // ============================================================================
    // Replication Errors
    // ============================================================================
    #[error("Stream '{stream}': record has no value for replication key '{field}'")]
    MissingCursor { stream: String, field: String },

    #[error("Stream '{stream}': cannot parse replication key '{field}' value '{value}' as a timestamp")]
    MalformedCursor {
        stream: String,
        field: String,
        value: String,
    },

    #[error("State error: {message}")]
    State { message: String },

    #[error("Catalog error: {message}")]
    Catalog { message: String },

    #[error("Schema error for stream '{stream}': {message}")]
    Schema { stream: String, message: String },

    // ============================================================================
    // Output Errors
    // ============================================================================
    #[error("Output error: {message}")]
    Output { message: String },

    #[error("Arrow error: {0}")]
    Arrow(#[from] arrow::error::ArrowError),

    #[error("Parquet error: {0}")]
    Parquet(#[from] parquet::errors::ParquetError),

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
}

impl Error {
    /// Create a config error
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config {
            message: message.into(),
        }
    }

    /// Create a missing field error
    pub fn missing_field(field: impl Into<String>) -> Self {
        Self::MissingConfigField {
            field: field.into(),
        }
    }

    /// Create an invalid config value error
    pub fn invalid_value(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self::InvalidConfigValue {
            field: field.into(),
            message: message.into(),
        }
    }

    /// Create an API error from a status and raw response body.
    ///
    /// The body is kept as JSON when it parses; the message prefers the
    /// upstream `error`/`message` field and falls back to the raw text.
    pub fn api(status: u16, raw_body: &str) -> Self {
        let body: Option<Value> = serde_json::from_str(raw_body).ok();
        let message = body
            .as_ref()
            .and_then(|b| {
                b.get("message")
                    .or_else(|| b.get("error"))
                    .and_then(Value::as_str)
                    .map(String::from)
            })
            .unwrap_or_else(|| raw_body.trim().to_string());
        Self::Api {
            status,
            message,
            body,
        }
    }

    /// Create a state error
    pub fn state(message: impl Into<String>) -> Self {
        Self::State {
            message: message.into(),
        }
    }

    /// Create a catalog error
    pub fn catalog(message: impl Into<String>) -> Self {
        Self::Catalog {
            message: message.into(),
        }
    }

    /// Create an output error
    pub fn output(message: impl Into<String>) -> Self {
        Self::Output {
            message: message.into(),
        }
    }

    /// HTTP status carried by this error, if any
    pub fn status(&self) -> Option<u16> {
        match self {
            Error::Api { status, .. } => Some(*status),
            Error::Http(e) => e.status().map(|s| s.as_u16()),
            _ => None,
        }
    }

    /// Check if this error is transient and worth retrying
    pub fn is_retryable(&self) -> bool {
        match self {
            Error::Http(e) => e.is_timeout() || e.is_connect() || e.is_request() || e.is_body(),
            Error::Api { status, .. } => is_retryable_status(*status),
            _ => false,
        }
    }
}

/// Check if an HTTP status code is retryable: 429 and every 5xx
pub(crate) fn is_retryable_status(status: u16) -> bool {
    status == 429 || (500..=599).contains(&status)
}

/// Result type alias for tap-incident
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

        let err = Error::missing_field("api_key");
        assert_eq!(err.to_string(), "Missing required config field: api_key");

        let err = Error::MalformedCursor {
            stream: "alerts".into(),
            field: "created_at".into(),
            value: "yesterday".into(),
        };
        assert!(err.to_string().contains("'yesterday'"));
    }

    #[test]
    fn test_api_error_parses_json_body() {
        let err = Error::api(404, r#"{"type":"not_found","message":"No such incident"}"#);
        match err {
            Error::Api {
                status,
                message,
                body,
            } => {
                assert_eq!(status, 404);
                assert_eq!(message, "No such incident");
                assert_eq!(body.unwrap()["type"], "not_found");
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_api_error_keeps_text_body() {
        let err = Error::api(502, "<html>bad gateway</html>\n");
        assert_eq!(err.to_string(), "API error 502: <html>bad gateway</html>");
        assert!(matches!(err, Error::Api { body: None, .. }));
    }

    #[test]
    fn test_is_retryable() {
        assert!(Error::api(429, "").is_retryable());
        assert!(Error::api(500, "").is_retryable());
        assert!(Error::api(503, "").is_retryable());
        assert!(Error::api(501, "").is_retryable());
        assert!(Error::api(520, "").is_retryable());

        assert!(!Error::api(400, "").is_retryable());
        assert!(!Error::api(401, "").is_retryable());
        assert!(!Error::api(404, "").is_retryable());
        assert!(!Error::config("test").is_retryable());
        assert_eq!(Error::api(418, "").status(), Some(418));
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
