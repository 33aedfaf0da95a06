//! Error type definitions
//!
//! Defines the main error types used throughout the sign-in automation crate.

use thiserror::Error;

/// Main error type for the sign-in automation
#[derive(Error, Debug)]
pub enum Error {
    /// Configuration-related errors
    #[error("Configuration error: {0}")]
    Config(String),

    /// Browser engine errors (launch, protocol, script evaluation)
    #[error("Browser error: {0}")]
    Browser(String),

    /// Page navigation errors
    #[error("Navigation error: {url}: {reason}")]
    Navigation { url: String, reason: String },

    /// A bounded wait ran out before its condition became true
    #[error("Timed out waiting for {condition} after {waited_ms}ms")]
    WaitTimeout { condition: String, waited_ms: u64 },

    /// Anti-bot challenge resolution errors
    #[error("Challenge resolution failed: {0}")]
    Challenge(String),

    /// Session cache read/write errors
    #[error("Session cache error: {operation}")]
    Cache { operation: String },

    /// Secrets distribution errors
    #[error("Secrets error: {0}")]
    Secrets(String),

    /// Network/HTTP client errors
    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    /// JSON serialization/deserialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// I/O errors
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// URL parsing errors
    #[error("URL parse error: {0}")]
    UrlParse(#[from] url::ParseError),

    /// Generic errors
    #[error("Internal error: {0}")]
    Internal(String),
}

/// Result type alias for convenience
pub type Result<T> = std::result::Result<T, Error>;

impl Error {
    /// Create a new configuration error
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    /// Create a new browser engine error
    pub fn browser(msg: impl Into<String>) -> Self {
        Self::Browser(msg.into())
    }

    /// Create a navigation error
    pub fn navigation(url: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::Navigation {
            url: url.into(),
            reason: reason.into(),
        }
    }

    /// Create a wait timeout error
    pub fn wait_timeout(condition: impl Into<String>, waited: std::time::Duration) -> Self {
        Self::WaitTimeout {
            condition: condition.into(),
            waited_ms: waited.as_millis() as u64,
        }
    }

    /// Create a challenge resolution error
    pub fn challenge(msg: impl Into<String>) -> Self {
        Self::Challenge(msg.into())
    }

    /// Create a cache error
    pub fn cache(operation: impl Into<String>) -> Self {
        Self::Cache {
            operation: operation.into(),
        }
    }

    /// Create a secrets distribution error
    pub fn secrets(msg: impl Into<String>) -> Self {
        Self::Secrets(msg.into())
    }

    /// Create a new internal error
    pub fn internal(msg: impl Into<String>) -> Self {
        Self::Internal(msg.into())
    }

    /// Whether this error is a bounded-wait timeout.
    ///
    /// Timeouts are recoverable conditions in the sign-in flow; callers use
    /// this to distinguish "not yet" from hard failures.
    pub fn is_wait_timeout(&self) -> bool {
        matches!(self, Self::WaitTimeout { .. })
    }
}
