//! Error types for calls against the remote API.

use thiserror::Error;

/// Maximum number of body characters kept on a `Malformed` error.
pub const SNIPPET_LEN: usize = 200;

/// Coarse classification of an [`ApiError`], for callers that branch on the
/// failure mode rather than the message.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    ConfigurationMissing,
    Transport,
    HttpStatus,
    Malformed,
}

/// A classified failure from the client.
///
/// Every failed call produces exactly one of these; nothing is retried
/// internally.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ApiError {
    /// No credential was available. Raised before any network activity.
    #[error("{message}")]
    ConfigurationMissing { message: String },

    /// No response was received: timeout, DNS failure, connection refused.
    #[error("API request failed: {message}")]
    Transport { message: String },

    /// The service answered with a non-2xx status.
    #[error("API Error: {message}")]
    HttpStatus { status: u16, message: String },

    /// The service answered 2xx but the body was not JSON.
    #[error("API returned a malformed response: {message}")]
    Malformed { message: String, snippet: String },
}

impl ApiError {
    pub fn configuration_missing(message: impl Into<String>) -> Self {
        Self::ConfigurationMissing {
            message: message.into(),
        }
    }

    pub fn transport(message: impl Into<String>) -> Self {
        Self::Transport {
            message: message.into(),
        }
    }

    pub fn http_status(status: u16, message: impl Into<String>) -> Self {
        Self::HttpStatus {
            status,
            message: message.into(),
        }
    }

    /// Build a `Malformed` error, keeping the first [`SNIPPET_LEN`] characters
    /// of the offending body.
    pub fn malformed(message: impl Into<String>, body: &str) -> Self {
        Self::Malformed {
            message: message.into(),
            snippet: body.chars().take(SNIPPET_LEN).collect(),
        }
    }

    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::ConfigurationMissing { .. } => ErrorKind::ConfigurationMissing,
            Self::Transport { .. } => ErrorKind::Transport,
            Self::HttpStatus { .. } => ErrorKind::HttpStatus,
            Self::Malformed { .. } => ErrorKind::Malformed,
        }
    }

    /// The bare human-readable message, without the kind prefix used by
    /// `Display`.
    pub fn message(&self) -> &str {
        match self {
            Self::ConfigurationMissing { message }
            | Self::Transport { message }
            | Self::HttpStatus { message, .. }
            | Self::Malformed { message, .. } => message,
        }
    }

    /// HTTP status code, present only for `HttpStatus`.
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::HttpStatus { status, .. } => Some(*status),
            _ => None,
        }
    }
}

impl From<reqwest::Error> for ApiError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            Self::transport(format!("request timed out: {err}"))
        } else if err.is_connect() {
            Self::transport(format!("connection failed: {err}"))
        } else {
            Self::transport(err.to_string())
        }
    }
}

/// Result type alias for API operations.
pub type Result<T> = std::result::Result<T, ApiError>;
