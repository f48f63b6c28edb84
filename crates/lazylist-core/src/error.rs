//! Error types for lazylist.
//!
//! This module provides a unified error type with explicit variants for
//! transport, protocol, and input validation errors, plus [`FailureReason`],
//! the coarse classification surfaced to list and search callers.

use std::fmt;
use thiserror::Error;

/// The unified error type for lazylist operations.
#[derive(Debug, Error)]
pub enum Error {
    /// Network transport errors (DNS, TLS, connection, timeout).
    #[error("transport error: {0}")]
    Transport(#[from] TransportError),

    /// Protocol errors (non-2xx responses, malformed payloads).
    #[error("protocol error: {0}")]
    Protocol(#[from] ProtocolError),

    /// Input validation errors (invalid id, key, URL format).
    #[error("invalid input: {0}")]
    InvalidInput(#[from] InvalidInputError),
}

impl Error {
    /// Collapse this error into the reason reported to list and search callers.
    pub fn reason(&self) -> FailureReason {
        match self {
            Error::Transport(TransportError::Timeout { .. }) => FailureReason::Timeout,
            Error::Transport(_) => FailureReason::Network,
            Error::Protocol(_) | Error::InvalidInput(_) => FailureReason::Server,
        }
    }

    /// Shorthand for a payload that did not match the expected schema.
    pub fn malformed(message: impl Into<String>) -> Self {
        Error::Protocol(ProtocolError::malformed(message))
    }
}

/// Why a fetch or search failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FailureReason {
    /// The call did not complete within its deadline.
    Timeout,
    /// The call could not reach the server.
    Network,
    /// The server answered with an error or an unusable payload.
    Server,
}

impl fmt::Display for FailureReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            FailureReason::Timeout => "timeout",
            FailureReason::Network => "network",
            FailureReason::Server => "server",
        };
        f.write_str(s)
    }
}

/// Transport-level errors.
#[derive(Debug, Error)]
pub enum TransportError {
    /// Network connection failed.
    #[error("connection failed: {message}")]
    Connection { message: String },

    /// DNS resolution failed.
    #[error("DNS resolution failed: {host}")]
    Dns { host: String },

    /// TLS/SSL error.
    #[error("TLS error: {message}")]
    Tls { message: String },

    /// Request timed out.
    #[error("request timed out after {duration_ms}ms")]
    Timeout { duration_ms: u64 },

    /// Generic HTTP or I/O error.
    #[error("HTTP error: {message}")]
    Http { message: String },
}

/// Protocol-level errors from endpoint responses.
#[derive(Debug)]
pub struct ProtocolError {
    /// HTTP status code, or 0 when the payload itself was unusable.
    pub status: u16,
    /// Error code (if present).
    pub error: Option<String>,
    /// Error message from the server.
    pub message: Option<String>,
}

impl fmt::Display for ProtocolError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.status == 0 {
            write!(f, "malformed payload")?;
        } else {
            write!(f, "HTTP {}", self.status)?;
        }
        if let Some(ref error) = self.error {
            write!(f, " [{}]", error)?;
        }
        if let Some(ref message) = self.message {
            write!(f, ": {}", message)?;
        }
        Ok(())
    }
}

impl std::error::Error for ProtocolError {}

impl ProtocolError {
    /// Create a new protocol error.
    pub fn new(status: u16, error: Option<String>, message: Option<String>) -> Self {
        Self {
            status,
            error,
            message,
        }
    }

    /// A payload that could not be parsed into the expected shape.
    pub fn malformed(message: impl Into<String>) -> Self {
        Self::new(0, Some("MalformedPayload".to_string()), Some(message.into()))
    }

    /// Check if this is a not-found error.
    pub fn is_not_found(&self) -> bool {
        self.status == 404
    }
}

/// Input validation errors.
#[derive(Debug, Error)]
pub enum InvalidInputError {
    /// Invalid item id.
    #[error("invalid item id '{value}': {reason}")]
    ItemId { value: String, reason: String },

    /// Invalid media key.
    #[error("invalid media key '{value}': {reason}")]
    MediaKey { value: String, reason: String },

    /// Invalid source URL.
    #[error("invalid source URL '{value}': {reason}")]
    SourceUrl { value: String, reason: String },

    /// Invalid configuration value.
    #[error("invalid config: {message}")]
    Config { message: String },

    /// Generic invalid input.
    #[error("invalid input: {message}")]
    Other { message: String },
}
