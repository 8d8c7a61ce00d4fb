// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! Unified error hierarchy for SPINDLE.
//!
//! Failures are split into the three domains the client reacts to
//! differently:
//!
//! - [`ConnectionError`]: the request never produced a usable body
//!   (I/O, DNS, TLS, non-2xx status, timeout, cancellation)
//! - [`RequestFailure::AgentError`]: the agent answered with an
//!   MTConnectError document
//! - [`RequestFailure::Unrecognized`]: the body parsed as none of the
//!   expected document shapes
//!
//! Every domain is transient from the client's point of view: the session
//! loop retries after its configured interval, and only an explicit stop
//! terminates it.
//!
//! # Examples
//!
//! ```
//! use spindle_core::error::{ConnectionError, RequestFailure};
//! use std::time::Duration;
//!
//! let failure = RequestFailure::from(ConnectionError::timeout(Duration::from_secs(5)));
//! assert_eq!(failure.domain(), "connection");
//! ```

use std::time::Duration;

use thiserror::Error;

use crate::document::ErrorDocument;

// =============================================================================
// ConnectionError
// =============================================================================

/// Failures in the connection domain.
///
/// Covers everything that prevents a request from yielding a response
/// body: transport-level errors, unacceptable HTTP status codes, timeouts,
/// and cooperative cancellation. A closed or stopped sample stream also
/// terminates with a `ConnectionError`.
#[derive(Debug, Error)]
pub enum ConnectionError {
    /// Network-level failure (DNS, TCP, TLS, I/O).
    #[error("Connection failed: {message}")]
    Io {
        /// Error message.
        message: String,
        /// Underlying error.
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// The agent answered with a non-success HTTP status.
    #[error("Unexpected HTTP status {code}")]
    Status {
        /// HTTP status code.
        code: u16,
    },

    /// The request did not complete within the configured timeout.
    #[error("Request timed out after {duration:?}")]
    Timeout {
        /// The timeout that elapsed.
        duration: Duration,
    },

    /// The remote end closed the connection.
    #[error("Connection closed: {message}")]
    Closed {
        /// Close reason.
        message: String,
    },

    /// The operation was cancelled by a stop request.
    #[error("Cancelled by stop request")]
    Cancelled,
}

impl ConnectionError {
    /// Creates a network-level failure.
    pub fn io(message: impl Into<String>) -> Self {
        Self::Io {
            message: message.into(),
            source: None,
        }
    }

    /// Creates a network-level failure with a source.
    pub fn io_with<E>(message: impl Into<String>, source: E) -> Self
    where
        E: std::error::Error + Send + Sync + 'static,
    {
        Self::Io {
            message: message.into(),
            source: Some(Box::new(source)),
        }
    }

    /// Creates a status failure.
    pub fn status(code: u16) -> Self {
        Self::Status { code }
    }

    /// Creates a timeout failure.
    pub fn timeout(duration: Duration) -> Self {
        Self::Timeout { duration }
    }

    /// Creates a closed-connection failure.
    pub fn closed(message: impl Into<String>) -> Self {
        Self::Closed {
            message: message.into(),
        }
    }

    /// Returns `true` if the failure is a cooperative cancellation.
    pub fn is_cancelled(&self) -> bool {
        matches!(self, Self::Cancelled)
    }

    /// Returns the error type as a string for logging.
    pub fn error_type(&self) -> &'static str {
        match self {
            ConnectionError::Io { .. } => "io",
            ConnectionError::Status { .. } => "status",
            ConnectionError::Timeout { .. } => "timeout",
            ConnectionError::Closed { .. } => "closed",
            ConnectionError::Cancelled => "cancelled",
        }
    }
}

impl Clone for ConnectionError {
    fn clone(&self) -> Self {
        match self {
            ConnectionError::Io { message, .. } => ConnectionError::Io {
                message: message.clone(),
                source: None,
            },
            ConnectionError::Status { code } => ConnectionError::Status { code: *code },
            ConnectionError::Timeout { duration } => ConnectionError::Timeout {
                duration: *duration,
            },
            ConnectionError::Closed { message } => ConnectionError::Closed {
                message: message.clone(),
            },
            ConnectionError::Cancelled => ConnectionError::Cancelled,
        }
    }
}

// =============================================================================
// RequestFailure
// =============================================================================

/// Classified outcome of a failed agent request.
///
/// The three variants are the three failure domains the error router
/// demultiplexes onto distinct subscriber channels.
#[derive(Debug, Error)]
pub enum RequestFailure {
    /// The request never produced a usable body.
    #[error(transparent)]
    Connection(#[from] ConnectionError),

    /// The agent answered with an MTConnectError document.
    #[error("Agent reported an error: {}", .0.summary())]
    AgentError(Box<ErrorDocument>),

    /// The body parsed as none of the expected document shapes.
    #[error("Unrecognized response body ({} bytes)", .payload.len())]
    Unrecognized {
        /// The raw body that failed to parse.
        payload: String,
    },
}

impl RequestFailure {
    /// Creates an agent-error failure.
    pub fn agent_error(document: ErrorDocument) -> Self {
        Self::AgentError(Box::new(document))
    }

    /// Creates an unrecognized-body failure.
    pub fn unrecognized(payload: impl Into<String>) -> Self {
        Self::Unrecognized {
            payload: payload.into(),
        }
    }

    /// Returns `true` if the failure is a cooperative cancellation.
    pub fn is_cancelled(&self) -> bool {
        matches!(self, Self::Connection(c) if c.is_cancelled())
    }

    /// Returns the failure domain as a string for logging.
    pub fn domain(&self) -> &'static str {
        match self {
            RequestFailure::Connection(_) => "connection",
            RequestFailure::AgentError(_) => "agent_error",
            RequestFailure::Unrecognized { .. } => "unrecognized",
        }
    }
}

// =============================================================================
// ConfigError
// =============================================================================

/// Configuration validation errors.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ConfigError {
    /// A field value failed validation.
    #[error("Validation failed for '{field}': {message}")]
    Validation {
        /// The field that failed validation.
        field: String,
        /// Error message.
        message: String,
    },

    /// A required field is missing.
    #[error("Missing required field: {field}")]
    MissingField {
        /// The missing field name.
        field: String,
    },
}

impl ConfigError {
    /// Creates a validation error.
    pub fn validation(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Validation {
            field: field.into(),
            message: message.into(),
        }
    }

    /// Creates a missing field error.
    pub fn missing_field(field: impl Into<String>) -> Self {
        Self::MissingField {
            field: field.into(),
        }
    }
}

// =============================================================================
// SpindleError - Root Error Type
// =============================================================================

/// The root error type for SPINDLE.
#[derive(Debug, Error)]
pub enum SpindleError {
    /// Configuration error.
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Connection-domain error.
    #[error("Connection error: {0}")]
    Connection(#[from] ConnectionError),

    /// Classified request failure.
    #[error("Request failed: {0}")]
    Request(#[from] RequestFailure),

    /// Invalid client lifecycle transition.
    #[error("Lifecycle error: {message}")]
    Lifecycle {
        /// Error message.
        message: String,
    },
}

impl SpindleError {
    /// Creates a lifecycle error.
    pub fn lifecycle(message: impl Into<String>) -> Self {
        Self::Lifecycle {
            message: message.into(),
        }
    }

    /// Returns the error type as a string for logging.
    pub fn error_type(&self) -> &'static str {
        match self {
            SpindleError::Config(_) => "config",
            SpindleError::Connection(_) => "connection",
            SpindleError::Request(_) => "request",
            SpindleError::Lifecycle { .. } => "lifecycle",
        }
    }
}

// =============================================================================
// Result Type Aliases
// =============================================================================

/// A Result type with SpindleError.
pub type SpindleResult<T> = Result<T, SpindleError>;

/// A Result type with ConnectionError.
pub type ConnectionResult<T> = Result<T, ConnectionError>;

/// A Result type with RequestFailure.
pub type RequestResult<T> = Result<T, RequestFailure>;

/// A Result type with ConfigError.
pub type ConfigResult<T> = Result<T, ConfigError>;

// =============================================================================
// Tests
// =============================================================================
