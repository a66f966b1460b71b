//! Error types for citus-node
//!
//! Connection, query and input-validation errors. Codes are kept as
//! provider-neutral strings so nothing outside `coordinator::postgres`
//! depends on the driver's error shape.

use thiserror::Error;

use crate::coordinator::Secret;

/// Rendered in place of an error code the provider did not supply
pub const UNKNOWN_CODE: &str = "none";

/// Primary error type for all citus-node operations
#[derive(Debug, Error)]
pub enum CitusNodeError {
    // ========== Session Errors ==========

    /// Could not establish a session with the coordinator
    #[error("Cannot connect with Coordinator node. Code: {} - {message}", display_code(.code))]
    ConnectionFailed {
        code: Option<String>,
        message: String,
    },

    // ========== Reconciliation Errors ==========

    /// A statement against the coordinator failed
    #[error("Coordinator {operation} failed. Code: {} - {message}", display_code(.code))]
    QueryFailed {
        operation: &'static str,
        code: Option<String>,
        message: String,
    },

    // ========== Input Errors ==========

    /// Coordinator endpoint failed validation
    #[error("Invalid coordinator endpoint: {reason}")]
    InvalidEndpoint { reason: String },

    /// Worker target failed validation
    #[error("Invalid worker target: {reason}")]
    InvalidWorker { reason: String },

    /// Internal error
    #[error("Internal error: {message}")]
    Internal { message: String },
}

fn display_code(code: &Option<String>) -> &str {
    code.as_deref().unwrap_or(UNKNOWN_CODE)
}

impl CitusNodeError {
    /// Returns true if the session was never established
    pub fn is_connection_error(&self) -> bool {
        matches!(self, CitusNodeError::ConnectionFailed { .. })
    }

    /// Underlying provider error code, if any
    pub fn code(&self) -> Option<&str> {
        match self {
            CitusNodeError::ConnectionFailed { code, .. }
            | CitusNodeError::QueryFailed { code, .. } => code.as_deref(),
            _ => None,
        }
    }

    /// Strip `secret` from any message text carried by this error
    pub fn scrubbed(self, secret: Option<&Secret>) -> Self {
        let Some(secret) = secret else {
            return self;
        };
        match self {
            CitusNodeError::ConnectionFailed { code, message } => CitusNodeError::ConnectionFailed {
                code,
                message: secret.scrub(&message),
            },
            CitusNodeError::QueryFailed {
                operation,
                code,
                message,
            } => CitusNodeError::QueryFailed {
                operation,
                code,
                message: secret.scrub(&message),
            },
            CitusNodeError::InvalidEndpoint { reason } => CitusNodeError::InvalidEndpoint {
                reason: secret.scrub(&reason),
            },
            CitusNodeError::InvalidWorker { reason } => CitusNodeError::InvalidWorker {
                reason: secret.scrub(&reason),
            },
            CitusNodeError::Internal { message } => CitusNodeError::Internal {
                message: secret.scrub(&message),
            },
        }
    }
}

/// Result type alias for citus-node operations
pub type Result<T> = std::result::Result<T, CitusNodeError>;
