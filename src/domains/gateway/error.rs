//! Gateway error types.

use std::time::Duration;

use thiserror::Error;

use crate::domains::tools::ValidationError;

/// Result type for gateway operations.
pub type GatewayResult<T> = Result<T, GatewayError>;

/// Errors surfaced by the data access gateway.
#[derive(Debug, Error)]
pub enum GatewayError {
    /// The store is unreachable or the handshake failed.
    #[error("Connection error: {0}")]
    Connection(String),

    /// A gateway call exceeded the configured deadline.
    #[error("{operation} timed out after {after:?}")]
    Timeout {
        operation: &'static str,
        after: Duration,
    },

    /// An argument could not be coerced into a store value.
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),

    /// A write was attempted in read-only mode.
    #[error("{0} rejected: read-only mode")]
    ReadOnly(String),

    /// The store rejected or failed the operation.
    #[error("Store operation failed: {0}")]
    Operation(String),
}

impl GatewayError {
    /// Create a connection error.
    pub fn connection(msg: impl Into<String>) -> Self {
        Self::Connection(msg.into())
    }

    /// Create an operation error.
    pub fn operation(msg: impl Into<String>) -> Self {
        Self::Operation(msg.into())
    }
}
