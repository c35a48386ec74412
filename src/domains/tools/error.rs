//! Tool-specific error types.

use thiserror::Error;

use super::schema::ValidationError;
use crate::domains::gateway::GatewayError;

/// Errors that can occur during tool registration or execution.
#[derive(Debug, Error)]
pub enum ToolError {
    /// The requested tool was not found.
    #[error("Unknown tool: {0}")]
    NotFound(String),

    /// A tool with this name is already registered.
    #[error("Tool already registered: {0}")]
    AlreadyRegistered(String),

    /// Invalid arguments were provided to the tool.
    #[error("Invalid arguments: {0}")]
    InvalidArguments(String),

    /// The document store could not be reached.
    #[error("Connection error: {0}")]
    Connection(String),

    /// A document store call exceeded its deadline.
    #[error("Operation timed out: {0}")]
    Timeout(String),

    /// A write was attempted while the server runs read-only.
    #[error("Server is running in read-only mode; {0} is not allowed")]
    ReadOnly(String),

    /// The tool execution failed.
    #[error("Execution failed: {0}")]
    ExecutionFailed(String),

    /// An internal error occurred.
    #[error("Internal error: {0}")]
    Internal(String),
}

impl ToolError {
    /// Create a new "not found" error.
    pub fn not_found(name: impl Into<String>) -> Self {
        Self::NotFound(name.into())
    }

    /// Create a new "invalid arguments" error.
    pub fn invalid_arguments(msg: impl Into<String>) -> Self {
        Self::InvalidArguments(msg.into())
    }

    /// Create a new "execution failed" error.
    pub fn execution_failed(msg: impl Into<String>) -> Self {
        Self::ExecutionFailed(msg.into())
    }

    /// Create a new "internal" error.
    pub fn internal(msg: impl Into<String>) -> Self {
        Self::Internal(msg.into())
    }
}

impl From<ValidationError> for ToolError {
    fn from(err: ValidationError) -> Self {
        Self::InvalidArguments(err.to_string())
    }
}

impl From<GatewayError> for ToolError {
    fn from(err: GatewayError) -> Self {
        match err {
            GatewayError::Connection(msg) => Self::Connection(msg),
            GatewayError::Timeout { operation, after } => {
                Self::Timeout(format!("{} after {:?}", operation, after))
            }
            GatewayError::Validation(err) => Self::InvalidArguments(err.to_string()),
            GatewayError::ReadOnly(operation) => Self::ReadOnly(operation),
            GatewayError::Operation(msg) => Self::ExecutionFailed(msg),
        }
    }
}
