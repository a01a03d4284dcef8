//! Error types and handling
//!
//! The matrix operations themselves are total. The errors below cover the
//! places where input can be rejected: building a resource forest from a
//! flat list, validating keys and codes, and loading configuration or
//! session files.

use serde::Serialize;
use thiserror::Error;
use tracing::error;

/// Matrix engine error types
#[derive(Debug, Error)]
pub enum MatrixError {
    /// A `parent_id` chain loops back on itself
    #[error("Parent cycle detected at resource '{resource_key}'")]
    ParentCycle { resource_key: String },

    /// Two resource nodes share the same id
    #[error("Duplicate resource id: {id}")]
    DuplicateResourceId { id: String },

    /// Resource key does not match the dotted key format
    #[error("Invalid resource key: {0}")]
    InvalidResourceKey(String),

    /// Permission code does not match the code format
    #[error("Invalid permission code: {0}")]
    InvalidPermissionCode(String),

    /// An edit names a resource that is not in the resource tree
    #[error("Unknown resource: {0}")]
    UnknownResource(String),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// File could not be read
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Input document could not be parsed
    #[error("Parse error: {0}")]
    Parse(String),
}

impl MatrixError {
    /// Stable identifier for programmatic handling
    pub fn error_type(&self) -> &'static str {
        match self {
            MatrixError::ParentCycle { .. } => "parent_cycle",
            MatrixError::DuplicateResourceId { .. } => "duplicate_resource_id",
            MatrixError::InvalidResourceKey(_) => "invalid_resource_key",
            MatrixError::InvalidPermissionCode(_) => "invalid_permission_code",
            MatrixError::UnknownResource(_) => "unknown_resource",
            MatrixError::Config(_) => "config_error",
            MatrixError::Io(_) => "io_error",
            MatrixError::Parse(_) => "parse_error",
        }
    }

    /// Render the error as a response body, logging structural failures
    pub fn to_response(&self) -> ErrorResponse {
        let error_type = self.error_type();
        if matches!(
            self,
            MatrixError::ParentCycle { .. } | MatrixError::DuplicateResourceId { .. }
        ) {
            error!(error = %self, error_type = error_type, "Resource tree rejected");
        }
        ErrorResponse::new(error_type, self.to_string())
    }
}

/// Error response body
#[derive(Serialize, Debug)]
pub struct ErrorResponse {
    /// Error type identifier
    pub error: String,
    /// Human-readable error message
    pub message: String,
    /// Additional error details (optional)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<serde_json::Value>,
}

impl ErrorResponse {
    /// Create a new error response
    pub fn new(error: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            error: error.into(),
            message: message.into(),
            details: None,
        }
    }

    /// Add details to the error response
    pub fn with_details(mut self, details: serde_json::Value) -> Self {
        self.details = Some(details);
        self
    }
}

impl From<serde_json::Error> for MatrixError {
    fn from(err: serde_json::Error) -> Self {
        MatrixError::Parse(format!("JSON parsing error: {}", err))
    }
}

impl From<serde_norway::Error> for MatrixError {
    fn from(err: serde_norway::Error) -> Self {
        MatrixError::Parse(format!("YAML parsing error: {}", err))
    }
}

/// Result type alias for fallible matrix operations
pub type MatrixResult<T> = Result<T, MatrixError>;
