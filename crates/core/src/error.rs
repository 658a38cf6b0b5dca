//! Core Error Types
//!
//! Defines the foundational error taxonomy used across the Draftbench
//! workspace. These error types are dependency-free (only thiserror + std)
//! to keep the core crate lightweight.
//!
//! The taxonomy mirrors what the tool layer surfaces to the model: path
//! violations, missing files, revoked local-directory grants, unreachable
//! backends, and bad provider/model configuration.

use thiserror::Error;

/// Core error type for the Draftbench workspace.
#[derive(Error, Debug)]
pub enum CoreError {
    /// Path escapes the workspace root or is otherwise malformed
    #[error("Invalid path: {0}")]
    InvalidPath(String),

    /// Not found errors
    #[error("Not found: {0}")]
    NotFound(String),

    /// Local directory grant is missing or was revoked
    #[error("Permission denied: {0}")]
    PermissionDenied(String),

    /// Remote storage backend is misconfigured or unreachable
    #[error("Backend unavailable: {0}")]
    BackendUnavailable(String),

    /// Unknown (provider, model) pair
    #[error("Invalid model: {0}")]
    InvalidModel(String),

    /// Configuration errors (missing credentials, bad settings)
    #[error("Configuration error: {0}")]
    Config(String),

    /// Caught exception inside a tool handler
    #[error("Tool execution error: {0}")]
    ToolExecution(String),

    /// Model-provider transport failure mid-turn
    #[error("Stream error: {0}")]
    Stream(String),

    /// File I/O errors
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization/deserialization errors
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Generic internal errors
    #[error("Internal error: {0}")]
    Internal(String),
}

/// Result type alias for core errors
pub type CoreResult<T> = Result<T, CoreError>;

impl CoreError {
    /// Create an invalid path error
    pub fn invalid_path(msg: impl Into<String>) -> Self {
        Self::InvalidPath(msg.into())
    }

    /// Create a not found error
    pub fn not_found(msg: impl Into<String>) -> Self {
        Self::NotFound(msg.into())
    }

    /// Create a permission denied error
    pub fn permission_denied(msg: impl Into<String>) -> Self {
        Self::PermissionDenied(msg.into())
    }

    /// Create a backend unavailable error
    pub fn backend_unavailable(msg: impl Into<String>) -> Self {
        Self::BackendUnavailable(msg.into())
    }

    /// Create an invalid model error
    pub fn invalid_model(msg: impl Into<String>) -> Self {
        Self::InvalidModel(msg.into())
    }

    /// Create a config error
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    /// Create a tool execution error
    pub fn tool_execution(msg: impl Into<String>) -> Self {
        Self::ToolExecution(msg.into())
    }

    /// Create a stream error
    pub fn stream(msg: impl Into<String>) -> Self {
        Self::Stream(msg.into())
    }

    /// Create an internal error
    pub fn internal(msg: impl Into<String>) -> Self {
        Self::Internal(msg.into())
    }

    /// Whether this error is recoverable at the tool boundary.
    ///
    /// Recoverable errors become `ToolOutcome::Failure` and the conversation
    /// continues; the rest short-circuit the turn before streaming starts.
    pub fn is_tool_recoverable(&self) -> bool {
        matches!(
            self,
            CoreError::InvalidPath(_)
                | CoreError::NotFound(_)
                | CoreError::PermissionDenied(_)
                | CoreError::BackendUnavailable(_)
                | CoreError::ToolExecution(_)
                | CoreError::Io(_)
        )
    }
}

/// Convert CoreError to a string
impl From<CoreError> for String {
    fn from(err: CoreError) -> String {
        err.to_string()
    }
}
