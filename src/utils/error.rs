//! Application Errors
//!
//! Top-level error type wrapping the workspace crates' errors.

use thiserror::Error;

use draftbench_core::CoreError;
use draftbench_llm::LlmError;

/// Errors surfaced by the service layer.
#[derive(Debug, Error)]
pub enum AppError {
    #[error(transparent)]
    Core(#[from] CoreError),

    #[error(transparent)]
    Llm(#[from] LlmError),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Turn already in progress")]
    TurnInProgress,

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl AppError {
    pub fn config(msg: impl Into<String>) -> Self {
        AppError::Config(msg.into())
    }
}

impl From<AppError> for String {
    fn from(e: AppError) -> Self {
        e.to_string()
    }
}

pub type AppResult<T> = Result<T, AppError>;
