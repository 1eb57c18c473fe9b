//! Error types shared across the execution core.

use thiserror::Error;

/// Hard tool failures. Expected unmet preconditions (a disconnected
/// integration, a pending approval) are not errors; they are carried by
/// [`crate::tool::ToolOutcome`].
#[derive(Error, Debug)]
pub enum ToolError {
    #[error("Tool not found: {0}")]
    NotFound(String),

    #[error("Invalid tool parameters: {0}")]
    InvalidParams(String),

    #[error("{provider} API error ({status}): {message}")]
    Api {
        provider: String,
        status: u16,
        message: String,
    },

    #[error("HTTP error: {0}")]
    Http(String),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Agent-level failures, surfaced by the execution tracker as the failure
/// envelope. Message text is user-facing and must stay specific.
#[derive(Error, Debug)]
pub enum AgentError {
    #[error("Agent not found: {0}")]
    NotFound(String),

    #[error("Invalid agent input: {0}")]
    InvalidInput(String),

    #[error("{0}")]
    Execution(String),
}

/// Result type alias for tool operations.
pub type Result<T> = std::result::Result<T, ToolError>;
