//! Error types for the execution core.
//!
//! Planner-call failures carry distinct, user-actionable messages: the text
//! is surfaced to end users through the run's failure envelope, so each
//! rejection class keeps its own variant instead of collapsing into a
//! generic "LLM error".

use thiserror::Error;

/// Execution core error types.
#[derive(Error, Debug)]
pub enum AiError {
    #[error(
        "The AI service quota is exhausted. Check the plan and billing details for the configured account."
    )]
    PlannerQuotaExceeded,

    #[error("The AI service is rate limiting requests. Try again in a few seconds.")]
    PlannerRateLimited { retry_after_secs: Option<u64> },

    #[error("The AI service rejected the configured API key. Update the credential and retry.")]
    PlannerInvalidCredential,

    #[error("The configured model \"{0}\" does not exist or is not available to this account.")]
    PlannerUnknownModel(String),

    #[error("AI service error ({status}): {message}")]
    Planner { status: u16, message: String },

    #[error("Tool error: {0}")]
    Tool(String),

    #[error("Agent error: {0}")]
    Agent(String),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl AiError {
    /// Whether a retry with backoff could succeed.
    pub fn is_retryable(&self) -> bool {
        match self {
            Self::PlannerRateLimited { .. } => true,
            Self::Planner { status, .. } => (500..=599).contains(status),
            _ => false,
        }
    }
}

/// Result type alias for execution core operations.
pub type Result<T> = std::result::Result<T, AiError>;
