//! Cofounder AI - the agent execution core.
//!
//! This crate provides:
//! - Planner client abstraction (OpenAI-compatible HTTP client plus a
//!   scripted mock)
//! - The autonomous task executor: a bounded plan/act loop with
//!   partial-failure tolerance and approval interruption
//! - The execution tracker wrapping agent invocations with best-effort
//!   task persistence
//! - User context assembly for prompt grounding

pub mod context;
pub mod error;
pub mod executor;
pub mod llm;
pub mod tracker;

// Re-export commonly used types
pub use context::{ContextSource, StorageContextSource, UserContext};
pub use error::{AiError, Result};
pub use executor::{
    ActionRecord, ApprovalHandoff, DEFAULT_MAX_ITERATIONS, TASK_EXECUTOR_AGENT_ID, TaskExecutor,
    TaskExecutorAgent, TaskReport, TaskRunConfig, TaskRunOutcome,
};
pub use llm::{
    CompletionRequest, CompletionResponse, FinishReason, LlmClient, Message, MockLlmClient,
    MockStep, OpenAIClient, RetryConfig, Role, TokenUsage, ToolCall,
};
pub use tracker::{AgentRunResult, ExecutionTracker};
