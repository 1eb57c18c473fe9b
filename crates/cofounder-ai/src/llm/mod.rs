//! Planner abstraction - the completion service that drives the plan/act loop.

mod client;
mod mock;
mod openai;
mod retry;

pub use client::{
    CompletionRequest, CompletionResponse, FinishReason, LlmClient, Message, Role, TokenUsage,
    ToolCall,
};
pub use mock::{MockLlmClient, MockStep};
pub use openai::OpenAIClient;
pub use retry::RetryConfig;
