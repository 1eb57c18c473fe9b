//! Deterministic scripted planner for tests.

use std::collections::VecDeque;
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::Mutex;

use crate::error::{AiError, Result};

use super::{CompletionRequest, CompletionResponse, FinishReason, LlmClient, Role, ToolCall};

/// Scripted step for a mock completion.
#[derive(Debug, Clone)]
pub enum MockStep {
    /// Return a plain assistant message.
    Text(String),
    /// Return one or more tool-call requests.
    ToolCalls(Vec<ToolCall>),
    /// Return a planner error.
    Error(String),
}

impl MockStep {
    pub fn text(content: impl Into<String>) -> Self {
        Self::Text(content.into())
    }

    pub fn tool_call(
        id: impl Into<String>,
        name: impl Into<String>,
        arguments: serde_json::Value,
    ) -> Self {
        Self::ToolCalls(vec![ToolCall {
            id: id.into(),
            name: name.into(),
            arguments,
        }])
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self::Error(message.into())
    }
}

/// Mock planner driven by a scripted step queue. With an empty script it
/// echoes the last user message, which keeps loop tests from hanging.
#[derive(Clone, Default)]
pub struct MockLlmClient {
    script: Arc<Mutex<VecDeque<MockStep>>>,
}

impl MockLlmClient {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_steps(steps: Vec<MockStep>) -> Self {
        Self {
            script: Arc::new(Mutex::new(VecDeque::from(steps))),
        }
    }

    pub async fn push_step(&self, step: MockStep) {
        self.script.lock().await.push_back(step);
    }

    fn fallback_response(request: &CompletionRequest) -> CompletionResponse {
        let text = request
            .messages
            .iter()
            .rev()
            .find(|msg| matches!(msg.role, Role::User))
            .map(|msg| format!("mock-echo: {}", msg.content))
            .unwrap_or_else(|| "mock-ok".to_string());

        CompletionResponse {
            content: Some(text),
            tool_calls: Vec::new(),
            finish_reason: FinishReason::Stop,
            usage: None,
        }
    }
}

#[async_trait]
impl LlmClient for MockLlmClient {
    fn provider(&self) -> &str {
        "mock"
    }

    fn model(&self) -> &str {
        "mock-model"
    }

    async fn complete(&self, request: CompletionRequest) -> Result<CompletionResponse> {
        let step = self.script.lock().await.pop_front();
        let Some(step) = step else {
            return Ok(Self::fallback_response(&request));
        };

        match step {
            MockStep::Text(content) => Ok(CompletionResponse {
                content: Some(content),
                tool_calls: Vec::new(),
                finish_reason: FinishReason::Stop,
                usage: None,
            }),
            MockStep::ToolCalls(tool_calls) => Ok(CompletionResponse {
                content: None,
                tool_calls,
                finish_reason: FinishReason::ToolCalls,
                usage: None,
            }),
            MockStep::Error(message) => Err(AiError::Planner {
                status: 500,
                message,
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::llm::Message;

    #[tokio::test]
    async fn scripted_text_is_returned_in_order() {
        let client = MockLlmClient::from_steps(vec![MockStep::text("first")]);

        let response = client
            .complete(CompletionRequest::new(vec![Message::user("ping")]))
            .await
            .unwrap();
        assert_eq!(response.content.as_deref(), Some("first"));

        let fallback = client
            .complete(CompletionRequest::new(vec![Message::user("pong")]))
            .await
            .unwrap();
        assert_eq!(fallback.content.as_deref(), Some("mock-echo: pong"));
    }

    #[tokio::test]
    async fn scripted_tool_call_sets_finish_reason() {
        let client = MockLlmClient::from_steps(vec![MockStep::tool_call(
            "call-1",
            "send_email",
            serde_json::json!({"to": "a@b.com"}),
        )]);

        let response = client
            .complete(CompletionRequest::new(vec![Message::user("email them")]))
            .await
            .unwrap();

        assert_eq!(response.finish_reason, FinishReason::ToolCalls);
        assert_eq!(response.tool_calls[0].name, "send_email");
    }
}
