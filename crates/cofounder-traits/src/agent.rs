//! Agent trait - the contract every registered unit of work implements.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::AgentError;

/// Successful agent output. Failure is the `Err` side of the contract.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AgentOutput {
    pub data: Value,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tokens_used: Option<u32>,
}

impl AgentOutput {
    pub fn new(data: Value) -> Self {
        Self {
            data,
            tokens_used: None,
        }
    }

    pub fn with_tokens(mut self, tokens: u32) -> Self {
        self.tokens_used = Some(tokens);
        self
    }
}

/// A registered unit of AI-driven work.
///
/// Agents are registered once at startup and are immutable thereafter; the
/// registry owns them for the process lifetime.
#[async_trait]
pub trait Agent: Send + Sync {
    /// Unique agent id (registry key).
    fn id(&self) -> &str;

    /// Display name.
    fn name(&self) -> &str;

    /// What the agent does, shown in catalog listings.
    fn description(&self) -> &str;

    /// Grouping category for catalog filtering.
    fn category(&self) -> &str;

    /// Cosmetic icon identifier.
    fn icon(&self) -> &str {
        ""
    }

    /// Whether the tracker should inject the persisted task id into the
    /// input so the agent can correlate tool-level approval requests back
    /// to the task record.
    fn accepts_task_context(&self) -> bool {
        false
    }

    /// Run the agent against an opaque JSON input for one user.
    async fn execute(&self, input: Value, user_id: &str) -> Result<AgentOutput, AgentError>;
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    struct NoopAgent;

    #[async_trait]
    impl Agent for NoopAgent {
        fn id(&self) -> &str {
            "noop"
        }

        fn name(&self) -> &str {
            "Noop"
        }

        fn description(&self) -> &str {
            "Does nothing"
        }

        fn category(&self) -> &str {
            "utility"
        }

        async fn execute(&self, input: Value, _user_id: &str) -> Result<AgentOutput, AgentError> {
            Ok(AgentOutput::new(input))
        }
    }

    #[tokio::test]
    async fn agent_echoes_input() {
        let agent = NoopAgent;
        let output = agent.execute(json!({"k": 1}), "user-1").await.unwrap();
        assert_eq!(output.data["k"], 1);
        assert!(output.tokens_used.is_none());
        assert!(!agent.accepts_task_context());
    }
}
