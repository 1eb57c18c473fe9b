//! Tool trait and outcome types for planner-callable tools.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::Result;

/// Schema advertised to the planner for one tool.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolSchema {
    pub name: String,
    pub description: String,
    pub parameters: Value, // JSON Schema object
}

/// Per-invocation context handed to every tool.
///
/// `agent_task_id` correlates approval requests raised mid-run back to the
/// persisted task record, when tracking is active.
#[derive(Debug, Clone, Default)]
pub struct ToolContext {
    pub user_id: String,
    pub agent_task_id: Option<String>,
}

impl ToolContext {
    pub fn new(user_id: impl Into<String>) -> Self {
        Self {
            user_id: user_id.into(),
            agent_task_id: None,
        }
    }

    pub fn with_task_id(mut self, task_id: impl Into<String>) -> Self {
        self.agent_task_id = Some(task_id.into());
        self
    }
}

/// Non-error result of one tool invocation.
///
/// The three shapes are handled distinctly by the task executor: `Completed`
/// feeds the result to the planner, `Unavailable` feeds a soft error the
/// planner can reason around, and `ApprovalRequired` suspends the whole run
/// pending out-of-band confirmation. Hard failures are `Err(ToolError)`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum ToolOutcome {
    Completed {
        result: Value,
    },
    Unavailable {
        provider: String,
        message: String,
    },
    ApprovalRequired {
        approval_id: String,
        preview: Value,
    },
}

impl ToolOutcome {
    /// Successful completion with a result payload.
    pub fn completed(result: Value) -> Self {
        Self::Completed { result }
    }

    /// Known unmet precondition, typically a disconnected integration.
    pub fn unavailable(provider: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Unavailable {
            provider: provider.into(),
            message: message.into(),
        }
    }

    /// Suspend signal: the run must stop and wait for human confirmation.
    pub fn approval_required(approval_id: impl Into<String>, preview: Value) -> Self {
        Self::ApprovalRequired {
            approval_id: approval_id.into(),
            preview,
        }
    }

    pub fn is_completed(&self) -> bool {
        matches!(self, Self::Completed { .. })
    }
}

/// Core trait for planner-callable tools.
#[async_trait]
pub trait Tool: Send + Sync {
    /// Unique tool name (used in planner function calls).
    fn name(&self) -> &str;

    /// Human-readable description consumed by the planner as capability
    /// documentation.
    fn description(&self) -> &str;

    /// JSON Schema for input parameters.
    fn parameters_schema(&self) -> Value;

    /// External providers this tool depends on. Feeds the integration
    /// gate's tool-to-provider map; empty for self-contained tools.
    fn providers(&self) -> Vec<&'static str> {
        Vec::new()
    }

    /// Execute the tool with planner-supplied parameters.
    async fn execute(&self, params: Value, ctx: &ToolContext) -> Result<ToolOutcome>;

    /// Build the complete schema advertised to the planner.
    fn schema(&self) -> ToolSchema {
        ToolSchema {
            name: self.name().to_string(),
            description: self.description().to_string(),
            parameters: self.parameters_schema(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn outcome_serializes_with_status_tag() {
        let outcome = ToolOutcome::unavailable("gmail", "Gmail is not connected");
        let value = serde_json::to_value(&outcome).unwrap();
        assert_eq!(value["status"], "unavailable");
        assert_eq!(value["provider"], "gmail");
    }

    #[test]
    fn approval_outcome_carries_preview() {
        let outcome = ToolOutcome::approval_required("apr-1", json!({"to": "jane@x.com"}));
        match outcome {
            ToolOutcome::ApprovalRequired {
                approval_id,
                preview,
            } => {
                assert_eq!(approval_id, "apr-1");
                assert_eq!(preview["to"], "jane@x.com");
            }
            other => panic!("unexpected outcome: {other:?}"),
        }
    }

    #[test]
    fn context_builder_sets_task_id() {
        let ctx = ToolContext::new("user-1").with_task_id("task-9");
        assert_eq!(ctx.user_id, "user-1");
        assert_eq!(ctx.agent_task_id.as_deref(), Some("task-9"));
    }
}
