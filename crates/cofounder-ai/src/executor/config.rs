use std::time::Duration;

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Default planner-call ceiling for one run.
pub const DEFAULT_MAX_ITERATIONS: usize = 15;

/// Configuration for one task executor run.
#[derive(Debug, Clone)]
pub struct TaskRunConfig {
    /// Free-form task description from the user.
    pub task: String,
    pub user_id: String,
    /// Persisted task id, when the tracker obtained one. Forwarded to tools
    /// so approval requests can be correlated with the task record.
    pub agent_task_id: Option<String>,
    /// Hard ceiling on planner calls. The structural safety valve of the
    /// loop; never disabled.
    pub max_iterations: usize,
    /// Optional wall-clock budget applied to every planner and tool call.
    pub deadline: Option<Duration>,
    pub temperature: Option<f32>,
}

impl TaskRunConfig {
    pub fn new(task: impl Into<String>, user_id: impl Into<String>) -> Self {
        Self {
            task: task.into(),
            user_id: user_id.into(),
            agent_task_id: None,
            max_iterations: DEFAULT_MAX_ITERATIONS,
            deadline: None,
            temperature: None,
        }
    }

    pub fn with_task_id(mut self, task_id: impl Into<String>) -> Self {
        self.agent_task_id = Some(task_id.into());
        self
    }

    pub fn with_max_iterations(mut self, max: usize) -> Self {
        self.max_iterations = max;
        self
    }

    pub fn with_deadline(mut self, deadline: Duration) -> Self {
        self.deadline = Some(deadline);
        self
    }

    pub fn with_temperature(mut self, temp: f32) -> Self {
        self.temperature = Some(temp);
        self
    }
}

/// One successful tool invocation, in invocation order.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ActionRecord {
    pub tool: String,
    pub result: Value,
}

/// Audit trail of a run that reached a normal or soft-stop end.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TaskReport {
    /// Final assistant text (or the last assistant text on a soft stop).
    pub result: String,
    /// Number of plan/act iterations that executed tools.
    pub steps: usize,
    /// Deduplicated ids of tools that succeeded at least once.
    pub tools_used: Vec<String>,
    pub actions: Vec<ActionRecord>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub required_integrations: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub missing_integrations: Option<Vec<String>>,
}

/// A run suspended by a tool's approval request.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApprovalHandoff {
    pub approval_id: String,
    /// Human-readable preview of the action awaiting confirmation.
    pub preview: Value,
    pub steps: usize,
    pub tools_used: Vec<String>,
    pub actions: Vec<ActionRecord>,
}

/// Terminal outcome of one run.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum TaskRunOutcome {
    Completed(TaskReport),
    NeedsApproval(ApprovalHandoff),
}
