//! Task persistence contract.
//!
//! The backing store is an optional collaborator: every failure it reports
//! is non-fatal to the execution core, which logs and continues untracked.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Lifecycle status of one agent invocation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TaskStatus {
    Pending,
    Running,
    Completed,
    Failed,
}

/// Row inserted when an invocation begins. The store generates the id.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewAgentTask {
    pub user_id: String,
    pub agent_id: String,
    pub agent_name: String,
    pub status: TaskStatus,
    pub input: Value,
}

impl NewAgentTask {
    /// A task record entering execution.
    pub fn running(
        user_id: impl Into<String>,
        agent_id: impl Into<String>,
        agent_name: impl Into<String>,
        input: Value,
    ) -> Self {
        Self {
            user_id: user_id.into(),
            agent_id: agent_id.into(),
            agent_name: agent_name.into(),
            status: TaskStatus::Running,
            input,
        }
    }
}

/// Terminal patch applied when the invocation finishes.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TaskPatch {
    pub status: TaskStatus,
    pub output: Option<Value>,
    pub error: Option<String>,
}

impl TaskPatch {
    pub fn completed(output: Value) -> Self {
        Self {
            status: TaskStatus::Completed,
            output: Some(output),
            error: None,
        }
    }

    pub fn failed(error: impl Into<String>) -> Self {
        Self {
            status: TaskStatus::Failed,
            output: None,
            error: Some(error.into()),
        }
    }
}

/// Optional persistence sink for agent tasks.
#[async_trait]
pub trait TaskStore: Send + Sync {
    /// Insert a task row, returning the server-generated id.
    async fn insert_task(&self, task: NewAgentTask) -> anyhow::Result<String>;

    /// Apply a terminal patch to an existing task row.
    async fn update_task(&self, id: &str, patch: TaskPatch) -> anyhow::Result<()>;
}
