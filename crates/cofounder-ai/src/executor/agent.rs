//! The task executor exposed as a registered agent.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use serde::Deserialize;
use serde_json::Value;

use cofounder_traits::{Agent, AgentError, AgentOutput};

use super::{TaskExecutor, TaskRunConfig};

pub const TASK_EXECUTOR_AGENT_ID: &str = "task_executor";

#[derive(Debug, Deserialize)]
struct TaskInput {
    task: String,
    max_iterations: Option<usize>,
    deadline_secs: Option<u64>,
    /// Injected by the execution tracker when a task row was created.
    agent_task_id: Option<String>,
}

/// Agent wrapper around [`TaskExecutor`].
pub struct TaskExecutorAgent {
    executor: Arc<TaskExecutor>,
}

impl TaskExecutorAgent {
    pub fn new(executor: Arc<TaskExecutor>) -> Self {
        Self { executor }
    }
}

#[async_trait]
impl Agent for TaskExecutorAgent {
    fn id(&self) -> &str {
        TASK_EXECUTOR_AGENT_ID
    }

    fn name(&self) -> &str {
        "Autonomous Task Executor"
    }

    fn description(&self) -> &str {
        "Executes a free-form task by planning and calling integration tools until it is done."
    }

    fn category(&self) -> &str {
        "productivity"
    }

    fn icon(&self) -> &str {
        "sparkles"
    }

    fn accepts_task_context(&self) -> bool {
        true
    }

    async fn execute(&self, input: Value, user_id: &str) -> Result<AgentOutput, AgentError> {
        let input: TaskInput = serde_json::from_value(input)
            .map_err(|e| AgentError::InvalidInput(e.to_string()))?;

        let mut config = TaskRunConfig::new(input.task, user_id);
        if let Some(max) = input.max_iterations {
            config = config.with_max_iterations(max);
        }
        if let Some(secs) = input.deadline_secs {
            config = config.with_deadline(Duration::from_secs(secs));
        }
        if let Some(task_id) = input.agent_task_id {
            config = config.with_task_id(task_id);
        }

        // Planner failures keep their classified, user-actionable message.
        let outcome = self
            .executor
            .run(config)
            .await
            .map_err(|e| AgentError::Execution(e.to_string()))?;

        let data = serde_json::to_value(&outcome)
            .map_err(|e| AgentError::Execution(e.to_string()))?;
        Ok(AgentOutput::new(data))
    }
}
