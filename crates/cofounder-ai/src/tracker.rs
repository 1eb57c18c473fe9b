//! Execution tracker - wraps a single agent invocation.
//!
//! Tracking is strictly optional: the persistence sink may be absent or
//! broken, and the invocation proceeds untracked either way. The tracker
//! itself never returns an error; every failure mode is encoded in the
//! returned envelope.

use std::sync::Arc;
use std::time::Instant;

use serde::{Deserialize, Serialize};
use serde_json::{Value, json};
use tracing::{debug, warn};

use cofounder_traits::{AgentRegistry, NewAgentTask, TaskPatch, TaskStore};

/// Uniform result envelope for one agent invocation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AgentRunResult {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tokens_used: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub task_id: Option<String>,
}

impl AgentRunResult {
    fn failure(error: impl Into<String>) -> Self {
        Self {
            success: false,
            data: None,
            error: Some(error.into()),
            tokens_used: None,
            task_id: None,
        }
    }
}

/// Looks up agents, persists task records best-effort, and invokes.
pub struct ExecutionTracker {
    agents: Arc<AgentRegistry>,
    store: Option<Arc<dyn TaskStore>>,
}

impl ExecutionTracker {
    pub fn new(agents: Arc<AgentRegistry>) -> Self {
        Self {
            agents,
            store: None,
        }
    }

    /// Attach the optional persistence sink.
    pub fn with_store(mut self, store: Arc<dyn TaskStore>) -> Self {
        self.store = Some(store);
        self
    }

    /// Execute one agent invocation end to end.
    pub async fn execute_agent(
        &self,
        agent_id: &str,
        input: Value,
        user_id: &str,
    ) -> AgentRunResult {
        let Some(agent) = self.agents.get(agent_id) else {
            return AgentRunResult::failure(format!("Agent not found: {agent_id}"));
        };

        // Best-effort task row. A missing or broken table must never block
        // execution.
        let task_id = match &self.store {
            Some(store) => {
                let row = NewAgentTask::running(user_id, agent.id(), agent.name(), input.clone());
                match store.insert_task(row).await {
                    Ok(id) => Some(id),
                    Err(error) => {
                        warn!(
                            agent_id,
                            error = %error,
                            "Task tracking unavailable, continuing untracked"
                        );
                        None
                    }
                }
            }
            None => None,
        };

        // Correlate tool-level approval requests with the task record.
        let mut input = input;
        if agent.accepts_task_context()
            && let Some(id) = &task_id
            && let Some(object) = input.as_object_mut()
        {
            object.insert("agent_task_id".to_string(), json!(id));
        }

        let started = Instant::now();
        let result = agent.execute(input, user_id).await;
        let duration_ms = started.elapsed().as_millis() as u64;
        debug!(agent_id, duration_ms, success = result.is_ok(), "Agent invocation finished");

        match result {
            Ok(output) => {
                self.finish_task(&task_id, TaskPatch::completed(output.data.clone()))
                    .await;
                AgentRunResult {
                    success: true,
                    data: Some(output.data),
                    error: None,
                    tokens_used: output.tokens_used,
                    task_id,
                }
            }
            Err(error) => {
                let message = error.to_string();
                self.finish_task(&task_id, TaskPatch::failed(message.clone()))
                    .await;
                AgentRunResult {
                    success: false,
                    data: None,
                    error: Some(message),
                    tokens_used: None,
                    task_id,
                }
            }
        }
    }

    async fn finish_task(&self, task_id: &Option<String>, patch: TaskPatch) {
        let (Some(store), Some(id)) = (&self.store, task_id) else {
            return;
        };
        if let Err(error) = store.update_task(id, patch).await {
            warn!(task_id = %id, error = %error, "Failed to record task outcome");
        }
    }
}
