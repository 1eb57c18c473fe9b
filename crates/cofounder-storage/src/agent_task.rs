//! Agent task storage - one row per tracked agent invocation.

use anyhow::{Result, anyhow};
use async_trait::async_trait;
use redb::{Database, ReadableDatabase, ReadableTable, TableDefinition};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::sync::Arc;

use cofounder_traits::{NewAgentTask, TaskPatch, TaskStatus, TaskStore};

const AGENT_TASK_TABLE: TableDefinition<&str, &[u8]> = TableDefinition::new("agent_tasks");

/// Persisted agent invocation record.
///
/// Lifecycle: inserted Running immediately before the agent executes,
/// patched to Completed/Failed immediately after. Rows are never deleted by
/// the execution core.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AgentTask {
    pub id: String,
    pub user_id: String,
    pub agent_id: String,
    pub agent_name: String,
    pub status: TaskStatus,
    pub input: Value,
    pub output: Option<Value>,
    pub error: Option<String>,
    pub created_at: i64,
    pub started_at: Option<i64>,
    pub completed_at: Option<i64>,
}

/// Agent task storage backed by redb.
#[derive(Clone)]
pub struct AgentTaskStorage {
    db: Arc<Database>,
}

impl AgentTaskStorage {
    pub fn new(db: Arc<Database>) -> Result<Self> {
        let write_txn = db.begin_write()?;
        write_txn.open_table(AGENT_TASK_TABLE)?;
        write_txn.commit()?;

        Ok(Self { db })
    }

    /// Insert a new task row with a server-generated id.
    pub fn insert(&self, task: NewAgentTask) -> Result<String> {
        let now = chrono::Utc::now().timestamp_millis();
        let record = AgentTask {
            id: uuid::Uuid::new_v4().to_string(),
            user_id: task.user_id,
            agent_id: task.agent_id,
            agent_name: task.agent_name,
            status: task.status,
            input: task.input,
            output: None,
            error: None,
            created_at: now,
            started_at: Some(now),
            completed_at: None,
        };

        let write_txn = self.db.begin_write()?;
        {
            let mut table = write_txn.open_table(AGENT_TASK_TABLE)?;
            let serialized = serde_json::to_vec(&record)?;
            table.insert(record.id.as_str(), serialized.as_slice())?;
        }
        write_txn.commit()?;
        Ok(record.id)
    }

    /// Apply a terminal patch to an existing task row.
    pub fn update(&self, id: &str, patch: TaskPatch) -> Result<()> {
        let write_txn = self.db.begin_write()?;
        {
            let mut table = write_txn.open_table(AGENT_TASK_TABLE)?;

            let mut record = match table.get(id)? {
                Some(existing) => serde_json::from_slice::<AgentTask>(existing.value())?,
                None => return Err(anyhow!("Agent task not found: {id}")),
            };

            record.status = patch.status;
            record.output = patch.output;
            record.error = patch.error;
            record.completed_at = Some(chrono::Utc::now().timestamp_millis());

            let serialized = serde_json::to_vec(&record)?;
            table.insert(id, serialized.as_slice())?;
        }
        write_txn.commit()?;
        Ok(())
    }

    /// Get a task by id.
    pub fn get(&self, id: &str) -> Result<Option<AgentTask>> {
        let read_txn = self.db.begin_read()?;
        let table = read_txn.open_table(AGENT_TASK_TABLE)?;

        if let Some(data) = table.get(id)? {
            Ok(Some(serde_json::from_slice(data.value())?))
        } else {
            Ok(None)
        }
    }

    /// List all tasks for a user, most recent first.
    pub fn list_for_user(&self, user_id: &str) -> Result<Vec<AgentTask>> {
        let read_txn = self.db.begin_read()?;
        let table = read_txn.open_table(AGENT_TASK_TABLE)?;

        let mut tasks = Vec::new();
        for item in table.iter()? {
            let (_, value) = item?;
            let task: AgentTask = serde_json::from_slice(value.value())?;
            if task.user_id == user_id {
                tasks.push(task);
            }
        }
        tasks.sort_by(|a, b| b.created_at.cmp(&a.created_at));

        Ok(tasks)
    }
}

#[async_trait]
impl TaskStore for AgentTaskStorage {
    async fn insert_task(&self, task: NewAgentTask) -> Result<String> {
        self.insert(task)
    }

    async fn update_task(&self, id: &str, patch: TaskPatch) -> Result<()> {
        self.update(id, patch)
    }
}
