//! Cofounder Storage - embedded persistence layer.
//!
//! Uses redb as the embedded database. Records are serialized as JSON into
//! byte tables keyed by string ids. The execution core treats this entire
//! layer as optional: callers hold trait objects and tolerate every failure.
//!
//! # Tables
//!
//! - `agent_tasks` - one row per tracked agent invocation
//! - `integrations` - per-user, per-provider OAuth credentials
//! - `workspace:profiles` / `workspace:contacts` / `workspace:roadmap` -
//!   founder workspace documents used for prompt grounding

pub mod agent_task;
pub mod integration;
pub mod workspace;

use anyhow::Result;
use redb::Database;
use std::sync::Arc;

pub use agent_task::{AgentTask, AgentTaskStorage};
pub use integration::{IntegrationCredential, IntegrationStorage};
pub use workspace::{Contact, RoadmapItem, WorkspaceStorage};

/// Central storage manager that initializes all storage subsystems.
pub struct Storage {
    db: Arc<Database>,
    pub agent_tasks: AgentTaskStorage,
    pub integrations: IntegrationStorage,
    pub workspace: WorkspaceStorage,
}

impl Storage {
    /// Create a new storage instance at the given path.
    ///
    /// Creates the database file if it doesn't exist and initializes all
    /// required tables.
    pub fn new(path: &str) -> Result<Self> {
        let db = Arc::new(Database::create(path)?);

        let agent_tasks = AgentTaskStorage::new(db.clone())?;
        let integrations = IntegrationStorage::new(db.clone())?;
        let workspace = WorkspaceStorage::new(db.clone())?;

        Ok(Self {
            db,
            agent_tasks,
            integrations,
            workspace,
        })
    }

    /// Get a reference to the underlying database.
    pub fn get_db(&self) -> Arc<Database> {
        self.db.clone()
    }
}
