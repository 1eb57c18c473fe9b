//! Workspace document storage - founder profile, contacts, and roadmap.
//!
//! These documents ground the task executor's system prompt. The CRM and
//! roadmap pages maintain them; the execution core only reads.

use anyhow::Result;
use redb::{Database, ReadableDatabase, ReadableTable, TableDefinition};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::sync::Arc;

const PROFILE_TABLE: TableDefinition<&str, &[u8]> = TableDefinition::new("workspace:profiles");
const CONTACT_TABLE: TableDefinition<&str, &[u8]> = TableDefinition::new("workspace:contacts");
const ROADMAP_TABLE: TableDefinition<&str, &[u8]> = TableDefinition::new("workspace:roadmap");

/// A CRM contact.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Contact {
    pub id: String,
    pub name: String,
    pub email: Option<String>,
    pub company: Option<String>,
    pub notes: Option<String>,
    pub created_at: i64,
}

/// A product roadmap item.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RoadmapItem {
    pub id: String,
    pub title: String,
    pub status: String,
    pub notes: Option<String>,
    pub created_at: i64,
}

/// Workspace document storage.
#[derive(Clone)]
pub struct WorkspaceStorage {
    db: Arc<Database>,
}

impl WorkspaceStorage {
    pub fn new(db: Arc<Database>) -> Result<Self> {
        let write_txn = db.begin_write()?;
        write_txn.open_table(PROFILE_TABLE)?;
        write_txn.open_table(CONTACT_TABLE)?;
        write_txn.open_table(ROADMAP_TABLE)?;
        write_txn.commit()?;

        Ok(Self { db })
    }

    /// Store or replace the founder profile document for a user.
    pub fn set_profile(&self, user_id: &str, profile: &Value) -> Result<()> {
        let write_txn = self.db.begin_write()?;
        {
            let mut table = write_txn.open_table(PROFILE_TABLE)?;
            let serialized = serde_json::to_vec(profile)?;
            table.insert(user_id, serialized.as_slice())?;
        }
        write_txn.commit()?;
        Ok(())
    }

    /// Get the founder profile document for a user.
    pub fn get_profile(&self, user_id: &str) -> Result<Option<Value>> {
        let read_txn = self.db.begin_read()?;
        let table = read_txn.open_table(PROFILE_TABLE)?;

        if let Some(data) = table.get(user_id)? {
            Ok(Some(serde_json::from_slice(data.value())?))
        } else {
            Ok(None)
        }
    }

    /// Add a contact with a generated id.
    pub fn add_contact(
        &self,
        user_id: &str,
        name: &str,
        email: Option<String>,
        company: Option<String>,
    ) -> Result<String> {
        let contact = Contact {
            id: uuid::Uuid::new_v4().to_string(),
            name: name.to_string(),
            email,
            company,
            notes: None,
            created_at: chrono::Utc::now().timestamp_millis(),
        };

        let write_txn = self.db.begin_write()?;
        {
            let mut table = write_txn.open_table(CONTACT_TABLE)?;
            let key = format!("{}:{}", user_id, contact.id);
            let serialized = serde_json::to_vec(&contact)?;
            table.insert(key.as_str(), serialized.as_slice())?;
        }
        write_txn.commit()?;
        Ok(contact.id)
    }

    /// List all contacts for a user.
    pub fn list_contacts(&self, user_id: &str) -> Result<Vec<Contact>> {
        let read_txn = self.db.begin_read()?;
        let table = read_txn.open_table(CONTACT_TABLE)?;

        let prefix = format!("{}:", user_id);
        let mut contacts = Vec::new();

        for item in table.iter()? {
            let (key, value) = item?;
            if key.value().starts_with(&prefix) {
                contacts.push(serde_json::from_slice(value.value())?);
            }
        }

        Ok(contacts)
    }

    /// Add a roadmap item with a generated id.
    pub fn add_roadmap_item(&self, user_id: &str, title: &str, status: &str) -> Result<String> {
        let item = RoadmapItem {
            id: uuid::Uuid::new_v4().to_string(),
            title: title.to_string(),
            status: status.to_string(),
            notes: None,
            created_at: chrono::Utc::now().timestamp_millis(),
        };

        let write_txn = self.db.begin_write()?;
        {
            let mut table = write_txn.open_table(ROADMAP_TABLE)?;
            let key = format!("{}:{}", user_id, item.id);
            let serialized = serde_json::to_vec(&item)?;
            table.insert(key.as_str(), serialized.as_slice())?;
        }
        write_txn.commit()?;
        Ok(item.id)
    }

    /// List all roadmap items for a user.
    pub fn list_roadmap(&self, user_id: &str) -> Result<Vec<RoadmapItem>> {
        let read_txn = self.db.begin_read()?;
        let table = read_txn.open_table(ROADMAP_TABLE)?;

        let prefix = format!("{}:", user_id);
        let mut items = Vec::new();

        for item in table.iter()? {
            let (key, value) = item?;
            if key.value().starts_with(&prefix) {
                items.push(serde_json::from_slice(value.value())?);
            }
        }

        Ok(items)
    }
}
