//! Integration credential storage - per-user, per-provider OAuth tokens.
//!
//! The execution core only reads this table: a provider counts as
//! "connected" for a user iff a credential row resolves. Connecting and
//! token refresh happen in the OAuth callback layer outside this workspace.

use anyhow::Result;
use redb::{Database, ReadableDatabase, ReadableTable, TableDefinition};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::warn;

use cofounder_traits::CredentialResolver;

const INTEGRATION_TABLE: TableDefinition<&str, &[u8]> = TableDefinition::new("integrations");

/// A stored integration credential.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IntegrationCredential {
    pub user_id: String,
    pub provider: String,
    pub access_token: String,
    pub refresh_token: Option<String>,
    pub expires_at: Option<i64>,
    pub connected_at: i64,
}

/// Credential storage keyed by `user_id:provider`.
#[derive(Clone)]
pub struct IntegrationStorage {
    db: Arc<Database>,
}

impl IntegrationStorage {
    pub fn new(db: Arc<Database>) -> Result<Self> {
        let write_txn = db.begin_write()?;
        write_txn.open_table(INTEGRATION_TABLE)?;
        write_txn.commit()?;

        Ok(Self { db })
    }

    fn key(user_id: &str, provider: &str) -> String {
        format!("{}:{}", user_id, provider)
    }

    /// Store or replace a credential for (user, provider).
    pub fn connect(
        &self,
        user_id: &str,
        provider: &str,
        access_token: &str,
        refresh_token: Option<String>,
    ) -> Result<()> {
        let credential = IntegrationCredential {
            user_id: user_id.to_string(),
            provider: provider.to_string(),
            access_token: access_token.to_string(),
            refresh_token,
            expires_at: None,
            connected_at: chrono::Utc::now().timestamp_millis(),
        };

        let write_txn = self.db.begin_write()?;
        {
            let mut table = write_txn.open_table(INTEGRATION_TABLE)?;
            let serialized = serde_json::to_vec(&credential)?;
            table.insert(
                Self::key(user_id, provider).as_str(),
                serialized.as_slice(),
            )?;
        }
        write_txn.commit()?;
        Ok(())
    }

    /// Get the credential for (user, provider).
    pub fn get(&self, user_id: &str, provider: &str) -> Result<Option<IntegrationCredential>> {
        let read_txn = self.db.begin_read()?;
        let table = read_txn.open_table(INTEGRATION_TABLE)?;

        if let Some(data) = table.get(Self::key(user_id, provider).as_str())? {
            Ok(Some(serde_json::from_slice(data.value())?))
        } else {
            Ok(None)
        }
    }

    /// Whether a credential exists for (user, provider).
    pub fn is_connected(&self, user_id: &str, provider: &str) -> Result<bool> {
        Ok(self.get(user_id, provider)?.is_some())
    }

    /// Access token for (user, provider), if connected.
    pub fn access_token(&self, user_id: &str, provider: &str) -> Result<Option<String>> {
        Ok(self.get(user_id, provider)?.map(|c| c.access_token))
    }

    /// Remove the credential for (user, provider).
    pub fn disconnect(&self, user_id: &str, provider: &str) -> Result<bool> {
        let write_txn = self.db.begin_write()?;
        let existed = {
            let mut table = write_txn.open_table(INTEGRATION_TABLE)?;
            table.remove(Self::key(user_id, provider).as_str())?.is_some()
        };
        write_txn.commit()?;
        Ok(existed)
    }

    /// List all connected provider names for a user.
    pub fn list_providers(&self, user_id: &str) -> Result<Vec<String>> {
        let read_txn = self.db.begin_read()?;
        let table = read_txn.open_table(INTEGRATION_TABLE)?;

        let prefix = format!("{}:", user_id);
        let mut providers = Vec::new();

        for item in table.iter()? {
            let (key, value) = item?;
            if key.value().starts_with(&prefix) {
                let credential: IntegrationCredential = serde_json::from_slice(value.value())?;
                providers.push(credential.provider);
            }
        }

        Ok(providers)
    }

    /// Build a [`CredentialResolver`] over this storage for tool wiring.
    /// Lookup failures resolve to `None` so a broken table reads as
    /// "not connected" rather than aborting a tool call.
    pub fn resolver(&self) -> CredentialResolver {
        let storage = self.clone();
        Arc::new(move |user_id, provider| match storage.access_token(user_id, provider) {
            Ok(token) => token,
            Err(error) => {
                warn!(user_id, provider, error = %error, "Credential lookup failed");
                None
            }
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    fn create_test_storage() -> IntegrationStorage {
        let temp_dir = tempdir().unwrap();
        let db_path = temp_dir.path().join("test.db");
        let db = Arc::new(Database::create(db_path).unwrap());
        IntegrationStorage::new(db).unwrap()
    }

    #[test]
    fn connect_and_query() {
        let storage = create_test_storage();

        storage
            .connect("user-1", "google_calendar", "tok-123", None)
            .unwrap();

        assert!(storage.is_connected("user-1", "google_calendar").unwrap());
        assert!(!storage.is_connected("user-1", "gmail").unwrap());
        assert!(!storage.is_connected("user-2", "google_calendar").unwrap());
        assert_eq!(
            storage.access_token("user-1", "google_calendar").unwrap(),
            Some("tok-123".to_string())
        );
    }

    #[test]
    fn reconnect_replaces_token() {
        let storage = create_test_storage();

        storage.connect("user-1", "gmail", "old", None).unwrap();
        storage
            .connect("user-1", "gmail", "new", Some("refresh".to_string()))
            .unwrap();

        let credential = storage.get("user-1", "gmail").unwrap().unwrap();
        assert_eq!(credential.access_token, "new");
        assert_eq!(credential.refresh_token.as_deref(), Some("refresh"));
    }

    #[test]
    fn disconnect_removes_credential() {
        let storage = create_test_storage();

        storage.connect("user-1", "gmail", "tok", None).unwrap();
        assert!(storage.disconnect("user-1", "gmail").unwrap());
        assert!(!storage.is_connected("user-1", "gmail").unwrap());
        assert!(!storage.disconnect("user-1", "gmail").unwrap());
    }

    #[test]
    fn list_providers_scopes_to_user() {
        let storage = create_test_storage();

        storage.connect("user-1", "gmail", "a", None).unwrap();
        storage
            .connect("user-1", "google_docs", "b", None)
            .unwrap();
        storage.connect("user-2", "gmail", "c", None).unwrap();

        let mut providers = storage.list_providers("user-1").unwrap();
        providers.sort();
        assert_eq!(providers, vec!["gmail", "google_docs"]);
    }

    #[test]
    fn resolver_reads_tokens() {
        let storage = create_test_storage();
        storage.connect("user-1", "gmail", "tok", None).unwrap();

        let resolver = storage.resolver();
        assert_eq!(resolver("user-1", "gmail"), Some("tok".to_string()));
        assert_eq!(resolver("user-1", "google_docs"), None);
    }
}
