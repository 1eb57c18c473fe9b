//! User context assembly for prompt grounding.
//!
//! The task executor grounds its system prompt in what it knows about the
//! founder: profile, CRM contacts, and roadmap. Loading is best-effort; a
//! run proceeds with whatever sections resolved.

use async_trait::async_trait;
use serde_json::Value;
use tracing::warn;

use cofounder_storage::WorkspaceStorage;

/// Context loaded for one user, ready for prompt injection.
#[derive(Debug, Default, Clone)]
pub struct UserContext {
    pub profile: Option<Value>,
    pub contacts: Vec<Value>,
    pub roadmap: Vec<Value>,
}

impl UserContext {
    pub fn is_empty(&self) -> bool {
        self.profile.is_none() && self.contacts.is_empty() && self.roadmap.is_empty()
    }

    /// Format context for system prompt injection.
    pub fn format_for_prompt(&self) -> String {
        let mut sections = Vec::new();

        if let Some(profile) = &self.profile {
            sections.push(format!(
                "## Founder Profile\n\n{}",
                serde_json::to_string_pretty(profile).unwrap_or_default()
            ));
        }

        if !self.contacts.is_empty() {
            let mut section = String::from("## Contacts\n\n");
            for contact in &self.contacts {
                let name = contact["name"].as_str().unwrap_or("Unknown");
                let email = contact["email"].as_str().unwrap_or("no email");
                section.push_str(&format!("- {} ({})\n", name, email));
            }
            sections.push(section.trim_end().to_string());
        }

        if !self.roadmap.is_empty() {
            let mut section = String::from("## Roadmap\n\n");
            for item in &self.roadmap {
                let title = item["title"].as_str().unwrap_or("Untitled");
                let status = item["status"].as_str().unwrap_or("unknown");
                section.push_str(&format!("- {} [{}]\n", title, status));
            }
            sections.push(section.trim_end().to_string());
        }

        sections.join("\n\n")
    }
}

/// Source of per-user context documents.
#[async_trait]
pub trait ContextSource: Send + Sync {
    async fn load(&self, user_id: &str) -> UserContext;
}

/// Context source backed by workspace document storage.
pub struct StorageContextSource {
    workspace: WorkspaceStorage,
}

impl StorageContextSource {
    pub fn new(workspace: WorkspaceStorage) -> Self {
        Self { workspace }
    }
}

#[async_trait]
impl ContextSource for StorageContextSource {
    async fn load(&self, user_id: &str) -> UserContext {
        let profile = match self.workspace.get_profile(user_id) {
            Ok(profile) => profile,
            Err(error) => {
                warn!(user_id, error = %error, "Profile lookup failed");
                None
            }
        };

        let contacts = match self.workspace.list_contacts(user_id) {
            Ok(contacts) => contacts
                .iter()
                .filter_map(|c| serde_json::to_value(c).ok())
                .collect(),
            Err(error) => {
                warn!(user_id, error = %error, "Contact listing failed");
                Vec::new()
            }
        };

        let roadmap = match self.workspace.list_roadmap(user_id) {
            Ok(items) => items
                .iter()
                .filter_map(|i| serde_json::to_value(i).ok())
                .collect(),
            Err(error) => {
                warn!(user_id, error = %error, "Roadmap listing failed");
                Vec::new()
            }
        };

        UserContext {
            profile,
            contacts,
            roadmap,
        }
    }
}
