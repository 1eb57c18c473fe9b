//! Integration availability - who is connected to what.
//!
//! The core only ever queries credential state; connecting and refreshing
//! OAuth tokens belongs to the integration layer outside this workspace.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;

/// Well-known provider names used by the built-in tools.
pub mod provider {
    pub const GOOGLE_CALENDAR: &str = "google_calendar";
    pub const GMAIL: &str = "gmail";
    pub const GOOGLE_DOCS: &str = "google_docs";
}

/// Resolves an access token for (user, provider), or `None` when the
/// provider is not connected for that user.
pub type CredentialResolver = Arc<dyn Fn(&str, &str) -> Option<String> + Send + Sync>;

/// Query surface for integration availability.
#[async_trait]
pub trait IntegrationGate: Send + Sync {
    /// Whether a usable credential exists for this user and provider.
    async fn is_connected(&self, user_id: &str, provider: &str) -> anyhow::Result<bool>;

    /// Map each tool id to the external providers it depends on. Tools with
    /// no external dependency are omitted.
    fn required_providers(&self, tool_ids: &[String]) -> HashMap<String, Vec<String>>;
}
