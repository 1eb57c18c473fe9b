//! Storage-backed integration gate.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;

use cofounder_storage::IntegrationStorage;
use cofounder_traits::{IntegrationGate, ToolRegistry};

/// Answers availability queries from stored credentials and the provider
/// dependencies each registered tool declares.
pub struct StorageIntegrationGate {
    integrations: IntegrationStorage,
    tools: Arc<ToolRegistry>,
}

impl StorageIntegrationGate {
    pub fn new(integrations: IntegrationStorage, tools: Arc<ToolRegistry>) -> Self {
        Self {
            integrations,
            tools,
        }
    }
}

#[async_trait]
impl IntegrationGate for StorageIntegrationGate {
    async fn is_connected(&self, user_id: &str, provider: &str) -> anyhow::Result<bool> {
        self.integrations.is_connected(user_id, provider)
    }

    fn required_providers(&self, tool_ids: &[String]) -> HashMap<String, Vec<String>> {
        let mut map = HashMap::new();
        for tool_id in tool_ids {
            let Some(tool) = self.tools.get(tool_id) else {
                continue;
            };
            let providers = tool.providers();
            if !providers.is_empty() {
                map.insert(
                    tool_id.clone(),
                    providers.into_iter().map(str::to_string).collect(),
                );
            }
        }
        map
    }
}
