//! Keyed registries for tools and agents.
//!
//! Both registries are built at process start, then shared as `Arc` and read
//! concurrently by many simultaneous runs. Registration is insert-or-
//! overwrite by id (last writer wins), which supports reloading a plugin
//! while the process is still single-threaded during startup.

use std::collections::HashMap;
use std::sync::Arc;

use crate::agent::Agent;
use crate::error::{Result, ToolError};
use crate::tool::{Tool, ToolSchema};

/// Registry of planner-callable tools.
#[derive(Default)]
pub struct ToolRegistry {
    tools: HashMap<String, Arc<dyn Tool>>,
}

impl ToolRegistry {
    pub fn new() -> Self {
        Self {
            tools: HashMap::new(),
        }
    }

    /// Register a tool, replacing any previous entry with the same name.
    pub fn register<T: Tool + 'static>(&mut self, tool: T) {
        self.register_arc(Arc::new(tool));
    }

    /// Register a tool from an existing Arc.
    pub fn register_arc(&mut self, tool: Arc<dyn Tool>) {
        let name = tool.name().to_string();
        self.tools.insert(name, tool);
    }

    /// Get a tool by name.
    pub fn get(&self, name: &str) -> Option<Arc<dyn Tool>> {
        self.tools.get(name).cloned()
    }

    pub fn has(&self, name: &str) -> bool {
        self.tools.contains_key(name)
    }

    /// Snapshot of all registered tool names.
    pub fn list(&self) -> Vec<String> {
        self.tools.keys().cloned().collect()
    }

    /// Snapshot of schemas for the planner's tool catalog.
    pub fn schemas(&self) -> Vec<ToolSchema> {
        self.tools.values().map(|t| t.schema()).collect()
    }

    /// Resolve a tool or return the lookup failure.
    pub fn resolve(&self, name: &str) -> Result<Arc<dyn Tool>> {
        self.get(name)
            .ok_or_else(|| ToolError::NotFound(name.to_string()))
    }
}

/// Registry of agents.
#[derive(Default)]
pub struct AgentRegistry {
    agents: HashMap<String, Arc<dyn Agent>>,
}

impl AgentRegistry {
    pub fn new() -> Self {
        Self {
            agents: HashMap::new(),
        }
    }

    /// Register an agent, replacing any previous entry with the same id.
    pub fn register<A: Agent + 'static>(&mut self, agent: A) {
        self.register_arc(Arc::new(agent));
    }

    pub fn register_arc(&mut self, agent: Arc<dyn Agent>) {
        let id = agent.id().to_string();
        self.agents.insert(id, agent);
    }

    /// Get an agent by id.
    pub fn get(&self, id: &str) -> Option<Arc<dyn Agent>> {
        self.agents.get(id).cloned()
    }

    pub fn has(&self, id: &str) -> bool {
        self.agents.contains_key(id)
    }

    /// Snapshot of all registered agents.
    pub fn get_all(&self) -> Vec<Arc<dyn Agent>> {
        self.agents.values().cloned().collect()
    }

    /// Snapshot of agents in one category.
    pub fn get_all_by_category(&self, category: &str) -> Vec<Arc<dyn Agent>> {
        self.agents
            .values()
            .filter(|a| a.category() == category)
            .cloned()
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::agent::AgentOutput;
    use crate::error::AgentError;
    use crate::tool::{ToolContext, ToolOutcome};
    use async_trait::async_trait;
    use serde_json::{Value, json};

    struct FakeTool {
        name: &'static str,
        description: &'static str,
    }

    #[async_trait]
    impl Tool for FakeTool {
        fn name(&self) -> &str {
            self.name
        }

        fn description(&self) -> &str {
            self.description
        }

        fn parameters_schema(&self) -> Value {
            json!({"type": "object", "properties": {}})
        }

        async fn execute(&self, _params: Value, _ctx: &ToolContext) -> Result<ToolOutcome> {
            Ok(ToolOutcome::completed(json!({"ok": true})))
        }
    }

    struct FakeAgent {
        id: &'static str,
        category: &'static str,
    }

    #[async_trait]
    impl Agent for FakeAgent {
        fn id(&self) -> &str {
            self.id
        }

        fn name(&self) -> &str {
            self.id
        }

        fn description(&self) -> &str {
            "fake"
        }

        fn category(&self) -> &str {
            self.category
        }

        async fn execute(
            &self,
            _input: Value,
            _user_id: &str,
        ) -> std::result::Result<AgentOutput, AgentError> {
            Ok(AgentOutput::new(Value::Null))
        }
    }

    #[test]
    fn empty_registry_has_nothing() {
        let registry = ToolRegistry::new();
        assert!(!registry.has("unknown"));
        assert!(registry.list().is_empty());
        assert!(registry.schemas().is_empty());
    }

    #[test]
    fn resolve_missing_tool_is_not_found() {
        let registry = ToolRegistry::new();
        let Err(err) = registry.resolve("missing") else {
            panic!("expected resolve to fail for missing tool");
        };
        assert!(matches!(err, ToolError::NotFound(name) if name == "missing"));
    }

    #[test]
    fn re_registering_same_name_keeps_one_entry_with_latest_descriptor() {
        let mut registry = ToolRegistry::new();
        registry.register(FakeTool {
            name: "send_email",
            description: "first",
        });
        registry.register(FakeTool {
            name: "send_email",
            description: "second",
        });

        assert_eq!(registry.list().len(), 1);
        let tool = registry.get("send_email").unwrap();
        assert_eq!(tool.description(), "second");
    }

    #[test]
    fn agent_registry_filters_by_category() {
        let mut registry = AgentRegistry::new();
        registry.register(FakeAgent {
            id: "a",
            category: "research",
        });
        registry.register(FakeAgent {
            id: "b",
            category: "legal",
        });
        registry.register(FakeAgent {
            id: "c",
            category: "research",
        });

        assert_eq!(registry.get_all().len(), 3);
        assert_eq!(registry.get_all_by_category("research").len(), 2);
        assert_eq!(registry.get_all_by_category("gtm").len(), 0);
    }

    #[test]
    fn agent_registry_last_writer_wins() {
        let mut registry = AgentRegistry::new();
        registry.register(FakeAgent {
            id: "dup",
            category: "one",
        });
        registry.register(FakeAgent {
            id: "dup",
            category: "two",
        });

        assert_eq!(registry.get_all().len(), 1);
        assert_eq!(registry.get("dup").unwrap().category(), "two");
    }
}
