//! Tool registry builder wiring the built-in integration tools.

use cofounder_traits::{CredentialResolver, ToolRegistry};

use crate::impls::{
    CreateCalendarEventTool, CreateDocumentTool, ListCalendarEventsTool, SendEmailTool,
};

/// Builder for a [`ToolRegistry`] populated with the built-in tools.
pub struct ToolRegistryBuilder {
    registry: ToolRegistry,
    credentials: CredentialResolver,
}

impl ToolRegistryBuilder {
    pub fn new(credentials: CredentialResolver) -> Self {
        Self {
            registry: ToolRegistry::new(),
            credentials,
        }
    }

    pub fn with_calendar(mut self) -> Self {
        self.registry
            .register(CreateCalendarEventTool::new(self.credentials.clone()));
        self.registry
            .register(ListCalendarEventsTool::new(self.credentials.clone()));
        self
    }

    pub fn with_email(mut self) -> Self {
        self.registry
            .register(SendEmailTool::new(self.credentials.clone()));
        self
    }

    pub fn with_documents(mut self) -> Self {
        self.registry
            .register(CreateDocumentTool::new(self.credentials.clone()));
        self
    }

    pub fn build(self) -> ToolRegistry {
        self.registry
    }
}

/// Create a registry with all built-in tools.
pub fn default_registry(credentials: CredentialResolver) -> ToolRegistry {
    ToolRegistryBuilder::new(credentials)
        .with_calendar()
        .with_email()
        .with_documents()
        .build()
}
