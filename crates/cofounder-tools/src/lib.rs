//! Cofounder Tools - integration wrappers callable by the planner.
//!
//! Each tool is a thin wrapper over one external API (calendar, email,
//! documents). Tools are stateless descriptors: credential state lives in
//! the integration layer and is resolved per call through a
//! [`cofounder_traits::CredentialResolver`].

mod gate;
mod http_client;
pub mod impls;
mod registry_builder;

pub use gate::StorageIntegrationGate;
pub use impls::{
    CreateCalendarEventTool, CreateDocumentTool, ListCalendarEventsTool, SendEmailTool,
};
pub use registry_builder::{ToolRegistryBuilder, default_registry};
