//! Tool implementations.

mod calendar;
mod document;
mod email;

pub use calendar::{CreateCalendarEventTool, ListCalendarEventsTool};
pub use document::CreateDocumentTool;
pub use email::SendEmailTool;
