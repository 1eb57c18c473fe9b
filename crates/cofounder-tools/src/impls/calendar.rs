//! Google Calendar tools.

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use serde_json::{Value, json};

use cofounder_traits::{
    CredentialResolver, Tool, ToolContext, ToolError, ToolOutcome, ToolResult, provider,
};

use crate::http_client::build_http_client;

const DEFAULT_BASE_URL: &str = "https://www.googleapis.com/calendar/v3";

const NOT_CONNECTED: &str =
    "Google Calendar is not connected. Ask the user to connect it from the integrations page.";

#[derive(Debug, Deserialize)]
struct CreateEventInput {
    title: String,
    start: String,
    end: String,
    description: Option<String>,
    attendees: Option<Vec<String>>,
}

/// Create an event on the user's primary calendar.
pub struct CreateCalendarEventTool {
    client: Client,
    credentials: CredentialResolver,
    base_url: String,
}

impl CreateCalendarEventTool {
    pub fn new(credentials: CredentialResolver) -> Self {
        Self {
            client: build_http_client(),
            credentials,
            base_url: DEFAULT_BASE_URL.to_string(),
        }
    }

    /// Override the API endpoint (for tests).
    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into();
        self
    }
}

#[async_trait]
impl Tool for CreateCalendarEventTool {
    fn name(&self) -> &str {
        "create_calendar_event"
    }

    fn description(&self) -> &str {
        "Create a calendar event with a title, start/end time, and optional attendees on the user's primary Google Calendar."
    }

    fn parameters_schema(&self) -> Value {
        json!({
            "type": "object",
            "properties": {
                "title": {
                    "type": "string",
                    "description": "Event title"
                },
                "start": {
                    "type": "string",
                    "description": "Start time, RFC 3339 (e.g. 2026-08-08T10:00:00Z)"
                },
                "end": {
                    "type": "string",
                    "description": "End time, RFC 3339"
                },
                "description": {
                    "type": "string",
                    "description": "Optional event description"
                },
                "attendees": {
                    "type": "array",
                    "items": { "type": "string" },
                    "description": "Attendee email addresses"
                }
            },
            "required": ["title", "start", "end"]
        })
    }

    fn providers(&self) -> Vec<&'static str> {
        vec![provider::GOOGLE_CALENDAR]
    }

    async fn execute(&self, params: Value, ctx: &ToolContext) -> ToolResult<ToolOutcome> {
        let input: CreateEventInput = serde_json::from_value(params)
            .map_err(|e| ToolError::InvalidParams(e.to_string()))?;

        let Some(token) = (self.credentials)(&ctx.user_id, provider::GOOGLE_CALENDAR) else {
            return Ok(ToolOutcome::unavailable(
                provider::GOOGLE_CALENDAR,
                NOT_CONNECTED,
            ));
        };

        let attendees: Vec<Value> = input
            .attendees
            .unwrap_or_default()
            .into_iter()
            .map(|email| json!({ "email": email }))
            .collect();

        let body = json!({
            "summary": input.title,
            "description": input.description,
            "start": { "dateTime": input.start },
            "end": { "dateTime": input.end },
            "attendees": attendees,
        });

        let response = self
            .client
            .post(format!("{}/calendars/primary/events", self.base_url))
            .bearer_auth(&token)
            .json(&body)
            .send()
            .await
            .map_err(|e| ToolError::Http(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            return Err(ToolError::Api {
                provider: provider::GOOGLE_CALENDAR.to_string(),
                status: status.as_u16(),
                message,
            });
        }

        let event: Value = response
            .json()
            .await
            .map_err(|e| ToolError::Http(e.to_string()))?;

        Ok(ToolOutcome::completed(json!({
            "event_id": event["id"],
            "title": event["summary"],
            "start": event["start"]["dateTime"],
            "end": event["end"]["dateTime"],
            "link": event["htmlLink"],
        })))
    }
}

#[derive(Debug, Deserialize)]
struct ListEventsInput {
    time_min: String,
    time_max: String,
    max_results: Option<u32>,
}

/// List upcoming events in a date window.
pub struct ListCalendarEventsTool {
    client: Client,
    credentials: CredentialResolver,
    base_url: String,
}

impl ListCalendarEventsTool {
    pub fn new(credentials: CredentialResolver) -> Self {
        Self {
            client: build_http_client(),
            credentials,
            base_url: DEFAULT_BASE_URL.to_string(),
        }
    }

    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into();
        self
    }
}

#[async_trait]
impl Tool for ListCalendarEventsTool {
    fn name(&self) -> &str {
        "list_calendar_events"
    }

    fn description(&self) -> &str {
        "List events on the user's primary calendar within a time window. Use this to check availability before scheduling."
    }

    fn parameters_schema(&self) -> Value {
        json!({
            "type": "object",
            "properties": {
                "time_min": {
                    "type": "string",
                    "description": "Window start, RFC 3339"
                },
                "time_max": {
                    "type": "string",
                    "description": "Window end, RFC 3339"
                },
                "max_results": {
                    "type": "integer",
                    "description": "Maximum events to return (default 10)"
                }
            },
            "required": ["time_min", "time_max"]
        })
    }

    fn providers(&self) -> Vec<&'static str> {
        vec![provider::GOOGLE_CALENDAR]
    }

    async fn execute(&self, params: Value, ctx: &ToolContext) -> ToolResult<ToolOutcome> {
        let input: ListEventsInput = serde_json::from_value(params)
            .map_err(|e| ToolError::InvalidParams(e.to_string()))?;

        let Some(token) = (self.credentials)(&ctx.user_id, provider::GOOGLE_CALENDAR) else {
            return Ok(ToolOutcome::unavailable(
                provider::GOOGLE_CALENDAR,
                NOT_CONNECTED,
            ));
        };

        let max_results = input.max_results.unwrap_or(10).to_string();
        let response = self
            .client
            .get(format!("{}/calendars/primary/events", self.base_url))
            .bearer_auth(&token)
            .query(&[
                ("timeMin", input.time_min.as_str()),
                ("timeMax", input.time_max.as_str()),
                ("singleEvents", "true"),
                ("orderBy", "startTime"),
                ("maxResults", max_results.as_str()),
            ])
            .send()
            .await
            .map_err(|e| ToolError::Http(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            return Err(ToolError::Api {
                provider: provider::GOOGLE_CALENDAR.to_string(),
                status: status.as_u16(),
                message,
            });
        }

        let listing: Value = response
            .json()
            .await
            .map_err(|e| ToolError::Http(e.to_string()))?;

        let events: Vec<Value> = listing["items"]
            .as_array()
            .map(|items| {
                items
                    .iter()
                    .map(|event| {
                        json!({
                            "event_id": event["id"],
                            "title": event["summary"],
                            "start": event["start"]["dateTime"],
                            "end": event["end"]["dateTime"],
                        })
                    })
                    .collect()
            })
            .unwrap_or_default();

        Ok(ToolOutcome::completed(json!({ "events": events })))
    }
}
