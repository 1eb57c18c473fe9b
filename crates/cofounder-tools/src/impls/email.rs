//! Email sending tool, approval-gated.
//!
//! Sending mail on the founder's behalf is the one irreversible action in
//! the default toolset, so the first call returns an approval suspend
//! marker with a preview. The caller resumes out of band by re-invoking
//! with `approved: true` and the approval id.

use async_trait::async_trait;
use base64::{Engine as _, engine::general_purpose::URL_SAFE_NO_PAD};
use reqwest::Client;
use serde::Deserialize;
use serde_json::{Value, json};
use tracing::info;

use cofounder_traits::{
    CredentialResolver, Tool, ToolContext, ToolError, ToolOutcome, ToolResult, provider,
};

use crate::http_client::build_http_client;

const DEFAULT_BASE_URL: &str = "https://gmail.googleapis.com/gmail/v1";

#[derive(Debug, Deserialize)]
struct SendEmailInput {
    to: String,
    subject: String,
    body: String,
    #[serde(default)]
    approved: bool,
    approval_id: Option<String>,
}

/// Send an email through the user's Gmail account.
pub struct SendEmailTool {
    client: Client,
    credentials: CredentialResolver,
    base_url: String,
    require_approval: bool,
}

impl SendEmailTool {
    pub fn new(credentials: CredentialResolver) -> Self {
        Self {
            client: build_http_client(),
            credentials,
            base_url: DEFAULT_BASE_URL.to_string(),
            require_approval: true,
        }
    }

    /// Override the API endpoint (for tests).
    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into();
        self
    }

    /// Disable the approval gate (scheduled automation mode).
    pub fn with_approval_required(mut self, required: bool) -> Self {
        self.require_approval = required;
        self
    }

    fn encode_message(to: &str, subject: &str, body: &str) -> String {
        let message = format!(
            "To: {to}\r\nSubject: {subject}\r\nContent-Type: text/plain; charset=utf-8\r\n\r\n{body}"
        );
        URL_SAFE_NO_PAD.encode(message.as_bytes())
    }
}

#[async_trait]
impl Tool for SendEmailTool {
    fn name(&self) -> &str {
        "send_email"
    }

    fn description(&self) -> &str {
        "Send an email from the user's Gmail account. Requires user approval before the message is actually sent."
    }

    fn parameters_schema(&self) -> Value {
        json!({
            "type": "object",
            "properties": {
                "to": {
                    "type": "string",
                    "description": "Recipient email address"
                },
                "subject": {
                    "type": "string",
                    "description": "Email subject line"
                },
                "body": {
                    "type": "string",
                    "description": "Plain-text email body"
                },
                "approved": {
                    "type": "boolean",
                    "description": "Set true only when resuming an already-approved send"
                },
                "approval_id": {
                    "type": "string",
                    "description": "Approval id issued on the first attempt"
                }
            },
            "required": ["to", "subject", "body"]
        })
    }

    fn providers(&self) -> Vec<&'static str> {
        vec![provider::GMAIL]
    }

    async fn execute(&self, params: Value, ctx: &ToolContext) -> ToolResult<ToolOutcome> {
        let input: SendEmailInput = serde_json::from_value(params)
            .map_err(|e| ToolError::InvalidParams(e.to_string()))?;

        let Some(token) = (self.credentials)(&ctx.user_id, provider::GMAIL) else {
            return Ok(ToolOutcome::unavailable(
                provider::GMAIL,
                "Gmail is not connected. Ask the user to connect it from the integrations page.",
            ));
        };

        if self.require_approval && !input.approved {
            let approval_id = uuid::Uuid::new_v4().to_string();
            info!(
                approval_id = %approval_id,
                task_id = ?ctx.agent_task_id,
                to = %input.to,
                "Email send suspended pending approval"
            );
            return Ok(ToolOutcome::approval_required(
                approval_id,
                json!({
                    "action": "send_email",
                    "to": input.to,
                    "subject": input.subject,
                    "body": input.body,
                }),
            ));
        }

        let raw = Self::encode_message(&input.to, &input.subject, &input.body);
        let response = self
            .client
            .post(format!("{}/users/me/messages/send", self.base_url))
            .bearer_auth(&token)
            .json(&json!({ "raw": raw }))
            .send()
            .await
            .map_err(|e| ToolError::Http(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            return Err(ToolError::Api {
                provider: provider::GMAIL.to_string(),
                status: status.as_u16(),
                message,
            });
        }

        let sent: Value = response
            .json()
            .await
            .map_err(|e| ToolError::Http(e.to_string()))?;

        Ok(ToolOutcome::completed(json!({
            "message_id": sent["id"],
            "to": input.to,
            "subject": input.subject,
            "approval_id": input.approval_id,
        })))
    }
}
