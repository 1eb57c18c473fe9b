//! Google Docs document creation tool.

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use serde_json::{Value, json};

use cofounder_traits::{
    CredentialResolver, Tool, ToolContext, ToolError, ToolOutcome, ToolResult, provider,
};

use crate::http_client::build_http_client;

const DEFAULT_BASE_URL: &str = "https://docs.googleapis.com/v1";

#[derive(Debug, Deserialize)]
struct CreateDocumentInput {
    title: String,
    content: Option<String>,
}

/// Create a Google Doc, optionally seeded with body text.
pub struct CreateDocumentTool {
    client: Client,
    credentials: CredentialResolver,
    base_url: String,
}

impl CreateDocumentTool {
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
impl Tool for CreateDocumentTool {
    fn name(&self) -> &str {
        "create_document"
    }

    fn description(&self) -> &str {
        "Create a Google Doc with a title and optional initial content, e.g. for meeting notes or a draft memo."
    }

    fn parameters_schema(&self) -> Value {
        json!({
            "type": "object",
            "properties": {
                "title": {
                    "type": "string",
                    "description": "Document title"
                },
                "content": {
                    "type": "string",
                    "description": "Optional initial body text"
                }
            },
            "required": ["title"]
        })
    }

    fn providers(&self) -> Vec<&'static str> {
        vec![provider::GOOGLE_DOCS]
    }

    async fn execute(&self, params: Value, ctx: &ToolContext) -> ToolResult<ToolOutcome> {
        let input: CreateDocumentInput = serde_json::from_value(params)
            .map_err(|e| ToolError::InvalidParams(e.to_string()))?;

        let Some(token) = (self.credentials)(&ctx.user_id, provider::GOOGLE_DOCS) else {
            return Ok(ToolOutcome::unavailable(
                provider::GOOGLE_DOCS,
                "Google Docs is not connected. Ask the user to connect it from the integrations page.",
            ));
        };

        let response = self
            .client
            .post(format!("{}/documents", self.base_url))
            .bearer_auth(&token)
            .json(&json!({ "title": input.title }))
            .send()
            .await
            .map_err(|e| ToolError::Http(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            return Err(ToolError::Api {
                provider: provider::GOOGLE_DOCS.to_string(),
                status: status.as_u16(),
                message,
            });
        }

        let document: Value = response
            .json()
            .await
            .map_err(|e| ToolError::Http(e.to_string()))?;
        let document_id = document["documentId"].as_str().unwrap_or_default().to_string();

        if let Some(content) = input.content.filter(|c| !c.is_empty()) {
            let update = self
                .client
                .post(format!(
                    "{}/documents/{}:batchUpdate",
                    self.base_url, document_id
                ))
                .bearer_auth(&token)
                .json(&json!({
                    "requests": [{
                        "insertText": {
                            "location": { "index": 1 },
                            "text": content
                        }
                    }]
                }))
                .send()
                .await
                .map_err(|e| ToolError::Http(e.to_string()))?;

            let status = update.status();
            if !status.is_success() {
                let message = update.text().await.unwrap_or_default();
                return Err(ToolError::Api {
                    provider: provider::GOOGLE_DOCS.to_string(),
                    status: status.as_u16(),
                    message,
                });
            }
        }

        Ok(ToolOutcome::completed(json!({
            "document_id": document_id,
            "title": document["title"],
            "link": format!("https://docs.google.com/document/d/{}/edit", document_id),
        })))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use wiremock::matchers::{body_partial_json, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    #[tokio::test]
    async fn disconnected_docs_is_a_soft_error() {
        let tool = CreateDocumentTool::new(Arc::new(|_, _| None));
        let ctx = ToolContext::new("user-1");

        let outcome = tool.execute(json!({"title": "Notes"}), &ctx).await.unwrap();
        assert!(matches!(outcome, ToolOutcome::Unavailable { .. }));
    }

    #[tokio::test]
    async fn create_with_content_issues_batch_update() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/documents"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "documentId": "doc-1",
                "title": "Board memo"
            })))
            .mount(&server)
            .await;
        Mock::given(method("POST"))
            .and(path("/documents/doc-1:batchUpdate"))
            .and(body_partial_json(json!({
                "requests": [{"insertText": {"text": "Agenda"}}]
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({})))
            .expect(1)
            .mount(&server)
            .await;

        let tool = CreateDocumentTool::new(Arc::new(|_, _| Some("tok".to_string())))
            .with_base_url(server.uri());
        let ctx = ToolContext::new("user-1");

        let outcome = tool
            .execute(json!({"title": "Board memo", "content": "Agenda"}), &ctx)
            .await
            .unwrap();

        match outcome {
            ToolOutcome::Completed { result } => {
                assert_eq!(result["document_id"], "doc-1");
                assert!(
                    result["link"]
                        .as_str()
                        .unwrap()
                        .contains("docs.google.com/document/d/doc-1")
                );
            }
            other => panic!("expected completed, got {other:?}"),
        }
    }
}
