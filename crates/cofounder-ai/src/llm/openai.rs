//! OpenAI-compatible planner client.

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::time::Duration;
use tokio::time::sleep;
use tracing::warn;

use crate::error::{AiError, Result};
use crate::llm::client::{
    CompletionRequest, CompletionResponse, FinishReason, LlmClient, Message, Role, TokenUsage,
    ToolCall,
};
use crate::llm::retry::RetryConfig;

/// OpenAI-compatible chat completions client.
pub struct OpenAIClient {
    client: Client,
    api_key: String,
    model: String,
    base_url: String,
    retry_config: RetryConfig,
}

impl OpenAIClient {
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            client: Client::builder()
                .timeout(Duration::from_secs(120))
                .build()
                .expect("Failed to build reqwest client"),
            api_key: api_key.into(),
            model: "gpt-4o".to_string(),
            base_url: "https://api.openai.com/v1".to_string(),
            retry_config: RetryConfig::default(),
        }
    }

    /// Set the model to use.
    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    /// Set custom base URL (for API-compatible services and tests).
    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into();
        self
    }

    pub fn with_retry_config(mut self, config: RetryConfig) -> Self {
        self.retry_config = config;
        self
    }

    /// Map a provider rejection to a user-actionable error. The message
    /// text is surfaced to end users; each rejection class stays distinct.
    fn classify_error(&self, status: u16, body: &str, retry_after_secs: Option<u64>) -> AiError {
        match status {
            401 | 403 => AiError::PlannerInvalidCredential,
            404 => AiError::PlannerUnknownModel(self.model.clone()),
            429 => {
                if body.contains("insufficient_quota") || body.contains("billing") {
                    AiError::PlannerQuotaExceeded
                } else {
                    AiError::PlannerRateLimited { retry_after_secs }
                }
            }
            _ => {
                const MAX_ERROR_BODY: usize = 512;
                let message = if body.len() > MAX_ERROR_BODY {
                    format!("{}... [truncated]", &body[..MAX_ERROR_BODY])
                } else {
                    body.to_string()
                };
                AiError::Planner { status, message }
            }
        }
    }
}

#[derive(Serialize)]
struct ApiRequest {
    model: String,
    messages: Vec<ApiMessage>,
    #[serde(skip_serializing_if = "Option::is_none")]
    tools: Option<Vec<ApiTool>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    max_tokens: Option<u32>,
}

#[derive(Serialize)]
struct ApiMessage {
    role: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    content: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    tool_call_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    tool_calls: Option<Vec<ApiMessageToolCall>>,
}

#[derive(Serialize)]
struct ApiMessageToolCall {
    id: String,
    r#type: String,
    function: ApiFunctionStub,
}

#[derive(Serialize)]
struct ApiFunctionStub {
    name: String,
    arguments: String,
}

#[derive(Serialize)]
struct ApiTool {
    r#type: String,
    function: ApiFunction,
}

#[derive(Serialize)]
struct ApiFunction {
    name: String,
    description: String,
    parameters: Value,
}

#[derive(Deserialize)]
struct ApiResponse {
    choices: Vec<ApiChoice>,
    usage: Option<ApiUsage>,
}

#[derive(Deserialize)]
struct ApiChoice {
    message: ApiResponseMessage,
    finish_reason: Option<String>,
}

#[derive(Deserialize)]
struct ApiResponseMessage {
    content: Option<String>,
    tool_calls: Option<Vec<ApiResponseToolCall>>,
}

#[derive(Deserialize)]
struct ApiResponseToolCall {
    id: String,
    function: ApiResponseFunction,
}

#[derive(Deserialize)]
struct ApiResponseFunction {
    name: String,
    arguments: String,
}

#[derive(Deserialize)]
struct ApiUsage {
    prompt_tokens: u32,
    completion_tokens: u32,
    total_tokens: u32,
}

fn to_api_message(message: &Message) -> ApiMessage {
    let role = match message.role {
        Role::System => "system",
        Role::User => "user",
        Role::Assistant => "assistant",
        Role::Tool => "tool",
    }
    .to_string();

    let tool_calls = message.tool_calls.as_ref().map(|calls| {
        calls
            .iter()
            .map(|call| ApiMessageToolCall {
                id: call.id.clone(),
                r#type: "function".to_string(),
                function: ApiFunctionStub {
                    name: call.name.clone(),
                    arguments: serde_json::to_string(&call.arguments).unwrap_or_default(),
                },
            })
            .collect()
    });

    // Assistant messages that only carry tool calls send null content.
    let content = if message.tool_calls.is_some() && message.content.is_empty() {
        None
    } else {
        Some(message.content.clone())
    };

    ApiMessage {
        role,
        content,
        tool_call_id: message.tool_call_id.clone(),
        tool_calls,
    }
}

fn parse_retry_after(response: &reqwest::Response) -> Option<u64> {
    response
        .headers()
        .get("retry-after")
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.trim().parse::<u64>().ok())
}

#[async_trait]
impl LlmClient for OpenAIClient {
    fn provider(&self) -> &str {
        "openai"
    }

    fn model(&self) -> &str {
        &self.model
    }

    async fn complete(&self, request: CompletionRequest) -> Result<CompletionResponse> {
        let tools: Option<Vec<ApiTool>> = if request.tools.is_empty() {
            None
        } else {
            Some(
                request
                    .tools
                    .iter()
                    .map(|schema| ApiTool {
                        r#type: "function".to_string(),
                        function: ApiFunction {
                            name: schema.name.clone(),
                            description: schema.description.clone(),
                            parameters: schema.parameters.clone(),
                        },
                    })
                    .collect(),
            )
        };

        let body = ApiRequest {
            model: self.model.clone(),
            messages: request.messages.iter().map(to_api_message).collect(),
            tools,
            temperature: request.temperature,
            max_tokens: request.max_tokens,
        };

        let mut attempt: u32 = 0;
        loop {
            let response = self
                .client
                .post(format!("{}/chat/completions", self.base_url))
                .bearer_auth(&self.api_key)
                .json(&body)
                .send()
                .await?;

            let status = response.status();
            if !status.is_success() {
                let retry_after = parse_retry_after(&response);
                let text = response.text().await.unwrap_or_default();
                let error = self.classify_error(status.as_u16(), &text, retry_after);

                if error.is_retryable() && attempt < self.retry_config.max_retries {
                    attempt += 1;
                    let delay = self.retry_config.delay_for(attempt, retry_after);
                    warn!(
                        status = status.as_u16(),
                        attempt,
                        delay_ms = delay.as_millis() as u64,
                        "Planner call rejected, retrying"
                    );
                    sleep(delay).await;
                    continue;
                }

                return Err(error);
            }

            let parsed: ApiResponse = response.json().await?;
            let Some(choice) = parsed.choices.into_iter().next() else {
                return Err(AiError::Planner {
                    status: status.as_u16(),
                    message: "Response contained no choices".to_string(),
                });
            };

            let tool_calls: Vec<ToolCall> = choice
                .message
                .tool_calls
                .unwrap_or_default()
                .into_iter()
                .map(|call| ToolCall {
                    id: call.id,
                    name: call.function.name,
                    arguments: serde_json::from_str(&call.function.arguments)
                        .unwrap_or(Value::Null),
                })
                .collect();

            let finish_reason = match choice.finish_reason.as_deref() {
                Some("length") => FinishReason::MaxTokens,
                Some("tool_calls") => FinishReason::ToolCalls,
                _ if !tool_calls.is_empty() => FinishReason::ToolCalls,
                _ => FinishReason::Stop,
            };

            return Ok(CompletionResponse {
                content: choice.message.content,
                tool_calls,
                finish_reason,
                usage: parsed.usage.map(|usage| TokenUsage {
                    prompt_tokens: usage.prompt_tokens,
                    completion_tokens: usage.completion_tokens,
                    total_tokens: usage.total_tokens,
                }),
            });
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn no_retry() -> RetryConfig {
        RetryConfig {
            max_retries: 0,
            ..RetryConfig::default()
        }
    }

    async fn client_for(server: &MockServer) -> OpenAIClient {
        OpenAIClient::new("test-key")
            .with_base_url(server.uri())
            .with_retry_config(no_retry())
    }

    #[tokio::test]
    async fn parses_tool_call_response() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/chat/completions"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "choices": [{
                    "message": {
                        "content": null,
                        "tool_calls": [{
                            "id": "call_1",
                            "type": "function",
                            "function": {
                                "name": "create_calendar_event",
                                "arguments": "{\"title\":\"Sync\"}"
                            }
                        }]
                    },
                    "finish_reason": "tool_calls"
                }],
                "usage": {"prompt_tokens": 10, "completion_tokens": 5, "total_tokens": 15}
            })))
            .mount(&server)
            .await;

        let client = client_for(&server).await;
        let response = client
            .complete(CompletionRequest::new(vec![Message::user("schedule it")]))
            .await
            .unwrap();

        assert_eq!(response.finish_reason, FinishReason::ToolCalls);
        assert_eq!(response.tool_calls.len(), 1);
        assert_eq!(response.tool_calls[0].name, "create_calendar_event");
        assert_eq!(response.tool_calls[0].arguments["title"], "Sync");
        assert_eq!(response.usage.unwrap().total_tokens, 15);
    }

    #[tokio::test]
    async fn unauthorized_maps_to_invalid_credential() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/chat/completions"))
            .respond_with(ResponseTemplate::new(401).set_body_string("invalid api key"))
            .mount(&server)
            .await;

        let client = client_for(&server).await;
        let error = client
            .complete(CompletionRequest::new(vec![Message::user("hi")]))
            .await
            .unwrap_err();

        assert!(matches!(error, AiError::PlannerInvalidCredential));
    }

    #[tokio::test]
    async fn quota_exhaustion_is_distinct_from_rate_limiting() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/chat/completions"))
            .respond_with(ResponseTemplate::new(429).set_body_json(json!({
                "error": {"code": "insufficient_quota", "message": "You exceeded your quota"}
            })))
            .mount(&server)
            .await;

        let client = client_for(&server).await;
        let error = client
            .complete(CompletionRequest::new(vec![Message::user("hi")]))
            .await
            .unwrap_err();

        assert!(matches!(error, AiError::PlannerQuotaExceeded));
    }

    #[tokio::test]
    async fn plain_rate_limit_maps_to_rate_limited() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/chat/completions"))
            .respond_with(
                ResponseTemplate::new(429)
                    .insert_header("retry-after", "3")
                    .set_body_string("slow down"),
            )
            .mount(&server)
            .await;

        let client = client_for(&server).await;
        let error = client
            .complete(CompletionRequest::new(vec![Message::user("hi")]))
            .await
            .unwrap_err();

        assert!(matches!(
            error,
            AiError::PlannerRateLimited {
                retry_after_secs: Some(3)
            }
        ));
    }

    #[tokio::test]
    async fn unknown_model_maps_to_model_error() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/chat/completions"))
            .respond_with(ResponseTemplate::new(404).set_body_string("model not found"))
            .mount(&server)
            .await;

        let client = OpenAIClient::new("k")
            .with_base_url(server.uri())
            .with_model("gpt-nonexistent")
            .with_retry_config(no_retry());
        let error = client
            .complete(CompletionRequest::new(vec![Message::user("hi")]))
            .await
            .unwrap_err();

        match error {
            AiError::PlannerUnknownModel(model) => assert_eq!(model, "gpt-nonexistent"),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[tokio::test]
    async fn server_errors_are_retried() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/chat/completions"))
            .respond_with(ResponseTemplate::new(500).set_body_string("transient"))
            .up_to_n_times(1)
            .mount(&server)
            .await;
        Mock::given(method("POST"))
            .and(path("/chat/completions"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "choices": [{
                    "message": {"content": "recovered", "tool_calls": null},
                    "finish_reason": "stop"
                }],
                "usage": null
            })))
            .mount(&server)
            .await;

        let client = OpenAIClient::new("k")
            .with_base_url(server.uri())
            .with_retry_config(RetryConfig {
                max_retries: 2,
                initial_delay_ms: 1,
                ..RetryConfig::default()
            });

        let response = client
            .complete(CompletionRequest::new(vec![Message::user("hi")]))
            .await
            .unwrap();
        assert_eq!(response.content.as_deref(), Some("recovered"));
    }
}
