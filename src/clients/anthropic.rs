//! Anthropic Messages API adapter.
//!
//! Structured output is obtained by forcing a single tool whose
//! `input_schema` is the requested schema; the tool input is the object.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};
use tracing::debug;

use super::traits::{FailureClass, LanguageModel, ProviderError};
use super::{build_http_client, matches_auth_marker};
use crate::providers::ProviderKind;
use crate::schemas::ObjectSchema;

const ANTHROPIC_VERSION: &str = "2023-06-01";
const MAX_TOKENS: u32 = 4096;

pub struct AnthropicClient {
    client: reqwest::Client,
    api_key: String,
    text_model: String,
    object_model: String,
    base_url: String,
}

#[derive(Serialize)]
struct MessagesRequest<'a> {
    model: &'a str,
    max_tokens: u32,
    messages: Vec<Message<'a>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    tools: Option<Vec<Value>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    tool_choice: Option<Value>,
}

#[derive(Serialize)]
struct Message<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Deserialize)]
struct MessagesResponse {
    content: Vec<ContentBlock>,
}

#[derive(Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
enum ContentBlock {
    Text {
        text: String,
    },
    ToolUse {
        name: String,
        input: Value,
    },
    #[serde(other)]
    Other,
}

impl AnthropicClient {
    pub fn new(
        api_key: String,
        text_model: String,
        object_model: String,
        base_url: String,
        timeout_ms: u64,
    ) -> Result<Self, ProviderError> {
        Ok(Self {
            client: build_http_client(timeout_ms)
                .map_err(|e| e.with_vendor(ProviderKind::Anthropic))?,
            api_key,
            text_model,
            object_model,
            base_url,
        })
    }

    async fn send(&self, body: &MessagesRequest<'_>) -> Result<MessagesResponse, ProviderError> {
        let url = format!("{}/v1/messages", self.base_url.trim_end_matches('/'));
        let resp = self
            .client
            .post(url)
            .header("x-api-key", &self.api_key)
            .header("anthropic-version", ANTHROPIC_VERSION)
            .json(body)
            .send()
            .await
            .map_err(|e| {
                ProviderError::new(format!("HTTP request failed: {}", e))
                    .with_vendor(ProviderKind::Anthropic)
            })?;

        let status = resp.status();
        if !status.is_success() {
            let body_text = resp
                .text()
                .await
                .unwrap_or_else(|_| "Unable to read response body".to_string());
            return Err(ProviderError::from_response(
                ProviderKind::Anthropic,
                status.as_u16(),
                &body_text,
            ));
        }

        resp.json::<MessagesResponse>().await.map_err(|e| {
            ProviderError::new(format!("Malformed Messages response: {}", e))
                .with_vendor(ProviderKind::Anthropic)
                .with_error_type("invalid_response")
        })
    }
}

/// Request body forcing the model to answer through the schema tool.
fn object_request<'a>(model: &'a str, prompt: &'a str, schema: &ObjectSchema) -> MessagesRequest<'a> {
    MessagesRequest {
        model,
        max_tokens: MAX_TOKENS,
        messages: vec![Message {
            role: "user",
            content: prompt,
        }],
        tools: Some(vec![json!({
            "name": schema.name,
            "description": schema.description,
            "input_schema": schema.schema,
        })]),
        tool_choice: Some(json!({"type": "tool", "name": schema.name})),
    }
}

fn extract_text(resp: MessagesResponse) -> Result<String, ProviderError> {
    let text: Vec<String> = resp
        .content
        .into_iter()
        .filter_map(|block| match block {
            ContentBlock::Text { text } => Some(text),
            _ => None,
        })
        .collect();
    if text.is_empty() {
        return Err(ProviderError::new("Empty text response")
            .with_vendor(ProviderKind::Anthropic)
            .with_error_type("invalid_response"));
    }
    Ok(text.join("").trim().to_string())
}

fn extract_tool_input(resp: MessagesResponse, tool: &str) -> Result<Value, ProviderError> {
    resp.content
        .into_iter()
        .find_map(|block| match block {
            ContentBlock::ToolUse { name, input } if name == tool => Some(input),
            _ => None,
        })
        .ok_or_else(|| {
            ProviderError::new(format!("No {} tool call in response", tool))
                .with_vendor(ProviderKind::Anthropic)
                .with_error_type("invalid_response")
        })
}

/// Anthropic error tags: `authentication_error`, `rate_limit_error`,
/// `overloaded_error`, `invalid_request_error`.
pub fn classify(err: &ProviderError) -> FailureClass {
    let tag = err.error_type.as_deref().unwrap_or_default();
    match (err.status, tag) {
        (Some(401), _) | (_, "authentication_error") => FailureClass::Authentication,
        (Some(429), _) | (Some(529), _) | (_, "rate_limit_error") | (_, "overloaded_error") => {
            FailureClass::RateLimit
        }
        (_, "invalid_request_error") | (_, "invalid_response") => FailureClass::Validation,
        _ if matches_auth_marker(err) => FailureClass::Authentication,
        _ => FailureClass::Unknown,
    }
}

#[async_trait]
impl LanguageModel for AnthropicClient {
    fn kind(&self) -> ProviderKind {
        ProviderKind::Anthropic
    }

    async fn generate_text(&self, prompt: &str) -> Result<String, ProviderError> {
        debug!(
            "Anthropic text generation (model={}, chars={})",
            self.text_model,
            prompt.len()
        );
        let body = MessagesRequest {
            model: &self.text_model,
            max_tokens: MAX_TOKENS,
            messages: vec![Message {
                role: "user",
                content: prompt,
            }],
            tools: None,
            tool_choice: None,
        };
        extract_text(self.send(&body).await?)
    }

    async fn generate_object(
        &self,
        prompt: &str,
        schema: &ObjectSchema,
    ) -> Result<Value, ProviderError> {
        debug!(
            "Anthropic object generation (model={}, schema={})",
            self.object_model, schema.name
        );
        let body = object_request(&self.object_model, prompt, schema);
        extract_tool_input(self.send(&body).await?, schema.name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schemas::swot_schema;

    #[test]
    fn object_request_forces_schema_tool() {
        let schema = swot_schema();
        let body = serde_json::to_value(object_request("m", "prompt", &schema)).unwrap();
        assert_eq!(body["tool_choice"]["name"], "swot_analysis");
        assert_eq!(body["tools"][0]["input_schema"]["type"], "object");
        assert_eq!(body["messages"][0]["content"], "prompt");
    }

    #[test]
    fn extracts_tool_input_among_text_blocks() {
        let resp: MessagesResponse = serde_json::from_value(json!({
            "content": [
                {"type": "text", "text": "Sure."},
                {"type": "tool_use", "id": "t1", "name": "swot_analysis", "input": {"strengths": ["a"]}}
            ]
        }))
        .unwrap();
        let input = extract_tool_input(resp, "swot_analysis").unwrap();
        assert_eq!(input["strengths"][0], "a");
    }

    #[test]
    fn text_blocks_are_joined_and_trimmed() {
        let resp: MessagesResponse = serde_json::from_value(json!({
            "content": [{"type": "text", "text": " Hello "}, {"type": "thinking", "thinking": "x"}]
        }))
        .unwrap();
        assert_eq!(extract_text(resp).unwrap(), "Hello");
    }

    #[test]
    fn classifies_anthropic_error_tags() {
        let auth = ProviderError::from_response(
            ProviderKind::Anthropic,
            403,
            r#"{"type":"error","error":{"type":"authentication_error","message":"bad key"}}"#,
        );
        assert_eq!(classify(&auth), FailureClass::Authentication);
        let limited = ProviderError::new("slow down").with_status(429);
        assert_eq!(classify(&limited), FailureClass::RateLimit);
        let invalid = ProviderError::new("x").with_error_type("invalid_request_error");
        assert_eq!(classify(&invalid), FailureClass::Validation);
        assert_eq!(
            classify(&ProviderError::new("connection reset")),
            FailureClass::Unknown
        );
    }
}
