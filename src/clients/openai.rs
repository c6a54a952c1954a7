//! OpenAI Chat Completions adapter.
//!
//! Structured output uses `response_format: json_schema` in strict mode and
//! parses the returned message content as JSON.

use async_trait::async_trait;
use serde::Deserialize;
use serde_json::{Value, json};
use tracing::debug;

use super::traits::{FailureClass, LanguageModel, ProviderError};
use super::{build_http_client, matches_auth_marker};
use crate::providers::ProviderKind;
use crate::schemas::ObjectSchema;

pub struct OpenAiClient {
    client: reqwest::Client,
    api_key: String,
    text_model: String,
    object_model: String,
    base_url: String,
}

#[derive(Deserialize)]
struct ChatResponse {
    choices: Vec<Choice>,
}

#[derive(Deserialize)]
struct Choice {
    message: ChoiceMessage,
}

#[derive(Deserialize)]
struct ChoiceMessage {
    content: Option<String>,
    #[serde(default)]
    refusal: Option<String>,
}

impl OpenAiClient {
    pub fn new(
        api_key: String,
        text_model: String,
        object_model: String,
        base_url: String,
        timeout_ms: u64,
    ) -> Result<Self, ProviderError> {
        Ok(Self {
            client: build_http_client(timeout_ms)
                .map_err(|e| e.with_vendor(ProviderKind::OpenAi))?,
            api_key,
            text_model,
            object_model,
            base_url,
        })
    }

    async fn complete(&self, body: &Value) -> Result<String, ProviderError> {
        let url = format!("{}/chat/completions", self.base_url.trim_end_matches('/'));
        let resp = self
            .client
            .post(url)
            .bearer_auth(&self.api_key)
            .json(body)
            .send()
            .await
            .map_err(|e| {
                ProviderError::new(format!("HTTP request failed: {}", e))
                    .with_vendor(ProviderKind::OpenAi)
            })?;

        let status = resp.status();
        if !status.is_success() {
            let body_text = resp
                .text()
                .await
                .unwrap_or_else(|_| "Unable to read response body".to_string());
            return Err(ProviderError::from_response(
                ProviderKind::OpenAi,
                status.as_u16(),
                &body_text,
            ));
        }

        let parsed: ChatResponse = resp.json().await.map_err(|e| {
            ProviderError::new(format!("Malformed chat completion: {}", e))
                .with_vendor(ProviderKind::OpenAi)
                .with_error_type("invalid_response")
        })?;
        first_content(parsed)
    }
}

fn text_request(model: &str, prompt: &str) -> Value {
    json!({
        "model": model,
        "messages": [{"role": "user", "content": prompt}]
    })
}

fn object_request(model: &str, prompt: &str, schema: &ObjectSchema) -> Value {
    json!({
        "model": model,
        "messages": [
            {"role": "system", "content": schema.description},
            {"role": "user", "content": prompt}
        ],
        "response_format": {
            "type": "json_schema",
            "json_schema": {
                "name": schema.name,
                "schema": schema.schema,
                "strict": true
            }
        }
    })
}

fn first_content(resp: ChatResponse) -> Result<String, ProviderError> {
    let message = resp
        .choices
        .into_iter()
        .next()
        .map(|c| c.message)
        .ok_or_else(|| {
            ProviderError::new("No choices in chat completion")
                .with_vendor(ProviderKind::OpenAi)
                .with_error_type("invalid_response")
        })?;
    if let Some(refusal) = message.refusal {
        return Err(ProviderError::new(format!("Model refused: {}", refusal))
            .with_vendor(ProviderKind::OpenAi)
            .with_error_type("refusal"));
    }
    message.content.map(|c| c.trim().to_string()).ok_or_else(|| {
        ProviderError::new("Empty message content")
            .with_vendor(ProviderKind::OpenAi)
            .with_error_type("invalid_response")
    })
}

/// OpenAI tags: `invalid_api_key`, `rate_limit_exceeded`, `insufficient_quota`,
/// `invalid_request_error`.
pub fn classify(err: &ProviderError) -> FailureClass {
    let tag = err.error_type.as_deref().unwrap_or_default();
    match (err.status, tag) {
        (Some(401), _) | (_, "invalid_api_key") => FailureClass::Authentication,
        (Some(429), _) | (_, "rate_limit_exceeded") | (_, "insufficient_quota") => {
            FailureClass::RateLimit
        }
        (Some(400), _) | (_, "invalid_request_error") | (_, "invalid_response") => {
            FailureClass::Validation
        }
        _ if matches_auth_marker(err) => FailureClass::Authentication,
        _ => FailureClass::Unknown,
    }
}

#[async_trait]
impl LanguageModel for OpenAiClient {
    fn kind(&self) -> ProviderKind {
        ProviderKind::OpenAi
    }

    async fn generate_text(&self, prompt: &str) -> Result<String, ProviderError> {
        debug!(
            "OpenAI text generation (model={}, chars={})",
            self.text_model,
            prompt.len()
        );
        self.complete(&text_request(&self.text_model, prompt)).await
    }

    async fn generate_object(
        &self,
        prompt: &str,
        schema: &ObjectSchema,
    ) -> Result<Value, ProviderError> {
        debug!(
            "OpenAI object generation (model={}, schema={})",
            self.object_model, schema.name
        );
        let content = self
            .complete(&object_request(&self.object_model, prompt, schema))
            .await?;
        serde_json::from_str(&content).map_err(|e| {
            ProviderError::new(format!("Response is not valid JSON: {}", e))
                .with_vendor(ProviderKind::OpenAi)
                .with_error_type("invalid_response")
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schemas::metrics_schema;

    #[test]
    fn object_request_uses_strict_json_schema() {
        let body = object_request("gpt-4o", "rate it", &metrics_schema());
        assert_eq!(body["response_format"]["type"], "json_schema");
        assert_eq!(body["response_format"]["json_schema"]["strict"], true);
        assert_eq!(body["response_format"]["json_schema"]["name"], "idea_metrics");
        assert_eq!(body["messages"][1]["content"], "rate it");
    }

    #[test]
    fn refusal_is_an_error() {
        let resp: ChatResponse = serde_json::from_value(json!({
            "choices": [{"message": {"content": null, "refusal": "no"}}]
        }))
        .unwrap();
        let err = first_content(resp).unwrap_err();
        assert_eq!(err.error_type.as_deref(), Some("refusal"));
    }

    #[test]
    fn classifies_openai_error_tags() {
        let auth = ProviderError::new("Incorrect API key provided").with_vendor(ProviderKind::OpenAi);
        assert_eq!(classify(&auth), FailureClass::Authentication);
        let quota = ProviderError::new("quota").with_error_type("insufficient_quota");
        assert_eq!(classify(&quota), FailureClass::RateLimit);
        let bad = ProviderError::new("bad schema").with_status(400);
        assert_eq!(classify(&bad), FailureClass::Validation);
        let timeout = ProviderError::new("operation timed out");
        assert_eq!(classify(&timeout), FailureClass::Unknown);
    }
}
