use std::fmt;

use async_trait::async_trait;
use serde_json::Value;

use crate::providers::ProviderKind;
use crate::schemas::ObjectSchema;

/// Coarse class of an upstream failure, decided per vendor.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureClass {
    Authentication,
    RateLimit,
    Validation,
    Unknown,
}

/// Failure reported by (or while talking to) an LLM vendor.
#[derive(Debug, Clone, PartialEq)]
pub struct ProviderError {
    pub vendor: Option<ProviderKind>,
    pub status: Option<u16>,
    /// Vendor error tag, e.g. `authentication_error` or `invalid_api_key`.
    pub error_type: Option<String>,
    pub message: String,
}

impl ProviderError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            vendor: None,
            status: None,
            error_type: None,
            message: message.into(),
        }
    }

    pub fn with_vendor(mut self, vendor: ProviderKind) -> Self {
        self.vendor = Some(vendor);
        self
    }

    pub fn with_status(mut self, status: u16) -> Self {
        self.status = Some(status);
        self
    }

    pub fn with_error_type(mut self, error_type: impl Into<String>) -> Self {
        self.error_type = Some(error_type.into());
        self
    }

    /// Build an error from a non-success HTTP response body.
    ///
    /// Both vendors wrap failures as `{"error": {"type", "message", "code"?}}`;
    /// a `code` wins over `type` because it is the more specific tag.
    pub fn from_response(vendor: ProviderKind, status: u16, body: &str) -> Self {
        let parsed: Option<Value> = serde_json::from_str(body).ok();
        let error_obj = parsed.as_ref().and_then(|v| v.get("error"));
        let error_type = error_obj
            .and_then(|e| {
                e.get("code")
                    .and_then(|c| c.as_str())
                    .or_else(|| e.get("type").and_then(|t| t.as_str()))
            })
            .map(str::to_string);
        let message = error_obj
            .and_then(|e| e.get("message"))
            .and_then(|m| m.as_str())
            .map(str::to_string)
            .unwrap_or_else(|| truncate_snippet(body.trim(), 500));

        Self {
            vendor: Some(vendor),
            status: Some(status),
            error_type,
            message,
        }
    }

    /// Lowercased text the classifiers match substrings against.
    pub fn haystack(&self) -> String {
        format!(
            "{} {}",
            self.error_type.as_deref().unwrap_or_default(),
            self.message
        )
        .to_lowercase()
    }
}

impl fmt::Display for ProviderError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(vendor) = self.vendor {
            write!(f, "{} ", vendor)?;
        }
        if let Some(status) = self.status {
            write!(f, "status {} ", status)?;
        }
        if let Some(ref tag) = self.error_type {
            write!(f, "[{}] ", tag)?;
        }
        write!(f, "{}", self.message)
    }
}

impl std::error::Error for ProviderError {}

/// A vendor model able to answer free-text and schema-constrained prompts.
#[async_trait]
pub trait LanguageModel: Send + Sync {
    fn kind(&self) -> ProviderKind;

    async fn generate_text(&self, prompt: &str) -> Result<String, ProviderError>;

    /// Returns the raw JSON object the vendor produced for `schema`.
    /// Conformance is checked by the caller.
    async fn generate_object(
        &self,
        prompt: &str,
        schema: &ObjectSchema,
    ) -> Result<Value, ProviderError>;
}

pub(crate) fn truncate_snippet(s: &str, max_chars: usize) -> String {
    if s.chars().count() <= max_chars {
        return s.to_string();
    }
    let cut: String = s.chars().take(max_chars).collect();
    format!("{}…", cut)
}
