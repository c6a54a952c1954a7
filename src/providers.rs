//! Provider selection between the two supported LLM vendors.
//!
//! Selection is a pure function of the [`Credentials`] handed in, so the
//! server re-reads credentials per request and tests inject them directly.

use std::fmt;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::clients::{
    AnthropicClient, FailureClass, LanguageModel, OpenAiClient, ProviderError, anthropic, openai,
};
use crate::config::ModelConfig;
use crate::error::{IdeaLyzerError, Result};

pub const ANTHROPIC_KEY_VAR: &str = "ANTHROPIC_API_KEY";
pub const OPENAI_KEY_VAR: &str = "OPENAI_API_KEY";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProviderKind {
    Anthropic,
    OpenAi,
}

impl ProviderKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ProviderKind::Anthropic => "anthropic",
            ProviderKind::OpenAi => "openai",
        }
    }

    pub fn other(&self) -> Self {
        match self {
            ProviderKind::Anthropic => ProviderKind::OpenAi,
            ProviderKind::OpenAi => ProviderKind::Anthropic,
        }
    }

    /// Vendor-specific classification of an upstream failure.
    pub fn classify(&self, err: &ProviderError) -> FailureClass {
        match self {
            ProviderKind::Anthropic => anthropic::classify(err),
            ProviderKind::OpenAi => openai::classify(err),
        }
    }
}

impl fmt::Display for ProviderKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// API keys for both vendors. Empty or blank keys count as absent.
#[derive(Clone, Default)]
pub struct Credentials {
    pub anthropic_api_key: Option<String>,
    pub openai_api_key: Option<String>,
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("anthropic", &self.has(ProviderKind::Anthropic))
            .field("openai", &self.has(ProviderKind::OpenAi))
            .finish()
    }
}

impl Credentials {
    pub fn new(anthropic: Option<&str>, openai: Option<&str>) -> Self {
        Self {
            anthropic_api_key: anthropic.map(str::to_string),
            openai_api_key: openai.map(str::to_string),
        }
    }

    /// Snapshot of the credential variables at call time.
    pub fn from_env() -> Self {
        Self {
            anthropic_api_key: std::env::var(ANTHROPIC_KEY_VAR).ok(),
            openai_api_key: std::env::var(OPENAI_KEY_VAR).ok(),
        }
    }

    pub fn key(&self, kind: ProviderKind) -> Option<&str> {
        let raw = match kind {
            ProviderKind::Anthropic => self.anthropic_api_key.as_deref(),
            ProviderKind::OpenAi => self.openai_api_key.as_deref(),
        };
        raw.map(str::trim).filter(|k| !k.is_empty())
    }

    pub fn has(&self, kind: ProviderKind) -> bool {
        self.key(kind).is_some()
    }
}

/// Everything needed to talk to one vendor for one request.
#[derive(Clone)]
pub struct ProviderDescriptor {
    pub kind: ProviderKind,
    pub text_model: String,
    pub object_model: String,
    pub vision_model: String,
    pub base_url: String,
    pub timeout_ms: u64,
    api_key: String,
}

impl fmt::Debug for ProviderDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ProviderDescriptor")
            .field("kind", &self.kind)
            .field("text_model", &self.text_model)
            .field("object_model", &self.object_model)
            .field("vision_model", &self.vision_model)
            .field("base_url", &self.base_url)
            .finish_non_exhaustive()
    }
}

impl ProviderDescriptor {
    fn build(kind: ProviderKind, api_key: &str, models: &ModelConfig) -> Self {
        let (model, base_url) = match kind {
            ProviderKind::Anthropic => (&models.anthropic_model, &models.anthropic_base_url),
            ProviderKind::OpenAi => (&models.openai_model, &models.openai_base_url),
        };
        Self {
            kind,
            text_model: model.clone(),
            object_model: model.clone(),
            vision_model: model.clone(),
            base_url: base_url.clone(),
            timeout_ms: models.provider_timeout_ms,
            api_key: api_key.to_string(),
        }
    }

    /// Instantiate the vendor client for this descriptor.
    pub fn model(&self) -> std::result::Result<Arc<dyn LanguageModel>, ProviderError> {
        let model: Arc<dyn LanguageModel> = match self.kind {
            ProviderKind::Anthropic => Arc::new(AnthropicClient::new(
                self.api_key.clone(),
                self.text_model.clone(),
                self.object_model.clone(),
                self.base_url.clone(),
                self.timeout_ms,
            )?),
            ProviderKind::OpenAi => Arc::new(OpenAiClient::new(
                self.api_key.clone(),
                self.text_model.clone(),
                self.object_model.clone(),
                self.base_url.clone(),
                self.timeout_ms,
            )?),
        };
        Ok(model)
    }
}

pub fn has_provider(credentials: &Credentials) -> bool {
    credentials.has(ProviderKind::Anthropic) || credentials.has(ProviderKind::OpenAi)
}

/// Anthropic if its key is present, otherwise OpenAI.
pub fn select_provider(
    credentials: &Credentials,
    models: &ModelConfig,
) -> Result<ProviderDescriptor> {
    for kind in [ProviderKind::Anthropic, ProviderKind::OpenAi] {
        if let Some(key) = credentials.key(kind) {
            return Ok(ProviderDescriptor::build(kind, key, models));
        }
    }
    Err(IdeaLyzerError::Config {
        message: format!(
            "No AI provider API key found. Please add either {} or {} to your environment variables.",
            ANTHROPIC_KEY_VAR, OPENAI_KEY_VAR
        ),
    })
}

/// The provider not chosen by [`select_provider`], only when both keys exist.
pub fn select_fallback_provider(
    credentials: &Credentials,
    models: &ModelConfig,
) -> Option<ProviderDescriptor> {
    if !(credentials.has(ProviderKind::Anthropic) && credentials.has(ProviderKind::OpenAi)) {
        return None;
    }
    let primary = select_provider(credentials, models).ok()?;
    let other = primary.kind.other();
    credentials
        .key(other)
        .map(|key| ProviderDescriptor::build(other, key, models))
}

/// Heuristic: status 401, or a known authentication tag/substring.
///
/// Errors tagged with a vendor go through that vendor's classifier; untagged
/// errors use the shared marker list.
pub fn is_authentication_failure(err: &ProviderError) -> bool {
    if err.status == Some(401) {
        return true;
    }
    match err.vendor {
        Some(kind) => kind.classify(err) == FailureClass::Authentication,
        None => crate::clients::matches_auth_marker(err),
    }
}

/// Upload limits for image attachments per vendor.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageLimits {
    pub max_image_bytes: usize,
    pub max_images: usize,
    pub supported_formats: &'static [&'static str],
}

const IMAGE_FORMATS: &[&str] = &["image/jpeg", "image/png", "image/gif", "image/webp"];

pub fn image_analysis_limits(kind: ProviderKind) -> ImageLimits {
    match kind {
        ProviderKind::Anthropic => ImageLimits {
            max_image_bytes: 5 * 1024 * 1024,
            max_images: 20,
            supported_formats: IMAGE_FORMATS,
        },
        ProviderKind::OpenAi => ImageLimits {
            max_image_bytes: 20 * 1024 * 1024,
            max_images: 10,
            supported_formats: IMAGE_FORMATS,
        },
    }
}
