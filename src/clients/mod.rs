pub mod anthropic;
pub mod openai;
pub mod traits;

pub use anthropic::AnthropicClient;
pub use openai::OpenAiClient;
pub use traits::{FailureClass, LanguageModel, ProviderError};

/// Substrings that mark an authentication failure regardless of vendor.
///
/// Heuristic: an unrelated error mentioning "unauthorized" will match, and a
/// new vendor error shape will not.
pub(crate) const AUTH_MARKERS: &[&str] = &[
    "authentication_error",
    "invalid_api_key",
    "invalid x-api-key",
    "incorrect api key",
    "unauthorized",
    "authentication failed",
];

pub(crate) fn matches_auth_marker(err: &ProviderError) -> bool {
    let haystack = err.haystack();
    AUTH_MARKERS.iter().any(|m| haystack.contains(m))
}

/// Build the reqwest client every vendor adapter shares.
pub(crate) fn build_http_client(timeout_ms: u64) -> Result<reqwest::Client, ProviderError> {
    reqwest::Client::builder()
        .timeout(std::time::Duration::from_millis(timeout_ms))
        .build()
        .map_err(|e| ProviderError::new(format!("Failed to build HTTP client: {}", e)))
}
