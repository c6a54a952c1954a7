use serde::{Deserialize, Serialize};
use std::net::SocketAddr;
use std::path::PathBuf;

/// Main configuration structure loaded from idealyzer.toml and environment variables.
///
/// API keys are deliberately absent: they are read per request through
/// [`crate::providers::Credentials`].
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct Config {
    pub models: ModelConfig,
    pub server: ServerConfig,
    pub export: ExportConfig,
}

/// Vendor model identifiers and endpoints
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ModelConfig {
    pub anthropic_model: String,
    pub openai_model: String,
    pub anthropic_base_url: String,
    pub openai_base_url: String,
    /// Per-call HTTP timeout for vendor requests
    pub provider_timeout_ms: u64,
}

impl Default for ModelConfig {
    fn default() -> Self {
        Self {
            anthropic_model: "claude-3-5-sonnet-20241022".to_string(),
            openai_model: "gpt-4o".to_string(),
            anthropic_base_url: "https://api.anthropic.com".to_string(),
            openai_base_url: "https://api.openai.com/v1".to_string(),
            provider_timeout_ms: 60_000,
        }
    }
}

/// HTTP boundary configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ServerConfig {
    pub http_bind: SocketAddr,
    /// Ceiling for one whole analysis request
    pub request_timeout_ms: u64,
    pub bearer_token: Option<String>,
    /// Upper bound on a multipart upload
    pub max_upload_bytes: usize,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            http_bind: SocketAddr::from(([127, 0, 0, 1], 8787)),
            request_timeout_ms: 180_000,
            bearer_token: None,
            max_upload_bytes: 25 * 1024 * 1024,
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ExportConfig {
    pub output_dir: PathBuf,
}

impl Default for ExportConfig {
    fn default() -> Self {
        Self {
            output_dir: PathBuf::from("."),
        }
    }
}

impl Config {
    /// Load configuration from TOML file and environment variables
    /// Uses IDEALYZER_CONFIG environment variable or defaults to "idealyzer.toml"
    pub fn load() -> anyhow::Result<Self> {
        // Load environment variables:
        // 1) IDEALYZER_ENV_FILE if set
        // 2) ./.env
        if let Ok(env_path) = std::env::var("IDEALYZER_ENV_FILE") {
            let _ = dotenvy::from_path(env_path);
        } else {
            let _ = dotenvy::from_path(".env");
        }

        let config_path =
            std::env::var("IDEALYZER_CONFIG").unwrap_or_else(|_| "idealyzer.toml".to_string());

        let mut config: Config = if let Ok(content) = std::fs::read_to_string(&config_path) {
            toml::from_str(&content)?
        } else {
            tracing::debug!("Config file {} not found, using defaults", config_path);
            Self::default()
        };

        config.apply_env_overrides();
        config.validate()?;
        Ok(config)
    }

    /// Environment wins over the TOML file.
    pub fn apply_env_overrides(&mut self) {
        if let Ok(model) = std::env::var("ANTHROPIC_MODEL") {
            self.models.anthropic_model = model;
        }
        if let Ok(model) = std::env::var("OPENAI_MODEL") {
            self.models.openai_model = model;
        }
        if let Ok(url) = std::env::var("ANTHROPIC_BASE_URL") {
            self.models.anthropic_base_url = url;
        }
        if let Ok(url) = std::env::var("OPENAI_BASE_URL") {
            self.models.openai_base_url = url;
        }
        if let Some(ms) = std::env::var("IDEALYZER_PROVIDER_TIMEOUT_MS")
            .ok()
            .and_then(|v| v.parse::<u64>().ok())
        {
            self.models.provider_timeout_ms = ms;
        }
        if let Ok(v) = std::env::var("IDEALYZER_HTTP_BIND") {
            match v.parse::<SocketAddr>() {
                Ok(bind) => self.server.http_bind = bind,
                Err(_) => tracing::warn!("Ignoring unparseable IDEALYZER_HTTP_BIND '{}'", v),
            }
        }
        if let Some(ms) = std::env::var("IDEALYZER_REQUEST_TIMEOUT_MS")
            .ok()
            .and_then(|v| v.parse::<u64>().ok())
        {
            self.server.request_timeout_ms = ms;
        }
        if let Ok(token) = std::env::var("IDEALYZER_BEARER_TOKEN")
            && !token.trim().is_empty()
        {
            self.server.bearer_token = Some(token.trim().to_string());
        }
        if let Ok(dir) = std::env::var("IDEALYZER_EXPORT_DIR") {
            self.export.output_dir = PathBuf::from(dir);
        }
    }

    pub fn validate(&self) -> anyhow::Result<()> {
        if self.models.anthropic_model.trim().is_empty() || self.models.openai_model.trim().is_empty()
        {
            anyhow::bail!("Model identifiers must not be empty");
        }
        for url in [&self.models.anthropic_base_url, &self.models.openai_base_url] {
            if !url.starts_with("http://") && !url.starts_with("https://") {
                anyhow::bail!("Provider base URL '{}' must start with http:// or https://", url);
            }
        }
        if self.models.provider_timeout_ms == 0 || self.server.request_timeout_ms == 0 {
            anyhow::bail!("Timeouts must be greater than zero");
        }
        if self.server.request_timeout_ms < self.models.provider_timeout_ms {
            tracing::warn!(
                "request_timeout_ms ({}) is below provider_timeout_ms ({}); analyses will be cut short",
                self.server.request_timeout_ms,
                self.models.provider_timeout_ms
            );
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_validate() {
        let config = Config::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.models.anthropic_model, "claude-3-5-sonnet-20241022");
        assert_eq!(config.models.openai_model, "gpt-4o");
        assert_eq!(config.server.http_bind.port(), 8787);
    }

    #[test]
    fn partial_toml_keeps_defaults() {
        let config: Config = toml::from_str(
            r#"
            [models]
            openai_model = "gpt-4o-mini"

            [server]
            request_timeout_ms = 5000
            "#,
        )
        .unwrap();
        assert_eq!(config.models.openai_model, "gpt-4o-mini");
        assert_eq!(config.models.anthropic_model, "claude-3-5-sonnet-20241022");
        assert_eq!(config.server.request_timeout_ms, 5000);
        assert_eq!(config.export.output_dir, PathBuf::from("."));
    }

    #[test]
    fn rejects_non_http_base_url() {
        let mut config = Config::default();
        config.models.openai_base_url = "ftp://example".into();
        assert!(config.validate().is_err());
    }
}
