//! Domain-specific error types for idealyzer

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::json;
use thiserror::Error;

use crate::clients::ProviderError;

/// Main error type for the idealyzer service
#[derive(Error, Debug)]
pub enum IdeaLyzerError {
    #[error("Configuration error: {message}")]
    Config { message: String },

    #[error("Validation error: {message}")]
    Validation { message: String },

    #[error("Authentication error: {0}")]
    Authentication(ProviderError),

    #[error("Provider error: {0}")]
    Provider(ProviderError),

    #[error("Analysis error: {message}")]
    Analysis { message: String },

    #[error("Export error: {message}")]
    Export { message: String },

    #[error("Serialization error: {message}")]
    Serialization { message: String },

    #[error("I/O error: {message}")]
    Io { message: String },

    #[error("Timeout error: {operation} timed out after {timeout_ms}ms")]
    Timeout { operation: String, timeout_ms: u64 },

    #[error("Invalid parameters: {message}")]
    InvalidParams { message: String },
}

impl IdeaLyzerError {
    /// The upstream provider failure carried by this error, if any.
    pub fn provider_error(&self) -> Option<&ProviderError> {
        match self {
            IdeaLyzerError::Authentication(err) | IdeaLyzerError::Provider(err) => Some(err),
            _ => None,
        }
    }

    pub fn status_code(&self) -> StatusCode {
        match self {
            IdeaLyzerError::InvalidParams { .. } => StatusCode::BAD_REQUEST,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Message shown to the HTTP caller. Upstream details stay in the logs.
    pub fn public_message(&self) -> String {
        match self {
            IdeaLyzerError::Config { message } | IdeaLyzerError::InvalidParams { message } => {
                message.clone()
            }
            IdeaLyzerError::Timeout { .. } => "Analysis timed out".to_string(),
            _ => "Analysis failed".to_string(),
        }
    }
}

impl From<ProviderError> for IdeaLyzerError {
    fn from(err: ProviderError) -> Self {
        IdeaLyzerError::Provider(err)
    }
}

impl From<anyhow::Error> for IdeaLyzerError {
    fn from(err: anyhow::Error) -> Self {
        IdeaLyzerError::Analysis {
            message: err.to_string(),
        }
    }
}

impl From<serde_json::Error> for IdeaLyzerError {
    fn from(err: serde_json::Error) -> Self {
        IdeaLyzerError::Serialization {
            message: err.to_string(),
        }
    }
}

impl From<std::io::Error> for IdeaLyzerError {
    fn from(err: std::io::Error) -> Self {
        IdeaLyzerError::Io {
            message: err.to_string(),
        }
    }
}

impl From<csv::Error> for IdeaLyzerError {
    fn from(err: csv::Error) -> Self {
        IdeaLyzerError::Export {
            message: format!("CSV write failed: {}", err),
        }
    }
}

impl From<axum::extract::multipart::MultipartError> for IdeaLyzerError {
    fn from(err: axum::extract::multipart::MultipartError) -> Self {
        IdeaLyzerError::InvalidParams {
            message: format!("Malformed multipart body: {}", err),
        }
    }
}

/// Convert IdeaLyzerError to an HTTP response with a flat `{error}` body
impl IntoResponse for IdeaLyzerError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        if status.is_server_error() {
            tracing::error!("Request failed: {}", self);
        } else {
            tracing::debug!("Request rejected: {}", self);
        }
        (status, Json(json!({ "error": self.public_message() }))).into_response()
    }
}

/// Result type alias for idealyzer operations
pub type Result<T> = std::result::Result<T, IdeaLyzerError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn invalid_params_map_to_bad_request() {
        let err = IdeaLyzerError::InvalidParams {
            message: "Query parameter is required".into(),
        };
        assert_eq!(err.status_code(), StatusCode::BAD_REQUEST);
        assert_eq!(err.public_message(), "Query parameter is required");
    }

    #[test]
    fn analysis_errors_hide_upstream_details() {
        let err = IdeaLyzerError::Provider(ProviderError::new("boom: secret body"));
        assert_eq!(err.status_code(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(err.public_message(), "Analysis failed");
        assert!(err.provider_error().is_some());
    }

    #[test]
    fn config_errors_surface_their_message() {
        let err = IdeaLyzerError::Config {
            message: "No AI provider API key found".into(),
        };
        assert_eq!(err.status_code(), StatusCode::INTERNAL_SERVER_ERROR);
        assert!(err.public_message().contains("No AI provider"));
    }
}
