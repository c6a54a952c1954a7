//! HTTP boundary for the analysis service.
//!
//! Axum router with optional bearer authentication. Analysis runs under a
//! whole-request timeout; report rendering runs on the blocking pool.

use std::sync::Arc;
use std::time::Duration;

use axum::{
    Json, Router,
    body::{Body, Bytes},
    extract::{DefaultBodyLimit, Multipart, Path, State},
    http::{HeaderMap, HeaderValue, StatusCode, header},
    middleware,
    response::{IntoResponse, Response},
    routing::{get, post},
};
use chrono::Utc;
use serde::Deserialize;
use serde::de::DeserializeOwned;
use serde_json::{Value, json};
use tower_http::cors::{Any, CorsLayer};
use uuid::Uuid;

use crate::analysis::{Analyzer, ModelFactory, VendorModels};
use crate::comparison::{self, SortCriteria, StoredIdea};
use crate::config::Config;
use crate::error::{IdeaLyzerError, Result};
use crate::export::{self, ExportFormat, PdfOptions};
use crate::frameworks::AnalysisResult;
use crate::prompts::{IdeaContext, IdeaSubmission};
use crate::providers::{Credentials, ImageLimits, image_analysis_limits, select_provider};
use crate::research;

/// Where request handlers get API keys from.
#[derive(Clone, Debug)]
pub enum CredentialSource {
    /// Re-read the process environment on every request
    Environment,
    Fixed(Credentials),
}

impl CredentialSource {
    pub fn current(&self) -> Credentials {
        match self {
            CredentialSource::Environment => Credentials::from_env(),
            CredentialSource::Fixed(creds) => creds.clone(),
        }
    }
}

/// Shared state for HTTP handlers
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub credentials: CredentialSource,
    pub factory: Arc<dyn ModelFactory>,
}

impl AppState {
    pub fn new(config: Arc<Config>) -> Self {
        Self {
            config,
            credentials: CredentialSource::Environment,
            factory: Arc::new(VendorModels),
        }
    }

    pub fn with_credentials(mut self, credentials: Credentials) -> Self {
        self.credentials = CredentialSource::Fixed(credentials);
        self
    }

    pub fn with_factory(mut self, factory: Arc<dyn ModelFactory>) -> Self {
        self.factory = factory;
        self
    }
}

/// Health check endpoint
pub async fn health_handler() -> impl IntoResponse {
    "ok"
}

fn parse_body<T: DeserializeOwned>(body: &Bytes) -> Result<T> {
    serde_json::from_slice(body).map_err(|e| IdeaLyzerError::InvalidParams {
        message: format!("Invalid JSON body: {}", e),
    })
}

/// JSON-encoded multipart field; an empty field means the default.
fn parse_json_field<T: DeserializeOwned + Default>(name: &str, raw: &str) -> Result<T> {
    if raw.trim().is_empty() {
        return Ok(T::default());
    }
    serde_json::from_str(raw).map_err(|e| IdeaLyzerError::InvalidParams {
        message: format!("Field '{}' is not valid JSON: {}", name, e),
    })
}

async fn read_submission(mut multipart: Multipart, limits: &ImageLimits) -> Result<IdeaSubmission> {
    let mut idea = IdeaSubmission::default();
    let mut images = 0usize;

    while let Some(field) = multipart.next_field().await? {
        let name = field.name().unwrap_or_default().to_string();
        match name.as_str() {
            "title" => idea.title = field.text().await?,
            "description" => idea.description = field.text().await?,
            "valueProposition" => idea.value_proposition = field.text().await?,
            "concept" => idea.concept = field.text().await?,
            "source" => idea.source = field.text().await?,
            "keyFeatures" => idea.key_features = parse_json_field(&name, &field.text().await?)?,
            "background" => {
                let raw = field.text().await?;
                idea.background = if raw.trim().is_empty() {
                    json!({})
                } else {
                    parse_json_field(&name, &raw)?
                };
            }
            "researchData" => idea.research_data = parse_json_field(&name, &field.text().await?)?,
            "files" => {
                let file_name = field.file_name().unwrap_or("unnamed").to_string();
                let content_type = field.content_type().unwrap_or_default().to_string();
                let bytes = field.bytes().await?;
                if content_type == "text/plain" {
                    idea.file_content.push_str(&String::from_utf8_lossy(&bytes));
                    idea.file_content.push('\n');
                } else if content_type.starts_with("image/") {
                    images += 1;
                    if !limits.supported_formats.contains(&content_type.as_str())
                        || bytes.len() > limits.max_image_bytes
                        || images > limits.max_images
                    {
                        tracing::warn!(
                            "Skipping image {} ({}, {} bytes): outside provider limits",
                            file_name,
                            content_type,
                            bytes.len()
                        );
                    } else {
                        tracing::debug!("Image {} accepted but not analysed", file_name);
                    }
                } else {
                    tracing::debug!("Ignoring attachment {} ({})", file_name, content_type);
                }
            }
            other => tracing::debug!("Ignoring unknown form field '{}'", other),
        }
    }
    Ok(idea)
}

/// Run the full analysis for a submitted idea.
pub async fn analyze_handler(
    State(state): State<AppState>,
    multipart: Multipart,
) -> Result<Json<AnalysisResult>> {
    let credentials = state.credentials.current();
    let primary = select_provider(&credentials, &state.config.models)?;
    let idea = read_submission(multipart, &image_analysis_limits(primary.kind)).await?;
    let request_id = Uuid::new_v4();
    tracing::info!(
        "analyze {} called (provider={}, title_len={}, research_papers={})",
        request_id,
        primary.kind,
        idea.title.len(),
        idea.research_data.len()
    );

    let ctx = IdeaContext::from_submission(&idea);
    let analyzer = Analyzer::new(credentials, state.config.models.clone())
        .with_factory(state.factory.clone());
    let timeout_ms = state.config.server.request_timeout_ms;
    let result = tokio::time::timeout(Duration::from_millis(timeout_ms), analyzer.run(&ctx))
        .await
        .map_err(|_| IdeaLyzerError::Timeout {
            operation: "analysis".to_string(),
            timeout_ms,
        })?
        .inspect_err(|e| tracing::error!("analyze {} failed: {}", request_id, e))?;
    tracing::info!("analyze {} done (quality={})", request_id, result.quality_score);
    Ok(Json(result))
}

#[derive(Deserialize)]
struct SearchRequest {
    #[serde(default)]
    query: Value,
}

pub async fn research_search_handler(body: Bytes) -> Result<Json<Value>> {
    let request: SearchRequest = parse_body(&body)?;
    let query = match request.query.as_str() {
        Some(q) if !q.is_empty() => q,
        _ => {
            return Err(IdeaLyzerError::InvalidParams {
                message: "Query parameter is required".to_string(),
            });
        }
    };
    let results = research::search(query);
    tracing::debug!("research search '{}' matched {}", query.trim(), results.len());
    Ok(Json(json!({
        "success": true,
        "count": results.len(),
        "data": results,
    })))
}

pub async fn research_get_handler() -> impl IntoResponse {
    (
        StatusCode::METHOD_NOT_ALLOWED,
        Json(json!({"error": "GET method not allowed. Use POST with query parameter."})),
    )
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct ExportRequest {
    result: Option<AnalysisResult>,
    idea_title: Option<String>,
    #[serde(default)]
    options: PdfOptions,
}

/// Render an export and return it as a download.
pub async fn export_handler(Path(format): Path<String>, body: Bytes) -> Result<Response> {
    let format: ExportFormat = format.parse()?;
    let request: ExportRequest = parse_body(&body)?;
    let (Some(result), Some(title)) = (request.result, request.idea_title.filter(|t| !t.is_empty()))
    else {
        return Err(IdeaLyzerError::InvalidParams {
            message: "Missing required fields: result and ideaTitle".to_string(),
        });
    };
    let options = request.options;
    let filename = export::resolve_filename(options.filename.as_deref(), &title, format);

    let bytes = tokio::task::spawn_blocking(move || match format {
        ExportFormat::Pdf => export::pdf_bytes(
            &result,
            &title,
            &options,
            &export::metrics::HelveticaMetrics,
            Utc::now(),
        ),
        other => export::render_bytes(other, &result, &title, Utc::now()),
    })
    .await
    .map_err(|e| IdeaLyzerError::Export {
        message: format!("Render task failed: {}", e),
    })??;

    let mut headers = HeaderMap::new();
    headers.insert(
        header::CONTENT_TYPE,
        HeaderValue::from_static(format.content_type()),
    );
    let disposition = HeaderValue::from_str(&format!("attachment; filename=\"{}\"", filename))
        .map_err(|_| IdeaLyzerError::InvalidParams {
            message: "Filename is not a valid header value".to_string(),
        })?;
    headers.insert(header::CONTENT_DISPOSITION, disposition);
    tracing::info!("Exported {} ({} bytes)", filename, bytes.len());
    Ok((headers, bytes).into_response())
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct CompareRequest {
    ideas: Vec<StoredIdea>,
    #[serde(default)]
    sort_by: SortCriteria,
}

pub async fn compare_handler(body: Bytes) -> Result<Json<Value>> {
    let request: CompareRequest = parse_body(&body)?;
    let ranking = comparison::rank(&request.ideas, request.sort_by);
    Ok(Json(json!({
        "sortBy": request.sort_by,
        "ranking": ranking,
    })))
}

fn unauthorized() -> Response {
    (
        StatusCode::UNAUTHORIZED,
        Json(json!({"error": "Unauthorized"})),
    )
        .into_response()
}

/// Build the application router.
pub fn router(state: AppState) -> Router {
    let bearer = state.config.server.bearer_token.clone();
    let body_limit = state.config.server.max_upload_bytes;

    Router::new()
        .route("/health", get(health_handler))
        .route("/analyze", post(analyze_handler))
        .route(
            "/research/search",
            post(research_search_handler).get(research_get_handler),
        )
        .route("/export/:format", post(export_handler))
        .route("/compare", post(compare_handler))
        .layer(DefaultBodyLimit::max(body_limit))
        // Bearer auth only when a token is configured
        .layer(middleware::from_fn_with_state(
            bearer,
            |State(token): State<Option<String>>,
             req: axum::http::Request<Body>,
             next: axum::middleware::Next| async move {
                // Allow /health without auth
                if req.uri().path() == "/health" {
                    return next.run(req).await;
                }
                let Some(expected) = token else {
                    return next.run(req).await;
                };
                let header_ok = req
                    .headers()
                    .get(header::AUTHORIZATION)
                    .and_then(|h| h.to_str().ok())
                    .map(|v| v == format!("Bearer {}", expected))
                    .unwrap_or(false);
                if !header_ok {
                    return unauthorized();
                }
                next.run(req).await
            },
        ))
        // Outermost, so preflights are answered before the bearer check
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .with_state(state)
}

/// Start the HTTP server
pub async fn serve(config: Arc<Config>) -> anyhow::Result<()> {
    let bind = config.server.http_bind;
    if config.server.bearer_token.is_none() && !bind.ip().is_loopback() {
        tracing::warn!(
            "Serving on {} without IDEALYZER_BEARER_TOKEN; every client can spend provider credits",
            bind
        );
    }
    let app = router(AppState::new(config));

    let listener = tokio::net::TcpListener::bind(bind)
        .await
        .map_err(|e| anyhow::anyhow!("Failed to bind HTTP listener: {}", e))?;
    tracing::info!("Starting HTTP server on {}", bind);

    axum::serve(listener, app)
        .await
        .map_err(|e| anyhow::anyhow!("HTTP server error: {}", e))?;
    Ok(())
}
