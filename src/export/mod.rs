//! Report export to PDF, JSON and CSV.
//!
//! Each exporter renders the whole document in memory first and only then
//! writes the file, so a failed export never leaves a partial file behind.
//! Failures are reported through [`ExportOutcome`] rather than as errors.

pub mod csv;
pub mod json;
pub mod layout;
pub mod metrics;
pub mod pdf;
pub mod report;

use std::fmt;
use std::path::Path;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use tracing::{error, info};

use crate::error::{IdeaLyzerError, Result};
use crate::frameworks::AnalysisResult;
use layout::{Orientation, PageFormat, PageGeometry};
use metrics::{HelveticaMetrics, TextMeasurer};

static UNSAFE_FILENAME_CHARS: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"[^a-zA-Z0-9]").expect("static pattern"));

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExportFormat {
    Pdf,
    Json,
    Csv,
}

impl ExportFormat {
    pub fn extension(&self) -> &'static str {
        match self {
            ExportFormat::Pdf => "pdf",
            ExportFormat::Json => "json",
            ExportFormat::Csv => "csv",
        }
    }

    pub fn content_type(&self) -> &'static str {
        match self {
            ExportFormat::Pdf => "application/pdf",
            ExportFormat::Json => "application/json",
            ExportFormat::Csv => "text/csv",
        }
    }
}

impl fmt::Display for ExportFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.extension())
    }
}

impl FromStr for ExportFormat {
    type Err = IdeaLyzerError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "pdf" => Ok(ExportFormat::Pdf),
            "json" => Ok(ExportFormat::Json),
            "csv" => Ok(ExportFormat::Csv),
            other => Err(IdeaLyzerError::InvalidParams {
                message: format!("Unsupported export format '{}'", other),
            }),
        }
    }
}

/// `My Idea!` becomes `My_Idea__analysis.pdf`.
pub fn default_filename(title: &str, format: ExportFormat) -> String {
    format!(
        "{}_analysis.{}",
        UNSAFE_FILENAME_CHARS.replace_all(title, "_"),
        format.extension()
    )
}

/// Caller-supplied name with unsafe characters replaced, keeping one
/// extension; falls back to [`default_filename`] when absent or blank.
pub fn resolve_filename(requested: Option<&str>, title: &str, format: ExportFormat) -> String {
    let Some(name) = requested.map(str::trim).filter(|n| !n.is_empty()) else {
        return default_filename(title, format);
    };
    match name.rsplit_once('.') {
        Some((stem, ext))
            if !stem.is_empty()
                && !ext.is_empty()
                && ext.chars().all(|c| c.is_ascii_alphanumeric()) =>
        {
            format!("{}.{}", UNSAFE_FILENAME_CHARS.replace_all(stem, "_"), ext)
        }
        _ => UNSAFE_FILENAME_CHARS.replace_all(name, "_").into_owned(),
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PdfOptions {
    pub format: PageFormat,
    pub orientation: Orientation,
    pub filename: Option<String>,
}

/// Result of writing an export file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExportOutcome {
    pub success: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub filename: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl ExportOutcome {
    pub fn written(filename: impl Into<String>) -> Self {
        Self {
            success: true,
            filename: Some(filename.into()),
            error: None,
        }
    }

    pub fn failed(error: impl Into<String>) -> Self {
        Self {
            success: false,
            filename: None,
            error: Some(error.into()),
        }
    }
}

/// Render the PDF report to bytes.
pub fn pdf_bytes(
    result: &AnalysisResult,
    title: &str,
    options: &PdfOptions,
    measurer: &dyn TextMeasurer,
    generated_at: DateTime<Utc>,
) -> Result<Vec<u8>> {
    result.frameworks.metrics.validate()?;
    let geometry = PageGeometry::new(options.format, options.orientation);
    let pages = report::compose(result, title, geometry, measurer, generated_at);
    Ok(pdf::write_pdf(&pages, geometry, title, generated_at))
}

/// Render any format to bytes with default PDF options.
pub fn render_bytes(
    format: ExportFormat,
    result: &AnalysisResult,
    title: &str,
    at: DateTime<Utc>,
) -> Result<Vec<u8>> {
    match format {
        ExportFormat::Pdf => pdf_bytes(result, title, &PdfOptions::default(), &HelveticaMetrics, at),
        ExportFormat::Json => json::json_bytes(result, title, at),
        ExportFormat::Csv => csv::csv_bytes(result, title),
    }
}

fn write_file(dir: &Path, filename: String, rendered: Result<Vec<u8>>) -> ExportOutcome {
    let bytes = match rendered {
        Ok(bytes) => bytes,
        Err(e) => {
            error!("Export of {} failed: {}", filename, e);
            return ExportOutcome::failed(e.to_string());
        }
    };
    match std::fs::write(dir.join(&filename), &bytes) {
        Ok(()) => {
            info!("Exported {} ({} bytes)", filename, bytes.len());
            ExportOutcome::written(filename)
        }
        Err(e) => {
            error!("Writing {} failed: {}", filename, e);
            ExportOutcome::failed(e.to_string())
        }
    }
}

/// Write the paginated PDF report into `dir`.
pub fn render_document(
    result: &AnalysisResult,
    title: &str,
    options: &PdfOptions,
    dir: &Path,
) -> ExportOutcome {
    let filename = resolve_filename(options.filename.as_deref(), title, ExportFormat::Pdf);
    let rendered = pdf_bytes(result, title, options, &HelveticaMetrics, Utc::now());
    write_file(dir, filename, rendered)
}

pub fn to_json(
    result: &AnalysisResult,
    title: &str,
    dir: &Path,
    filename: Option<&str>,
) -> ExportOutcome {
    let filename = resolve_filename(filename, title, ExportFormat::Json);
    write_file(dir, filename, json::json_bytes(result, title, Utc::now()))
}

pub fn to_csv(
    result: &AnalysisResult,
    title: &str,
    dir: &Path,
    filename: Option<&str>,
) -> ExportOutcome {
    let filename = resolve_filename(filename, title, ExportFormat::Csv);
    write_file(dir, filename, csv::csv_bytes(result, title))
}

/// Dispatch on format; PDF uses `options`, the others only its filename.
pub fn export(
    format: ExportFormat,
    result: &AnalysisResult,
    title: &str,
    options: &PdfOptions,
    dir: &Path,
) -> ExportOutcome {
    match format {
        ExportFormat::Pdf => render_document(result, title, options, dir),
        ExportFormat::Json => to_json(result, title, dir, options.filename.as_deref()),
        ExportFormat::Csv => to_csv(result, title, dir, options.filename.as_deref()),
    }
}

#[cfg(test)]
pub(crate) fn sample_result() -> AnalysisResult {
    use crate::frameworks::*;

    let metrics = AnalysisMetrics {
        desirability: 8.0,
        viability: 7.0,
        feasibility: 6.0,
        sustainability: 8.0,
    };
    let list = |items: &[&str]| items.iter().map(|s| s.to_string()).collect::<Vec<_>>();
    AnalysisResult {
        summary: "Solar powered delivery drones for rural pharmacies.".into(),
        pros: list(&["Low running cost", "Clear demand"]),
        cons: list(&["Regulation", "Weather"]),
        evaluation: "## Market Potential\nLarge.".into(),
        frameworks: Frameworks {
            swot: SwotAnalysis {
                strengths: list(&["Cheap energy"]),
                weaknesses: list(&["Payload limits"]),
                opportunities: list(&["Rural health funding"]),
                threats: list(&["Incumbent couriers"]),
            },
            bcg: BcgAnalysis {
                category: BcgCategory::QuestionMark,
                market_growth: 12.5,
                market_share: 2.0,
                reasoning: "Fast growing market with a small current share.".into(),
            },
            business_model: BusinessModelCanvas {
                key_partners: list(&["Pharmacies"]),
                key_activities: list(&["Flight ops"]),
                key_resources: list(&["Drone fleet"]),
                value_propositions: list(&["Same-day medicine"]),
                customer_relationships: list(&["Subscription"]),
                channels: list(&["Direct sales"]),
                customer_segments: list(&["Rural clinics"]),
                cost_structure: list(&["Hardware"]),
                revenue_streams: list(&["Per delivery fee"]),
            },
            metrics,
        },
        budget_estimate: BudgetEstimate::from_unit(0.5),
        quality_score: quality_score(&metrics),
        recommendations: Recommendations {
            startup_names: list(&["SkyDose", "Pillwing"]),
            brand_wheel: BrandWheel {
                mission: "Medicine everywhere".into(),
                vision: "No clinic left behind".into(),
                values: list(&["Reliability"]),
                personality: list(&["Calm"]),
            },
            elevator_pitch: "We fly medicine to rural clinics.".into(),
            action_plan: list(&["Build prototype", "Ship beta"]),
            improvements: list(&["Partner with insurers"]),
        },
    }
}
