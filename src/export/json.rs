use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::frameworks::AnalysisResult;

pub const EXPORT_VERSION: &str = "1.0";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExportMetadata {
    pub title: String,
    pub exported_at: String,
    pub version: String,
}

/// Archive document: metadata plus the untouched analysis.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JsonExport {
    pub metadata: ExportMetadata,
    pub analysis: AnalysisResult,
}

pub fn json_bytes(
    result: &AnalysisResult,
    title: &str,
    exported_at: DateTime<Utc>,
) -> Result<Vec<u8>> {
    let doc = JsonExport {
        metadata: ExportMetadata {
            title: title.to_string(),
            exported_at: exported_at.to_rfc3339_opts(SecondsFormat::Millis, true),
            version: EXPORT_VERSION.to_string(),
        },
        analysis: result.clone(),
    };
    Ok(serde_json::to_vec_pretty(&doc)?)
}
