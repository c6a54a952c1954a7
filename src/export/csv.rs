//! Two-column spreadsheet export.

use ::csv::{QuoteStyle, Terminator, WriterBuilder};

use crate::error::{IdeaLyzerError, Result};
use crate::frameworks::AnalysisResult;
use crate::frameworks::scoring::{format_score, format_thousands};

fn rows(result: &AnalysisResult, title: &str) -> Vec<[String; 2]> {
    let metrics = &result.frameworks.metrics;
    let bcg = &result.frameworks.bcg;
    let budget = &result.budget_estimate;
    let dollars = |v: u64| format!("${}", format_thousands(v));
    let pair = |k: &str, v: String| [k.to_string(), v];

    let mut rows = vec![
        pair("Metric", "Value".into()),
        pair("Idea Title", title.to_string()),
        pair("Quality Score", format_score(result.quality_score)),
        pair("Desirability", format_score(metrics.desirability)),
        pair("Viability", format_score(metrics.viability)),
        pair("Feasibility", format_score(metrics.feasibility)),
        pair("Sustainability", format_score(metrics.sustainability)),
        pair("BCG Category", bcg.category.as_str().to_string()),
        pair("Market Growth", format!("{}%", format_score(bcg.market_growth))),
        pair("Market Share", format!("{}%", format_score(bcg.market_share))),
        pair("Total Budget", dollars(budget.total)),
        pair("Development Cost", dollars(budget.breakdown.development)),
        pair("Marketing Cost", dollars(budget.breakdown.marketing)),
        pair("Operations Cost", dollars(budget.breakdown.operations)),
        pair("Legal Cost", dollars(budget.breakdown.legal)),
        pair("Timeline", budget.timeline.clone()),
    ];

    let swot = &result.frameworks.swot;
    let numbered: Vec<String> = result
        .recommendations
        .action_plan
        .iter()
        .enumerate()
        .map(|(i, step)| format!("{}. {}", i + 1, step))
        .collect();
    let blocks: [(&str, &[String]); 8] = [
        ("Strengths", &result.pros),
        ("Challenges", &result.cons),
        ("SWOT - Strengths", &swot.strengths),
        ("SWOT - Weaknesses", &swot.weaknesses),
        ("SWOT - Opportunities", &swot.opportunities),
        ("SWOT - Threats", &swot.threats),
        ("Suggested Names", &result.recommendations.startup_names),
        ("Action Plan", &numbered),
    ];
    for (heading, items) in blocks {
        rows.push(pair("", String::new()));
        rows.push(pair(heading, String::new()));
        rows.extend(items.iter().map(|item| pair("", item.clone())));
    }
    rows
}

/// Every cell quoted, quotes doubled, rows separated by `\n`.
pub fn csv_bytes(result: &AnalysisResult, title: &str) -> Result<Vec<u8>> {
    let mut writer = WriterBuilder::new()
        .quote_style(QuoteStyle::Always)
        .terminator(Terminator::Any(b'\n'))
        .from_writer(Vec::new());
    for row in rows(result, title) {
        writer.write_record(&row)?;
    }
    let mut bytes = writer.into_inner().map_err(|e| IdeaLyzerError::Export {
        message: format!("CSV flush failed: {}", e),
    })?;
    if bytes.last() == Some(&b'\n') {
        bytes.pop();
    }
    Ok(bytes)
}
