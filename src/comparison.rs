//! Side-by-side ranking of previously analysed ideas.

use std::cmp::Ordering;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::frameworks::{AnalysisResult, ScoreBand};

const SHORT_TITLE_CHARS: usize = 15;

/// An analysis the caller kept from an earlier request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StoredIdea {
    pub id: String,
    pub title: String,
    pub result: AnalysisResult,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum SortCriteria {
    #[default]
    QualityScore,
    Desirability,
    Viability,
    Feasibility,
}

impl SortCriteria {
    pub fn score(&self, result: &AnalysisResult) -> f64 {
        let metrics = &result.frameworks.metrics;
        match self {
            SortCriteria::QualityScore => result.quality_score,
            SortCriteria::Desirability => metrics.desirability,
            SortCriteria::Viability => metrics.viability,
            SortCriteria::Feasibility => metrics.feasibility,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RankedIdea {
    pub rank: usize,
    pub id: String,
    pub title: String,
    pub short_title: String,
    pub score: f64,
    pub band: ScoreBand,
    pub ui_class: &'static str,
}

/// Highest score first. Ties keep the caller's order.
pub fn rank(ideas: &[StoredIdea], criteria: SortCriteria) -> Vec<RankedIdea> {
    let mut scored: Vec<(&StoredIdea, f64)> = ideas
        .iter()
        .map(|idea| (idea, criteria.score(&idea.result)))
        .collect();
    scored.sort_by(|a, b| b.1.partial_cmp(&a.1).unwrap_or(Ordering::Equal));

    scored
        .into_iter()
        .enumerate()
        .map(|(i, (idea, score))| {
            let band = ScoreBand::for_score(score);
            RankedIdea {
                rank: i + 1,
                id: idea.id.clone(),
                title: idea.title.clone(),
                short_title: short_title(&idea.title),
                score,
                band,
                ui_class: band.ui_class(),
            }
        })
        .collect()
}

/// Chart label: at most 15 characters, then an ellipsis.
pub fn short_title(title: &str) -> String {
    if title.chars().count() > SHORT_TITLE_CHARS {
        let head: String = title.chars().take(SHORT_TITLE_CHARS).collect();
        format!("{}...", head)
    } else {
        title.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::export::sample_result;

    fn idea(id: &str, quality: f64, viability: f64) -> StoredIdea {
        let mut result = sample_result();
        result.quality_score = quality;
        result.frameworks.metrics.viability = viability;
        StoredIdea {
            id: id.into(),
            title: format!("Idea {}", id),
            result,
            created_at: None,
        }
    }

    #[test]
    fn ranks_by_quality_descending() {
        let ideas = vec![idea("a", 6.5, 9.0), idea("b", 8.1, 4.0), idea("c", 5.0, 7.0)];
        let ranked = rank(&ideas, SortCriteria::QualityScore);
        let ids: Vec<&str> = ranked.iter().map(|r| r.id.as_str()).collect();
        assert_eq!(ids, vec!["b", "a", "c"]);
        assert_eq!(ranked[0].rank, 1);
        assert_eq!(ranked[0].band, ScoreBand::Success);
        assert_eq!(ranked[1].ui_class, "text-yellow-500");
        assert_eq!(ranked[2].band, ScoreBand::Danger);
    }

    #[test]
    fn ranks_by_selected_metric() {
        let ideas = vec![idea("a", 6.5, 9.0), idea("b", 8.1, 4.0)];
        let ranked = rank(&ideas, SortCriteria::Viability);
        assert_eq!(ranked[0].id, "a");
        assert_eq!(ranked[0].score, 9.0);
    }

    #[test]
    fn ties_keep_input_order() {
        let ideas = vec![idea("x", 7.0, 5.0), idea("y", 7.0, 5.0)];
        let ranked = rank(&ideas, SortCriteria::QualityScore);
        assert_eq!(ranked[0].id, "x");
        assert_eq!(ranked[1].id, "y");
    }

    #[test]
    fn criteria_deserialize_from_camel_case() {
        let c: SortCriteria = serde_json::from_str("\"qualityScore\"").unwrap();
        assert_eq!(c, SortCriteria::QualityScore);
    }

    #[test]
    fn long_titles_are_shortened_for_charts() {
        assert_eq!(short_title("Solar Powered Drones"), "Solar Powered D...");
        assert_eq!(short_title("Short"), "Short");
    }
}
