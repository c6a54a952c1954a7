//! Analysis record and the business frameworks it is made of.
//!
//! Field names serialize in camelCase so that the JSON produced here is the
//! same document the dashboard and the exporters consume.

use serde::{Deserialize, Serialize};

use crate::error::{IdeaLyzerError, Result};

pub mod scoring;

pub use scoring::{BudgetBreakdown, BudgetEstimate, ScoreBand, quality_score};

/// Complete result of one analysis request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalysisResult {
    pub summary: String,
    pub pros: Vec<String>,
    pub cons: Vec<String>,
    pub evaluation: String,
    pub frameworks: Frameworks,
    pub budget_estimate: BudgetEstimate,
    pub quality_score: f64,
    pub recommendations: Recommendations,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Frameworks {
    pub swot: SwotAnalysis,
    pub bcg: BcgAnalysis,
    pub business_model: BusinessModelCanvas,
    pub metrics: AnalysisMetrics,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProsCons {
    pub pros: Vec<String>,
    pub cons: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SwotAnalysis {
    pub strengths: Vec<String>,
    pub weaknesses: Vec<String>,
    pub opportunities: Vec<String>,
    pub threats: Vec<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum BcgCategory {
    Star,
    CashCow,
    QuestionMark,
    Dog,
}

impl BcgCategory {
    pub fn as_str(&self) -> &'static str {
        match self {
            BcgCategory::Star => "star",
            BcgCategory::CashCow => "cash-cow",
            BcgCategory::QuestionMark => "question-mark",
            BcgCategory::Dog => "dog",
        }
    }

    /// Uppercase display label, e.g. `CASH COW`.
    pub fn label(&self) -> String {
        self.as_str().replace('-', " ").to_uppercase()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BcgAnalysis {
    pub category: BcgCategory,
    pub market_growth: f64,
    pub market_share: f64,
    pub reasoning: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BusinessModelCanvas {
    pub key_partners: Vec<String>,
    pub key_activities: Vec<String>,
    pub key_resources: Vec<String>,
    pub value_propositions: Vec<String>,
    pub customer_relationships: Vec<String>,
    pub channels: Vec<String>,
    pub customer_segments: Vec<String>,
    pub cost_structure: Vec<String>,
    pub revenue_streams: Vec<String>,
}

impl BusinessModelCanvas {
    /// The nine canvas blocks with their display titles, in canvas order.
    pub fn sections(&self) -> [(&'static str, &[String]); 9] {
        [
            ("Value Propositions", &self.value_propositions),
            ("Customer Segments", &self.customer_segments),
            ("Revenue Streams", &self.revenue_streams),
            ("Key Partners", &self.key_partners),
            ("Key Activities", &self.key_activities),
            ("Key Resources", &self.key_resources),
            ("Customer Relationships", &self.customer_relationships),
            ("Channels", &self.channels),
            ("Cost Structure", &self.cost_structure),
        ]
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AnalysisMetrics {
    pub desirability: f64,
    pub viability: f64,
    pub feasibility: f64,
    pub sustainability: f64,
}

impl AnalysisMetrics {
    pub fn named(&self) -> [(&'static str, f64); 4] {
        [
            ("Desirability", self.desirability),
            ("Viability", self.viability),
            ("Feasibility", self.feasibility),
            ("Sustainability", self.sustainability),
        ]
    }

    /// Every score must be a finite number within [1, 10].
    pub fn validate(&self) -> Result<()> {
        for (name, value) in self.named() {
            if !value.is_finite() || !(1.0..=10.0).contains(&value) {
                return Err(IdeaLyzerError::Validation {
                    message: format!("{} score {} is outside [1, 10]", name, value),
                });
            }
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BrandWheel {
    pub mission: String,
    pub vision: String,
    pub values: Vec<String>,
    pub personality: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Recommendations {
    pub startup_names: Vec<String>,
    pub brand_wheel: BrandWheel,
    pub elevator_pitch: String,
    pub action_plan: Vec<String>,
    pub improvements: Vec<String>,
}
