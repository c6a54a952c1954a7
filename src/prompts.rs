//! Prompt construction: the idea context and the fixed prompt per analysis step.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::research::ResearchPaper;
use crate::schemas::{self, ObjectSchema};

/// Everything the submitter told us about the idea.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct IdeaSubmission {
    pub title: String,
    pub description: String,
    pub key_features: Vec<String>,
    pub value_proposition: String,
    pub concept: String,
    pub background: Value,
    pub source: String,
    /// Concatenated contents of plain-text attachments
    pub file_content: String,
    pub research_data: Vec<ResearchPaper>,
}

/// Flattened prompt text for one request.
#[derive(Debug, Clone, PartialEq)]
pub struct IdeaContext {
    pub text: String,
    pub has_research: bool,
}

impl IdeaContext {
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            has_research: false,
        }
    }

    pub fn from_submission(idea: &IdeaSubmission) -> Self {
        let background = if idea.background.is_null() {
            "{}".to_string()
        } else {
            idea.background.to_string()
        };

        let mut text = format!(
            "STARTUP IDEA ANALYSIS REQUEST\n\n\
             Title: {}\n\
             Description: {}\n\
             Key Features: {}\n\
             Value Proposition: {}\n\
             Implementation Concept: {}\n\
             Background: {}\n\
             Source: {}\n\
             Additional File Content: {}",
            idea.title,
            idea.description,
            idea.key_features.join(", "),
            idea.value_proposition,
            idea.concept,
            background,
            idea.source,
            idea.file_content,
        );

        if !idea.research_data.is_empty() {
            text.push_str("\n\nRELEVANT RESEARCH PAPERS:\n");
            let papers: Vec<String> = idea.research_data.iter().map(research_line).collect();
            text.push_str(&papers.join("\n"));
        }

        Self {
            text: text.trim().to_string(),
            has_research: !idea.research_data.is_empty(),
        }
    }
}

fn research_line(paper: &ResearchPaper) -> String {
    let year = paper.year.map(|y| format!(" ({})", y)).unwrap_or_default();
    format!(
        "- {}{} by {}\n  Description: {}\n  Subjects: {}",
        paper.title,
        year,
        paper.authors,
        paper.description,
        paper.subjects.join(", ")
    )
}

const SWOT_PROMPT: &str = "Analyze this startup idea using the SWOT framework. Identify:
- Strengths: Internal positive factors
- Weaknesses: Internal negative factors
- Opportunities: External positive factors
- Threats: External negative factors

Provide 3-5 specific points for each category.";

const BCG_PROMPT: &str = "Analyze this startup idea using the BCG Matrix. Determine:
- Market growth rate (high/low)
- Relative market share (high/low)
- Category classification (Star, Cash Cow, Question Mark, or Dog)
- Reasoning for the classification

Provide numerical estimates where possible.";

const BUSINESS_MODEL_PROMPT: &str = "Create a Business Model Canvas for this startup idea. Define:
- Key Partners: Who are the key partners and suppliers?
- Key Activities: What key activities does the value proposition require?
- Key Resources: What key resources does the value proposition require?
- Value Propositions: What value do we deliver to the customer?
- Customer Relationships: What type of relationship does each customer segment expect?
- Channels: Through which channels do our customer segments want to be reached?
- Customer Segments: For whom are we creating value?
- Cost Structure: What are the most important costs inherent in our business model?
- Revenue Streams: For what value are our customers really willing to pay?";

const METRICS_PROMPT: &str = "Evaluate this startup idea across four key metrics (scale 1-10):
- Desirability: Does this create real value for customers/users?
- Viability: Does this have potential to be financially sustainable?
- Feasibility: Is this technically and operationally feasible?
- Sustainability: Does this create positive long-term impact?

Provide scores and detailed reasoning for each metric.";

const RECOMMENDATIONS_PROMPT: &str = "Based on this startup idea analysis, provide:
- 5 potential startup names
- Brand wheel (mission, vision, 3-5 brand values, 3-5 personality traits)
- Elevator pitch (30-second version)
- 5-step action plan for next 100 days
- 3-5 key improvements or alternatives to consider";

const EVALUATION_HEADINGS: &str = "Structure the answer in Markdown with exactly these headings:
## Market Potential
## Competitive Advantages
## Key Challenges
## Implementation Considerations";

/// The eight analysis steps, in the order they are issued.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AnalysisStep {
    Summary,
    Evaluation,
    ProsCons,
    Swot,
    Bcg,
    BusinessModel,
    Metrics,
    Recommendations,
}

impl AnalysisStep {
    pub const SEQUENCE: [AnalysisStep; 8] = [
        AnalysisStep::Summary,
        AnalysisStep::Evaluation,
        AnalysisStep::ProsCons,
        AnalysisStep::Swot,
        AnalysisStep::Bcg,
        AnalysisStep::BusinessModel,
        AnalysisStep::Metrics,
        AnalysisStep::Recommendations,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            AnalysisStep::Summary => "summary",
            AnalysisStep::Evaluation => "evaluation",
            AnalysisStep::ProsCons => "pros_cons",
            AnalysisStep::Swot => "swot",
            AnalysisStep::Bcg => "bcg",
            AnalysisStep::BusinessModel => "business_model",
            AnalysisStep::Metrics => "metrics",
            AnalysisStep::Recommendations => "recommendations",
        }
    }

    /// Schema for structured steps; `None` for the two free-text steps.
    pub fn schema(&self) -> Option<ObjectSchema> {
        match self {
            AnalysisStep::Summary | AnalysisStep::Evaluation => None,
            AnalysisStep::ProsCons => Some(schemas::pros_cons_schema()),
            AnalysisStep::Swot => Some(schemas::swot_schema()),
            AnalysisStep::Bcg => Some(schemas::bcg_schema()),
            AnalysisStep::BusinessModel => Some(schemas::business_model_schema()),
            AnalysisStep::Metrics => Some(schemas::metrics_schema()),
            AnalysisStep::Recommendations => Some(schemas::recommendations_schema()),
        }
    }

    pub fn prompt(&self, ctx: &IdeaContext) -> String {
        let idea = &ctx.text;
        let research = ctx.has_research;
        match self {
            AnalysisStep::Summary if research => format!(
                "Provide a brief 2-3 sentence summary of this startup idea, incorporating insights from the relevant research papers provided: {}",
                idea
            ),
            AnalysisStep::Summary => format!(
                "Provide a brief 2-3 sentence summary of this startup idea: {}",
                idea
            ),
            AnalysisStep::Evaluation if research => format!(
                "Provide a comprehensive evaluation of this startup idea, including market potential, competitive advantages, and key challenges. Pay special attention to how the provided research papers support or challenge the idea's viability.\n\n{}\n\n{}",
                EVALUATION_HEADINGS, idea
            ),
            AnalysisStep::Evaluation => format!(
                "Provide a comprehensive evaluation of this startup idea, including market potential, competitive advantages, and key challenges.\n\n{}\n\n{}",
                EVALUATION_HEADINGS, idea
            ),
            AnalysisStep::ProsCons if research => format!(
                "Analyze this startup idea and provide 4-6 key pros and 4-6 key cons. Consider how the research papers provided support or challenge different aspects: {}",
                idea
            ),
            AnalysisStep::ProsCons => format!(
                "Analyze this startup idea and provide 4-6 key pros and 4-6 key cons: {}",
                idea
            ),
            AnalysisStep::Swot if research => format!(
                "{}\n\nWhen analyzing, pay special attention to how the provided research papers inform each aspect of the SWOT analysis.\n\nIdea: {}",
                SWOT_PROMPT, idea
            ),
            AnalysisStep::Swot => format!("{}\n\nIdea: {}", SWOT_PROMPT, idea),
            AnalysisStep::Bcg => format!("{}\n\nIdea: {}", BCG_PROMPT, idea),
            AnalysisStep::BusinessModel => format!("{}\n\nIdea: {}", BUSINESS_MODEL_PROMPT, idea),
            AnalysisStep::Metrics => format!("{}\n\nIdea: {}", METRICS_PROMPT, idea),
            AnalysisStep::Recommendations => {
                format!("{}\n\nIdea: {}", RECOMMENDATIONS_PROMPT, idea)
            }
        }
    }
}
