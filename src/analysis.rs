//! Analysis orchestration: provider choice, the eight-step prompt sequence,
//! the single authentication fallback, and assembly of the final record.

use std::sync::Arc;

use serde::de::DeserializeOwned;
use tracing::{debug, info, warn};

use crate::clients::{LanguageModel, ProviderError};
use crate::config::ModelConfig;
use crate::error::{IdeaLyzerError, Result};
use crate::frameworks::{
    AnalysisMetrics, AnalysisResult, BcgAnalysis, BudgetEstimate, BusinessModelCanvas, Frameworks,
    ProsCons, Recommendations, SwotAnalysis, quality_score,
};
use crate::prompts::{AnalysisStep, IdeaContext};
use crate::providers::{
    Credentials, ProviderDescriptor, is_authentication_failure, select_fallback_provider,
    select_provider,
};

/// Builds a live model for a selected provider.
pub trait ModelFactory: Send + Sync {
    fn build(
        &self,
        descriptor: &ProviderDescriptor,
    ) -> std::result::Result<Arc<dyn LanguageModel>, ProviderError>;
}

/// Factory that talks to the real vendor APIs.
pub struct VendorModels;

impl ModelFactory for VendorModels {
    fn build(
        &self,
        descriptor: &ProviderDescriptor,
    ) -> std::result::Result<Arc<dyn LanguageModel>, ProviderError> {
        descriptor.model()
    }
}

/// Source of the uniform sample the budget is drawn from.
pub type BudgetSampler = fn() -> f64;

fn random_unit() -> f64 {
    rand::random::<f64>()
}

pub struct Analyzer {
    credentials: Credentials,
    models: ModelConfig,
    factory: Arc<dyn ModelFactory>,
    sampler: BudgetSampler,
}

impl Analyzer {
    pub fn new(credentials: Credentials, models: ModelConfig) -> Self {
        Self {
            credentials,
            models,
            factory: Arc::new(VendorModels),
            sampler: random_unit,
        }
    }

    pub fn with_factory(mut self, factory: Arc<dyn ModelFactory>) -> Self {
        self.factory = factory;
        self
    }

    pub fn with_sampler(mut self, sampler: BudgetSampler) -> Self {
        self.sampler = sampler;
        self
    }

    /// Run the full analysis for one idea.
    ///
    /// The primary provider is tried first. Only an authentication failure
    /// switches to the fallback, which re-runs the whole sequence once; any
    /// other failure is returned as-is.
    pub async fn run(&self, ctx: &IdeaContext) -> Result<AnalysisResult> {
        let primary = select_provider(&self.credentials, &self.models)?;
        info!(
            "Starting analysis with {} (model={}, research={})",
            primary.kind, primary.text_model, ctx.has_research
        );

        match self.run_with(&primary, ctx).await {
            Err(IdeaLyzerError::Authentication(err)) => {
                let Some(fallback) = select_fallback_provider(&self.credentials, &self.models)
                else {
                    return Err(IdeaLyzerError::Authentication(err));
                };
                warn!(
                    "{} rejected credentials ({}); retrying analysis with {}",
                    primary.kind, err, fallback.kind
                );
                self.run_with(&fallback, ctx).await
            }
            other => other,
        }
    }

    async fn run_with(
        &self,
        descriptor: &ProviderDescriptor,
        ctx: &IdeaContext,
    ) -> Result<AnalysisResult> {
        let model = self.factory.build(descriptor).map_err(upstream)?;
        let model = model.as_ref();

        let summary = text_step(model, AnalysisStep::Summary, ctx).await?;
        let evaluation = text_step(model, AnalysisStep::Evaluation, ctx).await?;
        let pros_cons: ProsCons = object_step(model, AnalysisStep::ProsCons, ctx).await?;
        let swot: SwotAnalysis = object_step(model, AnalysisStep::Swot, ctx).await?;
        let bcg: BcgAnalysis = object_step(model, AnalysisStep::Bcg, ctx).await?;
        let business_model: BusinessModelCanvas =
            object_step(model, AnalysisStep::BusinessModel, ctx).await?;
        let metrics: AnalysisMetrics = object_step(model, AnalysisStep::Metrics, ctx).await?;
        metrics.validate()?;
        let recommendations: Recommendations =
            object_step(model, AnalysisStep::Recommendations, ctx).await?;

        let quality_score = quality_score(&metrics);
        let budget_estimate = BudgetEstimate::from_unit((self.sampler)());
        info!(
            "Analysis complete via {} (quality_score={}, budget={})",
            descriptor.kind, quality_score, budget_estimate.total
        );

        Ok(AnalysisResult {
            summary,
            pros: pros_cons.pros,
            cons: pros_cons.cons,
            evaluation,
            frameworks: Frameworks {
                swot,
                bcg,
                business_model,
                metrics,
            },
            budget_estimate,
            quality_score,
            recommendations,
        })
    }
}

/// Authentication failures keep their own variant so `run` can fall back.
fn upstream(err: ProviderError) -> IdeaLyzerError {
    if is_authentication_failure(&err) {
        IdeaLyzerError::Authentication(err)
    } else {
        IdeaLyzerError::Provider(err)
    }
}

async fn text_step(
    model: &dyn LanguageModel,
    step: AnalysisStep,
    ctx: &IdeaContext,
) -> Result<String> {
    debug!("analysis.step {} via {}", step.name(), model.kind());
    model
        .generate_text(&step.prompt(ctx))
        .await
        .map_err(upstream)
}

async fn object_step<T: DeserializeOwned>(
    model: &dyn LanguageModel,
    step: AnalysisStep,
    ctx: &IdeaContext,
) -> Result<T> {
    debug!("analysis.step {} via {}", step.name(), model.kind());
    let schema = step.schema().ok_or_else(|| IdeaLyzerError::Analysis {
        message: format!("Step {} has no output schema", step.name()),
    })?;
    let value = model
        .generate_object(&step.prompt(ctx), &schema)
        .await
        .map_err(upstream)?;
    serde_json::from_value(value).map_err(|e| IdeaLyzerError::Validation {
        message: format!("{} response does not match schema: {}", step.name(), e),
    })
}
