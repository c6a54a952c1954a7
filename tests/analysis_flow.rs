//! Submission to analysis to exported files, with a canned vendor.

use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use idealyzer::analysis::ModelFactory;
use idealyzer::clients::{LanguageModel, ProviderError};
use idealyzer::config::ModelConfig;
use idealyzer::export::{self, ExportFormat, PdfOptions};
use idealyzer::providers::{ProviderDescriptor, ProviderKind};
use idealyzer::research;
use idealyzer::schemas::ObjectSchema;
use idealyzer::{AnalysisResult, Analyzer, Credentials, IdeaContext, IdeaLyzerError, IdeaSubmission};
use serde_json::{Value, json};

#[derive(Clone, Copy)]
enum Vendor {
    Healthy,
    RevokedKey,
}

struct CannedModel {
    kind: ProviderKind,
    vendor: Vendor,
    log: Arc<Mutex<Vec<(ProviderKind, String)>>>,
}

impl CannedModel {
    fn record(&self, prompt: &str) -> Result<(), ProviderError> {
        self.log
            .lock()
            .unwrap()
            .push((self.kind, prompt.to_string()));
        match self.vendor {
            Vendor::Healthy => Ok(()),
            Vendor::RevokedKey => Err(ProviderError::new("invalid x-api-key")
                .with_vendor(self.kind)
                .with_status(401)
                .with_error_type("authentication_error")),
        }
    }
}

#[async_trait]
impl LanguageModel for CannedModel {
    fn kind(&self) -> ProviderKind {
        self.kind
    }

    async fn generate_text(&self, prompt: &str) -> Result<String, ProviderError> {
        self.record(prompt)?;
        Ok(format!("Answer from {}", self.kind))
    }

    async fn generate_object(
        &self,
        prompt: &str,
        schema: &ObjectSchema,
    ) -> Result<Value, ProviderError> {
        self.record(prompt)?;
        Ok(match schema.name {
            "pros_cons" => json!({"pros": ["Recurring revenue"], "cons": ["Capital heavy"]}),
            "swot_analysis" => json!({
                "strengths": ["Brand"], "weaknesses": ["Cash"],
                "opportunities": ["Export"], "threats": ["Copycats"]
            }),
            "bcg_matrix" => json!({
                "category": "cash-cow", "marketGrowth": 4, "marketShare": 35,
                "reasoning": "Mature niche"
            }),
            "business_model_canvas" => json!({
                "keyPartners": ["Farms"], "keyActivities": ["Sourcing"],
                "keyResources": ["Cold chain"], "valuePropositions": ["Fresh"],
                "customerRelationships": ["Subscription"], "channels": ["Web"],
                "customerSegments": ["Offices"], "costStructure": ["Logistics"],
                "revenueStreams": ["Boxes"]
            }),
            "idea_metrics" => json!({
                "desirability": 6, "viability": 6, "feasibility": 8, "sustainability": 4
            }),
            "recommendations" => json!({
                "startupNames": ["Crateful", "Harvest Hop"],
                "brandWheel": {
                    "mission": "Feed teams well", "vision": "Every office",
                    "values": ["Fresh"], "personality": ["Warm"]
                },
                "elevatorPitch": "Fresh produce boxes for offices.",
                "actionPlan": ["Sign three farms", "Pilot with two offices"],
                "improvements": ["Add snacks"]
            }),
            other => panic!("unexpected schema {other}"),
        })
    }
}

struct CannedFactory {
    anthropic: Vendor,
    log: Arc<Mutex<Vec<(ProviderKind, String)>>>,
}

impl ModelFactory for CannedFactory {
    fn build(
        &self,
        descriptor: &ProviderDescriptor,
    ) -> Result<Arc<dyn LanguageModel>, ProviderError> {
        let vendor = match descriptor.kind {
            ProviderKind::Anthropic => self.anthropic,
            ProviderKind::OpenAi => Vendor::Healthy,
        };
        Ok(Arc::new(CannedModel {
            kind: descriptor.kind,
            vendor,
            log: self.log.clone(),
        }))
    }
}

fn submission() -> IdeaSubmission {
    IdeaSubmission {
        title: "Office Produce Boxes".into(),
        description: "Weekly fresh produce delivered to offices".into(),
        key_features: vec!["Local farms".into(), "Flexible plans".into()],
        value_proposition: "Healthier teams".into(),
        research_data: research::search("sustainab"),
        ..IdeaSubmission::default()
    }
}

fn analyzer(
    credentials: Credentials,
    anthropic: Vendor,
) -> (Analyzer, Arc<Mutex<Vec<(ProviderKind, String)>>>) {
    let log = Arc::new(Mutex::new(Vec::new()));
    let analyzer = Analyzer::new(credentials, ModelConfig::default())
        .with_factory(Arc::new(CannedFactory {
            anthropic,
            log: log.clone(),
        }))
        .with_sampler(|| 0.0);
    (analyzer, log)
}

#[tokio::test]
async fn research_backed_analysis_exports_in_every_format() {
    let idea = submission();
    assert_eq!(idea.research_data.len(), 2);
    let ctx = IdeaContext::from_submission(&idea);
    assert!(ctx.has_research);

    let (analyzer, log) = analyzer(Credentials::new(Some("sk-ant"), None), Vendor::Healthy);
    let result = analyzer.run(&ctx).await.unwrap();

    assert_eq!(result.summary, "Answer from anthropic");
    assert_eq!(result.quality_score, 6.2);
    assert_eq!(result.budget_estimate.total, 50_000);
    assert_eq!(result.budget_estimate.breakdown.sum(), 50_000);
    assert_eq!(result.recommendations.startup_names[0], "Crateful");

    let prompts = log.lock().unwrap();
    assert_eq!(prompts.len(), 8);
    assert!(prompts[0].1.contains("relevant research papers"));
    assert!(prompts[0].1.contains("RELEVANT RESEARCH PAPERS"));
    drop(prompts);

    let dir = tempfile::tempdir().unwrap();
    let title = "Office Produce: Boxes";
    for format in [ExportFormat::Pdf, ExportFormat::Json, ExportFormat::Csv] {
        let outcome = export::export(format, &result, title, &PdfOptions::default(), dir.path());
        assert!(outcome.success, "{format} export failed: {:?}", outcome.error);
        let expected = format!("Office_Produce__Boxes_analysis.{}", format.extension());
        assert_eq!(outcome.filename.as_deref(), Some(expected.as_str()));
    }

    let pdf = std::fs::read(dir.path().join("Office_Produce__Boxes_analysis.pdf")).unwrap();
    assert!(pdf.starts_with(b"%PDF-1.4"));
    assert!(pdf.ends_with(b"%%EOF\n"));

    let json: Value = serde_json::from_slice(
        &std::fs::read(dir.path().join("Office_Produce__Boxes_analysis.json")).unwrap(),
    )
    .unwrap();
    assert_eq!(json["metadata"]["title"], title);
    let restored: AnalysisResult = serde_json::from_value(json["analysis"].clone()).unwrap();
    assert_eq!(restored, result);

    let csv = std::fs::read_to_string(dir.path().join("Office_Produce__Boxes_analysis.csv")).unwrap();
    assert!(csv.contains(r#""BCG Category","cash-cow""#));
    assert!(csv.ends_with(r#""","2. Pilot with two offices""#));
}

#[tokio::test]
async fn revoked_anthropic_key_falls_back_to_openai() {
    let (analyzer, log) = analyzer(Credentials::new(Some("sk-ant"), Some("sk-oai")), Vendor::RevokedKey);
    let ctx = IdeaContext::from_submission(&submission());
    let result = analyzer.run(&ctx).await.unwrap();

    assert_eq!(result.summary, "Answer from openai");
    let log = log.lock().unwrap();
    assert_eq!(log[0].0, ProviderKind::Anthropic);
    assert!(log[1..].iter().all(|(kind, _)| *kind == ProviderKind::OpenAi));
    assert_eq!(log.len(), 9);
}

#[tokio::test]
async fn revoked_key_without_alternative_surfaces_auth_error() {
    let (analyzer, _) = analyzer(Credentials::new(Some("sk-ant"), None), Vendor::RevokedKey);
    let err = analyzer
        .run(&IdeaContext::from_submission(&submission()))
        .await
        .unwrap_err();
    assert!(matches!(err, IdeaLyzerError::Authentication(_)));
    assert_eq!(err.public_message(), "Analysis failed");
}

#[cfg(feature = "live_providers")]
#[tokio::test]
async fn live_vendor_analysis() {
    let _ = dotenvy::dotenv();
    let credentials = Credentials::from_env();
    if !idealyzer::providers::has_provider(&credentials) {
        eprintln!("skipping: no provider key in environment");
        return;
    }
    let result = Analyzer::new(credentials, ModelConfig::default())
        .run(&IdeaContext::from_submission(&submission()))
        .await
        .unwrap();
    assert!((1.0..=10.0).contains(&result.quality_score));
}
