pub mod analysis;
pub mod clients;
pub mod comparison;
pub mod config;
pub mod error;
pub mod export;
pub mod frameworks;
pub mod http;
pub mod prompts;
pub mod providers;
pub mod research;
pub mod schemas;

pub use analysis::Analyzer;
pub use error::{IdeaLyzerError, Result};
pub use frameworks::AnalysisResult;
pub use prompts::{IdeaContext, IdeaSubmission};
pub use providers::Credentials;

