use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use idealyzer::config::Config;
use idealyzer::export::{self, ExportFormat, PdfOptions};
use idealyzer::frameworks::AnalysisResult;
use idealyzer::{http, research};
use tracing::info;
use tracing_subscriber::EnvFilter;

/// Business idea analysis service
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Run the HTTP API
    Serve,
    /// Export a saved analysis (JSON as returned by /analyze)
    Export {
        #[arg(long)]
        input: PathBuf,
        #[arg(long)]
        title: String,
        #[arg(long, default_value = "pdf")]
        format: ExportFormat,
        /// Defaults to the configured export directory
        #[arg(long)]
        out_dir: Option<PathBuf>,
        /// Override the derived file name
        #[arg(long)]
        filename: Option<String>,
    },
    /// Search the research paper corpus
    Research { query: String },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("idealyzer=info,tower_http=info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let config = Config::load()?;

    match cli.command {
        Command::Serve => {
            info!("Starting IdeaLyzer");
            http::serve(Arc::new(config)).await
        }
        Command::Export {
            input,
            title,
            format,
            out_dir,
            filename,
        } => {
            let raw = std::fs::read(&input)
                .with_context(|| format!("Failed to read {}", input.display()))?;
            let result: AnalysisResult = serde_json::from_slice(&raw)
                .with_context(|| format!("{} is not an analysis result", input.display()))?;
            let dir = out_dir.unwrap_or(config.export.output_dir);
            let options = PdfOptions {
                filename,
                ..PdfOptions::default()
            };
            let outcome = export::export(format, &result, &title, &options, &dir);
            println!("{}", serde_json::to_string_pretty(&outcome)?);
            if !outcome.success {
                anyhow::bail!("Export failed");
            }
            Ok(())
        }
        Command::Research { query } => {
            let results = research::search(&query);
            println!("{}", serde_json::to_string_pretty(&results)?);
            Ok(())
        }
    }
}
