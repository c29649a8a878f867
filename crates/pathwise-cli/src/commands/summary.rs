//! Weekly summary commands for CLI.

use async_trait::async_trait;
use clap::Subcommand;
use pathwise_core::{GenerationError, SummaryRequest, TextGenerator, TrainingPath};

use super::open_engine;

#[derive(Subcommand)]
pub enum SummaryAction {
    /// Show the generator request for a window
    Request {
        #[arg(long)]
        path: Option<TrainingPath>,
        #[arg(long)]
        days: Option<u32>,
        /// Journal excerpt, oldest first (repeatable)
        #[arg(long = "journal")]
        journal: Vec<String>,
    },
    /// Build the weekly summary
    Weekly {
        #[arg(long)]
        path: Option<TrainingPath>,
        #[arg(long)]
        days: Option<u32>,
        /// Journal excerpt, oldest first (repeatable)
        #[arg(long = "journal")]
        journal: Vec<String>,
    },
}

/// Generator used when no provider is configured. Always unavailable, so
/// summaries use the templated narrative.
struct OfflineGenerator;

#[async_trait]
impl TextGenerator for OfflineGenerator {
    fn name(&self) -> &str {
        "offline"
    }

    async fn generate(&self, _request: &SummaryRequest) -> Result<String, GenerationError> {
        Err(GenerationError::Failed("no generator configured".into()))
    }
}

pub fn run(action: SummaryAction) -> Result<(), Box<dyn std::error::Error>> {
    let engine = open_engine()?;
    let default_path = engine.config().default_path;
    let default_days = engine.config().history.window_days;

    match action {
        SummaryAction::Request { path, days, journal } => {
            let request = engine.build_summary_request(
                path.unwrap_or(default_path),
                days.unwrap_or(default_days),
                &journal,
            )?;
            println!("{}", serde_json::to_string_pretty(&request)?);
        }
        SummaryAction::Weekly { path, days, journal } => {
            let runtime = tokio::runtime::Runtime::new()?;
            let summary = runtime.block_on(engine.generate_weekly_summary(
                path.unwrap_or(default_path),
                days.unwrap_or(default_days),
                &journal,
                &OfflineGenerator,
            ))?;
            println!("{}", serde_json::to_string_pretty(&summary)?);
        }
    }
    Ok(())
}
