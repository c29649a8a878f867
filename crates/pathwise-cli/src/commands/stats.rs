use clap::Args;
use pathwise_core::TrainingPath;

use super::open_engine;

#[derive(Args)]
pub struct StatsArgs {
    #[arg(long)]
    path: Option<TrainingPath>,
    /// Window size in days (defaults to config `history.window_days`)
    #[arg(long)]
    days: Option<u32>,
}

pub fn run(args: StatsArgs) -> Result<(), Box<dyn std::error::Error>> {
    let engine = open_engine()?;
    let path = args.path.unwrap_or(engine.config().default_path);
    let days = args.days.unwrap_or(engine.config().history.window_days);

    let snapshot = engine.compute_analytics(path, days)?;
    println!("{}", serde_json::to_string_pretty(&snapshot)?);
    Ok(())
}
