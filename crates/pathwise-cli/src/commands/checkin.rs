use clap::Args;
use pathwise_core::TrainingPath;

use super::open_engine;

#[derive(Args)]
pub struct CheckinArgs {
    /// Mood, 1 (low) to 5 (high)
    mood: u8,
    /// Optional note
    #[arg(long)]
    note: Option<String>,
    /// Path the check-in relates to
    #[arg(long)]
    path: Option<TrainingPath>,
}

pub fn run(args: CheckinArgs) -> Result<(), Box<dyn std::error::Error>> {
    let mut engine = open_engine()?;
    let check_in = engine.record_check_in(args.mood, args.note, args.path)?;
    println!("Check-in recorded for {} (mood {})", check_in.date, check_in.mood);
    Ok(())
}
