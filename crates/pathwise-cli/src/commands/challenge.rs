//! Daily challenge commands for CLI.

use clap::Subcommand;
use pathwise_core::{DateRange, Difficulty, EffortLevel, HistoryStore, TrainingPath};
use uuid::Uuid;

use super::open_engine;

#[derive(Subcommand)]
pub enum ChallengeAction {
    /// Show (or select) today's challenge
    Today {
        /// Training path (defaults to config `default_path`)
        #[arg(long)]
        path: Option<TrainingPath>,
        /// Difficulty (defaults to config `default_difficulty`)
        #[arg(long)]
        difficulty: Option<Difficulty>,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Mark a challenge completed
    Complete {
        /// Challenge ID
        id: Uuid,
        /// Perceived effort, 1-5
        #[arg(long)]
        effort: Option<u8>,
        /// Free-form notes
        #[arg(long)]
        notes: Option<String>,
    },
    /// Skip a challenge
    Skip {
        /// Challenge ID
        id: Uuid,
        /// Why it was skipped
        #[arg(long)]
        reason: Option<String>,
    },
    /// List past challenges
    History {
        #[arg(long)]
        path: Option<TrainingPath>,
        /// Number of days to look back
        #[arg(long, default_value_t = 7)]
        days: u32,
    },
}

pub fn run(action: ChallengeAction) -> Result<(), Box<dyn std::error::Error>> {
    let mut engine = open_engine()?;

    match action {
        ChallengeAction::Today { path, difficulty, json } => {
            let path = path.unwrap_or(engine.config().default_path);
            let difficulty = difficulty.unwrap_or(engine.config().default_difficulty);
            let window = engine.config().history.stats_window_days;

            let challenge = engine.select_challenge(path, difficulty, window)?;
            if json {
                println!("{}", serde_json::to_string_pretty(&challenge)?);
            } else {
                println!("{} [{} / {}]", challenge.title(), challenge.path(), challenge.difficulty());
                if !challenge.template.description.is_empty() {
                    println!("  {}", challenge.template.description);
                }
                println!("  ~{} min, {}", challenge.template.estimated_minutes, challenge.category());
                println!("  id: {}", challenge.id);
            }
        }
        ChallengeAction::Complete { id, effort, notes } => {
            let effort = effort.map(EffortLevel::new).transpose()?;
            let transition = engine.record_completion(id, effort, notes)?;
            println!(
                "Challenge completed. Streak: {} (longest {})",
                transition.after.current_streak, transition.after.longest_streak
            );
        }
        ChallengeAction::Skip { id, reason } => {
            let transition = engine.record_skip(id, reason)?;
            if transition.bank_day_used {
                println!(
                    "Challenge skipped. Bank day used, streak kept at {} ({} left)",
                    transition.after.current_streak, transition.after.bank_days
                );
            } else {
                println!("Challenge skipped. Streak reset.");
            }
        }
        ChallengeAction::History { path, days } => {
            let path = path.unwrap_or(engine.config().default_path);
            let today = engine.today();
            let challenges = engine
                .store()
                .query_challenges(path, DateRange::trailing(today, days), None)?;
            println!("{}", serde_json::to_string_pretty(&challenges)?);
        }
    }
    Ok(())
}
