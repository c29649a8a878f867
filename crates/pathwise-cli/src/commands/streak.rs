use clap::Subcommand;

use super::open_engine;

#[derive(Subcommand)]
pub enum StreakAction {
    /// Show the current streak, after applying missed days
    Show,
    /// Apply misses for days without any activity
    Catchup,
    /// Grant one bank day
    Grant,
}

pub fn run(action: StreakAction) -> Result<(), Box<dyn std::error::Error>> {
    let mut engine = open_engine()?;

    match action {
        StreakAction::Show => {
            engine.register_missed_days()?;
            println!("{}", serde_json::to_string_pretty(engine.streak_state())?);
        }
        StreakAction::Catchup => {
            let missed = engine.register_missed_days()?;
            println!(
                "{} missed day(s) applied. Streak: {}",
                missed.len(),
                engine.streak_state().current_streak
            );
        }
        StreakAction::Grant => {
            if engine.grant_bank_day()? {
                println!("Bank day granted ({} banked)", engine.streak_state().bank_days);
            } else {
                println!("Bank is full ({} banked)", engine.streak_state().bank_days);
            }
        }
    }
    Ok(())
}
