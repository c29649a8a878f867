use clap::Subcommand;
use pathwise_core::{Config, Difficulty, TrainingPath};

use super::load_catalog;

#[derive(Subcommand)]
pub enum CatalogAction {
    /// List templates
    List {
        #[arg(long)]
        path: Option<TrainingPath>,
        #[arg(long)]
        difficulty: Option<Difficulty>,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Print the active catalog as TOML
    Export,
}

pub fn run(action: CatalogAction) -> Result<(), Box<dyn std::error::Error>> {
    let config = Config::load()?;
    let catalog = load_catalog(&config)?;

    match action {
        CatalogAction::List { path, difficulty, json } => {
            let templates: Vec<_> = catalog
                .iter()
                .filter(|t| path.map_or(true, |p| t.path == p))
                .filter(|t| difficulty.map_or(true, |d| t.difficulty == d))
                .collect();
            if json {
                println!("{}", serde_json::to_string_pretty(&templates)?);
            } else {
                for t in templates {
                    println!(
                        "{:<13} {:<9} {:<10} {:>3} min  {}",
                        t.path.as_str(),
                        t.difficulty.as_str(),
                        t.category.as_str(),
                        t.estimated_minutes,
                        t.title
                    );
                }
            }
        }
        CatalogAction::Export => {
            print!("{}", catalog.to_toml_string()?);
        }
    }
    Ok(())
}
