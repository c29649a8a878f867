pub mod catalog;
pub mod challenge;
pub mod checkin;
pub mod config;
pub mod stats;
pub mod streak;
pub mod summary;

use pathwise_core::{Config, Database, EngagementEngine, SystemClock, TemplateCatalog};

/// Catalog from `catalog_path` when configured, otherwise the built-in one.
pub fn load_catalog(config: &Config) -> Result<TemplateCatalog, Box<dyn std::error::Error>> {
    match &config.catalog_path {
        Some(path) => Ok(TemplateCatalog::load(path)?),
        None => Ok(TemplateCatalog::builtin()),
    }
}

/// Engine over the on-disk database with the wall clock.
pub fn open_engine() -> Result<EngagementEngine<Database>, Box<dyn std::error::Error>> {
    let config = Config::load()?;
    let catalog = load_catalog(&config)?;
    let db = Database::open()?;
    Ok(EngagementEngine::new(db, catalog, SystemClock, config)?)
}
