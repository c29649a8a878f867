mod config;
pub mod database;

pub use config::{Config, HistoryConfig};
pub use database::Database;

use std::path::PathBuf;

/// Returns `~/.config/pathwise[-dev]/` based on PATHWISE_ENV.
///
/// Set PATHWISE_ENV=dev to use the development data directory, or
/// PATHWISE_DATA_DIR to use an explicit directory.
///
/// # Errors
/// Returns an error if creating the directory fails.
pub fn data_dir() -> Result<PathBuf, std::io::Error> {
    let dir = match std::env::var_os("PATHWISE_DATA_DIR") {
        Some(explicit) => PathBuf::from(explicit),
        None => {
            let base_dir = dirs::home_dir()
                .unwrap_or_else(|| PathBuf::from("."))
                .join(".config");
            let env = std::env::var("PATHWISE_ENV").unwrap_or_else(|_| "production".to_string());
            if env == "dev" {
                base_dir.join("pathwise-dev")
            } else {
                base_dir.join("pathwise")
            }
        }
    };

    std::fs::create_dir_all(&dir)?;
    Ok(dir)
}
