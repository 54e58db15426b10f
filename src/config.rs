//! Application configuration.
//!
//! The library root and database location come from `config.toml`, falling
//! back to the environment (`.env` supported) and finally to defaults.

use serde::Deserialize;
use std::path::PathBuf;

/// Configuration file structure for config.toml
#[derive(Debug, Deserialize)]
struct AppConfig {
    library: Option<LibraryConfig>,
    database: Option<DatabaseConfig>,
}

#[derive(Debug, Deserialize)]
struct LibraryConfig {
    courses_dir: Option<String>,
}

#[derive(Debug, Deserialize)]
struct DatabaseConfig {
    path: Option<String>,
}

/// Resolved settings the rest of the app consumes.
#[derive(Debug, Clone)]
pub struct Settings {
    /// Root directory holding one subdirectory per course.
    pub courses_dir: PathBuf,
    /// SQLite catalog location.
    pub database_path: PathBuf,
}

/// Load settings with priority: config.toml > environment > default
pub fn load_settings() -> Settings {
    // Load .env file if present
    let _ = dotenvy::dotenv();

    let file_config = std::fs::read_to_string("config.toml")
        .ok()
        .and_then(|contents| toml::from_str::<AppConfig>(&contents).ok());

    let courses_dir = file_config
        .as_ref()
        .and_then(|c| c.library.as_ref())
        .and_then(|l| l.courses_dir.clone())
        .or_else(|| std::env::var("COURSES_DIR").ok().filter(|v| !v.trim().is_empty()))
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from("./courses"));

    let database_path = file_config
        .as_ref()
        .and_then(|c| c.database.as_ref())
        .and_then(|d| d.path.clone())
        .or_else(|| std::env::var("DATABASE_PATH").ok().filter(|v| !v.trim().is_empty()))
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from("data/courseshelf.db"));

    tracing::info!(
        courses_dir = %courses_dir.display(),
        database_path = %database_path.display(),
        "settings loaded"
    );

    Settings {
        courses_dir,
        database_path,
    }
}

// ==================== Server Configuration ====================

/// Server address to bind to
pub const SERVER_ADDR: &str = "0.0.0.0";

/// Server port
pub const SERVER_PORT: u16 = 3000;

/// Get the full server bind address
pub fn server_bind_addr() -> String {
    format!("{}:{}", SERVER_ADDR, SERVER_PORT)
}
