//! Configuration loading from environment variables.

use crate::constants::{DEFAULT_CONSOLE_URL, DEFAULT_PROJECT_ID};
use serde::Deserialize;
use std::env;
use std::path::PathBuf;

/// Runtime configuration for the maintenance tools.
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    /// Directory holding the redb file.
    pub db_path: String,
    /// Project identifier embedded in index-creation links.
    pub project_id: String,
    /// Admin console base URL embedded in index-creation links.
    pub console_url: String,
    /// Copy the database file before mutating runs.
    pub auto_backup: bool,
}

/// Expand tilde (~) in paths to the user's home directory
fn expand_tilde(path: String) -> String {
    if let Some(rest) = path.strip_prefix("~/") {
        if let Some(home) = resolve_home_dir() {
            return home.join(rest).to_string_lossy().to_string();
        }
    }
    path
}

fn resolve_home_dir() -> Option<PathBuf> {
    if let Ok(home) = env::var("HOME") {
        if !home.trim().is_empty() {
            return Some(PathBuf::from(home));
        }
    }

    // Windows
    if let Ok(profile) = env::var("USERPROFILE") {
        if !profile.trim().is_empty() {
            return Some(PathBuf::from(profile));
        }
    }

    env::current_dir().ok()
}

/// Parse a boolean-like environment flag value.
///
/// # Supported Values
/// - Truthy: `1`, `true`, `yes`, `on`
/// - Falsy: `0`, `false`, `no`, `off`, empty string
///
/// Matching is case-insensitive and ignores surrounding whitespace.
///
/// # Returns
/// `Some(bool)` when the value is recognized, otherwise `None`.
pub fn parse_env_flag(value: &str) -> Option<bool> {
    let normalized = value.trim().to_ascii_lowercase();
    match normalized.as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "" | "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}

/// Read a boolean flag from the environment.
///
/// Missing or unrecognized values are treated as `false`.
pub fn env_flag_enabled(name: &str) -> bool {
    env::var(name)
        .ok()
        .and_then(|value| parse_env_flag(&value))
        .unwrap_or(false)
}

fn env_string_or(name: &str, fallback: &str) -> String {
    env::var(name)
        .ok()
        .map(|value| value.trim().to_string())
        .filter(|value| !value.is_empty())
        .unwrap_or_else(|| fallback.to_string())
}

impl Config {
    /// Load configuration from environment variables.
    ///
    /// # Returns
    /// A populated [`Config`] with literal defaults applied when env vars are
    /// missing.
    pub fn from_env() -> Self {
        Self {
            db_path: env::var("DB_PATH").map(expand_tilde).unwrap_or_else(|_| {
                let home = resolve_home_dir().unwrap_or_else(|| PathBuf::from("."));
                home.join(".cache")
                    .join("inkpost")
                    .join("db")
                    .to_string_lossy()
                    .to_string()
            }),
            project_id: env_string_or("INKPOST_PROJECT_ID", DEFAULT_PROJECT_ID),
            console_url: env_string_or("INKPOST_CONSOLE_URL", DEFAULT_CONSOLE_URL)
                .trim_end_matches('/')
                .to_string(),
            auto_backup: env_flag_enabled("AUTO_BACKUP"),
        }
    }

    /// Configuration for a database directory with all other values defaulted.
    pub fn for_path(db_path: &str) -> Self {
        Self {
            db_path: db_path.to_string(),
            project_id: DEFAULT_PROJECT_ID.to_string(),
            console_url: DEFAULT_CONSOLE_URL.to_string(),
            auto_backup: false,
        }
    }
}
