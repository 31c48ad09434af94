//! Application settings loading from homeroom.toml
//!
//! Settings are read from a TOML file whose path defaults to `./homeroom.toml` and can be
//! overridden with `HOMEROOM_CONFIG`. Every field has a default, so a missing file is not
//! an error. `DATABASE_URL` in the environment (or `.env`) takes precedence over the file.

use crate::errors::{Error, Result};
use serde::Deserialize;
use std::path::Path;

const DEFAULT_CONFIG_PATH: &str = "homeroom.toml";
const DEFAULT_DATABASE_URL: &str = "sqlite://data/homeroom.sqlite?mode=rwc";

/// Top-level settings structure representing the entire homeroom.toml file
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Database connection settings
    pub database: DatabaseSettings,
    /// Default tracing filter when `RUST_LOG` is not set (e.g., "info", "homeroom=debug")
    pub log_level: String,
}

/// Connection settings for the `SQLite` database
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct DatabaseSettings {
    /// Connection URL
    pub url: String,
    /// Upper bound on pooled connections
    pub max_connections: u32,
    /// Seconds to wait for a pooled connection before giving up
    pub acquire_timeout_secs: u64,
    /// Whether sqlx logs every statement
    pub sqlx_logging: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            database: DatabaseSettings::default(),
            log_level: "info".to_string(),
        }
    }
}

impl Default for DatabaseSettings {
    fn default() -> Self {
        Self {
            url: DEFAULT_DATABASE_URL.to_string(),
            max_connections: 5,
            acquire_timeout_secs: 8,
            sqlx_logging: false,
        }
    }
}

/// Parses settings from TOML text.
pub fn parse_settings(contents: &str) -> Result<Settings> {
    toml::from_str(contents).map_err(|e| Error::Config {
        message: format!("Failed to parse settings: {e}"),
    })
}

/// Loads settings from a TOML file, falling back to defaults when the file does not exist.
///
/// # Errors
/// Returns an error if:
/// - The file exists but cannot be read
/// - The TOML syntax is invalid or a field has the wrong type
pub fn load_settings<P: AsRef<Path>>(path: P) -> Result<Settings> {
    let path = path.as_ref();
    let mut settings = if path.exists() {
        let contents = std::fs::read_to_string(path).map_err(|e| Error::Config {
            message: format!("Failed to read settings file {}: {e}", path.display()),
        })?;
        parse_settings(&contents)?
    } else {
        Settings::default()
    };

    if let Ok(url) = std::env::var("DATABASE_URL") {
        settings.database.url = url;
    }

    Ok(settings)
}

/// Loads settings from `HOMEROOM_CONFIG`, or `./homeroom.toml` when unset.
pub fn load_default_settings() -> Result<Settings> {
    let path = std::env::var("HOMEROOM_CONFIG").unwrap_or_else(|_| DEFAULT_CONFIG_PATH.to_string());
    load_settings(path)
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    use super::*;

    #[test]
    fn test_parse_full_settings() {
        let toml_str = r#"
            log_level = "homeroom=debug"

            [database]
            url = "sqlite://school.sqlite?mode=rwc"
            max_connections = 2
            acquire_timeout_secs = 3
            sqlx_logging = true
        "#;

        let settings = parse_settings(toml_str).unwrap();
        assert_eq!(settings.log_level, "homeroom=debug");
        assert_eq!(settings.database.url, "sqlite://school.sqlite?mode=rwc");
        assert_eq!(settings.database.max_connections, 2);
        assert_eq!(settings.database.acquire_timeout_secs, 3);
        assert!(settings.database.sqlx_logging);
    }

    #[test]
    fn test_missing_fields_fall_back_to_defaults() {
        let settings = parse_settings("[database]\nmax_connections = 9\n").unwrap();
        assert_eq!(settings.log_level, "info");
        assert_eq!(settings.database.max_connections, 9);
        assert_eq!(settings.database.acquire_timeout_secs, 8);
        assert!(!settings.database.sqlx_logging);
    }

    #[test]
    fn test_invalid_settings_are_config_errors() {
        let result = parse_settings("[database]\nmax_connections = \"many\"\n");
        assert!(matches!(result.unwrap_err(), Error::Config { message: _ }));
    }
}
