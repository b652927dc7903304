//! Application settings loading from paidly.toml
//!
//! This module provides functionality to load optional runtime settings
//! from a TOML file: where the database lives and the notification time to
//! seed on first run. Every setting has a built-in default, so a missing
//! file is not an error and the daemon runs fine with no configuration at
//! all. `DATABASE_URL` in the environment always wins over the file.

use crate::errors::{Error, Result};
use serde::Deserialize;
use std::path::Path;

/// Database location used when neither the environment nor the settings
/// file provides one. `mode=rwc` creates the file on first run.
const DEFAULT_DATABASE_URL: &str = "sqlite://data/paidly.sqlite?mode=rwc";

/// Settings structure representing the entire paidly.toml file
#[derive(Debug, Default, Deserialize)]
pub struct Settings {
    /// Database connection string; overridden by `DATABASE_URL`
    pub database_url: Option<String>,
    /// Notification time seeded into preferences on first run
    pub notification: Option<NotificationDefaults>,
}

/// Default daily notification time
#[derive(Debug, Deserialize, Clone, Copy)]
pub struct NotificationDefaults {
    /// Hour of day, 0-23
    pub hour: u32,
    /// Minute, 0-59
    pub minute: u32,
}

impl Settings {
    /// Resolves the effective database URL: environment variable first,
    /// then the settings file, then the built-in default.
    #[must_use]
    pub fn database_url(&self) -> String {
        std::env::var("DATABASE_URL").unwrap_or_else(|_| {
            self.database_url
                .clone()
                .unwrap_or_else(|| DEFAULT_DATABASE_URL.to_string())
        })
    }
}

/// Loads settings from a TOML file
///
/// # Arguments
/// * `path` - Path to the paidly.toml file
///
/// # Returns
/// * `Ok(Settings)` - Parsed settings, or defaults when the file is absent
/// * `Err(Error)` - The file exists but cannot be read or parsed
///
/// # Errors
/// Returns an error if:
/// - The file exists but cannot be read
/// - The TOML syntax is invalid
pub fn load_settings<P: AsRef<Path>>(path: P) -> Result<Settings> {
    let path = path.as_ref();
    if !path.exists() {
        return Ok(Settings::default());
    }

    let contents = std::fs::read_to_string(path).map_err(|e| Error::Config {
        message: format!("Failed to read settings file: {e}"),
    })?;

    toml::from_str(&contents).map_err(|e| Error::Config {
        message: format!("Failed to parse {}: {e}", path.display()),
    })
}

/// Loads settings from the default location (./paidly.toml)
///
/// # Errors
/// Same conditions as [`load_settings`].
pub fn load_default_settings() -> Result<Settings> {
    load_settings("paidly.toml")
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    use super::*;

    #[test]
    fn test_parse_full_settings() {
        let toml_str = r#"
            database_url = "sqlite://tmp/test.sqlite?mode=rwc"

            [notification]
            hour = 20
            minute = 30
        "#;

        let settings: Settings = toml::from_str(toml_str).unwrap();
        assert_eq!(
            settings.database_url.as_deref(),
            Some("sqlite://tmp/test.sqlite?mode=rwc")
        );
        let notification = settings.notification.unwrap();
        assert_eq!(notification.hour, 20);
        assert_eq!(notification.minute, 30);
    }

    #[test]
    fn test_empty_settings_are_valid() {
        let settings: Settings = toml::from_str("").unwrap();
        assert!(settings.database_url.is_none());
        assert!(settings.notification.is_none());
    }

    #[test]
    fn test_missing_file_falls_back_to_defaults() {
        let settings = load_settings("definitely/not/a/real/path.toml").unwrap();
        assert!(settings.database_url.is_none());
        assert!(settings.notification.is_none());
    }

    #[test]
    fn test_invalid_toml_fails_to_parse() {
        let result: std::result::Result<Settings, _> = toml::from_str("notification = 9am");
        assert!(result.is_err());
    }
}
