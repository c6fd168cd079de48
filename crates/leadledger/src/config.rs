//! Application configuration and session storage.
//!
//! Configuration lives as JSON in the user config directory and every field
//! can be overridden by an environment variable, so the binary works both
//! from a saved config file and from a bare environment.

use std::path::PathBuf;

use anyhow::Context;
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Application configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Path of the `SQLite` database file.
    pub database_path: String,
    /// Base URL of the enrichment provider API.
    pub enrich_base_url: Option<String>,
    /// API key for the enrichment provider.
    pub enrich_api_key: Option<String>,
    /// Base URL of the AI writer service.
    pub writer_base_url: Option<String>,
    /// API key for the AI writer service.
    pub writer_api_key: Option<String>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            database_path: default_database_path(),
            enrich_base_url: None,
            enrich_api_key: None,
            writer_base_url: None,
            writer_api_key: None,
        }
    }
}

fn config_dir() -> PathBuf {
    dirs::config_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("leadledger")
}

fn default_database_path() -> String {
    let data_dir = dirs::data_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("leadledger");
    data_dir.join("leadledger.db").to_string_lossy().into_owned()
}

impl Config {
    /// Load the config file, then apply environment overrides.
    ///
    /// A missing config file is not an error; defaults are used.
    ///
    /// # Errors
    ///
    /// Returns an error if the config file exists but cannot be read or
    /// parsed.
    pub fn load() -> anyhow::Result<Self> {
        let path = config_dir().join("config.json");

        let mut config = if path.exists() {
            let contents = std::fs::read_to_string(&path)
                .with_context(|| format!("reading config file {}", path.display()))?;
            serde_json::from_str(&contents)
                .with_context(|| format!("parsing config file {}", path.display()))?
        } else {
            debug!(path = %path.display(), "no config file, using defaults");
            Self::default()
        };

        if let Ok(db) = std::env::var("LEADLEDGER_DB") {
            config.database_path = db;
        }
        if let Ok(url) = std::env::var("LEADLEDGER_ENRICH_URL") {
            config.enrich_base_url = Some(url);
        }
        if let Ok(key) = std::env::var("LEADLEDGER_API_KEY") {
            config.enrich_api_key = Some(key);
        }
        if let Ok(url) = std::env::var("LEADLEDGER_WRITER_URL") {
            config.writer_base_url = Some(url);
        }
        if let Ok(key) = std::env::var("LEADLEDGER_WRITER_KEY") {
            config.writer_api_key = Some(key);
        }

        Ok(config)
    }

    /// Ensure the directory holding the database file exists.
    ///
    /// # Errors
    ///
    /// Returns an error if the directory cannot be created.
    pub fn ensure_database_dir(&self) -> anyhow::Result<()> {
        if let Some(parent) = std::path::Path::new(&self.database_path).parent()
            && !parent.as_os_str().is_empty()
        {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("creating data directory {}", parent.display()))?;
        }
        Ok(())
    }
}

fn session_path() -> PathBuf {
    config_dir().join("session")
}

/// Store the session token issued at login.
///
/// # Errors
///
/// Returns an error if the config directory or the session file cannot be
/// written.
pub fn save_session(token: &str) -> anyhow::Result<()> {
    let dir = config_dir();
    std::fs::create_dir_all(&dir)
        .with_context(|| format!("creating config directory {}", dir.display()))?;
    std::fs::write(session_path(), token).context("writing session file")?;
    Ok(())
}

/// The stored session token, if any. `LEADLEDGER_TOKEN` takes precedence.
#[must_use]
pub fn load_session() -> Option<String> {
    if let Ok(token) = std::env::var("LEADLEDGER_TOKEN") {
        return Some(token);
    }
    std::fs::read_to_string(session_path())
        .ok()
        .map(|t| t.trim().to_string())
        .filter(|t| !t.is_empty())
}

/// Remove the stored session token.
///
/// # Errors
///
/// Returns an error if the session file exists but cannot be removed.
pub fn clear_session() -> anyhow::Result<()> {
    let path = session_path();
    if path.exists() {
        std::fs::remove_file(&path).context("removing session file")?;
    }
    Ok(())
}
