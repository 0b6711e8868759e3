use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use thoughts_api::ThoughtsClient;

const APP_DIR: &str = "thoughts-client";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ThoughtsConfig {
    /// Base URL of the thoughts server, e.g. "http://localhost:8080"
    #[serde(default = "default_api_url")]
    pub api_url: String,
}

fn default_api_url() -> String {
    "http://localhost:8080".to_string()
}

impl Default for ThoughtsConfig {
    fn default() -> Self {
        Self {
            api_url: default_api_url(),
        }
    }
}

fn state_file(name: &str) -> Result<PathBuf> {
    Ok(dirs::config_dir()
        .context("Cannot determine config directory")?
        .join(APP_DIR)
        .join(name))
}

fn write_state_file(path: &PathBuf, content: &str) -> Result<()> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    std::fs::write(path, content)?;
    Ok(())
}

impl ThoughtsConfig {
    /// Load config from disk. Returns default config if file doesn't exist.
    pub fn load() -> Result<Self> {
        let path = state_file("config.toml")?;
        if !path.exists() {
            return Ok(Self::default());
        }
        let raw = std::fs::read_to_string(&path)
            .with_context(|| format!("Failed to read config at {}", path.display()))?;
        toml::from_str(&raw).with_context(|| format!("Failed to parse config at {}", path.display()))
    }

    pub fn save(&self) -> Result<()> {
        write_state_file(&state_file("config.toml")?, &toml::to_string_pretty(self)?)
    }

    /// Build an API client for this config, resuming the saved session
    /// if one exists.
    pub fn connect(&self) -> Result<ThoughtsClient> {
        let session = load_session()?;
        ThoughtsClient::new(&self.api_url, session.as_deref())
            .with_context(|| format!("Failed to build client for {}", self.api_url))
    }
}

/// Load the saved session ID from disk. Returns None if not logged in.
pub fn load_session() -> Result<Option<String>> {
    let path = state_file("session")?;
    if !path.exists() {
        return Ok(None);
    }
    let session = std::fs::read_to_string(&path).context("Failed to read session file")?;
    let session = session.trim().to_string();
    Ok((!session.is_empty()).then_some(session))
}

/// Persist the session ID after a successful login.
pub fn save_session(session_id: &str) -> Result<()> {
    write_state_file(&state_file("session")?, session_id)
}

/// Delete the saved session (logout).
pub fn clear_session() -> Result<()> {
    let path = state_file("session")?;
    if path.exists() {
        std::fs::remove_file(&path)?;
    }
    Ok(())
}
