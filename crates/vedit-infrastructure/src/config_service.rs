//! Configuration service implementation.
//!
//! Loads `config.toml` and `secret.json` from the vedit configuration
//! directory. Missing files are not errors: both fall back to defaults.

use std::path::Path;

use tracing::debug;
use vedit_core::config::{EditorConfig, SecretConfig};
use vedit_core::{Result, VeditError};

use crate::paths::VeditPaths;

/// Environment variables checked, in order, before `secret.json`.
pub const API_KEY_ENV_VARS: [&str; 2] = ["GEMINI_API_KEY", "API_KEY"];

#[derive(Debug, Clone, Default)]
pub struct ConfigService {
    paths: VeditPaths,
}

impl ConfigService {
    pub fn new(base_path: Option<&Path>) -> Self {
        Self {
            paths: VeditPaths::new(base_path),
        }
    }

    pub fn paths(&self) -> &VeditPaths {
        &self.paths
    }

    /// Loads `config.toml`, or the default configuration if it does not exist.
    pub fn load_config(&self) -> Result<EditorConfig> {
        let path = self.paths.config_file()?;
        if !path.exists() {
            debug!(path = %path.display(), "config file missing, using defaults");
            return Ok(EditorConfig::default());
        }
        let content = std::fs::read_to_string(&path)?;
        Ok(toml::from_str(&content)?)
    }

    /// Loads `secret.json`, or an empty secret configuration if it does not exist.
    pub fn load_secrets(&self) -> Result<SecretConfig> {
        let path = self.paths.secret_file()?;
        if !path.exists() {
            debug!(path = %path.display(), "secret file missing");
            return Ok(SecretConfig::default());
        }
        let content = std::fs::read_to_string(&path)?;
        Ok(serde_json::from_str(&content)?)
    }

    /// Resolves the Gemini API key from the environment or `secret.json`.
    pub fn gemini_api_key(&self) -> Result<String> {
        let secrets = self.load_secrets()?;
        resolve_api_key(&secrets, |name| std::env::var(name).ok())
    }
}

/// Picks the first non-empty key from `env` ([`API_KEY_ENV_VARS`]) or `secrets`.
pub fn resolve_api_key<F>(secrets: &SecretConfig, env: F) -> Result<String>
where
    F: Fn(&str) -> Option<String>,
{
    API_KEY_ENV_VARS
        .iter()
        .filter_map(|name| env(name))
        .chain(secrets.gemini.as_ref().map(|gemini| gemini.api_key.clone()))
        .map(|key| key.trim().to_string())
        .find(|key| !key.is_empty())
        .ok_or_else(|| {
            VeditError::config(
                "Gemini API key not found; set GEMINI_API_KEY or fill in secret.json",
            )
        })
}
