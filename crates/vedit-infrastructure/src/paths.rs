//! Path management for vedit configuration files.
//!
//! ```text
//! ~/.config/vedit/
//! ├── config.toml   # models, voice command
//! └── secret.json   # API keys
//! ```

use std::path::{Path, PathBuf};

use vedit_core::config::{GeminiConfig, SecretConfig};
use vedit_core::{Result, VeditError};

const APP_DIR: &str = "vedit";

/// Resolves configuration paths, optionally under an explicit base directory.
#[derive(Debug, Clone, Default)]
pub struct VeditPaths {
    base: Option<PathBuf>,
}

impl VeditPaths {
    /// Uses `base` instead of the platform config directory when given.
    pub fn new(base: Option<&Path>) -> Self {
        Self {
            base: base.map(Path::to_path_buf),
        }
    }

    /// Returns the vedit configuration directory (e.g. `~/.config/vedit/`).
    pub fn config_dir(&self) -> Result<PathBuf> {
        if let Some(base) = &self.base {
            return Ok(base.clone());
        }
        dirs::config_dir()
            .map(|dir| dir.join(APP_DIR))
            .ok_or_else(|| VeditError::config("Cannot find home directory"))
    }

    pub fn config_file(&self) -> Result<PathBuf> {
        Ok(self.config_dir()?.join("config.toml"))
    }

    /// Returns the path to the secrets file.
    ///
    /// # Security Note
    ///
    /// Ensure this file has appropriate permissions (e.g., 600) to prevent
    /// unauthorized access.
    pub fn secret_file(&self) -> Result<PathBuf> {
        Ok(self.config_dir()?.join("secret.json"))
    }

    /// Ensures the secret file exists, writing an empty template if it doesn't.
    ///
    /// On Unix the new file is created with mode 600.
    pub fn ensure_secret_file(&self) -> Result<PathBuf> {
        let secret_path = self.secret_file()?;
        if secret_path.exists() {
            return Ok(secret_path);
        }

        if let Some(parent) = secret_path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let template = SecretConfig {
            gemini: Some(GeminiConfig {
                api_key: String::new(),
            }),
        };
        std::fs::write(&secret_path, serde_json::to_string_pretty(&template)?)?;

        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            let permissions = std::fs::Permissions::from_mode(0o600);
            std::fs::set_permissions(&secret_path, permissions)?;
        }

        Ok(secret_path)
    }
}
