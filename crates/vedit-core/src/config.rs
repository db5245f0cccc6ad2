use serde::{Deserialize, Serialize};

pub const DEFAULT_REFINE_MODEL: &str = "gemini-2.5-flash";
pub const DEFAULT_EDIT_MODEL: &str = "gemini-2.5-flash-image";

/// Root of `config.toml`.
#[derive(Deserialize, Serialize, Debug, Clone, Default, PartialEq, Eq)]
pub struct EditorConfig {
    #[serde(default)]
    pub models: ModelConfig,
    #[serde(default)]
    pub voice: VoiceConfig,
}

#[derive(Deserialize, Serialize, Debug, Clone, PartialEq, Eq)]
pub struct ModelConfig {
    /// Model used to rewrite instructions
    #[serde(default = "default_refine_model")]
    pub refine: String,
    /// Model used to edit images
    #[serde(default = "default_edit_model")]
    pub edit: String,
}

impl Default for ModelConfig {
    fn default() -> Self {
        Self {
            refine: default_refine_model(),
            edit: default_edit_model(),
        }
    }
}

fn default_refine_model() -> String {
    DEFAULT_REFINE_MODEL.to_string()
}

fn default_edit_model() -> String {
    DEFAULT_EDIT_MODEL.to_string()
}

/// External speech-to-text program.
///
/// The program is run once per activation and its stdout is the transcript.
/// Voice input is unavailable when `command` is empty.
#[derive(Deserialize, Serialize, Debug, Clone, Default, PartialEq, Eq)]
pub struct VoiceConfig {
    #[serde(default)]
    pub command: Vec<String>,
}

/// Root of `secret.json`.
#[derive(Deserialize, Serialize, Debug, Clone, Default)]
pub struct SecretConfig {
    #[serde(default)]
    pub gemini: Option<GeminiConfig>,
}

/// Gemini API configuration
#[derive(Deserialize, Serialize, Debug, Clone)]
pub struct GeminiConfig {
    pub api_key: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_config_uses_defaults() {
        let config: EditorConfig = toml::from_str("").unwrap();
        assert_eq!(config, EditorConfig::default());
        assert_eq!(config.models.refine, DEFAULT_REFINE_MODEL);
        assert_eq!(config.models.edit, DEFAULT_EDIT_MODEL);
        assert!(config.voice.command.is_empty());
    }

    #[test]
    fn test_partial_config() {
        let config: EditorConfig = toml::from_str(
            r#"
            [models]
            edit = "gemini-3-pro-image-preview"

            [voice]
            command = ["whisper-listen", "--lang", "auto"]
            "#,
        )
        .unwrap();
        assert_eq!(config.models.refine, DEFAULT_REFINE_MODEL);
        assert_eq!(config.models.edit, "gemini-3-pro-image-preview");
        assert_eq!(config.voice.command.len(), 3);
    }

    #[test]
    fn test_secret_config_parses() {
        let secrets: SecretConfig =
            serde_json::from_str(r#"{"gemini": {"api_key": "abc"}}"#).unwrap();
        assert_eq!(secrets.gemini.unwrap().api_key, "abc");

        let empty: SecretConfig = serde_json::from_str("{}").unwrap();
        assert!(empty.gemini.is_none());
    }
}
