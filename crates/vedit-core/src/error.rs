//! Error types for the vedit application.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// A shared error type for the entire vedit application.
///
/// Collaborator failures (remote edit service, voice capture, local files)
/// are mapped onto these variants so the editor can decide which of them are
/// surfaced to the user and which are degraded silently.
#[derive(Error, Debug, Clone, Serialize, Deserialize)]
pub enum VeditError {
    /// Rejected input, e.g. a file that is not an image
    #[error("{0}")]
    Validation(String),

    /// IO error (file system operations)
    #[error("IO error: {message}")]
    Io { message: String },

    /// Malformed data URL or base64 payload
    #[error("Format error: {0}")]
    Format(String),

    /// Remote image edit failed or produced no image
    #[error("{0}")]
    EditFailed(String),

    /// Remote prompt refinement failed
    #[error("Refinement failed: {0}")]
    Refinement(String),

    /// History navigation outside the recorded entries
    #[error("History index {index} is out of range (history has {len} entries)")]
    IndexOutOfRange { index: usize, len: usize },

    /// Voice capture failed or is unavailable
    #[error("Voice capture error: {0}")]
    Voice(String),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Serialization/deserialization error
    #[error("Serialization error: {format} - {message}")]
    Serialization {
        format: String, // "TOML", "JSON", etc.
        message: String,
    },

    /// Non-success HTTP response from a remote API
    #[error("HTTP {status}: {message}{}", retry_hint(.retry_after_secs))]
    Http {
        status: u16,
        message: String,
        retry_after_secs: Option<u64>,
    },

    /// Internal error (should not happen in normal operation)
    #[error("Internal error: {0}")]
    Internal(String),
}

fn retry_hint(retry_after_secs: &Option<u64>) -> String {
    match retry_after_secs {
        Some(secs) => format!(" (retry in {secs}s)"),
        None => String::new(),
    }
}

impl VeditError {
    // ============================================================================
    // Constructor helpers
    // ============================================================================

    /// Creates a Validation error
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation(message.into())
    }

    /// Creates an IO error
    pub fn io(message: impl Into<String>) -> Self {
        Self::Io {
            message: message.into(),
        }
    }

    /// Creates a Format error
    pub fn format(message: impl Into<String>) -> Self {
        Self::Format(message.into())
    }

    /// Creates an EditFailed error
    pub fn edit_failed(message: impl Into<String>) -> Self {
        Self::EditFailed(message.into())
    }

    /// Creates a Refinement error
    pub fn refinement(message: impl Into<String>) -> Self {
        Self::Refinement(message.into())
    }

    /// Creates a Voice error
    pub fn voice(message: impl Into<String>) -> Self {
        Self::Voice(message.into())
    }

    /// Creates a Config error
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config(message.into())
    }

    /// Creates an Internal error
    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal(message.into())
    }

    // ============================================================================
    // Type checking methods
    // ============================================================================

    /// Check if this is a Validation error
    pub fn is_validation(&self) -> bool {
        matches!(self, Self::Validation(_))
    }

    /// Check if this is an IO error
    pub fn is_io(&self) -> bool {
        matches!(self, Self::Io { .. })
    }

    /// Check if this is a Format error
    pub fn is_format(&self) -> bool {
        matches!(self, Self::Format(_))
    }

    /// Check if this is an EditFailed error
    pub fn is_edit_failed(&self) -> bool {
        matches!(self, Self::EditFailed(_))
    }

    /// Check if this is a config error
    pub fn is_config(&self) -> bool {
        matches!(self, Self::Config(_))
    }

    /// Whether retrying the same request later may succeed.
    pub fn is_retryable(&self) -> bool {
        match self {
            Self::Http { status, .. } => matches!(status, 429 | 500 | 502 | 503 | 504),
            _ => false,
        }
    }
}

// ============================================================================
// From implementations for automatic conversion
// ============================================================================

impl From<std::io::Error> for VeditError {
    fn from(err: std::io::Error) -> Self {
        Self::Io {
            message: format!("{} (kind: {:?})", err, err.kind()),
        }
    }
}

impl From<serde_json::Error> for VeditError {
    fn from(err: serde_json::Error) -> Self {
        Self::Serialization {
            format: "JSON".to_string(),
            message: err.to_string(),
        }
    }
}

impl From<toml::de::Error> for VeditError {
    fn from(err: toml::de::Error) -> Self {
        Self::Serialization {
            format: "TOML".to_string(),
            message: err.to_string(),
        }
    }
}

impl From<base64::DecodeError> for VeditError {
    fn from(err: base64::DecodeError) -> Self {
        Self::Format(format!("invalid base64 payload: {err}"))
    }
}

/// A type alias for `Result<T, VeditError>`.
pub type Result<T> = std::result::Result<T, VeditError>;
