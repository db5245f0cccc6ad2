use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Label of the entry created from the uploaded image.
pub const ORIGINAL_PROMPT: &str = "Original";

/// One immutable snapshot in the edit history.
///
/// Fields are private so an entry cannot change after it has been recorded.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HistoryEntry {
    id: String,
    prompt: String,
    image_url: String,
    created_at: String,
}

impl HistoryEntry {
    pub(crate) fn new(prompt: impl Into<String>, image_url: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            prompt: prompt.into(),
            image_url: image_url.into(),
            created_at: chrono::Utc::now().to_rfc3339(),
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    /// The instruction the user typed or spoke, or [`ORIGINAL_PROMPT`].
    pub fn prompt(&self) -> &str {
        &self.prompt
    }

    /// The resulting image as a data URL.
    pub fn image_url(&self) -> &str {
        &self.image_url
    }

    /// Creation time (RFC 3339).
    pub fn created_at(&self) -> &str {
        &self.created_at
    }
}
