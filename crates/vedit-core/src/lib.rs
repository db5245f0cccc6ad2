pub mod config;
pub mod edit;
pub mod error;
pub mod history;
pub mod image;
pub mod upload;
pub mod voice;

// Re-export common error type
pub use error::{Result, VeditError};

pub use edit::RemoteEditClient;
pub use history::{EditHistory, HistoryEntry, ORIGINAL_PROMPT};
pub use image::{DEFAULT_MIME_TYPE, InlineImage, OUTPUT_MIME_TYPE, encode, parse_data_url};
pub use voice::{UnsupportedVoiceCapture, VoiceCapture};
