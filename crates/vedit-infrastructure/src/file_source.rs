//! Loads user-selected image files into data URLs.

use std::path::{Path, PathBuf};

use tracing::debug;
use vedit_core::upload::{READ_FAILURE_MESSAGE, image_to_data_url, validate_image_mime};
use vedit_core::{Result, VeditError};

/// Infers the MIME type from a filename extension using the `mime_guess` library.
pub fn infer_mime_type(path: &Path) -> String {
    mime_guess::from_path(path)
        .first_or_octet_stream()
        .to_string()
}

/// An image file on disk together with its claimed media type.
#[derive(Debug, Clone)]
pub struct FileImageSource {
    path: PathBuf,
    mime_type: String,
}

impl FileImageSource {
    /// Claims a media type from the file extension.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let mime_type = infer_mime_type(&path);
        Self { path, mime_type }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn mime_type(&self) -> &str {
        &self.mime_type
    }

    /// Reads the file and encodes it as a data URL.
    ///
    /// Non-image media types are rejected before the file is read.
    pub async fn load(&self) -> Result<String> {
        validate_image_mime(&self.mime_type)?;

        let bytes = tokio::fs::read(&self.path).await.map_err(|err| {
            VeditError::io(format!(
                "{READ_FAILURE_MESSAGE} ({}: {err})",
                self.path.display()
            ))
        })?;

        debug!(
            path = %self.path.display(),
            mime_type = %self.mime_type,
            size = bytes.len(),
            "loaded image file"
        );
        image_to_data_url(&bytes, &self.mime_type)
    }
}
