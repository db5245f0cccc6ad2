//! Remote edit service contract.

use async_trait::async_trait;

use crate::error::Result;
use crate::image::InlineImage;

/// Message used when the service answers without an image.
pub const NO_IMAGE_GENERATED: &str =
    "No image was generated. The prompt may be too complex or unsafe.";

/// A generative service that rewrites instructions and edits images.
#[async_trait]
pub trait RemoteEditClient: Send + Sync {
    /// Rewrites a free-text instruction into a clear, direct English
    /// instruction for the image model.
    ///
    /// Best effort: callers are expected to fall back to the original
    /// instruction on any error.
    async fn refine(&self, instruction: &str) -> Result<String>;

    /// Applies `instruction` to `image` and returns the new image as a
    /// base64 payload.
    ///
    /// Fails with [`VeditError::EditFailed`](crate::VeditError::EditFailed)
    /// when the service produces no image.
    async fn edit(&self, image: &InlineImage, instruction: &str) -> Result<String>;
}
