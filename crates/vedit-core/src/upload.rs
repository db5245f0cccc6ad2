//! Validation of user-supplied image sources.

use crate::error::{Result, VeditError};
use crate::image;

pub const INVALID_IMAGE_MESSAGE: &str = "Please select a valid image file.";
pub const READ_FAILURE_MESSAGE: &str = "Failed to read the image file.";

/// Rejects any claimed media type outside `image/*`.
pub fn validate_image_mime(claimed_mime_type: &str) -> Result<()> {
    if claimed_mime_type.starts_with("image/") {
        Ok(())
    } else {
        Err(VeditError::validation(INVALID_IMAGE_MESSAGE))
    }
}

/// Validates a source and encodes it as a data URL ready to seed a history.
pub fn image_to_data_url(bytes: &[u8], claimed_mime_type: &str) -> Result<String> {
    validate_image_mime(claimed_mime_type)?;
    Ok(image::encode(bytes, claimed_mime_type))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_image_types_are_accepted() {
        for mime in ["image/png", "image/jpeg", "image/webp", "image/gif"] {
            assert!(validate_image_mime(mime).is_ok(), "{mime} should pass");
        }
    }

    #[test]
    fn test_non_image_types_are_rejected() {
        for mime in ["text/plain", "application/pdf", "", "video/mp4", "imagex/png"] {
            let err = validate_image_mime(mime).unwrap_err();
            assert!(err.is_validation());
            assert_eq!(err.to_string(), INVALID_IMAGE_MESSAGE);
        }
    }

    #[test]
    fn test_image_to_data_url() {
        let url = image_to_data_url(b"hello", "image/png").unwrap();
        assert_eq!(url, "data:image/png;base64,aGVsbG8=");
        assert!(image_to_data_url(b"hello", "text/plain").is_err());
    }
}
