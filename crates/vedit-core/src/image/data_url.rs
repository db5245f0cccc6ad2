use base64::Engine;
use base64::engine::general_purpose::STANDARD as BASE64_STANDARD;
use serde::{Deserialize, Serialize};

use crate::error::{Result, VeditError};

/// Media type assumed when a data URL carries no parseable one.
pub const DEFAULT_MIME_TYPE: &str = "image/png";

/// Media type attached to every image returned by the edit service.
pub const OUTPUT_MIME_TYPE: &str = "image/png";

/// A decoded data URL: base64 payload plus its media type.
///
/// This is the shape the edit service consumes as `inlineData`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InlineImage {
    pub mime_type: String,
    /// Base64 (standard alphabet) encoded image bytes.
    pub data: String,
}

impl InlineImage {
    pub fn new(mime_type: impl Into<String>, data: impl Into<String>) -> Self {
        Self {
            mime_type: mime_type.into(),
            data: data.into(),
        }
    }

    /// Encodes raw bytes.
    pub fn from_bytes(bytes: &[u8], mime_type: impl Into<String>) -> Self {
        Self::new(mime_type, BASE64_STANDARD.encode(bytes))
    }

    /// Decodes the base64 payload back into raw bytes.
    pub fn decode_bytes(&self) -> Result<Vec<u8>> {
        Ok(BASE64_STANDARD.decode(self.data.as_bytes())?)
    }

    pub fn to_data_url(&self) -> String {
        format!("data:{};base64,{}", self.mime_type, self.data)
    }
}

/// Encodes raw image bytes as a data URL.
///
/// Only the `type/subtype` part of `mime_type` is kept: parameters such as
/// `;charset=utf-8` would collide with the `;base64` marker and cannot be
/// recovered by [`parse_data_url`].
pub fn encode(bytes: &[u8], mime_type: &str) -> String {
    InlineImage::from_bytes(bytes, essence(mime_type)).to_data_url()
}

/// `mime_type` without parameters.
fn essence(mime_type: &str) -> &str {
    mime_type
        .split_once(';')
        .map_or(mime_type, |(essence, _)| essence)
        .trim()
}

/// Splits a data URL into its media type and base64 payload.
///
/// Fails with [`VeditError::Format`] unless the input has exactly one `,`
/// separating metadata from payload. An unparseable metadata segment is not
/// an error: the media type falls back to [`DEFAULT_MIME_TYPE`].
pub fn parse_data_url(data_url: &str) -> Result<InlineImage> {
    let mut segments = data_url.split(',');
    let (Some(meta), Some(payload), None) = (segments.next(), segments.next(), segments.next())
    else {
        return Err(VeditError::format("Invalid data URL"));
    };

    let mime_type = media_type_of(meta).unwrap_or(DEFAULT_MIME_TYPE);
    Ok(InlineImage::new(mime_type, payload))
}

/// Text between the first `:` and the next `;`, if non-empty.
fn media_type_of(meta: &str) -> Option<&str> {
    let (_, rest) = meta.split_once(':')?;
    let (mime, _) = rest.split_once(';')?;
    (!mime.is_empty()).then_some(mime)
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_encode_produces_base64_data_url() {
        let url = encode(b"hello", "image/jpeg");
        assert_eq!(url, "data:image/jpeg;base64,aGVsbG8=");
    }

    fn media_type() -> impl Strategy<Value = String> {
        proptest::string::string_regex("(image|application|text)/[a-z0-9][a-z0-9.+-]{0,15}")
            .unwrap()
    }

    proptest! {
        #[test]
        fn prop_decode_recovers_mime_and_bytes(
            bytes in prop::collection::vec(any::<u8>(), 1..512),
            mime in media_type(),
        ) {
            let parsed = parse_data_url(&encode(&bytes, &mime)).unwrap();
            prop_assert_eq!(&parsed.mime_type, &mime);
            prop_assert_eq!(parsed.decode_bytes().unwrap(), bytes);
        }

        #[test]
        fn prop_media_type_parameters_are_dropped(
            mime in media_type(),
            parameter in "[a-z]{1,8}=[a-z0-9-]{1,8}",
        ) {
            let url = encode(b"<svg/>", &format!("{mime}; {parameter}"));
            prop_assert_eq!(parse_data_url(&url).unwrap().mime_type, mime);
        }

        #[test]
        fn prop_decode_rejects_wrong_separator_count(
            segments in prop::collection::vec("[a-zA-Z0-9:;/+=]{0,12}", 1..6)
                .prop_filter("exactly two segments is well formed", |s| s.len() != 2),
        ) {
            let url = segments.join(",");
            prop_assert!(parse_data_url(&url).unwrap_err().is_format());
        }
    }

    #[test]
    fn test_svg_with_charset_keeps_bare_media_type() {
        let url = encode(b"<svg/>", "image/svg+xml;charset=utf-8");
        assert_eq!(url, "data:image/svg+xml;base64,PHN2Zy8+");
        assert_eq!(parse_data_url(&url).unwrap().mime_type, "image/svg+xml");
    }

    #[test]
    fn test_decode_requires_exactly_one_separator() {
        assert!(parse_data_url("data:image/png;base64").unwrap_err().is_format());
        assert!(parse_data_url("").unwrap_err().is_format());
        assert!(
            parse_data_url("data:image/png;base64,abc,def")
                .unwrap_err()
                .is_format()
        );
    }

    #[test]
    fn test_decode_defaults_unparseable_media_type() {
        let parsed = parse_data_url("garbage,aGVsbG8=").unwrap();
        assert_eq!(parsed.mime_type, DEFAULT_MIME_TYPE);
        assert_eq!(parsed.data, "aGVsbG8=");

        let parsed = parse_data_url("data:;base64,aGVsbG8=").unwrap();
        assert_eq!(parsed.mime_type, DEFAULT_MIME_TYPE);

        // no ';' after the media type
        let parsed = parse_data_url("data:image/gif,aGVsbG8=").unwrap();
        assert_eq!(parsed.mime_type, DEFAULT_MIME_TYPE);
    }

    #[test]
    fn test_invalid_base64_is_format_error() {
        let image = InlineImage::new("image/png", "not base64!!");
        assert!(image.decode_bytes().unwrap_err().is_format());
    }

    #[test]
    fn test_inline_image_serializes_as_inline_data() {
        let image = InlineImage::new("image/png", "AAAA");
        let value = serde_json::to_value(&image).unwrap();
        assert_eq!(value["mimeType"], "image/png");
        assert_eq!(value["data"], "AAAA");
    }
}
