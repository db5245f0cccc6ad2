//! Writes history images back to disk.

use std::path::{Path, PathBuf};

use tracing::info;
use vedit_core::{Result, parse_data_url};

/// Decodes `data_url` and writes the image bytes to `path`.
///
/// When `path` has no extension, one matching the image's media type is
/// appended. Returns the path actually written.
pub async fn export_image(data_url: &str, path: &Path) -> Result<PathBuf> {
    let image = parse_data_url(data_url)?;
    let bytes = image.decode_bytes()?;

    let target = with_extension_for(path, &image.mime_type);
    if let Some(parent) = target.parent().filter(|p| !p.as_os_str().is_empty()) {
        tokio::fs::create_dir_all(parent).await?;
    }
    tokio::fs::write(&target, &bytes).await?;

    info!(path = %target.display(), size = bytes.len(), "exported image");
    Ok(target)
}

fn with_extension_for(path: &Path, mime_type: &str) -> PathBuf {
    if path.extension().is_some() {
        return path.to_path_buf();
    }
    match mime_guess::get_mime_extensions_str(mime_type).and_then(|exts| exts.first()) {
        Some(ext) => path.with_extension(ext),
        None => path.to_path_buf(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;
    use vedit_core::encode;

    #[tokio::test]
    async fn test_export_appends_extension() {
        let temp_dir = TempDir::new().unwrap();
        let url = encode(&[9, 8, 7], "image/png");

        let written = export_image(&url, &temp_dir.path().join("result"))
            .await
            .unwrap();
        assert_eq!(written, temp_dir.path().join("result.png"));
        assert_eq!(std::fs::read(written).unwrap(), vec![9, 8, 7]);
    }

    #[tokio::test]
    async fn test_export_keeps_explicit_extension_and_creates_dirs() {
        let temp_dir = TempDir::new().unwrap();
        let url = encode(&[1], "image/png");
        let target = temp_dir.path().join("out").join("edited.webp");

        let written = export_image(&url, &target).await.unwrap();
        assert_eq!(written, target);
        assert!(target.exists());
    }

    #[tokio::test]
    async fn test_export_rejects_malformed_data_url() {
        let temp_dir = TempDir::new().unwrap();
        let err = export_image("not a data url", &temp_dir.path().join("x.png"))
            .await
            .unwrap_err();
        assert!(err.is_format());
    }
}
