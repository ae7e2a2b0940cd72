//! Upload naming and validation for resumes saved under the upload directory.

use std::path::{Path, PathBuf};

use chrono::Local;
use thiserror::Error;
use tracing::info;
use uuid::Uuid;

use crate::parsing::extractor::DocumentFormat;

#[derive(Debug, Error, PartialEq)]
pub enum UploadError {
    #[error("Unsupported file format for '{0}'. Please upload PDF, DOCX, or TXT.")]
    UnsupportedFormat(String),

    #[error("File is {size} bytes; the limit is {limit} bytes")]
    TooLarge { size: usize, limit: usize },

    #[error("Uploaded file is empty")]
    Empty,
}

/// Strips directory components and replaces anything outside `[A-Za-z0-9._-]` with `_`.
pub fn sanitize_file_name(original: &str) -> String {
    let base = original
        .rsplit(['/', '\\'])
        .next()
        .unwrap_or_default()
        .trim();
    let cleaned: String = base
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || matches!(c, '.' | '-' | '_') {
                c
            } else {
                '_'
            }
        })
        .collect();
    let cleaned = cleaned.trim_start_matches('.');
    if cleaned.is_empty() {
        "resume".to_string()
    } else {
        cleaned.to_string()
    }
}

/// `<dir>/YYYYmmdd_HHMMSS_<8 hex>_<sanitised name>`
pub fn unique_upload_path(dir: &Path, original_name: &str) -> PathBuf {
    let stamp = Local::now().format("%Y%m%d_%H%M%S");
    let suffix = &Uuid::new_v4().simple().to_string()[..8];
    dir.join(format!(
        "{stamp}_{suffix}_{}",
        sanitize_file_name(original_name)
    ))
}

/// Checks extension and size before anything touches disk.
pub fn validate_upload(
    original_name: &str,
    size: usize,
    limit: usize,
) -> Result<DocumentFormat, UploadError> {
    let format = DocumentFormat::from_path(Path::new(original_name))
        .ok_or_else(|| UploadError::UnsupportedFormat(original_name.to_string()))?;
    if size == 0 {
        return Err(UploadError::Empty);
    }
    if size > limit {
        return Err(UploadError::TooLarge { size, limit });
    }
    Ok(format)
}

/// Writes the bytes under `dir`, creating it if needed, and returns the saved path.
pub async fn save_upload(dir: &Path, original_name: &str, data: &[u8]) -> std::io::Result<PathBuf> {
    tokio::fs::create_dir_all(dir).await?;
    let path = unique_upload_path(dir, original_name);
    tokio::fs::write(&path, data).await?;
    info!("Saved upload {} ({} bytes)", path.display(), data.len());
    Ok(path)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sanitize_strips_paths_and_odd_characters() {
        assert_eq!(sanitize_file_name("../../etc/passwd"), "passwd");
        assert_eq!(sanitize_file_name("C:\\Users\\me\\My CV (final).pdf"), "My_CV__final_.pdf");
        assert_eq!(sanitize_file_name(".hidden.txt"), "hidden.txt");
        assert_eq!(sanitize_file_name("   "), "resume");
    }

    #[test]
    fn test_upload_path_shape() {
        let path = unique_upload_path(Path::new("uploads"), "jane doe.docx");
        let name = path.file_name().unwrap().to_str().unwrap();
        let parts: Vec<&str> = name.splitn(4, '_').collect();
        assert_eq!(parts.len(), 4);
        assert_eq!(parts[0].len(), 8);
        assert_eq!(parts[1].len(), 6);
        assert_eq!(parts[2].len(), 8);
        assert_eq!(parts[3], "jane_doe.docx");
        assert!(path.starts_with("uploads"));
    }

    #[test]
    fn test_same_name_same_second_does_not_collide() {
        let a = unique_upload_path(Path::new("u"), "cv.pdf");
        let b = unique_upload_path(Path::new("u"), "cv.pdf");
        assert_ne!(a, b);
    }

    #[test]
    fn test_validate_upload() {
        assert_eq!(validate_upload("cv.PDF", 10, 100), Ok(DocumentFormat::Pdf));
        assert_eq!(
            validate_upload("cv.exe", 10, 100),
            Err(UploadError::UnsupportedFormat("cv.exe".to_string()))
        );
        assert_eq!(validate_upload("cv.txt", 0, 100), Err(UploadError::Empty));
        assert_eq!(
            validate_upload("cv.txt", 101, 100),
            Err(UploadError::TooLarge { size: 101, limit: 100 })
        );
    }

    #[tokio::test]
    async fn test_save_upload_creates_directory() {
        let dir = tempfile::tempdir().unwrap();
        let target = dir.path().join("nested");
        let path = save_upload(&target, "cv.txt", b"Jane Doe").await.unwrap();
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "Jane Doe");
        assert!(path.starts_with(&target));
    }
}
