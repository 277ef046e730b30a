//! File storage for book attachments.
//!
//! Attachments are stored under the configured media root, keyed
//! `{kind}/{book_id}-{kind}.{ext}`. The key is always derived from the
//! book's allocated primary id, never inferred from the newest row.

use std::path::{Path, PathBuf};

use crate::{
    config::StorageConfig,
    error::{AppError, AppResult},
};

/// Attachment kinds a book may carry
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AttachmentKind {
    /// PDF summary
    Summary,
    /// Cover image
    Cover,
}

impl AttachmentKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            AttachmentKind::Summary => "summary",
            AttachmentKind::Cover => "cover",
        }
    }

    /// Check the declared content type of an upload against the kind
    pub fn accepts(&self, content_type: &str) -> bool {
        match self {
            AttachmentKind::Summary => content_type == "application/pdf",
            AttachmentKind::Cover => content_type.starts_with("image/"),
        }
    }

    /// Validation message for a rejected upload
    pub fn rejection(&self) -> &'static str {
        match self {
            AttachmentKind::Summary => "File type for summary invalid.",
            AttachmentKind::Cover => "File type for image cover invalid.",
        }
    }
}

impl std::fmt::Display for AttachmentKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Storage key for an attachment: `{kind}/{book_id}-{kind}.{ext}`
pub fn attachment_key(kind: AttachmentKind, book_id: i32, ext: &str) -> String {
    format!("{kind}/{book_id}-{kind}.{ext}", kind = kind.as_str())
}

/// File extension of an uploaded filename, lowercased, without the dot
pub fn extension_of(filename: &str) -> Option<String> {
    Path::new(filename)
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_lowercase())
}

#[derive(Clone)]
pub struct StorageService {
    root: PathBuf,
}

impl StorageService {
    pub fn new(config: &StorageConfig) -> Self {
        Self {
            root: PathBuf::from(&config.media_root),
        }
    }

    fn absolute(&self, key: &str) -> PathBuf {
        self.root.join(key)
    }

    /// Write an attachment blob under its storage key
    pub async fn save(&self, key: &str, bytes: &[u8]) -> AppResult<()> {
        let path = self.absolute(key);
        if let Some(parent) = path.parent() {
            tokio::fs::create_dir_all(parent)
                .await
                .map_err(|e| AppError::Internal(format!("Failed to create media dir: {}", e)))?;
        }
        tokio::fs::write(&path, bytes)
            .await
            .map_err(|e| AppError::Internal(format!("Failed to write {}: {}", key, e)))?;
        Ok(())
    }

    /// Remove an attachment blob. Missing files are not an error; the
    /// record column is the source of truth.
    pub async fn remove(&self, key: &str) -> AppResult<()> {
        match tokio::fs::remove_file(self.absolute(key)).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(AppError::Internal(format!("Failed to remove {}: {}", key, e))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::StorageConfig;

    #[test]
    fn test_attachment_key_format() {
        assert_eq!(attachment_key(AttachmentKind::Summary, 12, "pdf"), "summary/12-summary.pdf");
        assert_eq!(attachment_key(AttachmentKind::Cover, 3, "png"), "cover/3-cover.png");
    }

    #[test]
    fn test_extension_of() {
        assert_eq!(extension_of("scan.PDF"), Some("pdf".to_string()));
        assert_eq!(extension_of("cover.jpeg"), Some("jpeg".to_string()));
        assert_eq!(extension_of("noext"), None);
    }

    #[test]
    fn test_accepts_content_type() {
        assert!(AttachmentKind::Summary.accepts("application/pdf"));
        assert!(!AttachmentKind::Summary.accepts("image/png"));
        assert!(AttachmentKind::Cover.accepts("image/png"));
        assert!(AttachmentKind::Cover.accepts("image/jpeg"));
        assert!(!AttachmentKind::Cover.accepts("application/pdf"));
    }

    #[tokio::test]
    async fn test_save_and_remove_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let service = StorageService::new(&StorageConfig {
            media_root: dir.path().to_string_lossy().into_owned(),
        });

        let key = attachment_key(AttachmentKind::Cover, 7, "png");
        service.save(&key, b"not-a-real-png").await.unwrap();
        assert!(dir.path().join("cover/7-cover.png").exists());

        service.remove(&key).await.unwrap();
        assert!(!dir.path().join("cover/7-cover.png").exists());

        // Removing twice is fine
        service.remove(&key).await.unwrap();
    }
}
