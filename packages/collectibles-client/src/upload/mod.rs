//! Image uploads for the create form.

mod handlers;
mod router;

pub use router::create as create_router;

use alloy_primitives::hex;
use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use std::future::Future;
use std::path::{Path, PathBuf};
use std::sync::atomic::Ordering;
use tracing::{info, warn};

use crate::metrics::METRICS;

/// Accepted image content types and the extension used when the upload has none.
pub const ALLOWED_TYPES: [(&str, &str); 4] = [
    ("image/jpeg", "jpg"),
    ("image/png", "png"),
    ("image/gif", "gif"),
    ("image/webp", "webp"),
];

/// An uploaded file as received.
#[derive(Debug, Clone)]
pub struct UploadFile {
    pub file_name: String,
    pub content_type: String,
    pub bytes: Vec<u8>,
}

impl UploadFile {
    /// Read a local image, guessing the content type from its extension.
    pub fn from_path(path: &Path) -> Result<Self, UploadError> {
        let bytes = std::fs::read(path).map_err(|e| UploadError::Io(format!("{}: {e}", path.display())))?;
        let extension = path
            .extension()
            .and_then(|e| e.to_str())
            .map(str::to_ascii_lowercase)
            .unwrap_or_default();
        let content_type = match extension.as_str() {
            "jpg" | "jpeg" => "image/jpeg",
            "png" => "image/png",
            "gif" => "image/gif",
            "webp" => "image/webp",
            _ => "application/octet-stream",
        };
        Ok(Self {
            file_name: path
                .file_name()
                .and_then(|n| n.to_str())
                .unwrap_or_default()
                .to_string(),
            content_type: content_type.to_string(),
            bytes,
        })
    }
}

#[derive(Debug, thiserror::Error)]
pub enum UploadError {
    #[error("File size exceeds the {limit} byte limit")]
    TooLarge { limit: usize },
    #[error("Unsupported file type: {0}")]
    UnsupportedType(String),
    #[error("No file uploaded")]
    Missing,
    #[error("Failed to store file: {0}")]
    Io(String),
}

/// Stores an image and returns its public path.
pub trait Uploader: Send + Sync {
    fn upload(&self, file: UploadFile) -> impl Future<Output = Result<String, UploadError>> + Send;
}

/// Writes uploads into a directory served at `/uploads`.
#[derive(Debug, Clone)]
pub struct DiskUploader {
    dir: PathBuf,
    max_bytes: usize,
}

impl DiskUploader {
    pub fn new(dir: impl Into<PathBuf>, max_bytes: usize) -> Self {
        Self {
            dir: dir.into(),
            max_bytes,
        }
    }

    /// Size and content-type checks. Returns the stored file's extension.
    pub fn check(&self, file: &UploadFile) -> Result<String, UploadError> {
        if file.bytes.len() > self.max_bytes {
            return Err(UploadError::TooLarge {
                limit: self.max_bytes,
            });
        }
        let content_type = file.content_type.to_ascii_lowercase();
        let (_, default_ext) = ALLOWED_TYPES
            .iter()
            .find(|(allowed, _)| *allowed == content_type)
            .ok_or_else(|| UploadError::UnsupportedType(file.content_type.clone()))?;

        let ext = Path::new(&file.file_name)
            .extension()
            .and_then(|e| e.to_str())
            .filter(|e| !e.is_empty() && e.chars().all(|c| c.is_ascii_alphanumeric()))
            .map(str::to_ascii_lowercase)
            .unwrap_or_else(|| (*default_ext).to_string());
        Ok(ext)
    }
}

impl Uploader for DiskUploader {
    async fn upload(&self, file: UploadFile) -> Result<String, UploadError> {
        let ext = match self.check(&file) {
            Ok(ext) => ext,
            Err(e) => {
                METRICS.uploads_rejected.fetch_add(1, Ordering::Relaxed);
                warn!(file = %file.file_name, content_type = %file.content_type, error = %e, "Upload rejected");
                return Err(e);
            }
        };

        let name = format!("{}.{ext}", hex::encode(rand::random::<[u8; 16]>()));
        tokio::fs::create_dir_all(&self.dir)
            .await
            .map_err(|e| UploadError::Io(e.to_string()))?;
        tokio::fs::write(self.dir.join(&name), &file.bytes)
            .await
            .map_err(|e| UploadError::Io(e.to_string()))?;

        METRICS.uploads_accepted.fetch_add(1, Ordering::Relaxed);
        info!(file = %file.file_name, stored = %name, bytes = file.bytes.len(), "Upload stored");
        Ok(format!("/uploads/{name}"))
    }
}

/// Inline `data:` URL for the create form's image field.
pub fn data_url(file: &UploadFile) -> String {
    format!("data:{};base64,{}", file.content_type, STANDARD.encode(&file.bytes))
}
