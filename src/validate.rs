//! Upload candidates and the type/size policy applied before any network call.

use std::path::Path;

use anyhow::{Context, Result};
use thiserror::Error;

/// Largest accepted upload, matching the service-side limit.
pub const MAX_UPLOAD_BYTES: u64 = 5 * 1024 * 1024;

/// Declared media types the extraction service accepts.
pub const ALLOWED_MIME_TYPES: [&str; 3] = ["image/jpeg", "image/png", "image/jpg"];

/// An image picked for upload. Exists only for one validate→submit call.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct UploadCandidate {
    pub bytes: Vec<u8>,
    pub mime_type: String,
    pub file_name: String,
}

impl UploadCandidate {
    pub fn byte_len(&self) -> u64 {
        self.bytes.len() as u64
    }

    /// Read a candidate from disk, deriving the declared type from the
    /// file extension. Unknown extensions get a type the validator rejects.
    pub async fn from_path(path: &Path) -> Result<Self> {
        let bytes = tokio::fs::read(path)
            .await
            .with_context(|| format!("could not read {}", path.display()))?;
        let file_name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| "upload".to_string());
        Ok(Self {
            bytes,
            mime_type: mime_for_extension(path),
            file_name,
        })
    }
}

fn mime_for_extension(path: &Path) -> String {
    let ext = path
        .extension()
        .map(|e| e.to_string_lossy().to_ascii_lowercase())
        .unwrap_or_default();
    match ext.as_str() {
        "jpg" | "jpeg" => "image/jpeg",
        "png" => "image/png",
        _ => "application/octet-stream",
    }
    .to_string()
}

/// Policy failures, each carrying its user-facing message.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("Please upload a JPG or PNG image.")]
    UnsupportedType,
    #[error("Max file size is 5MB.")]
    TooLarge,
}

/// Check a candidate against the upload policy. No side effects; must run
/// before any request is issued.
pub fn validate(candidate: &UploadCandidate) -> Result<(), ValidationError> {
    if !ALLOWED_MIME_TYPES.contains(&candidate.mime_type.as_str()) {
        return Err(ValidationError::UnsupportedType);
    }
    if candidate.byte_len() > MAX_UPLOAD_BYTES {
        return Err(ValidationError::TooLarge);
    }
    Ok(())
}
