//! File upload API client. A file plus ownership metadata goes in, a stored
//! file path or URL comes out.

pub mod http;
pub mod memory;

use async_trait::async_trait;
use bytes::Bytes;
use serde::{Deserialize, Serialize};
use thiserror::Error;

pub use http::HttpFileUploader;
pub use memory::MemoryFileUploader;

#[derive(Debug, Error)]
pub enum UploadError {
    #[error("The selected file is empty")]
    Empty,

    #[error("The selected file is {size} bytes; the limit is {limit} bytes")]
    TooLarge { size: usize, limit: usize },

    #[error("Unsupported file type '{0}'")]
    InvalidContentType(String),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Upload API error (status {status}): {message}")]
    Status { status: u16, message: String },

    #[error("Upload API response did not include a file path")]
    MissingPath,
}

impl UploadError {
    pub fn status(&self) -> Option<u16> {
        match self {
            UploadError::Status { status, .. } => Some(*status),
            UploadError::Http(e) => e.status().map(|s| s.as_u16()),
            _ => None,
        }
    }
}

/// A local file selected for upload.
#[derive(Debug, Clone, PartialEq)]
pub struct UploadFile {
    pub file_name: String,
    pub content_type: Option<String>,
    pub bytes: Bytes,
}

/// Who owns an upload and which record it belongs to.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct UploadMeta {
    pub owner_id: String,
    pub section: String,
    pub record_index: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct StoredFile {
    pub path: String,
}

#[async_trait]
pub trait FileUploader: Send + Sync {
    async fn upload(
        &self,
        bearer: &str,
        file: UploadFile,
        meta: &UploadMeta,
    ) -> Result<StoredFile, UploadError>;
}

/// Rejects empty and oversized files before any network call.
pub fn check_size(file: &UploadFile, limit: usize) -> Result<(), UploadError> {
    let size = file.bytes.len();
    if size == 0 {
        return Err(UploadError::Empty);
    }
    if size > limit {
        return Err(UploadError::TooLarge { size, limit });
    }
    Ok(())
}
