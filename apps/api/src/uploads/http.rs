use std::time::Duration;

use async_trait::async_trait;
use reqwest::multipart::{Form, Part};
use reqwest::Client;
use serde::Deserialize;
use tracing::{info, warn};

use super::{check_size, FileUploader, StoredFile, UploadError, UploadFile, UploadMeta};

/// Multipart client for the remote upload endpoint.
pub struct HttpFileUploader {
    client: Client,
    url: String,
    max_bytes: usize,
}

/// The endpoint answers with `{"path": ...}` or `{"url": ...}`.
#[derive(Debug, Deserialize)]
struct UploadResponse {
    path: Option<String>,
    url: Option<String>,
}

impl HttpFileUploader {
    pub fn new(url: &str, timeout: Duration, max_bytes: usize) -> Result<Self, UploadError> {
        Ok(Self {
            client: Client::builder().timeout(timeout).build()?,
            url: url.to_string(),
            max_bytes,
        })
    }
}

#[async_trait]
impl FileUploader for HttpFileUploader {
    async fn upload(
        &self,
        bearer: &str,
        file: UploadFile,
        meta: &UploadMeta,
    ) -> Result<StoredFile, UploadError> {
        check_size(&file, self.max_bytes)?;

        let size = file.bytes.len();
        let mut part = Part::bytes(file.bytes.to_vec()).file_name(file.file_name.clone());
        if let Some(content_type) = &file.content_type {
            part = part
                .mime_str(content_type)
                .map_err(|_| UploadError::InvalidContentType(content_type.clone()))?;
        }
        let form = Form::new()
            .part("file", part)
            .text("ownerId", meta.owner_id.clone())
            .text("section", meta.section.clone())
            .text("recordIndex", meta.record_index.to_string());

        let response = self
            .client
            .post(&self.url)
            .bearer_auth(bearer)
            .multipart(form)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            warn!("Upload API returned {status}: {message}");
            return Err(UploadError::Status {
                status: status.as_u16(),
                message,
            });
        }

        let body: UploadResponse = response.json().await?;
        let path = body.path.or(body.url).ok_or(UploadError::MissingPath)?;
        info!(
            "Uploaded {} ({size} bytes) for {} {}#{}",
            file.file_name, meta.owner_id, meta.section, meta.record_index
        );
        Ok(StoredFile { path })
    }
}
