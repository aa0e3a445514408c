use async_trait::async_trait;
use tokio::sync::Mutex;
use uuid::Uuid;

use super::{check_size, FileUploader, StoredFile, UploadError, UploadFile, UploadMeta};

/// Hands out `memory://` paths for local development. File contents are
/// discarded after the size check; only the issued paths are remembered.
pub struct MemoryFileUploader {
    max_bytes: usize,
    paths: Mutex<Vec<String>>,
}

impl MemoryFileUploader {
    pub fn new(max_bytes: usize) -> Self {
        Self {
            max_bytes,
            paths: Mutex::new(Vec::new()),
        }
    }

    pub async fn stored_paths(&self) -> Vec<String> {
        self.paths.lock().await.clone()
    }
}

#[async_trait]
impl FileUploader for MemoryFileUploader {
    async fn upload(
        &self,
        _bearer: &str,
        file: UploadFile,
        meta: &UploadMeta,
    ) -> Result<StoredFile, UploadError> {
        check_size(&file, self.max_bytes)?;
        let path = format!(
            "memory://{}/{}/{}-{}",
            meta.owner_id,
            meta.section,
            Uuid::new_v4(),
            file.file_name
        );
        self.paths.lock().await.push(path.clone());
        Ok(StoredFile { path })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bytes::Bytes;

    #[tokio::test]
    async fn test_path_is_scoped_to_owner_and_section() {
        let uploader = MemoryFileUploader::new(1024);
        let stored = uploader
            .upload(
                "t",
                UploadFile {
                    file_name: "offer.pdf".to_string(),
                    content_type: None,
                    bytes: Bytes::from_static(b"%PDF"),
                },
                &UploadMeta {
                    owner_id: "u1".to_string(),
                    section: "workExperience".to_string(),
                    record_index: 0,
                },
            )
            .await
            .unwrap();

        assert!(stored.path.starts_with("memory://u1/workExperience/"));
        assert!(stored.path.ends_with("-offer.pdf"));
        assert_eq!(uploader.stored_paths().await, vec![stored.path]);
    }
}
