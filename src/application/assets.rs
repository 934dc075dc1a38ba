//! Image uploads for projects and posts.

use std::path::Path;
use std::sync::Arc;

use bytes::Bytes;
use thiserror::Error;
use tracing::{info, warn};
use url::Url;
use uuid::Uuid;

use crate::application::storage::{ObjectStorage, StorageError};

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum UploadError {
    #[error("refusing to upload an empty file")]
    EmptyPayload,
    #[error("object storage is not configured")]
    NotConfigured,
    #[error(transparent)]
    Storage(#[from] StorageError),
}

/// Stores image bytes under generated names and resolves their public URL.
#[derive(Clone)]
pub struct AssetUploader {
    storage: Arc<dyn ObjectStorage>,
    bucket: String,
}

impl AssetUploader {
    pub fn new(storage: Arc<dyn ObjectStorage>, bucket: impl Into<String>) -> Self {
        Self {
            storage,
            bucket: bucket.into(),
        }
    }

    pub fn bucket(&self) -> &str {
        &self.bucket
    }

    /// Upload `bytes` into `folder`. The original file name only contributes
    /// its extension; the stored name is a fresh UUID so uploads never
    /// overwrite each other.
    pub async fn upload(
        &self,
        folder: &str,
        file_name: &str,
        bytes: Bytes,
    ) -> Result<Url, UploadError> {
        if bytes.is_empty() {
            warn!(folder, file_name, "Rejected empty upload");
            return Err(UploadError::EmptyPayload);
        }

        let path = object_path(folder, file_name, Uuid::new_v4());
        let content_type = mime_guess::from_path(file_name)
            .first_or_octet_stream()
            .essence_str()
            .to_string();
        let size = bytes.len();

        let stored = self
            .storage
            .store(&self.bucket, &path, bytes, &content_type)
            .await?;
        let url = self.storage.public_url(&self.bucket, &stored)?;

        info!(
            bucket = %self.bucket,
            path = %stored,
            content_type = %content_type,
            size,
            "Uploaded asset"
        );
        Ok(url)
    }
}

fn object_path(folder: &str, file_name: &str, id: Uuid) -> String {
    match extension_of(file_name) {
        Some(ext) => format!("{folder}/{id}.{ext}"),
        None => format!("{folder}/{id}"),
    }
}

fn extension_of(file_name: &str) -> Option<String> {
    Path::new(file_name)
        .extension()
        .and_then(|value| value.to_str())
        .map(|value| {
            value
                .chars()
                .filter(char::is_ascii_alphanumeric)
                .collect::<String>()
                .to_ascii_lowercase()
        })
        .filter(|value| !value.is_empty())
}
