//! Object storage over the backend's storage endpoint.

use async_trait::async_trait;
use bytes::Bytes;
use reqwest::{Method, Url, header::CONTENT_TYPE};
use serde::Deserialize;
use tracing::debug;

use crate::application::storage::{ObjectStorage, StorageError};

use super::backend::BackendClient;

#[derive(Clone, Debug)]
pub struct RestObjectStorage {
    backend: BackendClient,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct StorageErrorBody {
    message: Option<String>,
    error: Option<String>,
}

impl RestObjectStorage {
    pub fn new(backend: BackendClient) -> Self {
        Self { backend }
    }

    fn object_url(&self, prefix: &str, bucket: &str, path: &str) -> Result<Url, StorageError> {
        ensure_valid_path(bucket)?;
        ensure_valid_path(path)?;
        self.backend
            .url(&format!("{prefix}/{bucket}/{path}"))
            .map_err(|_| StorageError::InvalidPath {
                path: path.to_string(),
            })
    }
}

fn ensure_valid_path(path: &str) -> Result<(), StorageError> {
    let invalid = path.is_empty()
        || path.starts_with('/')
        || path
            .split('/')
            .any(|segment| segment.is_empty() || segment == "." || segment == "..");
    if invalid {
        return Err(StorageError::InvalidPath {
            path: path.to_string(),
        });
    }
    Ok(())
}

#[async_trait]
impl ObjectStorage for RestObjectStorage {
    async fn store(
        &self,
        bucket: &str,
        path: &str,
        bytes: Bytes,
        content_type: &str,
    ) -> Result<String, StorageError> {
        let url = self.object_url("storage/v1/object", bucket, path)?;
        debug!(bucket, path, content_type, size = bytes.len(), "store object");

        let response = self
            .backend
            .request(Method::POST, url)
            .header(CONTENT_TYPE, content_type)
            .header("x-upsert", "false")
            .body(bytes)
            .send()
            .await
            .map_err(|err| StorageError::Transport(err.to_string()))?;

        let status = response.status();
        if status.is_success() {
            return Ok(path.to_string());
        }

        let body = response.bytes().await.unwrap_or_default();
        let parsed: StorageErrorBody = serde_json::from_slice(&body).unwrap_or_default();
        let message = parsed
            .message
            .or(parsed.error)
            .unwrap_or_else(|| status.to_string());
        Err(StorageError::Rejected {
            path: path.to_string(),
            message,
        })
    }

    fn public_url(&self, bucket: &str, path: &str) -> Result<Url, StorageError> {
        self.object_url("storage/v1/object/public", bucket, path)
    }
}
