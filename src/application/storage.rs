//! Contract of the object storage used for project and post images.

use async_trait::async_trait;
use bytes::Bytes;
use thiserror::Error;
use url::Url;

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum StorageError {
    #[error("storage transport failure: {0}")]
    Transport(String),
    #[error("storage rejected `{path}`: {message}")]
    Rejected { path: String, message: String },
    #[error("invalid object path `{path}`")]
    InvalidPath { path: String },
}

#[async_trait]
pub trait ObjectStorage: Send + Sync {
    /// Store `bytes` at `path` inside `bucket`, returning the stored path.
    async fn store(
        &self,
        bucket: &str,
        path: &str,
        bytes: Bytes,
        content_type: &str,
    ) -> Result<String, StorageError>;

    /// Publicly resolvable address of a stored object.
    fn public_url(&self, bucket: &str, path: &str) -> Result<Url, StorageError>;
}
