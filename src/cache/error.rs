use thiserror::Error;

use crate::application::assets::UploadError;
use crate::application::gateway::GatewayError;
use crate::domain::error::DomainError;
use crate::domain::types::ResourceKind;

/// Outcome of a failed store operation.
///
/// `Clone` because one de-duplicated fetch hands the same outcome to every
/// caller that joined it.
#[derive(Debug, Clone, Error)]
pub enum StoreError {
    #[error(transparent)]
    Validation(#[from] DomainError),
    #[error("failed to fetch {kind} records: {source}")]
    Fetch {
        kind: ResourceKind,
        #[source]
        source: GatewayError,
    },
    #[error("failed to write {kind} record: {source}")]
    Write {
        kind: ResourceKind,
        #[source]
        source: GatewayError,
    },
    #[error("{kind} `{key}` not found")]
    NotFound { kind: ResourceKind, key: String },
    #[error("upload failed: {0}")]
    Upload(#[from] UploadError),
}

impl StoreError {
    pub fn fetch(kind: ResourceKind, source: GatewayError) -> Self {
        Self::Fetch { kind, source }
    }

    pub fn write(kind: ResourceKind, source: GatewayError) -> Self {
        Self::Write { kind, source }
    }

    pub fn not_found(kind: ResourceKind, key: impl ToString) -> Self {
        Self::NotFound {
            kind,
            key: key.to_string(),
        }
    }

    /// Whether the backend refused a write because of a unique constraint,
    /// such as a duplicate post slug.
    pub fn is_conflict(&self) -> bool {
        matches!(
            self,
            StoreError::Write {
                source: GatewayError::Conflict { .. },
                ..
            }
        )
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, StoreError::NotFound { .. })
    }
}
