//! Contract of the remote collection backend.
//!
//! Records cross this boundary as untyped JSON objects. Typed
//! (de)serialisation happens in the resource store so adapters stay
//! independent of the record shapes.

use async_trait::async_trait;
use serde_json::Value;
use thiserror::Error;

use crate::domain::types::SortOrder;

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum GatewayError {
    #[error("transport failure: {0}")]
    Transport(String),
    #[error("backend rejected the request ({code}): {message}")]
    Rejected { code: String, message: String },
    #[error("duplicate value violates a unique constraint: {message}")]
    Conflict { message: String },
    #[error("could not decode backend payload: {0}")]
    Decode(String),
}

impl GatewayError {
    pub fn transport(err: impl std::fmt::Display) -> Self {
        Self::Transport(err.to_string())
    }

    pub fn decode(err: impl std::fmt::Display) -> Self {
        Self::Decode(err.to_string())
    }

    pub fn rejected(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Rejected {
            code: code.into(),
            message: message.into(),
        }
    }

    pub fn conflict(message: impl Into<String>) -> Self {
        Self::Conflict {
            message: message.into(),
        }
    }
}

#[async_trait]
pub trait CollectionGateway: Send + Sync {
    /// Every row of `collection`, sorted by `order` when given.
    async fn select(
        &self,
        collection: &str,
        order: Option<SortOrder>,
    ) -> Result<Vec<Value>, GatewayError>;

    /// First row whose `field` equals `value`.
    async fn select_where(
        &self,
        collection: &str,
        field: &str,
        value: &str,
    ) -> Result<Option<Value>, GatewayError>;

    /// Insert one row and return it with server-assigned columns filled.
    async fn insert(&self, collection: &str, record: Value) -> Result<Value, GatewayError>;

    /// Apply a partial update to the row with `id`. `None` when no row matched.
    async fn update(
        &self,
        collection: &str,
        id: &str,
        changes: Value,
    ) -> Result<Option<Value>, GatewayError>;

    /// Remove the row with `id`. Deleting a missing row succeeds.
    async fn delete(&self, collection: &str, id: &str) -> Result<(), GatewayError>;
}
