//! Collection gateway over the backend's PostgREST endpoint.

use async_trait::async_trait;
use reqwest::{Method, RequestBuilder, Response, StatusCode, Url};
use serde::Deserialize;
use serde_json::Value;
use tracing::debug;

use crate::application::gateway::{CollectionGateway, GatewayError};
use crate::domain::types::SortOrder;

use super::backend::BackendClient;

const UNIQUE_VIOLATION: &str = "23505";

#[derive(Clone, Debug)]
pub struct RestGateway {
    backend: BackendClient,
}

/// Error document returned by PostgREST.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct PostgrestErrorBody {
    code: Option<String>,
    message: Option<String>,
    details: Option<String>,
    hint: Option<String>,
}

impl RestGateway {
    pub fn new(backend: BackendClient) -> Self {
        Self { backend }
    }

    fn collection_url(
        &self,
        collection: &str,
        query: &[(&str, String)],
    ) -> Result<Url, GatewayError> {
        let mut url = self
            .backend
            .url(&format!("rest/v1/{collection}"))
            .map_err(GatewayError::transport)?;
        if !query.is_empty() {
            let mut pairs = url.query_pairs_mut();
            for (key, value) in query {
                pairs.append_pair(key, value);
            }
        }
        Ok(url)
    }

    fn returning(&self, method: Method, url: Url) -> RequestBuilder {
        self.backend
            .request(method, url)
            .header("Prefer", "return=representation")
    }

    async fn rows(request: RequestBuilder) -> Result<Vec<Value>, GatewayError> {
        let response = request.send().await.map_err(GatewayError::transport)?;
        let bytes = Self::success_body(response).await?;
        serde_json::from_slice(&bytes).map_err(GatewayError::decode)
    }

    async fn success_body(response: Response) -> Result<bytes::Bytes, GatewayError> {
        let status = response.status();
        let bytes = response.bytes().await.map_err(GatewayError::transport)?;
        if status.is_success() {
            return Ok(bytes);
        }
        Err(rejection(status, &bytes))
    }
}

fn rejection(status: StatusCode, body: &[u8]) -> GatewayError {
    let parsed: PostgrestErrorBody = serde_json::from_slice(body).unwrap_or_default();
    let message = parsed
        .message
        .filter(|message| !message.is_empty())
        .unwrap_or_else(|| {
            let text = String::from_utf8_lossy(body).trim().to_string();
            if text.is_empty() {
                status.to_string()
            } else {
                text
            }
        });
    let message = match (parsed.details, parsed.hint) {
        (Some(details), _) if !details.is_empty() => format!("{message} ({details})"),
        (_, Some(hint)) if !hint.is_empty() => format!("{message} (hint: {hint})"),
        _ => message,
    };

    if parsed.code.as_deref() == Some(UNIQUE_VIOLATION) || status == StatusCode::CONFLICT {
        return GatewayError::conflict(message);
    }
    let code = parsed
        .code
        .unwrap_or_else(|| status.as_u16().to_string());
    GatewayError::rejected(code, message)
}

fn id_filter(id: &str) -> [(&'static str, String); 1] {
    [("id", format!("eq.{id}"))]
}

#[async_trait]
impl CollectionGateway for RestGateway {
    async fn select(
        &self,
        collection: &str,
        order: Option<SortOrder>,
    ) -> Result<Vec<Value>, GatewayError> {
        let mut query = vec![("select", "*".to_string())];
        if let Some(order) = order {
            let direction = if order.descending { "desc" } else { "asc" };
            query.push(("order", format!("{}.{direction}", order.column)));
        }
        let url = self.collection_url(collection, &query)?;
        debug!(collection, url = %url, "select");

        Self::rows(self.backend.request(Method::GET, url)).await
    }

    async fn select_where(
        &self,
        collection: &str,
        field: &str,
        value: &str,
    ) -> Result<Option<Value>, GatewayError> {
        let query = [
            ("select", "*".to_string()),
            (field, format!("eq.{value}")),
            ("limit", "1".to_string()),
        ];
        let url = self.collection_url(collection, &query)?;
        debug!(collection, field, "select_where");

        let rows = Self::rows(self.backend.request(Method::GET, url)).await?;
        Ok(rows.into_iter().next())
    }

    async fn insert(&self, collection: &str, record: Value) -> Result<Value, GatewayError> {
        let url = self.collection_url(collection, &[])?;
        debug!(collection, "insert");

        let rows = Self::rows(self.returning(Method::POST, url).json(&record)).await?;
        rows.into_iter()
            .next()
            .ok_or_else(|| GatewayError::decode("insert returned no representation"))
    }

    async fn update(
        &self,
        collection: &str,
        id: &str,
        changes: Value,
    ) -> Result<Option<Value>, GatewayError> {
        let url = self.collection_url(collection, &id_filter(id))?;
        debug!(collection, id, "update");

        let rows = Self::rows(self.returning(Method::PATCH, url).json(&changes)).await?;
        Ok(rows.into_iter().next())
    }

    async fn delete(&self, collection: &str, id: &str) -> Result<(), GatewayError> {
        let url = self.collection_url(collection, &id_filter(id))?;
        debug!(collection, id, "delete");

        let response = self
            .backend
            .request(Method::DELETE, url)
            .send()
            .await
            .map_err(GatewayError::transport)?;
        Self::success_body(response).await.map(|_| ())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unique_violation_maps_to_conflict() {
        let body = br#"{"code":"23505","message":"duplicate key value violates unique constraint \"posts_slug_key\"","details":"Key (slug)=(hola) already exists.","hint":null}"#;
        let err = rejection(StatusCode::CONFLICT, body);
        match err {
            GatewayError::Conflict { message } => {
                assert!(message.contains("posts_slug_key"));
                assert!(message.contains("already exists"));
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn other_errors_keep_backend_code_and_message() {
        let body = br#"{"code":"42501","message":"permission denied for table settings","details":null,"hint":null}"#;
        assert_eq!(
            rejection(StatusCode::FORBIDDEN, body),
            GatewayError::rejected("42501", "permission denied for table settings")
        );
    }

    #[test]
    fn non_json_error_falls_back_to_status() {
        assert_eq!(
            rejection(StatusCode::BAD_GATEWAY, b""),
            GatewayError::rejected("502", "502 Bad Gateway")
        );
        assert_eq!(
            rejection(StatusCode::SERVICE_UNAVAILABLE, b"upstream down"),
            GatewayError::rejected("503", "upstream down")
        );
    }
}
