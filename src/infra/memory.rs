//! In-process backends with the same observable behaviour as the hosted
//! service.

use std::cmp::Ordering as CmpOrdering;
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};
use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;
use bytes::Bytes;
use serde_json::{Map, Value};
use time::OffsetDateTime;
use time::format_description::well_known::Rfc3339;
use url::Url;
use uuid::Uuid;

use crate::application::contact::{LedgerError, SubmissionLedger};
use crate::application::gateway::{CollectionGateway, GatewayError};
use crate::application::storage::{ObjectStorage, StorageError};
use crate::cache::lock::mutex_lock;
use crate::domain::types::SortOrder;

const SOURCE: &str = "infra::memory";

/// Gateway operations, used to target injected failures.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum GatewayOp {
    Select,
    SelectWhere,
    Insert,
    Update,
    Delete,
}

/// Number of calls received per operation.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CallCounts {
    pub select: usize,
    pub select_where: usize,
    pub insert: usize,
    pub update: usize,
    pub delete: usize,
}

#[derive(Debug, Default)]
struct CallCounters {
    select: AtomicUsize,
    select_where: AtomicUsize,
    insert: AtomicUsize,
    update: AtomicUsize,
    delete: AtomicUsize,
}

impl CallCounters {
    fn bump(&self, op: GatewayOp) {
        let counter = match op {
            GatewayOp::Select => &self.select,
            GatewayOp::SelectWhere => &self.select_where,
            GatewayOp::Insert => &self.insert,
            GatewayOp::Update => &self.update,
            GatewayOp::Delete => &self.delete,
        };
        counter.fetch_add(1, Ordering::SeqCst);
    }

    fn snapshot(&self) -> CallCounts {
        CallCounts {
            select: self.select.load(Ordering::SeqCst),
            select_where: self.select_where.load(Ordering::SeqCst),
            insert: self.insert.load(Ordering::SeqCst),
            update: self.update.load(Ordering::SeqCst),
            delete: self.delete.load(Ordering::SeqCst),
        }
    }
}

#[derive(Debug, Clone)]
struct StoredRow {
    seq: u64,
    created_at: OffsetDateTime,
    value: Map<String, Value>,
}

#[derive(Debug, Default)]
struct Table {
    next_id: i64,
    rows: Vec<StoredRow>,
}

/// Collection gateway holding every table in memory.
///
/// Mirrors the hosted schema: `projects` rows get UUID ids, the other
/// collections get increasing integer ids, timestamps and column defaults
/// are filled on insert and `posts.slug` is unique.
#[derive(Debug, Default)]
pub struct MemoryGateway {
    tables: Mutex<HashMap<String, Table>>,
    seq: AtomicU64,
    calls: CallCounters,
    failures: Mutex<Vec<(GatewayOp, GatewayError)>>,
    latency: Option<Duration>,
}

impl MemoryGateway {
    pub fn new() -> Self {
        Self::default()
    }

    /// Delay every operation by `latency`, leaving room for concurrent
    /// callers to overlap.
    pub fn with_latency(latency: Duration) -> Self {
        Self {
            latency: Some(latency),
            ..Self::default()
        }
    }

    pub fn calls(&self) -> CallCounts {
        self.calls.snapshot()
    }

    /// Make the next call of `op` fail with `error`.
    pub fn fail_next(&self, op: GatewayOp, error: GatewayError) {
        mutex_lock(&self.failures, SOURCE, "fail_next").push((op, error));
    }

    /// Insert rows directly, applying the same defaults as `insert`.
    /// Seeding is not counted as a call.
    pub fn seed(&self, collection: &str, rows: Vec<Value>) {
        let mut tables = mutex_lock(&self.tables, SOURCE, "seed");
        let table = tables.entry(collection.to_string()).or_default();
        for row in rows {
            if let Value::Object(fields) = row {
                let stored = self.prepare_insert(collection, table, fields);
                table.rows.push(stored);
            }
        }
    }

    /// Number of rows currently stored in `collection`.
    pub fn row_count(&self, collection: &str) -> usize {
        mutex_lock(&self.tables, SOURCE, "row_count")
            .get(collection)
            .map_or(0, |table| table.rows.len())
    }

    async fn enter(&self, op: GatewayOp) -> Result<(), GatewayError> {
        self.calls.bump(op);
        match self.latency {
            Some(latency) => tokio::time::sleep(latency).await,
            None => tokio::task::yield_now().await,
        }

        let mut failures = mutex_lock(&self.failures, SOURCE, "enter");
        match failures.iter().position(|(target, _)| *target == op) {
            Some(index) => Err(failures.remove(index).1),
            None => Ok(()),
        }
    }

    fn prepare_insert(
        &self,
        collection: &str,
        table: &mut Table,
        mut fields: Map<String, Value>,
    ) -> StoredRow {
        let now = OffsetDateTime::now_utc();
        let created_at = fields
            .get("created_at")
            .and_then(Value::as_str)
            .and_then(|raw| OffsetDateTime::parse(raw, &Rfc3339).ok())
            .unwrap_or(now);

        if !fields.get("id").is_some_and(|id| !id.is_null()) {
            let id = if collection == "projects" {
                Value::String(Uuid::new_v4().to_string())
            } else {
                table.next_id += 1;
                Value::from(table.next_id)
            };
            fields.insert("id".to_string(), id);
        } else if let Some(id) = fields.get("id").and_then(Value::as_i64) {
            table.next_id = table.next_id.max(id);
        }

        fields.insert("created_at".to_string(), timestamp(created_at));
        for (column, default) in column_defaults(collection) {
            let missing = fields.get(column).is_none_or(Value::is_null);
            if missing {
                fields.insert(column.to_string(), default);
            }
        }
        if collection == "projects" {
            fields.insert("updated_at".to_string(), timestamp(now));
        }

        StoredRow {
            seq: self.seq.fetch_add(1, Ordering::SeqCst),
            created_at,
            value: fields,
        }
    }
}

fn column_defaults(collection: &str) -> Vec<(&'static str, Value)> {
    match collection {
        "projects" => vec![
            ("tags", Value::Array(Vec::new())),
            ("stars", Value::from(0)),
            ("forks", Value::from(0)),
            ("is_ai", Value::Bool(false)),
            ("status", Value::from("Active")),
        ],
        "posts" => vec![
            ("tags", Value::Array(Vec::new())),
            ("published", Value::Bool(false)),
        ],
        "contact_messages" => vec![("read", Value::Bool(false))],
        _ => Vec::new(),
    }
}

fn unique_columns(collection: &str) -> &'static [&'static str] {
    match collection {
        "posts" => &["slug"],
        _ => &[],
    }
}

fn timestamp(at: OffsetDateTime) -> Value {
    at.format(&Rfc3339).map_or(Value::Null, Value::String)
}

/// Text form of a column value, as used in `eq.` filters.
fn filter_text(value: &Value) -> Option<String> {
    match value {
        Value::String(text) => Some(text.clone()),
        Value::Number(number) => Some(number.to_string()),
        Value::Bool(flag) => Some(flag.to_string()),
        _ => None,
    }
}

fn matches_id(row: &StoredRow, id: &str) -> bool {
    row.value
        .get("id")
        .and_then(filter_text)
        .is_some_and(|value| value == id)
}

fn ensure_unique(
    collection: &str,
    table: &Table,
    fields: &Map<String, Value>,
    skip_id: Option<&str>,
) -> Result<(), GatewayError> {
    for column in unique_columns(collection) {
        let Some(candidate) = fields.get(*column).filter(|value| !value.is_null()) else {
            continue;
        };
        let taken = table
            .rows
            .iter()
            .filter(|row| skip_id.is_none_or(|id| !matches_id(row, id)))
            .any(|row| row.value.get(*column) == Some(candidate));
        if taken {
            return Err(GatewayError::conflict(format!(
                "duplicate key value violates unique constraint \"{collection}_{column}_key\""
            )));
        }
    }
    Ok(())
}

fn compare_rows(a: &StoredRow, b: &StoredRow, column: &str) -> CmpOrdering {
    let primary = if column == "created_at" {
        a.created_at.cmp(&b.created_at)
    } else {
        compare_values(a.value.get(column), b.value.get(column))
    };
    primary.then(a.seq.cmp(&b.seq))
}

fn compare_values(a: Option<&Value>, b: Option<&Value>) -> CmpOrdering {
    match (a, b) {
        (Some(Value::Number(a)), Some(Value::Number(b))) => a
            .as_f64()
            .partial_cmp(&b.as_f64())
            .unwrap_or(CmpOrdering::Equal),
        (Some(a), Some(b)) => filter_text(a).cmp(&filter_text(b)),
        (Some(_), None) => CmpOrdering::Greater,
        (None, Some(_)) => CmpOrdering::Less,
        (None, None) => CmpOrdering::Equal,
    }
}

fn into_object(collection: &str, value: Value) -> Result<Map<String, Value>, GatewayError> {
    match value {
        Value::Object(fields) => Ok(fields),
        other => Err(GatewayError::rejected(
            "PGRST102",
            format!("expected a JSON object for `{collection}`, got {other}"),
        )),
    }
}

#[async_trait]
impl CollectionGateway for MemoryGateway {
    async fn select(
        &self,
        collection: &str,
        order: Option<SortOrder>,
    ) -> Result<Vec<Value>, GatewayError> {
        self.enter(GatewayOp::Select).await?;
        let tables = mutex_lock(&self.tables, SOURCE, "select");
        let mut rows: Vec<StoredRow> = tables
            .get(collection)
            .map(|table| table.rows.clone())
            .unwrap_or_default();
        drop(tables);

        if let Some(order) = order {
            rows.sort_by(|a, b| {
                let ordering = compare_rows(a, b, order.column);
                if order.descending {
                    ordering.reverse()
                } else {
                    ordering
                }
            });
        }
        Ok(rows.into_iter().map(|row| Value::Object(row.value)).collect())
    }

    async fn select_where(
        &self,
        collection: &str,
        field: &str,
        value: &str,
    ) -> Result<Option<Value>, GatewayError> {
        self.enter(GatewayOp::SelectWhere).await?;
        let tables = mutex_lock(&self.tables, SOURCE, "select_where");
        Ok(tables.get(collection).and_then(|table| {
            table
                .rows
                .iter()
                .find(|row| {
                    row.value
                        .get(field)
                        .and_then(filter_text)
                        .is_some_and(|candidate| candidate == value)
                })
                .map(|row| Value::Object(row.value.clone()))
        }))
    }

    async fn insert(&self, collection: &str, record: Value) -> Result<Value, GatewayError> {
        self.enter(GatewayOp::Insert).await?;
        let fields = into_object(collection, record)?;

        let mut tables = mutex_lock(&self.tables, SOURCE, "insert");
        let table = tables.entry(collection.to_string()).or_default();
        ensure_unique(collection, table, &fields, None)?;
        let stored = self.prepare_insert(collection, table, fields);
        let value = Value::Object(stored.value.clone());
        table.rows.push(stored);
        Ok(value)
    }

    async fn update(
        &self,
        collection: &str,
        id: &str,
        changes: Value,
    ) -> Result<Option<Value>, GatewayError> {
        self.enter(GatewayOp::Update).await?;
        let mut changes = into_object(collection, changes)?;
        changes.remove("id");
        changes.remove("created_at");

        let mut tables = mutex_lock(&self.tables, SOURCE, "update");
        let Some(table) = tables.get_mut(collection) else {
            return Ok(None);
        };
        if !table.rows.iter().any(|row| matches_id(row, id)) {
            return Ok(None);
        }
        ensure_unique(collection, table, &changes, Some(id))?;

        let Some(row) = table.rows.iter_mut().find(|row| matches_id(row, id)) else {
            return Ok(None);
        };
        row.value.extend(changes);
        if collection == "projects" {
            row.value.insert(
                "updated_at".to_string(),
                timestamp(OffsetDateTime::now_utc()),
            );
        }
        Ok(Some(Value::Object(row.value.clone())))
    }

    async fn delete(&self, collection: &str, id: &str) -> Result<(), GatewayError> {
        self.enter(GatewayOp::Delete).await?;
        let mut tables = mutex_lock(&self.tables, SOURCE, "delete");
        if let Some(table) = tables.get_mut(collection) {
            table.rows.retain(|row| !matches_id(row, id));
        }
        Ok(())
    }
}

/// Object storage keeping uploads in memory.
#[derive(Debug, Default)]
pub struct MemoryObjectStorage {
    objects: Mutex<HashMap<(String, String), (Bytes, String)>>,
    failure: Mutex<Option<StorageError>>,
}

impl MemoryObjectStorage {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make the next `store` call fail with `error`.
    pub fn fail_next(&self, error: StorageError) {
        *mutex_lock(&self.failure, SOURCE, "fail_next") = Some(error);
    }

    /// Bytes and content type stored at `path`.
    pub fn object(&self, bucket: &str, path: &str) -> Option<(Bytes, String)> {
        mutex_lock(&self.objects, SOURCE, "object")
            .get(&(bucket.to_string(), path.to_string()))
            .cloned()
    }

    pub fn paths(&self, bucket: &str) -> Vec<String> {
        let mut paths: Vec<String> = mutex_lock(&self.objects, SOURCE, "paths")
            .keys()
            .filter(|(stored_bucket, _)| stored_bucket == bucket)
            .map(|(_, path)| path.clone())
            .collect();
        paths.sort();
        paths
    }
}

#[async_trait]
impl ObjectStorage for MemoryObjectStorage {
    async fn store(
        &self,
        bucket: &str,
        path: &str,
        bytes: Bytes,
        content_type: &str,
    ) -> Result<String, StorageError> {
        tokio::task::yield_now().await;
        if let Some(error) = mutex_lock(&self.failure, SOURCE, "store").take() {
            return Err(error);
        }

        let mut objects = mutex_lock(&self.objects, SOURCE, "store");
        let key = (bucket.to_string(), path.to_string());
        if objects.contains_key(&key) {
            return Err(StorageError::Rejected {
                path: path.to_string(),
                message: "The resource already exists".to_string(),
            });
        }
        objects.insert(key, (bytes, content_type.to_string()));
        Ok(path.to_string())
    }

    fn public_url(&self, bucket: &str, path: &str) -> Result<Url, StorageError> {
        Url::parse(&format!("memory://storage.local/{bucket}/{path}")).map_err(|_| {
            StorageError::InvalidPath {
                path: path.to_string(),
            }
        })
    }
}

/// Submission ledger that forgets everything when dropped.
#[derive(Debug, Default)]
pub struct MemoryLedger {
    last: Mutex<Option<OffsetDateTime>>,
}

#[async_trait]
impl SubmissionLedger for MemoryLedger {
    async fn last_submitted(&self) -> Result<Option<OffsetDateTime>, LedgerError> {
        Ok(*mutex_lock(&self.last, SOURCE, "last_submitted"))
    }

    async fn record(&self, at: OffsetDateTime) -> Result<(), LedgerError> {
        *mutex_lock(&self.last, SOURCE, "record") = Some(at);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[tokio::test]
    async fn insert_assigns_ids_timestamps_and_defaults() {
        let gateway = MemoryGateway::new();

        let post = gateway
            .insert("posts", json!({ "title": "Hola", "slug": "hola" }))
            .await
            .expect("insert");
        assert_eq!(post["id"], json!(1));
        assert_eq!(post["published"], json!(false));
        assert_eq!(post["tags"], json!([]));
        assert!(post["created_at"].is_string());

        let project = gateway
            .insert("projects", json!({ "name": "Folio" }))
            .await
            .expect("insert");
        assert!(Uuid::parse_str(project["id"].as_str().expect("id")).is_ok());
        assert_eq!(project["stars"], json!(0));
        assert!(project["updated_at"].is_string());
    }

    #[tokio::test]
    async fn duplicate_slug_conflicts() {
        let gateway = MemoryGateway::new();
        gateway
            .insert("posts", json!({ "title": "a", "slug": "hola" }))
            .await
            .expect("first");
        let err = gateway
            .insert("posts", json!({ "title": "b", "slug": "hola" }))
            .await
            .expect_err("duplicate");
        assert!(matches!(err, GatewayError::Conflict { .. }));
        assert_eq!(gateway.row_count("posts"), 1);
    }

    #[tokio::test]
    async fn update_may_keep_own_slug() {
        let gateway = MemoryGateway::new();
        gateway
            .insert("posts", json!({ "title": "a", "slug": "hola" }))
            .await
            .expect("insert");
        let updated = gateway
            .update("posts", "1", json!({ "slug": "hola", "published": true }))
            .await
            .expect("update")
            .expect("row");
        assert_eq!(updated["published"], json!(true));
    }

    #[tokio::test]
    async fn update_of_missing_row_returns_none() {
        let gateway = MemoryGateway::new();
        let result = gateway
            .update("posts", "99", json!({ "title": "x" }))
            .await
            .expect("update");
        assert!(result.is_none());
    }

    #[tokio::test]
    async fn update_of_missing_row_ignores_taken_slug() {
        let gateway = MemoryGateway::new();
        gateway
            .insert("posts", json!({ "title": "a", "slug": "hola" }))
            .await
            .expect("insert");

        let result = gateway
            .update("posts", "99", json!({ "slug": "hola" }))
            .await
            .expect("update");
        assert!(result.is_none());
    }

    #[tokio::test]
    async fn injected_failure_is_consumed_once() {
        let gateway = MemoryGateway::new();
        gateway.fail_next(GatewayOp::Select, GatewayError::transport("offline"));

        assert!(gateway.select("posts", None).await.is_err());
        assert!(gateway.select("posts", None).await.is_ok());
        assert_eq!(gateway.calls().select, 2);
    }

    #[tokio::test]
    async fn select_where_matches_text_form() {
        let gateway = MemoryGateway::new();
        gateway.seed("posts", vec![json!({ "title": "a", "slug": "uno" })]);

        let found = gateway
            .select_where("posts", "id", "1")
            .await
            .expect("select")
            .expect("row");
        assert_eq!(found["slug"], json!("uno"));
        assert_eq!(gateway.calls().select_where, 1);
        assert_eq!(gateway.calls().insert, 0);
    }

    #[tokio::test]
    async fn storage_refuses_overwrite() {
        let storage = MemoryObjectStorage::new();
        storage
            .store("images", "posts/a.png", Bytes::from_static(b"png"), "image/png")
            .await
            .expect("store");
        let err = storage
            .store("images", "posts/a.png", Bytes::from_static(b"png"), "image/png")
            .await
            .expect_err("exists");
        assert!(matches!(err, StorageError::Rejected { .. }));
    }
}
