//! Generic cached view over one remote collection.

use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, RwLock};
use std::time::Instant;

use futures::future::{BoxFuture, FutureExt, Shared};
use metrics::{counter, histogram};
use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::Value;
use tracing::{debug, info, instrument, warn};

use crate::application::assets::AssetUploader;
use crate::application::gateway::{CollectionGateway, GatewayError};
use crate::domain::error::DomainError;
use crate::domain::resource::{Collection, Resource};
use crate::domain::types::ResourceKind;

use super::error::StoreError;
use super::lock::{mutex_lock, rw_read, rw_write};

const SOURCE: &str = "cache::store";

pub(crate) const METRIC_CACHE_HIT: &str = "folio_store_cache_hit_total";
pub(crate) const METRIC_CACHE_MISS: &str = "folio_store_cache_miss_total";
pub(crate) const METRIC_FETCH: &str = "folio_store_fetch_total";
pub(crate) const METRIC_FETCH_SHARED: &str = "folio_store_fetch_shared_total";
pub(crate) const METRIC_INVALIDATION: &str = "folio_store_invalidation_total";
pub(crate) const METRIC_FETCH_MS: &str = "folio_store_fetch_ms";

type FetchResult<R> = Result<Arc<Vec<R>>, StoreError>;
type SharedFetch<R> = Shared<BoxFuture<'static, FetchResult<R>>>;

struct Snapshot<R> {
    token: u64,
    records: Arc<Vec<R>>,
}

struct InFlight<R> {
    token: u64,
    fetch: SharedFetch<R>,
}

enum Pending<R> {
    Fresh(Arc<Vec<R>>),
    Joined(SharedFetch<R>),
    Started(SharedFetch<R>),
}

struct StoreState<R> {
    token: AtomicU64,
    snapshot: RwLock<Option<Snapshot<R>>>,
    in_flight: Mutex<Option<InFlight<R>>>,
}

impl<R: Resource> StoreState<R> {
    fn new() -> Self {
        Self {
            token: AtomicU64::new(0),
            snapshot: RwLock::new(None),
            in_flight: Mutex::new(None),
        }
    }

    fn current_token(&self) -> u64 {
        self.token.load(Ordering::SeqCst)
    }

    fn fresh(&self, token: u64) -> Option<Arc<Vec<R>>> {
        rw_read(&self.snapshot, SOURCE, "fresh")
            .as_ref()
            .filter(|snapshot| snapshot.token == token)
            .map(|snapshot| Arc::clone(&snapshot.records))
    }

    /// Keep the snapshot fetched under the newest token. A slow fetch that
    /// finishes after a newer one must not replace it.
    fn store_snapshot(&self, token: u64, records: Arc<Vec<R>>) -> bool {
        let mut snapshot = rw_write(&self.snapshot, SOURCE, "store_snapshot");
        if snapshot.as_ref().is_some_and(|current| current.token > token) {
            return false;
        }
        *snapshot = Some(Snapshot { token, records });
        true
    }

    fn finish_fetch(&self, token: u64) {
        let mut in_flight = mutex_lock(&self.in_flight, SOURCE, "finish_fetch");
        if in_flight.as_ref().is_some_and(|current| current.token == token) {
            *in_flight = None;
        }
    }
}

/// Cached access to the collection backing `R`.
///
/// Clones share one snapshot, one invalidation token and one in-flight
/// fetch. Mutations are never serialised here; concurrent updates reach the
/// backend independently and the backend decides the final state.
pub struct ResourceStore<R: Resource> {
    gateway: Arc<dyn CollectionGateway>,
    assets: Option<AssetUploader>,
    state: Arc<StoreState<R>>,
}

impl<R: Resource> Clone for ResourceStore<R> {
    fn clone(&self) -> Self {
        Self {
            gateway: Arc::clone(&self.gateway),
            assets: self.assets.clone(),
            state: Arc::clone(&self.state),
        }
    }
}

impl<R: Resource> fmt::Debug for ResourceStore<R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ResourceStore")
            .field("kind", &R::KIND)
            .field("token", &self.state.current_token())
            .field("assets", &self.assets.is_some())
            .finish()
    }
}

impl<R: Resource> ResourceStore<R> {
    pub fn new(gateway: Arc<dyn CollectionGateway>) -> Self {
        Self {
            gateway,
            assets: None,
            state: Arc::new(StoreState::new()),
        }
    }

    /// Attach the uploader used by `upload_asset`.
    pub fn with_assets(mut self, assets: AssetUploader) -> Self {
        self.assets = Some(assets);
        self
    }

    pub fn kind(&self) -> ResourceKind {
        R::KIND
    }

    /// Current invalidation token.
    pub fn token(&self) -> u64 {
        self.state.current_token()
    }

    /// Records of the collection, newest first for ordered kinds.
    ///
    /// Served from the snapshot while no mutation happened since it was
    /// fetched. Concurrent callers on a cold or invalidated cache share one
    /// gateway request. On failure the previous snapshot is kept.
    #[instrument(skip(self), fields(kind = %R::KIND))]
    pub async fn list(&self) -> Result<Arc<Vec<R>>, StoreError> {
        let token = self.state.current_token();
        if let Some(records) = self.state.fresh(token) {
            counter!(METRIC_CACHE_HIT, "kind" => R::KIND.as_str()).increment(1);
            debug!(token, count = records.len(), result = "hit", "Served cached snapshot");
            return Ok(records);
        }

        counter!(METRIC_CACHE_MISS, "kind" => R::KIND.as_str()).increment(1);
        match self.join_or_start_fetch(token) {
            Pending::Fresh(records) => Ok(records),
            Pending::Joined(fetch) => {
                counter!(METRIC_FETCH_SHARED, "kind" => R::KIND.as_str()).increment(1);
                debug!(token, result = "joined", "Awaiting in-flight fetch");
                fetch.await
            }
            Pending::Started(fetch) => fetch.await,
        }
    }

    /// Last successfully fetched snapshot, even if it has been invalidated
    /// since. `None` until the first fetch succeeds.
    pub fn cached(&self) -> Option<Arc<Vec<R>>> {
        rw_read(&self.state.snapshot, SOURCE, "cached")
            .as_ref()
            .map(|snapshot| Arc::clone(&snapshot.records))
    }

    /// Force the next `list()` to refetch.
    pub fn invalidate(&self) {
        let token = self.state.token.fetch_add(1, Ordering::SeqCst) + 1;
        counter!(METRIC_INVALIDATION, "kind" => R::KIND.as_str()).increment(1);
        debug!(kind = %R::KIND, token, "Invalidated store");
    }

    pub(crate) fn gateway(&self) -> &Arc<dyn CollectionGateway> {
        &self.gateway
    }

    pub(crate) fn assets(&self) -> Option<&AssetUploader> {
        self.assets.as_ref()
    }

    fn join_or_start_fetch(&self, token: u64) -> Pending<R> {
        let mut in_flight = mutex_lock(&self.state.in_flight, SOURCE, "join_or_start_fetch");

        // A fetch for this token may have completed since the first check.
        if let Some(records) = self.state.fresh(token) {
            return Pending::Fresh(records);
        }
        if let Some(current) = in_flight.as_ref() {
            if current.token == token {
                return Pending::Joined(current.fetch.clone());
            }
        }

        let fetch = self.fetch_snapshot(token).shared();
        *in_flight = Some(InFlight {
            token,
            fetch: fetch.clone(),
        });
        Pending::Started(fetch)
    }

    fn fetch_snapshot(&self, token: u64) -> BoxFuture<'static, FetchResult<R>> {
        let gateway = Arc::clone(&self.gateway);
        let state = Arc::clone(&self.state);

        async move {
            let started_at = Instant::now();
            counter!(METRIC_FETCH, "kind" => R::KIND.as_str()).increment(1);

            let outcome = gateway
                .select(R::KIND.collection(), R::KIND.order())
                .await
                .and_then(decode_rows::<R>)
                .map(Arc::new)
                .map_err(|source| StoreError::fetch(R::KIND, source));

            histogram!(
                METRIC_FETCH_MS,
                "kind" => R::KIND.as_str(),
                "result" => if outcome.is_ok() { "ok" } else { "error" }
            )
            .record(started_at.elapsed().as_secs_f64() * 1000.0);

            match &outcome {
                Ok(records) => {
                    let stored = state.store_snapshot(token, Arc::clone(records));
                    info!(
                        kind = %R::KIND,
                        token,
                        count = records.len(),
                        stored,
                        result = "fetched",
                        "Fetched collection"
                    );
                }
                Err(err) => {
                    warn!(
                        kind = %R::KIND,
                        token,
                        error = %err,
                        result = "failed",
                        "Fetch failed; previous snapshot kept"
                    );
                }
            }

            state.finish_fetch(token);
            outcome
        }
        .boxed()
    }
}

impl<R: Collection> ResourceStore<R> {
    /// Validate `draft` locally, insert it and invalidate the snapshot.
    /// Returns the row as stored, with server-assigned id and timestamps.
    #[instrument(skip_all, fields(kind = %R::KIND))]
    pub async fn create(&self, draft: R::Draft) -> Result<R, StoreError> {
        let draft = R::prepare_draft(draft)?;
        let payload = encode(R::KIND, &draft)?;

        let row = self
            .gateway
            .insert(R::KIND.collection(), payload)
            .await
            .map_err(|source| StoreError::write(R::KIND, source))?;
        self.invalidate();

        let record: R = decode_row(R::KIND, row)?;
        info!(kind = %R::KIND, id = %record.id(), "Created record");
        Ok(record)
    }

    /// Apply a partial update to the row with `id`.
    #[instrument(skip(self, patch), fields(kind = %R::KIND))]
    pub async fn update(&self, id: &R::Id, patch: R::Patch) -> Result<R, StoreError> {
        let patch = R::prepare_patch(patch)?;
        let changes = encode_changes(R::KIND, &patch)?;

        let row = self
            .gateway
            .update(R::KIND.collection(), &id.to_string(), changes)
            .await
            .map_err(|source| StoreError::write(R::KIND, source))?
            .ok_or_else(|| StoreError::not_found(R::KIND, id))?;
        self.invalidate();

        let record: R = decode_row(R::KIND, row)?;
        info!(kind = %R::KIND, id = %id, "Updated record");
        Ok(record)
    }

    /// Delete the row with `id`. Deleting a row that no longer exists
    /// succeeds and still invalidates the snapshot.
    #[instrument(skip(self), fields(kind = %R::KIND))]
    pub async fn delete(&self, id: &R::Id) -> Result<(), StoreError> {
        self.gateway
            .delete(R::KIND.collection(), &id.to_string())
            .await
            .map_err(|source| StoreError::write(R::KIND, source))?;
        self.invalidate();
        info!(kind = %R::KIND, id = %id, "Deleted record");
        Ok(())
    }
}

pub(crate) fn encode<T: Serialize>(kind: ResourceKind, payload: &T) -> Result<Value, StoreError> {
    serde_json::to_value(payload).map_err(|err| {
        StoreError::write(
            kind,
            GatewayError::decode(format!("payload could not be encoded: {err}")),
        )
    })
}

/// Encode a patch, refusing one that would not change anything.
pub(crate) fn encode_changes<T: Serialize>(
    kind: ResourceKind,
    patch: &T,
) -> Result<Value, StoreError> {
    let changes = encode(kind, patch)?;
    if changes.as_object().is_some_and(|fields| fields.is_empty()) {
        return Err(DomainError::validation("update contains no fields").into());
    }
    Ok(changes)
}

pub(crate) fn decode_row<R: DeserializeOwned>(
    kind: ResourceKind,
    row: Value,
) -> Result<R, StoreError> {
    serde_json::from_value(row).map_err(|err| StoreError::write(kind, GatewayError::decode(err)))
}

fn decode_rows<R: DeserializeOwned>(rows: Vec<Value>) -> Result<Vec<R>, GatewayError> {
    rows.into_iter()
        .map(|row| serde_json::from_value(row).map_err(GatewayError::decode))
        .collect()
}
