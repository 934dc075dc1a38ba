//! Operations that only exist for particular resource kinds.

use bytes::Bytes;
use tracing::{info, instrument};
use url::Url;

use crate::application::assets::UploadError;
use crate::application::gateway::GatewayError;
use crate::domain::entities::{ContactMessageRecord, PostRecord, SettingsRecord};
use crate::domain::messages::ContactMessagePatch;
use crate::domain::posts;
use crate::domain::resource::{AssetOwner, Resource};
use crate::domain::settings::SettingsPatch;
use crate::domain::types::ResourceKind;

use super::error::StoreError;
use super::store::{ResourceStore, decode_row, encode_changes};

impl ResourceStore<PostRecord> {
    /// Point lookup by slug. Bypasses the list snapshot so posts that were
    /// never listed can still be resolved.
    #[instrument(skip(self), fields(kind = %ResourceKind::Post))]
    pub async fn get_by_slug(&self, slug: &str) -> Result<PostRecord, StoreError> {
        let row = self
            .gateway()
            .select_where(ResourceKind::Post.collection(), "slug", slug)
            .await
            .map_err(|source| StoreError::fetch(ResourceKind::Post, source))?
            .ok_or_else(|| StoreError::not_found(ResourceKind::Post, slug))?;

        serde_json::from_value(row)
            .map_err(|err| StoreError::fetch(ResourceKind::Post, GatewayError::decode(err)))
    }

    /// Published posts matching `query`, newest first.
    pub async fn published(&self, query: &str) -> Result<Vec<PostRecord>, StoreError> {
        let all = self.list().await?;
        Ok(posts::published_matching(&all, query)
            .into_iter()
            .cloned()
            .collect())
    }
}

impl ResourceStore<ContactMessageRecord> {
    pub async fn mark_as_read(&self, id: i64) -> Result<ContactMessageRecord, StoreError> {
        self.update(&id, ContactMessagePatch::mark_read()).await
    }
}

impl ResourceStore<SettingsRecord> {
    /// The settings row, if one has been saved.
    pub async fn current(&self) -> Result<Option<SettingsRecord>, StoreError> {
        Ok(self.list().await?.first().cloned())
    }

    /// Update the settings row if it exists, otherwise create it.
    ///
    /// The existence check reads the backend directly rather than the
    /// snapshot. Check and write are still two requests, so two concurrent
    /// first saves can each insert a row.
    #[instrument(skip_all, fields(kind = %ResourceKind::Settings))]
    pub async fn upsert(&self, patch: SettingsPatch) -> Result<SettingsRecord, StoreError> {
        let kind = ResourceKind::Settings;
        let patch = SettingsRecord::prepare_patch(patch)?;
        let changes = encode_changes(kind, &patch)?;

        let existing = self
            .gateway()
            .select(kind.collection(), kind.order())
            .await
            .map_err(|source| StoreError::fetch(kind, source))?
            .into_iter()
            .next()
            .map(|row| decode_row::<SettingsRecord>(kind, row))
            .transpose()?;

        let row = match existing {
            Some(current) => self
                .gateway()
                .update(kind.collection(), &current.id.to_string(), changes)
                .await
                .map_err(|source| StoreError::write(kind, source))?
                .ok_or_else(|| StoreError::not_found(kind, current.id))?,
            None => self
                .gateway()
                .insert(kind.collection(), changes)
                .await
                .map_err(|source| StoreError::write(kind, source))?,
        };
        self.invalidate();

        let record: SettingsRecord = decode_row(kind, row)?;
        info!(id = record.id, "Saved site settings");
        Ok(record)
    }
}

impl<R: AssetOwner> ResourceStore<R> {
    /// Store an image for this kind and return its public URL. The record
    /// itself is not touched; callers attach the URL in a later write.
    #[instrument(skip(self, bytes), fields(kind = %R::KIND, size = bytes.len()))]
    pub async fn upload_asset(&self, file_name: &str, bytes: Bytes) -> Result<Url, StoreError> {
        let uploader = self.assets().ok_or(UploadError::NotConfigured)?;
        Ok(uploader.upload(R::ASSET_FOLDER, file_name, bytes).await?)
    }
}
