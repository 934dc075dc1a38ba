use std::sync::Arc;

use time::Duration;

use crate::application::assets::AssetUploader;
use crate::application::contact::{ContactService, SubmissionLedger};
use crate::application::gateway::CollectionGateway;
use crate::cache::ResourceStore;
use crate::domain::entities::{ContactMessageRecord, PostRecord, ProjectRecord, SettingsRecord};

/// One store per resource kind, built once and handed to every consumer.
#[derive(Clone, Debug)]
pub struct Portfolio {
    pub projects: ResourceStore<ProjectRecord>,
    pub posts: ResourceStore<PostRecord>,
    pub messages: ResourceStore<ContactMessageRecord>,
    pub settings: ResourceStore<SettingsRecord>,
}

impl Portfolio {
    /// Build the stores over `gateway`. Without an uploader, image uploads
    /// fail with a configuration error.
    pub fn new(gateway: Arc<dyn CollectionGateway>, assets: Option<AssetUploader>) -> Self {
        let mut projects = ResourceStore::new(Arc::clone(&gateway));
        let mut posts = ResourceStore::new(Arc::clone(&gateway));
        if let Some(assets) = assets {
            projects = projects.with_assets(assets.clone());
            posts = posts.with_assets(assets);
        }

        Self {
            projects,
            posts,
            messages: ResourceStore::new(Arc::clone(&gateway)),
            settings: ResourceStore::new(gateway),
        }
    }

    pub fn contact(&self, ledger: Arc<dyn SubmissionLedger>, window: Duration) -> ContactService {
        ContactService::new(self.messages.clone(), ledger, window)
    }

    pub fn invalidate_all(&self) {
        self.projects.invalidate();
        self.posts.invalidate();
        self.messages.invalidate();
        self.settings.invalidate();
    }
}
