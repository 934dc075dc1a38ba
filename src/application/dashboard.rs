//! Counters shown on the admin landing page.

use serde::Serialize;
use tracing::instrument;

use crate::application::portfolio::Portfolio;
use crate::cache::StoreError;
use crate::domain::messages::unread_count;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct DashboardStats {
    pub projects: usize,
    pub posts: usize,
    pub published_posts: usize,
    pub messages: usize,
    pub unread_messages: usize,
}

impl DashboardStats {
    #[instrument(skip_all)]
    pub async fn load(portfolio: &Portfolio) -> Result<Self, StoreError> {
        let (projects, posts, messages) = tokio::try_join!(
            portfolio.projects.list(),
            portfolio.posts.list(),
            portfolio.messages.list(),
        )?;

        Ok(Self {
            projects: projects.len(),
            posts: posts.len(),
            published_posts: posts.iter().filter(|post| post.published).count(),
            messages: messages.len(),
            unread_messages: unread_count(&messages),
        })
    }
}
