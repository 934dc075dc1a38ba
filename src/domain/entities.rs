//! Domain records mirrored from the remote collections.
//!
//! Field names follow the column names of the hosted tables so rows can be
//! decoded straight from the gateway's JSON.

use serde::{Deserialize, Deserializer, Serialize};
use time::OffsetDateTime;

use crate::domain::types::ProjectStatus;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProjectRecord {
    pub id: String,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
    #[serde(with = "time::serde::rfc3339")]
    pub updated_at: OffsetDateTime,
    pub name: String,
    pub tagline: Option<String>,
    pub description: Option<String>,
    pub image: Option<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub tags: Vec<String>,
    pub github_url: Option<String>,
    pub demo_url: Option<String>,
    pub language: Option<String>,
    pub language_color: Option<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub stars: u32,
    #[serde(default, deserialize_with = "null_as_default")]
    pub forks: u32,
    pub views: Option<String>,
    pub logo: Option<String>,
    pub gradient: Option<String>,
    pub status: Option<ProjectStatus>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub is_ai: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PostRecord {
    pub id: i64,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
    pub title: String,
    pub content: String,
    pub slug: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub published: bool,
    pub excerpt: Option<String>,
    pub image_url: Option<String>,
    pub category: Option<String>,
    pub category_color: Option<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub tags: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ContactMessageRecord {
    pub id: i64,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
    pub name: String,
    pub email: String,
    pub message: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub read: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SettingsRecord {
    pub id: i64,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
    #[serde(default, deserialize_with = "null_as_default")]
    pub site_title: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub site_description: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub contact_email: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub social_links: SocialLinks,
}

/// Profile links rendered in the sidebar and footer.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SocialLinks {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub github: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub linkedin: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub discord: Option<String>,
}

impl SocialLinks {
    pub fn is_empty(&self) -> bool {
        self.github.is_none() && self.linkedin.is_none() && self.discord.is_none()
    }
}

/// Treat an explicit JSON `null` like a missing column.
fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}
