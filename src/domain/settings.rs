use serde::{Deserialize, Serialize};

use crate::domain::entities::{SettingsRecord, SocialLinks};
use crate::domain::error::DomainError;
use crate::domain::resource::Resource;
use crate::domain::types::ResourceKind;

/// Partial site settings. Used both to update the existing row and, when no
/// row exists yet, as the payload that creates it.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SettingsPatch {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub site_title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub site_description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub contact_email: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub social_links: Option<SocialLinks>,
}

impl Resource for SettingsRecord {
    type Id = i64;
    type Patch = SettingsPatch;

    const KIND: ResourceKind = ResourceKind::Settings;

    fn id(&self) -> &i64 {
        &self.id
    }

    fn prepare_patch(mut patch: SettingsPatch) -> Result<SettingsPatch, DomainError> {
        if let Some(email) = patch.contact_email.as_mut() {
            *email = email.trim().to_string();
            if !email.is_empty() && !email.contains('@') {
                return Err(DomainError::validation(format!(
                    "`{email}` is not a valid contact email"
                )));
            }
        }
        if let Some(links) = patch.social_links.as_mut() {
            for link in [&mut links.github, &mut links.linkedin, &mut links.discord] {
                if link.as_deref().is_some_and(|value| value.trim().is_empty()) {
                    *link = None;
                }
            }
        }
        Ok(patch)
    }
}
