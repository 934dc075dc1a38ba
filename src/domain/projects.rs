use serde::{Deserialize, Serialize};

use crate::domain::entities::ProjectRecord;
use crate::domain::error::{DomainError, ensure_present};
use crate::domain::resource::{AssetOwner, Collection, Resource, non_blank, normalize_tags};
use crate::domain::types::{ProjectStatus, ResourceKind};

/// Fields supplied when a project is created. Id and timestamps are assigned
/// by the backend.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProjectDraft {
    pub name: String,
    pub tagline: Option<String>,
    pub description: Option<String>,
    pub image: Option<String>,
    pub tags: Vec<String>,
    pub github_url: Option<String>,
    pub demo_url: Option<String>,
    pub language: Option<String>,
    pub language_color: Option<String>,
    pub stars: u32,
    pub forks: u32,
    pub views: Option<String>,
    pub logo: Option<String>,
    pub gradient: Option<String>,
    pub status: Option<ProjectStatus>,
    pub is_ai: bool,
}

impl Default for ProjectDraft {
    fn default() -> Self {
        Self {
            name: String::new(),
            tagline: None,
            description: None,
            image: None,
            tags: Vec::new(),
            github_url: None,
            demo_url: None,
            language: None,
            language_color: None,
            stars: 0,
            forks: 0,
            views: None,
            logo: None,
            gradient: None,
            status: Some(ProjectStatus::Active),
            is_ai: false,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ProjectPatch {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tagline: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tags: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub github_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub demo_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub language: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub language_color: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stars: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub forks: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub views: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub logo: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub gradient: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<ProjectStatus>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_ai: Option<bool>,
}

impl Resource for ProjectRecord {
    type Id = String;
    type Patch = ProjectPatch;

    const KIND: ResourceKind = ResourceKind::Project;

    fn id(&self) -> &String {
        &self.id
    }

    fn prepare_patch(mut patch: ProjectPatch) -> Result<ProjectPatch, DomainError> {
        if let Some(name) = patch.name.as_mut() {
            ensure_present(name, "name")?;
            *name = name.trim().to_string();
        }
        patch.tags = patch.tags.map(normalize_tags);
        Ok(patch)
    }
}

impl Collection for ProjectRecord {
    type Draft = ProjectDraft;

    fn prepare_draft(draft: ProjectDraft) -> Result<ProjectDraft, DomainError> {
        ensure_present(&draft.name, "name")?;

        Ok(ProjectDraft {
            name: draft.name.trim().to_string(),
            tagline: non_blank(draft.tagline),
            description: non_blank(draft.description),
            image: non_blank(draft.image),
            tags: normalize_tags(draft.tags),
            github_url: non_blank(draft.github_url),
            demo_url: non_blank(draft.demo_url),
            language: non_blank(draft.language),
            language_color: non_blank(draft.language_color),
            views: non_blank(draft.views),
            logo: non_blank(draft.logo),
            gradient: non_blank(draft.gradient),
            ..draft
        })
    }
}

impl AssetOwner for ProjectRecord {
    const ASSET_FOLDER: &'static str = "projects";
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn draft_requires_name() {
        let result = ProjectRecord::prepare_draft(ProjectDraft::default());
        assert_eq!(result, Err(DomainError::missing("name")));
    }

    #[test]
    fn draft_defaults_match_admin_form() {
        let draft = ProjectDraft::default();
        assert_eq!(draft.status, Some(ProjectStatus::Active));
        assert_eq!(draft.stars, 0);
        assert_eq!(draft.forks, 0);
        assert!(!draft.is_ai);
    }

    #[test]
    fn draft_blank_optionals_become_none() {
        let draft = ProjectDraft {
            name: "  Folio ".to_string(),
            tagline: Some("   ".to_string()),
            tags: vec!["rust".to_string(), "rust".to_string()],
            ..Default::default()
        };
        let prepared = ProjectRecord::prepare_draft(draft).expect("prepared");
        assert_eq!(prepared.name, "Folio");
        assert_eq!(prepared.tagline, None);
        assert_eq!(prepared.tags, vec!["rust"]);
    }

    #[test]
    fn patch_serializes_only_set_fields() {
        let patch = ProjectPatch {
            stars: Some(42),
            ..Default::default()
        };
        let value = serde_json::to_value(&patch).expect("json");
        assert_eq!(value, serde_json::json!({ "stars": 42 }));
    }

    #[test]
    fn patch_rejects_blank_name() {
        let patch = ProjectPatch {
            name: Some(" ".to_string()),
            ..Default::default()
        };
        assert_eq!(
            ProjectRecord::prepare_patch(patch),
            Err(DomainError::missing("name"))
        );
    }
}
