//! Shared domain enumerations aligned with the remote collections.

use std::fmt;

use serde::{Deserialize, Serialize};

/// The four kinds of record managed by the portfolio.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResourceKind {
    Project,
    Post,
    ContactMessage,
    Settings,
}

impl ResourceKind {
    pub fn as_str(self) -> &'static str {
        match self {
            ResourceKind::Project => "project",
            ResourceKind::Post => "post",
            ResourceKind::ContactMessage => "contact_message",
            ResourceKind::Settings => "settings",
        }
    }

    /// Name of the remote collection backing this kind.
    pub fn collection(self) -> &'static str {
        match self {
            ResourceKind::Project => "projects",
            ResourceKind::Post => "posts",
            ResourceKind::ContactMessage => "contact_messages",
            ResourceKind::Settings => "settings",
        }
    }

    /// Ordering applied when listing the collection. The singleton has none.
    pub fn order(self) -> Option<SortOrder> {
        match self {
            ResourceKind::Settings => None,
            _ => Some(SortOrder::newest_first()),
        }
    }

    pub fn is_singleton(self) -> bool {
        matches!(self, ResourceKind::Settings)
    }
}

impl fmt::Display for ResourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SortOrder {
    pub column: &'static str,
    pub descending: bool,
}

impl SortOrder {
    pub const fn newest_first() -> Self {
        Self {
            column: "created_at",
            descending: true,
        }
    }
}

/// Lifecycle label shown on a project card.
///
/// Values outside the known set are preserved verbatim so rows edited
/// elsewhere survive a round trip.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum ProjectStatus {
    Featured,
    Production,
    Active,
    Beta,
    Stable,
    Other(String),
}

impl ProjectStatus {
    pub fn as_str(&self) -> &str {
        match self {
            ProjectStatus::Featured => "Featured",
            ProjectStatus::Production => "Production",
            ProjectStatus::Active => "Active",
            ProjectStatus::Beta => "Beta",
            ProjectStatus::Stable => "Stable",
            ProjectStatus::Other(value) => value.as_str(),
        }
    }
}

impl Default for ProjectStatus {
    fn default() -> Self {
        ProjectStatus::Active
    }
}

impl From<String> for ProjectStatus {
    fn from(value: String) -> Self {
        match value.as_str() {
            "Featured" => ProjectStatus::Featured,
            "Production" => ProjectStatus::Production,
            "Active" => ProjectStatus::Active,
            "Beta" => ProjectStatus::Beta,
            "Stable" => ProjectStatus::Stable,
            _ => ProjectStatus::Other(value),
        }
    }
}

impl From<&str> for ProjectStatus {
    fn from(value: &str) -> Self {
        ProjectStatus::from(value.to_string())
    }
}

impl From<ProjectStatus> for String {
    fn from(value: ProjectStatus) -> Self {
        match value {
            ProjectStatus::Other(value) => value,
            known => known.as_str().to_string(),
        }
    }
}

impl fmt::Display for ProjectStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn project_status_keeps_unknown_values() {
        let status: ProjectStatus = serde_json::from_str("\"Archived\"").expect("status");
        assert_eq!(status, ProjectStatus::Other("Archived".to_string()));
        assert_eq!(
            serde_json::to_string(&status).expect("json"),
            "\"Archived\""
        );
    }

    #[test]
    fn project_status_parses_known_values() {
        let status: ProjectStatus = serde_json::from_str("\"Featured\"").expect("status");
        assert_eq!(status, ProjectStatus::Featured);
        assert_eq!(ProjectStatus::default(), ProjectStatus::Active);
    }

    #[test]
    fn singleton_has_no_ordering() {
        assert!(ResourceKind::Settings.order().is_none());
        assert_eq!(
            ResourceKind::Post.order(),
            Some(SortOrder::newest_first())
        );
        assert_eq!(ResourceKind::ContactMessage.collection(), "contact_messages");
    }
}
