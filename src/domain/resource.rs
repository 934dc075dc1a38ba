//! Binding between record types and the collections that own them.
//!
//! A [`Resource`] can be listed and patched. [`Collection`] adds row creation
//! and deletion for multi-row kinds; the singleton settings record only
//! implements [`Resource`]. [`AssetOwner`] marks kinds whose images live in
//! object storage.

use std::fmt::{Debug, Display};

use serde::Serialize;
use serde::de::DeserializeOwned;

use crate::domain::error::DomainError;
use crate::domain::types::ResourceKind;

pub trait Resource: Clone + Debug + Serialize + DeserializeOwned + Send + Sync + 'static {
    type Id: Clone + Debug + Display + PartialEq + Send + Sync + 'static;
    type Patch: Debug + Serialize + Send + Sync + 'static;

    const KIND: ResourceKind;

    fn id(&self) -> &Self::Id;

    /// Validate and normalise a partial update before it leaves the process.
    fn prepare_patch(patch: Self::Patch) -> Result<Self::Patch, DomainError> {
        Ok(patch)
    }
}

pub trait Collection: Resource {
    type Draft: Debug + Serialize + Send + Sync + 'static;

    /// Validate required fields and fill derived ones before insertion.
    fn prepare_draft(draft: Self::Draft) -> Result<Self::Draft, DomainError>;
}

pub trait AssetOwner: Collection {
    /// Folder inside the image bucket that holds this kind's uploads.
    const ASSET_FOLDER: &'static str;
}

/// Trim entries, drop blanks and keep the first occurrence of each tag.
pub(crate) fn normalize_tags(tags: Vec<String>) -> Vec<String> {
    let mut normalized: Vec<String> = Vec::with_capacity(tags.len());
    for tag in tags {
        let tag = tag.trim();
        if tag.is_empty() || normalized.iter().any(|existing| existing == tag) {
            continue;
        }
        normalized.push(tag.to_string());
    }
    normalized
}

/// Collapse blank optional text to `None`.
pub(crate) fn non_blank(value: Option<String>) -> Option<String> {
    value.and_then(|value| {
        let trimmed = value.trim();
        (!trimmed.is_empty()).then(|| trimmed.to_string())
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalize_tags_dedups_and_trims() {
        let tags = vec![
            " rust ".to_string(),
            "cli".to_string(),
            "rust".to_string(),
            "  ".to_string(),
        ];
        assert_eq!(normalize_tags(tags), vec!["rust", "cli"]);
    }

    #[test]
    fn non_blank_drops_whitespace() {
        assert_eq!(non_blank(Some("  ".to_string())), None);
        assert_eq!(non_blank(Some(" x ".to_string())).as_deref(), Some("x"));
        assert_eq!(non_blank(None), None);
    }
}
