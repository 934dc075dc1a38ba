//! Blog post payloads and public listing rules.

use serde::{Deserialize, Serialize};

use crate::domain::entities::PostRecord;
use crate::domain::error::{DomainError, ensure_present};
use crate::domain::resource::{AssetOwner, Collection, Resource, non_blank, normalize_tags};
use crate::domain::slug::{SlugError, derive_slug, slugify};
use crate::domain::types::ResourceKind;

/// Fields supplied when a post is created.
///
/// An empty `slug` is derived from the title; a manual slug is normalised
/// with the same rules so the stored value is always URL-safe.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PostDraft {
    pub title: String,
    pub content: String,
    pub slug: String,
    pub published: bool,
    pub excerpt: Option<String>,
    pub image_url: Option<String>,
    pub category: Option<String>,
    pub category_color: Option<String>,
    pub tags: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PostPatch {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub slug: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub published: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub excerpt: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub category_color: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tags: Option<Vec<String>>,
}

impl Resource for PostRecord {
    type Id = i64;
    type Patch = PostPatch;

    const KIND: ResourceKind = ResourceKind::Post;

    fn id(&self) -> &i64 {
        &self.id
    }

    fn prepare_patch(mut patch: PostPatch) -> Result<PostPatch, DomainError> {
        if let Some(title) = patch.title.as_mut() {
            ensure_present(title, "title")?;
            *title = title.trim().to_string();
        }

        patch.slug = match patch.slug.take() {
            Some(manual) if !manual.trim().is_empty() => Some(slug_from(&manual)?),
            // A cleared slug is re-derived from the new title when one is sent.
            Some(_) => match patch.title.as_deref() {
                Some(title) => Some(slug_from(title)?),
                None => return Err(DomainError::missing("slug")),
            },
            None => None,
        };
        patch.tags = patch.tags.map(normalize_tags);
        Ok(patch)
    }
}

impl Collection for PostRecord {
    type Draft = PostDraft;

    fn prepare_draft(draft: PostDraft) -> Result<PostDraft, DomainError> {
        ensure_present(&draft.title, "title")?;

        let slug = if draft.slug.trim().is_empty() {
            slug_from(&draft.title)?
        } else {
            slug_from(&draft.slug)?
        };

        Ok(PostDraft {
            title: draft.title.trim().to_string(),
            slug,
            excerpt: non_blank(draft.excerpt),
            image_url: non_blank(draft.image_url),
            category: non_blank(draft.category),
            category_color: non_blank(draft.category_color),
            tags: normalize_tags(draft.tags),
            ..draft
        })
    }
}

impl AssetOwner for PostRecord {
    const ASSET_FOLDER: &'static str = "posts";
}

fn slug_from(text: &str) -> Result<String, DomainError> {
    derive_slug(text).map_err(|err| match err {
        SlugError::EmptyInput => DomainError::missing("slug"),
        SlugError::Unrepresentable { .. } => DomainError::validation(err.to_string()),
    })
}

/// Published posts whose title, content or excerpt contain `query`,
/// case-insensitively. A blank query keeps every published post.
pub fn published_matching<'a>(posts: &'a [PostRecord], query: &str) -> Vec<&'a PostRecord> {
    let needle = query.trim().to_lowercase();
    posts
        .iter()
        .filter(|post| post.published)
        .filter(|post| needle.is_empty() || matches_query(post, &needle))
        .collect()
}

fn matches_query(post: &PostRecord, needle: &str) -> bool {
    post.title.to_lowercase().contains(needle)
        || post.content.to_lowercase().contains(needle)
        || post
            .excerpt
            .as_deref()
            .is_some_and(|excerpt| excerpt.to_lowercase().contains(needle))
}

/// Whether `slug` is already in its canonical form.
pub fn is_canonical_slug(slug: &str) -> bool {
    !slug.is_empty() && slugify(slug) == slug
}

#[cfg(test)]
mod tests {
    use time::macros::datetime;

    use super::*;

    fn post(id: i64, title: &str, published: bool) -> PostRecord {
        PostRecord {
            id,
            created_at: datetime!(2024-05-01 10:00 UTC),
            title: title.to_string(),
            content: "Contenido del post".to_string(),
            slug: slugify(title),
            published,
            excerpt: None,
            image_url: None,
            category: None,
            category_color: None,
            tags: Vec::new(),
        }
    }

    #[test]
    fn draft_derives_slug_from_title() {
        let draft = PostDraft {
            title: "Cómo crear plugins".to_string(),
            content: "...".to_string(),
            ..Default::default()
        };
        let prepared = PostRecord::prepare_draft(draft).expect("prepared");
        assert_eq!(prepared.slug, "como-crear-plugins");
    }

    #[test]
    fn draft_keeps_manual_slug_but_normalises_it() {
        let draft = PostDraft {
            title: "Cómo crear plugins".to_string(),
            slug: "Plugins 101".to_string(),
            ..Default::default()
        };
        let prepared = PostRecord::prepare_draft(draft).expect("prepared");
        assert_eq!(prepared.slug, "plugins-101");
    }

    #[test]
    fn draft_requires_title() {
        let draft = PostDraft {
            content: "body".to_string(),
            ..Default::default()
        };
        assert_eq!(
            PostRecord::prepare_draft(draft),
            Err(DomainError::missing("title"))
        );
    }

    #[test]
    fn draft_rejects_unrepresentable_title() {
        let draft = PostDraft {
            title: "???".to_string(),
            ..Default::default()
        };
        assert!(matches!(
            PostRecord::prepare_draft(draft),
            Err(DomainError::Validation { .. })
        ));
    }

    #[test]
    fn patch_rederives_cleared_slug_from_title() {
        let patch = PostPatch {
            title: Some("Nuevo título".to_string()),
            slug: Some(String::new()),
            ..Default::default()
        };
        let prepared = PostRecord::prepare_patch(patch).expect("prepared");
        assert_eq!(prepared.slug.as_deref(), Some("nuevo-titulo"));
    }

    #[test]
    fn patch_cannot_clear_slug_without_title() {
        let patch = PostPatch {
            slug: Some(" ".to_string()),
            ..Default::default()
        };
        assert_eq!(
            PostRecord::prepare_patch(patch),
            Err(DomainError::missing("slug"))
        );
    }

    #[test]
    fn published_matching_filters_drafts_and_searches() {
        let mut with_excerpt = post(3, "Notas", true);
        with_excerpt.excerpt = Some("Sobre WebAssembly".to_string());
        let posts = vec![
            post(1, "Rust en producción", true),
            post(2, "Borrador sobre Rust", false),
            with_excerpt,
        ];

        let all: Vec<i64> = published_matching(&posts, "  ").iter().map(|p| p.id).collect();
        assert_eq!(all, vec![1, 3]);

        let rust: Vec<i64> = published_matching(&posts, "RUST").iter().map(|p| p.id).collect();
        assert_eq!(rust, vec![1]);

        let wasm: Vec<i64> = published_matching(&posts, "webassembly")
            .iter()
            .map(|p| p.id)
            .collect();
        assert_eq!(wasm, vec![3]);
    }

    #[test]
    fn canonical_slug_detection() {
        assert!(is_canonical_slug("como-crear-plugins"));
        assert!(!is_canonical_slug("Como Crear"));
        assert!(!is_canonical_slug(""));
    }
}
