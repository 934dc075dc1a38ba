//! Utilities for generating deterministic, human-friendly slugs.
//!
//! Slugs are ASCII, lowercase and hyphen-separated. Diacritics and other
//! non-ASCII text are transliterated through the `slug` crate, so
//! "Cómo crear plugins" becomes `como-crear-plugins`. Uniqueness is not
//! checked here; the posts collection enforces it when the row is written.

use slug::slugify as ascii_slug;
use thiserror::Error;

/// Errors that can occur while deriving a slug.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum SlugError {
    #[error("slug source text is empty")]
    EmptyInput,
    #[error("failed to derive slug from `{input}`")]
    Unrepresentable { input: String },
}

/// Transform arbitrary text into a URL-safe slug.
///
/// Total and idempotent: `slugify(&slugify(x)) == slugify(x)`. Text without
/// any representable characters yields an empty string.
pub fn slugify(input: &str) -> String {
    ascii_slug(input)
}

/// Derive a slug, rejecting input that produces nothing usable.
pub fn derive_slug(input: &str) -> Result<String, SlugError> {
    if input.trim().is_empty() {
        return Err(SlugError::EmptyInput);
    }

    let candidate = slugify(input);
    if candidate.is_empty() {
        return Err(SlugError::Unrepresentable {
            input: input.to_string(),
        });
    }

    Ok(candidate)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn strips_diacritics_and_hyphenates() {
        assert_eq!(slugify("Cómo crear plugins"), "como-crear-plugins");
    }

    #[test]
    fn collapses_separator_runs_and_trims() {
        assert_eq!(slugify("  --Rust & WebAssembly!!  "), "rust-webassembly");
        assert_eq!(slugify("año 2024: ¿qué aprendí?"), "ano-2024-que-aprendi");
    }

    #[test]
    fn slugify_is_idempotent() {
        let inputs = [
            "Cómo crear plugins",
            "Hello,   World",
            "already-a-slug",
            "Ünïcödé ÇÀFÉ",
            "---",
            "",
            "Rust 基础",
        ];
        for input in inputs {
            let once = slugify(input);
            assert_eq!(slugify(&once), once, "input: {input}");
        }
    }

    #[test]
    fn derive_slug_rejects_empty_input() {
        assert_eq!(derive_slug("   "), Err(SlugError::EmptyInput));
        assert_eq!(
            derive_slug("!!!"),
            Err(SlugError::Unrepresentable {
                input: "!!!".to_string()
            })
        );
        assert_eq!(derive_slug("Mi primer post").as_deref(), Ok("mi-primer-post"));
    }
}
