use std::path::Path;

use folio::{
    application::error::AppError,
    domain::{posts::is_canonical_slug, reading_time::reading_time_minutes, slug::derive_slug},
};
use serde_json::json;

use super::io::read_text;
use super::print::print_json;

pub fn slug(text: &str) -> Result<(), AppError> {
    let slug = derive_slug(text).map_err(|err| AppError::validation(err.to_string()))?;
    print_json(&json!({
        "slug": slug,
        "canonical": is_canonical_slug(text),
    }))
}

pub async fn reading_time(file: &Path) -> Result<(), AppError> {
    let content = read_text(file).await?;
    print_json(&json!({
        "words": content.split_whitespace().count(),
        "minutes": reading_time_minutes(&content),
    }))
}
