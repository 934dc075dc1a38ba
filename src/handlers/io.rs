use std::path::{Path, PathBuf};

use bytes::Bytes;
use folio::application::error::AppError;
use tokio::fs;

fn input_error(path: &Path, source: std::io::Error) -> AppError {
    AppError::InputFile {
        path: path.display().to_string(),
        source,
    }
}

/// Inline value, or the contents of `file` when one is given.
pub async fn read_opt_value(
    val: Option<String>,
    file: Option<PathBuf>,
) -> Result<Option<String>, AppError> {
    if let Some(path) = file {
        let data = fs::read_to_string(&path)
            .await
            .map_err(|source| input_error(&path, source))?;
        return Ok(Some(data));
    }
    Ok(val)
}

pub async fn read_text(path: &Path) -> Result<String, AppError> {
    fs::read_to_string(path)
        .await
        .map_err(|source| input_error(path, source))
}

pub async fn read_bytes(path: &Path) -> Result<Bytes, AppError> {
    fs::read(path)
        .await
        .map(Bytes::from)
        .map_err(|source| input_error(path, source))
}
