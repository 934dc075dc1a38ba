//! File-backed record of the last contact form submission.

use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use time::OffsetDateTime;
use tokio::fs;

use crate::application::contact::{LedgerError, SubmissionLedger};

#[derive(Debug, Serialize, Deserialize)]
struct LedgerFile {
    #[serde(with = "time::serde::rfc3339")]
    last_submitted: OffsetDateTime,
}

/// Stores the last submission instant as a small JSON document.
#[derive(Debug, Clone)]
pub struct FileLedger {
    path: PathBuf,
}

impl FileLedger {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

#[async_trait]
impl SubmissionLedger for FileLedger {
    async fn last_submitted(&self) -> Result<Option<OffsetDateTime>, LedgerError> {
        let contents = match fs::read(&self.path).await {
            Ok(contents) => contents,
            Err(err) if err.kind() == ErrorKind::NotFound => return Ok(None),
            Err(err) => return Err(LedgerError::Io(err.to_string())),
        };
        let file: LedgerFile = serde_json::from_slice(&contents)
            .map_err(|err| LedgerError::Corrupt(format!("{}: {err}", self.path.display())))?;
        Ok(Some(file.last_submitted))
    }

    async fn record(&self, at: OffsetDateTime) -> Result<(), LedgerError> {
        if let Some(parent) = self.path.parent().filter(|dir| !dir.as_os_str().is_empty()) {
            fs::create_dir_all(parent)
                .await
                .map_err(|err| LedgerError::Io(err.to_string()))?;
        }
        let contents = serde_json::to_vec_pretty(&LedgerFile { last_submitted: at })
            .map_err(|err| LedgerError::Corrupt(err.to_string()))?;
        fs::write(&self.path, contents)
            .await
            .map_err(|err| LedgerError::Io(err.to_string()))
    }
}
