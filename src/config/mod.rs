//! Configuration layer: typed settings with layered precedence (file → env → CLI).

mod cli;
#[cfg(test)]
mod tests;

use std::{path::PathBuf, str::FromStr};

use clap::Parser;
use config::{Config, Environment, File};
use serde::Deserialize;
use thiserror::Error;
use time::Duration;
use tracing::level_filters::LevelFilter;
use url::Url;

pub use cli::{
    AssetKindArg, CliArgs, Command, ContactArgs, GlobalOverrides, MessagesArgs, MessagesCmd,
    PostFieldArgs, PostsArgs, PostsCmd, ProjectFieldArgs, ProjectsArgs, ProjectsCmd, SettingsArgs,
    SettingsCmd, SettingsFieldArgs, UploadArgs,
};

const DEFAULT_CONFIG_BASENAME: &str = "config/default";
const LOCAL_CONFIG_BASENAME: &str = "folio";
const DEFAULT_STORAGE_BUCKET: &str = "images";
const DEFAULT_CONTACT_RATE_LIMIT_SECS: u64 = 60;
const DEFAULT_CONTACT_LEDGER_PATH: &str = ".folio/contact.json";

/// Fully-resolved settings after precedence resolution and validation.
#[derive(Debug, Clone)]
pub struct Settings {
    pub backend: BackendSettings,
    pub storage: StorageSettings,
    pub logging: LoggingSettings,
    pub contact: ContactSettings,
}

#[derive(Debug, Clone, Default)]
pub struct BackendSettings {
    pub url: Option<Url>,
    pub anon_key: Option<String>,
    pub access_token: Option<String>,
}

impl BackendSettings {
    /// URL and anonymous key, both required for commands that reach the
    /// backend.
    pub fn endpoint(&self) -> Result<(&Url, &str), LoadError> {
        let url = self
            .url
            .as_ref()
            .ok_or_else(|| LoadError::invalid("backend.url", "is required"))?;
        let anon_key = self
            .anon_key
            .as_deref()
            .ok_or_else(|| LoadError::invalid("backend.anon_key", "is required"))?;
        Ok((url, anon_key))
    }
}

#[derive(Debug, Clone)]
pub struct StorageSettings {
    pub bucket: String,
}

#[derive(Debug, Clone)]
pub struct LoggingSettings {
    pub level: LevelFilter,
    pub format: LogFormat,
}

#[derive(Debug, Clone, Copy)]
pub enum LogFormat {
    Json,
    Compact,
}

#[derive(Debug, Clone)]
pub struct ContactSettings {
    /// Minimum interval between two accepted submissions. Zero disables the
    /// limit.
    pub rate_limit: Duration,
    pub ledger_path: PathBuf,
}

#[derive(Debug, Error)]
pub enum LoadError {
    #[error("failed to build configuration: {0}")]
    Build(#[from] config::ConfigError),
    #[error("invalid configuration for `{key}`: {reason}")]
    Invalid { key: &'static str, reason: String },
}

impl LoadError {
    fn invalid(key: &'static str, reason: impl Into<String>) -> Self {
        Self::Invalid {
            key,
            reason: reason.into(),
        }
    }
}

/// Load settings using the configured precedence (file → environment → CLI).
pub fn load(cli: &CliArgs) -> Result<Settings, LoadError> {
    let mut builder = Config::builder()
        .add_source(File::with_name(DEFAULT_CONFIG_BASENAME).required(false))
        .add_source(File::with_name(LOCAL_CONFIG_BASENAME).required(false));

    if let Some(path) = cli.config_file.as_ref() {
        builder = builder.add_source(File::from(path.as_path()).required(true));
    }

    builder = builder.add_source(Environment::with_prefix("FOLIO").separator("__"));

    let mut raw: RawSettings = builder.build()?.try_deserialize()?;
    raw.apply_overrides(&cli.overrides);

    Settings::from_raw(raw)
}

/// Resolve configuration using the process arguments, returning both for downstream use.
pub fn load_with_cli() -> Result<(CliArgs, Settings), LoadError> {
    let args = CliArgs::parse();
    let settings = load(&args)?;
    Ok((args, settings))
}

#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
struct RawSettings {
    backend: RawBackendSettings,
    storage: RawStorageSettings,
    logging: RawLoggingSettings,
    contact: RawContactSettings,
}

#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
struct RawBackendSettings {
    url: Option<String>,
    anon_key: Option<String>,
    access_token: Option<String>,
}

#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
struct RawStorageSettings {
    bucket: Option<String>,
}

#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
struct RawLoggingSettings {
    level: Option<String>,
    json: Option<bool>,
}

#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
struct RawContactSettings {
    rate_limit_seconds: Option<u64>,
    ledger_path: Option<PathBuf>,
}

impl RawSettings {
    fn apply_overrides(&mut self, overrides: &GlobalOverrides) {
        if let Some(url) = overrides.backend_url.as_ref() {
            self.backend.url = Some(url.clone());
        }
        if let Some(key) = overrides.anon_key.as_ref() {
            self.backend.anon_key = Some(key.clone());
        }
        if let Some(token) = overrides.access_token.as_ref() {
            self.backend.access_token = Some(token.clone());
        }
        if let Some(bucket) = overrides.storage_bucket.as_ref() {
            self.storage.bucket = Some(bucket.clone());
        }
        if let Some(level) = overrides.log_level.as_ref() {
            self.logging.level = Some(level.clone());
        }
        if let Some(json) = overrides.log_json {
            self.logging.json = Some(json);
        }
    }
}

impl Settings {
    fn from_raw(raw: RawSettings) -> Result<Self, LoadError> {
        let RawSettings {
            backend,
            storage,
            logging,
            contact,
        } = raw;

        Ok(Self {
            backend: build_backend_settings(backend)?,
            storage: build_storage_settings(storage)?,
            logging: build_logging_settings(logging)?,
            contact: build_contact_settings(contact)?,
        })
    }
}

fn build_backend_settings(backend: RawBackendSettings) -> Result<BackendSettings, LoadError> {
    let url = match non_empty(backend.url) {
        Some(raw) => {
            let url = Url::parse(&raw)
                .map_err(|err| LoadError::invalid("backend.url", format!("`{raw}`: {err}")))?;
            if !matches!(url.scheme(), "http" | "https") {
                return Err(LoadError::invalid(
                    "backend.url",
                    format!("unsupported scheme `{}`", url.scheme()),
                ));
            }
            Some(url)
        }
        None => None,
    };

    Ok(BackendSettings {
        url,
        anon_key: non_empty(backend.anon_key),
        access_token: non_empty(backend.access_token),
    })
}

fn build_storage_settings(storage: RawStorageSettings) -> Result<StorageSettings, LoadError> {
    let bucket = non_empty(storage.bucket).unwrap_or_else(|| DEFAULT_STORAGE_BUCKET.to_string());
    if bucket.contains('/') {
        return Err(LoadError::invalid("storage.bucket", "must not contain `/`"));
    }
    Ok(StorageSettings { bucket })
}

fn build_logging_settings(logging: RawLoggingSettings) -> Result<LoggingSettings, LoadError> {
    let level = match logging.level {
        Some(level) => LevelFilter::from_str(level.as_str()).map_err(|err| {
            LoadError::invalid("logging.level", format!("failed to parse: {err}"))
        })?,
        None => LevelFilter::WARN,
    };

    let format = if logging.json.unwrap_or(false) {
        LogFormat::Json
    } else {
        LogFormat::Compact
    };

    Ok(LoggingSettings { level, format })
}

fn build_contact_settings(contact: RawContactSettings) -> Result<ContactSettings, LoadError> {
    let seconds = contact
        .rate_limit_seconds
        .unwrap_or(DEFAULT_CONTACT_RATE_LIMIT_SECS);
    let seconds: i64 = seconds.try_into().map_err(|_| {
        LoadError::invalid("contact.rate_limit_seconds", "value exceeds supported range")
    })?;

    let ledger_path = contact
        .ledger_path
        .filter(|path| !path.as_os_str().is_empty())
        .unwrap_or_else(|| PathBuf::from(DEFAULT_CONTACT_LEDGER_PATH));

    Ok(ContactSettings {
        rate_limit: Duration::seconds(seconds),
        ledger_path,
    })
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.and_then(|value| {
        let trimmed = value.trim();
        (!trimmed.is_empty()).then(|| trimmed.to_string())
    })
}
