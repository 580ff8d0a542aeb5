use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::domain::table::row::DEFAULT_TRUNCATE_CHARS;
use crate::infra::api::graphql::DEFAULT_API_URL;
use crate::usecase::ports::store::StoreError;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub api_url: String,
    pub truncate_chars: usize,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            api_url: DEFAULT_API_URL.to_string(),
            truncate_chars: DEFAULT_TRUNCATE_CHARS,
        }
    }
}

pub struct JsonConfigStore {
    pub path: PathBuf,
}

impl JsonConfigStore {
    pub fn new(path: PathBuf) -> Self {
        Self { path }
    }

    pub fn load_or_default(&self) -> AppConfig {
        match self.load() {
            Ok(config) => config,
            Err(err) => {
                warn!(error = %err, "failed to load config; using defaults");
                AppConfig::default()
            }
        }
    }

    pub fn load(&self) -> Result<AppConfig, StoreError> {
        if !self.path.exists() {
            return Ok(AppConfig::default());
        }
        let text = fs::read_to_string(&self.path).map_err(|source| io_error(&self.path, source))?;
        serde_json::from_str(&text).map_err(|err| StoreError::Format {
            path: self.path.display().to_string(),
            message: err.to_string(),
        })
    }

    pub fn save(&self, config: &AppConfig) -> Result<(), StoreError> {
        write_json(&self.path, config)
    }
}

pub(crate) fn write_json<T: Serialize + ?Sized>(path: &Path, value: &T) -> Result<(), StoreError> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).map_err(|source| io_error(parent, source))?;
    }
    let text = serde_json::to_string_pretty(value).map_err(|err| StoreError::Format {
        path: path.display().to_string(),
        message: err.to_string(),
    })?;
    fs::write(path, text).map_err(|source| io_error(path, source))
}

pub(crate) fn io_error(path: &Path, source: std::io::Error) -> StoreError {
    StoreError::Io {
        path: path.display().to_string(),
        source,
    }
}
