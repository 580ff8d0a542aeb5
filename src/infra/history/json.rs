use std::fs;
use std::path::PathBuf;

use tracing::debug;

use crate::domain::entities::history::HistoryEntry;
use crate::infra::config::json::{io_error, write_json};
use crate::usecase::ports::store::{HistoryStore, StoreError};

pub struct JsonHistoryStore {
    pub path: PathBuf,
}

impl JsonHistoryStore {
    pub fn new(path: PathBuf) -> Self {
        Self { path }
    }
}

impl HistoryStore for JsonHistoryStore {
    fn load(&self) -> Result<Vec<HistoryEntry>, StoreError> {
        if !self.path.exists() {
            debug!(path = %self.path.display(), "no history file yet");
            return Ok(Vec::new());
        }
        let text = fs::read_to_string(&self.path).map_err(|source| io_error(&self.path, source))?;
        let entries: Vec<HistoryEntry> =
            serde_json::from_str(&text).map_err(|err| StoreError::Format {
                path: self.path.display().to_string(),
                message: err.to_string(),
            })?;
        debug!(entries = entries.len(), "history loaded");
        Ok(entries)
    }

    fn save(&self, entries: &[HistoryEntry]) -> Result<(), StoreError> {
        write_json(&self.path, entries)
    }
}
