use thiserror::Error;

use crate::domain::entities::history::HistoryEntry;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("io error at {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid data in {path}: {message}")]
    Format { path: String, message: String },
    #[error("credential store: {0}")]
    Credential(String),
}

pub trait TokenStore: Send + Sync {
    fn load_token(&self) -> Result<Option<String>, StoreError>;
    /// `None` removes the stored token.
    fn save_token(&self, token: Option<&str>) -> Result<(), StoreError>;
}

pub trait HistoryStore: Send + Sync {
    fn load(&self) -> Result<Vec<HistoryEntry>, StoreError>;
    fn save(&self, entries: &[HistoryEntry]) -> Result<(), StoreError>;
}
