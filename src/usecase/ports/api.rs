use thiserror::Error;

use crate::domain::entities::book::Book;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ApiError {
    #[error("no API token configured")]
    MissingToken,
    #[error("authentication failed (HTTP {0}); check the bearer token")]
    Auth(u16),
    #[error("book {0} was not found")]
    NotFound(i64),
    #[error("network error: {0}")]
    Network(String),
    #[error("could not process the API response: {0}")]
    Processing(String),
}

pub trait BookSource: Send + Sync {
    fn fetch_book(&self, book_id: i64, token: &str) -> Result<Book, ApiError>;
}
