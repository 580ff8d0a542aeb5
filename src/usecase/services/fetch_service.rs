use std::sync::Arc;

use thiserror::Error;
use tracing::{info, warn};

use crate::domain::entities::book::Book;
use crate::domain::table::state::TableState;
use crate::usecase::ports::api::{ApiError, BookSource};
use crate::usecase::ports::store::{StoreError, TokenStore};

#[derive(Debug, Error)]
pub enum FetchError {
    #[error("book id must be a positive whole number, got {0:?}")]
    InvalidBookId(String),
    #[error(transparent)]
    Api(#[from] ApiError),
    #[error("could not read the stored token: {0}")]
    Token(#[from] StoreError),
}

pub struct FetchedBook {
    pub book_id: i64,
    pub book: Book,
    pub table: TableState,
}

pub struct FetchService {
    source: Arc<dyn BookSource>,
    tokens: Arc<dyn TokenStore>,
}

impl FetchService {
    pub fn new(source: Arc<dyn BookSource>, tokens: Arc<dyn TokenStore>) -> Self {
        Self { source, tokens }
    }

    pub fn fetch(&self, book_id_input: &str) -> Result<FetchedBook, FetchError> {
        let book_id = parse_book_id(book_id_input)?;
        let token = self
            .tokens
            .load_token()?
            .filter(|token| !token.trim().is_empty())
            .ok_or(ApiError::MissingToken)?;

        info!(book_id, "fetching book");
        let book = self.source.fetch_book(book_id, &token).map_err(|err| {
            warn!(book_id, error = %err, "book fetch failed");
            err
        })?;
        let table = TableState::from_book(&book);
        info!(book_id, editions = book.editions.len(), "book loaded");

        Ok(FetchedBook {
            book_id,
            book,
            table,
        })
    }
}

pub fn parse_book_id(input: &str) -> Result<i64, FetchError> {
    let trimmed = input.trim();
    match trimmed.parse::<i64>() {
        Ok(id) if id > 0 => Ok(id),
        _ => Err(FetchError::InvalidBookId(trimmed.to_string())),
    }
}
