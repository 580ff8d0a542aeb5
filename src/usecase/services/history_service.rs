use std::sync::Arc;

use chrono::Local;
use tracing::{info, warn};

use crate::domain::entities::history::{HistoryEntry, HistorySort};
use crate::usecase::ports::store::{HistoryStore, StoreError};

pub struct HistoryService {
    store: Arc<dyn HistoryStore>,
    entries: Vec<HistoryEntry>,
}

impl HistoryService {
    pub fn new(store: Arc<dyn HistoryStore>) -> Self {
        let entries = store.load().unwrap_or_else(|err| {
            warn!(error = %err, "failed to load search history");
            Vec::new()
        });
        Self { store, entries }
    }

    pub fn add_search(&mut self, book_id: i64, book_title: &str) -> Result<(), StoreError> {
        self.entries.retain(|entry| entry.book_id != book_id);
        self.entries.insert(
            0,
            HistoryEntry {
                book_id,
                book_title: book_title.to_string(),
                search_time: Local::now().to_rfc3339(),
            },
        );
        self.store.save(&self.entries)?;
        info!(book_id, title = book_title, "added book to search history");
        Ok(())
    }

    pub fn clear(&mut self) -> Result<(), StoreError> {
        self.entries.clear();
        self.store.save(&self.entries)?;
        info!("search history cleared");
        Ok(())
    }

    pub fn search(&self, query: &str) -> Vec<HistoryEntry> {
        let query = query.trim().to_lowercase();
        if query.is_empty() {
            return self.entries.clone();
        }
        self.entries
            .iter()
            .filter(|entry| {
                entry.book_id.to_string().contains(&query)
                    || entry.book_title.to_lowercase().contains(&query)
            })
            .cloned()
            .collect()
    }

    pub fn sorted(&self, query: &str, sort: HistorySort) -> Vec<HistoryEntry> {
        let mut entries = self.search(query);
        match sort {
            HistorySort::BookId => entries.sort_by_key(|entry| entry.book_id),
            HistorySort::Title => entries.sort_by_key(|entry| entry.book_title.to_lowercase()),
            HistorySort::Date => {}
        }
        entries
    }

    pub fn count(&self) -> usize {
        self.entries.len()
    }
}
