use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HistoryEntry {
    pub book_id: i64,
    pub book_title: String,
    pub search_time: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HistorySort {
    BookId,
    Title,
    Date,
}
