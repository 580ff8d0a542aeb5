use std::collections::BTreeSet;

use crate::domain::table::row::{Row, RowKey};

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct SelectionSet {
    checked: BTreeSet<RowKey>,
}

impl SelectionSet {
    pub fn is_checked(&self, key: RowKey) -> bool {
        self.checked.contains(&key)
    }

    pub fn set_checked(&mut self, key: RowKey, checked: bool) {
        if checked {
            self.checked.insert(key);
        } else {
            self.checked.remove(&key);
        }
    }

    pub fn toggle(&mut self, key: RowKey) -> bool {
        let next = !self.is_checked(key);
        self.set_checked(key, next);
        next
    }

    /// Header toggle: with nothing checked, check every row of the dataset
    /// (hidden rows included); otherwise clear.
    pub fn toggle_all(&mut self, rows: &[Row]) {
        if self.checked.is_empty() {
            self.checked = rows.iter().map(|row| row.key).collect();
        } else {
            self.checked.clear();
        }
    }

    pub fn len(&self) -> usize {
        self.checked.len()
    }

    pub fn is_empty(&self) -> bool {
        self.checked.is_empty()
    }
}
