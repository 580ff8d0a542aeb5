use std::collections::BTreeSet;

use crate::domain::table::schema::ColumnSchema;

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ColumnLayout {
    order: Vec<String>,
    hidden: BTreeSet<String>,
}

impl ColumnLayout {
    pub fn default_for(schema: &ColumnSchema) -> Self {
        Self {
            order: schema.names(),
            hidden: BTreeSet::new(),
        }
    }

    pub fn visible_columns(&self) -> Vec<String> {
        self.order
            .iter()
            .filter(|name| !self.hidden.contains(*name))
            .cloned()
            .collect()
    }

    pub fn draft(&self, schema: &ColumnSchema) -> ColumnLayoutDraft {
        ColumnLayoutDraft {
            applied: self.clone(),
            default: ColumnLayout::default_for(schema),
            current: self.clone(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ColumnLayoutDraft {
    applied: ColumnLayout,
    default: ColumnLayout,
    current: ColumnLayout,
}

impl ColumnLayoutDraft {
    pub fn entries(&self) -> Vec<(String, bool)> {
        self.current
            .order
            .iter()
            .map(|name| (name.clone(), !self.current.hidden.contains(name)))
            .collect()
    }

    pub fn toggle(&mut self, column: &str) {
        if !self.current.order.iter().any(|name| name == column) {
            return;
        }
        if !self.current.hidden.remove(column) {
            self.current.hidden.insert(column.to_string());
        }
    }

    pub fn move_up(&mut self, column: &str) {
        if let Some(idx) = self.position(column) {
            if idx > 0 {
                self.current.order.swap(idx, idx - 1);
            }
        }
    }

    pub fn move_down(&mut self, column: &str) {
        if let Some(idx) = self.position(column) {
            if idx + 1 < self.current.order.len() {
                self.current.order.swap(idx, idx + 1);
            }
        }
    }

    pub fn show_all(&mut self) {
        self.current.hidden.clear();
    }

    pub fn hide_all(&mut self) {
        self.current.hidden = self.current.order.iter().cloned().collect();
    }

    pub fn reset_to_applied(&mut self) {
        self.current = self.applied.clone();
    }

    pub fn reset_to_default(&mut self) {
        self.current = self.default.clone();
    }

    pub fn commit(&self) -> ColumnLayout {
        self.current.clone()
    }

    fn position(&self, column: &str) -> Option<usize> {
        self.current.order.iter().position(|name| name == column)
    }
}
