use std::path::Path;

use anyhow::Result;
use tracing::info;

use crate::domain::table::state::TableState;
use crate::infra::export::csv::write_csv;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportTable {
    pub headers: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

impl ExportTable {
    pub fn from_state(state: &TableState) -> Self {
        let columns: Vec<&str> = state
            .visible_columns()
            .into_iter()
            .filter(|column| !column.is_selection())
            .map(|column| column.name.as_str())
            .collect();

        let rows = state
            .visible_rows()
            .into_iter()
            .map(|row| {
                columns
                    .iter()
                    .map(|column| row.display_text(column).to_string())
                    .collect()
            })
            .collect();

        Self {
            headers: columns.iter().map(|column| column.to_string()).collect(),
            rows,
        }
    }
}

pub struct ExportService;

impl ExportService {
    pub fn export_csv(&self, state: &TableState, path: &Path) -> Result<usize> {
        let table = ExportTable::from_state(state);
        let written = write_csv(path, &table)?;
        info!(rows = written, path = %path.display(), "exported editions table");
        Ok(written)
    }
}
