use chrono::DateTime;

use crate::domain::table::row::{is_long_text_column, truncate_for_display, CellValue, RowKey};
use crate::domain::table::state::TableState;

#[derive(Clone, Debug, PartialEq)]
pub struct HeaderView {
    pub name: String,
    pub label: String,
    pub is_select: bool,
}

#[derive(Clone, Debug, PartialEq)]
pub struct CellView {
    pub text: String,
    pub tooltip: String,
    pub highlight: bool,
    pub is_select: bool,
}

#[derive(Clone, Debug, PartialEq)]
pub struct RowView {
    pub key: RowKey,
    pub checked: bool,
    pub cells: Vec<CellView>,
}

pub fn build_table_view(state: &TableState, truncate_chars: usize) -> (Vec<HeaderView>, Vec<RowView>) {
    let columns = state.visible_columns();

    let headers = columns
        .iter()
        .map(|column| {
            let label = match state.sort().direction_for(&column.name) {
                Some(direction) => format!("{} {}", column.name, direction.indicator()),
                None => column.name.clone(),
            };
            HeaderView {
                name: column.name.clone(),
                label,
                is_select: column.is_selection(),
            }
        })
        .collect();

    let rows = state
        .visible_rows()
        .into_iter()
        .map(|row| {
            let cells = columns
                .iter()
                .map(|column| {
                    if column.is_selection() {
                        return CellView {
                            text: String::new(),
                            tooltip: String::new(),
                            highlight: false,
                            is_select: true,
                        };
                    }
                    let cell = row.cell(&column.name);
                    let full = cell.map(CellValue::display_text).unwrap_or("");
                    let (text, truncated) = if is_long_text_column(column) {
                        truncate_for_display(full, truncate_chars)
                    } else {
                        (full.to_string(), false)
                    };
                    CellView {
                        text,
                        tooltip: if truncated { full.to_string() } else { String::new() },
                        highlight: cell.is_some_and(CellValue::is_highlighted),
                        is_select: false,
                    }
                })
                .collect();
            RowView {
                key: row.key,
                checked: state.is_checked(row.key),
                cells,
            }
        })
        .collect();

    (headers, rows)
}

pub fn format_search_time(search_time: &str) -> String {
    DateTime::parse_from_rfc3339(search_time)
        .map(|time| time.format("%Y-%m-%d %H:%M").to_string())
        .unwrap_or_else(|_| search_time.to_string())
}
