use std::cmp::Ordering;

use crate::domain::table::row::{CellValue, Row};
use crate::domain::table::schema::SCORE_COLUMN;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortDirection {
    Ascending,
    Descending,
}

impl SortDirection {
    pub fn indicator(self) -> &'static str {
        match self {
            SortDirection::Ascending => "▲",
            SortDirection::Descending => "▼",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct SortState {
    active: Option<(String, SortDirection)>,
}

impl SortState {
    pub fn active(&self) -> Option<(&str, SortDirection)> {
        self.active
            .as_ref()
            .map(|(column, direction)| (column.as_str(), *direction))
    }

    pub fn direction_for(&self, column: &str) -> Option<SortDirection> {
        self.active()
            .filter(|(active, _)| *active == column)
            .map(|(_, direction)| direction)
    }

    pub fn activate(&mut self, column: &str) {
        self.active = match self.direction_for(column) {
            None => Some((column.to_string(), SortDirection::Ascending)),
            Some(SortDirection::Ascending) => Some((column.to_string(), SortDirection::Descending)),
            Some(SortDirection::Descending) => None,
        };
    }
}

pub fn sorted_indices(rows: &[Row], state: &SortState) -> Vec<usize> {
    let (column, direction) = state
        .active()
        .unwrap_or((SCORE_COLUMN, SortDirection::Descending));

    let mut order: Vec<usize> = (0..rows.len()).collect();
    order.sort_by(|&a, &b| {
        compare_rows(&rows[a], &rows[b], column, direction)
            .then_with(|| rows[a].position.cmp(&rows[b].position))
    });
    order
}

/// N/A sorts first ascending and last descending; the direction only
/// reorders real values.
pub fn compare_rows(a: &Row, b: &Row, column: &str, direction: SortDirection) -> Ordering {
    let left = a.cell(column);
    let right = b.cell(column);
    let left_na = left.is_none_or(CellValue::is_not_applicable);
    let right_na = right.is_none_or(CellValue::is_not_applicable);

    match (left_na, right_na) {
        (true, true) => Ordering::Equal,
        (true, false) => match direction {
            SortDirection::Ascending => Ordering::Less,
            SortDirection::Descending => Ordering::Greater,
        },
        (false, true) => match direction {
            SortDirection::Ascending => Ordering::Greater,
            SortDirection::Descending => Ordering::Less,
        },
        (false, false) => {
            let ordering = match (left, right) {
                (Some(left), Some(right)) => compare_values(left, right),
                _ => Ordering::Equal,
            };
            match direction {
                SortDirection::Ascending => ordering,
                SortDirection::Descending => ordering.reverse(),
            }
        }
    }
}

pub fn compare_values(left: &CellValue, right: &CellValue) -> Ordering {
    if let (Some(left), Some(right)) = (left.as_number(), right.as_number()) {
        return left.total_cmp(&right);
    }
    if let (Some(left), Some(right)) = (left.as_date(), right.as_date()) {
        return left.cmp(&right);
    }
    left.display_text().cmp(right.display_text())
}
