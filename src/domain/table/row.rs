use std::collections::{HashMap, HashSet};
use std::fmt;
use std::sync::Arc;

use chrono::NaiveDate;

use crate::domain::entities::book::{
    Edition, READING_FORMAT_AUDIOBOOK, READING_FORMAT_EBOOK, READING_FORMAT_PHYSICAL,
};
use crate::domain::table::na_policy::is_na_highlightable;
use crate::domain::table::schema::{Column, ColumnKind, ColumnSchema, FixedField};

pub const NOT_APPLICABLE: &str = "N/A";
pub const DISPLAY_DATE_FORMAT: &str = "%b %d, %Y";
pub const ISO_DATE_FORMAT: &str = "%Y-%m-%d";
pub const DEFAULT_TRUNCATE_CHARS: usize = 60;

#[derive(Debug, Clone, PartialEq)]
pub enum CellValue {
    Text(String),
    Number { value: f64, display: String },
    Date { date: NaiveDate, display: String },
    NotApplicable { highlight: bool },
}

impl CellValue {
    fn number(value: f64, display: impl Into<String>) -> Self {
        CellValue::Number {
            value,
            display: display.into(),
        }
    }

    pub fn display_text(&self) -> &str {
        match self {
            CellValue::Text(text) => text,
            CellValue::Number { display, .. } | CellValue::Date { display, .. } => display,
            CellValue::NotApplicable { .. } => NOT_APPLICABLE,
        }
    }

    pub fn is_not_applicable(&self) -> bool {
        matches!(self, CellValue::NotApplicable { .. })
    }

    pub fn is_highlighted(&self) -> bool {
        matches!(self, CellValue::NotApplicable { highlight: true })
    }

    pub fn as_number(&self) -> Option<f64> {
        match self {
            CellValue::Number { value, .. } => Some(*value),
            _ => None,
        }
    }

    pub fn as_date(&self) -> Option<NaiveDate> {
        match self {
            CellValue::Date { date, .. } => Some(*date),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum RowKey {
    Edition(i64),
    Fallback(usize),
}

impl fmt::Display for RowKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RowKey::Edition(id) => write!(f, "{id}"),
            RowKey::Fallback(position) => write!(f, "row-{}", position + 1),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Row {
    pub key: RowKey,
    pub position: usize,
    pub edition: Arc<Edition>,
    cells: HashMap<String, CellValue>,
}

impl Row {
    pub fn build(key: RowKey, position: usize, edition: Arc<Edition>, schema: &ColumnSchema) -> Row {
        let cells = schema
            .columns()
            .iter()
            .filter(|column| !column.is_selection())
            .map(|column| (column.name.clone(), derive_cell(&edition, column)))
            .collect();

        Row {
            key,
            position,
            edition,
            cells,
        }
    }

    pub fn cell(&self, column: &str) -> Option<&CellValue> {
        self.cells.get(column)
    }

    pub fn display_text(&self, column: &str) -> &str {
        self.cell(column).map(CellValue::display_text).unwrap_or("")
    }
}

pub fn build_rows(editions: &[Edition], schema: &ColumnSchema) -> Vec<Row> {
    let mut seen_ids = HashSet::new();

    editions
        .iter()
        .enumerate()
        .map(|(position, edition)| {
            let key = match edition.id {
                Some(id) if seen_ids.insert(id) => RowKey::Edition(id),
                _ => RowKey::Fallback(position),
            };
            Row::build(key, position, Arc::new(edition.clone()), schema)
        })
        .collect()
}

fn derive_cell(edition: &Edition, column: &Column) -> CellValue {
    let not_applicable = || CellValue::NotApplicable {
        highlight: is_na_highlightable(&column.kind, edition.reading_format_id),
    };
    let text = |value: &Option<String>| {
        value
            .as_ref()
            .map(|text| CellValue::Text(text.clone()))
            .unwrap_or_else(not_applicable)
    };

    let field = match &column.kind {
        ColumnKind::Contributor { role, slot } => {
            return edition
                .contributors_with_role(role)
                .nth(*slot)
                .map(|contributor| CellValue::Text(contributor.name.clone()))
                .unwrap_or(CellValue::NotApplicable { highlight: false });
        }
        ColumnKind::Fixed(field) => *field,
    };

    match field {
        FixedField::Select => CellValue::Text(String::new()),
        FixedField::Id => edition
            .id
            .map(|id| CellValue::number(id as f64, id.to_string()))
            .unwrap_or_else(not_applicable),
        FixedField::Score => edition
            .score
            .map(|score| CellValue::number(score, format_number(score)))
            .unwrap_or_else(not_applicable),
        FixedField::Title => text(&edition.title),
        FixedField::Subtitle => text(&edition.subtitle),
        FixedField::Cover => CellValue::Text(if edition.has_cover() { "Yes" } else { "No" }.to_string()),
        FixedField::Isbn10 => text(&edition.isbn_10),
        FixedField::Isbn13 => text(&edition.isbn_13),
        FixedField::Asin => text(&edition.asin),
        FixedField::ReadingFormat => edition
            .reading_format_id
            .map(|code| CellValue::Text(reading_format_label(code)))
            .unwrap_or_else(not_applicable),
        FixedField::Pages => edition
            .pages
            .map(|pages| CellValue::number(pages as f64, pages.to_string()))
            .unwrap_or_else(not_applicable),
        FixedField::Duration => edition
            .audio_seconds
            .filter(|seconds| *seconds > 0)
            .map(|seconds| CellValue::number(seconds as f64, format_duration(seconds)))
            .unwrap_or_else(not_applicable),
        FixedField::EditionFormat => text(&edition.edition_format),
        FixedField::EditionInformation => text(&edition.edition_information),
        FixedField::ReleaseDate => edition
            .release_date
            .as_deref()
            .and_then(parse_release_date)
            .map(|date| CellValue::Date {
                date,
                display: date.format(DISPLAY_DATE_FORMAT).to_string(),
            })
            .unwrap_or_else(not_applicable),
        FixedField::Publisher => text(&edition.publisher),
        FixedField::Language => text(&edition.language),
        FixedField::Country => text(&edition.country),
    }
}

pub fn reading_format_label(code: i64) -> String {
    match code {
        READING_FORMAT_PHYSICAL => "Physical Book".to_string(),
        READING_FORMAT_AUDIOBOOK => "Audiobook".to_string(),
        READING_FORMAT_EBOOK => "E-Book".to_string(),
        other => other.to_string(),
    }
}

pub fn format_duration(total_seconds: i64) -> String {
    let total_seconds = total_seconds.max(0);
    let hours = total_seconds / 3600;
    let minutes = (total_seconds % 3600) / 60;
    let seconds = total_seconds % 60;
    format!("{hours:02}:{minutes:02}:{seconds:02}")
}

/// Accepts `HH:MM:SS`, `MM:SS`, or plain seconds.
pub fn parse_duration(text: &str) -> Option<f64> {
    let text = text.trim();
    if !text.contains(':') {
        return text.parse::<f64>().ok();
    }

    let parts = text
        .split(':')
        .map(|part| part.trim().parse::<u64>().ok())
        .collect::<Option<Vec<_>>>()?;
    let (hours, minutes, seconds) = match parts.as_slice() {
        [minutes, seconds] => (0, *minutes, *seconds),
        [hours, minutes, seconds] => (*hours, *minutes, *seconds),
        _ => return None,
    };
    let total = hours
        .checked_mul(3600)?
        .checked_add(minutes.checked_mul(60)?)?
        .checked_add(seconds)?;
    Some(total as f64)
}

pub fn parse_release_date(text: &str) -> Option<NaiveDate> {
    let text = text.trim();
    NaiveDate::parse_from_str(text, ISO_DATE_FORMAT)
        .ok()
        .or_else(|| {
            text.get(..10)
                .and_then(|prefix| NaiveDate::parse_from_str(prefix, ISO_DATE_FORMAT).ok())
        })
}

fn format_number(value: f64) -> String {
    if value.fract() == 0.0 && value.abs() < 1e15 {
        format!("{}", value as i64)
    } else {
        format!("{value}")
    }
}

pub fn truncate_for_display(text: &str, budget: usize) -> (String, bool) {
    if text.chars().count() <= budget {
        return (text.to_string(), false);
    }
    let mut shortened: String = text.chars().take(budget.saturating_sub(3)).collect();
    shortened.push_str("...");
    (shortened, true)
}

pub fn is_long_text_column(column: &Column) -> bool {
    matches!(
        column.kind,
        ColumnKind::Fixed(FixedField::Title)
            | ColumnKind::Fixed(FixedField::Subtitle)
            | ColumnKind::Fixed(FixedField::EditionInformation)
    )
}
