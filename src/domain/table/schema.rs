use std::collections::HashMap;

use crate::domain::entities::book::Edition;

pub const SELECT_COLUMN: &str = "Select";
pub const SCORE_COLUMN: &str = "score";

/// Contributor roles in display order; unlisted roles follow in first-seen order.
pub const ROLE_PRIORITY: [&str; 8] = [
    "Author",
    "Illustrator",
    "Editor",
    "Translator",
    "Narrator",
    "Foreword",
    "Cover Artist",
    "Other",
];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ColumnType {
    Selection,
    Text,
    Numeric,
    Date,
    BooleanLike,
    Enumerated,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FixedField {
    Select,
    Id,
    Score,
    Title,
    Subtitle,
    Cover,
    Isbn10,
    Isbn13,
    Asin,
    ReadingFormat,
    Pages,
    Duration,
    EditionFormat,
    EditionInformation,
    ReleaseDate,
    Publisher,
    Language,
    Country,
}

impl FixedField {
    pub const ALL: [FixedField; 18] = [
        FixedField::Select,
        FixedField::Id,
        FixedField::Score,
        FixedField::Title,
        FixedField::Subtitle,
        FixedField::Cover,
        FixedField::Isbn10,
        FixedField::Isbn13,
        FixedField::Asin,
        FixedField::ReadingFormat,
        FixedField::Pages,
        FixedField::Duration,
        FixedField::EditionFormat,
        FixedField::EditionInformation,
        FixedField::ReleaseDate,
        FixedField::Publisher,
        FixedField::Language,
        FixedField::Country,
    ];

    pub fn column_name(self) -> &'static str {
        match self {
            FixedField::Select => SELECT_COLUMN,
            FixedField::Id => "id",
            FixedField::Score => SCORE_COLUMN,
            FixedField::Title => "title",
            FixedField::Subtitle => "subtitle",
            FixedField::Cover => "Cover Image?",
            FixedField::Isbn10 => "isbn_10",
            FixedField::Isbn13 => "isbn_13",
            FixedField::Asin => "asin",
            FixedField::ReadingFormat => "Reading Format",
            FixedField::Pages => "pages",
            FixedField::Duration => "Duration",
            FixedField::EditionFormat => "edition_format",
            FixedField::EditionInformation => "edition_information",
            FixedField::ReleaseDate => "release_date",
            FixedField::Publisher => "publisher",
            FixedField::Language => "language",
            FixedField::Country => "country",
        }
    }

    pub fn column_type(self) -> ColumnType {
        match self {
            FixedField::Select => ColumnType::Selection,
            FixedField::Id | FixedField::Score | FixedField::Pages | FixedField::Duration => {
                ColumnType::Numeric
            }
            FixedField::ReleaseDate => ColumnType::Date,
            FixedField::Cover => ColumnType::BooleanLike,
            FixedField::ReadingFormat => ColumnType::Enumerated,
            _ => ColumnType::Text,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum ColumnKind {
    Fixed(FixedField),
    Contributor { role: String, slot: usize },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Column {
    pub name: String,
    pub column_type: ColumnType,
    pub kind: ColumnKind,
}

impl Column {
    fn fixed(field: FixedField) -> Self {
        Self {
            name: field.column_name().to_string(),
            column_type: field.column_type(),
            kind: ColumnKind::Fixed(field),
        }
    }

    fn contributor(role: &str, slot: usize) -> Self {
        Self {
            name: format!("{role} {}", slot + 1),
            column_type: ColumnType::Text,
            kind: ColumnKind::Contributor {
                role: role.to_string(),
                slot,
            },
        }
    }

    pub fn is_selection(&self) -> bool {
        self.column_type == ColumnType::Selection
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ColumnSchema {
    columns: Vec<Column>,
}

impl ColumnSchema {
    pub fn build(editions: &[Edition]) -> Self {
        let mut columns: Vec<Column> = FixedField::ALL.into_iter().map(Column::fixed).collect();

        for (role, max_count) in contributor_role_slots(editions) {
            for slot in 0..max_count {
                columns.push(Column::contributor(&role, slot));
            }
        }

        Self { columns }
    }

    pub fn columns(&self) -> &[Column] {
        &self.columns
    }

    pub fn names(&self) -> Vec<String> {
        self.columns.iter().map(|column| column.name.clone()).collect()
    }

    pub fn find(&self, name: &str) -> Option<&Column> {
        self.columns.iter().find(|column| column.name == name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.find(name).is_some()
    }
}

pub fn contributor_role_slots(editions: &[Edition]) -> Vec<(String, usize)> {
    let mut first_seen: Vec<String> = Vec::new();
    let mut max_counts: HashMap<String, usize> = HashMap::new();

    for edition in editions {
        let mut counts: HashMap<&str, usize> = HashMap::new();
        for contributor in &edition.contributors {
            let role = contributor.role_label();
            *counts.entry(role).or_insert(0) += 1;
            if !max_counts.contains_key(role) {
                first_seen.push(role.to_string());
                max_counts.insert(role.to_string(), 0);
            }
        }
        for (role, count) in counts {
            if let Some(max) = max_counts.get_mut(role) {
                *max = (*max).max(count);
            }
        }
    }

    let mut ordered: Vec<String> = ROLE_PRIORITY
        .iter()
        .filter(|role| max_counts.contains_key(**role))
        .map(|role| role.to_string())
        .collect();
    ordered.extend(
        first_seen
            .into_iter()
            .filter(|role| !ROLE_PRIORITY.contains(&role.as_str())),
    );

    ordered
        .into_iter()
        .filter_map(|role| {
            let max = max_counts.get(&role).copied().unwrap_or(0);
            (max > 0).then_some((role, max))
        })
        .collect()
}
