use chrono::NaiveDate;
use tracing::debug;

use crate::domain::table::row::{
    parse_duration, parse_release_date, reading_format_label, CellValue, Row,
};
use crate::domain::table::schema::{Column, ColumnKind, ColumnSchema, ColumnType, FixedField};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FilterOperator {
    Contains,
    DoesNotContain,
    Equals,
    DoesNotEqual,
    StartsWith,
    EndsWith,
    IsEmpty,
    IsNotEmpty,
    NumberEquals,
    NumberNotEquals,
    GreaterThan,
    GreaterOrEqual,
    LessThan,
    LessOrEqual,
    IsNotApplicable,
    IsNotNotApplicable,
    IsOn,
    IsBefore,
    IsAfter,
    IsBetween,
    IsYes,
    IsNo,
    Is,
    IsNot,
}

const TEXT_OPERATORS: &[FilterOperator] = &[
    FilterOperator::Contains,
    FilterOperator::DoesNotContain,
    FilterOperator::Equals,
    FilterOperator::DoesNotEqual,
    FilterOperator::StartsWith,
    FilterOperator::EndsWith,
    FilterOperator::IsEmpty,
    FilterOperator::IsNotEmpty,
];

const NUMERIC_OPERATORS: &[FilterOperator] = &[
    FilterOperator::NumberEquals,
    FilterOperator::NumberNotEquals,
    FilterOperator::GreaterThan,
    FilterOperator::GreaterOrEqual,
    FilterOperator::LessThan,
    FilterOperator::LessOrEqual,
    FilterOperator::IsNotApplicable,
    FilterOperator::IsNotNotApplicable,
];

const DATE_OPERATORS: &[FilterOperator] = &[
    FilterOperator::IsOn,
    FilterOperator::IsBefore,
    FilterOperator::IsAfter,
    FilterOperator::IsBetween,
    FilterOperator::IsNotApplicable,
    FilterOperator::IsNotNotApplicable,
];

const BOOLEAN_OPERATORS: &[FilterOperator] = &[FilterOperator::IsYes, FilterOperator::IsNo];

const ENUM_OPERATORS: &[FilterOperator] = &[FilterOperator::Is, FilterOperator::IsNot];

impl FilterOperator {
    pub fn for_type(column_type: ColumnType) -> &'static [FilterOperator] {
        match column_type {
            ColumnType::Text => TEXT_OPERATORS,
            ColumnType::Numeric => NUMERIC_OPERATORS,
            ColumnType::Date => DATE_OPERATORS,
            ColumnType::BooleanLike => BOOLEAN_OPERATORS,
            ColumnType::Enumerated => ENUM_OPERATORS,
            ColumnType::Selection => &[],
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            FilterOperator::Contains => "Contains",
            FilterOperator::DoesNotContain => "Does not contain",
            FilterOperator::Equals => "Equals",
            FilterOperator::DoesNotEqual => "Does not equal",
            FilterOperator::StartsWith => "Starts with",
            FilterOperator::EndsWith => "Ends with",
            FilterOperator::IsEmpty => "Is empty",
            FilterOperator::IsNotEmpty => "Is not empty",
            FilterOperator::NumberEquals => "=",
            FilterOperator::NumberNotEquals => "≠",
            FilterOperator::GreaterThan => ">",
            FilterOperator::GreaterOrEqual => ">=",
            FilterOperator::LessThan => "<",
            FilterOperator::LessOrEqual => "<=",
            FilterOperator::IsNotApplicable => "Is N/A",
            FilterOperator::IsNotNotApplicable => "Is not N/A",
            FilterOperator::IsOn => "Is on",
            FilterOperator::IsBefore => "Is before",
            FilterOperator::IsAfter => "Is after",
            FilterOperator::IsBetween => "Is between",
            FilterOperator::IsYes => "Is \"Yes\"",
            FilterOperator::IsNo => "Is \"No\"",
            FilterOperator::Is => "Is",
            FilterOperator::IsNot => "Is not",
        }
    }

    pub fn from_label(column_type: ColumnType, label: &str) -> Option<FilterOperator> {
        FilterOperator::for_type(column_type)
            .iter()
            .copied()
            .find(|operator| operator.label() == label)
    }

    pub fn needs_operand(self) -> bool {
        !matches!(
            self,
            FilterOperator::IsEmpty
                | FilterOperator::IsNotEmpty
                | FilterOperator::IsNotApplicable
                | FilterOperator::IsNotNotApplicable
                | FilterOperator::IsYes
                | FilterOperator::IsNo
        )
    }

    pub fn needs_range(self) -> bool {
        self == FilterOperator::IsBetween
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum Operand {
    #[default]
    None,
    Value(String),
    Range { start: String, end: String },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FilterRule {
    pub column: String,
    pub operator: FilterOperator,
    pub operand: Operand,
}

impl FilterRule {
    pub fn new(column: impl Into<String>, operator: FilterOperator, operand: Operand) -> Self {
        Self {
            column: column.into(),
            operator,
            operand,
        }
    }

    pub fn value(column: impl Into<String>, operator: FilterOperator, value: &str) -> Self {
        Self::new(column, operator, Operand::Value(value.to_string()))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FilterMode {
    #[default]
    And,
    Or,
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct FilterSet {
    pub rules: Vec<FilterRule>,
    pub mode: FilterMode,
}

impl FilterSet {
    pub fn new(rules: Vec<FilterRule>, mode: FilterMode) -> Self {
        Self { rules, mode }
    }

    /// Rules that can be evaluated against `schema`. Rules on unknown columns,
    /// with an operator foreign to the column type, or with a missing operand
    /// are left out.
    pub fn prepare(&self, schema: &ColumnSchema) -> Vec<PreparedRule> {
        self.rules
            .iter()
            .filter_map(|rule| {
                let prepared = PreparedRule::new(rule, schema);
                if prepared.is_none() {
                    debug!(column = %rule.column, operator = rule.operator.label(), "filter rule inactive");
                }
                prepared
            })
            .collect()
    }

    pub fn matches(&self, row: &Row, prepared: &[PreparedRule]) -> bool {
        if prepared.is_empty() {
            return true;
        }
        match self.mode {
            FilterMode::And => prepared.iter().all(|rule| rule.matches(row)),
            FilterMode::Or => prepared.iter().any(|rule| rule.matches(row)),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
enum Check {
    Text(FilterOperator, String),
    Empty(bool),
    NotApplicable(bool),
    Number(FilterOperator, f64),
    Date(FilterOperator, NaiveDate),
    DateRange(NaiveDate, NaiveDate),
    Yes(bool),
    Label { equal: bool, label: String },
}

#[derive(Debug, Clone, PartialEq)]
pub struct PreparedRule {
    column: String,
    check: Check,
}

impl PreparedRule {
    fn new(rule: &FilterRule, schema: &ColumnSchema) -> Option<PreparedRule> {
        let column = schema.find(&rule.column)?;
        let operator = rule.operator;
        if !FilterOperator::for_type(column.column_type).contains(&operator) {
            return None;
        }

        let check = match operator {
            FilterOperator::IsEmpty => Check::Empty(true),
            FilterOperator::IsNotEmpty => Check::Empty(false),
            FilterOperator::IsNotApplicable => Check::NotApplicable(true),
            FilterOperator::IsNotNotApplicable => Check::NotApplicable(false),
            FilterOperator::IsYes => Check::Yes(true),
            FilterOperator::IsNo => Check::Yes(false),
            FilterOperator::IsBetween => {
                let Operand::Range { start, end } = &rule.operand else {
                    return None;
                };
                let start = parse_release_date(start)?;
                let end = parse_release_date(end)?;
                Check::DateRange(start.min(end), start.max(end))
            }
            _ => {
                let value = single_operand(&rule.operand)?;
                match column.column_type {
                    ColumnType::Numeric => Check::Number(operator, parse_number(column, value)?),
                    ColumnType::Date => Check::Date(operator, parse_release_date(value)?),
                    ColumnType::Enumerated => Check::Label {
                        equal: operator == FilterOperator::Is,
                        label: enumerated_label(value),
                    },
                    _ => Check::Text(operator, value.to_lowercase()),
                }
            }
        };

        Some(PreparedRule {
            column: column.name.clone(),
            check,
        })
    }

    pub fn matches(&self, row: &Row) -> bool {
        let Some(cell) = row.cell(&self.column).filter(|cell| !cell.is_not_applicable()) else {
            // An N/A cell only answers the emptiness and N/A checks.
            return match self.check {
                Check::Empty(empty) => empty,
                Check::NotApplicable(expected) => expected,
                _ => false,
            };
        };

        match &self.check {
            Check::Empty(empty) => cell.display_text().trim().is_empty() == *empty,
            Check::NotApplicable(expected) => !*expected,
            Check::Text(operator, needle) => text_matches(*operator, cell, needle),
            Check::Number(operator, operand) => cell
                .as_number()
                .is_some_and(|value| number_matches(*operator, value, *operand)),
            Check::Date(operator, operand) => cell.as_date().is_some_and(|date| match operator {
                FilterOperator::IsOn => date == *operand,
                FilterOperator::IsBefore => date < *operand,
                FilterOperator::IsAfter => date > *operand,
                _ => false,
            }),
            Check::DateRange(start, end) => cell
                .as_date()
                .is_some_and(|date| *start <= date && date <= *end),
            Check::Yes(yes) => cell.display_text().eq_ignore_ascii_case("yes") == *yes,
            Check::Label { equal, label } => {
                (cell.display_text().to_lowercase() == label.to_lowercase()) == *equal
            }
        }
    }
}

fn single_operand(operand: &Operand) -> Option<&str> {
    match operand {
        Operand::Value(value) if !value.trim().is_empty() => Some(value.trim()),
        _ => None,
    }
}

fn parse_number(column: &Column, value: &str) -> Option<f64> {
    if column.kind == ColumnKind::Fixed(FixedField::Duration) {
        return parse_duration(value);
    }
    value.parse::<f64>().ok()
}

fn enumerated_label(value: &str) -> String {
    value
        .parse::<i64>()
        .map(reading_format_label)
        .unwrap_or_else(|_| value.to_string())
}

fn text_matches(operator: FilterOperator, cell: &CellValue, needle: &str) -> bool {
    let haystack = cell.display_text().to_lowercase();
    match operator {
        FilterOperator::Contains => haystack.contains(needle),
        FilterOperator::DoesNotContain => !haystack.contains(needle),
        FilterOperator::Equals => haystack == needle,
        FilterOperator::DoesNotEqual => haystack != needle,
        FilterOperator::StartsWith => haystack.starts_with(needle),
        FilterOperator::EndsWith => haystack.ends_with(needle),
        _ => false,
    }
}

fn number_matches(operator: FilterOperator, value: f64, operand: f64) -> bool {
    match operator {
        FilterOperator::NumberEquals => value == operand,
        FilterOperator::NumberNotEquals => value != operand,
        FilterOperator::GreaterThan => value > operand,
        FilterOperator::GreaterOrEqual => value >= operand,
        FilterOperator::LessThan => value < operand,
        FilterOperator::LessOrEqual => value <= operand,
        _ => false,
    }
}
