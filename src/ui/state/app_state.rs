use dioxus::prelude::{use_signal, Signal};

use crate::domain::entities::book::Book;
use crate::domain::entities::history::HistorySort;
use crate::domain::table::filter::{FilterMode, FilterOperator, FilterRule, Operand};
use crate::domain::table::layout::ColumnLayoutDraft;
use crate::domain::table::row::DEFAULT_TRUNCATE_CHARS;
use crate::domain::table::schema::{ColumnSchema, ColumnType};
use crate::domain::table::state::TableState;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Tab {
    Main,
    History,
    Mappings,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FilterDraft {
    pub column: String,
    pub operator: FilterOperator,
    pub value: String,
    pub end: String,
}

impl FilterDraft {
    pub fn first_for(schema: &ColumnSchema) -> Option<Self> {
        let column = schema.columns().iter().find(|column| !column.is_selection())?;
        Some(Self::for_column(&column.name, column.column_type))
    }

    pub fn for_column(column: &str, column_type: ColumnType) -> Self {
        let operator = FilterOperator::for_type(column_type)
            .first()
            .copied()
            .unwrap_or(FilterOperator::Contains);
        Self {
            column: column.to_string(),
            operator,
            value: String::new(),
            end: String::new(),
        }
    }

    pub fn to_rule(&self) -> FilterRule {
        let operand = if self.operator.needs_range() {
            Operand::Range {
                start: self.value.clone(),
                end: self.end.clone(),
            }
        } else if self.operator.needs_operand() {
            Operand::Value(self.value.clone())
        } else {
            Operand::None
        };
        FilterRule::new(self.column.clone(), self.operator, operand)
    }
}

pub struct AppState {
    pub active_tab: Signal<Tab>,
    pub token_input: Signal<String>,
    pub book_id_input: Signal<String>,
    pub book: Signal<Option<Book>>,
    pub table: Signal<TableState>,
    pub filter_drafts: Signal<Vec<FilterDraft>>,
    pub filter_mode: Signal<FilterMode>,
    pub show_filter_panel: Signal<bool>,
    pub layout_draft: Signal<Option<ColumnLayoutDraft>>,
    pub history_query: Signal<String>,
    pub history_sort: Signal<HistorySort>,
    pub truncate_chars: Signal<usize>,
    pub busy: Signal<bool>,
    pub status: Signal<String>,
}

impl AppState {
    pub fn new() -> Self {
        Self {
            active_tab: use_signal(|| Tab::Main),
            token_input: use_signal(String::new),
            book_id_input: use_signal(String::new),
            book: use_signal(|| None::<Book>),
            table: use_signal(TableState::default),
            filter_drafts: use_signal(Vec::<FilterDraft>::new),
            filter_mode: use_signal(FilterMode::default),
            show_filter_panel: use_signal(|| false),
            layout_draft: use_signal(|| None::<ColumnLayoutDraft>),
            history_query: use_signal(String::new),
            history_sort: use_signal(|| HistorySort::Date),
            truncate_chars: use_signal(|| DEFAULT_TRUNCATE_CHARS),
            busy: use_signal(|| false),
            status: use_signal(|| "Ready".to_string()),
        }
    }
}
