use crate::domain::entities::book::{Book, Edition};
use crate::domain::table::filter::{FilterSet, PreparedRule};
use crate::domain::table::layout::ColumnLayout;
use crate::domain::table::mappings::MappingCard;
use crate::domain::table::row::{build_rows, Row, RowKey};
use crate::domain::table::schema::{Column, ColumnSchema, SELECT_COLUMN};
use crate::domain::table::selection::SelectionSet;
use crate::domain::table::sort::{sorted_indices, SortState};

#[derive(Debug, Clone, Default)]
pub struct TableState {
    book_slug: Option<String>,
    schema: ColumnSchema,
    rows: Vec<Row>,
    sort: SortState,
    filters: FilterSet,
    prepared: Vec<PreparedRule>,
    selection: SelectionSet,
    layout: ColumnLayout,
}

impl TableState {
    pub fn from_book(book: &Book) -> Self {
        Self {
            book_slug: book.slug.clone(),
            ..Self::from_editions(&book.editions)
        }
    }

    pub fn from_editions(editions: &[Edition]) -> Self {
        let schema = ColumnSchema::build(editions);
        let rows = build_rows(editions, &schema);
        let layout = ColumnLayout::default_for(&schema);
        Self {
            schema,
            rows,
            layout,
            ..Self::default()
        }
    }

    pub fn schema(&self) -> &ColumnSchema {
        &self.schema
    }

    pub fn rows(&self) -> &[Row] {
        &self.rows
    }

    pub fn sort(&self) -> &SortState {
        &self.sort
    }

    pub fn layout(&self) -> &ColumnLayout {
        &self.layout
    }

    pub fn selection(&self) -> &SelectionSet {
        &self.selection
    }

    pub fn activate_header(&mut self, column: &str) {
        if column == SELECT_COLUMN {
            self.toggle_select_all();
        } else if self.schema.contains(column) {
            self.sort.activate(column);
        }
    }

    pub fn apply_filters(&mut self, filters: FilterSet) -> usize {
        self.prepared = filters.prepare(&self.schema);
        self.filters = filters;
        self.prepared.len()
    }

    pub fn clear_filters(&mut self) {
        self.filters = FilterSet::default();
        self.prepared.clear();
    }

    pub fn active_filter_count(&self) -> usize {
        self.prepared.len()
    }

    pub fn toggle_row(&mut self, key: RowKey) -> bool {
        self.selection.toggle(key)
    }

    pub fn is_checked(&self, key: RowKey) -> bool {
        self.selection.is_checked(key)
    }

    pub fn toggle_select_all(&mut self) {
        self.selection.toggle_all(&self.rows);
    }

    pub fn visible_rows(&self) -> Vec<&Row> {
        sorted_indices(&self.rows, &self.sort)
            .into_iter()
            .map(|idx| &self.rows[idx])
            .filter(|row| self.filters.matches(row, &self.prepared))
            .collect()
    }

    pub fn visible_columns(&self) -> Vec<&Column> {
        self.layout
            .visible_columns()
            .iter()
            .filter_map(|name| self.schema.find(name))
            .collect()
    }

    pub fn apply_layout(&mut self, layout: ColumnLayout) {
        self.layout = layout;
    }

    /// Cards for checked rows in display order, including rows the filter hides.
    pub fn selected_mapping_cards(&self) -> Vec<MappingCard> {
        sorted_indices(&self.rows, &self.sort)
            .into_iter()
            .map(|idx| &self.rows[idx])
            .filter(|row| self.selection.is_checked(row.key))
            .map(|row| MappingCard::from_row(row, self.book_slug.as_deref()))
            .collect()
    }
}
