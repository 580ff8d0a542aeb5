use std::cell::RefCell;
use std::rc::Rc;
use std::sync::Arc;

use dioxus::prelude::*;
use rfd::{FileDialog, MessageButtons, MessageDialog, MessageDialogResult, MessageLevel};

use crate::domain::entities::book::Book;
use crate::domain::entities::history::HistorySort;
use crate::domain::table::filter::{FilterMode, FilterOperator, FilterSet};
use crate::domain::table::mappings::book_page_url;
use crate::domain::table::row::NOT_APPLICABLE;
use crate::domain::table::schema::ColumnType;
use crate::infra::api::graphql::{GraphqlClient, DEFAULT_API_URL};
use crate::infra::config::json::JsonConfigStore;
use crate::infra::config::secret::{mask_token, KeyringTokenStore, KEYRING_SERVICE, KEYRING_USER};
use crate::infra::history::json::JsonHistoryStore;
use crate::platform::desktop::blocking::run_blocking;
use crate::ui::state::app_state::{AppState, FilterDraft, Tab};
use crate::ui::table_view::{build_table_view, format_search_time};
use crate::usecase::ports::store::TokenStore;
use crate::usecase::services::export_service::ExportService;
use crate::usecase::services::fetch_service::FetchService;
use crate::usecase::services::history_service::HistoryService;
use crate::{
    default_config_path, default_history_path, root_container_style, tab_button_style,
    table_cell_style, table_container_style, table_header_cell_style,
};

const BUTTON_STYLE: &str =
    "border: 1px solid #bbb; background: #fff; padding: 4px 10px; border-radius: 6px; cursor: pointer;";
const PANEL_STYLE: &str =
    "border: 1px solid #ccc; border-radius: 8px; padding: 10px; margin: 8px 0; background: #fafafa;";
const DESCRIPTION_PREVIEW_CHARS: usize = 300;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum DropdownId {
    FilterColumn(usize),
    FilterOperator(usize),
    FilterMode,
    HistorySort,
}

#[derive(Clone, Debug, PartialEq)]
struct DropdownOption {
    value: String,
    label: String,
}

impl DropdownOption {
    fn same(text: &str) -> Self {
        Self {
            value: text.to_string(),
            label: text.to_string(),
        }
    }
}

fn dropdown_label(options: &[DropdownOption], selected: Option<&str>) -> String {
    selected
        .and_then(|value| options.iter().find(|opt| opt.value == value))
        .map(|opt| opt.label.clone())
        .unwrap_or_else(|| "(none)".to_string())
}

#[component]
fn DropdownSelect(
    id: DropdownId,
    label: &'static str,
    options: Vec<DropdownOption>,
    selected: Option<String>,
    mut open_dropdown: Signal<Option<DropdownId>>,
    mut dropdown_pos: Signal<Option<(f64, f64)>>,
    on_select: EventHandler<String>,
) -> Element {
    let is_open = open_dropdown() == Some(id);
    let selected_label = dropdown_label(&options, selected.as_deref());
    let (left, top) = dropdown_pos().unwrap_or((0.0, 0.0));

    rsx! {
        div {
            style: "position: relative; display: inline-flex; align-items: center; gap: 6px;",
            if !label.is_empty() {
                span { "{label}" }
            }
            button {
                style: "{BUTTON_STYLE}",
                onclick: move |event| {
                    event.stop_propagation();
                    if open_dropdown() == Some(id) {
                        open_dropdown.set(None);
                        return;
                    }
                    let point = event.client_coordinates();
                    dropdown_pos.set(Some((point.x, point.y + 24.0)));
                    open_dropdown.set(Some(id));
                },
                "{selected_label}"
            }
        }

        if is_open {
            div {
                style: "position: fixed; left: {left}px; top: {top}px; min-width: 200px; max-height: 320px; overflow-y: auto; background: #fff; border: 1px solid #bbb; border-radius: 8px; box-shadow: 0 10px 24px rgba(0,0,0,0.15); z-index: 1200;",
                onclick: move |event| event.stop_propagation(),
                {options.iter().map(|opt| {
                    let value = opt.value.clone();
                    let label = opt.label.clone();
                    let is_selected = selected.as_deref() == Some(value.as_str());
                    let background = if is_selected { "#eef4ff" } else { "transparent" };
                    rsx!(
                        div {
                            style: "padding: 8px 10px; cursor: pointer; background: {background};",
                            onclick: move |_| {
                                on_select.call(value.clone());
                                open_dropdown.set(None);
                            },
                            "{label}"
                        }
                    )
                })}
            }
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
struct BookView {
    title: String,
    subtitle: String,
    author: String,
    details: String,
    slug: String,
    page_url: Option<String>,
    description: String,
    description_preview: String,
}

impl BookView {
    fn from_book(book: &Book) -> Self {
        let description = book.description.clone().unwrap_or_default();
        let edition_count = book
            .editions_count
            .unwrap_or(book.editions.len() as i64);
        Self {
            title: book.display_title(),
            subtitle: book.subtitle.clone().unwrap_or_default(),
            author: book
                .primary_author
                .clone()
                .unwrap_or_else(|| NOT_APPLICABLE.to_string()),
            details: format!(
                "Book ID: {} · Editions: {edition_count}",
                book.id.map(|id| id.to_string()).unwrap_or_default(),
            ),
            slug: book
                .slug
                .clone()
                .unwrap_or_else(|| NOT_APPLICABLE.to_string()),
            page_url: book_page_url(book.slug.as_deref()),
            description_preview: description.chars().take(DESCRIPTION_PREVIEW_CHARS).collect(),
            description,
        }
    }
}

fn history_sort_value(sort: HistorySort) -> &'static str {
    match sort {
        HistorySort::BookId => "book_id",
        HistorySort::Title => "title",
        HistorySort::Date => "date",
    }
}

fn history_sort_from_value(value: &str) -> HistorySort {
    match value {
        "book_id" => HistorySort::BookId,
        "title" => HistorySort::Title,
        _ => HistorySort::Date,
    }
}

fn filter_mode_value(mode: FilterMode) -> &'static str {
    match mode {
        FilterMode::And => "AND",
        FilterMode::Or => "OR",
    }
}

#[component]
pub fn App() -> Element {
    let (config_path, history_path) =
        match default_config_path().and_then(|config| Ok((config, default_history_path()?))) {
            Ok(paths) => paths,
            Err(err) => {
                return rsx! {
                    div {
                        p { "Unable to resolve application directories: {err}" }
                    }
                };
            }
        };

    let AppState {
        mut active_tab,
        mut token_input,
        mut book_id_input,
        mut book,
        mut table,
        mut filter_drafts,
        mut filter_mode,
        mut show_filter_panel,
        mut layout_draft,
        mut history_query,
        mut history_sort,
        mut truncate_chars,
        mut busy,
        mut status,
    } = AppState::new();

    let mut stored_token = use_signal(|| None::<String>);
    let mut api_url = use_signal(|| DEFAULT_API_URL.to_string());
    let mut history =
        use_signal(move || HistoryService::new(Arc::new(JsonHistoryStore::new(history_path))));
    let mut open_dropdown = use_signal(|| None::<DropdownId>);
    let dropdown_pos = use_signal(|| None::<(f64, f64)>);

    let token_store = use_hook(|| {
        KeyringTokenStore::new(KEYRING_SERVICE, KEYRING_USER)
            .map(Arc::new)
            .map_err(|err| err.to_string())
    });
    let token_store = match token_store {
        Ok(store) => store,
        Err(err) => {
            return rsx! {
                div {
                    p { "Unable to open the credential store: {err}" }
                }
            };
        }
    };

    let config_store = Arc::new(JsonConfigStore::new(config_path));
    let config_store_for_init = config_store.clone();
    let token_store_for_init = token_store.clone();
    use_effect(move || {
        let config = config_store_for_init.load_or_default();
        truncate_chars.set(config.truncate_chars.max(4));
        api_url.set(config.api_url.clone());
        match token_store_for_init.load_token() {
            Ok(token) => stored_token.set(token),
            Err(err) => status.set(format!("Could not read the stored token: {err}")),
        }
    });

    let fetch_service = Arc::new(FetchService::new(
        Arc::new(GraphqlClient::new(api_url())),
        token_store.clone(),
    ));

    let run_fetch = Rc::new(RefCell::new(move |input: String| {
        if busy() {
            return;
        }
        *busy.write() = true;
        *status.write() = format!("Fetching book {}...", input.trim());
        match run_blocking("fetch_book", || fetch_service.fetch(&input)) {
            Ok(fetched) => {
                let title = fetched.book.display_title();
                let edition_count = fetched.table.rows().len();
                let saved = history.write().add_search(fetched.book_id, &title);

                table.set(fetched.table);
                filter_drafts.set(Vec::new());
                filter_mode.set(FilterMode::And);
                layout_draft.set(None);
                book_id_input.set(fetched.book_id.to_string());
                book.set(Some(fetched.book));
                *status.write() = match saved {
                    Ok(()) => format!("Loaded \"{title}\" ({edition_count} editions)"),
                    Err(err) => format!(
                        "Loaded \"{title}\" ({edition_count} editions); history not saved: {err}"
                    ),
                };
            }
            Err(err) => {
                *status.write() = format!("Fetch failed: {err}");
            }
        }
        *busy.write() = false;
    }));
    let run_fetch_for_button = run_fetch.clone();
    let run_fetch_for_enter = run_fetch.clone();
    let run_fetch_for_history = run_fetch.clone();

    let token_store_for_save = token_store.clone();
    let token_store_for_clear = token_store.clone();
    let config_store_for_truncate = config_store.clone();

    let token_label = stored_token()
        .map(|token| mask_token(&token))
        .unwrap_or_else(|| "(not set)".to_string());

    let (headers, table_rows, total_rows, active_filters, checked_count, schema, cards) = {
        let state = table.read();
        let (headers, rows) = build_table_view(&state, truncate_chars());
        (
            headers,
            rows,
            state.rows().len(),
            state.active_filter_count(),
            state.selection().len(),
            Arc::new(state.schema().clone()),
            state.selected_mapping_cards(),
        )
    };
    let visible_count = table_rows.len();
    let has_dataset = total_rows > 0;

    let filter_mode_options = vec![DropdownOption::same("AND"), DropdownOption::same("OR")];
    let column_options: Vec<DropdownOption> = schema
        .columns()
        .iter()
        .filter(|column| !column.is_selection())
        .map(|column| DropdownOption::same(&column.name))
        .collect();
    let drafts_snapshot = filter_drafts();
    let layout_snapshot = layout_draft();

    let history_sort_options = vec![
        DropdownOption {
            value: "date".to_string(),
            label: "Date (newest first)".to_string(),
        },
        DropdownOption {
            value: "book_id".to_string(),
            label: "Book ID".to_string(),
        },
        DropdownOption {
            value: "title".to_string(),
            label: "Title".to_string(),
        },
    ];
    let history_entries = history.read().sorted(&history_query(), history_sort());
    let history_total = history.read().count();

    let book_view = book.read().as_ref().map(BookView::from_book);

    rsx! {
        div {
            onclick: move |_| {
                open_dropdown.set(None);
            },
            style: "{root_container_style()}",

            h2 { style: "margin: 0 0 8px 0;", "Librarian Assistant" }

            div {
                style: "display: flex; gap: 8px; align-items: center; flex-wrap: wrap; padding: 4px 0;",
                span { "API token: {token_label}" }
                input {
                    r#type: "password",
                    placeholder: "Paste bearer token",
                    value: "{token_input}",
                    disabled: busy(),
                    oninput: move |event| token_input.set(event.value()),
                }
                button {
                    style: "{BUTTON_STYLE}",
                    disabled: busy() || token_input().trim().is_empty(),
                    onclick: move |_| {
                        let token = token_input().trim().to_string();
                        match token_store_for_save.save_token(Some(token.as_str())) {
                            Ok(()) => {
                                stored_token.set(Some(token));
                                token_input.set(String::new());
                                *status.write() = "Token saved".to_string();
                            }
                            Err(err) => {
                                *status.write() = format!("Could not save token: {err}");
                            }
                        }
                    },
                    "Save token"
                }
                button {
                    style: "{BUTTON_STYLE}",
                    disabled: busy() || stored_token().is_none(),
                    onclick: move |_| {
                        let confirm = MessageDialog::new()
                            .set_level(MessageLevel::Warning)
                            .set_title("Clear token")
                            .set_description("Remove the stored API token?")
                            .set_buttons(MessageButtons::YesNo)
                            .show();
                        if confirm != MessageDialogResult::Yes {
                            return;
                        }
                        match token_store_for_clear.save_token(None) {
                            Ok(()) => {
                                stored_token.set(None);
                                *status.write() = "Token cleared".to_string();
                            }
                            Err(err) => {
                                *status.write() = format!("Could not clear token: {err}");
                            }
                        }
                    },
                    "Clear token"
                }
            }

            div {
                style: "display: flex; gap: 8px; align-items: center; flex-wrap: wrap; padding: 4px 0;",
                span { "Book ID" }
                input {
                    value: "{book_id_input}",
                    placeholder: "e.g. 328491",
                    disabled: busy(),
                    oninput: move |event| book_id_input.set(event.value()),
                    onkeydown: move |event| {
                        if event.key() == Key::Enter {
                            run_fetch_for_enter.borrow_mut()(book_id_input());
                        }
                    },
                }
                button {
                    style: "{BUTTON_STYLE}",
                    disabled: busy(),
                    onclick: move |_| {
                        run_fetch_for_button.borrow_mut()(book_id_input());
                    },
                    "Fetch"
                }
                span { style: "color: #555;", "{status}" }
            }

            div {
                style: "display: flex; gap: 4px; margin-top: 8px; border-bottom: 1px solid #bbb;",
                button {
                    style: "{tab_button_style(active_tab() == Tab::Main)}",
                    onclick: move |_| active_tab.set(Tab::Main),
                    "Main"
                }
                button {
                    style: "{tab_button_style(active_tab() == Tab::History)}",
                    onclick: move |_| active_tab.set(Tab::History),
                    "History ({history_total})"
                }
                button {
                    style: "{tab_button_style(active_tab() == Tab::Mappings)}",
                    onclick: move |_| active_tab.set(Tab::Mappings),
                    "Book Mappings ({checked_count})"
                }
            }

            if active_tab() == Tab::Main {
                if let Some(info) = book_view.clone() {
                    div {
                        style: "{PANEL_STYLE}",
                        h3 { style: "margin: 0;", "{info.title}" }
                        if !info.subtitle.is_empty() {
                            p { style: "margin: 2px 0; color: #555;", "{info.subtitle}" }
                        }
                        p { style: "margin: 4px 0;", "Author: {info.author}" }
                        p { style: "margin: 4px 0; color: #555;", "{info.details}" }
                        p { style: "margin: 4px 0;",
                            "Slug: "
                            if let Some(url) = info.page_url.clone() {
                                a { href: "{url}", target: "_blank", "{info.slug}" }
                            } else {
                                span { style: "color: #777;", "{info.slug}" }
                            }
                        }
                        if !info.description.is_empty() {
                            p {
                                style: "margin: 4px 0; max-height: 80px; overflow: auto;",
                                title: "{info.description}",
                                "{info.description_preview}"
                            }
                        }
                    }
                }

                div {
                    style: "display: flex; gap: 8px; align-items: center; flex-wrap: wrap; padding: 4px 0;",
                    button {
                        style: "{BUTTON_STYLE}",
                        disabled: !has_dataset,
                        onclick: move |_| {
                            let next = !show_filter_panel();
                            show_filter_panel.set(next);
                        },
                        if show_filter_panel() { "Hide filters" } else { "Filters" }
                    }
                    button {
                        style: "{BUTTON_STYLE}",
                        disabled: !has_dataset,
                        onclick: move |_| {
                            let draft = {
                                let state = table.read();
                                state.layout().draft(state.schema())
                            };
                            layout_draft.set(Some(draft));
                        },
                        "Columns"
                    }
                    button {
                        style: "{BUTTON_STYLE}",
                        disabled: !has_dataset,
                        onclick: move |_| {
                            let Some(path) = FileDialog::new()
                                .add_filter("CSV", &["csv"])
                                .set_file_name("editions.csv")
                                .save_file()
                            else {
                                return;
                            };
                            let result = run_blocking("export_csv", || {
                                ExportService.export_csv(&table.read(), &path)
                            });
                            *status.write() = match result {
                                Ok(count) => format!("Exported {count} editions to {}", path.display()),
                                Err(err) => format!("Export failed: {err:#}"),
                            };
                        },
                        "Export CSV"
                    }
                    span { "Truncate at" }
                    input {
                        r#type: "number",
                        min: "4",
                        style: "width: 64px;",
                        value: "{truncate_chars}",
                        onchange: move |event| {
                            let Ok(chars) = event.value().trim().parse::<usize>() else {
                                return;
                            };
                            let chars = chars.max(4);
                            truncate_chars.set(chars);
                            let mut config = config_store_for_truncate.load_or_default();
                            config.truncate_chars = chars;
                            if let Err(err) = config_store_for_truncate.save(&config) {
                                *status.write() = format!("Could not save settings: {err}");
                            }
                        },
                    }
                    span {
                        "Showing {visible_count} of {total_rows} editions"
                        if active_filters > 0 { " ({active_filters} filter rules active)" }
                        " · {checked_count} checked"
                    }
                }

                if show_filter_panel() && has_dataset {
                    div {
                        style: "{PANEL_STYLE}",
                        onclick: move |event| event.stop_propagation(),
                        div {
                            style: "display: flex; gap: 8px; align-items: center; margin-bottom: 6px;",
                            DropdownSelect {
                                id: DropdownId::FilterMode,
                                label: "Match",
                                options: filter_mode_options.clone(),
                                selected: Some(filter_mode_value(filter_mode()).to_string()),
                                open_dropdown: open_dropdown,
                                dropdown_pos: dropdown_pos,
                                on_select: move |value: String| {
                                    filter_mode.set(if value == "OR" { FilterMode::Or } else { FilterMode::And });
                                },
                            }
                            span { style: "color: #555;", "of the rules below" }
                        }
                        {drafts_snapshot.iter().enumerate().map(|(idx, draft)| {
                            let schema = schema.clone();
                            let schema_for_operator = schema.clone();
                            let column_type = schema
                                .find(&draft.column)
                                .map(|column| column.column_type)
                                .unwrap_or(ColumnType::Text);
                            let operator_options: Vec<DropdownOption> = FilterOperator::for_type(column_type)
                                .iter()
                                .map(|operator| DropdownOption::same(operator.label()))
                                .collect();
                            let needs_operand = draft.operator.needs_operand();
                            let needs_range = draft.operator.needs_range();
                            let value = draft.value.clone();
                            let end = draft.end.clone();
                            let draft_column = draft.column.clone();
                            rsx!(
                                div {
                                    style: "display: flex; gap: 8px; align-items: center; padding: 3px 0;",
                                    DropdownSelect {
                                        id: DropdownId::FilterColumn(idx),
                                        label: "",
                                        options: column_options.clone(),
                                        selected: Some(draft.column.clone()),
                                        open_dropdown: open_dropdown,
                                        dropdown_pos: dropdown_pos,
                                        on_select: move |name: String| {
                                            let column_type = schema
                                                .find(&name)
                                                .map(|column| column.column_type)
                                                .unwrap_or(ColumnType::Text);
                                            if let Some(slot) = filter_drafts.write().get_mut(idx) {
                                                *slot = FilterDraft::for_column(&name, column_type);
                                            }
                                        },
                                    }
                                    DropdownSelect {
                                        id: DropdownId::FilterOperator(idx),
                                        label: "",
                                        options: operator_options,
                                        selected: Some(draft.operator.label().to_string()),
                                        open_dropdown: open_dropdown,
                                        dropdown_pos: dropdown_pos,
                                        on_select: move |label: String| {
                                            let column_type = schema_for_operator
                                                .find(&draft_column)
                                                .map(|column| column.column_type)
                                                .unwrap_or(ColumnType::Text);
                                            if let Some(operator) = FilterOperator::from_label(column_type, &label) {
                                                if let Some(slot) = filter_drafts.write().get_mut(idx) {
                                                    slot.operator = operator;
                                                }
                                            }
                                        },
                                    }
                                    if needs_operand {
                                        input {
                                            value: "{value}",
                                            placeholder: if needs_range { "start (YYYY-MM-DD)" } else { "value" },
                                            oninput: move |event| {
                                                if let Some(slot) = filter_drafts.write().get_mut(idx) {
                                                    slot.value = event.value();
                                                }
                                            },
                                        }
                                    }
                                    if needs_range {
                                        input {
                                            value: "{end}",
                                            placeholder: "end (YYYY-MM-DD)",
                                            oninput: move |event| {
                                                if let Some(slot) = filter_drafts.write().get_mut(idx) {
                                                    slot.end = event.value();
                                                }
                                            },
                                        }
                                    }
                                    button {
                                        style: "{BUTTON_STYLE}",
                                        onclick: move |_| {
                                            let mut drafts = filter_drafts.write();
                                            if idx < drafts.len() {
                                                drafts.remove(idx);
                                            }
                                        },
                                        "Remove"
                                    }
                                }
                            )
                        })}
                        div {
                            style: "display: flex; gap: 8px; margin-top: 6px;",
                            button {
                                style: "{BUTTON_STYLE}",
                                onclick: move |_| {
                                    let draft = FilterDraft::first_for(table.read().schema());
                                    if let Some(draft) = draft {
                                        filter_drafts.write().push(draft);
                                    }
                                },
                                "Add rule"
                            }
                            button {
                                style: "{BUTTON_STYLE}",
                                onclick: move |_| {
                                    let rules = filter_drafts().iter().map(FilterDraft::to_rule).collect::<Vec<_>>();
                                    let requested = rules.len();
                                    let active = table.write().apply_filters(FilterSet::new(rules, filter_mode()));
                                    *status.write() = if active < requested {
                                        format!("{active} of {requested} filter rules applied; incomplete rules are ignored")
                                    } else {
                                        format!("{active} filter rules applied")
                                    };
                                },
                                "Apply"
                            }
                            button {
                                style: "{BUTTON_STYLE}",
                                onclick: move |_| {
                                    filter_drafts.set(Vec::new());
                                    table.write().clear_filters();
                                    *status.write() = "Filters cleared".to_string();
                                },
                                "Clear"
                            }
                        }
                    }
                }

                if let Some(draft) = layout_snapshot.clone() {
                    div {
                        style: "{PANEL_STYLE} max-height: 280px; overflow-y: auto;",
                        div {
                            style: "display: flex; gap: 8px; margin-bottom: 6px; flex-wrap: wrap;",
                            button {
                                style: "{BUTTON_STYLE}",
                                onclick: move |_| {
                                    if let Some(draft) = layout_draft.write().as_mut() {
                                        draft.show_all();
                                    }
                                },
                                "Show all"
                            }
                            button {
                                style: "{BUTTON_STYLE}",
                                onclick: move |_| {
                                    if let Some(draft) = layout_draft.write().as_mut() {
                                        draft.hide_all();
                                    }
                                },
                                "Hide all"
                            }
                            button {
                                style: "{BUTTON_STYLE}",
                                onclick: move |_| {
                                    if let Some(draft) = layout_draft.write().as_mut() {
                                        draft.reset_to_applied();
                                    }
                                },
                                "Reset"
                            }
                            button {
                                style: "{BUTTON_STYLE}",
                                onclick: move |_| {
                                    if let Some(draft) = layout_draft.write().as_mut() {
                                        draft.reset_to_default();
                                    }
                                },
                                "Defaults"
                            }
                            button {
                                style: "{BUTTON_STYLE}",
                                onclick: move |_| {
                                    let committed = layout_draft().map(|draft| draft.commit());
                                    if let Some(layout) = committed {
                                        table.write().apply_layout(layout);
                                    }
                                    layout_draft.set(None);
                                },
                                "Apply"
                            }
                            button {
                                style: "{BUTTON_STYLE}",
                                onclick: move |_| layout_draft.set(None),
                                "Cancel"
                            }
                        }
                        {draft.entries().into_iter().map(|(name, visible)| {
                            let name_for_toggle = name.clone();
                            let name_for_up = name.clone();
                            let name_for_down = name.clone();
                            rsx!(
                                div {
                                    style: "display: flex; align-items: center; gap: 8px; padding: 2px 0;",
                                    input {
                                        r#type: "checkbox",
                                        checked: visible,
                                        onclick: move |_| {
                                            if let Some(draft) = layout_draft.write().as_mut() {
                                                draft.toggle(&name_for_toggle);
                                            }
                                        },
                                    }
                                    span { style: "min-width: 180px;", "{name}" }
                                    button {
                                        style: "{BUTTON_STYLE}",
                                        onclick: move |_| {
                                            if let Some(draft) = layout_draft.write().as_mut() {
                                                draft.move_up(&name_for_up);
                                            }
                                        },
                                        "▲"
                                    }
                                    button {
                                        style: "{BUTTON_STYLE}",
                                        onclick: move |_| {
                                            if let Some(draft) = layout_draft.write().as_mut() {
                                                draft.move_down(&name_for_down);
                                            }
                                        },
                                        "▼"
                                    }
                                }
                            )
                        })}
                    }
                }

                div {
                    style: "{table_container_style()}",
                    if has_dataset {
                        table { style: "border-collapse: collapse; width: 100%; background: #fff;",
                            thead {
                                tr {
                                    {headers.iter().map(|header| {
                                        let name = header.name.clone();
                                        let label = header.label.clone();
                                        let all_checked = checked_count > 0;
                                        rsx!(
                                            th {
                                                style: "{table_header_cell_style()}",
                                                onclick: move |_| {
                                                    table.write().activate_header(&name);
                                                },
                                                if header.is_select {
                                                    input {
                                                        r#type: "checkbox",
                                                        checked: all_checked,
                                                    }
                                                } else {
                                                    "{label}"
                                                }
                                            }
                                        )
                                    })}
                                }
                            }
                            tbody {
                                {table_rows.iter().map(|row| {
                                    let key = row.key;
                                    let row_style = if row.checked { "background: #eef4ff;" } else { "" };
                                    rsx!(
                                        tr {
                                            key: "{key}",
                                            style: "{row_style}",
                                            {row.cells.iter().map(|cell| {
                                                if cell.is_select {
                                                    rsx!(
                                                        td { style: "border: 1px solid #bbb; padding: 4px; text-align: center;",
                                                            input {
                                                                r#type: "checkbox",
                                                                checked: row.checked,
                                                                onclick: move |_| {
                                                                    table.write().toggle_row(key);
                                                                },
                                                            }
                                                        }
                                                    )
                                                } else {
                                                    let text = cell.text.clone();
                                                    let tooltip = cell.tooltip.clone();
                                                    rsx!(
                                                        td {
                                                            style: "{table_cell_style(cell.highlight)}",
                                                            title: "{tooltip}",
                                                            "{text}"
                                                        }
                                                    )
                                                }
                                            })}
                                        }
                                    )
                                })}
                            }
                        }
                    } else {
                        p { style: "padding: 12px; color: #555;", "Enter a book ID and fetch to see its editions." }
                    }
                }
            }

            if active_tab() == Tab::History {
                div {
                    style: "display: flex; gap: 8px; align-items: center; flex-wrap: wrap; padding: 8px 0;",
                    input {
                        placeholder: "Search by ID or title",
                        value: "{history_query}",
                        oninput: move |event| history_query.set(event.value()),
                    }
                    DropdownSelect {
                        id: DropdownId::HistorySort,
                        label: "Sort by",
                        options: history_sort_options.clone(),
                        selected: Some(history_sort_value(history_sort()).to_string()),
                        open_dropdown: open_dropdown,
                        dropdown_pos: dropdown_pos,
                        on_select: move |value: String| history_sort.set(history_sort_from_value(&value)),
                    }
                    button {
                        style: "{BUTTON_STYLE}",
                        disabled: history_total == 0,
                        onclick: move |_| {
                            let confirm = MessageDialog::new()
                                .set_level(MessageLevel::Warning)
                                .set_title("Clear history")
                                .set_description("Remove every entry from the search history?")
                                .set_buttons(MessageButtons::YesNo)
                                .show();
                            if confirm != MessageDialogResult::Yes {
                                return;
                            }
                            let result = history.write().clear();
                            *status.write() = match result {
                                Ok(()) => "Search history cleared".to_string(),
                                Err(err) => format!("Could not clear history: {err}"),
                            };
                        },
                        "Clear history"
                    }
                }
                div {
                    style: "{table_container_style()}",
                    if history_entries.is_empty() {
                        p { style: "padding: 12px; color: #555;", "No searches yet." }
                    }
                    {history_entries.iter().map(|entry| {
                        let book_id = entry.book_id;
                        let run_fetch = run_fetch_for_history.clone();
                        let when = format_search_time(&entry.search_time);
                        let title = entry.book_title.clone();
                        rsx!(
                            div {
                                key: "{book_id}",
                                style: "display: flex; gap: 12px; padding: 6px 10px; border-bottom: 1px solid #eee; cursor: pointer;",
                                onclick: move |_| {
                                    active_tab.set(Tab::Main);
                                    book_id_input.set(book_id.to_string());
                                    run_fetch.borrow_mut()(book_id.to_string());
                                },
                                span { style: "min-width: 80px; color: #4a78c2;", "{book_id}" }
                                span { style: "flex: 1;", "{title}" }
                                span { style: "color: #777;", "{when}" }
                            }
                        )
                    })}
                }
            }

            if active_tab() == Tab::Mappings {
                div {
                    style: "{table_container_style()} padding: 8px;",
                    if cards.is_empty() {
                        p { style: "color: #555;", "Check editions in the table to see their platform mappings." }
                    }
                    {cards.iter().map(|card| {
                        let card_key = card.key;
                        rsx!(
                            div {
                                key: "{card_key}",
                                style: "{PANEL_STYLE}",
                                h4 { style: "margin: 0 0 4px 0;", "Edition {card.edition_id}" }
                                if let Some(url) = card.edit_url.clone() {
                                    p { style: "margin: 2px 0;",
                                        a { href: "{url}", target: "_blank", "Edit on Hardcover" }
                                    }
                                }
                                p { style: "margin: 2px 0;", "Format: {card.format}" }
                                if let Some(url) = card.cover_url.clone() {
                                    div { style: "display: flex; gap: 8px; align-items: center; margin: 4px 0;",
                                        img { src: "{url}", alt: "Cover", style: "max-height: 96px; border: 1px solid #ddd;" }
                                        a { href: "{url}", target: "_blank", "Cover image" }
                                    }
                                } else {
                                    p { style: "margin: 2px 0; color: #b00020;", "No cover image URL" }
                                }
                                p { style: "margin: 2px 0;", "ISBN-10: {card.isbn_10} · ISBN-13: {card.isbn_13} · ASIN: {card.asin}" }
                                if card.links.is_empty() {
                                    p { style: "margin: 2px 0; color: #777;", "No platform mappings." }
                                }
                                ul { style: "margin: 4px 0; padding-left: 18px;",
                                    {card.links.iter().map(|link| {
                                        let platform = link.platform.clone();
                                        let external_id = link.external_id.clone();
                                        match link.url.clone() {
                                            Some(url) => rsx!(
                                                li {
                                                    "{platform}: "
                                                    a { href: "{url}", target: "_blank", "{external_id}" }
                                                }
                                            ),
                                            None => rsx!(
                                                li { "{platform}: {external_id}" }
                                            ),
                                        }
                                    })}
                                }
                            }
                        )
                    })}
                }
            }
        }
    }
}
