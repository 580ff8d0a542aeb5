use std::cmp::Ordering;
use std::fs;
use std::path::PathBuf;
use std::sync::{Arc, Mutex};
use std::time::{SystemTime, UNIX_EPOCH};

use chrono::NaiveDate;
use serde_json::json;

use crate::domain::entities::book::{Book, BookMapping, Contributor, Edition};
use crate::domain::entities::history::{HistoryEntry, HistorySort};
use crate::domain::table::filter::{FilterMode, FilterOperator, FilterRule, FilterSet, Operand};
use crate::domain::table::layout::ColumnLayout;
use crate::domain::table::mappings::{book_page_url, edition_edit_url, platform_url};
use crate::domain::table::na_policy::is_na_highlightable;
use crate::domain::table::row::{
    build_rows, format_duration, parse_duration, reading_format_label, truncate_for_display,
    CellValue, Row, RowKey,
};
use crate::domain::table::schema::{
    contributor_role_slots, ColumnKind, ColumnSchema, ColumnType, FixedField, SELECT_COLUMN,
};
use crate::domain::table::selection::SelectionSet;
use crate::domain::table::sort::{compare_values, SortDirection, SortState};
use crate::domain::table::state::TableState;
use crate::infra::api::graphql::{authorization_header, parse_book_response};
use crate::infra::config::json::{AppConfig, JsonConfigStore};
use crate::infra::config::secret::{mask_token, KeyringTokenStore, KEYRING_SERVICE, KEYRING_USER};
use crate::infra::history::json::JsonHistoryStore;
use crate::ui::state::app_state::FilterDraft;
use crate::ui::table_view::{build_table_view, format_search_time};
use crate::usecase::ports::api::{ApiError, BookSource};
use crate::usecase::ports::store::{HistoryStore, StoreError, TokenStore};
use crate::usecase::services::export_service::{ExportService, ExportTable};
use crate::usecase::services::fetch_service::{parse_book_id, FetchError, FetchService};
use crate::usecase::services::history_service::HistoryService;
use crate::*;

fn unique_test_dir(prefix: &str) -> PathBuf {
    let nanos = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .expect("clock should be after epoch")
        .as_nanos();
    std::env::temp_dir().join(format!("librarian-{prefix}-{nanos}"))
}

fn sample_book_json() -> serde_json::Value {
    json!({
        "id": 328491,
        "slug": "the-hobbit",
        "title": "The Hobbit",
        "subtitle": null,
        "description": "There and back again.",
        "editions_count": 3,
        "contributions": [{ "author": { "name": "J.R.R. Tolkien" } }],
        "editions": [
            {
                "id": 11,
                "score": 98,
                "title": "The Hobbit",
                "image": { "url": "https://example.com/cover.jpg" },
                "isbn_13": "9780547928227",
                "reading_format_id": 1,
                "pages": 300,
                "release_date": "2012-09-18",
                "cached_contributors": [
                    { "author": { "name": "J.R.R. Tolkien" }, "contribution": null },
                    { "author": { "name": "Alan Lee" }, "contribution": "Illustrator" }
                ],
                "book_mappings": [
                    { "external_id": "5907", "platform": { "name": "goodreads" } },
                    { "platform": { "name": "amazon" } }
                ],
                "publisher": { "name": "Mariner" },
                "language": { "language": "English" },
                "country": { "name": "United States" }
            },
            {
                "id": 12,
                "score": 85,
                "title": "The Hobbit (Audio)",
                "reading_format_id": 2,
                "audio_seconds": 40000,
                "cached_contributors": [
                    { "author": { "name": "J.R.R. Tolkien" } },
                    { "author": { "name": "Andy Serkis" }, "contribution": "Narrator" },
                    { "contribution": "Narrator" }
                ]
            },
            "not an edition"
        ]
    })
}

fn sample_response() -> String {
    json!({ "data": { "books": [sample_book_json()] } }).to_string()
}

#[test]
fn book_response_decodes_editions_and_skips_malformed_entries() {
    let book = parse_book_response(328491, 200, &sample_response())
        .expect("well-formed response should decode");

    assert_eq!(book.display_title(), "The Hobbit");
    assert_eq!(book.primary_author.as_deref(), Some("J.R.R. Tolkien"));
    assert_eq!(book.editions.len(), 2, "non-object edition should be skipped");

    let first = &book.editions[0];
    assert!(first.has_cover());
    assert_eq!(first.contributors.len(), 2);
    assert_eq!(first.contributors[1].role_label(), "Illustrator");
    assert_eq!(first.mappings.len(), 1, "mapping without id should be skipped");
    assert_eq!(first.language.as_deref(), Some("English"));

    let second = &book.editions[1];
    assert_eq!(second.contributors.len(), 2, "contributor without author is skipped");
}

#[test]
fn book_response_classifies_failures() {
    assert_eq!(
        parse_book_response(1, 401, "").expect_err("401 should fail"),
        ApiError::Auth(401)
    );
    assert_eq!(
        parse_book_response(1, 403, "").expect_err("403 should fail"),
        ApiError::Auth(403)
    );
    assert_eq!(
        parse_book_response(7, 404, "").expect_err("404 should fail"),
        ApiError::NotFound(7)
    );
    assert_eq!(
        parse_book_response(7, 200, r#"{"data":{"books":[]}}"#).expect_err("empty list should fail"),
        ApiError::NotFound(7)
    );
    assert_eq!(
        parse_book_response(7, 200, r#"{"errors":[{"message":"field not found"}]}"#)
            .expect_err("graphql errors should fail"),
        ApiError::Processing("field not found".to_string())
    );
    assert!(matches!(
        parse_book_response(7, 500, "boom"),
        Err(ApiError::Network(message)) if message.contains("500")
    ));
    assert!(matches!(
        parse_book_response(7, 200, "not json"),
        Err(ApiError::Processing(_))
    ));
}

#[test]
fn authorization_header_does_not_double_the_scheme() {
    assert_eq!(authorization_header("abc"), "Bearer abc");
    assert_eq!(authorization_header(" Bearer abc "), "Bearer abc");
    assert_eq!(authorization_header("bearer abc"), "bearer abc");
}

#[test]
fn fetched_book_builds_dynamic_columns() {
    let book = parse_book_response(328491, 200, &sample_response()).expect("should decode");
    let state = TableState::from_book(&book);
    let names = state.schema().names();

    assert!(names.contains(&"Author 1".to_string()));
    assert!(names.contains(&"Illustrator 1".to_string()));
    assert!(names.contains(&"Narrator 1".to_string()));
    assert!(!names.contains(&"Narrator 2".to_string()));

    let audiobook = state
        .rows()
        .iter()
        .find(|row| row.key == RowKey::Edition(12))
        .expect("audiobook row should exist");
    assert_eq!(audiobook.display_text("Duration"), "11:06:40");
    assert_eq!(audiobook.display_text("Reading Format"), "Audiobook");
    assert!(audiobook
        .cell("pages")
        .is_some_and(|cell| !cell.is_highlighted()));
}

#[test]
fn token_round_trips_through_the_credential_store() {
    keyring::set_default_credential_builder(keyring::mock::default_credential_builder());
    let store = KeyringTokenStore::new(KEYRING_SERVICE, KEYRING_USER)
        .expect("mock keyring entry should open");

    assert_eq!(store.load_token().expect("empty entry should load"), None);

    store
        .save_token(Some("  secret-token-value  "))
        .expect("token should save");
    assert_eq!(
        store.load_token().expect("token should load").as_deref(),
        Some("secret-token-value")
    );

    store.save_token(None).expect("token should clear");
    assert_eq!(store.load_token().expect("cleared token should load"), None);
    store.save_token(None).expect("clearing twice should succeed");
}

#[test]
fn config_file_keeps_only_non_secret_settings() {
    let temp_dir = unique_test_dir("config");
    let store = JsonConfigStore::new(temp_dir.join("config.json"));
    assert_eq!(store.load().expect("missing file should load"), AppConfig::default());

    let config = AppConfig {
        truncate_chars: 24,
        ..AppConfig::default()
    };
    store.save(&config).expect("config should save");
    let raw = fs::read_to_string(temp_dir.join("config.json")).expect("config should exist");
    assert!(!raw.to_lowercase().contains("token"));
    assert_eq!(store.load().expect("config should parse"), config);

    fs::write(
        temp_dir.join("config.json"),
        r#"{"api_url":"https://example.com/graphql","bearer_token_b64":"c2VjcmV0"}"#,
    )
    .expect("should write legacy config");
    let legacy = store.load().expect("unknown fields should be ignored");
    assert_eq!(legacy.api_url, "https://example.com/graphql");
    assert_eq!(legacy.truncate_chars, AppConfig::default().truncate_chars);

    fs::remove_dir_all(&temp_dir).expect("should cleanup temp dir");
}

#[test]
fn corrupt_config_falls_back_to_defaults() {
    let temp_dir = unique_test_dir("corrupt-config");
    fs::create_dir_all(&temp_dir).expect("should create temp dir");
    let path = temp_dir.join("config.json");
    fs::write(&path, "{ not json").expect("should write config");

    let store = JsonConfigStore::new(path);
    assert!(matches!(store.load(), Err(StoreError::Format { .. })));
    assert_eq!(store.load_or_default(), AppConfig::default());

    fs::remove_dir_all(&temp_dir).expect("should cleanup temp dir");
}

#[test]
fn mask_token_never_reveals_the_whole_token() {
    let token = "abcdefghijklmnopqrstuvwxyz";
    let masked = mask_token(token);
    assert_ne!(masked, token);
    assert!(masked.starts_with("abcd"));
    assert!(masked.ends_with("wxyz"));
    assert_eq!(mask_token("short"), "•••••");
    assert_eq!(mask_token(""), "");
}

#[test]
fn history_moves_repeated_searches_to_front_and_persists() {
    let temp_dir = unique_test_dir("history");
    let path = temp_dir.join("search_history.json");
    let mut history = HistoryService::new(Arc::new(JsonHistoryStore::new(path.clone())));

    history.add_search(1, "Dune").expect("should save");
    history.add_search(2, "Emma").expect("should save");
    history.add_search(1, "Dune").expect("should save");

    let newest_first = history.sorted("", HistorySort::Date);
    let ids: Vec<i64> = newest_first.iter().map(|entry| entry.book_id).collect();
    assert_eq!(ids, vec![1, 2]);
    assert_eq!(history.count(), 2);

    let reloaded = HistoryService::new(Arc::new(JsonHistoryStore::new(path.clone())));
    assert_eq!(reloaded.sorted("", HistorySort::Date), newest_first);
    assert!(reloaded
        .search("emma")
        .first()
        .is_some_and(|entry| entry.book_id == 2));

    history.clear().expect("should clear");
    let stored = JsonHistoryStore::new(path).load().expect("should load");
    assert!(stored.is_empty());

    fs::remove_dir_all(&temp_dir).expect("should cleanup temp dir");
}

#[test]
fn history_search_and_sort() {
    let temp_dir = unique_test_dir("history-search");
    let mut history = HistoryService::new(Arc::new(JsonHistoryStore::new(
        temp_dir.join("search_history.json"),
    )));
    history.add_search(300, "zebra tales").expect("should save");
    history.add_search(12, "Apple Stories").expect("should save");
    history.add_search(45, "middle").expect("should save");

    assert_eq!(history.search("").len(), 3);
    assert_eq!(history.search("APPLE")[0].book_id, 12);
    assert_eq!(history.search("30")[0].book_id, 300);
    assert!(history.search("nothing").is_empty());

    let by_id: Vec<i64> = history
        .sorted("", HistorySort::BookId)
        .iter()
        .map(|entry| entry.book_id)
        .collect();
    assert_eq!(by_id, vec![12, 45, 300]);

    let by_title: Vec<i64> = history
        .sorted("", HistorySort::Title)
        .iter()
        .map(|entry| entry.book_id)
        .collect();
    assert_eq!(by_title, vec![12, 45, 300]);

    let by_date: Vec<i64> = history
        .sorted("", HistorySort::Date)
        .iter()
        .map(|entry| entry.book_id)
        .collect();
    assert_eq!(by_date, vec![45, 12, 300]);

    let matches: Vec<i64> = history
        .sorted("e", HistorySort::BookId)
        .iter()
        .map(|entry| entry.book_id)
        .collect();
    assert_eq!(matches, vec![12, 45, 300]);
    let matches: Vec<i64> = history
        .sorted("s", HistorySort::Title)
        .iter()
        .map(|entry| entry.book_id)
        .collect();
    assert_eq!(matches, vec![12, 300]);

    fs::remove_dir_all(&temp_dir).expect("should cleanup temp dir");
}

#[test]
fn unreadable_history_starts_empty() {
    let temp_dir = unique_test_dir("history-corrupt");
    fs::create_dir_all(&temp_dir).expect("should create temp dir");
    let path = temp_dir.join("search_history.json");
    fs::write(&path, "[{ broken").expect("should write history");

    let history = HistoryService::new(Arc::new(JsonHistoryStore::new(path)));
    assert_eq!(history.count(), 0);

    fs::remove_dir_all(&temp_dir).expect("should cleanup temp dir");
}

struct FakeSource {
    calls: Mutex<Vec<(i64, String)>>,
}

impl BookSource for FakeSource {
    fn fetch_book(&self, book_id: i64, token: &str) -> Result<Book, ApiError> {
        self.calls
            .lock()
            .expect("lock should not be poisoned")
            .push((book_id, token.to_string()));
        if book_id == 404 {
            return Err(ApiError::NotFound(book_id));
        }
        Book::from_json(&sample_book_json()).ok_or(ApiError::Processing("bad fixture".to_string()))
    }
}

struct MemoryTokens(Option<String>);

impl TokenStore for MemoryTokens {
    fn load_token(&self) -> Result<Option<String>, StoreError> {
        Ok(self.0.clone())
    }

    fn save_token(&self, _token: Option<&str>) -> Result<(), StoreError> {
        Ok(())
    }
}

#[test]
fn fetch_service_validates_input_before_calling_the_api() {
    let source = Arc::new(FakeSource {
        calls: Mutex::new(Vec::new()),
    });
    let service = FetchService::new(source.clone(), Arc::new(MemoryTokens(Some("tok".to_string()))));

    assert!(matches!(service.fetch("abc"), Err(FetchError::InvalidBookId(_))));
    assert!(matches!(service.fetch("-3"), Err(FetchError::InvalidBookId(_))));
    assert!(source.calls.lock().expect("lock").is_empty());

    let fetched = service.fetch(" 328491 ").expect("fetch should succeed");
    assert_eq!(fetched.book_id, 328491);
    assert_eq!(fetched.table.rows().len(), 2);
    assert_eq!(
        source.calls.lock().expect("lock").as_slice(),
        &[(328491, "tok".to_string())]
    );

    assert!(matches!(
        service.fetch("404"),
        Err(FetchError::Api(ApiError::NotFound(404)))
    ));
}

#[test]
fn fetch_service_requires_a_token() {
    let source = Arc::new(FakeSource {
        calls: Mutex::new(Vec::new()),
    });
    let service = FetchService::new(source, Arc::new(MemoryTokens(Some("   ".to_string()))));
    assert!(matches!(
        service.fetch("1"),
        Err(FetchError::Api(ApiError::MissingToken))
    ));
    assert_eq!(parse_book_id("42").expect("valid id"), 42);
}

fn export_fixture() -> TableState {
    TableState::from_editions(&[
        Edition {
            id: Some(1),
            score: Some(50.0),
            title: Some("Low, \"quoted\"".to_string()),
            ..Edition::default()
        },
        Edition {
            id: Some(2),
            score: Some(90.0),
            title: Some("High".to_string()),
            ..Edition::default()
        },
    ])
}

#[test]
fn export_writes_visible_columns_and_rows_in_display_order() {
    let temp_dir = unique_test_dir("export");
    fs::create_dir_all(&temp_dir).expect("should create temp dir");
    let path = temp_dir.join("editions.csv");

    let mut state = export_fixture();
    let mut draft = state.layout().draft(state.schema());
    draft.hide_all();
    draft.toggle(SELECT_COLUMN);
    draft.toggle("id");
    draft.toggle("title");
    state.apply_layout(draft.commit());

    let written = ExportService
        .export_csv(&state, &path)
        .expect("export should succeed");
    assert_eq!(written, 2);

    let mut reader = csv::Reader::from_path(&path).expect("should open exported csv");
    let headers: Vec<String> = reader
        .headers()
        .expect("should read headers")
        .iter()
        .map(str::to_string)
        .collect();
    assert_eq!(headers, vec!["id", "title"]);

    let rows: Vec<Vec<String>> = reader
        .records()
        .map(|record| {
            record
                .expect("record should parse")
                .iter()
                .map(str::to_string)
                .collect()
        })
        .collect();
    assert_eq!(
        rows,
        vec![
            vec!["2".to_string(), "High".to_string()],
            vec!["1".to_string(), "Low, \"quoted\"".to_string()],
        ]
    );

    fs::remove_dir_all(&temp_dir).expect("should cleanup temp dir");
}

#[test]
fn export_table_never_truncates() {
    let long_title = "x".repeat(200);
    let state = TableState::from_editions(&[Edition {
        id: Some(1),
        title: Some(long_title.clone()),
        ..Edition::default()
    }]);
    let table = ExportTable::from_state(&state);
    let title_idx = table
        .headers
        .iter()
        .position(|header| header == "title")
        .expect("title column should be exported");
    assert_eq!(table.rows[0][title_idx], long_title);
    assert!(!table.headers.contains(&SELECT_COLUMN.to_string()));
}

#[test]
fn table_view_truncates_long_text_and_marks_missing_data() {
    let mut state = TableState::from_editions(&[Edition {
        id: Some(1),
        title: Some("A".repeat(80)),
        reading_format_id: Some(1),
        ..Edition::default()
    }]);
    state.activate_header("title");
    let (headers, rows) = build_table_view(&state, 20);

    let title_idx = headers
        .iter()
        .position(|header| header.name == "title")
        .expect("title header");
    assert_eq!(headers[title_idx].label, "title ▲");
    assert!(headers[0].is_select);

    let title = &rows[0].cells[title_idx];
    assert_eq!(title.text.chars().count(), 20);
    assert_eq!(title.tooltip.chars().count(), 80);

    let pages_idx = headers
        .iter()
        .position(|header| header.name == "pages")
        .expect("pages header");
    assert!(rows[0].cells[pages_idx].highlight);
}

#[test]
fn filter_draft_builds_rules_for_each_operand_shape() {
    let mut draft = FilterDraft::for_column("release_date", ColumnType::Date);
    draft.operator = FilterOperator::IsBetween;
    draft.value = "2020-01-01".to_string();
    draft.end = "2021-01-01".to_string();
    assert_eq!(
        draft.to_rule().operand,
        Operand::Range {
            start: "2020-01-01".to_string(),
            end: "2021-01-01".to_string()
        }
    );

    let empty = FilterDraft::for_column("title", ColumnType::Text);
    assert_eq!(empty.operator, FilterOperator::Contains);

    let mut na = FilterDraft::for_column("pages", ColumnType::Numeric);
    na.operator = FilterOperator::IsNotApplicable;
    assert_eq!(na.to_rule().operand, Operand::None);
}

#[test]
fn search_time_is_shown_without_offset() {
    assert_eq!(
        format_search_time("2024-05-01T09:30:15.123+02:00"),
        "2024-05-01 09:30"
    );
    assert_eq!(format_search_time("yesterday"), "yesterday");
}

#[test]
fn history_entries_serialize_with_expected_field_names() {
    let entry = HistoryEntry {
        book_id: 5,
        book_title: "Title".to_string(),
        search_time: "2024-05-01T09:30:15+00:00".to_string(),
    };
    let value = serde_json::to_value(&entry).expect("should serialize");
    assert_eq!(value["book_id"], 5);
    assert_eq!(value["book_title"], "Title");
    assert!(value.get("search_time").is_some());
}

#[test]
fn default_paths_use_librarian_assistant_directories() {
    let config_path = default_config_path().expect("config path should resolve");
    let history_path = default_history_path().expect("history path should resolve");

    assert_eq!(
        config_path.file_name().and_then(|name| name.to_str()),
        Some("config.json")
    );
    assert_eq!(
        history_path.file_name().and_then(|name| name.to_str()),
        Some("search_history.json")
    );
    assert!(config_path.to_string_lossy().contains("librarian-assistant"));
}

#[test]
fn ensure_webview_data_dir_creates_webview_subdir() {
    let temp_dir = unique_test_dir("webview-data-dir");
    fs::create_dir_all(&temp_dir).expect("should create temp dir");

    let webview_dir =
        ensure_webview_data_dir(&temp_dir).expect("webview data dir should be created");

    assert_eq!(webview_dir, temp_dir.join("webview"));
    assert!(webview_dir.is_dir(), "webview directory should exist");

    fs::remove_dir_all(&temp_dir).expect("should cleanup temp dir");
}

#[test]
fn table_container_style_allows_scroll() {
    let style = table_container_style();

    assert!(style.contains("overflow: auto"));
    assert!(style.contains("flex: 1"));
    assert!(table_cell_style(true).contains("background"));
    assert!(!table_cell_style(false).contains("background"));
}

#[test]
fn pages_are_expected_only_for_print_and_ebook() {
    let pages = ColumnKind::Fixed(FixedField::Pages);
    assert!(is_na_highlightable(&pages, Some(1)));
    assert!(is_na_highlightable(&pages, Some(4)));
    assert!(!is_na_highlightable(&pages, Some(2)));
    assert!(!is_na_highlightable(&pages, None));
}

#[test]
fn contributor_slots_and_optional_text_never_highlight() {
    let slot = ColumnKind::Contributor {
        role: "Narrator".to_string(),
        slot: 2,
    };
    assert!(!is_na_highlightable(&slot, Some(2)));
    assert!(!is_na_highlightable(
        &ColumnKind::Fixed(FixedField::Subtitle),
        Some(1)
    ));
    assert!(is_na_highlightable(
        &ColumnKind::Fixed(FixedField::Country),
        None
    ));
}

fn edition_with(roles: &[Option<&str>]) -> Edition {
    Edition {
        contributors: roles
            .iter()
            .enumerate()
            .map(|(idx, role)| Contributor {
                name: format!("Person {idx}"),
                role: role.map(str::to_string),
            })
            .collect(),
        ..Edition::default()
    }
}

#[test]
fn empty_batch_has_only_fixed_columns() {
    let schema = ColumnSchema::build(&[]);
    assert_eq!(schema.columns().len(), FixedField::ALL.len());
    assert_eq!(schema.names()[0], SELECT_COLUMN);
    assert_eq!(schema.names().last().map(String::as_str), Some("country"));
}

#[test]
fn unknown_roles_follow_priority_roles_in_first_seen_order() {
    let editions = vec![
        edition_with(&[Some("Compiler"), Some("Narrator")]),
        edition_with(&[None, Some("Adapter"), Some("Compiler")]),
    ];
    let slots = contributor_role_slots(&editions);
    let roles: Vec<&str> = slots.iter().map(|(role, _)| role.as_str()).collect();
    assert_eq!(roles, vec!["Author", "Narrator", "Compiler", "Adapter"]);
}

#[test]
fn blank_role_label_counts_as_author() {
    let editions = vec![edition_with(&[Some("  "), None])];
    assert_eq!(
        contributor_role_slots(&editions),
        vec![("Author".to_string(), 2)]
    );
}

#[test]
fn duration_is_zero_padded_and_not_wrapped() {
    assert_eq!(format_duration(16200), "04:30:00");
    assert_eq!(format_duration(61), "00:01:01");
    assert_eq!(format_duration(90000), "25:00:00");
}

#[test]
fn parse_duration_accepts_clock_and_seconds() {
    assert_eq!(parse_duration("04:30:00"), Some(16200.0));
    assert_eq!(parse_duration("2:05"), Some(125.0));
    assert_eq!(parse_duration("3600"), Some(3600.0));
    assert_eq!(parse_duration("1:2:3:4"), None);
}

#[test]
fn zero_duration_is_highlighted_only_for_audiobooks() {
    let schema = ColumnSchema::build(&[]);
    let audiobook = Edition {
        reading_format_id: Some(2),
        audio_seconds: Some(0),
        ..Edition::default()
    };
    let physical = Edition {
        reading_format_id: Some(1),
        ..Edition::default()
    };
    let rows = build_rows(&[audiobook, physical], &schema);

    assert_eq!(
        rows[0].cell("Duration"),
        Some(&CellValue::NotApplicable { highlight: true })
    );
    assert_eq!(
        rows[1].cell("Duration"),
        Some(&CellValue::NotApplicable { highlight: false })
    );
}

#[test]
fn release_date_is_reformatted_and_bad_dates_are_na() {
    let schema = ColumnSchema::build(&[]);
    let good = Edition {
        release_date: Some("2004-09-30".to_string()),
        ..Edition::default()
    };
    let bad = Edition {
        release_date: Some("sometime".to_string()),
        ..Edition::default()
    };
    let rows = build_rows(&[good, bad], &schema);

    assert_eq!(rows[0].display_text("release_date"), "Sep 30, 2004");
    assert_eq!(
        rows[0].cell("release_date").and_then(CellValue::as_date),
        NaiveDate::from_ymd_opt(2004, 9, 30)
    );
    assert!(rows[1].cell("release_date").is_some_and(CellValue::is_highlighted));
}

#[test]
fn unknown_reading_format_shows_raw_code() {
    assert_eq!(reading_format_label(1), "Physical Book");
    assert_eq!(reading_format_label(4), "E-Book");
    assert_eq!(reading_format_label(99), "99");
}

#[test]
fn missing_or_duplicate_ids_get_positional_keys() {
    let editions = vec![
        Edition {
            id: Some(7),
            ..Edition::default()
        },
        Edition::default(),
        Edition {
            id: Some(7),
            ..Edition::default()
        },
    ];
    let rows = build_rows(&editions, &ColumnSchema::build(&editions));
    let keys: Vec<RowKey> = rows.iter().map(|row| row.key).collect();
    assert_eq!(
        keys,
        vec![RowKey::Edition(7), RowKey::Fallback(1), RowKey::Fallback(2)]
    );
}

#[test]
fn contributor_slots_beyond_count_are_plain_na() {
    let editions = vec![
        Edition {
            contributors: vec![
                Contributor {
                    name: "A".to_string(),
                    role: Some("Narrator".to_string()),
                },
                Contributor {
                    name: "B".to_string(),
                    role: Some("Narrator".to_string()),
                },
            ],
            ..Edition::default()
        },
        Edition {
            contributors: vec![Contributor {
                name: "C".to_string(),
                role: Some("Narrator".to_string()),
            }],
            ..Edition::default()
        },
    ];
    let schema = ColumnSchema::build(&editions);
    let rows = build_rows(&editions, &schema);

    assert_eq!(rows[1].display_text("Narrator 1"), "C");
    assert_eq!(
        rows[1].cell("Narrator 2"),
        Some(&CellValue::NotApplicable { highlight: false })
    );
}

#[test]
fn truncation_keeps_short_text_untouched() {
    assert_eq!(truncate_for_display("short", 10), ("short".to_string(), false));
    let (text, truncated) = truncate_for_display("abcdefghijklmnop", 10);
    assert!(truncated);
    assert_eq!(text, "abcdefg...");
}

#[test]
fn activation_cycles_through_three_states() {
    let mut state = SortState::default();
    state.activate("score");
    assert_eq!(state.direction_for("score"), Some(SortDirection::Ascending));
    state.activate("score");
    assert_eq!(state.direction_for("score"), Some(SortDirection::Descending));
    state.activate("score");
    assert_eq!(state.active(), None);
}

#[test]
fn activating_another_column_resets_the_previous_one() {
    let mut state = SortState::default();
    state.activate("score");
    state.activate("score");
    state.activate("title");
    assert_eq!(state.direction_for("score"), None);
    assert_eq!(state.direction_for("title"), Some(SortDirection::Ascending));
}

#[test]
fn numbers_compare_by_value() {
    let two = CellValue::Number {
        value: 2.0,
        display: "2".to_string(),
    };
    let ten = CellValue::Number {
        value: 10.0,
        display: "10".to_string(),
    };
    assert_eq!(compare_values(&two, &ten), Ordering::Less);
}

fn filter_rows() -> (ColumnSchema, Vec<Row>) {
    let editions = vec![
        Edition {
            id: Some(1),
            title: Some("Hardcover".to_string()),
            pages: Some(320),
            reading_format_id: Some(1),
            release_date: Some("2023-01-15".to_string()),
            ..Edition::default()
        },
        Edition {
            id: Some(2),
            title: None,
            audio_seconds: Some(25200),
            reading_format_id: Some(2),
            release_date: Some("2023-03-20".to_string()),
            ..Edition::default()
        },
    ];
    let schema = ColumnSchema::build(&editions);
    let rows = build_rows(&editions, &schema);
    (schema, rows)
}

fn visible_positions(set: &FilterSet, schema: &ColumnSchema, rows: &[Row]) -> Vec<usize> {
    let prepared = set.prepare(schema);
    rows.iter()
        .enumerate()
        .filter(|(_, row)| set.matches(row, &prepared))
        .map(|(idx, _)| idx)
        .collect()
}

#[test]
fn na_cells_fail_comparisons_but_answer_na_checks() {
    let (schema, rows) = filter_rows();
    let greater = FilterSet::new(
        vec![FilterRule::value("pages", FilterOperator::GreaterThan, "0")],
        FilterMode::And,
    );
    assert_eq!(visible_positions(&greater, &schema, &rows), vec![0]);

    let na = FilterSet::new(
        vec![FilterRule::new("pages", FilterOperator::IsNotApplicable, Operand::None)],
        FilterMode::And,
    );
    assert_eq!(visible_positions(&na, &schema, &rows), vec![1]);

    let empty_title = FilterSet::new(
        vec![FilterRule::new("title", FilterOperator::IsEmpty, Operand::None)],
        FilterMode::And,
    );
    assert_eq!(visible_positions(&empty_title, &schema, &rows), vec![1]);

    let not_contains = FilterSet::new(
        vec![FilterRule::value("title", FilterOperator::DoesNotContain, "zzz")],
        FilterMode::And,
    );
    assert_eq!(visible_positions(&not_contains, &schema, &rows), vec![0]);
}

#[test]
fn rules_without_operand_or_on_unknown_columns_are_ignored() {
    let (schema, rows) = filter_rows();
    let set = FilterSet::new(
        vec![
            FilterRule::value("pages", FilterOperator::GreaterThan, ""),
            FilterRule::value("Narrator 4", FilterOperator::Contains, "x"),
            FilterRule::value("score", FilterOperator::Contains, "x"),
            FilterRule::value("pages", FilterOperator::GreaterThan, "lots"),
        ],
        FilterMode::And,
    );
    assert!(set.prepare(&schema).is_empty());
    assert_eq!(visible_positions(&set, &schema, &rows), vec![0, 1]);
}

#[test]
fn date_between_is_inclusive_and_order_insensitive() {
    let (schema, rows) = filter_rows();
    let set = FilterSet::new(
        vec![FilterRule::new(
            "release_date",
            FilterOperator::IsBetween,
            Operand::Range {
                start: "2023-04-01".to_string(),
                end: "2023-03-20".to_string(),
            },
        )],
        FilterMode::And,
    );
    assert_eq!(visible_positions(&set, &schema, &rows), vec![1]);
}

#[test]
fn duration_accepts_clock_operand() {
    let (schema, rows) = filter_rows();
    let set = FilterSet::new(
        vec![FilterRule::value("Duration", FilterOperator::GreaterOrEqual, "07:00:00")],
        FilterMode::And,
    );
    assert_eq!(visible_positions(&set, &schema, &rows), vec![1]);
}

#[test]
fn reading_format_accepts_label_or_code() {
    let (schema, rows) = filter_rows();
    let by_label = FilterSet::new(
        vec![FilterRule::value("Reading Format", FilterOperator::Is, "audiobook")],
        FilterMode::And,
    );
    let by_code = FilterSet::new(
        vec![FilterRule::value("Reading Format", FilterOperator::IsNot, "2")],
        FilterMode::And,
    );
    assert_eq!(visible_positions(&by_label, &schema, &rows), vec![1]);
    assert_eq!(visible_positions(&by_code, &schema, &rows), vec![0]);
}

#[test]
fn operator_labels_round_trip_per_type() {
    for column_type in [
        ColumnType::Text,
        ColumnType::Numeric,
        ColumnType::Date,
        ColumnType::BooleanLike,
        ColumnType::Enumerated,
    ] {
        for operator in FilterOperator::for_type(column_type) {
            assert_eq!(
                FilterOperator::from_label(column_type, operator.label()),
                Some(*operator)
            );
        }
    }
}

#[test]
fn toggle_flips_membership() {
    let mut selection = SelectionSet::default();
    assert!(selection.toggle(RowKey::Edition(3)));
    assert!(selection.is_checked(RowKey::Edition(3)));
    assert!(!selection.toggle(RowKey::Edition(3)));
    assert!(selection.is_empty());
}

#[test]
fn moves_stop_at_the_edges() {
    let schema = ColumnSchema::build(&[]);
    let mut draft = ColumnLayout::default_for(&schema).draft(&schema);
    draft.move_up("Select");
    draft.move_down("country");
    assert_eq!(draft.commit(), ColumnLayout::default_for(&schema));
}

#[test]
fn reset_to_applied_discards_uncommitted_edits() {
    let schema = ColumnSchema::build(&[]);
    let mut applied = ColumnLayout::default_for(&schema).draft(&schema);
    applied.toggle("asin");
    let applied = applied.commit();

    let mut draft = applied.draft(&schema);
    draft.hide_all();
    assert!(draft.commit().visible_columns().is_empty());
    draft.reset_to_applied();
    assert_eq!(draft.commit(), applied);
    assert!(!applied.visible_columns().contains(&"asin".to_string()));
}

#[test]
fn known_platforms_build_links() {
    assert_eq!(
        platform_url("goodreads", "123").as_deref(),
        Some("https://www.goodreads.com/book/show/123")
    );
    assert_eq!(
        platform_url("openlibrary", "/works/OL1W").as_deref(),
        Some("https://openlibrary.org/works/OL1W")
    );
    assert_eq!(
        platform_url("openlibrary", "OL1M").as_deref(),
        Some("https://openlibrary.org/search?q=OL1M")
    );
    assert_eq!(platform_url("inventaire", "abc"), None);
}

#[test]
fn full_urls_pass_through() {
    assert_eq!(
        platform_url("inventaire", "https://inventaire.io/entity/isbn:1").as_deref(),
        Some("https://inventaire.io/entity/isbn:1")
    );
}

fn scored_edition(id: i64, score: Option<f64>, format: i64) -> Edition {
    Edition {
        id: Some(id),
        score,
        title: Some(format!("Edition {id}")),
        subtitle: Some(format!("Subtitle {id}")),
        reading_format_id: Some(format),
        ..Edition::default()
    }
}

fn scored_table() -> TableState {
    TableState::from_editions(&[
        scored_edition(1, Some(98.0), 1),
        scored_edition(2, Some(85.0), 2),
        scored_edition(3, Some(92.0), 1),
    ])
}

fn row_keys(rows: &[&Row]) -> Vec<RowKey> {
    rows.iter().map(|row| row.key).collect()
}

fn narrators(count: usize) -> Edition {
    Edition {
        contributors: (0..count)
            .map(|idx| Contributor {
                name: format!("Narrator {idx}"),
                role: Some("Narrator".to_string()),
            })
            .collect(),
        ..Edition::default()
    }
}

#[test]
fn schema_is_deterministic() {
    let editions = vec![narrators(2), narrators(1)];
    assert_eq!(
        ColumnSchema::build(&editions).names(),
        ColumnSchema::build(&editions).names()
    );
}

#[test]
fn narrator_columns_follow_the_largest_count() {
    let state = TableState::from_editions(&[narrators(3), narrators(1), narrators(0)]);
    let names = state.schema().names();
    let narrator_columns: Vec<&String> =
        names.iter().filter(|name| name.starts_with("Narrator")).collect();
    assert_eq!(narrator_columns, vec!["Narrator 1", "Narrator 2", "Narrator 3"]);

    let second = &state.rows()[1];
    assert_eq!(
        second.cell("Narrator 2"),
        Some(&CellValue::NotApplicable { highlight: false })
    );
    assert!(second.cell("Narrator 3").is_some_and(CellValue::is_not_applicable));
}

#[test]
fn roles_without_contributors_get_no_columns() {
    let state = TableState::from_editions(&[narrators(1)]);
    assert!(!state
        .schema()
        .names()
        .iter()
        .any(|name| name.starts_with("Illustrator")));
}

#[test]
fn three_header_clicks_restore_default_order() {
    let mut state = scored_table();
    let default_order = row_keys(&state.visible_rows());
    assert_eq!(
        default_order,
        vec![RowKey::Edition(1), RowKey::Edition(3), RowKey::Edition(2)]
    );

    state.activate_header("title");
    state.activate_header("title");
    state.activate_header("title");
    assert_eq!(row_keys(&state.visible_rows()), default_order);

    state.activate_header("score");
    state.activate_header("id");
    assert_eq!(state.sort().direction_for("score"), None);
}

#[test]
fn missing_scores_sit_at_one_end() {
    let mut state = TableState::from_editions(&[
        scored_edition(1, Some(10.0), 1),
        scored_edition(2, Some(2.0), 1),
        scored_edition(3, None, 1),
    ]);
    state.activate_header("score");
    assert_eq!(
        row_keys(&state.visible_rows()),
        vec![RowKey::Edition(3), RowKey::Edition(2), RowKey::Edition(1)]
    );
    state.activate_header("score");
    assert_eq!(
        row_keys(&state.visible_rows()),
        vec![RowKey::Edition(1), RowKey::Edition(2), RowKey::Edition(3)]
    );
}

#[test]
fn and_or_modes_combine_rules() {
    let mut state = scored_table();
    state.apply_filters(FilterSet::new(
        vec![
            FilterRule::value("score", FilterOperator::GreaterThan, "90"),
            FilterRule::value("Reading Format", FilterOperator::Is, "Physical Book"),
        ],
        FilterMode::And,
    ));
    assert_eq!(row_keys(&state.visible_rows()), vec![RowKey::Edition(1), RowKey::Edition(3)]);

    state.apply_filters(FilterSet::new(
        vec![
            FilterRule::value("score", FilterOperator::GreaterThan, "95"),
            FilterRule::value("Reading Format", FilterOperator::Is, "Physical Book"),
        ],
        FilterMode::And,
    ));
    assert_eq!(row_keys(&state.visible_rows()), vec![RowKey::Edition(1)]);

    state.apply_filters(FilterSet::new(
        vec![
            FilterRule::value("score", FilterOperator::GreaterThan, "95"),
            FilterRule::value("Reading Format", FilterOperator::Is, "Audiobook"),
        ],
        FilterMode::Or,
    ));
    assert_eq!(row_keys(&state.visible_rows()), vec![RowKey::Edition(1), RowKey::Edition(2)]);
}

#[test]
fn unusable_rules_leave_every_row_visible() {
    let mut state = scored_table();
    let active = state.apply_filters(FilterSet::new(
        vec![
            FilterRule::value("score", FilterOperator::GreaterThan, "lots"),
            FilterRule::value("nonexistent", FilterOperator::Contains, "x"),
        ],
        FilterMode::And,
    ));
    assert_eq!(active, 0);
    assert_eq!(state.visible_rows().len(), 3);
}

#[test]
fn selection_survives_resort() {
    let mut state = scored_table();
    state.toggle_row(RowKey::Edition(2));
    state.activate_header("score");
    state.activate_header("title");
    assert!(state.is_checked(RowKey::Edition(2)));
    assert!(!state.is_checked(RowKey::Edition(1)));
    assert!(!state.is_checked(RowKey::Edition(3)));
}

#[test]
fn selection_survives_filter() {
    let mut state = scored_table();
    state.toggle_row(RowKey::Edition(2));
    state.apply_filters(FilterSet::new(
        vec![FilterRule::value("score", FilterOperator::GreaterThan, "90")],
        FilterMode::And,
    ));
    assert!(!row_keys(&state.visible_rows()).contains(&RowKey::Edition(2)));
    state.clear_filters();
    assert!(state.is_checked(RowKey::Edition(2)));
}

#[test]
fn layout_round_trip_restores_every_column() {
    let mut state = scored_table();
    let original = state.schema().names();

    let mut draft = state.layout().draft(state.schema());
    draft.toggle("subtitle");
    let steps = original.iter().position(|name| name == "score").unwrap_or(0);
    for _ in 0..steps {
        draft.move_up("score");
    }
    state.apply_layout(draft.commit());

    let visible: Vec<&str> = state
        .visible_columns()
        .iter()
        .map(|column| column.name.as_str())
        .collect();
    assert_eq!(visible[0], "score");
    assert!(!visible.contains(&"subtitle"));

    let mut draft = state.layout().draft(state.schema());
    draft.reset_to_default();
    state.apply_layout(draft.commit());

    let restored: Vec<String> = state
        .visible_columns()
        .iter()
        .map(|column| column.name.clone())
        .collect();
    assert_eq!(restored, original);
    assert_eq!(state.rows()[0].display_text("subtitle"), "Subtitle 1");
}

#[test]
fn filters_on_hidden_columns_stay_active() {
    let mut state = scored_table();
    state.apply_filters(FilterSet::new(
        vec![FilterRule::value("score", FilterOperator::LessThan, "90")],
        FilterMode::And,
    ));
    let mut draft = state.layout().draft(state.schema());
    draft.toggle("score");
    state.apply_layout(draft.commit());
    assert_eq!(row_keys(&state.visible_rows()), vec![RowKey::Edition(2)]);
}

#[test]
fn header_toggle_checks_all_then_clears() {
    let mut state = scored_table();
    state.apply_filters(FilterSet::new(
        vec![FilterRule::value("score", FilterOperator::GreaterThan, "90")],
        FilterMode::And,
    ));

    state.activate_header(SELECT_COLUMN);
    assert_eq!(state.selection().len(), 3);

    state.activate_header(SELECT_COLUMN);
    assert!(state.selection().is_empty());

    state.toggle_row(RowKey::Edition(3));
    state.activate_header(SELECT_COLUMN);
    assert!(state.selection().is_empty());
}

#[test]
fn mapping_cards_follow_checked_rows() {
    let mut with_mapping = scored_edition(5, Some(50.0), 4);
    with_mapping.mappings = vec![BookMapping {
        platform: "goodreads".to_string(),
        external_id: "42".to_string(),
    }];
    let mut state = TableState::from_editions(&[with_mapping, scored_edition(6, None, 1)]);

    assert!(state.selected_mapping_cards().is_empty());
    state.toggle_row(RowKey::Edition(5));
    let cards = state.selected_mapping_cards();
    assert_eq!(cards.len(), 1);
    assert_eq!(cards[0].format, "E-Book");
    assert_eq!(cards[0].isbn_13, "N/A");
    assert_eq!(
        cards[0].links[0].url.as_deref(),
        Some("https://www.goodreads.com/book/show/42")
    );

}

#[test]
fn oversized_duration_operand_makes_the_rule_inactive() {
    assert_eq!(parse_duration("9999999999999999999:00:00"), None);
    assert_eq!(parse_duration("18446744073709551615:59"), None);
    assert_eq!(parse_duration("1:00:18446744073709551615"), None);

    let (schema, rows) = filter_rows();
    let set = FilterSet::new(
        vec![FilterRule::value(
            "Duration",
            FilterOperator::GreaterThan,
            "9999999999999999999:00:00",
        )],
        FilterMode::And,
    );
    assert!(set.prepare(&schema).is_empty());
    assert_eq!(visible_positions(&set, &schema, &rows), vec![0, 1]);
}

#[test]
fn header_activation_on_absent_column_changes_nothing() {
    let mut state = scored_table();
    state.activate_header("title");
    let sort_before = state.sort().clone();
    let order_before = row_keys(&state.visible_rows());

    state.activate_header("Narrator 9");
    state.activate_header("");

    assert_eq!(state.sort(), &sort_before);
    assert_eq!(row_keys(&state.visible_rows()), order_before);
    assert!(state.selection().is_empty());
}

#[test]
fn hardcover_links_need_a_slug() {
    assert_eq!(
        book_page_url(Some("the-hobbit")).as_deref(),
        Some("https://hardcover.app/books/the-hobbit")
    );
    assert_eq!(book_page_url(Some("  ")), None);
    assert_eq!(book_page_url(None), None);
    assert_eq!(
        edition_edit_url(Some("the-hobbit"), Some(11)).as_deref(),
        Some("https://hardcover.app/books/the-hobbit/editions/11/edit")
    );
    assert_eq!(edition_edit_url(Some("the-hobbit"), None), None);
    assert_eq!(edition_edit_url(None, Some(11)), None);
}

#[test]
fn mapping_cards_link_to_the_edition_editor_and_cover() {
    let book = parse_book_response(328491, 200, &sample_response()).expect("should decode");
    let mut state = TableState::from_book(&book);
    state.toggle_select_all();

    let cards = state.selected_mapping_cards();
    assert_eq!(cards.len(), 2);
    assert_eq!(
        cards[0].edit_url.as_deref(),
        Some("https://hardcover.app/books/the-hobbit/editions/11/edit")
    );
    assert_eq!(cards[0].cover_url.as_deref(), Some("https://example.com/cover.jpg"));
    assert_eq!(cards[1].cover_url, None);

    let mut without_slug = TableState::from_editions(&book.editions);
    without_slug.toggle_select_all();
    assert!(without_slug
        .selected_mapping_cards()
        .iter()
        .all(|card| card.edit_url.is_none()));
}

#[test]
fn edition_fields_decode_leniently() {
    let edition = Edition::from_json(&json!({
        "id": "42",
        "score": "7.5",
        "title": "   ",
        "pages": 320.0,
        "image": "not an object",
        "cached_contributors": null,
        "book_mappings": [
            { "external_id": 99, "platform": "openlibrary" },
            ["positional", "entry"]
        ],
        "language": { "name": "French" },
        "publisher": []
    }))
    .expect("object should decode");

    assert_eq!(edition.id, Some(42));
    assert_eq!(edition.score, Some(7.5));
    assert_eq!(edition.title, None);
    assert_eq!(edition.pages, Some(320));
    assert!(!edition.has_cover());
    assert!(edition.contributors.is_empty());
    assert_eq!(
        edition.mappings,
        vec![BookMapping {
            platform: "openlibrary".to_string(),
            external_id: "99".to_string(),
        }]
    );
    assert_eq!(edition.language.as_deref(), Some("French"));
    assert_eq!(edition.publisher, None);
    assert_eq!(Edition::from_json(&json!(["id", 1])), None);
}
