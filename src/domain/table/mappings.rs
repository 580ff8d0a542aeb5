use crate::domain::entities::book::Edition;
use crate::domain::table::row::{reading_format_label, Row, RowKey, NOT_APPLICABLE};

const OPEN_LIBRARY_BASE: &str = "https://openlibrary.org";
const HARDCOVER_BASE: &str = "https://hardcover.app";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MappingLink {
    pub platform: String,
    pub external_id: String,
    pub url: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MappingCard {
    pub key: RowKey,
    pub edition_id: String,
    pub isbn_10: String,
    pub isbn_13: String,
    pub asin: String,
    pub format: String,
    pub cover_url: Option<String>,
    pub edit_url: Option<String>,
    pub links: Vec<MappingLink>,
}

impl MappingCard {
    pub fn from_row(row: &Row, book_slug: Option<&str>) -> Self {
        let edition: &Edition = &row.edition;
        let or_na = |value: &Option<String>| {
            value
                .clone()
                .unwrap_or_else(|| NOT_APPLICABLE.to_string())
        };

        Self {
            key: row.key,
            edition_id: edition
                .id
                .map(|id| id.to_string())
                .unwrap_or_else(|| NOT_APPLICABLE.to_string()),
            isbn_10: or_na(&edition.isbn_10),
            isbn_13: or_na(&edition.isbn_13),
            asin: or_na(&edition.asin),
            format: edition
                .reading_format_id
                .map(reading_format_label)
                .unwrap_or_else(|| NOT_APPLICABLE.to_string()),
            cover_url: edition
                .image_url
                .as_deref()
                .map(str::trim)
                .filter(|url| !url.is_empty())
                .map(str::to_string),
            edit_url: edition_edit_url(book_slug, edition.id),
            links: edition
                .mappings
                .iter()
                .map(|mapping| MappingLink {
                    platform: mapping.platform.clone(),
                    external_id: mapping.external_id.clone(),
                    url: platform_url(&mapping.platform, &mapping.external_id),
                })
                .collect(),
        }
    }
}

pub fn book_page_url(slug: Option<&str>) -> Option<String> {
    let slug = slug.map(str::trim).filter(|slug| !slug.is_empty())?;
    Some(format!("{HARDCOVER_BASE}/books/{slug}"))
}

pub fn edition_edit_url(slug: Option<&str>, edition_id: Option<i64>) -> Option<String> {
    let page = book_page_url(slug)?;
    Some(format!("{page}/editions/{}/edit", edition_id?))
}

pub fn platform_url(platform: &str, external_id: &str) -> Option<String> {
    let id = external_id.trim();
    if id.is_empty() {
        return None;
    }
    if looks_like_url(id) {
        return Some(id.to_string());
    }

    match platform.trim().to_lowercase().as_str() {
        "goodreads" => Some(format!("https://www.goodreads.com/book/show/{id}")),
        "google" | "google books" => Some(format!("https://books.google.com/books?id={id}")),
        "openlibrary" | "open library" => {
            if id.starts_with("/books/") || id.starts_with("/works/") {
                Some(format!("{OPEN_LIBRARY_BASE}{id}"))
            } else {
                Some(format!("{OPEN_LIBRARY_BASE}/search?q={id}"))
            }
        }
        "amazon" => Some(format!("https://www.amazon.com/dp/{id}")),
        "librarything" => Some(format!("https://www.librarything.com/work/{id}")),
        _ => None,
    }
}

fn looks_like_url(text: &str) -> bool {
    let rest = text
        .strip_prefix("https://")
        .or_else(|| text.strip_prefix("http://"));
    match rest {
        Some(rest) => {
            let host = rest.split('/').next().unwrap_or("");
            host.contains('.') && !host.starts_with('.') && !host.ends_with('.')
        }
        None => false,
    }
}
