use serde::de::{DeserializeOwned, Deserializer};
use serde::Deserialize;
use serde_json::Value;
use tracing::debug;

pub const READING_FORMAT_PHYSICAL: i64 = 1;
pub const READING_FORMAT_AUDIOBOOK: i64 = 2;
pub const READING_FORMAT_EBOOK: i64 = 4;

pub const PRIMARY_ROLE: &str = "Author";

#[derive(Debug, Clone, PartialEq)]
pub struct Book {
    pub id: Option<i64>,
    pub slug: Option<String>,
    pub title: Option<String>,
    pub subtitle: Option<String>,
    pub description: Option<String>,
    pub editions_count: Option<i64>,
    pub primary_author: Option<String>,
    pub editions: Vec<Edition>,
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct Edition {
    pub id: Option<i64>,
    pub score: Option<f64>,
    pub title: Option<String>,
    pub subtitle: Option<String>,
    pub image_url: Option<String>,
    pub isbn_10: Option<String>,
    pub isbn_13: Option<String>,
    pub asin: Option<String>,
    pub reading_format_id: Option<i64>,
    pub pages: Option<i64>,
    pub audio_seconds: Option<i64>,
    pub edition_format: Option<String>,
    pub edition_information: Option<String>,
    pub release_date: Option<String>,
    pub contributors: Vec<Contributor>,
    pub mappings: Vec<BookMapping>,
    pub publisher: Option<String>,
    pub language: Option<String>,
    pub country: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Contributor {
    pub name: String,
    pub role: Option<String>,
}

impl Contributor {
    pub fn role_label(&self) -> &str {
        self.role
            .as_deref()
            .map(str::trim)
            .filter(|role| !role.is_empty())
            .unwrap_or(PRIMARY_ROLE)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BookMapping {
    pub platform: String,
    pub external_id: String,
}

impl Edition {
    pub fn has_cover(&self) -> bool {
        self.image_url
            .as_deref()
            .is_some_and(|url| !url.trim().is_empty())
    }

    pub fn contributors_with_role<'a>(
        &'a self,
        role: &'a str,
    ) -> impl Iterator<Item = &'a Contributor> + 'a {
        self.contributors
            .iter()
            .filter(move |contributor| contributor.role_label() == role)
    }

    pub fn from_json(value: &Value) -> Option<Edition> {
        object_record::<EditionRecord>(value).map(Edition::from)
    }
}

impl Book {
    pub fn from_json(value: &Value) -> Option<Book> {
        let record = object_record::<BookRecord>(value)?;

        let editions = record
            .editions
            .iter()
            .enumerate()
            .filter_map(|(idx, item)| {
                let edition = Edition::from_json(item);
                if edition.is_none() {
                    debug!(index = idx, "skipping edition entry that is not an object");
                }
                edition
            })
            .collect();

        let primary_author = record
            .contributions
            .iter()
            .find_map(|item| object_record::<ContributionRecord>(item)?.author?.name);

        Some(Book {
            id: record.id,
            slug: record.slug,
            title: record.title,
            subtitle: record.subtitle,
            description: record.description,
            editions_count: record.editions_count,
            primary_author,
            editions,
        })
    }

    pub fn display_title(&self) -> String {
        self.title
            .clone()
            .filter(|title| !title.trim().is_empty())
            .unwrap_or_else(|| "(untitled)".to_string())
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct BookRecord {
    #[serde(deserialize_with = "lenient_i64")]
    id: Option<i64>,
    #[serde(deserialize_with = "lenient_text")]
    slug: Option<String>,
    #[serde(deserialize_with = "lenient_text")]
    title: Option<String>,
    #[serde(deserialize_with = "lenient_text")]
    subtitle: Option<String>,
    #[serde(deserialize_with = "lenient_text")]
    description: Option<String>,
    #[serde(deserialize_with = "lenient_i64")]
    editions_count: Option<i64>,
    #[serde(deserialize_with = "lenient_list")]
    contributions: Vec<Value>,
    #[serde(deserialize_with = "lenient_list")]
    editions: Vec<Value>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct EditionRecord {
    #[serde(deserialize_with = "lenient_i64")]
    id: Option<i64>,
    #[serde(deserialize_with = "lenient_f64")]
    score: Option<f64>,
    #[serde(deserialize_with = "lenient_text")]
    title: Option<String>,
    #[serde(deserialize_with = "lenient_text")]
    subtitle: Option<String>,
    #[serde(deserialize_with = "lenient_record")]
    image: Option<NamedRecord>,
    #[serde(deserialize_with = "lenient_text")]
    isbn_10: Option<String>,
    #[serde(deserialize_with = "lenient_text")]
    isbn_13: Option<String>,
    #[serde(deserialize_with = "lenient_text")]
    asin: Option<String>,
    #[serde(deserialize_with = "lenient_i64")]
    reading_format_id: Option<i64>,
    #[serde(deserialize_with = "lenient_i64")]
    pages: Option<i64>,
    #[serde(deserialize_with = "lenient_i64")]
    audio_seconds: Option<i64>,
    #[serde(deserialize_with = "lenient_text")]
    edition_format: Option<String>,
    #[serde(deserialize_with = "lenient_text")]
    edition_information: Option<String>,
    #[serde(deserialize_with = "lenient_text")]
    release_date: Option<String>,
    #[serde(deserialize_with = "lenient_list")]
    cached_contributors: Vec<Value>,
    #[serde(deserialize_with = "lenient_list")]
    book_mappings: Vec<Value>,
    #[serde(deserialize_with = "lenient_record")]
    publisher: Option<NamedRecord>,
    #[serde(deserialize_with = "lenient_record")]
    language: Option<NamedRecord>,
    #[serde(deserialize_with = "lenient_record")]
    country: Option<NamedRecord>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct NamedRecord {
    #[serde(deserialize_with = "lenient_text")]
    name: Option<String>,
    #[serde(deserialize_with = "lenient_text")]
    url: Option<String>,
    #[serde(deserialize_with = "lenient_text")]
    language: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct ContributionRecord {
    #[serde(deserialize_with = "lenient_record")]
    author: Option<NamedRecord>,
    #[serde(deserialize_with = "lenient_text")]
    contribution: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct MappingRecord {
    #[serde(deserialize_with = "lenient_id")]
    external_id: Option<String>,
    platform: Value,
}

impl From<EditionRecord> for Edition {
    fn from(record: EditionRecord) -> Self {
        let named = |record: Option<NamedRecord>| record.and_then(|record| record.name);
        Edition {
            id: record.id,
            score: record.score,
            title: record.title,
            subtitle: record.subtitle,
            image_url: record.image.and_then(|image| image.url),
            isbn_10: record.isbn_10,
            isbn_13: record.isbn_13,
            asin: record.asin,
            reading_format_id: record.reading_format_id,
            pages: record.pages,
            audio_seconds: record.audio_seconds,
            edition_format: record.edition_format,
            edition_information: record.edition_information,
            release_date: record.release_date,
            contributors: decode_contributors(&record.cached_contributors),
            mappings: decode_mappings(&record.book_mappings),
            publisher: named(record.publisher),
            language: record
                .language
                .and_then(|language| language.language.or(language.name)),
            country: named(record.country),
        }
    }
}

fn decode_contributors(items: &[Value]) -> Vec<Contributor> {
    items
        .iter()
        .enumerate()
        .filter_map(|(idx, item)| {
            let record = object_record::<ContributionRecord>(item);
            let name = record
                .as_ref()
                .and_then(|record| record.author.as_ref())
                .and_then(|author| author.name.clone());
            let Some(name) = name else {
                debug!(index = idx, "skipping malformed contributor entry");
                return None;
            };
            Some(Contributor {
                name,
                role: record.and_then(|record| record.contribution),
            })
        })
        .collect()
}

fn decode_mappings(items: &[Value]) -> Vec<BookMapping> {
    items
        .iter()
        .enumerate()
        .filter_map(|(idx, item)| {
            let record = object_record::<MappingRecord>(item)?;
            let platform = json_text(&record.platform).or_else(|| {
                object_record::<NamedRecord>(&record.platform).and_then(|platform| platform.name)
            });
            match (platform, record.external_id) {
                (Some(platform), Some(external_id)) => Some(BookMapping {
                    platform,
                    external_id,
                }),
                _ => {
                    debug!(index = idx, "skipping malformed book mapping entry");
                    None
                }
            }
        })
        .collect()
}

fn lenient_text<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(json_text(&Value::deserialize(deserializer)?))
}

fn lenient_i64<'de, D>(deserializer: D) -> Result<Option<i64>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(json_i64(&Value::deserialize(deserializer)?))
}

fn lenient_f64<'de, D>(deserializer: D) -> Result<Option<f64>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    Ok(match value {
        Value::Number(number) => number.as_f64(),
        Value::String(text) => text.trim().parse::<f64>().ok(),
        _ => None,
    })
}

fn lenient_id<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    Ok(json_text(&value).or_else(|| json_i64(&value).map(|id| id.to_string())))
}

fn lenient_list<'de, D>(deserializer: D) -> Result<Vec<Value>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Value::deserialize(deserializer)? {
        Value::Array(items) => items,
        _ => Vec::new(),
    })
}

fn lenient_record<'de, D, T>(deserializer: D) -> Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned,
{
    Ok(object_record(&Value::deserialize(deserializer)?))
}

// Arrays would otherwise deserialize into records positionally.
fn object_record<T: DeserializeOwned>(value: &Value) -> Option<T> {
    if !value.is_object() {
        return None;
    }
    serde_json::from_value(value.clone()).ok()
}

fn json_text(value: &Value) -> Option<String> {
    match value {
        Value::String(text) if !text.trim().is_empty() => Some(text.clone()),
        _ => None,
    }
}

fn json_i64(value: &Value) -> Option<i64> {
    match value {
        Value::Number(number) => number
            .as_i64()
            .or_else(|| number.as_f64().filter(|n| n.fract() == 0.0).map(|n| n as i64)),
        Value::String(text) => text.trim().parse::<i64>().ok(),
        _ => None,
    }
}
