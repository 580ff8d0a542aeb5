use std::time::Duration;

use serde_json::{json, Value};
use tracing::{debug, warn};

use crate::domain::entities::book::Book;
use crate::usecase::ports::api::{ApiError, BookSource};

pub const DEFAULT_API_URL: &str = "https://api.hardcover.app/v1/graphql";
pub const REQUEST_TIMEOUT_SECS: u64 = 30;
const OPERATION_NAME: &str = "BookEditions";

const BOOK_QUERY: &str = r#"query BookEditions($bookId: Int!) {
  books(where: {id: {_eq: $bookId}}) {
    id
    slug
    title
    subtitle
    description
    editions_count
    contributions { author { name } }
    editions {
      id
      score
      title
      subtitle
      image { url }
      isbn_10
      isbn_13
      asin
      cached_contributors
      reading_format_id
      pages
      audio_seconds
      edition_format
      edition_information
      release_date
      book_mappings { external_id platform { name } }
      publisher { name }
      language { language }
      country { name }
    }
  }
}"#;

pub struct GraphqlClient {
    pub api_url: String,
    pub timeout: Duration,
}

impl GraphqlClient {
    pub fn new(api_url: impl Into<String>) -> Self {
        Self {
            api_url: api_url.into(),
            timeout: Duration::from_secs(REQUEST_TIMEOUT_SECS),
        }
    }
}

impl BookSource for GraphqlClient {
    fn fetch_book(&self, book_id: i64, token: &str) -> Result<Book, ApiError> {
        if token.trim().is_empty() {
            return Err(ApiError::MissingToken);
        }

        let body = json!({
            "query": BOOK_QUERY,
            "variables": { "bookId": book_id },
            "operationName": OPERATION_NAME,
        })
        .to_string();

        let agent = ureq::AgentBuilder::new().timeout(self.timeout).build();
        let response = agent
            .post(&self.api_url)
            .set("Content-Type", "application/json")
            .set("authorization", &authorization_header(token))
            .send_string(&body);

        match response {
            Ok(response) => {
                let status = response.status();
                let text = response
                    .into_string()
                    .map_err(|err| ApiError::Network(format!("failed to read response: {err}")))?;
                parse_book_response(book_id, status, &text)
            }
            Err(ureq::Error::Status(code, response)) => {
                let text = response.into_string().unwrap_or_default();
                parse_book_response(book_id, code, &text)
            }
            Err(ureq::Error::Transport(transport)) => {
                warn!(book_id, error = %transport, "transport error");
                Err(ApiError::Network(transport.to_string()))
            }
        }
    }
}

pub fn authorization_header(token: &str) -> String {
    let token = token.trim();
    let has_scheme = token
        .get(..7)
        .is_some_and(|prefix| prefix.eq_ignore_ascii_case("bearer "));
    if has_scheme {
        token.to_string()
    } else {
        format!("Bearer {token}")
    }
}

pub fn parse_book_response(book_id: i64, status: u16, body: &str) -> Result<Book, ApiError> {
    match status {
        401 | 403 => return Err(ApiError::Auth(status)),
        404 => return Err(ApiError::NotFound(book_id)),
        200..=299 => {}
        other => {
            let preview: String = body.chars().take(200).collect();
            return Err(ApiError::Network(format!("HTTP {other}: {preview}")));
        }
    }

    let payload: Value = serde_json::from_str(body)
        .map_err(|err| ApiError::Processing(format!("invalid JSON: {err}")))?;

    if let Some(errors) = payload.get("errors").and_then(Value::as_array) {
        if !errors.is_empty() {
            let message = errors
                .first()
                .and_then(|error| error.get("message"))
                .and_then(Value::as_str)
                .unwrap_or("unknown GraphQL error")
                .to_string();
            return Err(ApiError::Processing(message));
        }
    }

    let books = payload
        .get("data")
        .and_then(|data| data.get("books"))
        .and_then(Value::as_array)
        .ok_or_else(|| ApiError::Processing("response has no books list".to_string()))?;

    let first = books.first().ok_or(ApiError::NotFound(book_id))?;
    let book = Book::from_json(first)
        .ok_or_else(|| ApiError::Processing("book entry is not an object".to_string()))?;
    debug!(book_id, editions = book.editions.len(), "decoded book response");
    Ok(book)
}
