use crate::domain::entities::book::{
    READING_FORMAT_AUDIOBOOK, READING_FORMAT_EBOOK, READING_FORMAT_PHYSICAL,
};
use crate::domain::table::schema::{ColumnKind, FixedField};

/// Whether an N/A cell marks data that should exist but is missing.
///
/// The field table is product policy, not a derived rule: a structurally
/// inapplicable value (pages on an audiobook, the third narrator slot on an
/// edition with one narrator) is never highlighted.
pub fn is_na_highlightable(kind: &ColumnKind, reading_format_id: Option<i64>) -> bool {
    let field = match kind {
        ColumnKind::Contributor { .. } => return false,
        ColumnKind::Fixed(field) => *field,
    };

    match field {
        FixedField::Title
        | FixedField::Isbn10
        | FixedField::Isbn13
        | FixedField::Asin
        | FixedField::Publisher
        | FixedField::Language
        | FixedField::Country
        | FixedField::ReleaseDate
        | FixedField::EditionFormat => true,
        FixedField::Subtitle | FixedField::EditionInformation => false,
        FixedField::Pages => matches!(
            reading_format_id,
            Some(READING_FORMAT_PHYSICAL) | Some(READING_FORMAT_EBOOK)
        ),
        FixedField::Duration => reading_format_id == Some(READING_FORMAT_AUDIOBOOK),
        _ => false,
    }
}
