//! Book record model and input validation.
//!
//! [`Book`] is the persisted record; [`BookDraft`] is the client-submitted
//! payload for `POST /book`. Drafts carry no authoritative id (any submitted
//! id is ignored) and must pass [`BookDraft::validate`] before the catalog
//! touches the store.

use chrono::Datelike;
use serde::Deserialize;
use serde::Serialize;

use crate::constants::MIN_PUBLICATION_YEAR;
use crate::ValidationError;

/// A persisted book record. Ids are assigned by the catalog and unique
/// across the collection.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Book {
    pub id: u64,
    pub title: String,
    pub author: String,
    pub publication_year: i32,
    pub genre: String,
    pub isbn: String,
}

/// Client-submitted book payload. `id` is accepted for wire compatibility
/// but never trusted: creates assign a fresh id, updates keep the target's.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BookDraft {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<u64>,
    pub title: String,
    pub author: String,
    pub publication_year: i32,
    pub genre: String,
    pub isbn: String,
}

/// The year used as the upper bound for publication_year, evaluated at
/// request time.
pub fn current_year() -> i32 {
    chrono::Local::now().year()
}

impl BookDraft {
    /// Validates field presence and the publication year range.
    ///
    /// # Errors
    /// - [`ValidationError::FieldRequired`] when a required text field is
    ///   empty or whitespace-only
    /// - [`ValidationError::YearOutOfRange`] when `publication_year` falls
    ///   outside `[1450, current_year]`
    pub fn validate(&self, current_year: i32) -> std::result::Result<(), ValidationError> {
        let required: [(&'static str, &str); 4] = [
            ("title", &self.title),
            ("author", &self.author),
            ("genre", &self.genre),
            ("isbn", &self.isbn),
        ];
        for (field, value) in required {
            if value.trim().is_empty() {
                return Err(ValidationError::FieldRequired { field });
            }
        }

        if self.publication_year < MIN_PUBLICATION_YEAR || self.publication_year > current_year {
            return Err(ValidationError::YearOutOfRange {
                year: self.publication_year,
            });
        }

        Ok(())
    }

    /// Upsert match predicate: same ISBN, or same (title, author,
    /// publication_year) composite identity. The first record satisfying
    /// either clause, in collection order, is the update target.
    pub fn matches(&self, book: &Book) -> bool {
        book.isbn == self.isbn
            || (book.title == self.title
                && book.author == self.author
                && book.publication_year == self.publication_year)
    }

    /// Overwrites every field of `book` except its id.
    pub fn apply_to(&self, book: &mut Book) {
        book.title = self.title.clone();
        book.author = self.author.clone();
        book.publication_year = self.publication_year;
        book.genre = self.genre.clone();
        book.isbn = self.isbn.clone();
    }

    /// Consumes the draft into a new record under the assigned id.
    pub fn into_book(self, id: u64) -> Book {
        Book {
            id,
            title: self.title,
            author: self.author,
            publication_year: self.publication_year,
            genre: self.genre,
            isbn: self.isbn,
        }
    }
}
