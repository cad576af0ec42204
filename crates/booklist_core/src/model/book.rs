//! Book record and input models.
//!
//! # Responsibility
//! - Define the canonical `Book` row shape returned by reads.
//! - Define `BookDraft` (create input) and `BookPatch` (partial update input).
//! - Parse raw CLI strings into typed values before persistence.
//!
//! # Invariants
//! - `title` is never empty on a `Book` or a parsed `NewBook`.
//! - `stars == 0` means unrated.
//! - `date_read` carries no time-of-day.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Storage-assigned book identifier.
///
/// `0` is never assigned by SQLite and is treated as "no target" by the
/// service layer.
pub type BookId = i64;

/// Accepted `date_read` input format.
pub const DATE_READ_FORMAT: &str = "%Y-%m-%d";

/// Validation failure for caller-supplied book fields.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BookValidationError {
    /// Title is empty or whitespace only.
    EmptyTitle,
    /// `date_read` is not a `YYYY-MM-DD` calendar date.
    InvalidDate { value: String },
}

impl Display for BookValidationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::EmptyTitle => write!(f, "a title is needed to add a record"),
            Self::InvalidDate { value } => {
                write!(f, "bad date string `{value}`; expected YYYY-MM-DD (eg 2014-02-14)")
            }
        }
    }
}

impl Error for BookValidationError {}

/// One tracked book as stored in the `books` table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Book {
    pub id: BookId,
    pub title: String,
    /// Empty when unknown.
    pub author: String,
    /// Free-form co-author list, stored as a single text column.
    #[serde(rename = "addn_authors")]
    pub additional_authors: String,
    /// Free-form reading status such as `reading` or `finished`.
    pub state: String,
    pub stars: u32,
    pub date_read: Option<NaiveDate>,
    /// Unix epoch milliseconds.
    pub created_at: i64,
    /// Unix epoch milliseconds; strictly increases on every field update.
    pub updated_at: i64,
}

/// Raw create input as supplied by the dispatcher.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BookDraft {
    pub title: String,
    pub author: String,
    pub additional_authors: String,
    pub state: String,
    /// Raw `YYYY-MM-DD` string; empty when not supplied.
    pub date_read: String,
    pub stars: u32,
}

/// Validated create input with absent fields mapped to `None`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewBook {
    pub title: String,
    pub author: Option<String>,
    pub additional_authors: Option<String>,
    pub state: Option<String>,
    pub stars: Option<u32>,
    pub date_read: Option<NaiveDate>,
}

impl BookDraft {
    /// Creates a draft carrying only the required title.
    pub fn titled(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            ..Self::default()
        }
    }

    /// Validates the draft and converts it into typed insert values.
    ///
    /// # Errors
    /// - `EmptyTitle` when the title is blank.
    /// - `InvalidDate` when `date_read` is supplied but malformed.
    pub fn parse(&self) -> Result<NewBook, BookValidationError> {
        if self.title.trim().is_empty() {
            return Err(BookValidationError::EmptyTitle);
        }

        Ok(NewBook {
            title: self.title.clone(),
            author: non_empty(&self.author),
            additional_authors: non_empty(&self.additional_authors),
            state: non_empty(&self.state),
            stars: (self.stars > 0).then_some(self.stars),
            date_read: parse_date_read(&self.date_read)?,
        })
    }
}

/// Partial update input. A field is supplied when its text is non-empty or,
/// for `stars`, when it is greater than zero.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BookPatch {
    pub title: String,
    pub author: String,
    pub additional_authors: String,
    pub state: String,
    pub date_read: String,
    pub stars: u32,
}

impl BookPatch {
    /// Returns whether no field is supplied.
    pub fn is_empty(&self) -> bool {
        self.title.is_empty()
            && self.author.is_empty()
            && self.additional_authors.is_empty()
            && self.state.is_empty()
            && self.date_read.is_empty()
            && self.stars == 0
    }
}

/// Updatable book columns, in the order a patch applies them.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BookField {
    Title,
    Author,
    AdditionalAuthors,
    State,
    DateRead,
    Stars,
}

impl BookField {
    pub fn column(self) -> &'static str {
        match self {
            Self::Title => "title",
            Self::Author => "author",
            Self::AdditionalAuthors => "addn_authors",
            Self::State => "state",
            Self::DateRead => "date_read",
            Self::Stars => "stars",
        }
    }
}

/// Text columns that support `LIKE` pattern search.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SearchField {
    Title,
    Author,
    AdditionalAuthors,
    State,
}

impl SearchField {
    pub fn column(self) -> &'static str {
        match self {
            Self::Title => "title",
            Self::Author => "author",
            Self::AdditionalAuthors => "addn_authors",
            Self::State => "state",
        }
    }
}

/// Per-field search patterns. Each non-empty pattern runs as its own query.
///
/// Patterns go to SQL `LIKE` unchanged; callers add `%`/`_` wildcards.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SearchCriteria {
    pub title: String,
    pub author: String,
    pub additional_authors: String,
    pub state: String,
}

impl SearchCriteria {
    /// Supplied patterns in execution order: title, author,
    /// additional authors, state.
    pub fn patterns(&self) -> impl Iterator<Item = (SearchField, &str)> {
        [
            (SearchField::Title, self.title.as_str()),
            (SearchField::Author, self.author.as_str()),
            (SearchField::AdditionalAuthors, self.additional_authors.as_str()),
            (SearchField::State, self.state.as_str()),
        ]
        .into_iter()
        .filter(|(_, pattern)| !pattern.is_empty())
    }
}

/// Parses an optional `YYYY-MM-DD` date. Only the empty string means
/// "not supplied"; surrounding or whitespace-only input is rejected.
pub fn parse_date_read(value: &str) -> Result<Option<NaiveDate>, BookValidationError> {
    if value.is_empty() {
        return Ok(None);
    }

    NaiveDate::parse_from_str(value, DATE_READ_FORMAT)
        .map(Some)
        .map_err(|_| BookValidationError::InvalidDate {
            value: value.to_string(),
        })
}

fn non_empty(value: &str) -> Option<String> {
    (!value.is_empty()).then(|| value.to_string())
}
