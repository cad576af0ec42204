//! Book repository contract and SQLite implementation.
//!
//! # Responsibility
//! - Provide create/read/update/delete and pattern search over `books`.
//! - Keep SQL details inside the core persistence boundary.
//!
//! # Invariants
//! - NULL columns are coalesced to empty text / zero on read.
//! - `updated_at` strictly increases on every field assignment.
//! - Result order of list/search is whatever SQLite returns (no ORDER BY).

use crate::db::migrations::{current_version, latest_version};
use crate::db::DbError;
use crate::model::book::{
    parse_date_read, Book, BookDraft, BookField, BookId, BookPatch, BookValidationError,
    SearchField, DATE_READ_FORMAT,
};
use chrono::{NaiveDate, Utc};
use rusqlite::types::Value;
use rusqlite::{params, Connection, Row, Rows, Statement, Transaction, TransactionBehavior};
use std::collections::HashSet;
use std::error::Error;
use std::fmt::{Display, Formatter};

const BOOK_SELECT_SQL: &str = "SELECT
    id,
    title,
    COALESCE(author, '') AS author,
    COALESCE(addn_authors, '') AS addn_authors,
    COALESCE(state, '') AS state,
    COALESCE(stars, 0) AS stars,
    date_read,
    created_at,
    updated_at
FROM books";

const BOOKS_TABLE: &str = "books";
const REQUIRED_BOOK_COLUMNS: &[&str] = &[
    "id",
    "title",
    "author",
    "addn_authors",
    "state",
    "stars",
    "date_read",
    "created_at",
    "updated_at",
];

pub type RepoResult<T> = Result<T, RepoError>;

/// Repository error for book persistence and query operations.
#[derive(Debug)]
pub enum RepoError {
    Validation(BookValidationError),
    Db(DbError),
    NotFound(BookId),
    InvalidData(String),
    UninitializedConnection {
        expected_version: u32,
        actual_version: u32,
    },
    MissingRequiredTable(&'static str),
    MissingRequiredColumn {
        table: &'static str,
        column: &'static str,
    },
}

impl Display for RepoError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Validation(err) => write!(f, "{err}"),
            Self::Db(err) => write!(f, "{err}"),
            Self::NotFound(_) => write!(f, "No book with that ID."),
            Self::InvalidData(message) => write!(f, "invalid persisted book data: {message}"),
            Self::UninitializedConnection {
                expected_version,
                actual_version,
            } => write!(
                f,
                "database schema version {actual_version} does not match expected {expected_version}; run with --init first"
            ),
            Self::MissingRequiredTable(table) => write!(f, "required table `{table}` is missing"),
            Self::MissingRequiredColumn { table, column } => {
                write!(f, "required column `{table}.{column}` is missing")
            }
        }
    }
}

impl Error for RepoError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Validation(err) => Some(err),
            Self::Db(err) => Some(err),
            _ => None,
        }
    }
}

impl From<BookValidationError> for RepoError {
    fn from(value: BookValidationError) -> Self {
        Self::Validation(value)
    }
}

impl From<DbError> for RepoError {
    fn from(value: DbError) -> Self {
        Self::Db(value)
    }
}

impl From<rusqlite::Error> for RepoError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Db(DbError::Sqlite(value))
    }
}

/// Outcome of one partial update call.
#[derive(Debug, Default)]
pub struct UpdateReport {
    /// Fields whose statement ran, in application order.
    pub applied: Vec<BookField>,
    /// Set when the supplied `date_read` was rejected; other fields still
    /// committed.
    pub rejected_date: Option<BookValidationError>,
    /// Rows matched by the id. Zero for a nonexistent book.
    pub rows_matched: usize,
}

/// Row selection for multi-row reads.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BookFilter<'a> {
    All,
    /// `<column> LIKE <pattern>`, pattern passed verbatim.
    Matching {
        field: SearchField,
        pattern: &'a str,
    },
}

/// Repository interface for book CRUD and search.
pub trait BookRepository {
    fn create_book(&self, draft: &BookDraft) -> RepoResult<BookId>;
    fn get_book(&self, id: BookId) -> RepoResult<Option<Book>>;
    fn update_book(&self, id: BookId, patch: &BookPatch) -> RepoResult<UpdateReport>;
    /// Returns the number of rows removed.
    fn delete_book(&self, id: BookId) -> RepoResult<usize>;
    /// Streams matching books to `visit` in storage order.
    ///
    /// Statement preparation and execution failures are returned. A row that
    /// fails to decode is handed to `visit` as an error and the scan moves on
    /// to the next row; a cursor step failure is handed over and ends it.
    fn for_each_book(
        &self,
        filter: BookFilter<'_>,
        visit: &mut dyn FnMut(RepoResult<Book>),
    ) -> RepoResult<()>;
}

/// SQLite-backed book repository.
pub struct SqliteBookRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteBookRepository<'conn> {
    /// Constructs a repository from a migrated connection.
    ///
    /// # Errors
    /// - `UninitializedConnection` when `user_version` is not the latest.
    /// - `MissingRequiredTable` / `MissingRequiredColumn` when the `books`
    ///   shape does not match.
    pub fn try_new(conn: &'conn Connection) -> RepoResult<Self> {
        ensure_connection_ready(conn)?;
        Ok(Self { conn })
    }

    /// Prepares a lazy, single-pass query over `books`.
    pub fn query_books(&self, filter: BookFilter<'_>) -> RepoResult<BookQuery<'conn>> {
        let (sql, pattern) = match filter {
            BookFilter::All => (format!("{BOOK_SELECT_SQL};"), None),
            BookFilter::Matching { field, pattern } => (
                format!("{BOOK_SELECT_SQL} WHERE {} LIKE ?1;", field.column()),
                Some(pattern.to_string()),
            ),
        };

        Ok(BookQuery {
            stmt: self.conn.prepare(&sql)?,
            pattern,
        })
    }
}

impl BookRepository for SqliteBookRepository<'_> {
    fn create_book(&self, draft: &BookDraft) -> RepoResult<BookId> {
        let book = draft.parse()?;
        let now = now_epoch_ms();

        self.conn.execute(
            "INSERT INTO books (
                title,
                author,
                addn_authors,
                state,
                date_read,
                stars,
                created_at,
                updated_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?7);",
            params![
                book.title.as_str(),
                book.author.as_deref(),
                book.additional_authors.as_deref(),
                book.state.as_deref(),
                book.date_read,
                book.stars,
                now,
            ],
        )?;

        Ok(self.conn.last_insert_rowid())
    }

    fn get_book(&self, id: BookId) -> RepoResult<Option<Book>> {
        let mut stmt = self
            .conn
            .prepare(&format!("{BOOK_SELECT_SQL} WHERE id = ?1;"))?;

        let mut rows = stmt.query([id])?;
        if let Some(row) = rows.next()? {
            return Ok(Some(parse_book_row(row)?));
        }

        Ok(None)
    }

    fn update_book(&self, id: BookId, patch: &BookPatch) -> RepoResult<UpdateReport> {
        if patch.is_empty() {
            return Ok(UpdateReport::default());
        }

        let tx = Transaction::new_unchecked(self.conn, TransactionBehavior::Immediate)?;
        let now = now_epoch_ms();
        let mut report = UpdateReport::default();

        for (field, value) in patch_assignments(patch) {
            let value = match value {
                Ok(value) => value,
                Err(err) => {
                    report.rejected_date = Some(err);
                    continue;
                }
            };

            let changed = tx.execute(
                &format!(
                    "UPDATE books
                     SET
                        {} = ?1,
                        updated_at = MAX(?2, updated_at + 1)
                     WHERE id = ?3;",
                    field.column()
                ),
                params![value, now, id],
            )?;
            report.rows_matched = report.rows_matched.max(changed);
            report.applied.push(field);
        }

        tx.commit()?;
        Ok(report)
    }

    fn delete_book(&self, id: BookId) -> RepoResult<usize> {
        let removed = self.conn.execute("DELETE FROM books WHERE id = ?1;", [id])?;
        Ok(removed)
    }

    fn for_each_book(
        &self,
        filter: BookFilter<'_>,
        visit: &mut dyn FnMut(RepoResult<Book>),
    ) -> RepoResult<()> {
        let mut query = self.query_books(filter)?;
        for item in query.rows()? {
            visit(item);
        }
        Ok(())
    }
}

/// Prepared multi-row book query.
pub struct BookQuery<'conn> {
    stmt: Statement<'conn>,
    pattern: Option<String>,
}

impl BookQuery<'_> {
    /// Executes the query and returns a cursor over decoded rows.
    pub fn rows(&mut self) -> RepoResult<BookRows<'_>> {
        let rows = match self.pattern.as_deref() {
            Some(pattern) => self.stmt.query([pattern])?,
            None => self.stmt.query([])?,
        };
        Ok(BookRows {
            rows,
            finished: false,
        })
    }
}

/// Cursor over query results.
///
/// Decode failures are yielded per row without ending the cursor; a failed
/// step is yielded once and ends it.
pub struct BookRows<'stmt> {
    rows: Rows<'stmt>,
    finished: bool,
}

impl Iterator for BookRows<'_> {
    type Item = RepoResult<Book>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.finished {
            return None;
        }

        match self.rows.next() {
            Ok(Some(row)) => Some(parse_book_row(row)),
            Ok(None) => {
                self.finished = true;
                None
            }
            Err(err) => {
                self.finished = true;
                Some(Err(err.into()))
            }
        }
    }
}

fn patch_assignments(
    patch: &BookPatch,
) -> Vec<(BookField, Result<Value, BookValidationError>)> {
    let mut assignments = Vec::new();
    let texts = [
        (BookField::Title, &patch.title),
        (BookField::Author, &patch.author),
        (BookField::AdditionalAuthors, &patch.additional_authors),
        (BookField::State, &patch.state),
    ];

    for (field, text) in texts {
        if !text.is_empty() {
            assignments.push((field, Ok(Value::Text(text.clone()))));
        }
    }

    if !patch.date_read.is_empty() {
        let date = parse_date_read(&patch.date_read).and_then(|date| {
            date.map(|date| Value::Text(date.format(DATE_READ_FORMAT).to_string()))
                .ok_or_else(|| BookValidationError::InvalidDate {
                    value: patch.date_read.clone(),
                })
        });
        assignments.push((BookField::DateRead, date));
    }

    if patch.stars > 0 {
        assignments.push((BookField::Stars, Ok(Value::Integer(i64::from(patch.stars)))));
    }

    assignments
}

fn parse_book_row(row: &Row<'_>) -> RepoResult<Book> {
    let id: BookId = row.get("id")?;

    let stars_raw: i64 = row.get("stars")?;
    let stars = u32::try_from(stars_raw).map_err(|_| {
        RepoError::InvalidData(format!("invalid stars value `{stars_raw}` for book {id}"))
    })?;

    let date_read = match row.get::<_, Option<String>>("date_read")? {
        Some(text) if !text.trim().is_empty() => Some(
            NaiveDate::parse_from_str(text.trim(), DATE_READ_FORMAT).map_err(|_| {
                RepoError::InvalidData(format!("invalid date_read `{text}` for book {id}"))
            })?,
        ),
        _ => None,
    };

    Ok(Book {
        id,
        title: row.get("title")?,
        author: row.get("author")?,
        additional_authors: row.get("addn_authors")?,
        state: row.get("state")?,
        stars,
        date_read,
        created_at: row.get("created_at")?,
        updated_at: row.get("updated_at")?,
    })
}

fn ensure_connection_ready(conn: &Connection) -> RepoResult<()> {
    let expected_version = latest_version();
    let actual_version = current_version(conn)?;
    if actual_version != expected_version {
        return Err(RepoError::UninitializedConnection {
            expected_version,
            actual_version,
        });
    }

    let mut stmt = conn.prepare("SELECT name FROM pragma_table_info(?1);")?;
    let columns = stmt
        .query_map([BOOKS_TABLE], |row| row.get::<_, String>(0))?
        .collect::<Result<HashSet<_>, _>>()?;

    if columns.is_empty() {
        return Err(RepoError::MissingRequiredTable(BOOKS_TABLE));
    }

    if let Some(column) = REQUIRED_BOOK_COLUMNS
        .iter()
        .copied()
        .find(|column| !columns.contains(*column))
    {
        return Err(RepoError::MissingRequiredColumn {
            table: BOOKS_TABLE,
            column,
        });
    }

    Ok(())
}

fn now_epoch_ms() -> i64 {
    Utc::now().timestamp_millis()
}
