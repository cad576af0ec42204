//! Core library for `booklist`, a personal book-tracking tool.
//! This crate owns storage, validation and rendering; the CLI only parses
//! flags into a [`Command`].

pub mod config;
pub mod db;
pub mod logging;
pub mod model;
pub mod render;
pub mod repo;
pub mod service;

pub use config::BooklistConfig;
pub use logging::{default_log_level, init_logging, logging_status};
pub use model::book::{
    parse_date_read, Book, BookDraft, BookField, BookId, BookPatch, BookValidationError,
    NewBook, SearchCriteria, SearchField,
};
pub use model::command::Command;
pub use render::render_book;
pub use repo::book_repo::{
    BookFilter, BookQuery, BookRepository, BookRows, RepoError, RepoResult,
    SqliteBookRepository, UpdateReport,
};
pub use service::book_service::{BookService, DeleteOutcome};

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}

#[cfg(test)]
mod tests {
    use super::core_version;

    #[test]
    fn version_is_not_empty() {
        assert!(!core_version().is_empty());
    }
}
