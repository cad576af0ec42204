//! Book use-case service.
//!
//! # Responsibility
//! - Provide the add/read/edit/delete/search/list entry points.
//! - Delegate persistence to a `BookRepository`.
//! - Emit metadata-only log events (ids and counts, never titles).
//!
//! # Invariants
//! - id `0` is a silent no-op for read, edit and delete.
//! - Search runs one independent query per supplied pattern; results are
//!   neither merged nor deduplicated.

use crate::model::book::{Book, BookDraft, BookId, BookPatch, SearchCriteria};
use crate::repo::book_repo::{BookFilter, BookRepository, RepoError, RepoResult, UpdateReport};
use log::{debug, info, warn};

/// Result of a delete: the pre-delete lookup and the rows removed.
#[derive(Debug)]
pub struct DeleteOutcome {
    /// `Ok(None)` when no record had that id.
    pub snapshot: RepoResult<Option<Book>>,
    pub removed: usize,
}

/// Use-case service wrapper for book operations.
pub struct BookService<R: BookRepository> {
    repo: R,
}

impl<R: BookRepository> BookService<R> {
    /// Creates a service using the provided repository implementation.
    pub fn new(repo: R) -> Self {
        Self { repo }
    }

    /// Inserts a new book and returns it as re-read from storage.
    ///
    /// # Errors
    /// - `Validation` for a blank title or malformed `date_read`; nothing is
    ///   persisted in that case.
    pub fn create_book(&self, draft: &BookDraft) -> RepoResult<Book> {
        let id = match self.repo.create_book(draft) {
            Ok(id) => id,
            Err(err) => {
                warn!("event=book_create module=service status=error error={err}");
                return Err(err);
            }
        };
        info!("event=book_create module=service status=ok id={id}");

        self.repo.get_book(id)?.ok_or(RepoError::NotFound(id))
    }

    /// Reads one book.
    ///
    /// Returns `Ok(None)` for id `0` and `Err(NotFound)` for an unknown id.
    pub fn read_book(&self, id: BookId) -> RepoResult<Option<Book>> {
        if id == 0 {
            debug!("event=book_read module=service status=skipped reason=zero_id");
            return Ok(None);
        }

        match self.repo.get_book(id)? {
            Some(book) => Ok(Some(book)),
            None => Err(RepoError::NotFound(id)),
        }
    }

    /// Applies every supplied patch field to the book.
    ///
    /// Returns `None` for id `0`. An unknown id matches zero rows and is not
    /// an error.
    pub fn update_book(&self, id: BookId, patch: &BookPatch) -> RepoResult<Option<UpdateReport>> {
        if id == 0 {
            debug!("event=book_update module=service status=skipped reason=zero_id");
            return Ok(None);
        }

        let report = self.repo.update_book(id, patch)?;
        info!(
            "event=book_update module=service status=ok id={id} fields_applied={} rows_matched={} date_rejected={}",
            report.applied.len(),
            report.rows_matched,
            report.rejected_date.is_some()
        );
        Ok(Some(report))
    }

    /// Deletes a book, reporting the record as it was before deletion.
    ///
    /// The delete runs even when the lookup fails; the lookup error is kept
    /// in `DeleteOutcome::snapshot` for the caller to report. id `0` deletes
    /// nothing.
    pub fn delete_book(&self, id: BookId) -> RepoResult<DeleteOutcome> {
        if id == 0 {
            debug!("event=book_delete module=service status=skipped reason=zero_id");
            return Ok(DeleteOutcome {
                snapshot: Ok(None),
                removed: 0,
            });
        }

        let snapshot = self.repo.get_book(id);
        if let Err(err) = &snapshot {
            warn!("event=book_delete module=service status=degraded id={id} error={err}");
        }

        let removed = self.repo.delete_book(id)?;
        info!("event=book_delete module=service status=ok id={id} rows_removed={removed}");
        Ok(DeleteOutcome { snapshot, removed })
    }

    /// Runs one `LIKE` query per supplied pattern and hands every hit to
    /// `visit` as it is read.
    ///
    /// Returns the number of queries executed.
    pub fn search_books(
        &self,
        criteria: &SearchCriteria,
        visit: &mut dyn FnMut(RepoResult<Book>),
    ) -> RepoResult<usize> {
        let mut queries = 0;
        for (field, pattern) in criteria.patterns() {
            self.repo
                .for_each_book(BookFilter::Matching { field, pattern }, &mut *visit)?;
            queries += 1;
        }
        debug!("event=book_search module=service status=ok queries={queries}");
        Ok(queries)
    }

    /// Hands every stored book to `visit` in storage order.
    pub fn list_books(&self, visit: &mut dyn FnMut(RepoResult<Book>)) -> RepoResult<()> {
        self.repo.for_each_book(BookFilter::All, visit)
    }
}
