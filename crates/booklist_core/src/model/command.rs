//! Immutable command selected by the dispatcher.
//!
//! The CLI builds exactly one `Command` per invocation and hands it to the
//! runner; nothing downstream reads process-wide flag state.

use crate::model::book::{BookDraft, BookId, BookPatch, SearchCriteria};

/// One action plus the field values it needs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Add(BookDraft),
    Edit { id: BookId, patch: BookPatch },
    Delete(BookId),
    Read(BookId),
    Search(SearchCriteria),
    List,
    /// Creates the data directory and database schema.
    Init,
    Version,
}

impl Command {
    /// Stable action name used in log events.
    pub fn name(&self) -> &'static str {
        match self {
            Self::Add(_) => "add",
            Self::Edit { .. } => "edit",
            Self::Delete(_) => "delete",
            Self::Read(_) => "read",
            Self::Search(_) => "search",
            Self::List => "list",
            Self::Init => "init",
            Self::Version => "version",
        }
    }
}
