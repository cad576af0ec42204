//! Command-line flag surface.
//!
//! # Responsibility
//! - Parse flags with clap and enforce that exactly one action is selected.
//! - Fold the parsed flags into one immutable [`Command`].

use booklist_core::{BookDraft, BookId, BookPatch, BooklistConfig, Command, SearchCriteria};
use clap::{ArgGroup, Parser};
use std::path::PathBuf;

#[derive(Debug, Parser)]
#[command(name = "booklist", about = "Keep track of the books you read")]
#[command(group(
    ArgGroup::new("action")
        .required(true)
        .args(["add", "edit", "delete", "read", "search", "list", "init", "version"])
))]
pub struct Cli {
    /// Add a book record
    #[arg(short = 'a', long)]
    pub add: bool,
    /// Edit a book record
    #[arg(short = 'e', long, value_name = "ID", num_args = 0..=1, default_missing_value = "0",
          value_parser = clap::value_parser!(i64).range(0..))]
    pub edit: Option<BookId>,
    /// Delete a book record
    #[arg(short = 'd', long, value_name = "ID", num_args = 0..=1, default_missing_value = "0",
          value_parser = clap::value_parser!(i64).range(0..))]
    pub delete: Option<BookId>,
    /// Read a book record
    #[arg(short = 'r', long, value_name = "ID", num_args = 0..=1, default_missing_value = "0",
          value_parser = clap::value_parser!(i64).range(0..))]
    pub read: Option<BookId>,
    /// Search for books by --title, --author, --addn_authors or --state (SQL LIKE patterns)
    #[arg(short = 's', long)]
    pub search: bool,
    /// List all books in the database
    #[arg(short = 'l', long)]
    pub list: bool,
    /// Initialize the database
    #[arg(long)]
    pub init: bool,
    /// Print the booklist version
    #[arg(long)]
    pub version: bool,

    /// Book ID, used when -e/-d/-r are given without one
    #[arg(long, value_parser = clap::value_parser!(i64).range(0..))]
    pub id: Option<BookId>,
    /// Book title
    #[arg(long)]
    pub title: Option<String>,
    /// Book author
    #[arg(long)]
    pub author: Option<String>,
    /// Additional authors
    #[arg(long = "addn_authors")]
    pub addn_authors: Option<String>,
    /// What state the book is in
    #[arg(long)]
    pub state: Option<String>,
    /// Date read (eg 2014-02-14)
    #[arg(long = "date_read")]
    pub date_read: Option<String>,
    /// Rating for book (generally 1-5)
    #[arg(long)]
    pub stars: Option<u32>,

    /// Database file [default: ~/.booklist/booklist.db]
    #[arg(long, env = "BOOKLIST_DB", value_name = "PATH")]
    pub db: Option<PathBuf>,
    /// Log directory [default: ~/.booklist/logs]
    #[arg(long, env = "BOOKLIST_LOG_DIR", value_name = "DIR")]
    pub log_dir: Option<PathBuf>,
    /// Log level: trace|debug|info|warn|error
    #[arg(long, env = "BOOKLIST_LOG_LEVEL", value_name = "LEVEL")]
    pub log_level: Option<String>,
}

impl Cli {
    /// Resolves storage and logging settings from flags, env and `$HOME`.
    pub fn config(&self) -> BooklistConfig {
        BooklistConfig::from_overrides(
            self.db.clone(),
            self.log_dir.clone(),
            self.log_level.clone(),
        )
    }

    /// Builds the single command selected on the command line.
    pub fn command(&self) -> Command {
        if self.add {
            Command::Add(self.draft())
        } else if let Some(id) = self.edit {
            Command::Edit {
                id: self.target(id),
                patch: self.patch(),
            }
        } else if let Some(id) = self.delete {
            Command::Delete(self.target(id))
        } else if let Some(id) = self.read {
            Command::Read(self.target(id))
        } else if self.search {
            Command::Search(self.criteria())
        } else if self.list {
            Command::List
        } else if self.init {
            Command::Init
        } else {
            Command::Version
        }
    }

    fn target(&self, id: BookId) -> BookId {
        if id > 0 {
            id
        } else {
            self.id.unwrap_or(0)
        }
    }

    fn draft(&self) -> BookDraft {
        BookDraft {
            title: text(&self.title),
            author: text(&self.author),
            additional_authors: text(&self.addn_authors),
            state: text(&self.state),
            date_read: text(&self.date_read),
            stars: self.stars.unwrap_or(0),
        }
    }

    fn patch(&self) -> BookPatch {
        BookPatch {
            title: text(&self.title),
            author: text(&self.author),
            additional_authors: text(&self.addn_authors),
            state: text(&self.state),
            date_read: text(&self.date_read),
            stars: self.stars.unwrap_or(0),
        }
    }

    fn criteria(&self) -> SearchCriteria {
        SearchCriteria {
            title: text(&self.title),
            author: text(&self.author),
            additional_authors: text(&self.addn_authors),
            state: text(&self.state),
        }
    }
}

fn text(value: &Option<String>) -> String {
    value.clone().unwrap_or_default()
}
