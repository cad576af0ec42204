//! Command execution against the book store.
//!
//! # Responsibility
//! - Open storage, run one [`Command`], and render results.
//! - Map outcomes to a process [`Status`].
//! - Start file logging only after the store's directory exists, so a
//!   missing store is still reported as missing.
//!
//! # Invariants
//! - Records go to `out`; errors and warnings go to `err`.
//! - "No book with that ID." is informational and does not fail the run.

use booklist_core::db::{ensure_db_dir, open_db};
use booklist_core::{
    core_version, init_logging, render_book, Book, BookId, BookRepository, BookService,
    BooklistConfig, Command, RepoError, RepoResult, SqliteBookRepository,
};
use log::{error, info};
use std::io::{self, Write};
use std::process::ExitCode;

/// Final outcome of one invocation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Status {
    Success,
    Failure,
}

impl From<Status> for ExitCode {
    fn from(value: Status) -> Self {
        match value {
            Status::Success => ExitCode::SUCCESS,
            Status::Failure => ExitCode::FAILURE,
        }
    }
}

/// Runs `command` with storage resolved from `config`.
pub fn execute(
    command: &Command,
    config: &BooklistConfig,
    out: &mut dyn Write,
    err: &mut dyn Write,
) -> Status {
    let result = match command {
        Command::Version => writeln!(out, "booklist {}", core_version()).map(|()| Status::Success),
        Command::Init => init_store(config, out, err),
        _ => run_against_store(command, config, out, err),
    };

    let status = result.unwrap_or_else(|io_err| {
        error!("event=command_finish module=cli status=error error_code=output_failed error={io_err}");
        Status::Failure
    });
    info!(
        "event=command_finish module=cli action={} status={:?}",
        command.name(),
        status
    );
    status
}

fn init_store(
    config: &BooklistConfig,
    out: &mut dyn Write,
    err: &mut dyn Write,
) -> io::Result<Status> {
    let opened = ensure_db_dir(&config.db_path).and_then(|()| {
        start_logging(Command::Init.name(), config, err);
        open_db(&config.db_path)
    });
    match opened {
        Ok(_) => {
            writeln!(out, "Initialized book database at {}", config.db_path.display())?;
            Ok(Status::Success)
        }
        Err(db_err) => {
            writeln!(err, "{db_err}")?;
            Ok(Status::Failure)
        }
    }
}

fn run_against_store(
    command: &Command,
    config: &BooklistConfig,
    out: &mut dyn Write,
    err: &mut dyn Write,
) -> io::Result<Status> {
    let conn = match open_db(&config.db_path) {
        Ok(conn) => conn,
        Err(db_err) => {
            writeln!(
                err,
                "cannot open {}: {db_err} (run with --init to create it)",
                config.db_path.display()
            )?;
            return Ok(Status::Failure);
        }
    };
    start_logging(command.name(), config, err);

    let repo = match SqliteBookRepository::try_new(&conn) {
        Ok(repo) => repo,
        Err(repo_err) => {
            writeln!(err, "{repo_err}")?;
            return Ok(Status::Failure);
        }
    };

    run_command(&BookService::new(repo), command, out, err)
}

/// Starts file logging for this run. Logging is diagnostic only; failures
/// become a warning on `err`.
fn start_logging(action: &str, config: &BooklistConfig, err: &mut dyn Write) {
    if !config.file_logging {
        return;
    }
    match init_logging(&config.log_level, &config.log_dir) {
        Ok(()) => info!("event=command_start module=cli status=start action={action}"),
        Err(log_err) => {
            // A failed warning write is not worth failing the command over.
            let _ = writeln!(err, "warning: logging disabled: {log_err}");
        }
    }
}

/// Runs a storage-backed command through the service layer.
pub fn run_command<R: BookRepository>(
    service: &BookService<R>,
    command: &Command,
    out: &mut dyn Write,
    err: &mut dyn Write,
) -> io::Result<Status> {
    match command {
        Command::Add(draft) => match service.create_book(draft) {
            Ok(book) => {
                write!(out, "{}", render_book(&book))?;
                Ok(Status::Success)
            }
            Err(repo_err) => report(err, &repo_err),
        },
        Command::Edit { id, patch } => match service.update_book(*id, patch) {
            Ok(Some(update)) => {
                if let Some(rejected) = update.rejected_date {
                    writeln!(err, "{rejected}")?;
                }
                show_book(service, *id, out, err)
            }
            Ok(None) => Ok(Status::Success),
            Err(repo_err) => report(err, &repo_err),
        },
        Command::Delete(id) => match service.delete_book(*id) {
            Ok(outcome) => match outcome.snapshot {
                Ok(Some(book)) => {
                    write!(out, "{}", render_book(&book))?;
                    Ok(Status::Success)
                }
                Ok(None) => {
                    if *id != 0 {
                        writeln!(out, "{}", RepoError::NotFound(*id))?;
                    }
                    Ok(Status::Success)
                }
                // The row is gone; the record it held could not be shown.
                Err(lookup_err) => report(err, &lookup_err),
            },
            Err(repo_err) => report(err, &repo_err),
        },
        Command::Read(id) => show_book(service, *id, out, err),
        Command::Search(criteria) => {
            stream_books(out, err, |visit| service.search_books(criteria, visit).map(|_| ()))
        }
        Command::List => stream_books(out, err, |visit| service.list_books(visit)),
        Command::Init | Command::Version => Ok(Status::Success),
    }
}

fn show_book<R: BookRepository>(
    service: &BookService<R>,
    id: BookId,
    out: &mut dyn Write,
    err: &mut dyn Write,
) -> io::Result<Status> {
    match service.read_book(id) {
        Ok(Some(book)) => {
            write!(out, "{}", render_book(&book))?;
            Ok(Status::Success)
        }
        Ok(None) => Ok(Status::Success),
        Err(not_found @ RepoError::NotFound(_)) => {
            writeln!(out, "{not_found}")?;
            Ok(Status::Success)
        }
        Err(repo_err) => report(err, &repo_err),
    }
}

/// Renders books as the scan yields them. Undecodable rows are reported and
/// fail the run without hiding the rows already printed.
fn stream_books(
    out: &mut dyn Write,
    err: &mut dyn Write,
    scan: impl FnOnce(&mut dyn FnMut(RepoResult<Book>)) -> RepoResult<()>,
) -> io::Result<Status> {
    let mut write_result = Ok(());
    let mut row_failed = false;

    let scanned = scan(&mut |item| {
        if write_result.is_err() {
            return;
        }
        write_result = match item {
            Ok(book) => write!(out, "{}", render_book(&book)),
            Err(repo_err) => {
                row_failed = true;
                writeln!(err, "{repo_err}")
            }
        };
    });
    write_result?;

    match scanned {
        Ok(()) if row_failed => Ok(Status::Failure),
        Ok(()) => Ok(Status::Success),
        Err(repo_err) => report(err, &repo_err),
    }
}

fn report(err: &mut dyn Write, repo_err: &RepoError) -> io::Result<Status> {
    error!("event=command_error module=cli status=error error={repo_err}");
    writeln!(err, "{repo_err}")?;
    Ok(Status::Failure)
}
