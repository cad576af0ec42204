use booklist_core::db::migrations::latest_version;
use booklist_core::db::open_db_in_memory;
use booklist_core::{
    BookDraft, BookField, BookPatch, BookRepository, BookService, BookValidationError,
    RepoError, SqliteBookRepository,
};
use chrono::NaiveDate;
use rusqlite::Connection;

#[test]
fn create_with_only_title_reads_back_empty_optionals() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteBookRepository::try_new(&conn).unwrap();

    let id = repo.create_book(&BookDraft::titled("Dune")).unwrap();
    assert!(id > 0);

    let book = repo.get_book(id).unwrap().unwrap();
    assert_eq!(book.id, id);
    assert_eq!(book.title, "Dune");
    assert_eq!(book.author, "");
    assert_eq!(book.additional_authors, "");
    assert_eq!(book.state, "");
    assert_eq!(book.stars, 0);
    assert_eq!(book.date_read, None);
    assert_eq!(book.created_at, book.updated_at);
}

#[test]
fn absent_fields_are_stored_as_null() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteBookRepository::try_new(&conn).unwrap();

    let id = repo.create_book(&BookDraft::titled("Dune")).unwrap();

    let nulls: i64 = conn
        .query_row(
            "SELECT COUNT(*) FROM books
             WHERE id = ?1
               AND author IS NULL
               AND addn_authors IS NULL
               AND state IS NULL
               AND stars IS NULL
               AND date_read IS NULL;",
            [id],
            |row| row.get(0),
        )
        .unwrap();
    assert_eq!(nulls, 1);
}

#[test]
fn create_with_empty_title_persists_nothing() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteBookRepository::try_new(&conn).unwrap();

    let err = repo.create_book(&BookDraft::default()).unwrap_err();
    assert!(matches!(
        err,
        RepoError::Validation(BookValidationError::EmptyTitle)
    ));
    assert_eq!(count_books(&conn), 0);
}

#[test]
fn create_with_invalid_date_persists_nothing() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteBookRepository::try_new(&conn).unwrap();

    let draft = BookDraft {
        date_read: "2014-13-01".to_string(),
        ..BookDraft::titled("Dune")
    };
    let err = repo.create_book(&draft).unwrap_err();
    assert!(matches!(
        err,
        RepoError::Validation(BookValidationError::InvalidDate { .. })
    ));
    assert_eq!(count_books(&conn), 0);
}

#[test]
fn date_read_round_trips_as_calendar_date() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteBookRepository::try_new(&conn).unwrap();

    let draft = BookDraft {
        date_read: "2014-02-14".to_string(),
        ..BookDraft::titled("Dune")
    };
    let id = repo.create_book(&draft).unwrap();

    let stored: String = conn
        .query_row("SELECT date_read FROM books WHERE id = ?1;", [id], |row| {
            row.get(0)
        })
        .unwrap();
    assert_eq!(stored, "2014-02-14");

    let book = repo.get_book(id).unwrap().unwrap();
    assert_eq!(book.date_read, NaiveDate::from_ymd_opt(2014, 2, 14));
}

#[test]
fn each_field_update_advances_updated_at_and_leaves_others() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteBookRepository::try_new(&conn).unwrap();

    let draft = BookDraft {
        author: "Frank Herbert".to_string(),
        state: "reading".to_string(),
        ..BookDraft::titled("Dune")
    };
    let id = repo.create_book(&draft).unwrap();
    let before = repo.get_book(id).unwrap().unwrap();

    let patch = BookPatch {
        stars: 5,
        ..BookPatch::default()
    };
    let report = repo.update_book(id, &patch).unwrap();
    assert_eq!(report.applied, vec![BookField::Stars]);
    assert_eq!(report.rows_matched, 1);

    let after_stars = repo.get_book(id).unwrap().unwrap();
    assert!(after_stars.updated_at > before.updated_at);
    assert_eq!(after_stars.stars, 5);
    assert_eq!(after_stars.title, before.title);
    assert_eq!(after_stars.author, before.author);
    assert_eq!(after_stars.state, before.state);
    assert_eq!(after_stars.created_at, before.created_at);

    let patch = BookPatch {
        state: "finished".to_string(),
        ..BookPatch::default()
    };
    repo.update_book(id, &patch).unwrap();

    let after_state = repo.get_book(id).unwrap().unwrap();
    assert!(after_state.updated_at > after_stars.updated_at);
    assert_eq!(after_state.state, "finished");
    assert_eq!(after_state.stars, 5);
}

#[test]
fn update_applies_fields_in_order_and_each_bumps_updated_at() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteBookRepository::try_new(&conn).unwrap();
    let id = repo.create_book(&BookDraft::titled("Dun")).unwrap();
    let created = repo.get_book(id).unwrap().unwrap();

    let patch = BookPatch {
        title: "Dune".to_string(),
        author: "Frank Herbert".to_string(),
        additional_authors: "Brian Herbert".to_string(),
        state: "finished".to_string(),
        date_read: "2014-02-14".to_string(),
        stars: 4,
    };
    let report = repo.update_book(id, &patch).unwrap();
    assert_eq!(
        report.applied,
        vec![
            BookField::Title,
            BookField::Author,
            BookField::AdditionalAuthors,
            BookField::State,
            BookField::DateRead,
            BookField::Stars,
        ]
    );
    assert!(report.rejected_date.is_none());

    let book = repo.get_book(id).unwrap().unwrap();
    assert_eq!(book.title, "Dune");
    assert_eq!(book.additional_authors, "Brian Herbert");
    assert_eq!(book.date_read, NaiveDate::from_ymd_opt(2014, 2, 14));
    assert!(book.updated_at >= created.updated_at + 6);
}

#[test]
fn invalid_date_in_update_still_commits_other_fields() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteBookRepository::try_new(&conn).unwrap();
    let id = repo.create_book(&BookDraft::titled("Dune")).unwrap();

    let patch = BookPatch {
        author: "Frank Herbert".to_string(),
        date_read: "not-a-date".to_string(),
        stars: 3,
        ..BookPatch::default()
    };
    let report = repo.update_book(id, &patch).unwrap();
    assert_eq!(report.applied, vec![BookField::Author, BookField::Stars]);
    assert_eq!(
        report.rejected_date,
        Some(BookValidationError::InvalidDate {
            value: "not-a-date".to_string()
        })
    );

    let book = repo.get_book(id).unwrap().unwrap();
    assert_eq!(book.author, "Frank Herbert");
    assert_eq!(book.stars, 3);
    assert_eq!(book.date_read, None);
}

#[test]
fn whitespace_date_in_update_is_rejected_and_keeps_stored_date() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteBookRepository::try_new(&conn).unwrap();
    let draft = BookDraft {
        date_read: "2014-02-14".to_string(),
        ..BookDraft::titled("Dune")
    };
    let id = repo.create_book(&draft).unwrap();

    let patch = BookPatch {
        date_read: " ".to_string(),
        state: "finished".to_string(),
        ..BookPatch::default()
    };
    let report = repo.update_book(id, &patch).unwrap();
    assert_eq!(report.applied, vec![BookField::State]);
    assert_eq!(
        report.rejected_date,
        Some(BookValidationError::InvalidDate {
            value: " ".to_string()
        })
    );

    let book = repo.get_book(id).unwrap().unwrap();
    assert_eq!(book.state, "finished");
    assert_eq!(book.date_read, NaiveDate::from_ymd_opt(2014, 2, 14));
}

#[test]
fn empty_patch_touches_nothing() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteBookRepository::try_new(&conn).unwrap();
    let id = repo.create_book(&BookDraft::titled("Dune")).unwrap();
    let before = repo.get_book(id).unwrap().unwrap();

    let report = repo.update_book(id, &BookPatch::default()).unwrap();
    assert!(report.applied.is_empty());
    assert!(report.rejected_date.is_none());
    assert_eq!(report.rows_matched, 0);

    let after = repo.get_book(id).unwrap().unwrap();
    assert_eq!(after, before);
}

#[test]
fn update_of_unknown_id_matches_nothing_without_error() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteBookRepository::try_new(&conn).unwrap();

    let patch = BookPatch {
        title: "Ghost".to_string(),
        ..BookPatch::default()
    };
    let report = repo.update_book(42, &patch).unwrap();
    assert_eq!(report.rows_matched, 0);
    assert_eq!(count_books(&conn), 0);
}

#[test]
fn delete_removes_record_and_read_reports_not_found() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteBookRepository::try_new(&conn).unwrap();
    let service = BookService::new(repo);

    let created = service.create_book(&BookDraft::titled("Dune")).unwrap();

    let outcome = service.delete_book(created.id).unwrap();
    assert_eq!(outcome.snapshot.unwrap(), Some(created.clone()));
    assert_eq!(outcome.removed, 1);

    let err = service.read_book(created.id).unwrap_err();
    assert!(matches!(err, RepoError::NotFound(id) if id == created.id));
}

#[test]
fn delete_of_missing_record_still_succeeds() {
    let conn = open_db_in_memory().unwrap();
    let service = BookService::new(SqliteBookRepository::try_new(&conn).unwrap());

    let outcome = service.delete_book(99).unwrap();
    assert_eq!(outcome.snapshot.unwrap(), None);
    assert_eq!(outcome.removed, 0);
}

#[test]
fn delete_keeps_lookup_error_and_still_removes_row() {
    let conn = open_db_in_memory().unwrap();
    conn.execute(
        "INSERT INTO books (title, stars, created_at, updated_at) VALUES ('Dune', -1, 1, 1);",
        [],
    )
    .unwrap();
    let service = BookService::new(SqliteBookRepository::try_new(&conn).unwrap());

    let outcome = service.delete_book(1).unwrap();
    match outcome.snapshot {
        Err(RepoError::InvalidData(message)) => assert!(message.contains("invalid stars value")),
        other => panic!("unexpected snapshot: {other:?}"),
    }
    assert_eq!(outcome.removed, 1);
    assert_eq!(count_books(&conn), 0);
}

#[test]
fn zero_id_is_a_no_op_for_read_edit_and_delete() {
    let conn = open_db_in_memory().unwrap();
    let service = BookService::new(SqliteBookRepository::try_new(&conn).unwrap());
    service.create_book(&BookDraft::titled("Dune")).unwrap();

    assert_eq!(service.read_book(0).unwrap(), None);
    let patch = BookPatch {
        title: "Changed".to_string(),
        ..BookPatch::default()
    };
    assert!(service.update_book(0, &patch).unwrap().is_none());
    let outcome = service.delete_book(0).unwrap();
    assert_eq!(outcome.snapshot.unwrap(), None);
    assert_eq!(outcome.removed, 0);
    assert_eq!(count_books(&conn), 1);
}

#[test]
fn service_create_echoes_stored_record() {
    let conn = open_db_in_memory().unwrap();
    let service = BookService::new(SqliteBookRepository::try_new(&conn).unwrap());

    let draft = BookDraft {
        author: "Frank Herbert".to_string(),
        stars: 5,
        ..BookDraft::titled("Dune")
    };
    let book = service.create_book(&draft).unwrap();

    assert_eq!(book.title, "Dune");
    assert_eq!(book.author, "Frank Herbert");
    assert_eq!(book.stars, 5);
    assert_eq!(book.state, "");
    assert_eq!(book.date_read, None);
    assert_eq!(service.read_book(book.id).unwrap(), Some(book));
}

#[test]
fn repository_rejects_uninitialized_connection() {
    let conn = Connection::open_in_memory().unwrap();

    match SqliteBookRepository::try_new(&conn) {
        Err(RepoError::UninitializedConnection {
            expected_version,
            actual_version: 0,
        }) => assert_eq!(expected_version, latest_version()),
        Err(other) => panic!("unexpected error: {other}"),
        Ok(_) => panic!("expected uninitialized connection error"),
    }
}

#[test]
fn repository_rejects_connection_without_books_table() {
    let conn = Connection::open_in_memory().unwrap();
    conn.execute_batch(&format!("PRAGMA user_version = {};", latest_version()))
        .unwrap();

    let result = SqliteBookRepository::try_new(&conn);
    assert!(matches!(result, Err(RepoError::MissingRequiredTable("books"))));
}

#[test]
fn repository_rejects_books_table_missing_a_column() {
    let conn = Connection::open_in_memory().unwrap();
    conn.execute_batch(
        "CREATE TABLE books (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            title TEXT NOT NULL,
            author TEXT,
            addn_authors TEXT,
            state TEXT,
            stars INTEGER,
            date_read DATE,
            created_at INTEGER NOT NULL
        );",
    )
    .unwrap();
    conn.execute_batch(&format!("PRAGMA user_version = {};", latest_version()))
        .unwrap();

    let result = SqliteBookRepository::try_new(&conn);
    assert!(matches!(
        result,
        Err(RepoError::MissingRequiredColumn {
            table: "books",
            column: "updated_at"
        })
    ));
}

fn count_books(conn: &Connection) -> i64 {
    conn.query_row("SELECT COUNT(*) FROM books;", [], |row| row.get(0))
        .unwrap()
}
