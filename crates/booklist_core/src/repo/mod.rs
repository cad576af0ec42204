//! Repository layer abstractions and persistence implementations.
//!
//! # Responsibility
//! - Define the book data access contract.
//! - Isolate SQLite query details from service orchestration.
//!
//! # Invariants
//! - Create paths validate the draft before any SQL runs.
//! - Multi-row reads surface row-decode failures per item instead of
//!   dropping them.

pub mod book_repo;
