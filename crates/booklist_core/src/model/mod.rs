//! Domain model for tracked books.
//!
//! # Responsibility
//! - Define the persisted `Book` record and the caller-facing input shapes.
//! - Own input validation (title presence, `YYYY-MM-DD` dates).
//!
//! # Invariants
//! - Every persisted book has a non-empty title.
//! - Absent optional text is an empty string, never a separate null marker.

pub mod book;
pub mod command;
