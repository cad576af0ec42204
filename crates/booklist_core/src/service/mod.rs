//! Core use-case services.
//!
//! # Responsibility
//! - Orchestrate repository calls into the user-facing book actions.
//! - Own the id `0` no-op rule and the delete-shows-first contract.

pub mod book_service;
