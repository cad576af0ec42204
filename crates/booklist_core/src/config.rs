//! Runtime configuration for the book store.
//!
//! # Responsibility
//! - Resolve the database path, log directory and log level.
//! - Provide `$HOME`-based defaults (`~/.booklist/booklist.db`).
//!
//! # Invariants
//! - Explicit values always win over defaults.
//! - Resolution never touches the filesystem.

use crate::logging::default_log_level;
use std::path::{Path, PathBuf};

const DATA_DIR_NAME: &str = ".booklist";
const DB_FILE_NAME: &str = "booklist.db";
const LOG_DIR_NAME: &str = "logs";

/// Resolved settings for one invocation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BooklistConfig {
    pub db_path: PathBuf,
    pub log_dir: PathBuf,
    pub log_level: String,
    /// Whether a command starts file logging once its store is ready.
    pub file_logging: bool,
}

impl BooklistConfig {
    /// Resolves settings from optional overrides and a home directory.
    ///
    /// Overrides typically come from CLI flags or `BOOKLIST_*` variables.
    /// When `home` is `None` the data directory is relative to the working
    /// directory.
    pub fn resolve(
        db_path: Option<PathBuf>,
        log_dir: Option<PathBuf>,
        log_level: Option<String>,
        home: Option<&Path>,
    ) -> Self {
        let data_dir = home
            .map(|home| home.join(DATA_DIR_NAME))
            .unwrap_or_else(|| PathBuf::from(DATA_DIR_NAME));

        Self {
            db_path: db_path.unwrap_or_else(|| data_dir.join(DB_FILE_NAME)),
            log_dir: log_dir.unwrap_or_else(|| data_dir.join(LOG_DIR_NAME)),
            log_level: log_level.unwrap_or_else(|| default_log_level().to_string()),
            file_logging: true,
        }
    }

    /// Resolves settings against the current user's `$HOME`.
    pub fn from_overrides(
        db_path: Option<PathBuf>,
        log_dir: Option<PathBuf>,
        log_level: Option<String>,
    ) -> Self {
        let home = std::env::var_os("HOME").map(PathBuf::from);
        Self::resolve(db_path, log_dir, log_level, home.as_deref())
    }
}
