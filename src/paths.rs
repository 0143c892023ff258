//! Project path functions - single source of truth for all file paths.
//!
//! ## Environment Variables
//!
//! - `DATA_DIR`: Override the base data directory (default: "data")
//!
//! Storage-specific overrides (`DP_REVIEW_PATH`, see config.rs) take
//! precedence over anything derived here.

use std::env;
use std::path::{Path, PathBuf};
use std::sync::OnceLock;

/// Lazily initialized data directory from DATA_DIR env var
static DATA_DIR_VALUE: OnceLock<String> = OnceLock::new();

/// Get the base data directory (from DATA_DIR env var or default "data")
pub fn data_dir() -> &'static str {
  DATA_DIR_VALUE.get_or_init(|| env::var("DATA_DIR").unwrap_or_else(|_| "data".to_string()))
}

/// SQLite database file used when the sqlite backend is given a directory
pub const SQLITE_FILE_NAME: &str = "reviews.db";

/// File holding one stored key inside a file-store directory.
///
/// The key is percent-encoded, so distinct keys never share a file and no
/// key can name a path outside `dir`.
pub fn key_file_path(dir: &Path, key: &str) -> PathBuf {
  dir.join(format!("{}.json", urlencoding::encode(key)))
}

/// Resolve the database file for the sqlite backend.
///
/// A path with an extension is taken as the database file itself,
/// anything else as the directory that holds it.
pub fn sqlite_db_path(path: &Path) -> PathBuf {
  if path.extension().is_some() {
    path.to_path_buf()
  } else {
    path.join(SQLITE_FILE_NAME)
  }
}

// ==================== Tests ====================
