//! Application configuration constants.
//!
//! Scheduling constants live here so the SM-2 rule, the scheduler and the
//! analytics all agree on the same thresholds. Storage settings are resolved
//! from `config.toml`, then the environment, then defaults.

use serde::Deserialize;
use std::path::{Path, PathBuf};

use crate::paths;

// ==================== Scheduling Configuration ====================

/// Ease factor assigned to new and migrated items
pub const DEFAULT_EASE_FACTOR: f64 = 2.5;

/// Lower bound for the ease factor (no upper bound)
pub const MIN_EASE_FACTOR: f64 = 1.3;

/// Qualities below this value count as a failed recall
pub const FAILURE_THRESHOLD: u8 = 3;

/// Interval (days) at which an item counts as graduated
pub const GRADUATION_INTERVAL_DAYS: i64 = 21;

/// Longest interval (days) the scheduler will hand out, about a century.
/// Stored data with a longer interval is rejected.
pub const MAX_INTERVAL_DAYS: i64 = 36_500;

/// Maximum number of review records kept per item
pub const HISTORY_LIMIT: usize = 20;

// ==================== Migration Defaults ====================

/// Quality assumed for legacy items that were never rated
pub const LEGACY_QUALITY: u8 = 3;

/// Interval (days) assumed for legacy items
pub const LEGACY_INTERVAL_DAYS: i64 = 1;

// ==================== Analytics Configuration ====================

/// Window used for "reviewed this week"
pub const RECENT_WINDOW_DAYS: i64 = 7;

/// Number of upcoming reviews shown by default
pub const UPCOMING_LIMIT: usize = 3;

/// Number of history records shown in the item detail view
pub const DETAIL_HISTORY_LIMIT: usize = 5;

/// Ease below this is "difficult"
pub const EASE_DIFFICULT_BELOW: f64 = 2.0;

/// Ease at or above this is "easy"
pub const EASE_EASY_FROM: f64 = 2.8;

/// Goal thresholds
pub const BACKLOG_GOAL_THRESHOLD: usize = 5;
pub const MASTERY_GOAL_EASE: f64 = 2.3;
pub const COLLECTION_GOAL_SIZE: usize = 10;

// ==================== Storage Configuration ====================

/// Key under which the whole collection is stored
pub const DEFAULT_STORAGE_KEY: &str = "spacedRepetitionData";

/// Which durable store backs the scheduler
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StorageBackend {
  /// One JSON file per key in a directory
  File,
  /// Key-value table in a SQLite database
  #[cfg(feature = "sqlite")]
  Sqlite,
  /// Nothing survives the process
  Memory,
}

impl StorageBackend {
  pub fn from_str(s: &str) -> Option<Self> {
    match s.trim().to_ascii_lowercase().as_str() {
      "file" => Some(Self::File),
      #[cfg(feature = "sqlite")]
      "sqlite" => Some(Self::Sqlite),
      "memory" => Some(Self::Memory),
      _ => None,
    }
  }

  pub fn as_str(&self) -> &'static str {
    match self {
      Self::File => "file",
      #[cfg(feature = "sqlite")]
      Self::Sqlite => "sqlite",
      Self::Memory => "memory",
    }
  }
}

/// Resolved storage settings
#[derive(Debug, Clone, PartialEq)]
pub struct StorageConfig {
  pub backend: StorageBackend,
  /// Directory for `file`, database file for `sqlite`, ignored for `memory`
  pub path: PathBuf,
  pub key: String,
}

impl Default for StorageConfig {
  fn default() -> Self {
    Self {
      backend: StorageBackend::File,
      path: PathBuf::from(paths::data_dir()),
      key: DEFAULT_STORAGE_KEY.to_string(),
    }
  }
}

/// Configuration file structure for config.toml
#[derive(Debug, Default, Deserialize)]
struct AppConfig {
  storage: Option<StorageSection>,
}

#[derive(Debug, Default, Deserialize)]
struct StorageSection {
  backend: Option<StorageBackend>,
  path: Option<String>,
  key: Option<String>,
}

/// Load storage settings with priority: config.toml > .env / environment > default
pub fn load_storage_config() -> StorageConfig {
  // Load .env file if present
  let _ = dotenvy::dotenv();

  let file_section = read_config_file(Path::new("config.toml")).and_then(|c| c.storage);
  resolve_storage_config(file_section, |name| std::env::var(name).ok())
}

fn read_config_file(path: &Path) -> Option<AppConfig> {
  let contents = std::fs::read_to_string(path).ok()?;
  match toml::from_str::<AppConfig>(&contents) {
    Ok(config) => Some(config),
    Err(e) => {
      tracing::warn!("Ignoring malformed {}: {}", path.display(), e);
      None
    }
  }
}

fn resolve_storage_config(
  file_section: Option<StorageSection>,
  env: impl Fn(&str) -> Option<String>,
) -> StorageConfig {
  let defaults = StorageConfig::default();
  let section = file_section.unwrap_or_default();

  let backend = section
    .backend
    .or_else(|| {
      env("DP_REVIEW_BACKEND").and_then(|v| {
        let parsed = StorageBackend::from_str(&v);
        if parsed.is_none() {
          tracing::warn!("Unknown DP_REVIEW_BACKEND '{}', using default", v);
        }
        parsed
      })
    })
    .unwrap_or(defaults.backend);

  let path = match section.path {
    Some(path) => {
      tracing::info!("Using storage path from config.toml: {}", path);
      PathBuf::from(path)
    }
    None => match env("DP_REVIEW_PATH") {
      Some(path) => {
        tracing::info!("Using storage path from DP_REVIEW_PATH env: {}", path);
        PathBuf::from(path)
      }
      None => defaults.path,
    },
  };

  let key = section
    .key
    .or_else(|| env("DP_REVIEW_KEY"))
    .filter(|k| !k.trim().is_empty())
    .unwrap_or(defaults.key);

  StorageConfig { backend, path, key }
}
