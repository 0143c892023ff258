//! Error types for the scheduler and its durable stores.

use thiserror::Error;

/// Failure of the external key-value store
#[derive(Debug, Error)]
pub enum StoreError {
  #[error("storage I/O failed: {0}")]
  Io(#[from] std::io::Error),

  #[cfg(feature = "sqlite")]
  #[error("storage database failed: {0}")]
  Sqlite(#[from] rusqlite::Error),

  /// A thread panicked while holding the store or scheduler lock
  #[error("storage unavailable: {0} lock poisoned")]
  Lock(&'static str),
}

#[derive(Debug, Error)]
pub enum SchedulerError {
  #[error("review item '{0}' not found")]
  NotFound(String),

  #[error("review item '{0}' already exists")]
  AlreadyExists(String),

  #[error("invalid argument: {0}")]
  InvalidArgument(String),

  #[error(transparent)]
  Storage(#[from] StoreError),
}

impl SchedulerError {
  pub fn invalid(reason: impl Into<String>) -> Self {
    Self::InvalidArgument(reason.into())
  }
}

pub type Result<T> = std::result::Result<T, SchedulerError>;

/// Extension trait for logging errors before discarding them
pub trait LogOnError<T> {
  /// Log the error at warn level and return None
  fn log_warn(self, context: &str) -> Option<T>;
}

impl<T, E: std::fmt::Display> LogOnError<T> for std::result::Result<T, E> {
  fn log_warn(self, context: &str) -> Option<T> {
    match self {
      Ok(v) => Some(v),
      Err(e) => {
        tracing::warn!("{}: {}", context, e);
        None
      }
    }
  }
}
